//! Result categories: the closed set of listings the engine can export

use serde::{Deserialize, Serialize};

use crate::error::{FdError, FdResult};

/// Whether a listing selects load cases or load combinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadKind {
    Case,
    Combination,
}

/// Record layout a category parses into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    FemNode,
    FemBar,
    FemShell,
    Node,
    Bar,
    Shell,
    Generic,
}

impl RecordShape {
    /// Leading columns that identify a row
    pub fn key_count(self) -> usize {
        match self {
            RecordShape::FemNode | RecordShape::FemBar | RecordShape::FemShell => 1,
            RecordShape::Node | RecordShape::Bar => 2,
            RecordShape::Shell => 3,
            RecordShape::Generic => 0,
        }
    }

    /// Leading columns the engine leaves blank when `fillcells` is off
    pub fn fill_down_count(self) -> usize {
        match self {
            RecordShape::Shell => 2,
            RecordShape::Generic => 0,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultCategory {
    FemNode,
    FemBar,
    FemShell,
    NodalDisplacement,
    PointSupportReaction,
    BarDisplacement,
    BarInternalForce,
    BarStress,
    ShellDisplacement,
    ShellInternalForce,
    ShellStress,
    QuantityEstimationSteel,
}

impl ResultCategory {
    pub const ALL: [ResultCategory; 12] = [
        ResultCategory::FemNode,
        ResultCategory::FemBar,
        ResultCategory::FemShell,
        ResultCategory::NodalDisplacement,
        ResultCategory::PointSupportReaction,
        ResultCategory::BarDisplacement,
        ResultCategory::BarInternalForce,
        ResultCategory::BarStress,
        ResultCategory::ShellDisplacement,
        ResultCategory::ShellInternalForce,
        ResultCategory::ShellStress,
        ResultCategory::QuantityEstimationSteel,
    ];

    /// Umbrella request name for node, bar and shell topology together
    pub const FINITE_ELEMENT: &'static str = "FiniteElement";

    pub fn name(self) -> &'static str {
        match self {
            ResultCategory::FemNode => "FemNode",
            ResultCategory::FemBar => "FemBar",
            ResultCategory::FemShell => "FemShell",
            ResultCategory::NodalDisplacement => "NodalDisplacement",
            ResultCategory::PointSupportReaction => "PointSupportReaction",
            ResultCategory::BarDisplacement => "BarDisplacement",
            ResultCategory::BarInternalForce => "BarInternalForce",
            ResultCategory::BarStress => "BarStress",
            ResultCategory::ShellDisplacement => "ShellDisplacement",
            ResultCategory::ShellInternalForce => "ShellInternalForce",
            ResultCategory::ShellStress => "ShellStress",
            ResultCategory::QuantityEstimationSteel => "QuantityEstimationSteel",
        }
    }

    /// Exact, case-sensitive lookup. The error names the rejected string.
    pub fn from_name(name: &str) -> FdResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.name() == name)
            .ok_or_else(|| FdError::UnknownCategory(name.to_string()))
    }

    pub fn shape(self) -> RecordShape {
        match self {
            ResultCategory::FemNode => RecordShape::FemNode,
            ResultCategory::FemBar => RecordShape::FemBar,
            ResultCategory::FemShell => RecordShape::FemShell,
            ResultCategory::NodalDisplacement | ResultCategory::PointSupportReaction => {
                RecordShape::Node
            }
            ResultCategory::BarDisplacement
            | ResultCategory::BarInternalForce
            | ResultCategory::BarStress => RecordShape::Bar,
            ResultCategory::ShellDisplacement
            | ResultCategory::ShellInternalForce
            | ResultCategory::ShellStress => RecordShape::Shell,
            ResultCategory::QuantityEstimationSteel => RecordShape::Generic,
        }
    }

    pub fn is_finite_element(self) -> bool {
        matches!(
            self,
            ResultCategory::FemNode | ResultCategory::FemBar | ResultCategory::FemShell
        )
    }

    /// Listings that are computed per load case or combination
    pub fn has_load_cases(self) -> bool {
        !self.is_finite_element() && self != ResultCategory::QuantityEstimationSteel
    }

    /// Engine list procedure name written into the batch file
    pub fn list_proc(self, kind: LoadKind) -> String {
        let stem = match self {
            ResultCategory::FemNode => return "FemNode".to_string(),
            ResultCategory::FemBar => return "FemBar".to_string(),
            ResultCategory::FemShell => return "FemShell".to_string(),
            ResultCategory::QuantityEstimationSteel => return "QuantityEstimationSteel".to_string(),
            ResultCategory::NodalDisplacement => "NodalDisplacements",
            ResultCategory::PointSupportReaction => "PointSupportReactions",
            ResultCategory::BarDisplacement => "BarsDisplacements",
            ResultCategory::BarInternalForce => "BarsInternalForces",
            ResultCategory::BarStress => "BarsStresses",
            ResultCategory::ShellDisplacement => "ShellDisplacements",
            ResultCategory::ShellInternalForce => "ShellInternalForces",
            ResultCategory::ShellStress => "ShellStresses",
        };
        match kind {
            LoadKind::Case => format!("{}LoadCase", stem),
            LoadKind::Combination => format!("{}LoadCombination", stem),
        }
    }

    /// Pattern the title line of a listing of this category matches
    pub fn title_pattern(self) -> &'static str {
        match self {
            ResultCategory::FemNode => r"^FE nodes\b",
            ResultCategory::FemBar => r"^FE bars\b",
            ResultCategory::FemShell => r"^FE shells\b",
            ResultCategory::NodalDisplacement => r"^Nodal displacements\b",
            ResultCategory::PointSupportReaction => r"^Point support group, Reactions\b",
            ResultCategory::BarDisplacement => r"^Bars, Displacements\b",
            ResultCategory::BarInternalForce => r"^Bars, Internal forces\b",
            ResultCategory::BarStress => r"^Bars, Stresses\b",
            ResultCategory::ShellDisplacement => r"^Shells, Displacements\b",
            ResultCategory::ShellInternalForce => r"^Shells, Internal forces\b",
            ResultCategory::ShellStress => r"^Shells, Stresses\b",
            ResultCategory::QuantityEstimationSteel => r"^Quantity estimation, Steel\b",
        }
    }

    /// Full header row. Empty for generic listings, whose header is free.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            ResultCategory::FemNode => &["No.", "x", "y", "z"],
            ResultCategory::FemBar => &["Bar", "Elem", "Node 1", "Node 2"],
            ResultCategory::FemShell => &["Shell", "Elem", "Node 1", "Node 2", "Node 3", "Node 4"],
            ResultCategory::NodalDisplacement => {
                &["ID", "Node", "ex", "ey", "ez", "fix", "fiy", "fiz", "Case"]
            }
            ResultCategory::PointSupportReaction => &[
                "ID", "Node", "x", "y", "z", "Fx", "Fy", "Fz", "Mx", "My", "Mz", "Fr", "Mr",
                "Case",
            ],
            ResultCategory::BarDisplacement => {
                &["ID", "Pos", "ex", "ey", "ez", "fix", "fiy", "fiz", "Case"]
            }
            ResultCategory::BarInternalForce => {
                &["ID", "Pos", "N", "Ty", "Tz", "Mt", "My", "Mz", "Case"]
            }
            ResultCategory::BarStress => &["ID", "Pos", "Sx max", "Sx min", "Svm", "Case"],
            ResultCategory::ShellDisplacement => {
                &["ID", "Elem", "Node", "ex", "ey", "ez", "fix", "fiy", "fiz", "Case"]
            }
            ResultCategory::ShellInternalForce => &[
                "ID", "Elem", "Node", "Mx", "My", "Mxy", "Nx", "Ny", "Nxy", "Tx", "Ty", "Case",
            ],
            ResultCategory::ShellStress => &[
                "ID", "Elem", "Node", "Sxx", "Syy", "Sxy", "Sxz", "Syz", "Svm", "S1", "S2",
                "alpha", "Case",
            ],
            ResultCategory::QuantityEstimationSteel => &[],
        }
    }

    /// Numeric columns carried in `values` of node/bar/shell records
    pub fn value_columns(self) -> &'static [&'static str] {
        let columns = self.columns();
        match self.shape() {
            RecordShape::Node | RecordShape::Bar | RecordShape::Shell => {
                let end = columns.len() - usize::from(self.has_load_cases());
                &columns[self.shape().key_count()..end]
            }
            _ => &[],
        }
    }
}

impl std::fmt::Display for ResultCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Requested categories after expanding the `FiniteElement` umbrella
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRequest {
    pub categories: Vec<ResultCategory>,
    /// The umbrella was requested, so a `FiniteElement` aggregate is expected
    pub finite_element: bool,
}

impl ResultRequest {
    /// Resolve free-text names. Node, bar and shell topology go first when the
    /// umbrella is present; repeated categories keep their first position.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> FdResult<Self> {
        let finite_element = names
            .iter()
            .any(|name| name.as_ref() == ResultCategory::FINITE_ELEMENT);

        let mut categories = Vec::new();
        if finite_element {
            categories.extend([
                ResultCategory::FemNode,
                ResultCategory::FemBar,
                ResultCategory::FemShell,
            ]);
        }
        for name in names.iter().map(AsRef::as_ref) {
            if name == ResultCategory::FINITE_ELEMENT {
                continue;
            }
            let category = ResultCategory::from_name(name)?;
            if !categories.contains(&category) {
                categories.push(category);
            }
        }

        Ok(Self {
            categories,
            finite_element,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for category in ResultCategory::ALL {
            assert_eq!(ResultCategory::from_name(category.name()).unwrap(), category);
        }
    }

    #[test]
    fn test_unknown_category_names_the_input() {
        let err = ResultCategory::from_name("BarDisplacements").unwrap_err();
        assert!(matches!(err, FdError::UnknownCategory(ref name) if name == "BarDisplacements"));
        assert!(err.to_string().contains("BarDisplacements"));
    }

    #[test]
    fn test_value_columns_exclude_keys_and_case() {
        assert_eq!(
            ResultCategory::NodalDisplacement.value_columns(),
            ["ex", "ey", "ez", "fix", "fiy", "fiz"]
        );
        assert_eq!(ResultCategory::ShellStress.value_columns().len(), 9);
        assert!(ResultCategory::FemNode.value_columns().is_empty());
    }

    #[test]
    fn test_list_proc_names() {
        assert_eq!(
            ResultCategory::BarDisplacement.list_proc(LoadKind::Case),
            "BarsDisplacementsLoadCase"
        );
        assert_eq!(
            ResultCategory::ShellStress.list_proc(LoadKind::Combination),
            "ShellStressesLoadCombination"
        );
        assert_eq!(ResultCategory::FemBar.list_proc(LoadKind::Combination), "FemBar");
    }

    #[test]
    fn test_umbrella_expands_in_front() {
        let request = ResultRequest::parse(&["NodalDisplacement", "FiniteElement", "FemBar"]).unwrap();
        assert!(request.finite_element);
        assert_eq!(
            request.categories,
            [
                ResultCategory::FemNode,
                ResultCategory::FemBar,
                ResultCategory::FemShell,
                ResultCategory::NodalDisplacement,
            ]
        );
    }

    #[test]
    fn test_request_keeps_order() {
        let request = ResultRequest::parse(&["FemNode", "FemBar"]).unwrap();
        assert!(!request.finite_element);
        assert_eq!(request.categories, [ResultCategory::FemNode, ResultCategory::FemBar]);
    }

    #[test]
    fn test_request_with_unknown_name_fails() {
        let err = ResultRequest::parse(&["FemNode", "Bogus"]).unwrap_err();
        assert!(matches!(err, FdError::UnknownCategory(ref name) if name == "Bogus"));
    }
}
