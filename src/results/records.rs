//! Typed rows of engine result listings

use serde::Serialize;

use super::category::ResultCategory;

/// Finite element node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FemNode {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Finite element of a bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FemBar {
    /// Bar identifier, e.g. `B.1`
    pub id: String,
    pub element_id: u32,
    pub nodes: [u32; 2],
}

/// Finite element of a shell (three or four nodes)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FemShell {
    pub id: String,
    pub element_id: u32,
    pub nodes: Vec<u32>,
}

/// Quantity at a node (displacements, support reactions)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeResult {
    pub category: ResultCategory,
    pub id: String,
    pub node_id: u32,
    /// In the order of `category.value_columns()`
    pub values: Vec<f64>,
    pub case_id: Option<String>,
}

/// Quantity at a position along a bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarResult {
    pub category: ResultCategory,
    pub id: String,
    pub pos: f64,
    pub values: Vec<f64>,
    pub case_id: Option<String>,
}

/// Quantity on a shell element, at a vertex or at the element centre
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShellResult {
    pub category: ResultCategory,
    pub id: String,
    pub element_id: u32,
    /// `None` for centre output
    pub node_id: Option<u32>,
    pub values: Vec<f64>,
    pub case_id: Option<String>,
}

/// Row of a listing without a fixed layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericResult {
    pub category: ResultCategory,
    pub columns: Vec<String>,
    pub cells: Vec<String>,
}

impl GenericResult {
    pub fn cell(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.cells.get(i))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape")]
pub enum ResultRecord {
    FemNode(FemNode),
    FemBar(FemBar),
    FemShell(FemShell),
    Node(NodeResult),
    Bar(BarResult),
    Shell(ShellResult),
    Generic(GenericResult),
}

impl ResultRecord {
    pub fn category(&self) -> ResultCategory {
        match self {
            ResultRecord::FemNode(_) => ResultCategory::FemNode,
            ResultRecord::FemBar(_) => ResultCategory::FemBar,
            ResultRecord::FemShell(_) => ResultCategory::FemShell,
            ResultRecord::Node(r) => r.category,
            ResultRecord::Bar(r) => r.category,
            ResultRecord::Shell(r) => r.category,
            ResultRecord::Generic(r) => r.category,
        }
    }

    pub fn case_id(&self) -> Option<&str> {
        match self {
            ResultRecord::Node(r) => r.case_id.as_deref(),
            ResultRecord::Bar(r) => r.case_id.as_deref(),
            ResultRecord::Shell(r) => r.case_id.as_deref(),
            _ => None,
        }
    }

    /// Numeric value by column name, e.g. `record.value("ez")`
    pub fn value(&self, column: &str) -> Option<f64> {
        let values = match self {
            ResultRecord::Node(r) => &r.values,
            ResultRecord::Bar(r) => &r.values,
            ResultRecord::Shell(r) => &r.values,
            ResultRecord::FemNode(n) => {
                return match column {
                    "x" => Some(n.x),
                    "y" => Some(n.y),
                    "z" => Some(n.z),
                    _ => None,
                }
            }
            _ => return None,
        };
        self.category()
            .value_columns()
            .iter()
            .position(|c| *c == column)
            .and_then(|i| values.get(i).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_lookup_by_column() {
        let record = ResultRecord::Bar(BarResult {
            category: ResultCategory::BarInternalForce,
            id: "B.1".to_string(),
            pos: 0.5,
            values: vec![-12.0, 1.0, 0.0, 0.0, 0.0, 3.5],
            case_id: Some("Deadload".to_string()),
        });
        assert_eq!(record.value("N"), Some(-12.0));
        assert_eq!(record.value("Mz"), Some(3.5));
        assert_eq!(record.value("ex"), None);
        assert_eq!(record.case_id(), Some("Deadload"));
        assert_eq!(record.category(), ResultCategory::BarInternalForce);
    }

    #[test]
    fn test_fem_node_coordinates() {
        let record = ResultRecord::FemNode(FemNode { id: 1, x: 1.0, y: 2.0, z: 3.0 });
        assert_eq!(record.value("z"), Some(3.0));
        assert_eq!(record.case_id(), None);
    }
}
