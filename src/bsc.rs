//! List-generation batch files (`.bsc`)
//!
//! A batch file tells the engine which listing to produce. It is itself an
//! fdscript holding a single `cmddoctable`, and is referenced from the main
//! script through `cmdlistgen bscfile=".."`.
//!
//! Layout next to the model:
//!
//! ```text
//! <model dir>/model.struxml
//! <model dir>/scripts/<Category>.bsc
//! <model dir>/scripts/<model stem>.log
//! <model dir>/results/<Category>.csv
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::commands::{CmdDocTable, CmdEndSession, Command, DocTable};
use crate::error::{FdError, FdResult};
use crate::results::{LoadKind, ResultCategory, ResultRequest};
use crate::script::FdScript;
use crate::units::{Options, UnitResults};

pub const SCRIPTS_DIR: &str = "scripts";
pub const RESULTS_DIR: &str = "results";
pub const BSC_EXTENSION: &str = "bsc";
pub const RESULT_EXTENSION: &str = "csv";

/// Which loads a listing covers
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoadSelection {
    #[default]
    AllCases,
    Cases(Vec<String>),
    Combinations(Vec<String>),
    /// Named cases and named combinations, listed separately
    Mixed {
        cases: Vec<String>,
        combinations: Vec<String>,
    },
}

impl LoadSelection {
    /// No names at all lists every case.
    pub fn from_filters(cases: &[String], combinations: &[String]) -> Self {
        match (cases.is_empty(), combinations.is_empty()) {
            (false, false) => LoadSelection::Mixed {
                cases: cases.to_vec(),
                combinations: combinations.to_vec(),
            },
            (false, true) => LoadSelection::Cases(cases.to_vec()),
            (true, false) => LoadSelection::Combinations(combinations.to_vec()),
            (true, true) => LoadSelection::AllCases,
        }
    }

    /// Listing flavours needed, one batch file each
    pub fn kinds(&self) -> &'static [LoadKind] {
        match self {
            LoadSelection::AllCases | LoadSelection::Cases(_) => &[LoadKind::Case],
            LoadSelection::Combinations(_) => &[LoadKind::Combination],
            LoadSelection::Mixed { .. } => &[LoadKind::Case, LoadKind::Combination],
        }
    }

    pub fn is_all(&self) -> bool {
        match self {
            LoadSelection::AllCases => true,
            LoadSelection::Cases(names) | LoadSelection::Combinations(names) => names.is_empty(),
            LoadSelection::Mixed {
                cases,
                combinations,
            } => cases.is_empty() && combinations.is_empty(),
        }
    }
}

/// Descriptor of one batch file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bsc {
    pub category: ResultCategory,
    /// Whether the listing covers load cases or load combinations
    pub kind: LoadKind,
    pub list_proc: String,
    path: PathBuf,
    output: PathBuf,
    pub filter: Option<String>,
    pub all_cases: bool,
    /// Ask the engine for regional number formatting (decimal commas)
    pub regional: bool,
    pub units: UnitResults,
    pub options: Options,
}

impl Bsc {
    /// Descriptor for the first flavour of `selection`. For a mixed selection
    /// that is the load-case listing; [`Bsc::from_categories`] adds the
    /// combination one.
    pub fn new(
        category: ResultCategory,
        selection: &LoadSelection,
        model_path: impl AsRef<Path>,
        units: UnitResults,
        options: Options,
    ) -> Self {
        let kind = selection.kinds()[0];
        let stem = category.name().to_string();
        Self::for_kind(category, kind, stem, selection, model_path.as_ref(), units, options)
    }

    fn for_kind(
        category: ResultCategory,
        kind: LoadKind,
        stem: String,
        selection: &LoadSelection,
        model_path: &Path,
        units: UnitResults,
        options: Options,
    ) -> Self {
        // Topology and quantity listings ignore loads
        let kind = if category.has_load_cases() {
            kind
        } else {
            LoadKind::Case
        };
        Self {
            category,
            kind,
            list_proc: category.list_proc(kind),
            path: Self::scripts_dir(model_path).join(format!("{}.{}", stem, BSC_EXTENSION)),
            output: Self::results_dir(model_path).join(format!("{}.{}", stem, RESULT_EXTENSION)),
            filter: None,
            all_cases: selection.is_all(),
            regional: false,
            units,
            options,
        }
    }

    /// Descriptors in the given category order. With a mixed selection a
    /// load-dependent category gets a case listing and a combination listing,
    /// in that order, with distinct files.
    pub fn from_categories(
        categories: &[ResultCategory],
        selection: &LoadSelection,
        model_path: impl AsRef<Path>,
        units: UnitResults,
        options: Options,
    ) -> Vec<Self> {
        let model_path = model_path.as_ref();
        let kinds = selection.kinds();
        let mut bscs = Vec::new();
        for &category in categories {
            if !category.has_load_cases() || kinds.len() == 1 {
                bscs.push(Self::new(category, selection, model_path, units, options));
                continue;
            }
            for &kind in kinds {
                let stem = format!("{}_{}", category.name(), kind_suffix(kind));
                bscs.push(Self::for_kind(
                    category, kind, stem, selection, model_path, units, options,
                ));
            }
        }
        bscs
    }

    /// Resolve free-text names first; an unknown name yields no descriptors.
    pub fn from_names<S: AsRef<str>>(
        names: &[S],
        selection: &LoadSelection,
        model_path: impl AsRef<Path>,
        units: UnitResults,
        options: Options,
    ) -> FdResult<Vec<Self>> {
        let request = ResultRequest::parse(names)?;
        Ok(Self::from_categories(
            &request.categories,
            selection,
            model_path,
            units,
            options,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the engine writes the listing
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    pub fn scripts_dir(model_path: &Path) -> PathBuf {
        model_dir(model_path).join(SCRIPTS_DIR)
    }

    pub fn results_dir(model_path: &Path) -> PathBuf {
        model_dir(model_path).join(RESULTS_DIR)
    }

    /// Engine log file of scripts run against `model_path`
    pub fn log_path(model_path: &Path) -> PathBuf {
        let stem = model_path
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| "fdscript".into());
        Self::scripts_dir(model_path).join(stem).with_extension("log")
    }

    pub fn doc_table(&self) -> DocTable {
        let mut table = DocTable::new(self.list_proc.as_str(), self.all_cases);
        table.filter = self.filter.clone();
        table.units = self.units;
        table.options = self.options;
        table
    }

    /// Script form of the batch file
    pub fn to_script(&self) -> FdScript {
        FdScript::builder(self.path.with_extension("log"))
            .command(CmdDocTable::new(self.doc_table()))
            .command(CmdEndSession)
            .build()
    }

    /// Write the batch file, creating the scripts directory when needed.
    pub fn write(&self) -> FdResult<()> {
        self.to_script().serialize(&self.path)?;
        tracing::debug!("Wrote {} batch file {:?}", self.category, self.path);
        Ok(())
    }

    /// Read a batch file back. The output path is derived from the layout.
    pub fn read(path: impl AsRef<Path>) -> FdResult<Self> {
        let path = path.as_ref();
        let script = FdScript::read(path)?;
        let table = script
            .commands()
            .iter()
            .find_map(|cmd| match cmd {
                Command::DocTable(cmd) => Some(&cmd.doc_table),
                _ => None,
            })
            .ok_or_else(|| {
                FdError::SchemaViolation(format!("{:?} holds no <cmddoctable>", path))
            })?;
        let (category, kind) = category_of_list_proc(&table.list_proc).ok_or_else(|| {
            FdError::SchemaViolation(format!("unknown list procedure '{}'", table.list_proc))
        })?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| category.name().to_string());

        let model_dir = path
            .parent()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(Self {
            category,
            kind,
            list_proc: table.list_proc.clone(),
            path: path.to_path_buf(),
            output: model_dir
                .join(RESULTS_DIR)
                .join(format!("{}.{}", stem, RESULT_EXTENSION)),
            filter: table.filter.clone(),
            all_cases: table.all_cases(),
            regional: false,
            units: table.units,
            options: table.options,
        })
    }
}

fn model_dir(model_path: &Path) -> PathBuf {
    model_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

fn kind_suffix(kind: LoadKind) -> &'static str {
    match kind {
        LoadKind::Case => "cases",
        LoadKind::Combination => "combinations",
    }
}

fn category_of_list_proc(list_proc: &str) -> Option<(ResultCategory, LoadKind)> {
    ResultCategory::ALL.iter().copied().find_map(|category| {
        [LoadKind::Case, LoadKind::Combination]
            .into_iter()
            .find(|&kind| category.list_proc(kind) == list_proc)
            .map(|kind| (category, kind))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bsc(category: ResultCategory, selection: &LoadSelection) -> Bsc {
        Bsc::new(
            category,
            selection,
            "work/model.struxml",
            UnitResults::default(),
            Options::default(),
        )
    }

    #[test]
    fn test_paths_follow_layout() {
        let bsc = bsc(ResultCategory::BarDisplacement, &LoadSelection::AllCases);
        assert_eq!(bsc.path(), Path::new("work/scripts/BarDisplacement.bsc"));
        assert_eq!(bsc.output_path(), Path::new("work/results/BarDisplacement.csv"));
        assert_eq!(
            Bsc::log_path(Path::new("work/model.struxml")),
            PathBuf::from("work/scripts/model.log")
        );
    }

    #[test]
    fn test_selection_decides_all_cases_and_list_proc() {
        let all = bsc(ResultCategory::NodalDisplacement, &LoadSelection::AllCases);
        assert!(all.all_cases);
        assert_eq!(all.list_proc, "NodalDisplacementsLoadCase");

        let cases = LoadSelection::from_filters(&["Deadload".to_string()], &[]);
        assert!(!bsc(ResultCategory::NodalDisplacement, &cases).all_cases);

        let combs = LoadSelection::from_filters(&[], &["ULS".to_string()]);
        let comb_bsc = bsc(ResultCategory::NodalDisplacement, &combs);
        assert!(!comb_bsc.all_cases);
        assert_eq!(comb_bsc.list_proc, "NodalDisplacementsLoadCombination");

        assert!(LoadSelection::Cases(Vec::new()).is_all());
    }

    #[test]
    fn test_from_names_keeps_request_order() {
        let bscs = Bsc::from_names(
            &["ShellStress", "FemNode", "BarInternalForce"],
            &LoadSelection::AllCases,
            "model.struxml",
            UnitResults::default(),
            Options::default(),
        )
        .unwrap();
        let categories: Vec<ResultCategory> = bscs.iter().map(|b| b.category).collect();
        assert_eq!(
            categories,
            [
                ResultCategory::ShellStress,
                ResultCategory::FemNode,
                ResultCategory::BarInternalForce
            ]
        );
    }

    #[test]
    fn test_from_names_rejects_unknown() {
        let err = Bsc::from_names(
            &["FemNode", "NotACategory"],
            &LoadSelection::AllCases,
            "model.struxml",
            UnitResults::default(),
            Options::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FdError::UnknownCategory(ref name) if name == "NotACategory"));
    }

    #[test]
    fn test_cases_and_combinations_get_separate_listings() {
        let selection =
            LoadSelection::from_filters(&["Deadload".to_string()], &["ULS".to_string()]);
        let bscs = Bsc::from_categories(
            &[ResultCategory::FemNode, ResultCategory::BarDisplacement],
            &selection,
            "work/model.struxml",
            UnitResults::default(),
            Options::default(),
        );
        assert_eq!(bscs.len(), 3);

        // Topology has no load flavour
        assert_eq!(bscs[0].path(), Path::new("work/scripts/FemNode.bsc"));
        assert_eq!(bscs[0].kind, LoadKind::Case);

        assert_eq!(bscs[1].kind, LoadKind::Case);
        assert_eq!(bscs[1].list_proc, "BarsDisplacementsLoadCase");
        assert_eq!(bscs[1].path(), Path::new("work/scripts/BarDisplacement_cases.bsc"));
        assert_eq!(
            bscs[1].output_path(),
            Path::new("work/results/BarDisplacement_cases.csv")
        );

        assert_eq!(bscs[2].kind, LoadKind::Combination);
        assert_eq!(bscs[2].list_proc, "BarsDisplacementsLoadCombination");
        assert_eq!(
            bscs[2].output_path(),
            Path::new("work/results/BarDisplacement_combinations.csv")
        );
    }

    #[test]
    fn test_read_back_keeps_kind_and_output_stem() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model.struxml");
        let selection = LoadSelection::Mixed {
            cases: vec!["Deadload".to_string()],
            combinations: vec!["ULS".to_string()],
        };
        let bscs = Bsc::from_categories(
            &[ResultCategory::NodalDisplacement],
            &selection,
            &model,
            UnitResults::default(),
            Options::default(),
        );
        for bsc in &bscs {
            bsc.write().unwrap();
            assert_eq!(&Bsc::read(bsc.path()).unwrap(), bsc);
        }
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model.struxml");
        let mut original = Bsc::new(
            ResultCategory::ShellInternalForce,
            &LoadSelection::Combinations(vec!["ULS".to_string()]),
            &model,
            UnitResults::default(),
            Options::default(),
        );
        original.filter = Some("P.1".to_string());
        original.write().unwrap();

        let xml = std::fs::read_to_string(original.path()).unwrap();
        assert!(xml.contains("<cmddoctable"));
        assert!(xml.contains("<listproc>ShellInternalForcesLoadCombination</listproc>"));
        assert!(xml.contains("<cmdendsession"));

        let read = Bsc::read(original.path()).unwrap();
        assert_eq!(read, original);
    }
}
