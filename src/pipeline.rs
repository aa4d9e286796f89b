//! Read-results pipeline: from category names to typed records
//!
//! 1. resolve the requested names (nothing is written if one is unknown)
//! 2. write one batch file per category and load kind
//! 3. write the script that opens the model and lists every category
//! 4. run the script
//! 5. parse each listing with its category as hint, failures collected per file

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bsc::{Bsc, LoadSelection};
use crate::commands::{absolute, MapCase, MapComb};
use crate::error::{FdError, FdResult};
use crate::executor::{EngineStatus, RunMode, ScriptRunner};
use crate::results::{
    group_by_category, FiniteElement, ResultCategory, ResultGroup, ResultRequest, ResultsReader,
};
use crate::script::FdScript;
use crate::units::{Options, UnitResults};

pub const SCRIPT_EXTENSION: &str = "fdscript";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadResultsRequest {
    pub model_path: PathBuf,
    /// Category names, `FiniteElement` included
    pub results: Vec<String>,
    #[serde(default)]
    pub cases: Vec<String>,
    #[serde(default)]
    pub combinations: Vec<String>,
    /// Regional number formatting in the listings
    #[serde(default)]
    pub regional: bool,
    #[serde(default)]
    pub units: UnitResults,
    #[serde(default)]
    pub options: Options,
    #[serde(default)]
    pub run_mode: RunMode,
}

impl ReadResultsRequest {
    pub fn new(model_path: impl Into<PathBuf>, results: Vec<String>) -> Self {
        Self {
            model_path: model_path.into(),
            results,
            cases: Vec::new(),
            combinations: Vec::new(),
            regional: false,
            units: UnitResults::default(),
            options: Options::default(),
            run_mode: RunMode::default(),
        }
    }

    pub fn with_cases(mut self, cases: Vec<String>) -> Self {
        self.cases = cases;
        self
    }

    pub fn with_combinations(mut self, combinations: Vec<String>) -> Self {
        self.combinations = combinations;
        self
    }

    pub fn with_regional(mut self, regional: bool) -> Self {
        self.regional = regional;
        self
    }
}

/// Everything needed to run a read: batch files and the script, not yet on disk
#[derive(Debug, Clone)]
pub struct PreparedRead {
    pub request: ResultRequest,
    pub bscs: Vec<Bsc>,
    pub script: FdScript,
    pub script_path: PathBuf,
}

impl PreparedRead {
    /// Write the batch files, then the script.
    pub fn write(&self) -> FdResult<()> {
        for bsc in &self.bscs {
            bsc.write()?;
        }
        self.script.serialize(&self.script_path)
    }

    /// Listing files in script order, each with the category it should hold
    pub fn output_files(&self) -> Vec<(PathBuf, Option<ResultCategory>)> {
        self.script
            .list_gens()
            .zip(&self.bscs)
            .map(|(list_gen, bsc)| (list_gen.out_file().to_path_buf(), Some(bsc.category)))
            .collect()
    }
}

/// A listing that could not be read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileError {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub groups: Vec<ResultGroup>,
    /// Present when `FiniteElement` was requested
    pub finite_element: Option<FiniteElement>,
    pub errors: Vec<FileError>,
}

impl ResultSet {
    pub fn group(&self, category: ResultCategory) -> Option<&ResultGroup> {
        self.groups.iter().find(|group| group.category == category)
    }
}

/// Script path used for reads against `model_path`
pub fn script_path(model_path: &Path) -> PathBuf {
    let stem = model_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "model".to_string());
    Bsc::scripts_dir(model_path).join(format!("{}_results", stem)).with_extension(SCRIPT_EXTENSION)
}

/// Resolve the request into batch descriptors and a script. Touches no files.
/// A relative model path is resolved against the current directory.
pub fn prepare(request: &ReadResultsRequest) -> FdResult<PreparedRead> {
    let resolved = ResultRequest::parse(request.results.as_slice())?;
    let model_path = absolute(&request.model_path)?;
    let selection = LoadSelection::from_filters(&request.cases, &request.combinations);
    tracing::debug!(
        "Resolved {} categories, all cases: {}",
        resolved.categories.len(),
        selection.is_all()
    );

    let mut bscs = Bsc::from_categories(
        &resolved.categories,
        &selection,
        &model_path,
        request.units,
        request.options,
    );
    for bsc in &mut bscs {
        bsc.regional = request.regional;
    }
    let map_cases = request
        .cases
        .iter()
        .map(MapCase::new)
        .collect::<FdResult<Vec<_>>>()?;
    let map_combs = request
        .combinations
        .iter()
        .map(MapComb::new)
        .collect::<FdResult<Vec<_>>>()?;

    let mut script = FdScript::read_results(&model_path, &bscs, &map_cases, &map_combs)?;
    if request.run_mode.close_on_exit {
        script = script.with_end_session();
    }

    Ok(PreparedRead {
        request: resolved,
        bscs,
        script,
        script_path: script_path(&model_path),
    })
}

/// Run the whole read against `runner`.
///
/// Unknown names and engine failures abort the read. A listing that cannot be
/// parsed only lands in `ResultSet::errors`.
pub fn read_results(request: &ReadResultsRequest, runner: &dyn ScriptRunner) -> FdResult<ResultSet> {
    let prepared = prepare(request)?;
    prepared.write()?;
    tracing::info!(
        "Running {:?} for {} categories",
        prepared.script_path,
        prepared.bscs.len()
    );

    match runner.run(&prepared.script_path, &request.run_mode)? {
        EngineStatus::Finished => {}
        EngineStatus::Spawned { pid } => {
            return Err(FdError::Engine(format!(
                "engine (pid {}) is still running, results are not available yet",
                pid
            )));
        }
    }

    let outcome = ResultsReader::new().parse_batch(&prepared.output_files());
    let errors = outcome
        .files
        .iter()
        .filter_map(|file| {
            file.result.as_ref().err().map(|err| FileError {
                path: file.path.clone(),
                message: err.to_string(),
            })
        })
        .collect::<Vec<_>>();
    let (records, _) = outcome.into_parts();

    let finite_element = prepared
        .request
        .finite_element
        .then(|| FiniteElement::from_records(&records));
    let groups = group_by_category(records);
    tracing::info!(
        "Read {} result groups, {} files failed",
        groups.len(),
        errors.len()
    );

    Ok(ResultSet {
        groups,
        finite_element,
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_orders_list_gens_like_the_request() {
        let dir = tempfile::tempdir().unwrap();
        let request = ReadResultsRequest::new(
            dir.path().join("model.struxml"),
            vec!["BarStress".to_string(), "FiniteElement".to_string()],
        );
        let prepared = prepare(&request).unwrap();

        let categories: Vec<ResultCategory> = prepared.bscs.iter().map(|b| b.category).collect();
        assert_eq!(
            categories,
            [
                ResultCategory::FemNode,
                ResultCategory::FemBar,
                ResultCategory::FemShell,
                ResultCategory::BarStress,
            ]
        );
        let outputs = prepared.output_files();
        assert_eq!(outputs.len(), 4);
        assert!(outputs[3].0.ends_with("results/BarStress.csv"));
        assert_eq!(outputs[3].1, Some(ResultCategory::BarStress));
        assert!(prepared.script.ends_session());
        assert!(prepared.script_path.ends_with("scripts/model_results.fdscript"));
    }

    #[test]
    fn test_unknown_name_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let request = ReadResultsRequest::new(
            dir.path().join("model.struxml"),
            vec!["FemNode".to_string(), "Bogus".to_string()],
        );
        let runner = |_: &Path, _: &RunMode| -> FdResult<EngineStatus> {
            panic!("engine must not run");
        };
        let err = read_results(&request, &runner).unwrap_err();
        assert!(matches!(err, FdError::UnknownCategory(ref name) if name == "Bogus"));
        assert!(!dir.path().join("scripts").exists());
    }

    #[test]
    fn test_spawned_engine_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let request = ReadResultsRequest::new(dir.path().join("model.struxml"), vec!["FemNode".to_string()]);
        let runner = |_: &Path, _: &RunMode| -> FdResult<EngineStatus> { Ok(EngineStatus::Spawned { pid: 42 }) };
        let err = read_results(&request, &runner).unwrap_err();
        assert!(matches!(err, FdError::Engine(ref msg) if msg.contains("42")));
    }

    #[test]
    fn test_relative_model_path_is_made_absolute() {
        let request = ReadResultsRequest::new("model.struxml", vec!["FemNode".to_string()]);
        let prepared = prepare(&request).unwrap();

        let model = prepared.script.model_path().unwrap();
        assert!(model.is_absolute());
        assert!(model.ends_with("model.struxml"));
        assert!(prepared.script.header().log_file.is_absolute());
        assert!(prepared.script_path.is_absolute());
        assert!(prepared.bscs[0].path().is_absolute());
        assert!(prepared.output_files()[0].0.is_absolute());
    }

    #[test]
    fn test_cases_and_combinations_are_listed_separately() {
        let dir = tempfile::tempdir().unwrap();
        let request = ReadResultsRequest::new(
            dir.path().join("model.struxml"),
            vec!["NodalDisplacement".to_string()],
        )
        .with_cases(vec!["Deadload".to_string(), "Liveload".to_string()])
        .with_combinations(vec!["ULS".to_string()]);
        let prepared = prepare(&request).unwrap();

        let list_gens: Vec<_> = prepared.script.list_gens().collect();
        assert_eq!(list_gens.len(), 2);
        assert_eq!(list_gens[0].map_cases().len(), 2);
        assert!(list_gens[0].map_combs().is_empty());
        assert!(list_gens[1].map_cases().is_empty());
        assert_eq!(list_gens[1].map_combs().len(), 1);

        let outputs = prepared.output_files();
        assert!(outputs[0].0.ends_with("results/NodalDisplacement_cases.csv"));
        assert!(outputs[1].0.ends_with("results/NodalDisplacement_combinations.csv"));
        assert_eq!(prepared.bscs[0].list_proc, "NodalDisplacementsLoadCase");
        assert_eq!(prepared.bscs[1].list_proc, "NodalDisplacementsLoadCombination");
    }

    #[test]
    fn test_regional_request_reaches_every_list_gen() {
        let dir = tempfile::tempdir().unwrap();
        let request = ReadResultsRequest::new(
            dir.path().join("model.struxml"),
            vec!["FemNode".to_string(), "BarDisplacement".to_string()],
        )
        .with_regional(true);
        let prepared = prepare(&request).unwrap();
        assert!(prepared.script.list_gens().all(|lg| lg.regional));

        let json = r#"{"model_path": "m.struxml", "results": ["FemNode"]}"#;
        let parsed: ReadResultsRequest = serde_json::from_str(json).unwrap();
        assert!(!parsed.regional);
    }
}
