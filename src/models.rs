use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::bsc::Bsc;
use crate::pipeline::ResultSet;
use crate::results::{LoadKind, ResultCategory};

/// One planned listing, as reported by `/api/v1/validate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingPlan {
    pub category: ResultCategory,
    pub kind: LoadKind,
    pub list_proc: String,
    pub bsc_file: PathBuf,
    pub output_file: PathBuf,
    pub all_cases: bool,
}

impl From<&Bsc> for ListingPlan {
    fn from(bsc: &Bsc) -> Self {
        Self {
            category: bsc.category,
            kind: bsc.kind,
            list_proc: bsc.list_proc.clone(),
            bsc_file: bsc.path().to_path_buf(),
            output_file: bsc.output_path().to_path_buf(),
            all_cases: bsc.all_cases,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
    /// The `FiniteElement` aggregate will be built
    pub finite_element: bool,
    pub listings: Vec<ListingPlan>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptResponse {
    pub job_id: String,
    pub script_path: PathBuf,
    pub script: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultsResponse {
    pub job_id: String,
    pub status: ReadStatus,
    pub results: Option<ResultSet>,
    pub error_message: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReadStatus {
    Success,
    /// Some listings could not be parsed
    Partial,
    Failed,
}
