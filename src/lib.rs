//! fdscript - command scripts and result listings for the FEM-Design engine
//!
//! This library speaks the engine's batch protocol:
//! - assembling ordered command scripts (`.fdscript`) and reading them back
//! - list-generation batch files (`.bsc`), one per result category
//! - parsing the tab separated result listings into typed records
//! - a read-results pipeline tying the three together around an engine run
//!
//! ## Example
//! ```rust,no_run
//! use fdscript::prelude::*;
//!
//! let bscs = Bsc::from_names(
//!     &["FemNode", "BarDisplacement"],
//!     &LoadSelection::Cases(vec!["Deadload".to_string()]),
//!     "work/model.struxml",
//!     UnitResults::default(),
//!     Options::default(),
//! )?;
//! for bsc in &bscs {
//!     bsc.write()?;
//! }
//!
//! let script = FdScript::read_results(
//!     "work/model.struxml",
//!     &bscs,
//!     &MapCase::new("Deadload")?.of_one(),
//!     &[],
//! )?;
//! script.serialize("work/scripts/model_results.fdscript")?;
//!
//! // ... run the engine, then
//! let records = ResultsReader::new().parse(bscs[1].output_path(), Some(ResultCategory::BarDisplacement))?;
//! println!("{} bar displacement rows", records.len());
//! # Ok::<(), FdError>(())
//! ```

pub mod api;
pub mod bsc;
pub mod commands;
pub mod config;
pub mod error;
pub mod executor;
pub mod models;
pub mod pipeline;
pub mod results;
pub mod script;
pub mod units;
pub mod xml;

// Re-export common types
pub mod prelude {
    pub use crate::bsc::{Bsc, LoadSelection};
    pub use crate::commands::{
        Analysis, CmdCalculation, CmdDesignChanges, CmdDocTable, CmdEndSession, CmdGlobalCfg,
        CmdListGen, CmdOpen, CmdSave, CmdSaveDocx, CmdUser, CmdUserModule, Command, Design,
        DocTable, MapCase, MapComb, WireBool,
    };
    pub use crate::config::EngineConfig;
    pub use crate::error::{FdError, FdResult};
    pub use crate::executor::{EngineStatus, FemDesignApplication, RunMode, ScriptRunner};
    pub use crate::pipeline::{read_results, ReadResultsRequest, ResultSet};
    pub use crate::results::{
        group_by_category, FemBar, FemNode, FemShell, FiniteElement, LoadKind, ResultCategory,
        ResultGroup, ResultRecord, ResultRequest, ResultsReader,
    };
    pub use crate::script::{FdScript, FdScriptHeader};
    pub use crate::units::{Options, UnitResults};
}
