//! Running scripts through the engine

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::commands::absolute;
use crate::config::EngineConfig;
use crate::error::{FdError, FdResult};

/// How the engine should run a script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunMode {
    pub minimized: bool,
    /// Block until the engine exits
    pub wait_for_exit: bool,
    /// Make sure the script ends the engine session
    pub close_on_exit: bool,
}

impl Default for RunMode {
    fn default() -> Self {
        Self {
            minimized: true,
            wait_for_exit: true,
            close_on_exit: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EngineStatus {
    /// The engine ran to completion
    Finished,
    /// The engine was started and left running
    Spawned { pid: u32 },
}

/// Anything able to execute a script file.
///
/// The pipeline only needs this seam; tests pass a closure that writes the
/// listings itself.
pub trait ScriptRunner: Send + Sync {
    fn run(&self, script_path: &Path, mode: &RunMode) -> FdResult<EngineStatus>;
}

impl<F> ScriptRunner for F
where
    F: Fn(&Path, &RunMode) -> FdResult<EngineStatus> + Send + Sync,
{
    fn run(&self, script_path: &Path, mode: &RunMode) -> FdResult<EngineStatus> {
        self(script_path, mode)
    }
}

/// The FEM-Design executable
#[derive(Debug, Clone)]
pub struct FemDesignApplication {
    engine_path: PathBuf,
    debug_export: Option<PathBuf>,
}

impl FemDesignApplication {
    pub fn new(engine_path: impl Into<PathBuf>) -> Self {
        Self {
            engine_path: engine_path.into(),
            debug_export: None,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            engine_path: config.engine_path.clone(),
            debug_export: config.debug_export.clone(),
        }
    }

    pub fn engine_path(&self) -> &Path {
        &self.engine_path
    }

    /// Command line for one script run. The engine starts in the script's
    /// directory, so the script is passed by absolute path.
    pub fn command(&self, script_path: &Path, mode: &RunMode) -> FdResult<Command> {
        let script_path = absolute(script_path)?;
        let mut command = Command::new(&self.engine_path);
        command.arg("/s").arg(&script_path);
        if mode.minimized {
            command.arg("/min");
        }
        if let Some(dir) = script_path.parent() {
            command.current_dir(dir);
        }
        Ok(command)
    }

    fn maybe_export_debug_file(&self, path: &Path) {
        let Some(dest_dir) = &self.debug_export else {
            return;
        };
        if let Err(err) = fs::create_dir_all(dest_dir) {
            tracing::warn!("Failed to create debug export directory {:?}: {}", dest_dir, err);
            return;
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "script".to_string());
        let dest_file = dest_dir.join(format!("{}_{}.fdscript", stem, Uuid::new_v4()));
        if let Err(err) = fs::copy(path, &dest_file) {
            tracing::warn!("Failed to export debug file {:?}: {}", dest_file, err);
        } else {
            tracing::info!("Exported debug file to {:?}", dest_file);
        }
    }
}

impl ScriptRunner for FemDesignApplication {
    fn run(&self, script_path: &Path, mode: &RunMode) -> FdResult<EngineStatus> {
        self.maybe_export_debug_file(script_path);
        let mut command = self.command(script_path, mode)?;
        tracing::info!("Running command: {:?}", command);

        if !mode.wait_for_exit {
            let child = command
                .spawn()
                .map_err(|e| FdError::Engine(format!("Failed to start {:?}: {}", self.engine_path, e)))?;
            return Ok(EngineStatus::Spawned { pid: child.id() });
        }

        let output = command
            .output()
            .map_err(|e| FdError::Engine(format!("Failed to execute {:?}: {}", self.engine_path, e)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            tracing::error!("Engine failed. Stderr: {}\nStdout: {}", stderr, stdout);
            return Err(FdError::Engine(format!(
                "engine exited with status {}",
                output.status
            )));
        }
        Ok(EngineStatus::Finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line() {
        let app = FemDesignApplication::new("fd3dstruct");
        let mode = RunMode::default();
        let command = app.command(Path::new("work/scripts/model.fdscript"), &mode).unwrap();
        let args: Vec<PathBuf> = command.get_args().map(PathBuf::from).collect();
        assert_eq!(args.len(), 3);
        assert_eq!(args[0], Path::new("/s"));
        assert_eq!(args[2], Path::new("/min"));

        // Relative scripts still resolve after the engine changes directory
        let script = &args[1];
        assert!(script.is_absolute());
        assert!(script.ends_with("work/scripts/model.fdscript"));
        let cwd = command.get_current_dir().unwrap();
        assert!(cwd.is_absolute());
        assert_eq!(Some(cwd), script.parent());

        let visible = RunMode {
            minimized: false,
            ..RunMode::default()
        };
        assert_eq!(app.command(Path::new("a.fdscript"), &visible).unwrap().get_args().count(), 2);
    }

    #[test]
    fn test_missing_engine_is_an_engine_error() {
        let app = FemDesignApplication::new("/nonexistent/fd3dstruct");
        let err = app.run(Path::new("script.fdscript"), &RunMode::default()).unwrap_err();
        assert!(matches!(err, FdError::Engine(_)));
    }

    #[test]
    fn test_closure_runner() {
        let runner = |path: &Path, _: &RunMode| -> FdResult<EngineStatus> {
            assert_eq!(path, Path::new("x.fdscript"));
            Ok(EngineStatus::Finished)
        };
        let status = runner.run(Path::new("x.fdscript"), &RunMode::default()).unwrap();
        assert_eq!(status, EngineStatus::Finished);
    }
}
