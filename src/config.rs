//! Runtime configuration from environment variables

use std::path::{Path, PathBuf};

pub const ENGINE_PATH_VAR: &str = "FEMDESIGN_PATH";
pub const DEBUG_EXPORT_VAR: &str = "FDSCRIPT_DEBUG_EXPORT";
const DEFAULT_ENGINE: &str = "fd3dstruct";
const LOCAL_ENGINE: &str = "./bin/fd3dstruct";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: &str = "8085";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Engine executable
    pub engine_path: PathBuf,
    /// Copy every generated script here when set
    pub debug_export: Option<PathBuf>,
    pub host: String,
    pub port: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_path: PathBuf::from(DEFAULT_ENGINE),
            debug_export: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let engine = lookup(ENGINE_PATH_VAR).unwrap_or_else(|| {
            // Prefer a repo-local engine binary if present
            if Path::new(LOCAL_ENGINE).exists() {
                LOCAL_ENGINE.to_string()
            } else {
                DEFAULT_ENGINE.to_string()
            }
        });
        // Scripts run with the model directory as working directory, so
        // relative engine paths would break.
        let engine_path = std::fs::canonicalize(&engine).unwrap_or_else(|_| PathBuf::from(engine));

        Self {
            engine_path,
            debug_export: lookup(DEBUG_EXPORT_VAR)
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: lookup("PORT").unwrap_or_else(|| DEFAULT_PORT.to_string()),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
