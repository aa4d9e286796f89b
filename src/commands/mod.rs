//! fdscript command vocabulary
//!
//! Every command is a variant of the closed [`Command`] sum type. A variant
//! owns a fixed wire tag and a fixed `command` token; neither is ever computed
//! at runtime. Conversion to the wire is [`Command::to_element`], conversion
//! back is [`Command::from_element`] for the variants that support reading.

use std::path::{Path, PathBuf};

use crate::error::{FdError, FdResult};
use crate::xml::Element;

pub mod basic;
pub mod calculation;
pub mod doc_table;
pub mod list_gen;
pub mod mapping;

pub use basic::{CmdDesignChanges, CmdEndSession, CmdOpen, CmdSave, CmdSaveDocx, CmdUser, CmdUserModule};
pub use calculation::{Analysis, CmdCalculation, CmdGlobalCfg, Design};
pub use doc_table::{CmdDocTable, DocTable};
pub use list_gen::CmdListGen;
pub use mapping::{MapCase, MapComb};

/// Wire tags of the command elements.
pub mod tags {
    pub const OPEN: &str = "cmdopen";
    pub const USER: &str = "cmduser";
    pub const CALCULATION: &str = "cmdcalculation";
    pub const LIST_GEN: &str = "cmdlistgen";
    pub const DOC_TABLE: &str = "cmddoctable";
    pub const SAVE: &str = "cmdsave";
    pub const SAVE_DOCX: &str = "cmdsavedocx";
    pub const END_SESSION: &str = "cmdendsession";
    pub const GLOBAL_CFG: &str = "cmdglobalcfg";
    pub const DESIGN_CHANGES: &str = "cmddesigndesignchanges";
}

/// A boolean flag as the engine sees it: `0` or `1`.
///
/// Callers work with `bool`; the encode/decode pair below is the only place
/// the integer form exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WireBool(bool);

impl WireBool {
    pub fn new(value: bool) -> Self {
        Self(value)
    }

    pub fn get(self) -> bool {
        self.0
    }

    pub fn encode(self) -> &'static str {
        if self.0 {
            "1"
        } else {
            "0"
        }
    }

    pub fn decode(raw: &str) -> FdResult<Self> {
        match raw.trim() {
            "0" => Ok(Self(false)),
            "1" => Ok(Self(true)),
            other => Err(FdError::SchemaViolation(format!(
                "expected 0 or 1 for a flag, found '{}'",
                other
            ))),
        }
    }
}

/// Read a required 0/1 attribute as `bool`.
pub(crate) fn read_flag(element: &Element, key: &str) -> FdResult<bool> {
    WireBool::decode(element.require_attr(key)?).map(WireBool::get)
}

pub(crate) fn flag(value: bool) -> &'static str {
    WireBool::new(value).encode()
}

/// Path text for the wire. Empty or non UTF-8 paths cannot be expressed.
pub(crate) fn path_text(path: &Path) -> FdResult<String> {
    let text = path.to_str().ok_or_else(|| {
        FdError::SchemaViolation(format!("path {:?} is not valid UTF-8", path))
    })?;
    if text.is_empty() {
        return Err(FdError::SchemaViolation("empty path".to_string()));
    }
    Ok(text.to_string())
}

/// Resolve against the current directory. The engine runs from elsewhere, so
/// every path on the wire must be absolute.
pub fn absolute(path: &Path) -> FdResult<PathBuf> {
    std::path::absolute(path).map_err(|source| FdError::PathResolution {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn expect_command(element: &Element, token: &str) -> FdResult<()> {
    let found = element.require_attr("command")?;
    if found == token {
        Ok(())
    } else {
        Err(FdError::SchemaViolation(format!(
            "<{}> has command '{}', expected '{}'",
            element.name, found, token
        )))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Open(CmdOpen),
    User(CmdUser),
    Calculation(CmdCalculation),
    ListGen(CmdListGen),
    DocTable(CmdDocTable),
    Save(CmdSave),
    SaveDocx(CmdSaveDocx),
    EndSession(CmdEndSession),
    GlobalCfg(CmdGlobalCfg),
    DesignChanges(CmdDesignChanges),
}

impl Command {
    pub fn tag(&self) -> &'static str {
        match self {
            Command::Open(_) => tags::OPEN,
            Command::User(_) => tags::USER,
            Command::Calculation(_) => tags::CALCULATION,
            Command::ListGen(_) => tags::LIST_GEN,
            Command::DocTable(_) => tags::DOC_TABLE,
            Command::Save(_) => tags::SAVE,
            Command::SaveDocx(_) => tags::SAVE_DOCX,
            Command::EndSession(_) => tags::END_SESSION,
            Command::GlobalCfg(_) => tags::GLOBAL_CFG,
            Command::DesignChanges(_) => tags::DESIGN_CHANGES,
        }
    }

    /// Whether [`Command::from_element`] can rebuild this variant.
    pub fn supports_read(&self) -> bool {
        !matches!(self, Command::Calculation(_) | Command::GlobalCfg(_))
    }

    pub fn to_element(&self) -> FdResult<Element> {
        match self {
            Command::Open(cmd) => cmd.to_element(),
            Command::User(cmd) => Ok(cmd.to_element()),
            Command::Calculation(cmd) => Ok(cmd.to_element()),
            Command::ListGen(cmd) => cmd.to_element(),
            Command::DocTable(cmd) => Ok(cmd.to_element()),
            Command::Save(cmd) => cmd.to_element(),
            Command::SaveDocx(cmd) => cmd.to_element(),
            Command::EndSession(cmd) => Ok(cmd.to_element()),
            Command::GlobalCfg(cmd) => Ok(cmd.to_element()),
            Command::DesignChanges(cmd) => Ok(cmd.to_element()),
        }
    }

    pub fn from_element(element: &Element) -> FdResult<Self> {
        match element.name.as_str() {
            tags::OPEN => CmdOpen::from_element(element).map(Command::Open),
            tags::USER => CmdUser::from_element(element).map(Command::User),
            tags::LIST_GEN => CmdListGen::from_element(element).map(Command::ListGen),
            tags::DOC_TABLE => CmdDocTable::from_element(element).map(Command::DocTable),
            tags::SAVE => CmdSave::from_element(element).map(Command::Save),
            tags::SAVE_DOCX => CmdSaveDocx::from_element(element).map(Command::SaveDocx),
            tags::END_SESSION => Ok(Command::EndSession(CmdEndSession)),
            tags::DESIGN_CHANGES => {
                CmdDesignChanges::from_element(element).map(Command::DesignChanges)
            }
            other => Err(FdError::UnsupportedRoundTrip(other.to_string())),
        }
    }
}

impl From<CmdOpen> for Command {
    fn from(cmd: CmdOpen) -> Self {
        Command::Open(cmd)
    }
}

impl From<CmdUser> for Command {
    fn from(cmd: CmdUser) -> Self {
        Command::User(cmd)
    }
}

impl From<CmdCalculation> for Command {
    fn from(cmd: CmdCalculation) -> Self {
        Command::Calculation(cmd)
    }
}

impl From<CmdListGen> for Command {
    fn from(cmd: CmdListGen) -> Self {
        Command::ListGen(cmd)
    }
}

impl From<CmdDocTable> for Command {
    fn from(cmd: CmdDocTable) -> Self {
        Command::DocTable(cmd)
    }
}

impl From<CmdSave> for Command {
    fn from(cmd: CmdSave) -> Self {
        Command::Save(cmd)
    }
}

impl From<CmdSaveDocx> for Command {
    fn from(cmd: CmdSaveDocx) -> Self {
        Command::SaveDocx(cmd)
    }
}

impl From<CmdEndSession> for Command {
    fn from(cmd: CmdEndSession) -> Self {
        Command::EndSession(cmd)
    }
}

impl From<CmdGlobalCfg> for Command {
    fn from(cmd: CmdGlobalCfg) -> Self {
        Command::GlobalCfg(cmd)
    }
}

impl From<CmdDesignChanges> for Command {
    fn from(cmd: CmdDesignChanges) -> Self {
        Command::DesignChanges(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_bool_round_trip() {
        for value in [true, false] {
            let encoded = WireBool::new(value).encode();
            assert_eq!(WireBool::decode(encoded).unwrap().get(), value);
        }
        assert_eq!(WireBool::new(true).encode(), "1");
        assert_eq!(WireBool::new(false).encode(), "0");
    }

    #[test]
    fn test_wire_bool_rejects_text() {
        assert!(matches!(
            WireBool::decode("true"),
            Err(FdError::SchemaViolation(_))
        ));
    }

    #[test]
    fn test_calculation_is_write_only() {
        let cmd = Command::from(CmdCalculation::new(Some(Analysis::static_analysis()), None));
        assert!(!cmd.supports_read());
        let element = cmd.to_element().unwrap();
        let err = Command::from_element(&element).unwrap_err();
        assert!(matches!(err, FdError::UnsupportedRoundTrip(tag) if tag == "cmdcalculation"));
    }

    #[test]
    fn test_unknown_tag_is_unsupported() {
        let err = Command::from_element(&Element::new("cmdfoo")).unwrap_err();
        assert!(matches!(err, FdError::UnsupportedRoundTrip(tag) if tag == "cmdfoo"));
    }

    #[test]
    fn test_every_variant_emits_its_tag() {
        let commands: Vec<Command> = vec![
            CmdOpen::new("model.struxml").into(),
            CmdUser::new(CmdUserModule::Resmode).into(),
            CmdCalculation::new(Some(Analysis::static_analysis()), Some(Design::default())).into(),
            CmdSave::new("model.struxml").into(),
            CmdSaveDocx::new("model.docx").into(),
            CmdEndSession.into(),
            CmdGlobalCfg::default().into(),
            CmdDesignChanges.into(),
        ];
        for cmd in commands {
            assert_eq!(cmd.to_element().unwrap().name, cmd.tag());
        }
    }
}
