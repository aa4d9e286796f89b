//! Session level commands: open, user mode, save, end session

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{expect_command, path_text, tags};
use crate::error::{FdError, FdResult};
use crate::xml::Element;

/// Open a model file (`.struxml` or `.str`)
#[derive(Debug, Clone, PartialEq)]
pub struct CmdOpen {
    pub file_name: PathBuf,
}

impl CmdOpen {
    pub const COMMAND: &'static str = "; CXL CS2SHELL OPEN";

    pub fn new(file_name: impl Into<PathBuf>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    pub fn to_element(&self) -> FdResult<Element> {
        file_command(tags::OPEN, Self::COMMAND, &self.file_name)
    }

    pub fn from_element(element: &Element) -> FdResult<Self> {
        read_file_command(element, Self::COMMAND).map(Self::new)
    }
}

/// Save the open model
#[derive(Debug, Clone, PartialEq)]
pub struct CmdSave {
    pub file_name: PathBuf,
}

impl CmdSave {
    pub const COMMAND: &'static str = "; CXL CS2SHELL SAVE";

    pub fn new(file_name: impl Into<PathBuf>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    pub fn to_element(&self) -> FdResult<Element> {
        file_command(tags::SAVE, Self::COMMAND, &self.file_name)
    }

    pub fn from_element(element: &Element) -> FdResult<Self> {
        read_file_command(element, Self::COMMAND).map(Self::new)
    }
}

/// Save the model documentation as a `.docx` document
#[derive(Debug, Clone, PartialEq)]
pub struct CmdSaveDocx {
    pub file_name: PathBuf,
}

impl CmdSaveDocx {
    pub const COMMAND: &'static str = "$ DOC SAVEAS";

    pub fn new(file_name: impl Into<PathBuf>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    pub fn to_element(&self) -> FdResult<Element> {
        file_command(tags::SAVE_DOCX, Self::COMMAND, &self.file_name)
    }

    pub fn from_element(element: &Element) -> FdResult<Self> {
        read_file_command(element, Self::COMMAND).map(Self::new)
    }
}

fn file_command(tag: &str, token: &str, file_name: &Path) -> FdResult<Element> {
    Ok(Element::new(tag)
        .attr("command", token)
        .child(Element::new("filename").with_text(path_text(file_name)?)))
}

fn read_file_command(element: &Element, token: &str) -> FdResult<PathBuf> {
    expect_command(element, token)?;
    Ok(PathBuf::from(element.require_child_text("filename")?))
}

/// Program modules the engine can switch into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmdUserModule {
    Resmode,
    Load,
    RcDesign,
    SteelDesign,
    TimberDesign,
    FoundationDesign,
}

impl CmdUserModule {
    pub fn as_str(self) -> &'static str {
        match self {
            CmdUserModule::Resmode => "RESMODE",
            CmdUserModule::Load => "LOAD",
            CmdUserModule::RcDesign => "RCDESIGN",
            CmdUserModule::SteelDesign => "STEELDESIGN",
            CmdUserModule::TimberDesign => "TIMBERDESIGN",
            CmdUserModule::FoundationDesign => "FOUNDATIONDESIGN",
        }
    }

    pub fn from_wire(raw: &str) -> FdResult<Self> {
        match raw {
            "RESMODE" => Ok(CmdUserModule::Resmode),
            "LOAD" => Ok(CmdUserModule::Load),
            "RCDESIGN" => Ok(CmdUserModule::RcDesign),
            "STEELDESIGN" => Ok(CmdUserModule::SteelDesign),
            "TIMBERDESIGN" => Ok(CmdUserModule::TimberDesign),
            "FOUNDATIONDESIGN" => Ok(CmdUserModule::FoundationDesign),
            other => Err(FdError::SchemaViolation(format!(
                "unknown user module '{}'",
                other
            ))),
        }
    }

    /// Full `command` token, e.g. `; CXL $MODULE RESMODE`
    pub fn command(self) -> &'static str {
        match self {
            CmdUserModule::Resmode => "; CXL $MODULE RESMODE",
            CmdUserModule::Load => "; CXL $MODULE LOAD",
            CmdUserModule::RcDesign => "; CXL $MODULE RCDESIGN",
            CmdUserModule::SteelDesign => "; CXL $MODULE STEELDESIGN",
            CmdUserModule::TimberDesign => "; CXL $MODULE TIMBERDESIGN",
            CmdUserModule::FoundationDesign => "; CXL $MODULE FOUNDATIONDESIGN",
        }
    }
}

/// Switch the engine into a program module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CmdUser {
    pub module: CmdUserModule,
}

impl CmdUser {
    const PREFIX: &'static str = "; CXL $MODULE ";

    pub fn new(module: CmdUserModule) -> Self {
        Self { module }
    }

    pub fn to_element(&self) -> Element {
        Element::new(tags::USER).attr("command", self.module.command())
    }

    pub fn from_element(element: &Element) -> FdResult<Self> {
        let command = element.require_attr("command")?;
        let module = command.strip_prefix(Self::PREFIX).ok_or_else(|| {
            FdError::SchemaViolation(format!("<cmduser> has command '{}'", command))
        })?;
        CmdUserModule::from_wire(module).map(Self::new)
    }
}

/// Close the engine session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CmdEndSession;

impl CmdEndSession {
    pub fn to_element(&self) -> Element {
        Element::new(tags::END_SESSION)
    }
}

/// Apply the changes proposed by the design modules to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CmdDesignChanges;

impl CmdDesignChanges {
    pub const COMMAND: &'static str = "; CXL $MODULE DESIGNCHANGES";

    pub fn to_element(&self) -> Element {
        Element::new(tags::DESIGN_CHANGES).attr("command", Self::COMMAND)
    }

    pub fn from_element(element: &Element) -> FdResult<Self> {
        expect_command(element, Self::COMMAND)?;
        Ok(Self)
    }
}
