//! `cmddoctable`: the body of a list-generation batch file (`.bsc`)

use super::{expect_command, tags};
use crate::error::{FdError, FdResult};
use crate::script::FD_VERSION;
use crate::units::{Options, UnitResults};
use crate::xml::Element;

/// Describes one result listing: which list procedure, which cases, which units.
#[derive(Debug, Clone, PartialEq)]
pub struct DocTable {
    pub list_proc: String,
    /// `DocTable::ALL_CASES` lists every case/combination, `0` lists the
    /// mapped ones
    pub case_index: i32,
    pub filter: Option<String>,
    pub units: UnitResults,
    pub options: Options,
}

impl DocTable {
    pub const TAG: &'static str = "doctable";
    pub const ALL_CASES: i32 = -1;

    pub fn new(list_proc: impl Into<String>, all_cases: bool) -> Self {
        Self {
            list_proc: list_proc.into(),
            case_index: if all_cases { Self::ALL_CASES } else { 0 },
            filter: None,
            units: UnitResults::default(),
            options: Options::default(),
        }
    }

    pub fn all_cases(&self) -> bool {
        self.case_index == Self::ALL_CASES
    }

    pub fn to_element(&self) -> Element {
        let mut element = Element::new(Self::TAG)
            .child(Element::new("version").with_text(FD_VERSION))
            .child(Element::new("listproc").with_text(self.list_proc.as_str()))
            .child(Element::new("index").with_text(self.case_index.to_string()));
        if let Some(filter) = &self.filter {
            element = element.child(Element::new("filter").with_text(filter.as_str()));
        }
        element
            .child(self.units.to_element())
            .child(self.options.to_element())
    }

    pub fn from_element(element: &Element) -> FdResult<Self> {
        element.expect_name(Self::TAG)?;
        let raw_index = element.require_child_text("index")?;
        let case_index = raw_index.trim().parse::<i32>().map_err(|_| {
            FdError::SchemaViolation(format!("invalid doctable index '{}'", raw_index))
        })?;
        let units = element
            .find(UnitResults::TAG)
            .map(UnitResults::from_element)
            .transpose()?
            .unwrap_or_default();
        let options = element
            .find(Options::TAG)
            .map(Options::from_element)
            .transpose()?
            .unwrap_or_default();
        Ok(Self {
            list_proc: element.require_child_text("listproc")?.to_string(),
            case_index,
            filter: element.child_text("filter").map(str::to_string),
            units,
            options,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CmdDocTable {
    pub doc_table: DocTable,
}

impl CmdDocTable {
    pub const COMMAND: &'static str = "; CXL CS2SHELL DOCTABLE";

    pub fn new(doc_table: DocTable) -> Self {
        Self { doc_table }
    }

    pub fn to_element(&self) -> Element {
        Element::new(tags::DOC_TABLE)
            .attr("command", Self::COMMAND)
            .child(self.doc_table.to_element())
    }

    pub fn from_element(element: &Element) -> FdResult<Self> {
        expect_command(element, Self::COMMAND)?;
        let table = element.find(DocTable::TAG).ok_or_else(|| {
            FdError::SchemaViolation("<cmddoctable> without <doctable>".to_string())
        })?;
        DocTable::from_element(table).map(Self::new)
    }
}
