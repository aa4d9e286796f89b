//! fdscript document assembly, serialization and read-back

use std::fs;
use std::path::{Path, PathBuf};

use crate::bsc::Bsc;
use crate::commands::{
    Analysis, CmdCalculation, CmdEndSession, CmdListGen, CmdOpen, CmdSave, Command, Design,
    MapCase, MapComb,
};
use crate::commands::{absolute, path_text};
use crate::results::LoadKind;
use crate::error::{FdError, FdResult};
use crate::xml::{self, Element};

/// Engine version the scripts are written for
pub const FD_VERSION: &str = "2300";
pub const DEFAULT_TITLE: &str = "FEM-Design API";
pub const DEFAULT_MODULE: &str = "SFRAME";
const SCHEMA_LOCATION: &str = "fdscript.xsd";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

#[derive(Debug, Clone, PartialEq)]
pub struct FdScriptHeader {
    pub title: String,
    pub version: String,
    pub module: String,
    pub log_file: PathBuf,
}

impl FdScriptHeader {
    pub const TAG: &'static str = "fdscriptheader";

    pub fn new(log_file: impl Into<PathBuf>) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            version: FD_VERSION.to_string(),
            module: DEFAULT_MODULE.to_string(),
            log_file: log_file.into(),
        }
    }

    fn to_element(&self) -> FdResult<Element> {
        Ok(Element::new(Self::TAG)
            .child(Element::new("title").with_text(self.title.as_str()))
            .child(Element::new("version").with_text(self.version.as_str()))
            .child(Element::new("module").with_text(self.module.as_str()))
            .child(Element::new("logfile").with_text(path_text(&self.log_file)?)))
    }

    fn from_element(element: &Element) -> FdResult<Self> {
        element.expect_name(Self::TAG)?;
        Ok(Self {
            title: element.child_text("title").unwrap_or_default().to_string(),
            version: element.require_child_text("version")?.to_string(),
            module: element.require_child_text("module")?.to_string(),
            log_file: PathBuf::from(element.require_child_text("logfile")?),
        })
    }
}

/// An ordered command script.
///
/// The engine runs commands strictly in document order. Nothing here checks
/// that the order makes sense (a list generation before the calculation is
/// accepted); only the structure of each command is validated.
#[derive(Debug, Clone, PartialEq)]
pub struct FdScript {
    header: FdScriptHeader,
    commands: Vec<Command>,
}

/// Collects commands in caller order until [`FdScriptBuilder::build`].
#[derive(Debug, Clone)]
pub struct FdScriptBuilder {
    header: FdScriptHeader,
    commands: Vec<Command>,
}

impl FdScriptBuilder {
    pub fn command(mut self, command: impl Into<Command>) -> Self {
        self.commands.push(command.into());
        self
    }

    pub fn commands(mut self, commands: impl IntoIterator<Item = Command>) -> Self {
        self.commands.extend(commands);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.header.title = title.into();
        self
    }

    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.header.module = module.into();
        self
    }

    pub fn build(self) -> FdScript {
        FdScript {
            header: self.header,
            commands: self.commands,
        }
    }
}

impl FdScript {
    pub const TAG: &'static str = "fdscript";

    pub fn builder(log_file: impl Into<PathBuf>) -> FdScriptBuilder {
        FdScriptBuilder {
            header: FdScriptHeader::new(log_file),
            commands: Vec::new(),
        }
    }

    pub fn new(log_file: impl Into<PathBuf>, commands: impl IntoIterator<Item = Command>) -> Self {
        Self::builder(log_file).commands(commands).build()
    }

    pub fn header(&self) -> &FdScriptHeader {
        &self.header
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// List-generation commands in document order
    pub fn list_gens(&self) -> impl Iterator<Item = &CmdListGen> {
        self.commands.iter().filter_map(|cmd| match cmd {
            Command::ListGen(list_gen) => Some(list_gen),
            _ => None,
        })
    }

    /// File opened by the first `cmdopen`, if any
    pub fn model_path(&self) -> Option<&Path> {
        self.commands.iter().find_map(|cmd| match cmd {
            Command::Open(open) => Some(open.file_name.as_path()),
            _ => None,
        })
    }

    pub fn ends_session(&self) -> bool {
        matches!(self.commands.last(), Some(Command::EndSession(_)))
    }

    /// Copy of this script that is guaranteed to close the engine at the end
    pub fn with_end_session(&self) -> Self {
        let mut script = self.clone();
        if !script.ends_session() {
            script.commands.push(Command::EndSession(CmdEndSession));
        }
        script
    }

    pub fn to_element(&self) -> FdResult<Element> {
        let mut root = Element::new(Self::TAG)
            .attr("xmlns:xsi", XSI_NAMESPACE)
            .attr("xsi:noNamespaceSchemaLocation", SCHEMA_LOCATION)
            .child(self.header.to_element()?);
        for command in &self.commands {
            root = root.child(command.to_element()?);
        }
        Ok(root)
    }

    pub fn to_xml_string(&self) -> FdResult<String> {
        xml::write_document(&self.to_element()?)
    }

    /// Write the script, creating the parent directory when needed.
    pub fn serialize(&self, path: impl AsRef<Path>) -> FdResult<()> {
        let path = path.as_ref();
        let document = self.to_xml_string()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, document)?;
        tracing::debug!("Wrote fdscript with {} commands to {:?}", self.commands.len(), path);
        Ok(())
    }

    pub fn from_element(root: &Element) -> FdResult<Self> {
        root.expect_name(Self::TAG)?;
        let header = root.find(FdScriptHeader::TAG).ok_or_else(|| {
            FdError::SchemaViolation("<fdscript> without <fdscriptheader>".to_string())
        })?;
        let commands = root
            .children
            .iter()
            .filter(|child| child.name != FdScriptHeader::TAG)
            .map(Command::from_element)
            .collect::<FdResult<Vec<_>>>()?;
        Ok(Self {
            header: FdScriptHeader::from_element(header)?,
            commands,
        })
    }

    pub fn from_xml_str(xml: &str) -> FdResult<Self> {
        Self::from_element(&xml::parse_document(xml)?)
    }

    pub fn read(path: impl AsRef<Path>) -> FdResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_xml_str(&content)
    }

    /// Open `model_path`, list every descriptor to its output file, end the
    /// session. A list generation carries the case directives or the
    /// combination directives, matching its descriptor's load kind. The model
    /// path is resolved against the current directory.
    pub fn read_results(
        model_path: impl AsRef<Path>,
        bscs: &[Bsc],
        map_cases: &[MapCase],
        map_combs: &[MapComb],
    ) -> FdResult<Self> {
        let model_path = absolute(model_path.as_ref())?;
        let mut builder =
            Self::builder(Bsc::log_path(&model_path)).command(CmdOpen::new(&model_path));
        for list_gen in list_gens(bscs, map_cases, map_combs)? {
            builder = builder.command(list_gen);
        }
        Ok(builder.command(CmdEndSession).build())
    }

    /// Open, calculate, list results, save and end the session.
    pub fn analysis(
        model_path: impl AsRef<Path>,
        analysis: Option<Analysis>,
        design: Option<Design>,
        bscs: &[Bsc],
        map_cases: &[MapCase],
        map_combs: &[MapComb],
    ) -> FdResult<Self> {
        let model_path = absolute(model_path.as_ref())?;
        let mut builder = Self::builder(Bsc::log_path(&model_path))
            .command(CmdOpen::new(&model_path))
            .command(CmdCalculation::new(analysis, design));
        for list_gen in list_gens(bscs, map_cases, map_combs)? {
            builder = builder.command(list_gen);
        }
        Ok(builder
            .command(CmdSave::new(model_path.with_extension("struxml")))
            .command(CmdEndSession)
            .build())
    }
}

fn list_gens(bscs: &[Bsc], map_cases: &[MapCase], map_combs: &[MapComb]) -> FdResult<Vec<CmdListGen>> {
    bscs.iter()
        .map(|bsc| {
            let (cases, combs) = match bsc.kind {
                LoadKind::Case => (map_cases.to_vec(), Vec::new()),
                LoadKind::Combination => (Vec::new(), map_combs.to_vec()),
            };
            CmdListGen::with_mappings(bsc.path(), bsc.output_path(), bsc.regional, cases, combs)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsc::LoadSelection;
    use crate::commands::{CmdDesignChanges, CmdGlobalCfg, CmdSaveDocx, CmdUser, CmdUserModule};
    use crate::results::ResultCategory;
    use crate::units::{Options, UnitResults};

    fn sample_script() -> FdScript {
        FdScript::builder("logfile.log")
            .command(CmdOpen::new("model.struxml"))
            .command(CmdUser::new(CmdUserModule::Resmode))
            .command(CmdCalculation::new(Some(Analysis::static_analysis()), None))
            .command(CmdCalculation::new(None, Some(Design::default())))
            .command(CmdListGen::new("a.bsc", "./", false).unwrap())
            .command(CmdEndSession)
            .command(CmdGlobalCfg::default())
            .command(CmdDesignChanges)
            .command(CmdSave::new("model.struxml"))
            .command(CmdSaveDocx::new("model.docx"))
            .build()
    }

    #[test]
    fn test_document_layout() {
        let xml = sample_script().to_xml_string().unwrap();
        let lines: Vec<&str> = xml.lines().collect();
        assert!(lines[0].starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));

        for tag in [
            "<fdscript",
            "<fdscriptheader",
            "<cmdopen",
            "<cmduser",
            "<cmdcalculation",
            "<cmdlistgen",
            "<cmdendsession",
            "<cmdglobalcfg",
            "<cmddesigndesignchanges",
            "<cmdsave",
            "<cmdsavedocx",
        ] {
            assert!(xml.contains(tag), "missing {}", tag);
        }
    }

    #[test]
    fn test_commands_keep_input_order() {
        let element = sample_script().to_element().unwrap();
        let names: Vec<&str> = element.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "fdscriptheader",
                "cmdopen",
                "cmduser",
                "cmdcalculation",
                "cmdcalculation",
                "cmdlistgen",
                "cmdendsession",
                "cmdglobalcfg",
                "cmddesigndesignchanges",
                "cmdsave",
                "cmdsavedocx",
            ]
        );
    }

    #[test]
    fn test_round_trip_of_readable_commands() {
        let script = FdScript::builder("logfile.log")
            .command(CmdOpen::new("model.struxml"))
            .command(CmdUser::new(CmdUserModule::Resmode))
            .command(
                CmdListGen::with_mappings(
                    "a.bsc",
                    "results/out.csv",
                    true,
                    MapCase::new("Deadload").unwrap().of_one(),
                    MapComb::new("ULS").unwrap().of_one(),
                )
                .unwrap(),
            )
            .command(CmdDesignChanges)
            .command(CmdSave::new("model.struxml"))
            .command(CmdSaveDocx::new("model.docx"))
            .command(CmdEndSession)
            .build();

        let xml = script.to_xml_string().unwrap();
        assert_eq!(FdScript::from_xml_str(&xml).unwrap(), script);
    }

    #[test]
    fn test_reading_write_only_command_fails() {
        let xml = sample_script().to_xml_string().unwrap();
        let err = FdScript::from_xml_str(&xml).unwrap_err();
        assert!(matches!(err, FdError::UnsupportedRoundTrip(tag) if tag == "cmdcalculation"));
    }

    #[test]
    fn test_serialize_and_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("script.fdscript");
        let script = FdScript::new(
            "logfile.log",
            vec![Command::from(CmdOpen::new("model.struxml")), Command::from(CmdEndSession)],
        );
        script.serialize(&path).unwrap();
        assert_eq!(FdScript::read(&path).unwrap(), script);
    }

    #[test]
    fn test_with_end_session_is_idempotent() {
        let script = FdScript::new("log.log", vec![Command::from(CmdOpen::new("m.struxml"))]);
        assert!(!script.ends_session());
        let closed = script.with_end_session();
        assert!(closed.ends_session());
        assert_eq!(closed.with_end_session().commands().len(), 2);
    }

    fn mixed_bscs(model_path: &Path) -> Vec<Bsc> {
        Bsc::from_categories(
            &[ResultCategory::BarDisplacement],
            &LoadSelection::from_filters(&["Deadload".to_string()], &["ULS".to_string()]),
            model_path,
            UnitResults::default(),
            Options::default(),
        )
    }

    #[test]
    fn test_relative_model_path_is_resolved() {
        let script = FdScript::read_results("model.struxml", &[], &[], &[]).unwrap();
        let model = script.model_path().unwrap();
        assert!(model.is_absolute());
        assert!(model.ends_with("model.struxml"));
        assert!(script.header().log_file.is_absolute());
        assert!(script.header().log_file.ends_with("scripts/model.log"));

        let script = FdScript::analysis("model.struxml", None, None, &[], &[], &[]).unwrap();
        let saved = script
            .commands()
            .iter()
            .find_map(|cmd| match cmd {
                Command::Save(save) => Some(save.file_name.clone()),
                _ => None,
            })
            .unwrap();
        assert!(saved.is_absolute());
        assert!(script.model_path().unwrap().is_absolute());
    }

    #[test]
    fn test_directives_follow_listing_kind() {
        let dir = tempfile::tempdir().unwrap();
        let bscs = mixed_bscs(&dir.path().join("model.struxml"));
        let script = FdScript::read_results(
            dir.path().join("model.struxml"),
            &bscs,
            &MapCase::new("Deadload").unwrap().of_one(),
            &MapComb::new("ULS").unwrap().of_one(),
        )
        .unwrap();

        let list_gens: Vec<&CmdListGen> = script.list_gens().collect();
        assert_eq!(list_gens.len(), 2);
        assert_ne!(list_gens[0].out_file(), list_gens[1].out_file());

        assert_eq!(list_gens[0].map_cases().len(), 1);
        assert!(list_gens[0].map_combs().is_empty());
        assert!(list_gens[1].map_cases().is_empty());
        assert_eq!(list_gens[1].map_combs()[0].name(), "ULS");
    }

    #[test]
    fn test_regional_flag_reaches_list_generation() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model.struxml");
        let mut bscs = mixed_bscs(&model);
        bscs[1].regional = true;
        let script = FdScript::read_results(&model, &bscs, &[], &[]).unwrap();
        let regional: Vec<bool> = script.list_gens().map(|lg| lg.regional).collect();
        assert_eq!(regional, [false, true]);
    }
}
