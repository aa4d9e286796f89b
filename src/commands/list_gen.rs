//! `cmdlistgen`: export one result listing to a file

use std::path::{Path, PathBuf};

use super::mapping::{MapCase, MapComb};
use super::{absolute, expect_command, flag, path_text, read_flag, tags};
use crate::error::FdResult;
use crate::xml::Element;

/// List-generation command.
///
/// Both paths are made absolute when the command is built, so a script stays
/// valid whatever directory the engine is started from.
#[derive(Debug, Clone, PartialEq)]
pub struct CmdListGen {
    bsc_file: PathBuf,
    out_file: PathBuf,
    pub regional: bool,
    pub headers: bool,
    pub fill_cells: bool,
    pub ignore_case_name: bool,
    map_cases: Vec<MapCase>,
    map_combs: Vec<MapComb>,
}

impl CmdListGen {
    pub const COMMAND: &'static str = "$ MODULECOM LISTGEN";

    /// Headers and filled cells on, case names kept.
    pub fn new(bsc_path: impl AsRef<Path>, out_path: impl AsRef<Path>, regional: bool) -> FdResult<Self> {
        Ok(Self {
            bsc_file: absolute(bsc_path.as_ref())?,
            out_file: absolute(out_path.as_ref())?,
            regional,
            headers: true,
            fill_cells: true,
            ignore_case_name: false,
            map_cases: Vec::new(),
            map_combs: Vec::new(),
        })
    }

    /// Same defaults as [`CmdListGen::new`], with case and combination
    /// selectors. Selectors without an explicit index get their position.
    pub fn with_mappings(
        bsc_path: impl AsRef<Path>,
        out_path: impl AsRef<Path>,
        regional: bool,
        map_cases: impl IntoIterator<Item = MapCase>,
        map_combs: impl IntoIterator<Item = MapComb>,
    ) -> FdResult<Self> {
        let mut cmd = Self::new(bsc_path, out_path, regional)?;
        cmd.map_cases = map_cases.into_iter().collect();
        cmd.map_combs = map_combs.into_iter().collect();
        for (position, case) in cmd.map_cases.iter_mut().enumerate() {
            case.resolve_index(position);
        }
        for (position, comb) in cmd.map_combs.iter_mut().enumerate() {
            comb.resolve_index(position);
        }
        Ok(cmd)
    }

    pub fn bsc_file(&self) -> &Path {
        &self.bsc_file
    }

    pub fn out_file(&self) -> &Path {
        &self.out_file
    }

    pub fn map_cases(&self) -> &[MapCase] {
        &self.map_cases
    }

    pub fn map_combs(&self) -> &[MapComb] {
        &self.map_combs
    }

    pub fn to_element(&self) -> FdResult<Element> {
        let element = Element::new(tags::LIST_GEN)
            .attr("command", Self::COMMAND)
            .attr("bscfile", path_text(&self.bsc_file)?)
            .attr("outfile", path_text(&self.out_file)?)
            .attr("regional", flag(self.regional))
            .attr("headers", flag(self.headers))
            .attr("fillcells", flag(self.fill_cells))
            .attr("ignorecasename", flag(self.ignore_case_name))
            .with_children(
                self.map_cases
                    .iter()
                    .enumerate()
                    .map(|(position, case)| case.to_element(position)),
            )
            .with_children(
                self.map_combs
                    .iter()
                    .enumerate()
                    .map(|(position, comb)| comb.to_element(position)),
            );
        Ok(element)
    }

    pub fn from_element(element: &Element) -> FdResult<Self> {
        element.expect_name(tags::LIST_GEN)?;
        expect_command(element, Self::COMMAND)?;

        let mut cmd = Self::new(
            element.require_attr("bscfile")?,
            element.require_attr("outfile")?,
            read_flag(element, "regional")?,
        )?;
        cmd.headers = read_flag(element, "headers")?;
        cmd.fill_cells = read_flag(element, "fillcells")?;
        // Older scripts omit the attribute; the engine treats that as 0.
        cmd.ignore_case_name = match element.get_attr("ignorecasename") {
            Some(_) => read_flag(element, "ignorecasename")?,
            None => false,
        };
        cmd.map_cases = element
            .find_all(MapCase::TAG)
            .map(MapCase::from_element)
            .collect::<FdResult<_>>()?;
        cmd.map_combs = element
            .find_all(MapComb::TAG)
            .map(MapComb::from_element)
            .collect::<FdResult<_>>()?;
        Ok(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FdError;

    #[test]
    fn test_relative_paths_become_absolute() {
        let cmd = CmdListGen::new("a.bsc", "./", false).unwrap();
        assert!(cmd.bsc_file().is_absolute());
        assert!(cmd.out_file().is_absolute());
        assert!(cmd.bsc_file().ends_with("a.bsc"));
    }

    #[test]
    fn test_empty_path_is_a_resolution_error() {
        let err = CmdListGen::new("", "out.csv", false).unwrap_err();
        assert!(matches!(err, FdError::PathResolution { .. }));
    }

    #[test]
    fn test_default_flags() {
        let cmd = CmdListGen::new("a.bsc", "out.csv", true).unwrap();
        assert!(cmd.regional);
        assert!(cmd.headers);
        assert!(cmd.fill_cells);
        assert!(!cmd.ignore_case_name);
    }

    #[test]
    fn test_attribute_order() {
        let element = CmdListGen::new("a.bsc", "out.csv", false)
            .unwrap()
            .to_element()
            .unwrap();
        let keys: Vec<&str> = element.attributes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            ["command", "bscfile", "outfile", "regional", "headers", "fillcells", "ignorecasename"]
        );
        assert_eq!(element.get_attr("command"), Some("$ MODULECOM LISTGEN"));
    }

    #[test]
    fn test_flags_survive_the_wire() {
        for bits in 0..16u8 {
            let mut cmd = CmdListGen::new("a.bsc", "out.csv", bits & 1 != 0).unwrap();
            cmd.headers = bits & 2 != 0;
            cmd.fill_cells = bits & 4 != 0;
            cmd.ignore_case_name = bits & 8 != 0;

            let element = cmd.to_element().unwrap();
            for key in ["regional", "headers", "fillcells", "ignorecasename"] {
                let value = element.get_attr(key).unwrap();
                assert!(value == "0" || value == "1");
            }
            assert_eq!(CmdListGen::from_element(&element).unwrap(), cmd);
        }
    }

    #[test]
    fn test_mappings_are_indexed_by_position() {
        let cmd = CmdListGen::with_mappings(
            "a.bsc",
            "out.csv",
            false,
            vec![MapCase::new("Deadload").unwrap(), MapCase::new("Liveload").unwrap()],
            MapComb::new("ULS").unwrap().with_index(4).of_one(),
        )
        .unwrap();

        let indices: Vec<Option<u32>> = cmd.map_cases().iter().map(|c| c.index()).collect();
        assert_eq!(indices, [Some(0), Some(1)]);
        assert_eq!(cmd.map_combs()[0].index(), Some(4));

        let element = cmd.to_element().unwrap();
        let names: Vec<&str> = element.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["mapcase", "mapcase", "mapcomb"]);
        assert_eq!(CmdListGen::from_element(&element).unwrap(), cmd);
    }

    #[test]
    fn test_single_directive_or_none() {
        let one = CmdListGen::with_mappings(
            "a.bsc",
            "out.csv",
            false,
            Some(MapCase::new("Deadload").unwrap()),
            None::<MapComb>,
        )
        .unwrap();
        assert_eq!(one.map_cases().len(), 1);
        assert!(one.map_combs().is_empty());
    }
}
