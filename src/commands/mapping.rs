//! Load case / load combination selectors for `cmdlistgen`

use crate::error::{FdError, FdResult};
use crate::xml::Element;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Directive {
    name: String,
    index: Option<u32>,
}

impl Directive {
    fn new(kind: &str, name: String) -> FdResult<Self> {
        if name.trim().is_empty() {
            return Err(FdError::MalformedMapping(format!("{} name is empty", kind)));
        }
        Ok(Self { name, index: None })
    }

    fn resolve_index(&mut self, position: usize) {
        if self.index.is_none() {
            self.index = Some(position as u32);
        }
    }

    fn to_element(&self, tag: &str, position: usize) -> Element {
        let index = self.index.unwrap_or(position as u32);
        Element::new(tag)
            .attr("oname", self.name.as_str())
            .attr("idx", index.to_string())
    }

    fn from_element(kind: &str, element: &Element) -> FdResult<Self> {
        let name = element
            .get_attr("oname")
            .ok_or_else(|| FdError::MalformedMapping(format!("{} without oname", kind)))?;
        let raw = element
            .get_attr("idx")
            .ok_or_else(|| FdError::MalformedMapping(format!("{} '{}' without idx", kind, name)))?;
        let index = raw.trim().parse::<u32>().map_err(|_| {
            FdError::MalformedMapping(format!("{} '{}' has invalid idx '{}'", kind, name, raw))
        })?;
        let mut directive = Self::new(kind, name.to_string())?;
        directive.index = Some(index);
        Ok(directive)
    }
}

/// Binds a named load case to a position inside a list-generation command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapCase(Directive);

impl MapCase {
    pub const TAG: &'static str = "mapcase";

    /// Fails with `MalformedMapping` when `name` is blank.
    pub fn new(name: impl Into<String>) -> FdResult<Self> {
        Directive::new("load case", name.into()).map(Self)
    }

    /// Override the positional index
    pub fn with_index(mut self, index: u32) -> Self {
        self.0.index = Some(index);
        self
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Explicit or resolved index. `None` until the owning command assigns one.
    pub fn index(&self) -> Option<u32> {
        self.0.index
    }

    pub fn of_one(self) -> Vec<Self> {
        vec![self]
    }

    pub(crate) fn resolve_index(&mut self, position: usize) {
        self.0.resolve_index(position)
    }

    pub(crate) fn to_element(&self, position: usize) -> Element {
        self.0.to_element(Self::TAG, position)
    }

    pub(crate) fn from_element(element: &Element) -> FdResult<Self> {
        Directive::from_element("load case", element).map(Self)
    }
}

/// Binds a named load combination to a position inside a list-generation command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapComb(Directive);

impl MapComb {
    pub const TAG: &'static str = "mapcomb";

    pub fn new(name: impl Into<String>) -> FdResult<Self> {
        Directive::new("load combination", name.into()).map(Self)
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.0.index = Some(index);
        self
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn index(&self) -> Option<u32> {
        self.0.index
    }

    pub fn of_one(self) -> Vec<Self> {
        vec![self]
    }

    pub(crate) fn resolve_index(&mut self, position: usize) {
        self.0.resolve_index(position)
    }

    pub(crate) fn to_element(&self, position: usize) -> Element {
        self.0.to_element(Self::TAG, position)
    }

    pub(crate) fn from_element(element: &Element) -> FdResult<Self> {
        Directive::from_element("load combination", element).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_fails_fast() {
        assert!(matches!(MapCase::new(""), Err(FdError::MalformedMapping(_))));
        assert!(matches!(MapComb::new("   "), Err(FdError::MalformedMapping(_))));
    }

    #[test]
    fn test_index_defaults_to_position() {
        let mut case = MapCase::new("Deadload").unwrap();
        assert_eq!(case.index(), None);
        case.resolve_index(3);
        assert_eq!(case.index(), Some(3));

        let mut explicit = MapCase::new("Liveload").unwrap().with_index(7);
        explicit.resolve_index(0);
        assert_eq!(explicit.index(), Some(7));
    }

    #[test]
    fn test_of_one() {
        let combs = MapComb::new("ULS").unwrap().of_one();
        assert_eq!(combs.len(), 1);
        assert_eq!(combs[0].name(), "ULS");
    }

    #[test]
    fn test_negative_wire_index_is_malformed() {
        let element = Element::new("mapcase").attr("oname", "Deadload").attr("idx", "-1");
        assert!(matches!(
            MapCase::from_element(&element),
            Err(FdError::MalformedMapping(_))
        ));
    }

    #[test]
    fn test_wire_form() {
        let element = MapComb::new("ULS").unwrap().with_index(2).to_element(0);
        assert_eq!(element.name, "mapcomb");
        assert_eq!(element.get_attr("oname"), Some("ULS"));
        assert_eq!(element.get_attr("idx"), Some("2"));
    }
}
