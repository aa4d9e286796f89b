//! Result categories, typed records and the listing reader

use std::collections::HashMap;

use serde::Serialize;

pub mod category;
pub mod reader;
pub mod records;

pub use category::{LoadKind, RecordShape, ResultCategory, ResultRequest};
pub use reader::{BatchOutcome, FileOutcome, ResultsReader};
pub use records::{
    BarResult, FemBar, FemNode, FemShell, GenericResult, NodeResult, ResultRecord, ShellResult,
};

/// Records of one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultGroup {
    pub category: ResultCategory,
    pub records: Vec<ResultRecord>,
}

/// Group records by category. Groups appear in the order their category is
/// first seen, records keep their relative order.
pub fn group_by_category(records: impl IntoIterator<Item = ResultRecord>) -> Vec<ResultGroup> {
    let mut groups: Vec<ResultGroup> = Vec::new();
    let mut index: HashMap<ResultCategory, usize> = HashMap::new();
    for record in records {
        let category = record.category();
        let slot = *index.entry(category).or_insert_with(|| {
            groups.push(ResultGroup {
                category,
                records: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].records.push(record);
    }
    groups
}

/// Mesh topology assembled from the node, bar and shell listings
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FiniteElement {
    nodes: Vec<FemNode>,
    bars: Vec<FemBar>,
    shells: Vec<FemShell>,
}

impl FiniteElement {
    pub fn new(nodes: Vec<FemNode>, bars: Vec<FemBar>, shells: Vec<FemShell>) -> Self {
        Self {
            nodes,
            bars,
            shells,
        }
    }

    /// Pick the topology records out of a mixed record list
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ResultRecord>) -> Self {
        let mut fe = Self::default();
        for record in records {
            match record {
                ResultRecord::FemNode(node) => fe.nodes.push(node.clone()),
                ResultRecord::FemBar(bar) => fe.bars.push(bar.clone()),
                ResultRecord::FemShell(shell) => fe.shells.push(shell.clone()),
                _ => {}
            }
        }
        fe
    }

    pub fn nodes(&self) -> &[FemNode] {
        &self.nodes
    }

    pub fn bars(&self) -> &[FemBar] {
        &self.bars
    }

    pub fn shells(&self) -> &[FemShell] {
        &self.shells
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.bars.is_empty() && self.shells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u32) -> ResultRecord {
        ResultRecord::FemNode(FemNode { id, x: 0.0, y: 0.0, z: 0.0 })
    }

    fn bar(id: &str) -> ResultRecord {
        ResultRecord::FemBar(FemBar {
            id: id.to_string(),
            element_id: 1,
            nodes: [1, 2],
        })
    }

    #[test]
    fn test_grouping_keeps_first_seen_order() {
        let groups = group_by_category(vec![bar("B.1"), node(1), bar("B.2"), node(2)]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, ResultCategory::FemBar);
        assert_eq!(groups[0].records, [bar("B.1"), bar("B.2")]);
        assert_eq!(groups[1].records, [node(1), node(2)]);
    }

    #[test]
    fn test_finite_element_from_mixed_records() {
        let records = vec![node(1), bar("B.1"), node(2)];
        let fe = FiniteElement::from_records(&records);
        assert_eq!(fe.nodes().len(), 2);
        assert_eq!(fe.bars().len(), 1);
        assert!(fe.shells().is_empty());
        assert!(!fe.is_empty());
    }
}
