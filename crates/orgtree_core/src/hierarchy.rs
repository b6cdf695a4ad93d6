//! Sector hierarchy reconstruction.
//!
//! # Responsibility
//! - Turn the flat sector list of one organization into a nested tree.
//!
//! # Invariants
//! - Pure: never touches storage and never mutates its input.
//! - The first `depth == 0` element is the root; none yields `RootNotFound`.
//! - Siblings keep input order, so equal input gives equal output.
//! - Each sector appears at most once, even if stored parent links loop.

use crate::error::{CoreError, CoreResult};
use crate::model::sector::{Sector, SectorId, SectorStatus};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// One node of a reconstructed sector tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectorTreeNode {
    /// Internal row id, not exposed to API consumers.
    #[serde(skip_serializing)]
    pub id: SectorId,
    pub code: String,
    pub label: String,
    pub depth: u32,
    pub status: SectorStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SectorTreeNode>,
}

impl SectorTreeNode {
    /// Counts every node below this one.
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }

    /// Finds a node by code in this subtree, depth-first.
    pub fn find(&self, code: &str) -> Option<&SectorTreeNode> {
        if self.code == code {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(code))
    }
}

/// Builds the nested tree for one organization's sectors.
///
/// Runs in O(n): children are indexed by parent id once, then expanded
/// depth-first from the root. Sectors not reachable from the root (for
/// example grandchildren orphaned by a shallow delete) are left out.
///
/// # Errors
/// - `CoreError::RootNotFound` when no element has `depth == 0`.
pub fn build_tree(nodes: &[Sector]) -> CoreResult<SectorTreeNode> {
    let root = nodes
        .iter()
        .find(|node| node.depth == 0)
        .ok_or(CoreError::RootNotFound)?;

    let mut children_of: HashMap<SectorId, Vec<&Sector>> = HashMap::new();
    for node in nodes {
        if let Some(parent_id) = node.parent_id {
            children_of.entry(parent_id).or_default().push(node);
        }
    }

    let mut expanded = HashSet::from([root.id]);
    Ok(expand(root, &children_of, &mut expanded))
}

fn expand(
    node: &Sector,
    children_of: &HashMap<SectorId, Vec<&Sector>>,
    expanded: &mut HashSet<SectorId>,
) -> SectorTreeNode {
    let mut children = Vec::new();
    if let Some(direct) = children_of.get(&node.id) {
        for child in direct {
            if expanded.insert(child.id) {
                children.push(expand(child, children_of, expanded));
            }
        }
    }

    SectorTreeNode {
        id: node.id,
        code: node.code.clone(),
        label: node.label.clone(),
        depth: node.depth,
        status: node.status,
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::build_tree;
    use crate::error::CoreError;
    use crate::model::sector::{Sector, SectorId, SectorStatus};

    fn sector(id: SectorId, code: &str, parent_id: Option<SectorId>, depth: u32) -> Sector {
        Sector {
            id,
            tenant_id: 1,
            org_id: 1,
            code: code.to_string(),
            label: code.to_uppercase(),
            parent_id,
            has_parent: parent_id.is_some(),
            depth,
            status: SectorStatus::Active,
        }
    }

    fn sample() -> Vec<Sector> {
        vec![
            sector(3, "c", Some(2), 2),
            sector(1, "a", None, 0),
            sector(2, "b", Some(1), 1),
            sector(4, "d", Some(1), 1),
        ]
    }

    #[test]
    fn builds_nested_tree_from_unordered_rows() {
        let tree = build_tree(&sample()).unwrap();

        assert_eq!(tree.code, "a");
        assert_eq!(tree.descendant_count(), 3);
        let child_codes: Vec<&str> = tree.children.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(child_codes, vec!["b", "d"]);

        let b = tree.find("b").unwrap();
        assert_eq!(b.children.len(), 1);
        assert_eq!(b.children[0].code, "c");
        assert_eq!(b.children[0].depth, 2);
        assert!(tree.find("d").unwrap().children.is_empty());
    }

    #[test]
    fn missing_root_is_reported() {
        let nodes = vec![sector(2, "b", Some(1), 1)];
        let err = build_tree(&nodes).unwrap_err();
        assert!(matches!(err, CoreError::RootNotFound));
    }

    #[test]
    fn empty_input_has_no_root() {
        assert!(matches!(build_tree(&[]), Err(CoreError::RootNotFound)));
    }

    #[test]
    fn repeated_builds_are_identical_and_leave_input_untouched() {
        let nodes = sample();
        let snapshot = nodes.clone();

        let first = build_tree(&nodes).unwrap();
        let second = build_tree(&nodes).unwrap();

        assert_eq!(first, second);
        assert_eq!(nodes, snapshot);
    }

    #[test]
    fn orphaned_rows_are_not_attached() {
        // "c" points at a parent that is no longer present.
        let nodes = vec![sector(1, "a", None, 0), sector(3, "c", Some(2), 2)];
        let tree = build_tree(&nodes).unwrap();
        assert_eq!(tree.descendant_count(), 0);
    }

    #[test]
    fn looping_parent_links_do_not_recurse_forever() {
        // a -> d -> b, and b is (corruptly) recorded as the parent of a.
        let nodes = vec![
            sector(1, "a", Some(2), 0),
            sector(4, "d", Some(1), 1),
            sector(2, "b", Some(4), 2),
        ];
        let tree = build_tree(&nodes).unwrap();
        assert_eq!(tree.code, "a");
        assert_eq!(tree.descendant_count(), 2);
        assert_eq!(tree.children[0].children[0].code, "b");
        assert!(tree.children[0].children[0].children.is_empty());
    }

    #[test]
    fn serialized_tree_hides_ids_and_empty_children() {
        let tree = build_tree(&sample()).unwrap();
        let value = serde_json::to_value(&tree).unwrap();

        assert!(value.get("id").is_none());
        assert_eq!(value["code"], "a");
        assert_eq!(value["status"], "active");
        assert_eq!(value["children"][0]["children"][0]["code"], "c");
        assert!(value["children"][1].get("children").is_none());
    }
}
