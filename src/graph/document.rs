//! Serialized document form of a map.
//!
//! The wire shape is a flat record per node keyed by id, plus the root id:
//!
//! ```json
//! { "rootId": 0, "nodes": { "0": { "id": 0, "text": "Main Theme", "annotation": "",
//!                                  "parentId": null, "childrenId": [1] }, ... } }
//! ```
//!
//! Only text, annotation and structure are stored. Sizes, positions and
//! selection are derived state and are rebuilt on load.
//!
//! [`MapDocument::from_json`] also reads the older flat layout, where records
//! sit beside `rootId` at the top level, annotations are called `comment` and
//! the root's `parentId` is `-1`:
//!
//! ```json
//! { "rootId": 0, "0": { "id": 0, "text": "Main Theme", "comment": "",
//!                       "parentId": -1, "childrenId": [1] }, ... }
//! ```

use std::collections::{BTreeMap, HashSet, VecDeque};

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::node::NodeId;
use super::tree::MapTree;
use crate::error::{MapError, MapResult};

/// One node record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentNode {
    pub id: u32,
    pub text: String,
    #[serde(default, alias = "comment")]
    pub annotation: String,
    #[serde(default, deserialize_with = "parent_ref")]
    pub parent_id: Option<u32>,
    #[serde(default)]
    pub children_id: Vec<u32>,
}

/// A whole map, as exchanged with the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDocument {
    pub root_id: u32,
    pub nodes: BTreeMap<u32, DocumentNode>,
}

impl MapDocument {
    /// Snapshot the tree.
    pub fn from_tree(tree: &MapTree) -> Self {
        let nodes = tree
            .pre_order()
            .into_iter()
            .filter_map(|id| tree.node(id))
            .map(|node| {
                let record = DocumentNode {
                    id: node.id().raw(),
                    text: node.text().to_string(),
                    annotation: node.annotation().to_string(),
                    parent_id: node.parent().map(NodeId::raw),
                    children_id: node.children().iter().map(|c| c.raw()).collect(),
                };
                (record.id, record)
            })
            .collect();
        Self {
            root_id: tree.root_id().raw(),
            nodes,
        }
    }

    /// Parse the JSON wire form, nested or flat.
    pub fn from_json(json: &str) -> MapResult<Self> {
        let value: Value = serde_json::from_str(json).map_err(malformed)?;
        if value.get("nodes").is_some() {
            return serde_json::from_value(value).map_err(malformed);
        }
        Self::from_flat(value)
    }

    /// Records keyed by integer strings beside `rootId`. Other keys are ignored.
    fn from_flat(value: Value) -> MapResult<Self> {
        let Value::Object(fields) = value else {
            return Err(MapError::MalformedDocument("document is not an object".to_string()));
        };
        let mut root_id = None;
        let mut nodes = BTreeMap::new();
        for (key, field) in fields {
            if key == "rootId" {
                root_id = Some(serde_json::from_value::<u32>(field).map_err(malformed)?);
                continue;
            }
            let Ok(id) = key.parse::<u32>() else {
                continue;
            };
            let record: DocumentNode = serde_json::from_value(field).map_err(malformed)?;
            nodes.insert(id, record);
        }
        let root_id =
            root_id.ok_or_else(|| MapError::MalformedDocument("missing field `rootId`".to_string()))?;
        debug!(nodes = nodes.len(), "read flat document");
        Ok(Self { root_id, nodes })
    }

    pub fn to_json(&self) -> MapResult<String> {
        serde_json::to_string(self).map_err(malformed)
    }

    /// Replace the contents of `tree` with this document.
    ///
    /// Nodes are re-inserted breadth-first from the root, so ids are freshly
    /// assigned. Child references to missing records are skipped, as are
    /// records reached a second time. Fails without touching `tree` if the root
    /// record is missing.
    pub fn load_into(&self, tree: &mut MapTree) -> MapResult<NodeId> {
        let root_record = self.nodes.get(&self.root_id).ok_or_else(|| {
            MapError::MalformedDocument(format!("root record {} is missing", self.root_id))
        })?;

        let root = tree.reset(&root_record.text);
        tree.annotate(root, &root_record.annotation)?;

        let mut visited = HashSet::from([self.root_id]);
        let mut queue = VecDeque::from([(root_record, root)]);
        let mut skipped = 0usize;

        while let Some((record, parent)) = queue.pop_front() {
            for child_id in &record.children_id {
                let Some(child) = self.nodes.get(child_id) else {
                    skipped += 1;
                    continue;
                };
                if !visited.insert(*child_id) {
                    skipped += 1;
                    continue;
                }
                let id = tree.insert(parent, Some(child.text.as_str()), None)?;
                tree.annotate(id, &child.annotation)?;
                queue.push_back((child, id));
            }
        }

        if skipped > 0 {
            warn!(skipped, "document had dangling or repeated child references");
        }
        debug!(nodes = tree.len(), "loaded document");
        Ok(root)
    }
}

fn malformed(err: serde_json::Error) -> MapError {
    MapError::MalformedDocument(err.to_string())
}

/// `parentId` as written: absent, `null` or negative all mean "no parent".
fn parent_ref<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<i64>::deserialize(deserializer)? {
        Some(raw) if raw >= 0 => u32::try_from(raw).map(Some).map_err(de::Error::custom),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;
    use crate::style::MonospaceMeasure;

    fn tree() -> MapTree {
        MapTree::new(Box::new(MonospaceMeasure::default()), &MapConfig::default())
    }

    fn texts(tree: &MapTree) -> Vec<String> {
        tree.pre_order()
            .into_iter()
            .map(|id| tree.node(id).unwrap().text().to_string())
            .collect()
    }

    #[test]
    fn test_snapshot_records() {
        let mut tree = tree();
        let r = tree.root_id();
        let a = tree.insert(r, Some("a"), None).unwrap();
        tree.annotate(a, "note").unwrap();

        let doc = MapDocument::from_tree(&tree);
        assert_eq!(doc.root_id, 0);
        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.nodes[&0].parent_id, None);
        assert_eq!(doc.nodes[&0].children_id, vec![1]);
        assert_eq!(doc.nodes[&1].parent_id, Some(0));
        assert_eq!(doc.nodes[&1].annotation, "note");
    }

    #[test]
    fn test_round_trip_preserves_shape_and_text() {
        let mut source = tree();
        let r = source.root_id();
        let a = source.insert(r, Some("a"), None).unwrap();
        let b = source.insert(r, Some("b"), None).unwrap();
        source.insert(a, Some("a1"), None).unwrap();
        source.insert(b, Some("b1"), None).unwrap();
        source.delete(a);
        source.insert(r, Some("c"), Some(0)).unwrap();

        let doc = MapDocument::from_tree(&source);
        let mut target = tree();
        doc.load_into(&mut target).unwrap();

        assert_eq!(texts(&target), texts(&source));
        assert_eq!(target.len(), source.len());
        assert!(target.check_consistency().is_ok());
    }

    #[test]
    fn test_json_wire_shape() {
        let tree = tree();
        let json = serde_json::to_value(MapDocument::from_tree(&tree)).unwrap();
        assert_eq!(json["rootId"], 0);
        assert_eq!(json["nodes"]["0"]["text"], "Main Theme");
        assert!(json["nodes"]["0"]["parentId"].is_null());
        assert_eq!(json["nodes"]["0"]["childrenId"], serde_json::json!([]));
    }

    #[test]
    fn test_legacy_comment_field_and_bad_json() {
        let json = r#"{ "rootId": 0, "nodes": { "0": { "id": 0, "text": "r", "comment": "old" } } }"#;
        let doc = MapDocument::from_json(json).unwrap();
        assert_eq!(doc.nodes[&0].annotation, "old");
        assert!(matches!(
            MapDocument::from_json("{ not json"),
            Err(MapError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_missing_root_is_rejected_without_change() {
        let mut target = tree();
        target.insert(target.root_id(), Some("keep"), None).unwrap();
        let doc = MapDocument {
            root_id: 5,
            nodes: BTreeMap::new(),
        };
        assert!(matches!(
            doc.load_into(&mut target),
            Err(MapError::MalformedDocument(_))
        ));
        assert_eq!(target.len(), 2);
    }

    #[test]
    fn test_dangling_and_cyclic_children_are_skipped() {
        let json = r#"{
            "rootId": 3,
            "nodes": {
                "3": { "id": 3, "text": "root", "childrenId": [8, 9] },
                "8": { "id": 8, "text": "eight", "parentId": 3, "childrenId": [3, 8] }
            }
        }"#;
        let doc = MapDocument::from_json(json).unwrap();
        let mut target = tree();
        let root = doc.load_into(&mut target).unwrap();

        assert_eq!(root, NodeId(0));
        assert_eq!(texts(&target), vec!["root", "eight"]);
        assert!(target.check_consistency().is_ok());
    }

    #[test]
    fn test_flat_layout_with_negative_parent_loads() {
        let json = r#"{
            "rootId": 0,
            "0": { "id": 0, "text": "Main Theme", "comment": "", "parentId": -1, "childrenId": [1, 2] },
            "1": { "id": 1, "text": "left", "comment": "note", "parentId": 0, "childrenId": [3] },
            "2": { "id": 2, "text": "right", "comment": "", "parentId": 0, "childrenId": [] },
            "3": { "id": 3, "text": "leaf", "comment": "", "parentId": 1, "childrenId": [] }
        }"#;
        let doc = MapDocument::from_json(json).unwrap();
        assert_eq!(doc.root_id, 0);
        assert_eq!(doc.nodes.len(), 4);
        assert_eq!(doc.nodes[&0].parent_id, None);
        assert_eq!(doc.nodes[&3].parent_id, Some(1));
        assert_eq!(doc.nodes[&1].annotation, "note");

        let mut target = tree();
        let root = doc.load_into(&mut target).unwrap();
        assert_eq!(texts(&target), vec!["Main Theme", "left", "leaf", "right"]);
        let left = target.children(root).unwrap()[0];
        assert_eq!(target.node(left).unwrap().annotation(), "note");
        assert!(target.check_consistency().is_ok());

        // Saving writes the nested form, which reads back to the same records.
        let saved = MapDocument::from_tree(&target).to_json().unwrap();
        assert_eq!(MapDocument::from_json(&saved).unwrap(), MapDocument::from_tree(&target));
    }

    #[test]
    fn test_flat_layout_without_root_id_is_rejected() {
        let json = r#"{ "0": { "id": 0, "text": "r", "parentId": -1, "childrenId": [] } }"#;
        assert!(matches!(
            MapDocument::from_json(json),
            Err(MapError::MalformedDocument(_))
        ));
        assert!(matches!(
            MapDocument::from_json("[1, 2]"),
            Err(MapError::MalformedDocument(_))
        ));
    }
}
