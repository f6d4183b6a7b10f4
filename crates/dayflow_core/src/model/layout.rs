//! Named layouts and the persisted application root.
//!
//! # Responsibility
//! - Hold one top-level node sequence per named layout.
//! - Provide the built-in defaults used on first start and after reset.
//!
//! # Invariants
//! - `AppData::layouts` is never empty once loaded.
//! - `active_layout_id` names a layout in `layouts` after `normalize`.

use crate::model::node::{LeafKind, LeafNode, Node, NodeAttrs, NodeBody, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Layout identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutId(String);

impl LayoutId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a fresh identifier for a user-created layout.
    pub fn generate() -> Self {
        Self(format!("layout-{}", Uuid::now_v7().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for LayoutId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayoutId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One named schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub id: LayoutId,
    pub name: String,
    pub nodes: Vec<Node>,
}

impl Layout {
    /// Creates an empty layout.
    pub fn empty(id: LayoutId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            nodes: Vec::new(),
        }
    }
}

/// Persisted root record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    pub layouts: Vec<Layout>,
    pub active_layout_id: LayoutId,
}

impl AppData {
    /// Built-in layouts: a sample day (active) and a blank canvas.
    pub fn builtin() -> Self {
        Self {
            layouts: vec![sample_day_layout(), Layout::empty(blank_layout_id(), "空白布局")],
            active_layout_id: sample_layout_id(),
        }
    }

    pub fn layout(&self, id: &LayoutId) -> Option<&Layout> {
        self.layouts.iter().find(|layout| &layout.id == id)
    }

    pub fn layout_mut(&mut self, id: &LayoutId) -> Option<&mut Layout> {
        self.layouts.iter_mut().find(|layout| &layout.id == id)
    }

    pub fn active_layout(&self) -> Option<&Layout> {
        self.layout(&self.active_layout_id)
    }

    /// Points `active_layout_id` at an existing layout.
    ///
    /// Returns `false` when the stored id was unknown and the first layout
    /// was selected instead, or when there are no layouts at all.
    pub fn normalize(&mut self) -> bool {
        if self.active_layout().is_some() {
            return true;
        }
        if let Some(first) = self.layouts.first() {
            self.active_layout_id = first.id.clone();
        }
        false
    }

    /// Returns a copy whose active layout holds `active_nodes`.
    pub fn merged(&self, active_nodes: &[Node]) -> Self {
        let mut merged = self.clone();
        if let Some(layout) = merged.layout_mut(&self.active_layout_id) {
            layout.nodes = active_nodes.to_vec();
        }
        merged
    }
}

fn sample_layout_id() -> LayoutId {
    LayoutId::new("layout-default")
}

fn blank_layout_id() -> LayoutId {
    LayoutId::new("layout-blank")
}

fn attrs(title: &str, subtitle: Option<&str>, duration: Option<&str>, icon: &str) -> NodeAttrs {
    NodeAttrs {
        title: title.to_string(),
        subtitle: subtitle.map(str::to_string),
        duration: duration.map(str::to_string),
        icon: Some(icon.to_string()),
        color: None,
        dashed: false,
    }
}

fn leaf(id: &str, kind: LeafKind, node_attrs: NodeAttrs) -> Node {
    LeafNode::new(NodeId::new(id), kind, node_attrs).into()
}

fn sample_day_layout() -> Layout {
    let nodes = vec![
        leaf("d-wake", LeafKind::Time, attrs("07:00", Some("起床"), None, "sun")),
        leaf(
            "d-run",
            LeafKind::Task,
            attrs("晨跑", Some("河边跑道"), Some("30分钟"), "activity"),
        ),
        leaf("d-office", LeafKind::Place, attrs("公司", None, None, "map-pin")),
        Node {
            id: NodeId::new("d-focus"),
            attrs: attrs("专注工作", Some("上午核心时段"), Some("3小时"), "briefcase"),
            body: NodeBody::Block {
                side_events: vec![LeafNode::new(
                    NodeId::new("d-focus-1"),
                    LeafKind::Task,
                    attrs("回复消息", None, Some("10分钟"), "message-circle"),
                )],
                custom_width: None,
                custom_height: None,
            },
        },
        Node {
            id: NodeId::new("d-lunch"),
            attrs: attrs("午休", None, Some("1小时"), "git-branch"),
            body: NodeBody::Branch {
                branches: vec![
                    LeafNode::new(
                        NodeId::new("d-lunch-1"),
                        LeafKind::Task,
                        attrs("吃饭", None, None, "coffee"),
                    ),
                    LeafNode::new(
                        NodeId::new("d-lunch-2"),
                        LeafKind::Task,
                        attrs("散步", None, None, "navigation"),
                    ),
                ],
            },
        },
        leaf("d-sleep", LeafKind::Time, attrs("23:00", Some("睡觉"), None, "moon")),
    ];

    Layout {
        id: sample_layout_id(),
        name: "我的一天".to_string(),
        nodes,
    }
}

#[cfg(test)]
mod tests {
    use super::{AppData, LayoutId};
    use crate::tree::node_ids;
    use std::collections::HashSet;

    #[test]
    fn builtin_has_two_layouts_with_unique_ids() {
        let data = AppData::builtin();
        assert_eq!(data.layouts.len(), 2);
        assert_eq!(data.active_layout().unwrap().name, "我的一天");

        let ids = node_ids(&data.layouts[0].nodes);
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(ids.len(), unique.len());
        assert!(data.layouts[1].nodes.is_empty());
    }

    #[test]
    fn normalize_falls_back_to_first_layout() {
        let mut data = AppData::builtin();
        data.active_layout_id = LayoutId::new("missing");
        assert!(!data.normalize());
        assert_eq!(data.active_layout_id, data.layouts[0].id);
    }

    #[test]
    fn merged_replaces_only_active_nodes() {
        let data = AppData::builtin();
        let merged = data.merged(&[]);
        assert!(merged.layouts[0].nodes.is_empty());
        assert_eq!(merged.layouts[1], data.layouts[1]);
        assert_eq!(data.layouts[0].nodes.len(), 6);
    }
}
