pub mod defaults;
pub mod editor;
pub mod ingest;
pub mod rules;
pub mod store;
pub mod timeline;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use store::{FlatFileStore, GraphStore, StoreError};

// --- View identifiers ---

/// Identifier of one independently addressable graph. Always sanitized to `[A-Za-z0-9-_]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewId(String);

impl ViewId {
    pub const ROOT: &'static str = "root";

    pub fn root() -> Self {
        ViewId(Self::ROOT.to_string())
    }

    /// Strip every character outside `[A-Za-z0-9-_]`. Only the literal `root` addresses
    /// the root view; an id that sanitizes to nothing is an ordinary (empty-named) sub view.
    pub fn sanitize(raw: &str) -> Self {
        ViewId(
            raw.chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                .collect(),
        )
    }

    pub fn is_root(&self) -> bool {
        self.0 == Self::ROOT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ViewId {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// --- Diagram types (matching the React Flow node/edge shape) ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Leaf nodes render as service boxes; group nodes are containers that can own a child view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum NodeKind {
    #[default]
    #[serde(rename = "custom", alias = "leaf")]
    Leaf,
    #[serde(rename = "customGroup", alias = "group")]
    Group,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Leaf => "leaf",
            NodeKind::Group => "group",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Service,
    Database,
    Interface,
    Security,
    Integration,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Service => "service",
            ServiceType::Database => "database",
            ServiceType::Interface => "interface",
            ServiceType::Security => "security",
            ServiceType::Integration => "integration",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Lucide icon name, e.g. "Server" or "Database"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<ServiceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    /// Transient UI flag. Accepted from clients, never written to disk.
    #[serde(rename = "isEditMode", default, skip_serializing)]
    pub edit_mode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    /// Free-form CSS payload handed to the widget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<serde_json::Value>,
    /// In-view nesting inside a group drawn on the same canvas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent: Option<String>,
    #[serde(default)]
    pub data: NodeData,
}

impl Node {
    pub fn is_group(&self) -> bool {
        self.kind == NodeKind::Group
    }

    /// Copy `size` into `style.width`/`style.height`, which is where the widget reads it.
    pub fn mirror_size_into_style(&mut self) {
        let Some(size) = self.size else { return };
        let style = self
            .style
            .get_or_insert_with(|| serde_json::Value::Object(Default::default()));
        if let Some(map) = style.as_object_mut() {
            map.insert("width".to_string(), size.width.into());
            map.insert("height".to_string(), size.height.into());
        }
    }

    /// The view this node drills into. Nothing guarantees a document exists for it.
    pub fn child_view(&self) -> ViewId {
        ViewId::sanitize(&self.id)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    #[default]
    Default,
    Straight,
    Step,
    Smoothstep,
    Simplebezier,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type", default)]
    pub kind: EdgeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub animated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Edge {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            kind: EdgeKind::Default,
            label: None,
            animated: false,
            style: None,
            source_handle: None,
            target_handle: None,
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// One view's content.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Copy with every transient UI field cleared, ready for persistence.
    pub fn without_transient(&self) -> Graph {
        let mut clean = self.clone();
        for node in &mut clean.nodes {
            node.data.edit_mode = false;
        }
        clean
    }

    pub fn set_edit_mode(&mut self, on: bool) {
        for node in &mut self.nodes {
            node.data.edit_mode = on;
        }
    }
}

// --- Rules catalog types ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Section {
    #[serde(rename = "General Banking")]
    GeneralBanking,
    Credit,
    Trade,
    Remittance,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::GeneralBanking,
        Section::Credit,
        Section::Trade,
        Section::Remittance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::GeneralBanking => "General Banking",
            Section::Credit => "Credit",
            Section::Trade => "Trade",
            Section::Remittance => "Remittance",
        }
    }

    pub fn parse(s: &str) -> Option<Section> {
        Section::ALL.into_iter().find(|sec| sec.as_str() == s)
    }

    /// Position in [`Section::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Section::GeneralBanking => 0,
            Section::Credit => 1,
            Section::Trade => 2,
            Section::Remittance => 3,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RuleType {
    #[serde(rename = "Hard Logic")]
    HardLogic,
    #[serde(rename = "AI Agents", alias = "AI-General")]
    AiAgents,
    #[serde(rename = "AI-RAG")]
    AiRag,
}

impl RuleType {
    pub const ALL: [RuleType; 3] = [RuleType::HardLogic, RuleType::AiAgents, RuleType::AiRag];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::HardLogic => "Hard Logic",
            RuleType::AiAgents => "AI Agents",
            RuleType::AiRag => "AI-RAG",
        }
    }

    pub fn parse(s: &str) -> Option<RuleType> {
        match s {
            "AI-General" => Some(RuleType::AiAgents),
            other => RuleType::ALL.into_iter().find(|t| t.as_str() == other),
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalog entry describing a compliance use case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub indicators: Vec<String>,
    pub section: Section,
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    #[serde(default)]
    pub risk: String,
}

// --- Timeline types ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseStatus {
    Planned,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelinePhase {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub dates: String,
    #[serde(default)]
    pub focus: String,
    #[serde(default)]
    pub deliverables: Vec<String>,
    #[serde(default)]
    pub testing: String,
    #[serde(default)]
    pub notes: String,
    pub status: PhaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holiday: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_everything_outside_the_allowed_set() {
        let id = ViewId::sanitize("../../etc/passwd");
        assert_eq!(id.as_str(), "etcpasswd");
        for raw in ["a b/c", "svc-1", "x_y.z", "ünïcode-ok", "%00"] {
            let id = ViewId::sanitize(raw);
            assert!(id
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        }
    }

    #[test]
    fn colliding_raw_ids_address_the_same_view() {
        assert_eq!(ViewId::sanitize("svc.1"), ViewId::sanitize("svc1"));
        assert_eq!(ViewId::sanitize("svc/1"), ViewId::sanitize("svc1"));
    }

    #[test]
    fn only_the_literal_root_id_is_root() {
        assert!(ViewId::sanitize("root").is_root());
        assert!(ViewId::sanitize("r/o/o/t").is_root());
        assert!(!ViewId::sanitize("///").is_root());
        assert_eq!(ViewId::sanitize("///").as_str(), "");
        assert!(!ViewId::sanitize("svc-1").is_root());
    }

    #[test]
    fn edit_mode_flag_is_read_but_never_written() {
        let raw = r#"{"id":"a","type":"custom","position":{"x":1,"y":2},
            "data":{"label":"A","isEditMode":true}}"#;
        let node: Node = serde_json::from_str(raw).unwrap();
        assert!(node.data.edit_mode);
        let out = serde_json::to_string(&node).unwrap();
        assert!(!out.contains("isEditMode"));
    }

    #[test]
    fn node_kind_accepts_widget_and_plain_names() {
        let group: Node =
            serde_json::from_str(r#"{"id":"g","type":"group","data":{"label":"G"}}"#).unwrap();
        assert_eq!(group.kind, NodeKind::Group);
        let widget: Node =
            serde_json::from_str(r#"{"id":"g","type":"customGroup","data":{"label":"G"}}"#)
                .unwrap();
        assert_eq!(widget.kind, NodeKind::Group);
        let json = serde_json::to_value(&widget).unwrap();
        assert_eq!(json["type"], "customGroup");
    }

    #[test]
    fn size_is_mirrored_into_existing_style() {
        let mut node: Node = serde_json::from_str(
            r#"{"id":"g","type":"customGroup","size":{"width":300,"height":200},
                "style":{"border":"1px dashed"},"data":{"label":"G"}}"#,
        )
        .unwrap();
        node.mirror_size_into_style();
        let style = node.style.unwrap();
        assert_eq!(style["width"], 300.0);
        assert_eq!(style["height"], 200.0);
        assert_eq!(style["border"], "1px dashed");
    }

    #[test]
    fn edge_defaults_apply_when_fields_are_missing() {
        let edge: Edge = serde_json::from_str(r#"{"id":"e1","source":"a","target":"b"}"#).unwrap();
        assert_eq!(edge.kind, EdgeKind::Default);
        assert!(!edge.animated);
        assert!(edge.label.is_none());
    }

    #[test]
    fn legacy_ai_general_classification_maps_to_agents() {
        let rule: Rule = serde_json::from_str(
            r#"{"id":"CR-001","title":"t","section":"Credit","type":"AI-General","risk":"High"}"#,
        )
        .unwrap();
        assert_eq!(rule.rule_type, RuleType::AiAgents);
        assert_eq!(RuleType::parse("AI-General"), Some(RuleType::AiAgents));
    }

    #[test]
    fn phase_status_uses_kebab_case() {
        let json = serde_json::to_string(&PhaseStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
    }
}
