//! Diagram editor session: an in-memory working copy of one view plus the navigation
//! stack, mode, selection and dirty flag. Nothing reaches the store until `save`.

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::store::{GraphStore, StoreError};
use crate::{
    defaults, Edge, EdgeKind, Graph, Node, NodeData, NodeKind, Position, ServiceType, Size, ViewId,
};

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("diagram is in view mode")]
    ReadOnly,
    #[error("factory reset is only available on the root view")]
    NotRoot,
    #[error("no node selected")]
    NoNodeSelected,
    #[error("no edge selected")]
    NoEdgeSelected,
    #[error("unknown node '{0}'")]
    UnknownNode(String),
    #[error("unknown edge '{0}'")]
    UnknownEdge(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Viewing,
    Editing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    None,
    Node(String),
    Edge(String),
}

/// One entry of the drill-down path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub id: ViewId,
    pub name: String,
}

/// Editable fields of a node's data.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeField {
    Label(String),
    SubLabel(Option<String>),
    Description(Option<String>),
    Icon(Option<String>),
    Details(Vec<String>),
    Notes(Option<String>),
    ServiceType(Option<ServiceType>),
    Color(Option<String>),
    Variant(Option<String>),
}

impl NodeField {
    fn apply(self, data: &mut NodeData) {
        match self {
            NodeField::Label(v) => data.label = v,
            NodeField::SubLabel(v) => data.sub_label = v,
            NodeField::Description(v) => data.description = v,
            NodeField::Icon(v) => data.icon = v,
            NodeField::Details(v) => data.details = v,
            NodeField::Notes(v) => data.notes = v,
            NodeField::ServiceType(v) => data.service_type = v,
            NodeField::Color(v) => data.color = v,
            NodeField::Variant(v) => data.variant = v,
        }
    }
}

/// Editable fields of an edge.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeField {
    Label(Option<String>),
    Kind(EdgeKind),
    Animated(bool),
}

impl EdgeField {
    fn apply(self, edge: &mut Edge) {
        match self {
            EdgeField::Label(v) => edge.label = v,
            EdgeField::Kind(v) => edge.kind = v,
            EdgeField::Animated(v) => edge.animated = v,
        }
    }
}

pub struct DiagramEditor<S: GraphStore> {
    store: S,
    stack: Vec<Breadcrumb>,
    graph: Graph,
    mode: Mode,
    selection: Selection,
    dirty: bool,
}

impl<S: GraphStore> DiagramEditor<S> {
    /// Open the root view. A root that was never saved starts from the factory default.
    pub fn open(store: S) -> Result<Self, EditorError> {
        let root = ViewId::root();
        let graph = load_or_default(&store, &root)?;
        Ok(DiagramEditor {
            store,
            stack: vec![Breadcrumb {
                id: root,
                name: "System Architecture".to_string(),
            }],
            graph,
            mode: Mode::Viewing,
            selection: Selection::None,
            dirty: false,
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn breadcrumbs(&self) -> &[Breadcrumb] {
        &self.stack
    }

    pub fn current_view(&self) -> &ViewId {
        // The root breadcrumb is never popped.
        &self.stack[self.stack.len() - 1].id
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // --- Mode & selection ---

    pub fn toggle_edit_mode(&mut self) -> Mode {
        self.mode = match self.mode {
            Mode::Viewing => Mode::Editing,
            Mode::Editing => Mode::Viewing,
        };
        self.graph.set_edit_mode(self.mode == Mode::Editing);
        self.mode
    }

    pub fn select_node(&mut self, id: &str) -> Result<(), EditorError> {
        if self.graph.node(id).is_none() {
            return Err(EditorError::UnknownNode(id.to_string()));
        }
        self.selection = Selection::Node(id.to_string());
        Ok(())
    }

    pub fn select_edge(&mut self, id: &str) -> Result<(), EditorError> {
        if self.graph.edge(id).is_none() {
            return Err(EditorError::UnknownEdge(id.to_string()));
        }
        self.selection = Selection::Edge(id.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
    }

    // --- Structural edits ---

    fn require_editing(&self) -> Result<(), EditorError> {
        match self.mode {
            Mode::Editing => Ok(()),
            Mode::Viewing => Err(EditorError::ReadOnly),
        }
    }

    pub fn add_node(&mut self, kind: NodeKind) -> Result<String, EditorError> {
        self.require_editing()?;
        let id = fresh_id("node", |id| self.graph.node(id).is_some());
        let mut rng = rand::thread_rng();
        let position = Position {
            x: rng.gen_range(100.0..500.0),
            y: rng.gen_range(100.0..500.0),
        };
        let (size, data) = match kind {
            NodeKind::Group => (
                Some(Size { width: 300.0, height: 200.0 }),
                NodeData {
                    label: "New Group".to_string(),
                    ..NodeData::default()
                },
            ),
            NodeKind::Leaf => (
                None,
                NodeData {
                    label: "New Node".to_string(),
                    icon: Some("Server".to_string()),
                    service_type: Some(ServiceType::Service),
                    ..NodeData::default()
                },
            ),
        };
        let mut node = Node {
            id: id.clone(),
            kind,
            position,
            size,
            style: None,
            parent_node: None,
            extent: None,
            data: NodeData {
                edit_mode: true,
                ..data
            },
        };
        node.mirror_size_into_style();
        self.graph.nodes.push(node);
        self.dirty = true;
        debug!(node = %id, kind = kind.as_str(), "added node");
        Ok(id)
    }

    /// Remove the selected node with its incident edges, or the selected edge.
    pub fn delete_selected(&mut self) -> Result<(), EditorError> {
        self.require_editing()?;
        match std::mem::replace(&mut self.selection, Selection::None) {
            Selection::None => return Ok(()),
            Selection::Node(id) => {
                self.graph.nodes.retain(|n| n.id != id);
                self.graph.edges.retain(|e| !e.touches(&id));
            }
            Selection::Edge(id) => {
                self.graph.edges.retain(|e| e.id != id);
            }
        }
        self.dirty = true;
        Ok(())
    }

    pub fn update_node_field(&mut self, field: NodeField) -> Result<(), EditorError> {
        self.require_editing()?;
        let Selection::Node(id) = &self.selection else {
            return Err(EditorError::NoNodeSelected);
        };
        let node = self
            .graph
            .nodes
            .iter_mut()
            .find(|n| n.id == *id)
            .ok_or_else(|| EditorError::UnknownNode(id.clone()))?;
        field.apply(&mut node.data);
        self.dirty = true;
        Ok(())
    }

    pub fn update_edge_field(&mut self, field: EdgeField) -> Result<(), EditorError> {
        self.require_editing()?;
        let Selection::Edge(id) = &self.selection else {
            return Err(EditorError::NoEdgeSelected);
        };
        let edge = self
            .graph
            .edges
            .iter_mut()
            .find(|e| e.id == *id)
            .ok_or_else(|| EditorError::UnknownEdge(id.clone()))?;
        field.apply(edge);
        self.dirty = true;
        Ok(())
    }

    /// Parallel edges and cycles are allowed; endpoints are not checked.
    pub fn connect(&mut self, source: &str, target: &str) -> Result<String, EditorError> {
        self.require_editing()?;
        let id = fresh_id("edge", |id| self.graph.edge(id).is_some());
        self.graph.edges.push(Edge::new(id.clone(), source, target));
        self.dirty = true;
        Ok(id)
    }

    pub fn reconnect(&mut self, edge_id: &str, source: &str, target: &str) -> Result<(), EditorError> {
        self.require_editing()?;
        let edge = self
            .graph
            .edges
            .iter_mut()
            .find(|e| e.id == edge_id)
            .ok_or_else(|| EditorError::UnknownEdge(edge_id.to_string()))?;
        edge.source = source.to_string();
        edge.target = target.to_string();
        self.dirty = true;
        Ok(())
    }

    pub fn move_node(&mut self, id: &str, position: Position) -> Result<(), EditorError> {
        self.require_editing()?;
        let node = self
            .graph
            .nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| EditorError::UnknownNode(id.to_string()))?;
        node.position = position;
        self.dirty = true;
        Ok(())
    }

    // --- Navigation ---

    /// Drill into the child view owned by `node_id`. Unsaved edits to the current view
    /// are discarded; the parent graph itself is not modified.
    pub fn enter_group(&mut self, node_id: &str, label: &str) -> Result<(), EditorError> {
        let view = ViewId::sanitize(node_id);
        let graph = self.store.load_view(&view)?;
        self.stack.push(Breadcrumb {
            id: view,
            name: label.to_string(),
        });
        self.replace_working_copy(graph);
        Ok(())
    }

    /// Return to the parent view. No-op at the root.
    pub fn exit_group(&mut self) -> Result<(), EditorError> {
        if self.stack.len() <= 1 {
            return Ok(());
        }
        let parent = self.stack[self.stack.len() - 2].id.clone();
        let graph = load_or_default(&self.store, &parent)?;
        self.stack.pop();
        self.replace_working_copy(graph);
        Ok(())
    }

    // --- Persistence ---

    pub fn save(&mut self) -> Result<(), EditorError> {
        let view = self.current_view().clone();
        self.store.save_view(&view, &self.graph.without_transient())?;
        self.dirty = false;
        info!(view = %view, "diagram saved");
        Ok(())
    }

    /// Discard in-memory edits and reload the current view.
    pub fn reset_to_saved(&mut self) -> Result<(), EditorError> {
        let view = self.current_view().clone();
        let graph = load_or_default(&self.store, &view)?;
        self.replace_working_copy(graph);
        Ok(())
    }

    /// Replace the root working copy with the built-in diagram. Persists only on `save`.
    pub fn factory_reset(&mut self) -> Result<(), EditorError> {
        if !self.current_view().is_root() {
            return Err(EditorError::NotRoot);
        }
        let mut graph = defaults::architecture();
        graph.set_edit_mode(self.mode == Mode::Editing);
        self.graph = graph;
        self.selection = Selection::None;
        self.dirty = true;
        Ok(())
    }

    fn replace_working_copy(&mut self, mut graph: Graph) {
        graph.set_edit_mode(self.mode == Mode::Editing);
        self.graph = graph;
        self.selection = Selection::None;
        self.dirty = false;
    }
}

fn load_or_default<S: GraphStore>(store: &S, view: &ViewId) -> Result<Graph, StoreError> {
    match store.load_view(view) {
        Err(StoreError::NotFound { .. }) if view.is_root() => Ok(defaults::architecture()),
        other => other,
    }
}

/// Time-based id, bumped until it is free in the current graph.
fn fresh_id(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    let mut stamp = chrono::Utc::now().timestamp_millis();
    loop {
        let id = format!("{prefix}_{stamp}");
        if !taken(&id) {
            return id;
        }
        stamp += 1;
    }
}
