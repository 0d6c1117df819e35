use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use serde_json::Value;

use crate::uri::Remote;

/// Property values keyed by name. Values are JSON primitives or arrays of primitives.
pub type PropertyMap = BTreeMap<String, Value>;

#[derive(Debug, Default)]
struct NodeState {
    labels: BTreeSet<String>,
    properties: PropertyMap,
}

#[derive(Debug)]
struct NodeInner {
    remote: Remote,
    state: RefCell<NodeState>,
}

/// Shared handle to a node bound to a remote resource.
///
/// Clones refer to the same entity; equality is reference equality.
#[derive(Clone)]
pub struct Node(Rc<NodeInner>);

impl Node {
    pub(crate) fn bound(remote: Remote) -> Self {
        Node(Rc::new(NodeInner {
            remote,
            state: RefCell::new(NodeState::default()),
        }))
    }

    pub fn remote(&self) -> &Remote {
        &self.0.remote
    }

    pub fn uri(&self) -> &str {
        &self.0.remote.uri
    }

    /// Snapshot of the current properties.
    pub fn properties(&self) -> PropertyMap {
        self.0.state.borrow().properties.clone()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.state.borrow().properties.get(key).cloned()
    }

    /// Snapshot of the current label set.
    pub fn labels(&self) -> BTreeSet<String> {
        self.0.state.borrow().labels.clone()
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.0.state.borrow().labels.contains(label)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.0.state.borrow().properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.state.borrow().properties.is_empty()
    }

    /// True when both handles refer to the same in-memory entity.
    pub fn same_entity(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn replace_properties(&self, properties: PropertyMap) {
        self.0.state.borrow_mut().properties = properties;
    }

    pub(crate) fn replace_labels(&self, labels: BTreeSet<String>) {
        self.0.state.borrow_mut().labels = labels;
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.same_entity(other)
    }
}

impl Eq for Node {}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.0.state.borrow();
        f.debug_struct("Node")
            .field("uri", &self.0.remote.uri)
            .field("labels", &state.labels)
            .field("properties", &state.properties)
            .finish()
    }
}

#[derive(Debug)]
struct RelationshipInner {
    remote: Remote,
    rel_type: String,
    start: Node,
    end: Node,
    properties: RefCell<PropertyMap>,
}

/// Shared handle to a relationship bound to a remote resource.
///
/// Type and endpoints are fixed at construction; only properties change on re-hydration.
#[derive(Clone)]
pub struct Relationship(Rc<RelationshipInner>);

impl Relationship {
    pub(crate) fn bound(remote: Remote, rel_type: String, start: Node, end: Node) -> Self {
        Relationship(Rc::new(RelationshipInner {
            remote,
            rel_type,
            start,
            end,
            properties: RefCell::new(PropertyMap::new()),
        }))
    }

    pub fn remote(&self) -> &Remote {
        &self.0.remote
    }

    pub fn uri(&self) -> &str {
        &self.0.remote.uri
    }

    pub fn rel_type(&self) -> &str {
        &self.0.rel_type
    }

    pub fn start_node(&self) -> &Node {
        &self.0.start
    }

    pub fn end_node(&self) -> &Node {
        &self.0.end
    }

    /// Snapshot of the current properties.
    pub fn properties(&self) -> PropertyMap {
        self.0.properties.borrow().clone()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.properties.borrow().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.0.properties.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.properties.borrow().is_empty()
    }

    pub fn same_entity(&self, other: &Relationship) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn replace_properties(&self, properties: PropertyMap) {
        *self.0.properties.borrow_mut() = properties;
    }
}

impl PartialEq for Relationship {
    fn eq(&self, other: &Self) -> bool {
        self.same_entity(other)
    }
}

impl Eq for Relationship {}

impl std::fmt::Debug for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relationship")
            .field("uri", &self.0.remote.uri)
            .field("type", &self.0.rel_type)
            .field("start", &self.0.start.uri())
            .field("end", &self.0.end.uri())
            .field("properties", &self.0.properties.borrow())
            .finish()
    }
}

/// Traversal direction of a relationship within a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The earlier path node is the relationship's start.
    Forward,
    /// The earlier path node is the relationship's end.
    Reverse,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "->",
            Direction::Reverse => "<-",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "->" => Some(Direction::Forward),
            "<-" => Some(Direction::Reverse),
            _ => None,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An alternating walk `n0, r0, n1, r1, ..., nN`.
///
/// Paths are not addressable resources and are never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    nodes: Vec<Node>,
    relationships: Vec<Relationship>,
    directions: Vec<Direction>,
}

impl Path {
    pub fn new(
        nodes: Vec<Node>,
        relationships: Vec<Relationship>,
        directions: Vec<Direction>,
    ) -> Result<Self, HydrateError> {
        if nodes.len() != relationships.len() + 1 {
            return Err(HydrateError::MalformedPayload(format!(
                "path has {} nodes but {} relationships",
                nodes.len(),
                relationships.len()
            )));
        }
        if directions.len() != relationships.len() {
            return Err(HydrateError::MalformedPayload(format!(
                "path has {} directions for {} relationships",
                directions.len(),
                relationships.len()
            )));
        }
        Ok(Path {
            nodes,
            relationships,
            directions,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    /// Number of relationships traversed.
    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    pub fn start_node(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn end_node(&self) -> &Node {
        &self.nodes[self.nodes.len() - 1]
    }

    /// Iterate `(from, relationship, direction, to)` for each step of the walk.
    pub fn steps(&self) -> impl Iterator<Item = (&Node, &Relationship, Direction, &Node)> {
        self.relationships
            .iter()
            .zip(&self.directions)
            .enumerate()
            .map(|(i, (rel, dir))| (&self.nodes[i], rel, *dir, &self.nodes[i + 1]))
    }
}

/// Result of hydrating a payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Hydrated {
    /// A JSON primitive, passed through unchanged.
    Scalar(Value),
    List(Vec<Hydrated>),
    /// A map literal that matched no entity shape.
    Map(BTreeMap<String, Hydrated>),
    Node(Node),
    Relationship(Relationship),
    Path(Path),
}

impl Hydrated {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Hydrated::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_relationship(&self) -> Option<&Relationship> {
        match self {
            Hydrated::Relationship(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Hydrated::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Hydrated]> {
        match self {
            Hydrated::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_node(self) -> Option<Node> {
        match self {
            Hydrated::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn into_relationship(self) -> Option<Relationship> {
        match self {
            Hydrated::Relationship(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_path(self) -> Option<Path> {
        match self {
            Hydrated::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Hydrated::Scalar(_) => "scalar",
            Hydrated::List(_) => "list",
            Hydrated::Map(_) => "map",
            Hydrated::Node(_) => "node",
            Hydrated::Relationship(_) => "relationship",
            Hydrated::Path(_) => "path",
        }
    }
}

/// Scalars, lists, and map literals compare by content; entities never equal plain JSON.
impl PartialEq<Value> for Hydrated {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Hydrated::Scalar(a), b) => a == b,
            (Hydrated::List(items), Value::Array(values)) => {
                items.len() == values.len() && items.iter().zip(values).all(|(h, v)| h == v)
            }
            (Hydrated::Map(map), Value::Object(obj)) => {
                map.len() == obj.len()
                    && map
                        .iter()
                        .all(|(k, h)| obj.get(k).is_some_and(|v| h == v))
            }
            _ => false,
        }
    }
}

/// Errors that can occur while hydrating a payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HydrateError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Type conflict for relationship {uri}: recorded '{existing}', payload has '{incoming}'")]
    TypeConflict {
        uri: String,
        existing: String,
        incoming: String,
    },

    #[error("Endpoint conflict for relationship {uri}: start/end differ from recorded nodes")]
    EndpointConflict { uri: String },

    #[error("Missing attribute '{attribute}' for {uri}")]
    MissingAttribute { uri: String, attribute: String },

    #[error("Server error {exception}: {message}")]
    Server { exception: String, message: String },
}
