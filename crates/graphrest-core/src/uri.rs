/// Kinds of addressable resources exposed by the REST interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Node,
    Relationship,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Node => "node",
            ResourceKind::Relationship => "relationship",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "node" => Some(ResourceKind::Node),
            "relationship" => Some(ResourceKind::Relationship),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical spelling of a resource URI, used as the identity key. Trailing slashes are dropped.
pub fn canonical(uri: &str) -> &str {
    uri.trim_end_matches('/')
}

/// A resource URI split into its kind and numeric id,
/// e.g. `http://localhost:7474/db/data/node/23`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUri {
    pub kind: ResourceKind,
    pub id: u64,
}

impl ResourceUri {
    /// Classify a URI by its trailing `/<kind>/<id>` segments.
    pub fn parse(uri: &str) -> Option<Self> {
        let mut segments = canonical(uri).rsplit('/');
        let id = segments.next()?.parse::<u64>().ok()?;
        let kind = ResourceKind::from_segment(segments.next()?)?;
        // A bare "node/0" has no authority and is not a resource URI.
        segments.next()?;
        Some(ResourceUri { kind, id })
    }
}

/// Remote identity of a hydrated entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Remote {
    pub uri: String,
    pub id: Option<u64>,
}

impl Remote {
    pub fn new(uri: &str) -> Self {
        let uri = canonical(uri).to_string();
        let id = ResourceUri::parse(&uri).map(|r| r.id);
        Remote { uri, id }
    }

    /// Short reference used when rendering entities, `_<id>` or the full URI.
    pub fn reference(&self) -> String {
        match self.id {
            Some(id) => format!("_{id}"),
            None => format!("<{}>", self.uri),
        }
    }
}
