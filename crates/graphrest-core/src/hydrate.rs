//! Shape-dispatched hydration of decoded REST payloads.
//!
//! Payloads carry no type tag. The hydrator inspects shape in a fixed order:
//! lists, then mappings without `self` (server error documents, then
//! `nodes`/`relationships` paths, then plain map literals), and finally
//! resources addressed by `self`. Resources are resolved through the
//! [`IdentityCache`] under their canonical URI (no trailing `/`), so a
//! resource always maps to one live entity.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::cache::IdentityCache;
use crate::config::HydrateConfig;
use crate::types::{
    Direction, HydrateError, Hydrated, Node, Path, PropertyMap, Relationship,
};
use crate::uri::{canonical, Remote, ResourceKind, ResourceUri};

const RELATIONSHIP_FIELDS: [&str; 3] = ["type", "start", "end"];

/// Converts payloads into entities, sharing instances through its identity cache.
#[derive(Debug, Default)]
pub struct Hydrator {
    cache: IdentityCache,
    config: HydrateConfig,
}

impl Hydrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HydrateConfig) -> Self {
        Self::with_cache(IdentityCache::new(), config)
    }

    /// Build a hydrator around an existing cache, e.g. one carried over from a prior session.
    pub fn with_cache(cache: IdentityCache, config: HydrateConfig) -> Self {
        Hydrator { cache, config }
    }

    pub fn config(&self) -> &HydrateConfig {
        &self.config
    }

    pub fn cache(&self) -> &IdentityCache {
        &self.cache
    }

    pub fn into_cache(self) -> IdentityCache {
        self.cache
    }

    /// Reset identity state. Later hydrations create fresh entities.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Hydrate any payload, dispatching on its shape.
    pub fn hydrate(&mut self, payload: &Value) -> Result<Hydrated, HydrateError> {
        self.hydrate_at(payload, 0)
    }

    /// Hydrate a payload that must describe a node.
    pub fn hydrate_node(&mut self, payload: &Value) -> Result<Node, HydrateError> {
        let obj = resource_object(payload, "node")?;
        let uri = self_uri(obj)?;
        self.expect_kind(uri, ResourceKind::Node)?;
        self.node_from(uri, obj)
    }

    /// Hydrate a payload that must describe a relationship.
    pub fn hydrate_relationship(&mut self, payload: &Value) -> Result<Relationship, HydrateError> {
        let obj = resource_object(payload, "relationship")?;
        let uri = self_uri(obj)?;
        self.expect_kind(uri, ResourceKind::Relationship)?;
        self.relationship_from(uri, obj)
    }

    /// Hydrate a payload that must describe a path.
    pub fn hydrate_path(&mut self, payload: &Value) -> Result<Path, HydrateError> {
        let obj = payload.as_object().ok_or_else(|| {
            HydrateError::MalformedPayload("path payload must be a mapping".to_string())
        })?;
        self.path_from(obj)
    }

    fn hydrate_at(&mut self, payload: &Value, depth: usize) -> Result<Hydrated, HydrateError> {
        if depth > self.config.max_depth {
            return Err(HydrateError::MalformedPayload(format!(
                "payload nested deeper than {} levels",
                self.config.max_depth
            )));
        }
        match payload {
            Value::Array(items) => items
                .iter()
                .map(|item| self.hydrate_at(item, depth + 1))
                .collect::<Result<Vec<_>, _>>()
                .map(Hydrated::List),
            Value::Object(obj) => self.hydrate_object(obj, depth),
            scalar => Ok(Hydrated::Scalar(scalar.clone())),
        }
    }

    fn hydrate_object(
        &mut self,
        obj: &Map<String, Value>,
        depth: usize,
    ) -> Result<Hydrated, HydrateError> {
        if !obj.contains_key("self") {
            if obj.contains_key("exception") {
                return Err(server_error(obj));
            }
            if obj.contains_key("nodes") || obj.contains_key("relationships") {
                return self.path_from(obj).map(Hydrated::Path);
            }
            return self.map_literal(obj, depth);
        }

        let uri = self_uri(obj)?;
        match self.resource_kind(uri, obj)? {
            ResourceKind::Node => self.node_from(uri, obj).map(Hydrated::Node),
            ResourceKind::Relationship => {
                self.relationship_from(uri, obj).map(Hydrated::Relationship)
            }
        }
    }

    fn resource_kind(
        &self,
        uri: &str,
        obj: &Map<String, Value>,
    ) -> Result<ResourceKind, HydrateError> {
        match ResourceUri::parse(uri) {
            Some(resource) => Ok(resource.kind),
            None if self.config.strict_uris => Err(HydrateError::MalformedPayload(format!(
                "'{uri}' is not a node or relationship URI"
            ))),
            None if RELATIONSHIP_FIELDS.iter().any(|f| obj.contains_key(*f)) => {
                Ok(ResourceKind::Relationship)
            }
            None => Ok(ResourceKind::Node),
        }
    }

    fn expect_kind(&self, uri: &str, expected: ResourceKind) -> Result<(), HydrateError> {
        match ResourceUri::parse(uri) {
            Some(resource) if resource.kind == expected => Ok(()),
            Some(resource) => Err(HydrateError::MalformedPayload(format!(
                "expected {expected} URI, found {} URI '{uri}'",
                resource.kind
            ))),
            None if self.config.strict_uris => Err(HydrateError::MalformedPayload(format!(
                "'{uri}' is not a {expected} URI"
            ))),
            None => Ok(()),
        }
    }

    fn node_from(&mut self, uri: &str, obj: &Map<String, Value>) -> Result<Node, HydrateError> {
        if obj.contains_key("type") {
            return Err(HydrateError::MalformedPayload(format!(
                "node payload for '{uri}' carries a relationship 'type' field"
            )));
        }
        // Validate everything before touching the cache.
        let properties = obj
            .get("data")
            .map(|data| property_map(uri, data))
            .transpose()?;
        let labels = labels_of(uri, obj)?;

        let node = self.cache.node_or_insert(uri);
        if let Some(properties) = properties {
            node.replace_properties(properties);
        }
        if let Some(labels) = labels {
            node.replace_labels(labels);
        }
        Ok(node)
    }

    /// Resolve a node by URI alone, as for relationship endpoints and path members.
    fn node_ref(&mut self, uri: &str) -> Result<Node, HydrateError> {
        self.expect_kind(uri, ResourceKind::Node)?;
        self.node_from(uri, &Map::new())
    }

    fn relationship_from(
        &mut self,
        uri: &str,
        obj: &Map<String, Value>,
    ) -> Result<Relationship, HydrateError> {
        if !RELATIONSHIP_FIELDS.iter().any(|f| obj.contains_key(*f)) {
            return self.relationship_ref(uri);
        }

        let rel_type = string_field(uri, obj, "type")?;
        let start = canonical(string_field(uri, obj, "start")?);
        let end = canonical(string_field(uri, obj, "end")?);
        self.expect_kind(start, ResourceKind::Node)?;
        self.expect_kind(end, ResourceKind::Node)?;
        let properties = obj
            .get("data")
            .map(|data| property_map(uri, data))
            .transpose()?;

        let rel = match self.cache.relationship(uri) {
            Some(existing) => {
                if existing.rel_type() != rel_type {
                    return Err(HydrateError::TypeConflict {
                        uri: uri.to_string(),
                        existing: existing.rel_type().to_string(),
                        incoming: rel_type.to_string(),
                    });
                }
                if existing.start_node().uri() != start || existing.end_node().uri() != end {
                    return Err(HydrateError::EndpointConflict {
                        uri: uri.to_string(),
                    });
                }
                debug!(uri, "relationship cache hit");
                existing
            }
            None => {
                let start_node = self.node_ref(start)?;
                let end_node = self.node_ref(end)?;
                let rel = Relationship::bound(
                    Remote::new(uri),
                    rel_type.to_string(),
                    start_node,
                    end_node,
                );
                self.cache.insert_relationship(rel.clone());
                rel
            }
        };
        if let Some(properties) = properties {
            rel.replace_properties(properties);
        }
        Ok(rel)
    }

    /// Resolve a relationship by URI alone. Only fully hydrated relationships are ever
    /// cached, so a miss means the type and endpoints are unknown.
    fn relationship_ref(&self, uri: &str) -> Result<Relationship, HydrateError> {
        self.cache
            .relationship(uri)
            .ok_or_else(|| HydrateError::MissingAttribute {
                uri: uri.to_string(),
                attribute: "type".to_string(),
            })
    }

    fn path_from(&mut self, obj: &Map<String, Value>) -> Result<Path, HydrateError> {
        let node_uris = uri_list(obj, "nodes")?;
        let rel_uris = uri_list(obj, "relationships")?;
        if node_uris.len() != rel_uris.len() + 1 {
            return Err(HydrateError::MalformedPayload(format!(
                "path has {} nodes but {} relationships",
                node_uris.len(),
                rel_uris.len()
            )));
        }
        let explicit = obj.get("directions").map(direction_list).transpose()?;

        let nodes = node_uris
            .iter()
            .map(|uri| self.node_ref(uri))
            .collect::<Result<Vec<_>, _>>()?;
        let relationships = rel_uris
            .iter()
            .map(|uri| {
                self.expect_kind(uri, ResourceKind::Relationship)?;
                self.relationship_ref(uri)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let directions = match explicit {
            Some(directions) => {
                check_directions(&nodes, &relationships, &directions)?;
                directions
            }
            None => infer_directions(&nodes, &relationships)?,
        };
        Path::new(nodes, relationships, directions)
    }

    fn map_literal(
        &mut self,
        obj: &Map<String, Value>,
        depth: usize,
    ) -> Result<Hydrated, HydrateError> {
        if !self.config.allow_map_literals {
            return Err(HydrateError::MalformedPayload(
                "mapping matches no node, relationship, or path shape".to_string(),
            ));
        }
        warn!(
            keys = obj.len(),
            "map literal returned over REST is ambiguous, passing it through"
        );
        obj.iter()
            .map(|(key, value)| -> Result<(String, Hydrated), HydrateError> {
                Ok((key.clone(), self.hydrate_at(value, depth + 1)?))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Hydrated::Map)
    }
}

fn resource_object<'a>(
    payload: &'a Value,
    what: &str,
) -> Result<&'a Map<String, Value>, HydrateError> {
    payload
        .as_object()
        .ok_or_else(|| HydrateError::MalformedPayload(format!("{what} payload must be a mapping")))
}

fn self_uri(obj: &Map<String, Value>) -> Result<&str, HydrateError> {
    match obj.get("self") {
        Some(Value::String(uri)) => Ok(canonical(uri)),
        Some(_) => Err(HydrateError::MalformedPayload(
            "'self' must be a URI string".to_string(),
        )),
        None => Err(HydrateError::MalformedPayload(
            "payload has no 'self' URI".to_string(),
        )),
    }
}

fn string_field<'a>(
    uri: &str,
    obj: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a str, HydrateError> {
    match obj.get(field) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(HydrateError::MalformedPayload(format!(
            "'{field}' of '{uri}' must be a string"
        ))),
        None => Err(HydrateError::MalformedPayload(format!(
            "relationship payload for '{uri}' is missing '{field}'"
        ))),
    }
}

/// Property values are primitives or flat arrays of primitives.
fn is_property_value(value: &Value) -> bool {
    match value {
        Value::Object(_) => false,
        Value::Array(items) => items
            .iter()
            .all(|item| !matches!(item, Value::Object(_) | Value::Array(_))),
        _ => true,
    }
}

fn property_map(uri: &str, data: &Value) -> Result<PropertyMap, HydrateError> {
    let obj = data.as_object().ok_or_else(|| {
        HydrateError::MalformedPayload(format!("'data' of '{uri}' must be a mapping"))
    })?;
    let mut properties = PropertyMap::new();
    for (key, value) in obj {
        if !is_property_value(value) {
            return Err(HydrateError::MalformedPayload(format!(
                "property '{key}' of '{uri}' is not a primitive or array of primitives"
            )));
        }
        properties.insert(key.clone(), value.clone());
    }
    Ok(properties)
}

/// Labels live under `metadata.labels`; the top-level `labels` key is a link and is ignored.
fn labels_of(uri: &str, obj: &Map<String, Value>) -> Result<Option<BTreeSet<String>>, HydrateError> {
    let metadata = match obj.get("metadata") {
        None => return Ok(None),
        Some(Value::Object(metadata)) => metadata,
        Some(_) => {
            return Err(HydrateError::MalformedPayload(format!(
                "'metadata' of '{uri}' must be a mapping"
            )))
        }
    };
    let labels = match metadata.get("labels") {
        None => return Ok(None),
        Some(Value::Array(labels)) => labels,
        Some(_) => {
            return Err(HydrateError::MalformedPayload(format!(
                "'metadata.labels' of '{uri}' must be a list"
            )))
        }
    };
    labels
        .iter()
        .map(|label| {
            label.as_str().map(str::to_string).ok_or_else(|| {
                HydrateError::MalformedPayload(format!("label of '{uri}' must be a string"))
            })
        })
        .collect::<Result<BTreeSet<_>, _>>()
        .map(Some)
}

fn uri_list<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<Vec<&'a str>, HydrateError> {
    let items = match obj.get(field) {
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(HydrateError::MalformedPayload(format!(
                "path '{field}' must be a list of URIs"
            )))
        }
        None => {
            return Err(HydrateError::MalformedPayload(format!(
                "path payload is missing '{field}'"
            )))
        }
    };
    items
        .iter()
        .map(|item| {
            item.as_str().map(canonical).ok_or_else(|| {
                HydrateError::MalformedPayload(format!("path '{field}' entries must be URI strings"))
            })
        })
        .collect()
}

fn direction_list(value: &Value) -> Result<Vec<Direction>, HydrateError> {
    let items = value.as_array().ok_or_else(|| {
        HydrateError::MalformedPayload("path 'directions' must be a list".to_string())
    })?;
    items
        .iter()
        .map(|item| {
            item.as_str().and_then(Direction::parse).ok_or_else(|| {
                HydrateError::MalformedPayload(format!(
                    "path direction {item} is not \"->\" or \"<-\""
                ))
            })
        })
        .collect()
}

fn connects(from: &Node, rel: &Relationship, to: &Node, direction: Direction) -> bool {
    let (head, tail) = match direction {
        Direction::Forward => (rel.start_node(), rel.end_node()),
        Direction::Reverse => (rel.end_node(), rel.start_node()),
    };
    head.uri() == from.uri() && tail.uri() == to.uri()
}

/// Forward when the earlier node is the relationship's start. Self-loops read forward.
fn infer_directions(
    nodes: &[Node],
    relationships: &[Relationship],
) -> Result<Vec<Direction>, HydrateError> {
    relationships
        .iter()
        .enumerate()
        .map(|(i, rel)| {
            let (from, to) = (&nodes[i], &nodes[i + 1]);
            [Direction::Forward, Direction::Reverse]
                .into_iter()
                .find(|d| connects(from, rel, to, *d))
                .ok_or_else(|| disconnected(from, rel, to))
        })
        .collect()
}

fn check_directions(
    nodes: &[Node],
    relationships: &[Relationship],
    directions: &[Direction],
) -> Result<(), HydrateError> {
    if directions.len() != relationships.len() {
        return Err(HydrateError::MalformedPayload(format!(
            "path has {} directions for {} relationships",
            directions.len(),
            relationships.len()
        )));
    }
    for (i, (rel, direction)) in relationships.iter().zip(directions).enumerate() {
        let (from, to) = (&nodes[i], &nodes[i + 1]);
        if !connects(from, rel, to, *direction) {
            return Err(disconnected(from, rel, to));
        }
    }
    Ok(())
}

fn disconnected(from: &Node, rel: &Relationship, to: &Node) -> HydrateError {
    HydrateError::MalformedPayload(format!(
        "relationship '{}' does not connect '{}' and '{}'",
        rel.uri(),
        from.uri(),
        to.uri()
    ))
}

fn server_error(obj: &Map<String, Value>) -> HydrateError {
    let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);
    HydrateError::Server {
        exception: text("exception").unwrap_or_else(|| "UnknownError".to_string()),
        message: text("message").unwrap_or_default(),
    }
}

#[cfg(test)]
#[path = "hydrate_tests.rs"]
mod tests;
