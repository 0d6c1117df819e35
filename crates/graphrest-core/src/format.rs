//! Display and serialization of hydrated entities.
//!
//! `Display` renders a compact pattern notation, e.g.
//! `(_23:Person {name: "Alice"})-[_11:KNOWS {since: 1999}]->(_22)`.
//! `Serialize` produces snapshots of the current entity state.

use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::types::{Direction, Hydrated, Node, Path, PropertyMap, Relationship};

fn write_properties(f: &mut fmt::Formatter<'_>, properties: &PropertyMap) -> fmt::Result {
    if properties.is_empty() {
        return Ok(());
    }
    f.write_str(" {")?;
    for (i, (key, value)) in properties.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{key}: {value}")?;
    }
    f.write_str("}")
}

fn write_relationship_body(f: &mut fmt::Formatter<'_>, rel: &Relationship) -> fmt::Result {
    write!(f, "[{}:{}", rel.remote().reference(), rel.rel_type())?;
    write_properties(f, &rel.properties())?;
    f.write_str("]")
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.remote().reference())?;
        for label in self.labels() {
            write!(f, ":{label}")?;
        }
        write_properties(f, &self.properties())?;
        f.write_str(")")
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})-", self.start_node().remote().reference())?;
        write_relationship_body(f, self)?;
        write!(f, "->({})", self.end_node().remote().reference())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start_node())?;
        for (_, rel, direction, to) in self.steps() {
            match direction {
                Direction::Forward => {
                    f.write_str("-")?;
                    write_relationship_body(f, rel)?;
                    f.write_str("->")?;
                }
                Direction::Reverse => {
                    f.write_str("<-")?;
                    write_relationship_body(f, rel)?;
                    f.write_str("-")?;
                }
            }
            write!(f, "{to}")?;
        }
        Ok(())
    }
}

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Node", 4)?;
        s.serialize_field("uri", self.uri())?;
        s.serialize_field("id", &self.remote().id)?;
        s.serialize_field("labels", &self.labels())?;
        s.serialize_field("properties", &self.properties())?;
        s.end()
    }
}

impl Serialize for Relationship {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Relationship", 6)?;
        s.serialize_field("uri", self.uri())?;
        s.serialize_field("id", &self.remote().id)?;
        s.serialize_field("type", self.rel_type())?;
        s.serialize_field("start", self.start_node().uri())?;
        s.serialize_field("end", self.end_node().uri())?;
        s.serialize_field("properties", &self.properties())?;
        s.end()
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Path", 3)?;
        s.serialize_field("nodes", self.nodes())?;
        s.serialize_field("relationships", self.relationships())?;
        s.serialize_field("directions", self.directions())?;
        s.end()
    }
}

impl Serialize for Hydrated {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Hydrated::Scalar(value) => value.serialize(serializer),
            Hydrated::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Hydrated::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Hydrated::Node(node) => node.serialize(serializer),
            Hydrated::Relationship(rel) => rel.serialize(serializer),
            Hydrated::Path(path) => path.serialize(serializer),
        }
    }
}
