//! Hydration of graph database REST payloads into in-memory entities.
//!
//! This crate turns already-decoded JSON returned by the server into shared entity handles:
//! - [`types`] — Nodes, relationships, paths, and error types
//! - [`cache`] — The [`IdentityCache`](cache::IdentityCache) keeping one instance per URI
//! - [`hydrate`] — The shape-dispatching [`Hydrator`](hydrate::Hydrator)
//! - [`uri`] — Classification of node and relationship resource URIs
//! - [`config`] — Configuration loading from `graphrest.json`
//! - [`format`] — Display and serialization of hydrated entities

pub mod cache;
pub mod config;
pub mod format;
pub mod hydrate;
pub mod types;
pub mod uri;

pub use cache::IdentityCache;
pub use config::HydrateConfig;
pub use hydrate::Hydrator;
pub use types::{Direction, HydrateError, Hydrated, Node, Path, PropertyMap, Relationship};
pub use uri::{Remote, ResourceKind, ResourceUri};
