//! Scene access traits.
//!
//! [`SceneSource`] is the per-location query interface shared by the agent
//! template library and the generated hierarchy. [`CrowdSource`] is the flat
//! crowd input. Both are queried concurrently from worker threads, so they
//! must support shared reads without external locking.

use std::sync::Arc;

use glam::Mat4;

use crate::data::{BoundingBox, CompoundData, Object};
use crate::errors::Result;
use crate::hash::HashKey;
use crate::scene::ScenePath;
use crate::utils::Symbol;

/// A hierarchy whose locations expose five independently queryable and
/// independently hashable properties.
///
/// For every property, equal hashes for the same property must imply equal
/// values. Callers may compare hashes alone to validate a cached value.
pub trait SceneSource: Send + Sync {
    fn bound(&self, path: &ScenePath) -> Result<BoundingBox>;
    fn bound_hash(&self, path: &ScenePath) -> Result<HashKey>;

    fn transform(&self, path: &ScenePath) -> Result<Mat4>;
    fn transform_hash(&self, path: &ScenePath) -> Result<HashKey>;

    fn attributes(&self, path: &ScenePath) -> Result<Arc<CompoundData>>;
    fn attributes_hash(&self, path: &ScenePath) -> Result<HashKey>;

    fn object(&self, path: &ScenePath) -> Result<Arc<Object>>;
    fn object_hash(&self, path: &ScenePath) -> Result<HashKey>;

    fn child_names(&self, path: &ScenePath) -> Result<Arc<[Symbol]>>;
    fn child_names_hash(&self, path: &ScenePath) -> Result<HashKey>;
}

/// The flat crowd input: one geometry object holding one point per agent,
/// plus a compound of per-agent and per-agent-type records.
pub trait CrowdSource: Send + Sync {
    fn object(&self) -> Arc<Object>;
    fn object_hash(&self) -> HashKey;

    fn attributes(&self) -> Arc<CompoundData>;
    fn attributes_hash(&self) -> HashKey;
}
