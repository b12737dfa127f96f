#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Procedural crowd hierarchies.
//!
//! A flat crowd (one point per agent, carrying `agentType`, `variation` and
//! `agentId`, plus per-agent pose records) is expanded into a lazily
//! evaluated hierarchy whose agent leaves carry skinned copies of per-type
//! template meshes:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crowd_scene::{CrowdGenerator, CrowdInput, MemoryScene, SceneSource, ScenePath, Settings};
//!
//! let generator = CrowdGenerator::new(Arc::new(crowd), Arc::new(templates), Settings::default());
//! let mesh = generator.object(&ScenePath::from("/agents/robot/a/1"))?;
//! ```

pub mod cache;
pub mod crowd;
pub mod data;
pub mod errors;
pub mod hash;
pub mod scene;
pub mod utils;

pub use cache::{CacheStats, HierarchyCache, MemoizedScene};
pub use crowd::{AgentRecord, CrowdGenerator, CrowdInput, GroupingMode, PathKind, Settings};
pub use data::{BoundingBox, Box3d, CompoundData, Data, MeshPrimitive, Object, PointsPrimitive};
pub use errors::{CrowdError, Result};
pub use hash::{ContentHash, HashKey, KeyHasher};
pub use scene::{CrowdSource, MemoryScene, SceneSource, ScenePath};
pub use utils::interner;
