//! Crowd expansion: from flat per-point agent data to a browsable agent
//! hierarchy.
//!
//! - [`grouping`]: `agentType -> variation -> [agentId]` table
//! - [`classify`] / [`scope`]: what a path is, and where below-agent paths
//!   live in the template scene
//! - [`bounds`] / [`skinning`]: per-location bound, transform and geometry
//! - [`generator`]: [`CrowdGenerator`], the [`SceneSource`](crate::scene::SceneSource)
//!   that ties them together

pub mod bounds;
pub mod classify;
pub mod dependencies;
pub mod generator;
pub mod grouping;
pub mod input;
pub mod scope;
pub mod settings;
pub mod skinning;

pub use classify::{AgentKey, Classification, PathKind, classify};
pub use dependencies::{Plug, affects};
pub use generator::CrowdGenerator;
pub use grouping::AgentGroupingTable;
pub use input::{AgentRecord, CrowdInput};
pub use scope::agent_scope;
pub use settings::{GroupingMode, Settings};
pub use skinning::SkinBinding;
