//! Scene access layer:
//! - [`ScenePath`]: hierarchy addresses
//! - [`SceneSource`] / [`CrowdSource`]: the collaborator interfaces
//! - [`MemoryScene`]: an in-memory [`SceneSource`] used for agent templates
//! - [`traversal`]: child bound unions and their hashes

pub mod memory;
pub mod path;
pub mod source;
pub mod traversal;

pub use memory::{Location, MemoryScene};
pub use path::ScenePath;
pub use source::{CrowdSource, SceneSource};
