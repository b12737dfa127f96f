//! Path classification.
//!
//! The generated hierarchy is `/<name>/<agentType>/<variation>/<agentId>/...`
//! and the number of segments alone decides what a location is.

use crate::scene::ScenePath;
use crate::utils::Symbol;

/// Depth of an agent leaf. Locations deeper than this live inside the
/// agent's template scene.
pub const AGENT_DEPTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    /// `/`
    Root,
    /// `/<name>`
    Collection,
    /// `/<name>/<agentType>`
    AgentType,
    /// `/<name>/<agentType>/<variation>`
    Variation,
    /// `/<name>/<agentType>/<variation>/<agentId>`
    AgentLeaf,
    /// Anything below an agent leaf.
    NestedInternal,
}

impl PathKind {
    #[must_use]
    pub fn from_depth(depth: usize) -> Self {
        match depth {
            0 => PathKind::Root,
            1 => PathKind::Collection,
            2 => PathKind::AgentType,
            3 => PathKind::Variation,
            AGENT_DEPTH => PathKind::AgentLeaf,
            _ => PathKind::NestedInternal,
        }
    }
}

/// The agent naming extracted from a path of depth two or more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgentKey {
    pub agent_type: Symbol,
    pub variation: Option<Symbol>,
    pub agent_id: Option<Symbol>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Classification {
    pub kind: PathKind,
    pub agent: Option<AgentKey>,
}

#[must_use]
pub fn classify(path: &ScenePath) -> Classification {
    let kind = PathKind::from_depth(path.len());
    let agent = path.symbol(1).map(|agent_type| AgentKey {
        agent_type,
        variation: path.symbol(2),
        agent_id: path.symbol(3),
    });
    Classification { kind, agent }
}
