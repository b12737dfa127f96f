//! Agent scope: mapping generated locations onto the agent template scene.
//!
//! Everything at or below `/<name>/<agentType>/<variation>/<agentId>` is
//! served by the template scene at `/<agentType>/<variation>/...`. The agent
//! id and the output name are dropped; any segments past the agent leaf are
//! carried over unchanged.

use crate::crowd::classify::AGENT_DEPTH;
use crate::scene::ScenePath;

/// Rewrites a generated path of depth four or more into the template
/// scene's addressing.
///
/// # Panics
/// Panics when `branch_path` is shallower than an agent leaf; callers
/// dispatch on depth before asking for a scope.
#[must_use]
pub fn agent_scope(branch_path: &ScenePath) -> ScenePath {
    assert!(
        branch_path.len() >= AGENT_DEPTH,
        "agent scope requested for {branch_path}, which is above the agent level"
    );

    let symbols = branch_path.symbols();
    let mut agent_path = ScenePath::from_symbols(&symbols[1..3]);
    for &segment in &symbols[AGENT_DEPTH..] {
        agent_path.push_symbol(segment);
    }
    agent_path
}
