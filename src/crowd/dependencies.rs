//! Which generator outputs each input can invalidate.
//!
//! Hosts that track dirtiness ask [`affects`] once per changed input rather
//! than probing hashes. The table mirrors what the per-property hashes read,
//! closed transitively: a change to the crowd points regroups the agents,
//! which changes child names, which changes every bound above the agents.

use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Plug {
    // Inputs
    CrowdObject,
    CrowdAttributes,
    Name,
    AttributesFilter,
    Mode,
    AgentsChildNames,
    AgentsBound,
    AgentsTransform,
    AgentsAttributes,
    AgentsObject,

    // Internal
    AgentGrouping,

    // Outputs
    ChildNames,
    Bound,
    Transform,
    Attributes,
    Object,
}

impl Plug {
    pub const ALL: [Plug; 16] = [
        Plug::CrowdObject,
        Plug::CrowdAttributes,
        Plug::Name,
        Plug::AttributesFilter,
        Plug::Mode,
        Plug::AgentsChildNames,
        Plug::AgentsBound,
        Plug::AgentsTransform,
        Plug::AgentsAttributes,
        Plug::AgentsObject,
        Plug::AgentGrouping,
        Plug::ChildNames,
        Plug::Bound,
        Plug::Transform,
        Plug::Attributes,
        Plug::Object,
    ];

    #[must_use]
    pub fn is_output(self) -> bool {
        matches!(
            self,
            Plug::ChildNames | Plug::Bound | Plug::Transform | Plug::Attributes | Plug::Object
        )
    }
}

// The attribute filter is carried in the settings but not applied, so it
// invalidates nothing.
fn direct(plug: Plug) -> &'static [Plug] {
    match plug {
        Plug::CrowdObject | Plug::Mode => &[Plug::AgentGrouping],
        Plug::AgentGrouping | Plug::Name | Plug::AgentsChildNames => &[Plug::ChildNames],
        Plug::CrowdAttributes => &[Plug::Bound, Plug::Transform, Plug::Object],
        Plug::AgentsBound | Plug::ChildNames | Plug::Transform => &[Plug::Bound],
        Plug::AgentsTransform => &[Plug::Transform],
        Plug::AgentsAttributes => &[Plug::Attributes, Plug::Object],
        Plug::AgentsObject => &[Plug::Object],
        Plug::AttributesFilter | Plug::Bound | Plug::Attributes | Plug::Object => &[],
    }
}

static AFFECTS: LazyLock<Vec<Vec<Plug>>> = LazyLock::new(|| {
    Plug::ALL
        .iter()
        .map(|&plug| {
            let mut reached = Vec::new();
            let mut stack = direct(plug).to_vec();
            while let Some(next) = stack.pop() {
                if !reached.contains(&next) {
                    reached.push(next);
                    stack.extend_from_slice(direct(next));
                }
            }
            reached.sort();
            reached
        })
        .collect()
});

/// Every plug, outputs and the internal grouping included, whose value may
/// change when `input` changes. Sorted and free of duplicates.
#[must_use]
pub fn affects(input: Plug) -> &'static [Plug] {
    &AFFECTS[input as usize]
}
