//! Agent grouping.
//!
//! One linear pass over the crowd points files every agent id under
//! `table[agentType][variation]`. Types and variations are kept in sorted
//! maps, so child-name enumeration is lexicographic and independent of the
//! order agents arrive in. Ids keep crowd order within their group.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::crowd::input::{AGENT_ID, AGENT_TYPE, VARIATION};
use crate::crowd::settings::GroupingMode;
use crate::data::{Data, PointsPrimitive};
use crate::errors::{CrowdError, Result};
use crate::hash::{HashKey, KeyHasher};
use crate::scene::ScenePath;
use crate::utils::Symbol;
use crate::utils::interner;

/// `agentType -> variation -> [agentId]`, ids rendered as decimal strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentGroupingTable {
    types: BTreeMap<String, BTreeMap<String, Arc<[Symbol]>>>,
    len: usize,
}

impl AgentGroupingTable {
    /// Total number of agent ids across all groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn agent_types(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Variations of `agent_type`, `None` if the type is unknown.
    pub fn variations(&self, agent_type: &str) -> Option<impl Iterator<Item = &str>> {
        self.types
            .get(agent_type)
            .map(|variations| variations.keys().map(String::as_str))
    }

    #[must_use]
    pub fn agent_ids(&self, agent_type: &str, variation: &str) -> Option<&Arc<[Symbol]>> {
        self.types.get(agent_type)?.get(variation)
    }

    /// Every `(agentType, variation, ids)` group in table order.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &str, &[Symbol])> {
        self.types.iter().flat_map(|(agent_type, variations)| {
            variations
                .iter()
                .map(move |(variation, ids)| (agent_type.as_str(), variation.as_str(), &ids[..]))
        })
    }

    /// Agent type names as path segments.
    #[must_use]
    pub fn type_names(&self) -> Arc<[Symbol]> {
        self.agent_types().map(interner::intern).collect()
    }

    /// Variation names of `agent_type` as path segments; empty when unknown.
    #[must_use]
    pub fn variation_names(&self, agent_type: &str) -> Arc<[Symbol]> {
        match self.variations(agent_type) {
            Some(variations) => variations.map(interner::intern).collect(),
            None => Arc::from([]),
        }
    }
}

/// Hash of the grouping table: the crowd points content plus the mode.
#[must_use]
pub fn grouping_hash(crowd_object_hash: HashKey, mode: i32) -> HashKey {
    let mut h = KeyHasher::new();
    h.append("agentGrouping").append(&crowd_object_hash).append(&mode);
    h.finish()
}

/// Groups the crowd points into an [`AgentGroupingTable`].
///
/// `path` is only used to attribute errors to the location being evaluated.
pub fn group_agents(
    points: &PointsPrimitive,
    mode: GroupingMode,
    path: &ScenePath,
) -> Result<AgentGroupingTable> {
    let agent_types = string_variable(points, AGENT_TYPE, path)?;
    let variations = string_variable(points, VARIATION, path)?;
    let agent_ids = int_variable(points, AGENT_ID, path)?;

    for (name, len) in [(VARIATION, variations.len()), (AGENT_ID, agent_ids.len())] {
        if len != agent_types.len() {
            return Err(CrowdError::invalid(
                path,
                format!(
                    "\"{name}\" has {len} elements but \"{AGENT_TYPE}\" has {}",
                    agent_types.len()
                ),
            ));
        }
    }

    match mode {
        GroupingMode::ByTypeAndVariation => {
            let mut grouped: BTreeMap<&str, BTreeMap<&str, Vec<Symbol>>> = BTreeMap::new();
            for ((agent_type, variation), id) in agent_types.iter().zip(variations).zip(agent_ids) {
                grouped
                    .entry(agent_type.as_str())
                    .or_default()
                    .entry(variation.as_str())
                    .or_default()
                    .push(interner::intern(&id.to_string()));
            }

            let types = grouped
                .into_iter()
                .map(|(agent_type, variations)| {
                    let variations: BTreeMap<String, Arc<[Symbol]>> = variations
                        .into_iter()
                        .map(|(variation, ids)| (variation.to_string(), Arc::from(ids)))
                        .collect();
                    (agent_type.to_string(), variations)
                })
                .collect();

            log::debug!(
                "Grouped {} agents at {path} (mode {})",
                agent_types.len(),
                mode.as_mode()
            );

            Ok(AgentGroupingTable {
                types,
                len: agent_types.len(),
            })
        }
    }
}

fn variable<'a>(points: &'a PointsPrimitive, name: &str, path: &ScenePath) -> Result<&'a Data> {
    points.variable(name).map(|v| &v.data).ok_or_else(|| {
        CrowdError::invalid(
            path,
            format!("input crowd must be a points primitive containing a \"{name}\" vertex variable"),
        )
    })
}

fn string_variable<'a>(
    points: &'a PointsPrimitive,
    name: &str,
    path: &ScenePath,
) -> Result<&'a [String]> {
    match variable(points, name, path)? {
        Data::StringVector(values) => Ok(values),
        other => Err(CrowdError::invalid(
            path,
            format!("\"{name}\" must be StringVector, found {}", other.type_name()),
        )),
    }
}

fn int_variable<'a>(points: &'a PointsPrimitive, name: &str, path: &ScenePath) -> Result<&'a [i32]> {
    match variable(points, name, path)? {
        Data::IntVector(values) => Ok(values),
        other => Err(CrowdError::invalid(
            path,
            format!("\"{name}\" must be IntVector, found {}", other.type_name()),
        )),
    }
}
