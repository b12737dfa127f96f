//! The flat crowd input and its record layout.
//!
//! The crowd object is a points primitive with three per-point variables:
//! `agentType` (strings), `variation` (strings) and `agentId` (ints). The
//! crowd attributes compound holds one member per agent, named by its id,
//! and an `agentTypes` member holding one record per agent type.

use std::sync::Arc;

use glam::DMat4;

use crate::data::{Box3d, CompoundData, Data, Interpolation, Object, PointsPrimitive, PrimitiveVariable};
use crate::errors::{CrowdError, Result};
use crate::hash::{HashKey, hash_of};
use crate::scene::{CrowdSource, ScenePath};

pub const AGENT_TYPE: &str = "agentType";
pub const VARIATION: &str = "variation";
pub const AGENT_ID: &str = "agentId";

pub const AGENT_TYPES: &str = "agentTypes";
pub const WORLD_BIND_MATRICES: &str = "worldBindMatrices";

pub const ROOT_MATRIX: &str = "rootMatrix";
pub const BOUNDING_BOX: &str = "boundingBox";
pub const POSE_WORLD_MATRICES: &str = "poseWorldMatrices";
pub const POSE_NORMAL_WORLD_MATRICES: &str = "poseNormalWorldMatrices";
pub const METADATA: &str = "metadata";

/// Immutable crowd input with content hashes computed once at construction.
#[derive(Debug, Clone)]
pub struct CrowdInput {
    object: Arc<Object>,
    object_hash: HashKey,
    attributes: Arc<CompoundData>,
    attributes_hash: HashKey,
}

impl CrowdInput {
    #[must_use]
    pub fn new(object: Object, attributes: CompoundData) -> Self {
        let object_hash = hash_of(&object);
        let attributes_hash = hash_of(&attributes);
        Self {
            object: Arc::new(object),
            object_hash,
            attributes: Arc::new(attributes),
            attributes_hash,
        }
    }
}

impl CrowdSource for CrowdInput {
    fn object(&self) -> Arc<Object> {
        Arc::clone(&self.object)
    }

    fn object_hash(&self) -> HashKey {
        self.object_hash
    }

    fn attributes(&self) -> Arc<CompoundData> {
        Arc::clone(&self.attributes)
    }

    fn attributes_hash(&self) -> HashKey {
        self.attributes_hash
    }
}

/// Builds the crowd points primitive from `(agentType, variation, agentId)`
/// samples, in order.
pub fn agent_points<S: AsRef<str>>(agents: &[(S, S, i32)]) -> PointsPrimitive {
    let types = agents.iter().map(|(t, _, _)| t.as_ref().to_string()).collect();
    let variations = agents.iter().map(|(_, v, _)| v.as_ref().to_string()).collect();
    let ids = agents.iter().map(|&(_, _, id)| id).collect();

    PointsPrimitive::new(agents.len())
        .with_variable(
            AGENT_TYPE,
            PrimitiveVariable::new(Interpolation::Vertex, Data::StringVector(types)),
        )
        .with_variable(
            VARIATION,
            PrimitiveVariable::new(Interpolation::Vertex, Data::StringVector(variations)),
        )
        .with_variable(
            AGENT_ID,
            PrimitiveVariable::new(Interpolation::Vertex, Data::IntVector(ids)),
        )
}

/// Per-agent record. Absent fields are simply not written.
#[derive(Debug, Clone, Default)]
pub struct AgentRecord {
    pub root_matrix: Option<DMat4>,
    pub bounding_box: Option<Box3d>,
    pub pose_world_matrices: Option<Vec<DMat4>>,
    pub pose_normal_world_matrices: Option<Vec<DMat4>>,
    pub metadata: Option<CompoundData>,
}

impl From<AgentRecord> for CompoundData {
    fn from(record: AgentRecord) -> Self {
        let mut data = CompoundData::new();
        if let Some(m) = record.root_matrix {
            data.insert(ROOT_MATRIX, Data::M44d(m));
        }
        if let Some(b) = record.bounding_box {
            data.insert(BOUNDING_BOX, Data::Box3d(b));
        }
        if let Some(p) = record.pose_world_matrices {
            data.insert(POSE_WORLD_MATRICES, Data::M44dVector(p));
        }
        if let Some(n) = record.pose_normal_world_matrices {
            data.insert(POSE_NORMAL_WORLD_MATRICES, Data::M44dVector(n));
        }
        if let Some(meta) = record.metadata {
            data.insert(METADATA, Data::Compound(meta));
        }
        data
    }
}

/// Assembles the crowd attributes compound from agent and agent-type records.
pub fn crowd_attributes<A, T>(agents: A, agent_types: T) -> CompoundData
where
    A: IntoIterator<Item = (i32, AgentRecord)>,
    T: IntoIterator<Item = (String, Vec<DMat4>)>,
{
    let mut types = CompoundData::new();
    for (name, bind_matrices) in agent_types {
        types.insert(
            name,
            Data::Compound(
                CompoundData::new().with(WORLD_BIND_MATRICES, Data::M44dVector(bind_matrices)),
            ),
        );
    }

    let mut result = CompoundData::new().with(AGENT_TYPES, Data::Compound(types));
    for (id, record) in agents {
        result.insert(id.to_string(), Data::Compound(record.into()));
    }
    result
}

/// Looks up the record of the agent named `agent_id`.
pub(crate) fn agent_record<'a>(
    crowd: &'a CompoundData,
    agent_id: &str,
    path: &ScenePath,
) -> Result<&'a CompoundData> {
    crowd
        .compound(agent_id)
        .ok_or_else(|| CrowdError::invalid(path, format!("no agent \"{agent_id}\" found")))
}

/// Looks up the record of `agent_type` under the `agentTypes` compound.
pub(crate) fn agent_type_record<'a>(
    crowd: &'a CompoundData,
    agent_type: &str,
    path: &ScenePath,
) -> Result<&'a CompoundData> {
    let types = crowd
        .compound(AGENT_TYPES)
        .ok_or_else(|| CrowdError::invalid(path, "no agent types found"))?;
    types
        .compound(agent_type)
        .ok_or_else(|| CrowdError::invalid(path, format!("no agent type \"{agent_type}\" found")))
}
