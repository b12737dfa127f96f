//! Bounds and transforms of generated locations.
//!
//! Above the agent level every location sits at the identity and is bounded
//! by its children. An agent leaf takes its transform from the agent's
//! `rootMatrix` and its bound from the world-space `boundingBox` brought
//! back into the agent's local space. Below the leaf the template scene
//! answers.

use glam::Mat4;

use crate::crowd::CrowdGenerator;
use crate::crowd::classify::PathKind;
use crate::crowd::input::{BOUNDING_BOX, ROOT_MATRIX, agent_record};
use crate::crowd::scope::agent_scope;
use crate::data::{BoundingBox, CompoundData};
use crate::errors::{CrowdError, Result};
use crate::hash::{HashKey, KeyHasher};
use crate::scene::{ScenePath, traversal};

/// Local bound of an agent record: its world `boundingBox` mapped through
/// the inverse of its `rootMatrix`.
pub fn agent_local_bound(record: &CompoundData, path: &ScenePath) -> Result<BoundingBox> {
    let bounding_box = record
        .box3d(BOUNDING_BOX)
        .ok_or_else(|| CrowdError::missing_pose(path, BOUNDING_BOX))?;
    let root_matrix = record
        .m44d(ROOT_MATRIX)
        .ok_or_else(|| CrowdError::missing_pose(path, ROOT_MATRIX))?;

    bounding_box
        .to_local(root_matrix)
        .ok_or_else(|| CrowdError::invalid(path, format!("\"{ROOT_MATRIX}\" is not invertible")))
}

/// Local transform of an agent record.
pub fn agent_transform(record: &CompoundData, path: &ScenePath) -> Result<Mat4> {
    record
        .m44d(ROOT_MATRIX)
        .map(|m| m.as_mat4())
        .ok_or_else(|| CrowdError::missing_pose(path, ROOT_MATRIX))
}

impl CrowdGenerator {
    pub(crate) fn branch_bound(&self, path: &ScenePath) -> Result<BoundingBox> {
        match PathKind::from_depth(path.len()) {
            PathKind::AgentLeaf => {
                let crowd = self.crowd().attributes();
                let record = agent_record(&crowd, path.name(3).unwrap_or_default(), path)?;
                agent_local_bound(record, path)
            }
            PathKind::NestedInternal => self.agents().bound(&agent_scope(path)),
            _ => traversal::union_of_transformed_child_bounds(self, path),
        }
    }

    pub(crate) fn branch_bound_hash(&self, path: &ScenePath) -> Result<HashKey> {
        let kind = PathKind::from_depth(path.len());
        let mut h = KeyHasher::new();
        h.append("bound");
        match kind {
            PathKind::AgentLeaf => {
                h.write_tag(1);
                self.hash_agent_members(path, &[BOUNDING_BOX, ROOT_MATRIX], &mut h);
            }
            PathKind::NestedInternal => {
                h.write_tag(2);
                h.append(&self.agents().bound_hash(&agent_scope(path))?);
            }
            _ => {
                h.write_tag(0);
                h.append(&traversal::hash_of_transformed_child_bounds(self, path)?);
            }
        }
        Ok(h.finish())
    }

    pub(crate) fn branch_transform(&self, path: &ScenePath) -> Result<Mat4> {
        match PathKind::from_depth(path.len()) {
            PathKind::AgentLeaf => {
                let crowd = self.crowd().attributes();
                let record = agent_record(&crowd, path.name(3).unwrap_or_default(), path)?;
                agent_transform(record, path)
            }
            PathKind::NestedInternal => self.agents().transform(&agent_scope(path)),
            _ => Ok(Mat4::IDENTITY),
        }
    }

    pub(crate) fn branch_transform_hash(&self, path: &ScenePath) -> Result<HashKey> {
        let mut h = KeyHasher::new();
        h.append("transform");
        match PathKind::from_depth(path.len()) {
            PathKind::AgentLeaf => {
                h.write_tag(1);
                self.hash_agent_members(path, &[ROOT_MATRIX], &mut h);
            }
            PathKind::NestedInternal => {
                h.write_tag(2);
                h.append(&self.agents().transform_hash(&agent_scope(path))?);
            }
            _ => {
                h.write_tag(0);
            }
        }
        Ok(h.finish())
    }

    /// Appends the agent id segment of `path` and the named members of the
    /// agent's record, or an absence marker when there is no record.
    fn hash_agent_members(&self, path: &ScenePath, members: &[&str], h: &mut KeyHasher) {
        let agent_id = path.name(3).unwrap_or_default();
        h.append(agent_id);
        let crowd = self.crowd().attributes();
        match crowd.compound(agent_id) {
            Some(record) => {
                h.write_tag(1);
                for member in members {
                    record.hash_member(member, h);
                }
            }
            None => {
                h.write_tag(0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{DMat4, DVec3, Vec3};

    use super::*;
    use crate::crowd::input::AgentRecord;
    use crate::data::Box3d;

    fn leaf() -> ScenePath {
        ScenePath::from("/agents/robot/a/1")
    }

    #[test]
    fn local_bound_undoes_root_translation() {
        let record: CompoundData = AgentRecord {
            root_matrix: Some(DMat4::from_translation(DVec3::new(10.0, 0.0, 0.0))),
            bounding_box: Some(Box3d::new(DVec3::new(9.0, -1.0, -1.0), DVec3::new(11.0, 1.0, 1.0))),
            ..AgentRecord::default()
        }
        .into();

        let bound = agent_local_bound(&record, &leaf()).unwrap();
        assert!(bound.min.abs_diff_eq(Vec3::splat(-1.0), 1e-6));
        assert!(bound.max.abs_diff_eq(Vec3::splat(1.0), 1e-6));
    }

    #[test]
    fn missing_bounding_box_is_missing_pose() {
        let record: CompoundData = AgentRecord {
            root_matrix: Some(DMat4::IDENTITY),
            ..AgentRecord::default()
        }
        .into();
        let err = agent_local_bound(&record, &leaf()).unwrap_err();
        assert!(matches!(err, CrowdError::MissingPose { field: BOUNDING_BOX, .. }));
    }

    #[test]
    fn singular_root_matrix_is_invalid() {
        let record: CompoundData = AgentRecord {
            root_matrix: Some(DMat4::ZERO),
            bounding_box: Some(Box3d::new(DVec3::ZERO, DVec3::ONE)),
            ..AgentRecord::default()
        }
        .into();
        let err = agent_local_bound(&record, &leaf()).unwrap_err();
        assert!(matches!(err, CrowdError::InvalidInput { .. }));
    }

    #[test]
    fn transform_narrows_root_matrix() {
        let record: CompoundData = AgentRecord {
            root_matrix: Some(DMat4::from_translation(DVec3::new(1.0, 2.0, 3.0))),
            ..AgentRecord::default()
        }
        .into();
        let m = agent_transform(&record, &leaf()).unwrap();
        assert_eq!(m.w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
    }
}
