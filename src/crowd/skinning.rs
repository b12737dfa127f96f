//! Linear-blend skinning of agent template meshes.
//!
//! Each template mesh carries its skin binding as three flat arrays in its
//! attributes: `jointIndexCount[p]` influences for point `p`, whose joint
//! indices and weights are stored back to back in `jointIndices` and
//! `jointWeights`. A deformed point is
//!
//! ```text
//! p' = Σ_k weight[k] * (poseWorldMatrices[jointIndices[k]] * (p, 1))
//! ```
//!
//! with the homogeneous component dropped afterwards. Weights are used as
//! stored. Normals follow the same sum with `w = 0` using the normal pose
//! matrices, and are renormalized.
//!
//! Matrices are stored column-major with translation in the last column,
//! so the row-vector form `(p, 1) * M` reads `M * (p, 1)` here.

use std::sync::Arc;

use glam::{DMat4, DVec4, Vec3};

use crate::crowd::CrowdGenerator;
use crate::crowd::input::{
    AGENT_TYPES, METADATA, POSE_NORMAL_WORLD_MATRICES, POSE_WORLD_MATRICES, WORLD_BIND_MATRICES, agent_record,
    agent_type_record,
};
use crate::crowd::scope::agent_scope;
use crate::data::{CompoundData, Interpolation, MeshPrimitive, Object, PrimitiveVariable};
use crate::errors::{CrowdError, Result};
use crate::hash::{HashKey, KeyHasher};
use crate::scene::ScenePath;

pub const JOINT_INDEX_COUNT: &str = "jointIndexCount";
pub const JOINT_INDICES: &str = "jointIndices";
pub const JOINT_WEIGHTS: &str = "jointWeights";

/// Borrowed view of a mesh's skin binding.
#[derive(Debug, Clone, Copy)]
pub struct SkinBinding<'a> {
    pub counts: &'a [i32],
    pub indices: &'a [i32],
    pub weights: &'a [f32],
}

/// Per-point cursor offsets into the flat influence arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfluenceLayout {
    offsets: Vec<usize>,
    counts: Vec<usize>,
    /// One past the largest joint index referenced.
    required_joints: usize,
}

impl InfluenceLayout {
    /// Number of points the binding covers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Start of `point`'s influences in the flat arrays.
    ///
    /// # Panics
    ///
    /// Panics if `point >= self.len()`.
    #[must_use]
    pub fn offset(&self, point: usize) -> usize {
        self.offsets[point]
    }

    #[must_use]
    pub fn required_joints(&self) -> usize {
        self.required_joints
    }

    fn check_joints(&self, available: usize, table: &str, path: &ScenePath) -> Result<()> {
        if self.required_joints > available {
            return Err(CrowdError::invalid(
                path,
                format!(
                    "skin binding references joint {} but \"{table}\" holds {available} matrices",
                    self.required_joints - 1
                ),
            ));
        }
        Ok(())
    }
}

impl<'a> SkinBinding<'a> {
    /// Reads the binding from mesh attributes; `None` if any array is absent.
    #[must_use]
    pub fn from_attributes(attributes: &'a CompoundData) -> Option<Self> {
        Some(Self {
            counts: attributes.int_vector(JOINT_INDEX_COUNT)?,
            indices: attributes.int_vector(JOINT_INDICES)?,
            weights: attributes.float_vector(JOINT_WEIGHTS)?,
        })
    }

    /// Walks the influence counts once, recording each point's cursor offset
    /// and checking that the flat arrays are consistent.
    pub fn layout(&self, path: &ScenePath) -> Result<InfluenceLayout> {
        if self.indices.len() != self.weights.len() {
            return Err(CrowdError::invalid(
                path,
                format!(
                    "\"{JOINT_INDICES}\" has {} entries but \"{JOINT_WEIGHTS}\" has {}",
                    self.indices.len(),
                    self.weights.len()
                ),
            ));
        }

        let mut offsets = Vec::with_capacity(self.counts.len());
        let mut counts = Vec::with_capacity(self.counts.len());
        let mut cursor = 0_usize;
        for (point, &count) in self.counts.iter().enumerate() {
            let count = usize::try_from(count).map_err(|_| {
                CrowdError::invalid(path, format!("negative joint count {count} at point {point}"))
            })?;
            offsets.push(cursor);
            counts.push(count);
            cursor += count;
        }

        if cursor > self.indices.len() {
            return Err(CrowdError::invalid(
                path,
                format!(
                    "skin binding needs {cursor} influences but only {} are stored",
                    self.indices.len()
                ),
            ));
        }

        let mut required_joints = 0;
        for &joint in &self.indices[..cursor] {
            let joint = usize::try_from(joint).map_err(|_| {
                CrowdError::invalid(path, format!("negative joint index {joint}"))
            })?;
            required_joints = required_joints.max(joint + 1);
        }

        Ok(InfluenceLayout {
            offsets,
            counts,
            required_joints,
        })
    }

    fn influences(
        &self,
        layout: &InfluenceLayout,
        point: usize,
    ) -> impl Iterator<Item = (usize, f64)> + '_ {
        let start = layout.offsets[point];
        let end = start + layout.counts[point];
        self.indices[start..end]
            .iter()
            .zip(&self.weights[start..end])
            .map(|(&joint, &weight)| (joint as usize, f64::from(weight)))
    }

    fn blend(&self, layout: &InfluenceLayout, point: usize, v: DVec4, matrices: &[DMat4]) -> DVec4 {
        self.influences(layout, point)
            .fold(DVec4::ZERO, |acc, (joint, weight)| acc + matrices[joint] * v * weight)
    }
}

/// Deforms points in place.
///
/// # Panics
///
/// Panics if `points` has more entries than `layout` covers, or if `pose`
/// holds fewer than [`InfluenceLayout::required_joints`] matrices.
/// [`skin_mesh`] checks both before calling.
pub fn skin_points(
    points: &mut [Vec3],
    binding: &SkinBinding<'_>,
    layout: &InfluenceLayout,
    pose: &[DMat4],
) {
    for (index, point) in points.iter_mut().enumerate() {
        let current = point.as_dvec3().extend(1.0);
        *point = binding.blend(layout, index, current, pose).truncate().as_vec3();
    }
}

/// Deforms normals in place. `normal_points[n]` is the point normal `n`
/// belongs to; several normals may share a point.
///
/// # Panics
///
/// Panics if a `normal_points` entry is outside `layout`, or if
/// `normal_pose` holds fewer than [`InfluenceLayout::required_joints`]
/// matrices.
pub fn skin_normals(
    normals: &mut [Vec3],
    normal_points: &[usize],
    binding: &SkinBinding<'_>,
    layout: &InfluenceLayout,
    normal_pose: &[DMat4],
) {
    for (normal, &point) in normals.iter_mut().zip(normal_points) {
        let current = normal.as_dvec3().extend(0.0);
        *normal = binding
            .blend(layout, point, current, normal_pose)
            .truncate()
            .normalize_or_zero()
            .as_vec3();
    }
}

/// Point index of every normal, following the normal's interpolation.
fn normal_points(
    interpolation: Interpolation,
    normal_count: usize,
    vertex_ids: &[i32],
    point_count: usize,
    path: &ScenePath,
) -> Result<Option<Vec<usize>>> {
    let indices: Vec<usize> = match interpolation {
        Interpolation::FaceVarying => {
            if normal_count != vertex_ids.len() {
                return Err(CrowdError::invalid(
                    path,
                    format!(
                        "{normal_count} face-varying normals for {} face-vertices",
                        vertex_ids.len()
                    ),
                ));
            }
            vertex_ids.iter().map(|&id| id as usize).collect()
        }
        Interpolation::Vertex => (0..normal_count).collect(),
        other => {
            log::warn!("Normals at {path} have {other:?} interpolation; leaving them unskinned");
            return Ok(None);
        }
    };

    if let Some(&bad) = indices.iter().find(|&&p| p >= point_count) {
        return Err(CrowdError::invalid(
            path,
            format!("normal references point {bad} but the skin binding covers {point_count} points"),
        ));
    }
    Ok(Some(indices))
}

/// Skins a copy of `template`.
///
/// Without a binding the copy is returned as is. Missing `P` or `N`
/// channels, or absent or empty normal pose matrices, skip the
/// corresponding step with a warning.
pub fn skin_mesh(
    template: &MeshPrimitive,
    binding: Option<&SkinBinding<'_>>,
    pose: &[DMat4],
    normal_pose: Option<&[DMat4]>,
    path: &ScenePath,
) -> Result<MeshPrimitive> {
    let mut result = template.clone();
    let Some(binding) = binding else {
        return Ok(result);
    };

    let layout = binding.layout(path)?;
    layout.check_joints(pose.len(), POSE_WORLD_MATRICES, path)?;

    match result.v3f_variable_mut("P") {
        Some((_, points)) => {
            if points.len() != layout.len() {
                return Err(CrowdError::invalid(
                    path,
                    format!(
                        "mesh has {} points but \"{JOINT_INDEX_COUNT}\" has {} entries",
                        points.len(),
                        layout.len()
                    ),
                ));
            }
            skin_points(points, binding, &layout, pose);
        }
        None => log::warn!("No points found at {path}; point deformation skipped"),
    }

    match (result.v3f_variable_mut("N"), normal_pose) {
        (Some((interpolation, normals)), Some(normal_pose)) if !normal_pose.is_empty() => {
            layout.check_joints(normal_pose.len(), POSE_NORMAL_WORLD_MATRICES, path)?;
            if let Some(indices) =
                normal_points(interpolation, normals.len(), &template.vertex_ids, layout.len(), path)?
            {
                skin_normals(normals, &indices, binding, &layout, normal_pose);
            }
        }
        (Some(_), _) => {
            log::warn!("No \"{POSE_NORMAL_WORLD_MATRICES}\" for {path}; normals left unskinned");
        }
        (None, _) => log::warn!("No normals found at {path}"),
    }

    Ok(result)
}

/// Adds every metadata member as a constant primitive variable, replacing
/// variables of the same name.
pub fn attach_metadata(mesh: &mut MeshPrimitive, metadata: &CompoundData) {
    for (name, value) in metadata.iter() {
        mesh.variables
            .insert(name.to_string(), PrimitiveVariable::constant(value.clone()));
    }
}

// ============================================================================
// Agent leaf object
// ============================================================================

impl CrowdGenerator {
    /// The deformed mesh of the agent at `path` (depth four).
    pub(crate) fn agent_object(&self, path: &ScenePath) -> Result<Arc<Object>> {
        let scope = agent_scope(path);
        let template = self.agents().object(&scope)?;
        let Some(mesh) = template.as_mesh() else {
            return Ok(template);
        };
        let mesh_attributes = self.agents().attributes(&scope)?;

        let crowd = self.crowd().attributes();
        let agent_type = path.name(1).unwrap_or_default();
        let agent_id = path.name(3).unwrap_or_default();

        let type_record = agent_type_record(&crowd, agent_type, path)?;
        if type_record.m44d_vector(WORLD_BIND_MATRICES).is_none() {
            return Err(CrowdError::invalid(
                path,
                format!("no bind matrices found for agent type \"{agent_type}\""),
            ));
        }
        let record = agent_record(&crowd, agent_id, path)?;

        let pose = match record.m44d_vector(POSE_WORLD_MATRICES) {
            Some(pose) if !pose.is_empty() => pose,
            _ => {
                log::warn!("No pose for agent {path}; using the unskinned template");
                return Ok(template);
            }
        };
        let normal_pose = record.m44d_vector(POSE_NORMAL_WORLD_MATRICES).map(Vec::as_slice);

        let binding = SkinBinding::from_attributes(&mesh_attributes);
        if binding.is_none() {
            log::warn!("No skin binding on template {scope}; agent {path} is not deformed");
        }

        let mut result = skin_mesh(mesh, binding.as_ref(), pose, normal_pose, path)?;
        if let Some(metadata) = record.compound(METADATA) {
            attach_metadata(&mut result, metadata);
        }

        log::debug!("Skinned agent {path} with {} joints", pose.len());
        Ok(Arc::new(Object::Mesh(result)))
    }

    pub(crate) fn agent_object_hash(&self, path: &ScenePath) -> Result<HashKey> {
        let scope = agent_scope(path);
        let mut h = KeyHasher::new();
        h.append("agentObject");
        h.append(&self.agents().object_hash(&scope)?);
        h.append(&self.agents().attributes_hash(&scope)?);

        let crowd = self.crowd().attributes();
        let agent_type = path.name(1).unwrap_or_default();
        let agent_id = path.name(3).unwrap_or_default();

        h.append(agent_type);
        match crowd
            .compound(AGENT_TYPES)
            .and_then(|types| types.compound(agent_type))
        {
            Some(type_record) => {
                h.write_tag(1);
                type_record.hash_member(WORLD_BIND_MATRICES, &mut h);
            }
            None => {
                h.write_tag(0);
            }
        }

        h.append(agent_id);
        match crowd.compound(agent_id) {
            Some(record) => {
                h.write_tag(1);
                for member in [POSE_WORLD_MATRICES, POSE_NORMAL_WORLD_MATRICES, METADATA] {
                    record.hash_member(member, &mut h);
                }
            }
            None => {
                h.write_tag(0);
            }
        }

        Ok(h.finish())
    }
}
