use std::collections::BTreeMap;

use glam::Vec3;

use crate::data::bounds::BoundingBox;
use crate::data::value::Data;
use crate::hash::{ContentHash, KeyHasher};

/// How a primitive variable maps onto the primitive's topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interpolation {
    /// One value for the whole primitive.
    Constant,
    /// One value per face.
    Uniform,
    /// One value per point.
    Vertex,
    /// One value per face-vertex.
    FaceVarying,
}

impl ContentHash for Interpolation {
    fn content_hash(&self, h: &mut KeyHasher) {
        h.write_tag(*self as u8);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveVariable {
    pub interpolation: Interpolation,
    pub data: Data,
}

impl PrimitiveVariable {
    #[must_use]
    pub fn new(interpolation: Interpolation, data: Data) -> Self {
        Self { interpolation, data }
    }

    #[must_use]
    pub fn constant(data: Data) -> Self {
        Self::new(Interpolation::Constant, data)
    }
}

impl ContentHash for PrimitiveVariable {
    fn content_hash(&self, h: &mut KeyHasher) {
        h.append(&self.interpolation).append(&self.data);
    }
}

pub type PrimitiveVariables = BTreeMap<String, PrimitiveVariable>;

fn hash_variables(variables: &PrimitiveVariables, h: &mut KeyHasher) {
    h.write_len(variables.len());
    for (name, var) in variables {
        h.append(name).append(var);
    }
}

fn v3f_variable<'a>(variables: &'a PrimitiveVariables, name: &str) -> Option<&'a [Vec3]> {
    match variables.get(name).map(|v| &v.data) {
        Some(Data::V3fVector(values)) => Some(values),
        _ => None,
    }
}

// ============================================================================
// Points
// ============================================================================

/// A point cloud: the shape of the flat crowd input, one point per agent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointsPrimitive {
    num_points: usize,
    pub variables: PrimitiveVariables,
}

impl PointsPrimitive {
    #[must_use]
    pub fn new(num_points: usize) -> Self {
        Self {
            num_points,
            variables: PrimitiveVariables::new(),
        }
    }

    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, variable: PrimitiveVariable) -> Self {
        self.variables.insert(name.into(), variable);
        self
    }

    #[must_use]
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&PrimitiveVariable> {
        self.variables.get(name)
    }

    #[must_use]
    pub fn positions(&self) -> Option<&[Vec3]> {
        v3f_variable(&self.variables, "P")
    }

    #[must_use]
    pub fn bound(&self) -> BoundingBox {
        self.positions().map_or(BoundingBox::EMPTY, BoundingBox::from_points)
    }
}

impl ContentHash for PointsPrimitive {
    fn content_hash(&self, h: &mut KeyHasher) {
        h.append(&self.num_points);
        hash_variables(&self.variables, h);
    }
}

// ============================================================================
// Mesh
// ============================================================================

/// Polygon mesh with point-indexed face-vertices.
///
/// `vertex_ids[v]` is the point referenced by face-vertex `v`, so several
/// face-vertices may share one point.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshPrimitive {
    pub vertices_per_face: Vec<i32>,
    pub vertex_ids: Vec<i32>,
    pub variables: PrimitiveVariables,
}

impl MeshPrimitive {
    #[must_use]
    pub fn new(vertices_per_face: Vec<i32>, vertex_ids: Vec<i32>, positions: Vec<Vec3>) -> Self {
        let mut variables = PrimitiveVariables::new();
        variables.insert(
            "P".to_string(),
            PrimitiveVariable::new(Interpolation::Vertex, Data::V3fVector(positions)),
        );
        Self {
            vertices_per_face,
            vertex_ids,
            variables,
        }
    }

    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, variable: PrimitiveVariable) -> Self {
        self.variables.insert(name.into(), variable);
        self
    }

    #[must_use]
    pub fn num_faces(&self) -> usize {
        self.vertices_per_face.len()
    }

    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&PrimitiveVariable> {
        self.variables.get(name)
    }

    #[must_use]
    pub fn positions(&self) -> Option<&[Vec3]> {
        v3f_variable(&self.variables, "P")
    }

    #[must_use]
    pub fn normals(&self) -> Option<&[Vec3]> {
        v3f_variable(&self.variables, "N")
    }

    /// Mutable access to a `V3fVector` variable, together with its
    /// interpolation.
    pub fn v3f_variable_mut(&mut self, name: &str) -> Option<(Interpolation, &mut Vec<Vec3>)> {
        match self.variables.get_mut(name) {
            Some(PrimitiveVariable {
                interpolation,
                data: Data::V3fVector(values),
            }) => Some((*interpolation, values)),
            _ => None,
        }
    }

    #[must_use]
    pub fn bound(&self) -> BoundingBox {
        self.positions().map_or(BoundingBox::EMPTY, BoundingBox::from_points)
    }
}

impl ContentHash for MeshPrimitive {
    fn content_hash(&self, h: &mut KeyHasher) {
        h.append(&self.vertices_per_face).append(&self.vertex_ids);
        hash_variables(&self.variables, h);
    }
}

// ============================================================================
// Object
// ============================================================================

/// The object stored at a scene location.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Object {
    #[default]
    Null,
    Points(PointsPrimitive),
    Mesh(MeshPrimitive),
}

impl Object {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "NullObject",
            Object::Points(_) => "PointsPrimitive",
            Object::Mesh(_) => "MeshPrimitive",
        }
    }

    #[must_use]
    pub fn as_points(&self) -> Option<&PointsPrimitive> {
        match self {
            Object::Points(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_mesh(&self) -> Option<&MeshPrimitive> {
        match self {
            Object::Mesh(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn bound(&self) -> BoundingBox {
        match self {
            Object::Null => BoundingBox::EMPTY,
            Object::Points(p) => p.bound(),
            Object::Mesh(m) => m.bound(),
        }
    }
}

impl ContentHash for Object {
    fn content_hash(&self, h: &mut KeyHasher) {
        match self {
            Object::Null => {
                h.write_tag(0);
            }
            Object::Points(p) => {
                h.write_tag(1).append(p);
            }
            Object::Mesh(m) => {
                h.write_tag(2).append(m);
            }
        }
    }
}
