//! Value model shared by the crowd input, the agent templates and the
//! generated hierarchy:
//! - [`Data`] / [`CompoundData`]: typed attribute values and records
//! - [`BoundingBox`] / [`Box3d`]: output and world-space bounds
//! - [`Object`]: null, points or mesh primitives with primitive variables

pub mod bounds;
pub mod primitive;
pub mod value;

pub use bounds::{BoundingBox, Box3d};
pub use primitive::{
    Interpolation, MeshPrimitive, Object, PointsPrimitive, PrimitiveVariable, PrimitiveVariables,
};
pub use value::{CompoundData, Data};
