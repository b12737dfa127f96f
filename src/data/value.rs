use std::collections::BTreeMap;

use glam::{DMat4, Mat4, Vec3};

use crate::data::bounds::Box3d;
use crate::hash::{ContentHash, KeyHasher};

/// A typed attribute value.
///
/// This is the vocabulary shared by crowd records, template attributes and
/// primitive variables. Vector variants hold per-element data; everything
/// else is a single value.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Bool(bool),
    Int(i32),
    Float(f32),
    Double(f64),
    String(String),
    V3f(Vec3),
    M44f(Mat4),
    M44d(DMat4),
    Box3d(Box3d),
    IntVector(Vec<i32>),
    FloatVector(Vec<f32>),
    StringVector(Vec<String>),
    V3fVector(Vec<Vec3>),
    M44dVector(Vec<DMat4>),
    Compound(CompoundData),
}

impl Data {
    /// Short name of the stored type, used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Data::Bool(_) => "Bool",
            Data::Int(_) => "Int",
            Data::Float(_) => "Float",
            Data::Double(_) => "Double",
            Data::String(_) => "String",
            Data::V3f(_) => "V3f",
            Data::M44f(_) => "M44f",
            Data::M44d(_) => "M44d",
            Data::Box3d(_) => "Box3d",
            Data::IntVector(_) => "IntVector",
            Data::FloatVector(_) => "FloatVector",
            Data::StringVector(_) => "StringVector",
            Data::V3fVector(_) => "V3fVector",
            Data::M44dVector(_) => "M44dVector",
            Data::Compound(_) => "Compound",
        }
    }

    /// Element count for vector data, `None` for single values.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Data::IntVector(v) => Some(v.len()),
            Data::FloatVector(v) => Some(v.len()),
            Data::StringVector(v) => Some(v.len()),
            Data::V3fVector(v) => Some(v.len()),
            Data::M44dVector(v) => Some(v.len()),
            _ => None,
        }
    }
}

impl ContentHash for Data {
    fn content_hash(&self, h: &mut KeyHasher) {
        match self {
            Data::Bool(v) => h.write_tag(0).append(v),
            Data::Int(v) => h.write_tag(1).append(v),
            Data::Float(v) => h.write_tag(2).append(v),
            Data::Double(v) => h.write_tag(3).append(v),
            Data::String(v) => h.write_tag(4).append(v),
            Data::V3f(v) => h.write_tag(5).append(v),
            Data::M44f(v) => h.write_tag(6).append(v),
            Data::M44d(v) => h.write_tag(7).append(v),
            Data::Box3d(v) => h.write_tag(8).append(v),
            Data::IntVector(v) => h.write_tag(9).append(v),
            Data::FloatVector(v) => h.write_tag(10).append(v),
            Data::StringVector(v) => h.write_tag(11).append(v),
            Data::V3fVector(v) => h.write_tag(12).append(v),
            Data::M44dVector(v) => h.write_tag(13).append(v),
            Data::Compound(v) => h.write_tag(14).append(v),
        };
    }
}

/// Named collection of [`Data`] with sorted member order.
///
/// Members are kept in a `BTreeMap` so iteration, and therefore hashing,
/// is independent of insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundData {
    members: BTreeMap<String, Data>,
}

macro_rules! typed_member {
    ($fn_name:ident, $variant:ident, $ty:ty) => {
        #[must_use]
        pub fn $fn_name(&self, name: &str) -> Option<&$ty> {
            match self.members.get(name) {
                Some(Data::$variant(v)) => Some(v),
                _ => None,
            }
        }
    };
}

impl CompoundData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: Data) -> Self {
        self.members.insert(name.into(), value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Data) -> Option<Data> {
        self.members.insert(name.into(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<Data> {
        self.members.remove(name)
    }

    #[must_use]
    pub fn member(&self, name: &str) -> Option<&Data> {
        self.members.get(name)
    }

    pub fn member_mut(&mut self, name: &str) -> Option<&mut Data> {
        self.members.get_mut(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Data)> {
        self.members.iter().map(|(k, v)| (k.as_str(), v))
    }

    typed_member!(compound, Compound, CompoundData);
    typed_member!(m44d, M44d, DMat4);
    typed_member!(box3d, Box3d, Box3d);
    typed_member!(m44d_vector, M44dVector, Vec<DMat4>);
    typed_member!(int_vector, IntVector, Vec<i32>);
    typed_member!(float_vector, FloatVector, Vec<f32>);
    typed_member!(string_vector, StringVector, Vec<String>);

    /// Hashes a single member, recording its absence as well as its content.
    pub fn hash_member(&self, name: &str, h: &mut KeyHasher) {
        h.append(name).append(&self.members.get(name));
    }
}

impl ContentHash for CompoundData {
    fn content_hash(&self, h: &mut KeyHasher) {
        h.write_len(self.members.len());
        for (name, value) in &self.members {
            h.append(name).append(value);
        }
    }
}

impl FromIterator<(String, Data)> for CompoundData {
    fn from_iter<I: IntoIterator<Item = (String, Data)>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}
