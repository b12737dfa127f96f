use std::sync::{Arc, OnceLock};

use glam::Mat4;
use rustc_hash::FxHashMap;

use crate::data::{BoundingBox, CompoundData, Object};
use crate::errors::{CrowdError, Result};
use crate::hash::{HashKey, KeyHasher, hash_of};
use crate::scene::traversal;
use crate::scene::{SceneSource, ScenePath};
use crate::utils::Symbol;

/// One location of a [`MemoryScene`].
///
/// Content hashes of the attributes and object are computed on first use
/// and reset whenever the value is replaced.
#[derive(Debug, Clone)]
pub struct Location {
    transform: Mat4,
    bound: Option<BoundingBox>,
    attributes: Arc<CompoundData>,
    object: Arc<Object>,
    children: Arc<[Symbol]>,

    attributes_hash: OnceLock<HashKey>,
    object_hash: OnceLock<HashKey>,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            transform: Mat4::IDENTITY,
            bound: None,
            attributes: Arc::new(CompoundData::new()),
            object: Arc::new(Object::Null),
            children: Arc::from([]),
            attributes_hash: OnceLock::new(),
            object_hash: OnceLock::new(),
        }
    }
}

impl Location {
    #[inline]
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    /// Explicit bound, if one was authored.
    #[inline]
    pub fn explicit_bound(&self) -> Option<BoundingBox> {
        self.bound
    }

    #[inline]
    pub fn attributes(&self) -> &Arc<CompoundData> {
        &self.attributes
    }

    #[inline]
    pub fn object(&self) -> &Arc<Object> {
        &self.object
    }

    #[inline]
    pub fn children(&self) -> &[Symbol] {
        &self.children
    }

    pub fn set_transform(&mut self, transform: Mat4) -> &mut Self {
        self.transform = transform;
        self
    }

    pub fn set_bound(&mut self, bound: BoundingBox) -> &mut Self {
        self.bound = Some(bound);
        self
    }

    pub fn set_attributes(&mut self, attributes: CompoundData) -> &mut Self {
        self.attributes = Arc::new(attributes);
        self.attributes_hash = OnceLock::new();
        self
    }

    pub fn set_object(&mut self, object: Object) -> &mut Self {
        self.object = Arc::new(object);
        self.object_hash = OnceLock::new();
        self
    }

    fn attributes_hash(&self) -> HashKey {
        *self.attributes_hash.get_or_init(|| hash_of(self.attributes.as_ref()))
    }

    fn object_hash(&self) -> HashKey {
        *self.object_hash.get_or_init(|| hash_of(self.object.as_ref()))
    }

    fn add_child(&mut self, name: Symbol) {
        if !self.children.contains(&name) {
            let mut children = self.children.to_vec();
            children.push(name);
            self.children = Arc::from(children);
        }
    }
}

/// In-memory scene hierarchy.
///
/// Built once through `&mut` access, then shared read-only between threads.
/// This is the form agent template libraries take: one location per
/// `/agentType/variation` holding the reference mesh and its skin-binding
/// attributes, optionally with nested locations below it.
#[derive(Debug, Clone)]
pub struct MemoryScene {
    locations: FxHashMap<ScenePath, Location>,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScene {
    #[must_use]
    pub fn new() -> Self {
        let mut locations = FxHashMap::default();
        locations.insert(ScenePath::root(), Location::default());
        Self { locations }
    }

    #[must_use]
    pub fn location(&self, path: &ScenePath) -> Option<&Location> {
        self.locations.get(path)
    }

    #[must_use]
    pub fn contains(&self, path: &ScenePath) -> bool {
        self.locations.contains_key(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Returns the location at `path`, creating it and any missing ancestors.
    pub fn location_mut(&mut self, path: &ScenePath) -> &mut Location {
        if !self.locations.contains_key(path) {
            let mut current = ScenePath::root();
            for &segment in path.symbols() {
                let child = current.child_symbol(segment);
                if !self.locations.contains_key(&child) {
                    self.locations.insert(child.clone(), Location::default());
                    if let Some(parent) = self.locations.get_mut(&current) {
                        parent.add_child(segment);
                    }
                }
                current = child;
            }
        }
        self.locations.entry(path.clone()).or_default()
    }

    fn get(&self, path: &ScenePath) -> Result<&Location> {
        self.locations
            .get(path)
            .ok_or_else(|| CrowdError::invalid(path, "location does not exist"))
    }
}

impl SceneSource for MemoryScene {
    fn bound(&self, path: &ScenePath) -> Result<BoundingBox> {
        let location = self.get(path)?;
        if let Some(bound) = location.bound {
            return Ok(bound);
        }
        let children = traversal::union_of_transformed_child_bounds(self, path)?;
        Ok(location.object.bound().union(&children))
    }

    fn bound_hash(&self, path: &ScenePath) -> Result<HashKey> {
        let location = self.get(path)?;
        let mut h = KeyHasher::new();
        match location.bound {
            Some(bound) => {
                h.write_tag(0).append(&bound);
            }
            None => {
                h.write_tag(1)
                    .append(&location.object_hash())
                    .append(&traversal::hash_of_transformed_child_bounds(self, path)?);
            }
        }
        Ok(h.finish())
    }

    fn transform(&self, path: &ScenePath) -> Result<Mat4> {
        Ok(self.get(path)?.transform)
    }

    fn transform_hash(&self, path: &ScenePath) -> Result<HashKey> {
        Ok(hash_of(&self.get(path)?.transform))
    }

    fn attributes(&self, path: &ScenePath) -> Result<Arc<CompoundData>> {
        Ok(Arc::clone(&self.get(path)?.attributes))
    }

    fn attributes_hash(&self, path: &ScenePath) -> Result<HashKey> {
        Ok(self.get(path)?.attributes_hash())
    }

    fn object(&self, path: &ScenePath) -> Result<Arc<Object>> {
        Ok(Arc::clone(&self.get(path)?.object))
    }

    fn object_hash(&self, path: &ScenePath) -> Result<HashKey> {
        Ok(self.get(path)?.object_hash())
    }

    fn child_names(&self, path: &ScenePath) -> Result<Arc<[Symbol]>> {
        Ok(Arc::clone(&self.get(path)?.children))
    }

    fn child_names_hash(&self, path: &ScenePath) -> Result<HashKey> {
        let location = self.get(path)?;
        let mut h = KeyHasher::new();
        h.write_len(location.children.len());
        for &child in location.children.iter() {
            h.append(crate::utils::interner::resolve(child));
        }
        Ok(h.finish())
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::data::MeshPrimitive;

    fn path(s: &str) -> ScenePath {
        ScenePath::from(s)
    }

    fn triangle() -> Object {
        Object::Mesh(MeshPrimitive::new(
            vec![3],
            vec![0, 1, 2],
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
        ))
    }

    #[test]
    fn location_mut_creates_ancestors() {
        let mut scene = MemoryScene::new();
        scene.location_mut(&path("/robot/a/body"));
        assert!(scene.contains(&path("/robot")));
        assert!(scene.contains(&path("/robot/a")));
        let children = scene.child_names(&path("/robot")).unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(crate::utils::interner::resolve(children[0]), "a");
    }

    #[test]
    fn bound_includes_transformed_children() {
        let mut scene = MemoryScene::new();
        scene
            .location_mut(&path("/a/b"))
            .set_object(triangle())
            .set_transform(Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0)));
        let bound = scene.bound(&path("/a")).unwrap();
        assert_eq!(bound.min, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(bound.max, Vec3::new(1.0, 1.0, 5.0));
    }

    #[test]
    fn explicit_bound_overrides_object_and_children() {
        let mut scene = MemoryScene::new();
        let p = path("/a");
        scene.location_mut(&path("/a/b")).set_object(triangle());
        let computed = scene.bound(&p).unwrap();
        let computed_hash = scene.bound_hash(&p).unwrap();
        assert!(scene.location(&p).unwrap().explicit_bound().is_none());

        let authored = BoundingBox::new(Vec3::splat(-2.0), Vec3::splat(2.0));
        scene.location_mut(&p).set_bound(authored);
        assert_eq!(scene.location(&p).unwrap().explicit_bound(), Some(authored));
        assert_eq!(scene.bound(&p).unwrap(), authored);
        assert_ne!(computed, authored);
        assert_ne!(scene.bound_hash(&p).unwrap(), computed_hash);

        // Children no longer contribute once a bound is authored.
        scene
            .location_mut(&path("/a/b"))
            .set_transform(Mat4::from_translation(Vec3::splat(100.0)));
        assert_eq!(scene.bound(&p).unwrap(), authored);
    }

    #[test]
    fn replacing_object_changes_hash() {
        let mut scene = MemoryScene::new();
        let p = path("/a");
        scene.location_mut(&p).set_object(triangle());
        let before = scene.object_hash(&p).unwrap();
        scene.location_mut(&p).set_object(Object::Null);
        assert_ne!(before, scene.object_hash(&p).unwrap());
    }

    #[test]
    fn missing_location_is_invalid_input() {
        let scene = MemoryScene::new();
        let err = scene.bound(&path("/nowhere")).unwrap_err();
        assert!(err.is_invalid_input());
    }
}
