//! Generic child bound unions.
//!
//! Non-leaf locations have no geometry of their own; their bound is the
//! union of their children's bounds, each moved into the parent's space by
//! that child's transform.

use crate::data::BoundingBox;
use crate::errors::Result;
use crate::hash::{HashKey, KeyHasher};
use crate::scene::{SceneSource, ScenePath};

/// Union of every child's bound, each transformed by that child's transform.
pub fn union_of_transformed_child_bounds<S>(scene: &S, path: &ScenePath) -> Result<BoundingBox>
where
    S: SceneSource + ?Sized,
{
    let mut result = BoundingBox::EMPTY;
    for &child in scene.child_names(path)?.iter() {
        let child_path = path.child_symbol(child);
        let bound = scene.bound(&child_path)?;
        let transform = scene.transform(&child_path)?;
        result = result.union(&bound.transform(&transform));
    }
    Ok(result)
}

pub fn hash_of_transformed_child_bounds<S>(scene: &S, path: &ScenePath) -> Result<HashKey>
where
    S: SceneSource + ?Sized,
{
    let mut h = KeyHasher::new();
    h.append("transformedChildBounds");
    h.append(&scene.child_names_hash(path)?);
    for &child in scene.child_names(path)?.iter() {
        let child_path = path.child_symbol(child);
        h.append(&scene.bound_hash(&child_path)?);
        h.append(&scene.transform_hash(&child_path)?);
    }
    Ok(h.finish())
}
