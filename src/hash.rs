//! Content hash keys.
//!
//! Every value the hierarchy produces is addressed by a [`HashKey`] built from
//! exactly the upstream content its computation reads. A cache may treat two
//! equal keys for the same property as proof of equal values, so keys are
//! 128-bit xxh3 digests and every composite value is written with a length
//! prefix (`["ab", "c"]` and `["a", "bc"]` must not collide).
//!
//! ```rust,ignore
//! let mut h = KeyHasher::new();
//! h.append(&"bound").append(&agent_id).append(&root_matrix);
//! let key = h.finish();
//! ```

use std::fmt;

use glam::{DMat4, DVec3, Mat4, Vec3};
use xxhash_rust::xxh3::Xxh3;

/// Opaque 128-bit content fingerprint.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct HashKey(u128);

impl HashKey {
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u128 {
        self.0
    }
}

impl fmt::Display for HashKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl fmt::Debug for HashKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashKey({:032x})", self.0)
    }
}

/// Streaming builder for [`HashKey`]s.
pub struct KeyHasher {
    state: Xxh3,
}

impl Default for KeyHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyHasher {
    #[must_use]
    pub fn new() -> Self {
        Self { state: Xxh3::new() }
    }

    /// Appends any hashable value.
    pub fn append<T: ContentHash + ?Sized>(&mut self, value: &T) -> &mut Self {
        value.content_hash(self);
        self
    }

    /// Appends a single discriminant byte. Used to separate value kinds
    /// and computation branches that would otherwise share a byte stream.
    pub fn write_tag(&mut self, tag: u8) -> &mut Self {
        self.state.update(&[tag]);
        self
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.write_len(bytes.len());
        self.state.update(bytes);
        self
    }

    pub fn write_len(&mut self, len: usize) -> &mut Self {
        self.state.update(&(len as u64).to_le_bytes());
        self
    }

    #[must_use]
    pub fn finish(&self) -> HashKey {
        HashKey(self.state.digest128())
    }
}

/// Types that can feed their content into a [`KeyHasher`].
///
/// Implementations must be deterministic across runs and threads: no
/// pointer values, no interner ids, no iteration over unordered maps.
pub trait ContentHash {
    fn content_hash(&self, h: &mut KeyHasher);
}

/// One-shot helper.
pub fn hash_of<T: ContentHash + ?Sized>(value: &T) -> HashKey {
    let mut h = KeyHasher::new();
    value.content_hash(&mut h);
    h.finish()
}

impl ContentHash for HashKey {
    fn content_hash(&self, h: &mut KeyHasher) {
        h.state.update(&self.0.to_le_bytes());
    }
}

impl ContentHash for str {
    fn content_hash(&self, h: &mut KeyHasher) {
        h.write_bytes(self.as_bytes());
    }
}

impl ContentHash for String {
    fn content_hash(&self, h: &mut KeyHasher) {
        self.as_str().content_hash(h);
    }
}

impl ContentHash for bool {
    fn content_hash(&self, h: &mut KeyHasher) {
        h.state.update(&[u8::from(*self)]);
    }
}

macro_rules! impl_le_bytes {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ContentHash for $ty {
                #[inline]
                fn content_hash(&self, h: &mut KeyHasher) {
                    h.state.update(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_le_bytes!(u8, u32, u64, i32, i64);

impl ContentHash for usize {
    fn content_hash(&self, h: &mut KeyHasher) {
        (*self as u64).content_hash(h);
    }
}

// Floats hash by bit pattern: -0.0 and 0.0 differ, identical NaNs agree.
impl ContentHash for f32 {
    fn content_hash(&self, h: &mut KeyHasher) {
        h.state.update(&self.to_bits().to_le_bytes());
    }
}

impl ContentHash for f64 {
    fn content_hash(&self, h: &mut KeyHasher) {
        h.state.update(&self.to_bits().to_le_bytes());
    }
}

impl ContentHash for Vec3 {
    fn content_hash(&self, h: &mut KeyHasher) {
        for v in self.to_array() {
            v.content_hash(h);
        }
    }
}

impl ContentHash for DVec3 {
    fn content_hash(&self, h: &mut KeyHasher) {
        for v in self.to_array() {
            v.content_hash(h);
        }
    }
}

impl ContentHash for Mat4 {
    fn content_hash(&self, h: &mut KeyHasher) {
        for v in self.to_cols_array() {
            v.content_hash(h);
        }
    }
}

impl ContentHash for DMat4 {
    fn content_hash(&self, h: &mut KeyHasher) {
        for v in self.to_cols_array() {
            v.content_hash(h);
        }
    }
}

impl<T: ContentHash> ContentHash for [T] {
    fn content_hash(&self, h: &mut KeyHasher) {
        h.write_len(self.len());
        for item in self {
            item.content_hash(h);
        }
    }
}

impl<T: ContentHash> ContentHash for Vec<T> {
    fn content_hash(&self, h: &mut KeyHasher) {
        self.as_slice().content_hash(h);
    }
}

impl<T: ContentHash> ContentHash for Option<T> {
    fn content_hash(&self, h: &mut KeyHasher) {
        match self {
            None => {
                h.write_tag(0);
            }
            Some(v) => {
                h.write_tag(1);
                v.content_hash(h);
            }
        }
    }
}

impl<T: ContentHash + ?Sized> ContentHash for &T {
    fn content_hash(&self, h: &mut KeyHasher) {
        (**self).content_hash(h);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_content_equal_key() {
        let a = hash_of(&vec![1.0_f32, 2.0, 3.0]);
        let b = hash_of(&vec![1.0_f32, 2.0, 3.0]);
        assert_eq!(a, b);
    }

    #[test]
    fn length_prefix_prevents_concatenation_collisions() {
        let a = hash_of(&vec!["ab".to_string(), "c".to_string()]);
        let b = hash_of(&vec!["a".to_string(), "bc".to_string()]);
        assert_ne!(a, b);
    }

    #[test]
    fn option_presence_is_hashed() {
        let none: Option<i32> = None;
        assert_ne!(hash_of(&none), hash_of(&Some(0_i32)));
    }

    #[test]
    fn float_sign_of_zero_matters() {
        assert_ne!(hash_of(&0.0_f64), hash_of(&-0.0_f64));
    }

    #[test]
    fn display_is_fixed_width_hex() {
        let key = HashKey::from_raw(0xabc);
        assert_eq!(key.to_string().len(), 32);
        assert!(key.to_string().ends_with("abc"));
    }
}
