use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::hash::{ContentHash, KeyHasher};
use crate::utils::interner::{self, Symbol};

/// Address of a location in a scene hierarchy, as a sequence of interned
/// names. The root is the empty path.
///
/// Equality and `Hash` work on interned symbols; [`ContentHash`] feeds the
/// resolved strings so hash keys are stable across processes.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct ScenePath {
    segments: SmallVec<[Symbol; 6]>,
}

impl ScenePath {
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            segments: names.into_iter().map(|s| interner::intern(s.as_ref())).collect(),
        }
    }

    #[must_use]
    pub fn from_symbols(symbols: &[Symbol]) -> Self {
        Self {
            segments: SmallVec::from_slice(symbols),
        }
    }

    /// Number of segments, the depth of the addressed location.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn symbol(&self, index: usize) -> Option<Symbol> {
        self.segments.get(index).copied()
    }

    #[inline]
    #[must_use]
    pub fn name(&self, index: usize) -> Option<&'static str> {
        self.symbol(index).map(interner::resolve)
    }

    #[must_use]
    pub fn last(&self) -> Option<&'static str> {
        self.segments.last().copied().map(interner::resolve)
    }

    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.segments
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.segments.iter().map(|&s| interner::resolve(s))
    }

    pub fn push(&mut self, name: &str) {
        self.segments.push(interner::intern(name));
    }

    pub fn push_symbol(&mut self, symbol: Symbol) {
        self.segments.push(symbol);
    }

    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        self.child_symbol(interner::intern(name))
    }

    #[must_use]
    pub fn child_symbol(&self, symbol: Symbol) -> Self {
        let mut path = self.clone();
        path.segments.push(symbol);
        path
    }

    /// Parent path, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self::from_symbols(&self.segments[..self.segments.len() - 1]))
    }
}

impl ContentHash for ScenePath {
    fn content_hash(&self, h: &mut KeyHasher) {
        h.write_len(self.segments.len());
        for name in self.names() {
            h.append(name);
        }
    }
}

impl fmt::Display for ScenePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for name in self.names() {
            write!(f, "/{name}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ScenePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScenePath({self})")
    }
}

/// Parses `/a/b/c` style strings. Empty segments are skipped, so `/`, `""`
/// and `//` all denote the root.
impl FromStr for ScenePath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_names(s.split('/').filter(|seg| !seg.is_empty())))
    }
}

impl From<&str> for ScenePath {
    fn from(s: &str) -> Self {
        let Ok(path) = s.parse::<ScenePath>();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash_of;

    #[test]
    fn display_round_trips() {
        for s in ["/", "/agents", "/agents/robot/a/12"] {
            assert_eq!(ScenePath::from(s).to_string(), s);
        }
    }

    #[test]
    fn content_hash_separates_segments() {
        assert_ne!(
            hash_of(&ScenePath::from("/ab/c")),
            hash_of(&ScenePath::from("/a/bc"))
        );
    }

    #[test]
    fn names_resolve_in_order() {
        let p = ScenePath::from_names(["agents", "robot"]);
        assert_eq!(p.names().collect::<Vec<_>>(), ["agents", "robot"]);
        assert_eq!(p.last(), Some("robot"));
        assert_eq!(p.name(2), None);
    }
}
