//! Global string interner.
//!
//! Path segments and attribute names are compared and hashed constantly while
//! the hierarchy is evaluated. Interning turns each distinct string into a
//! compact [`Symbol`] so equality checks are integer comparisons, and keeps a
//! single `'static` copy of every name shared across worker threads.

use std::sync::LazyLock;

use lasso::{Spur, ThreadedRodeo};

/// Global interner instance.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::new);

/// Compact integer identifier for an interned string.
///
/// Symbol values depend on interning order, so they must never be fed into a
/// content hash. Hash the resolved string instead.
pub type Symbol = Spur;

/// Interns a string, returning its Symbol.
///
/// Returns the existing Symbol when the string is already interned.
#[inline]
pub fn intern(s: &str) -> Symbol {
    INTERNER.get_or_intern(s)
}

/// Looks up the Symbol of an already interned string without allocating.
#[inline]
pub fn get(s: &str) -> Option<Symbol> {
    INTERNER.get(s)
}

/// Resolves a Symbol back to its string.
///
/// # Panics
/// Panics if the Symbol did not come from this interner.
#[inline]
pub fn resolve(sym: Symbol) -> &'static str {
    INTERNER.resolve(&sym)
}

/// Pre-interns the names every crowd evaluation touches, so the hot path
/// only ever performs lookups.
pub fn preload_crowd_names() {
    let common = [
        // per-point variables
        "agentType",
        "variation",
        "agentId",
        // agent records
        "agentTypes",
        "rootMatrix",
        "boundingBox",
        "poseWorldMatrices",
        "poseNormalWorldMatrices",
        "worldBindMatrices",
        "metadata",
        // skin binding
        "jointIndexCount",
        "jointIndices",
        "jointWeights",
        // mesh channels
        "P",
        "N",
        // default output name
        "agents",
    ];

    for name in common {
        intern(name);
    }
}
