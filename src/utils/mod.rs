//! Utility Module
//!
//! - [`interner`]: String interning for path segments and attribute names
//!
//! # String Interning
//!
//! Interned strings (Symbols) can be compared in O(1) time.
//!
//! ```rust,ignore
//! use crowd_scene::utils::interner;
//!
//! let sym1 = interner::intern("agentType");
//! let sym2 = interner::intern("agentType");
//! assert_eq!(sym1, sym2); // O(1) comparison
//! ```

pub mod interner;

pub use interner::Symbol;
