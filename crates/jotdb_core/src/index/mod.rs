//! Secondary index support.
//!
//! The store itself only depends on the [`FieldIndex`] capability
//! contract: insert a (value, key) pair, search by equality, and remove
//! every entry for a key. [`HashFieldIndex`] is the bundled
//! implementation; [`IndexRegistry`] owns the registered indexes and
//! keeps them consistent with the table on every mutation.

mod hash;
mod registry;
mod traits;

pub use hash::HashFieldIndex;
pub use registry::IndexRegistry;
pub use traits::{FieldIndex, IndexKind, IndexSpec, IndexValue};
