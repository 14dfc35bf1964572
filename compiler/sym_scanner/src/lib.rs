//! Scalar-level reading for mangled symbol names.
//!
//! A mangled name is treated as a flat sequence of Unicode scalars. The
//! [`Cursor`] walks that sequence with single-scalar lookahead, conditional
//! consumption, counted reads and explicit backtracking. It knows nothing
//! about the mangling grammar itself.

mod cursor;

pub use cursor::{Cursor, ScanError};
