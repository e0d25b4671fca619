//! Public library API for resolving mesh geometry out of Decima `.core` files.

/// Core container parsing, GUID resolution, chunk tables, and buffer slicing.
pub mod decima;
