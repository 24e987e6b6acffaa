//! Normalization utilities for sheet cells and headers.

pub mod header;
pub mod numeric;
