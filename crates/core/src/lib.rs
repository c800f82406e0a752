//! Domain logic shared by the adgen crates.
//!
//! Everything in here is pure (no I/O): constants, input normalization,
//! prompt templating and parsing, credit arithmetic, and image probing.

pub mod credits;
pub mod error;
pub mod generation;
pub mod image_inspect;
pub mod prompt;
pub mod types;
