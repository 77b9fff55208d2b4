//! Parsing and rendering of tabletop creature statblock text.
//!
//! [`parser::parse`] turns pasted statblock text into a typed
//! [`model::CreatureRecord`] plus the line-level segmentation it came from;
//! [`render::to_canonical_text`] goes the other way.

pub mod model;
pub mod parser;
pub mod render;
pub mod util;
