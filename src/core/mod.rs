//! Core term-resolution components: the transform chain, the resolution
//! pipeline, the startup term cache and their supporting indexes.

pub mod cache;
pub mod dictionary;
pub mod morph;
pub mod normalize;
pub mod resolve;
pub mod similarity;
pub mod spell;
