// src/services/mod.rs

//! Domain operations shared by the HTTP handlers.
//!
//! Every operation takes the store explicitly; nothing here holds state.

pub mod authoring;
pub mod consolidation;
pub mod participation;
pub mod scoring;
