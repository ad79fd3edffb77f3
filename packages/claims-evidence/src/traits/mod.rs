//! Core trait abstractions for the pipeline.
//!
//! These traits define the seams that applications implement to provide
//! model access and note storage.

pub mod model;
pub mod store;
