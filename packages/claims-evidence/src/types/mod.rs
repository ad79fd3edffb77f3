//! Data types flowing through the pipeline.

pub mod claim;
pub mod config;
pub mod evidence;
pub mod record;
pub mod scope;
pub mod summary;
