//! Note store implementations.

pub mod fs;
pub mod memory;

pub use fs::FsNoteStore;
pub use memory::MemoryNoteStore;
