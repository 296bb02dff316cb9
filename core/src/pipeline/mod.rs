// phaseline/src/pipeline/mod.rs

//! Defines the `Pipeline` struct, its phases and interceptors, and its execution and composition logic.

pub mod definition;
pub mod execution;
pub mod hooks;
pub mod interceptors;
pub mod merge;
pub mod phases;

// Re-export the main Pipeline struct
pub use definition::Pipeline;
pub use interceptors::InterceptorTable;
pub use phases::PhaseRegistry;
