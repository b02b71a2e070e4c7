//! # postkit Post
//!
//! The two-stage translation from a toolpath document to program text:
//!
//! - **Emitter**: serializes the command tree into formatted program lines
//! - **Optimizer**: reorders moves around tool changes and trims repeated words
//!
//! Both stages are pure functions of their input and a configuration value.

pub mod emitter;
pub mod optimizer;
pub mod writer;

pub use emitter::{emit, tools_used, Emitter, EmitterState, POST_NAME};
pub use optimizer::{optimize, GCodeOptimizer};
pub use writer::ProgramWriter;
