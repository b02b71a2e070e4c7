//! Toolpath command model
//!
//! The input of an export: a [`ToolPathDocument`] holding [`Operation`]s, each
//! owning a tree of [`PathNode`]s.

pub mod command;
pub mod operation;

pub use command::{CommandKind, Commands, MotionCommand, Param, PathNode};
pub use operation::{CoolantMode, Operation, OperationView, ToolController, ToolPathDocument};
