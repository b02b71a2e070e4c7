//! # postkit Core
//!
//! Core types and utilities for postkit.
//! Provides the toolpath command model, the error taxonomy shared by every
//! stage of an export, and unit conversion/formatting.

pub mod error;
pub mod model;
pub mod units;

pub use error::{CollaboratorError, ConfigError, Error, GcodeError, Result};

pub use model::{
    CommandKind, Commands, CoolantMode, MotionCommand, Operation, OperationView, Param, PathNode,
    ToolController, ToolPathDocument,
};

pub use units::MeasurementSystem;
