//! # postkit
//!
//! A G-code post-processor: turns a toolpath document (an ordered list of
//! operations, each a tree of motion commands) into a machine program.
//!
//! ## Architecture
//!
//! postkit is organized as a workspace with multiple crates:
//!
//! 1. **postkit-core** - Command model, error taxonomy, unit conversion
//! 2. **postkit-settings** - Post configuration, argument strings, config files
//! 3. **postkit-post** - Emitter and tool-change optimizer
//! 4. **postkit-export** - Export driver and collaborators (editor, uploader)
//! 5. **postkit** - Command-line binary that integrates all crates

pub use postkit_core::{
    CollaboratorError, ConfigError, CoolantMode, Error, GcodeError, MeasurementSystem,
    MotionCommand, Operation, Param, PathNode, Result, ToolController, ToolPathDocument,
};
pub use postkit_export::{
    DirectoryUploader, EditorOutcome, ExportReport, Exporter, ExternalEditor, NoEditor,
    PresetPicker, UploadStatus,
};
pub use postkit_post::{emit, optimize, Emitter, GCodeOptimizer};
pub use postkit_settings::{PostArgs, PostConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Log output goes to stderr so the program text can be streamed to stdout.
/// `RUST_LOG` is honoured; `verbose` raises the floor to DEBUG.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
