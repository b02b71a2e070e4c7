//! Export driver
//!
//! Runs the emitter and optimizer over a document, then hands the final text
//! to the review, persistence and upload steps. Collaborator failures are
//! reported in the [`ExportReport`]; they never alter the generated text.

use crate::collaborators::{DestinationPicker, Editor, NoEditor, PresetPicker, Review, Uploader};
use chrono::{DateTime, Local};
use postkit_core::{GcodeError, Result, ToolPathDocument};
use postkit_post::{Emitter, GCodeOptimizer};
use postkit_settings::PostConfig;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Output target meaning "do not write a file"
pub const NO_OUTPUT: &str = "-";

/// File name used when neither the document nor the output path names one
const FALLBACK_FILE_NAME: &str = "program.ngc";

/// What happened at the review step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorOutcome {
    /// Review is turned off in the configuration
    Disabled,
    /// The program was larger than the configured limit
    SkippedTooLarge { size: usize },
    /// The editor returned the text unchanged
    Unchanged,
    /// The editor changed the text
    Edited,
    /// The review was abandoned; the generated text was kept
    Cancelled,
    /// The editor could not be run; the generated text was kept
    Failed(String),
}

/// What happened at the upload step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    /// Remote posting is turned off in the configuration
    Disabled,
    /// No uploader was supplied
    NotConfigured,
    /// The uploader offered no destinations
    NoDestinations,
    /// No destination was chosen
    Cancelled,
    /// The program was delivered
    Uploaded {
        destination: String,
        filename: String,
    },
    /// Delivery failed
    Failed { diagnostic: String },
}

impl UploadStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadStatus::Uploaded { .. })
    }
}

/// Outcome of a successful export
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Final program text
    pub text: String,
    /// File the program was written to
    pub saved_to: Option<PathBuf>,
    pub editor: EditorOutcome,
    pub upload: UploadStatus,
}

/// Abort if any active operation's tool controller lacks feeds or speeds
pub fn check_feeds_speeds(document: &ToolPathDocument) -> std::result::Result<(), GcodeError> {
    let operations: Vec<(String, Vec<&'static str>)> = document
        .active_operations()
        .filter_map(|view| {
            let missing = view.tool_controller()?.missing();
            (!missing.is_empty()).then(|| (view.label().to_string(), missing))
        })
        .collect();
    if operations.is_empty() {
        Ok(())
    } else {
        Err(GcodeError::MissingFeedsSpeeds { operations })
    }
}

/// Remote file name: the document's file name with `.FCStd` replaced by `.ngc`
///
/// Falls back to the output file name, then to a fixed name.
pub fn remote_file_name(document: &ToolPathDocument, output: &str) -> String {
    let base_name = |path: &str| -> Option<String> {
        path.rsplit(|c| c == '/' || c == '\\')
            .next()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    };

    if let Some(name) = document.name.as_deref().and_then(base_name) {
        return match name.strip_suffix(".FCStd") {
            Some(stem) => format!("{}.ngc", stem),
            None => name,
        };
    }
    if output != NO_OUTPUT {
        if let Some(name) = base_name(output) {
            return name;
        }
    }
    FALLBACK_FILE_NAME.to_string()
}

/// Drives one export from document to saved and uploaded program
pub struct Exporter {
    config: PostConfig,
    editor: Box<dyn Editor>,
    uploader: Option<Box<dyn Uploader>>,
    picker: Box<dyn DestinationPicker>,
    optimize: bool,
    trim_redundant: bool,
    output_time: Option<DateTime<Local>>,
}

impl Exporter {
    /// Exporter without review, upload or destination choice
    pub fn new(config: PostConfig) -> Self {
        Self {
            config,
            editor: Box::new(NoEditor),
            uploader: None,
            picker: Box::new(PresetPicker::default()),
            optimize: true,
            trim_redundant: false,
            output_time: None,
        }
    }

    /// Exporter configured from an argument string
    ///
    /// A malformed string aborts; defaults are never substituted for it.
    pub fn from_arg_string(args: &str) -> Result<Self> {
        Ok(Self::new(PostConfig::from_arg_string(args)?))
    }

    pub fn with_editor(mut self, editor: impl Editor + 'static) -> Self {
        self.editor = Box::new(editor);
        self
    }

    pub fn with_uploader(mut self, uploader: impl Uploader + 'static) -> Self {
        self.uploader = Some(Box::new(uploader));
        self
    }

    pub fn with_picker(mut self, picker: impl DestinationPicker + 'static) -> Self {
        self.picker = Box::new(picker);
        self
    }

    /// Skip the tool-change reordering pass
    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    /// Also strip feed and Z words repeating the previous value
    pub fn with_trim_redundant(mut self, trim_redundant: bool) -> Self {
        self.trim_redundant = trim_redundant;
        self
    }

    /// Use a fixed header timestamp
    pub fn with_output_time(mut self, output_time: DateTime<Local>) -> Self {
        self.output_time = Some(output_time);
        self
    }

    /// Generate the program text without any collaborator step
    pub fn generate(&self, document: &ToolPathDocument) -> std::result::Result<String, GcodeError> {
        document.validate()?;
        check_feeds_speeds(document)?;

        let mut emitter = Emitter::new(&self.config);
        if let Some(time) = self.output_time {
            emitter = emitter.with_output_time(time);
        }
        let text = emitter.emit(document)?;
        if self.optimize || self.trim_redundant {
            Ok(GCodeOptimizer::new(self.trim_redundant, self.optimize).optimize(&text))
        } else {
            Ok(text)
        }
    }

    /// Generate, review, save (unless `output` is `-`) and upload
    pub fn export(&self, document: &ToolPathDocument, output: &str) -> Result<ExportReport> {
        let generated = self.generate(document)?;
        let (text, editor) = self.review(generated);

        let saved_to = if output == NO_OUTPUT {
            None
        } else {
            let path = Path::new(output);
            std::fs::write(path, &text)?;
            info!("Wrote {} bytes to {}", text.len(), path.display());
            Some(path.to_path_buf())
        };

        let upload = self.upload(&text, &remote_file_name(document, output));

        Ok(ExportReport {
            text,
            saved_to,
            editor,
            upload,
        })
    }

    fn review(&self, text: String) -> (String, EditorOutcome) {
        if !self.config.show_editor {
            return (text, EditorOutcome::Disabled);
        }
        if text.len() > self.config.editor_size_limit {
            info!(
                "Skipping editor since output is larger than {} bytes",
                self.config.editor_size_limit
            );
            let size = text.len();
            return (text, EditorOutcome::SkippedTooLarge { size });
        }
        match self.editor.review(&text) {
            Ok(Review::Edited(edited)) => (edited, EditorOutcome::Edited),
            Ok(Review::Unchanged) => (text, EditorOutcome::Unchanged),
            Ok(Review::Cancelled) => (text, EditorOutcome::Cancelled),
            Err(e) => {
                warn!("{}", e);
                (text, EditorOutcome::Failed(e.to_string()))
            }
        }
    }

    fn upload(&self, text: &str, filename: &str) -> UploadStatus {
        if !self.config.remote_post {
            return UploadStatus::Disabled;
        }
        let Some(uploader) = self.uploader.as_deref() else {
            return UploadStatus::NotConfigured;
        };

        let destinations = match uploader.destinations() {
            Ok(list) if list.is_empty() => {
                warn!("No upload destinations available");
                return UploadStatus::NoDestinations;
            }
            Ok(list) => list,
            Err(e) => {
                warn!("{}", e);
                return UploadStatus::Failed {
                    diagnostic: e.to_string(),
                };
            }
        };

        let destination = if self.config.job_author.is_empty() {
            match self.picker.pick(&destinations) {
                Some(choice) => choice,
                None => {
                    info!("No destination chosen; upload cancelled");
                    return UploadStatus::Cancelled;
                }
            }
        } else {
            self.config.job_author.clone()
        };

        match uploader.upload(text, &destination, filename) {
            Ok(()) => {
                info!("Uploaded {} to {}", filename, destination);
                UploadStatus::Uploaded {
                    destination,
                    filename: filename.to_string(),
                }
            }
            Err(e) => {
                warn!("{}", e);
                UploadStatus::Failed {
                    diagnostic: e.to_string(),
                }
            }
        }
    }
}
