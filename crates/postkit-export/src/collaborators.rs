//! External collaborators of an export
//!
//! The export driver only talks to these traits, after the program text is
//! final. Local implementations are provided for command-line use: an external
//! text editor, a directory-backed uploader and a preset destination picker.

use postkit_core::CollaboratorError;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Result of offering the program for review
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Review {
    /// The text was changed; use the new text
    Edited(String),
    /// The text was left as it was
    Unchanged,
    /// The review was abandoned; keep the text as generated
    Cancelled,
}

/// Offers program text for review before it is saved
pub trait Editor: Send + Sync {
    fn review(&self, text: &str) -> Result<Review, CollaboratorError>;
}

/// Sends the finished program to a remote destination
pub trait Uploader: Send + Sync {
    /// Destination identifiers the uploader can deliver to
    fn destinations(&self) -> Result<Vec<String>, CollaboratorError>;

    /// Deliver `text` as `filename` to `destination`
    fn upload(&self, text: &str, destination: &str, filename: &str)
        -> Result<(), CollaboratorError>;
}

/// Chooses one destination from a list
pub trait DestinationPicker: Send + Sync {
    /// `None` means the choice was cancelled
    fn pick(&self, destinations: &[String]) -> Option<String>;
}

/// Editor that never changes anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEditor;

impl Editor for NoEditor {
    fn review(&self, _text: &str) -> Result<Review, CollaboratorError> {
        Ok(Review::Unchanged)
    }
}

/// Runs an editor program on a temporary copy of the text
///
/// A non-zero exit status counts as a cancelled review.
#[derive(Debug, Clone)]
pub struct ExternalEditor {
    command: Vec<String>,
}

impl ExternalEditor {
    /// Editor command line, split with shell quoting (e.g. `"code --wait"`)
    pub fn new(command: &str) -> Result<Self, CollaboratorError> {
        let command = shlex::split(command)
            .filter(|parts| !parts.is_empty())
            .ok_or_else(|| CollaboratorError::Editor {
                reason: format!("invalid editor command: {:?}", command),
            })?;
        Ok(Self { command })
    }

    /// Editor taken from `$VISUAL`, then `$EDITOR`
    pub fn from_env() -> Option<Self> {
        ["VISUAL", "EDITOR"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find_map(|value| Self::new(&value).ok())
    }
}

impl Editor for ExternalEditor {
    fn review(&self, text: &str) -> Result<Review, CollaboratorError> {
        let editor_err = |reason: String| CollaboratorError::Editor { reason };

        let mut file = tempfile::Builder::new()
            .prefix("postkit-")
            .suffix(".ngc")
            .tempfile()
            .map_err(|e| editor_err(format!("could not create temp file: {}", e)))?;
        file.write_all(text.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| editor_err(format!("could not write temp file: {}", e)))?;

        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| editor_err("empty editor command".to_string()))?;
        debug!("Running editor {} on {}", program, file.path().display());
        let status = Command::new(program)
            .args(args)
            .arg(file.path())
            .status()
            .map_err(|e| editor_err(format!("could not run {}: {}", program, e)))?;
        if !status.success() {
            return Ok(Review::Cancelled);
        }

        let edited = std::fs::read_to_string(file.path())
            .map_err(|e| editor_err(format!("could not read edited text: {}", e)))?;
        if edited == text {
            Ok(Review::Unchanged)
        } else {
            Ok(Review::Edited(edited))
        }
    }
}

/// Uploader delivering into sub-directories of a root directory
///
/// Each sub-directory of the root is one destination.
#[derive(Debug, Clone)]
pub struct DirectoryUploader {
    root: PathBuf,
}

impl DirectoryUploader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

/// A single plain path component: no separators, no `..`, not absolute
fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

impl Uploader for DirectoryUploader {
    fn destinations(&self) -> Result<Vec<String>, CollaboratorError> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| CollaboratorError::Destinations {
            reason: format!("{}: {}", self.root.display(), e),
        })?;
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();
        Ok(names)
    }

    fn upload(
        &self,
        text: &str,
        destination: &str,
        filename: &str,
    ) -> Result<(), CollaboratorError> {
        let refuse = |reason: String| CollaboratorError::Upload {
            destination: destination.to_string(),
            reason,
        };
        if !is_plain_name(destination) {
            return Err(refuse("destination escapes the upload root".to_string()));
        }
        if !is_plain_name(filename) {
            return Err(refuse(format!("invalid file name {:?}", filename)));
        }

        let dir = self.root.join(destination);
        if !dir.is_dir() {
            return Err(refuse("no such destination".to_string()));
        }
        let path = dir.join(filename);
        std::fs::write(&path, text).map_err(|e| refuse(e.to_string()))?;
        debug!("Uploaded {} bytes to {}", text.len(), path.display());
        Ok(())
    }
}

/// Picker returning a fixed choice when it is offered
#[derive(Debug, Default, Clone)]
pub struct PresetPicker {
    choice: Option<String>,
}

impl PresetPicker {
    pub fn new(choice: Option<String>) -> Self {
        Self { choice }
    }
}

impl DestinationPicker for PresetPicker {
    fn pick(&self, destinations: &[String]) -> Option<String> {
        self.choice
            .as_ref()
            .filter(|choice| destinations.contains(*choice))
            .cloned()
    }
}
