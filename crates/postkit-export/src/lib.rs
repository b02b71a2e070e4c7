//! # postkit Export
//!
//! Drives a complete export: configuration, emission, optimization, then the
//! collaborator steps (review, persistence, upload) once the text is final.

pub mod collaborators;
pub mod pipeline;

pub use collaborators::{
    DestinationPicker, DirectoryUploader, Editor, ExternalEditor, NoEditor, PresetPicker, Review,
    Uploader,
};
pub use pipeline::{
    check_feeds_speeds, remote_file_name, EditorOutcome, ExportReport, Exporter, UploadStatus,
    NO_OUTPUT,
};
