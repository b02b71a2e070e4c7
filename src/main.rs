use anyhow::Context;
use clap::Parser;
use postkit::{
    init_logging, DirectoryUploader, Exporter, ExternalEditor, PostArgs, PostConfig, PresetPicker,
    ToolPathDocument, UploadStatus, VERSION,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

/// Post-process a toolpath document into a G-code program
#[derive(Debug, Parser)]
#[command(
    name = "postkit",
    version = VERSION,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")"),
    about
)]
struct Cli {
    /// Toolpath document (JSON)
    #[arg(required_unless_present = "post_help")]
    document: Option<PathBuf>,

    /// Output file; `-` writes the program to stdout only
    #[arg(short, long, default_value = "-")]
    output: String,

    /// Post-processor argument string, e.g. "--no-header --precision 4"
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    args: String,

    /// Config file (.toml or .json); defaults to the user config directory
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep combined XY+Z moves after tool changes
    #[arg(long)]
    no_optimize: bool,

    /// Strip feed and Z words repeating the previous value
    #[arg(long)]
    trim_redundant: bool,

    /// Deliver the program into a sub-directory of this directory
    #[arg(long)]
    upload_root: Option<PathBuf>,

    /// Upload destination used when no job author is configured
    #[arg(long)]
    destination: Option<String>,

    /// List the flags accepted by --args and exit
    #[arg(long)]
    post_help: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PostConfig> {
    if let Some(path) = path {
        return PostConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()));
    }
    match PostConfig::default_path().filter(|p| p.exists()) {
        Some(path) => PostConfig::load_from_file(&path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(PostConfig::default()),
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.post_help {
        print!("{}", PostArgs::help_text());
        return Ok(());
    }

    let mut config = load_config(cli.config.as_deref())?;
    config
        .apply_arg_string(&cli.args)
        .context("parsing post-processor arguments")?;

    let path = cli.document.context("no toolpath document given")?;
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    let document: ToolPathDocument = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;

    let show_editor = config.show_editor;
    let mut exporter = Exporter::new(config)
        .with_optimize(!cli.no_optimize)
        .with_trim_redundant(cli.trim_redundant)
        .with_picker(PresetPicker::new(cli.destination));
    if show_editor {
        if let Some(editor) = ExternalEditor::from_env() {
            exporter = exporter.with_editor(editor);
        }
    }
    if let Some(root) = cli.upload_root {
        exporter = exporter.with_uploader(DirectoryUploader::new(root));
    }

    let report = exporter.export(&document, &cli.output)?;
    if report.saved_to.is_none() {
        print!("{}", report.text);
    }
    info!("Review: {:?}", report.editor);
    match &report.upload {
        UploadStatus::Failed { diagnostic } => warn!("Upload failed: {}", diagnostic),
        status => info!("Upload: {:?}", status),
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(error) = init_logging(cli.verbose) {
        eprintln!("error: {error:#}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
