//! Post-processor argument strings
//!
//! The host application hands the post-processor a single string such as
//! `--no-header --precision 4 --preamble "G17 G90"`. It is split with shell
//! quoting rules and parsed with clap; anything unrecognised is an error.

use crate::config::PostConfig;
use clap::{CommandFactory, Parser};
use postkit_core::{ConfigError, MeasurementSystem};

/// Flags accepted in a post-processor argument string
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "postkit",
    no_binary_name = true,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct PostArgs {
    /// suppress header output
    #[arg(long)]
    pub no_header: bool,

    /// suppress comment output
    #[arg(long)]
    pub no_comments: bool,

    /// prefix with line numbers
    #[arg(long)]
    pub line_numbers: bool,

    /// don't pop up editor before writing output
    #[arg(long)]
    pub no_show_editor: bool,

    /// number of digits of precision, default=3 (4 with --inches)
    #[arg(long)]
    pub precision: Option<usize>,

    /// set commands to be issued before the first command
    #[arg(long, allow_hyphen_values = true)]
    pub preamble: Option<String>,

    /// set commands to be issued after the last command
    #[arg(long, allow_hyphen_values = true)]
    pub postamble: Option<String>,

    /// Convert output for US imperial mode (G20)
    #[arg(long)]
    pub inches: bool,

    /// Suppress a command name that repeats the previous one
    #[arg(long)]
    pub modal: bool,

    /// Suppress axis values that repeat the previous one
    #[arg(long)]
    pub axis_modal: bool,

    /// suppress tool length offset (G43) following tool changes
    #[arg(long)]
    pub no_tlo: bool,

    /// Measure each tool used at the beginning of the program when block delete is turned off.
    #[arg(long)]
    pub measure_tool: bool,

    /// Job Author, used when posting to remote machine
    #[arg(long)]
    pub job_author: Option<String>,

    /// Don't post to remote machine
    #[arg(long)]
    pub no_remote_post: bool,
}

impl PostArgs {
    /// Split and parse an argument string
    pub fn parse_str(args: &str) -> Result<Self, ConfigError> {
        let tokens = shlex::split(args).ok_or_else(|| ConfigError::Parse {
            reason: format!("unbalanced quoting in arguments: {}", args),
        })?;

        Self::try_parse_from(tokens).map_err(|e| ConfigError::Parse {
            reason: e.render().to_string().trim().to_string(),
        })
    }

    /// Help text describing every accepted flag
    pub fn help_text() -> String {
        Self::command().render_help().to_string()
    }

    /// Apply the parsed flags on top of an existing configuration
    pub fn apply_to(&self, config: &mut PostConfig) {
        if self.no_header {
            config.suppress_header = true;
        }
        if self.no_comments {
            config.suppress_comments = true;
        }
        if self.line_numbers {
            config.line_numbers = true;
        }
        if self.no_show_editor {
            config.show_editor = false;
        }
        if let Some(preamble) = &self.preamble {
            config.preamble = preamble.clone();
        }
        if let Some(postamble) = &self.postamble {
            config.postamble = postamble.clone();
        }
        if self.inches {
            config.units = MeasurementSystem::Imperial;
            config.precision = None;
        }
        if self.precision.is_some() {
            config.precision = self.precision;
        }
        if self.modal {
            config.modal_suppression = true;
        }
        if self.no_tlo {
            config.suppress_tool_length_offset = true;
        }
        if self.axis_modal {
            config.axis_modal = true;
        }
        if self.measure_tool {
            config.measure_tool = true;
        }
        if self.no_remote_post {
            config.remote_post = false;
        }
        if let Some(author) = &self.job_author {
            config.job_author = author.clone();
        }
    }
}
