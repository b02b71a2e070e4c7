//! G-code emitter
//!
//! Walks a [`ToolPathDocument`] depth-first and writes one program line per
//! motion command, applying the modal, axis-modal, unit, precision, coolant,
//! block-delete and tool-change rules of a [`PostConfig`].

use crate::writer::ProgramWriter;
use chrono::{DateTime, Local};
use postkit_core::units::{format_feed_rate, format_length};
use postkit_core::{
    CommandKind, GcodeError, MeasurementSystem, MotionCommand, OperationView, Param,
    ToolPathDocument,
};
use postkit_settings::PostConfig;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Name written into the program header
pub const POST_NAME: &str = "postkit";

/// Tools measured at most by the measuring block
const MAX_MEASURED_TOOLS: usize = 12;

/// Emit a document with the given configuration
pub fn emit(document: &ToolPathDocument, config: &PostConfig) -> Result<String, GcodeError> {
    Emitter::new(config).emit(document)
}

/// Rolling state of one emitter run
///
/// Created fresh for every [`Emitter::emit`] call and dropped afterwards.
#[derive(Debug, Clone)]
pub struct EmitterState {
    writer: ProgramWriter,
    precision: usize,
    units: MeasurementSystem,
    modal: bool,
    output_doubles: bool,
    use_tlo: bool,
    last_command: Option<String>,
    location: BTreeMap<Param, f64>,
}

impl EmitterState {
    /// Fresh state for a run, seeded with the sentinel first location
    pub fn new(config: &PostConfig) -> Self {
        let location = BTreeMap::from([
            (Param::X, -1.0),
            (Param::Y, -1.0),
            (Param::Z, -1.0),
            (Param::F, 0.0),
        ]);
        Self {
            writer: ProgramWriter::new(config.line_numbers),
            precision: config.precision(),
            units: config.units,
            modal: config.modal_suppression,
            output_doubles: !config.axis_modal,
            use_tlo: !config.suppress_tool_length_offset,
            last_command: None,
            location,
        }
    }

    /// Last value written (or skipped) for a parameter
    pub fn location(&self, param: Param) -> Option<f64> {
        self.location.get(&param).copied()
    }

    /// Name of the previous command
    pub fn last_command(&self) -> Option<&str> {
        self.last_command.as_deref()
    }

    fn unchanged(&self, param: Param, value: f64) -> bool {
        self.location(param) == Some(value)
    }

    fn parameter_words(&self, command: &MotionCommand, kind: CommandKind) -> Vec<String> {
        let mut words = Vec::with_capacity(command.params.len());
        for (&param, &value) in &command.params {
            match param {
                Param::F => {
                    if kind == CommandKind::Rapid {
                        continue;
                    }
                    if !self.output_doubles && self.unchanged(param, value) {
                        continue;
                    }
                    if value > 0.0 {
                        words.push(format!(
                            "F{}",
                            format_feed_rate(value, self.units, self.precision)
                        ));
                    }
                }
                p if p.is_integer() => {
                    words.push(format!("{}{}", p, value.trunc() as i64));
                }
                p => {
                    if !self.output_doubles && self.unchanged(p, value) {
                        continue;
                    }
                    words.push(format!(
                        "{}{}",
                        p,
                        format_length(value, self.units, self.precision)
                    ));
                }
            }
        }
        words
    }
}

/// Serializes toolpath documents into program text
#[derive(Debug, Clone)]
pub struct Emitter<'a> {
    config: &'a PostConfig,
    output_time: DateTime<Local>,
}

impl<'a> Emitter<'a> {
    /// Create an emitter stamping the current time into the header
    pub fn new(config: &'a PostConfig) -> Self {
        Self {
            config,
            output_time: Local::now(),
        }
    }

    /// Use a fixed header timestamp
    pub fn with_output_time(mut self, output_time: DateTime<Local>) -> Self {
        self.output_time = output_time;
        self
    }

    fn comments(&self) -> bool {
        !self.config.suppress_comments
    }

    /// Emit the whole program
    ///
    /// Fails without producing any text if a document member is not a path.
    pub fn emit(&self, document: &ToolPathDocument) -> Result<String, GcodeError> {
        document.validate()?;

        let mut state = EmitterState::new(self.config);
        debug!(
            "Emitting {} operations ({} units, precision {})",
            document.operations.len(),
            state.units,
            state.precision
        );

        if !self.config.suppress_header {
            self.write_header(&mut state);
        }

        let tools = tools_used(document);
        if self.comments() && !tools.is_empty() {
            state.writer.line("; List of Tools Used:");
            for tool in &tools {
                state.writer.line(&format!("; Tool: {}", tool));
            }
        }
        if self.config.measure_tool {
            self.write_measuring_block(&mut state, &tools);
        }

        if self.comments() {
            state.writer.line("(begin preamble)");
        }
        state.writer.block(&self.config.effective_preamble());
        state.writer.line(self.config.units.unit_directive());

        for view in document.active_operations() {
            self.emit_operation(&mut state, &view);
        }

        if self.comments() {
            state.writer.line("(begin postamble)");
        }
        state.writer.block(&self.config.effective_postamble());

        debug!("Emitted {} lines", state.writer.line_count());
        Ok(state.writer.finish())
    }

    fn write_header(&self, state: &mut EmitterState) {
        state.writer.line(&format!("(Exported by {})", POST_NAME));
        state.writer.line(&format!(
            "(Post Processor: {} v{})",
            POST_NAME,
            env!("CARGO_PKG_VERSION")
        ));
        state.writer.line(&format!(
            "(Output Time: {})",
            self.output_time.format("%Y-%m-%d %H:%M:%S")
        ));
    }

    fn write_measuring_block(&self, state: &mut EmitterState, tools: &BTreeSet<i64>) {
        state.writer.set_block_delete(true);
        for tool in tools.iter().take(MAX_MEASURED_TOOLS) {
            state.writer.line(&format!("T{} M6", tool));
            state.writer.line("#3992=0");
            state.writer.line("M38");
        }
        state.writer.set_block_delete(false);
    }

    fn emit_operation(&self, state: &mut EmitterState, view: &OperationView<'_>) {
        state.writer.set_block_delete(view.block_delete());

        if self.comments() {
            state
                .writer
                .line(&format!("(begin operation: {})", view.label()));
            state
                .writer
                .line(&format!("(machine units: {})", self.config.units.feed_label()));
        }
        state.writer.block(&self.config.pre_operation);

        let coolant = view.coolant();
        if let Some(directive) = coolant.start_directive() {
            if self.comments() {
                state.writer.line(&format!("(Coolant On:{})", coolant));
            }
            state.writer.line(directive);
        }

        for command in view.commands() {
            self.emit_command(state, command);
        }

        if self.comments() {
            state
                .writer
                .line(&format!("(finish operation: {})", view.label()));
        }
        state.writer.block(&self.config.post_operation);

        if coolant.start_directive().is_some() {
            if self.comments() {
                state.writer.line(&format!("(Coolant Off:{})", coolant));
            }
            state.writer.line("M9");
        }

        state.writer.set_block_delete(false);
    }

    fn emit_command(&self, state: &mut EmitterState, command: &MotionCommand) {
        let kind = command.kind();
        if kind == CommandKind::Comment && !self.comments() {
            return;
        }

        let name_suppressed =
            state.modal && state.last_command.as_deref() == Some(command.name.as_str());
        let mut words = Vec::with_capacity(command.params.len() + 3);
        if !name_suppressed {
            words.push(command.name.clone());
        }
        words.extend(state.parameter_words(command, kind));

        state.last_command = Some(command.name.clone());
        state.location.extend(&command.params);

        match kind {
            CommandKind::ToolChange => {
                state.writer.line("M5");
                state.writer.block(&self.config.tool_change);
                if state.use_tlo {
                    match command.get(Param::T) {
                        Some(tool) => {
                            words.push("G43".to_string());
                            words.push(format!("H{}", tool.trunc() as i64));
                        }
                        None => tracing::warn!("Tool change without a tool number; no G43 added"),
                    }
                }
            }
            CommandKind::Message => {
                if !self.comments() {
                    return;
                }
                if !name_suppressed {
                    words.remove(0);
                }
            }
            _ => {}
        }

        if !words.is_empty() {
            state.writer.words(&words);
        }
    }
}

/// Distinct tool numbers used by active operations, in ascending order
pub fn tools_used(document: &ToolPathDocument) -> BTreeSet<i64> {
    document
        .active_operations()
        .flat_map(|view| view.commands())
        .filter_map(|command| command.get(Param::T))
        .map(|tool| tool.trunc() as i64)
        .collect()
}
