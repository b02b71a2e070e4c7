//! Operations and toolpath documents

use super::command::{Commands, PathNode};
use crate::error::GcodeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coolant mode of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CoolantMode {
    /// No coolant
    #[default]
    None,
    /// Flood coolant (M8)
    Flood,
    /// Mist coolant (M7)
    Mist,
}

impl CoolantMode {
    /// Directive starting this coolant mode, if any
    pub fn start_directive(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Flood => Some("M8"),
            Self::Mist => Some("M7"),
        }
    }
}

impl fmt::Display for CoolantMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Flood => write!(f, "Flood"),
            Self::Mist => write!(f, "Mist"),
        }
    }
}

/// Feeds and speeds of the tool controller driving an operation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolController {
    /// Plunge feed rate (mm/s)
    pub vertical_feed: f64,
    /// Cutting feed rate (mm/s)
    pub horizontal_feed: f64,
    /// Spindle speed (RPM)
    pub spindle_speed: f64,
}

impl ToolController {
    /// Names of values left at zero
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.vertical_feed == 0.0 {
            missing.push("vertical feed");
        }
        if self.horizontal_feed == 0.0 {
            missing.push("horizontal feed");
        }
        if self.spindle_speed == 0.0 {
            missing.push("spindle speed");
        }
        missing
    }
}

fn default_active() -> bool {
    true
}

/// One unit of work in a toolpath document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Display label
    pub label: String,
    /// Inactive operations are not emitted
    #[serde(default = "default_active")]
    pub active: bool,
    /// Mark every line of this operation as skippable
    #[serde(default)]
    pub block_delete: bool,
    /// Own coolant mode; unset falls back to the base operation
    #[serde(default)]
    pub coolant: Option<CoolantMode>,
    /// Index of the base operation in the document
    #[serde(default)]
    pub base: Option<usize>,
    /// Tool controller feeds and speeds, when known
    #[serde(default)]
    pub tool_controller: Option<ToolController>,
    /// Motion-command tree; `None` means the member is not a path
    #[serde(default)]
    pub commands: Option<Vec<PathNode>>,
}

impl Operation {
    /// Create an active operation with an empty command tree
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            active: true,
            block_delete: false,
            coolant: None,
            base: None,
            tool_controller: None,
            commands: Some(Vec::new()),
        }
    }

    /// Builder-style command tree setter
    pub fn with_commands(mut self, commands: Vec<PathNode>) -> Self {
        self.commands = Some(commands);
        self
    }

    /// Depth-first iterator over every command of this operation
    pub fn commands(&self) -> Commands<'_> {
        Commands::new(self.commands.as_deref().unwrap_or_default())
    }
}

/// An ordered list of operations; order is emission order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ToolPathDocument {
    /// Source document file name, used to derive remote file names
    #[serde(default)]
    pub name: Option<String>,
    /// Operations in emission order
    pub operations: Vec<Operation>,
}

impl ToolPathDocument {
    /// Create a document from operations
    pub fn new(operations: Vec<Operation>) -> Self {
        Self {
            name: None,
            operations,
        }
    }

    /// Check that every member carries a motion-command tree
    pub fn validate(&self) -> Result<(), GcodeError> {
        match self.operations.iter().find(|op| op.commands.is_none()) {
            Some(op) => Err(GcodeError::InvalidOperationMember {
                label: op.label.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Base operation of `op`, if it names a valid one
    pub fn base_of(&self, op: &Operation) -> Option<&Operation> {
        let index = op.base?;
        let base = self.operations.get(index);
        if base.is_none() {
            tracing::warn!("Operation {} names missing base #{}", op.label, index);
        }
        base
    }

    /// Operations to emit, in document order, with base attributes resolved
    pub fn active_operations(&self) -> impl Iterator<Item = OperationView<'_>> {
        self.operations
            .iter()
            .map(|op| OperationView {
                op,
                base: self.base_of(op),
            })
            .filter(|view| {
                let active = view.is_active();
                if !active {
                    tracing::debug!("Skipping inactive operation {}", view.op.label);
                }
                active
            })
    }
}

/// An operation paired with its resolved base
#[derive(Debug, Clone, Copy)]
pub struct OperationView<'a> {
    /// The operation itself
    pub op: &'a Operation,
    /// Its base operation, if any
    pub base: Option<&'a Operation>,
}

impl<'a> OperationView<'a> {
    /// Active unless the operation or its base is inactive
    pub fn is_active(&self) -> bool {
        self.op.active && self.base.is_none_or(|base| base.active)
    }

    /// Block delete is set on the operation or on its base
    pub fn block_delete(&self) -> bool {
        self.op.block_delete || self.base.is_some_and(|base| base.block_delete)
    }

    /// Own coolant mode, else the base's, else none
    pub fn coolant(&self) -> CoolantMode {
        self.op
            .coolant
            .or_else(|| self.base.and_then(|base| base.coolant))
            .unwrap_or_default()
    }

    /// Own tool controller, else the base's
    pub fn tool_controller(&self) -> Option<&'a ToolController> {
        self.op
            .tool_controller
            .as_ref()
            .or_else(|| self.base.and_then(|base| base.tool_controller.as_ref()))
    }

    /// Display label of the operation
    pub fn label(&self) -> &'a str {
        &self.op.label
    }

    /// Depth-first iterator over the operation's commands
    pub fn commands(&self) -> Commands<'a> {
        self.op.commands()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::command::MotionCommand;

    fn op(label: &str) -> Operation {
        Operation::new(label).with_commands(vec![PathNode::Command(MotionCommand::new("G0"))])
    }

    #[test]
    fn test_inherits_from_base() {
        let mut base = op("Base");
        base.block_delete = true;
        base.coolant = Some(CoolantMode::Mist);
        let mut child = op("Child");
        child.base = Some(0);

        let doc = ToolPathDocument::new(vec![base, child]);
        let views: Vec<_> = doc.active_operations().collect();
        assert_eq!(views.len(), 2);
        assert!(views[1].block_delete());
        assert_eq!(views[1].coolant(), CoolantMode::Mist);
    }

    #[test]
    fn test_own_coolant_wins() {
        let mut base = op("Base");
        base.coolant = Some(CoolantMode::Mist);
        let mut child = op("Child");
        child.base = Some(0);
        child.coolant = Some(CoolantMode::Flood);

        let doc = ToolPathDocument::new(vec![base, child]);
        let views: Vec<_> = doc.active_operations().collect();
        assert_eq!(views[1].coolant(), CoolantMode::Flood);
    }

    #[test]
    fn test_inactive_base_skips_operation() {
        let mut base = op("Base");
        base.active = false;
        let mut child = op("Child");
        child.base = Some(0);
        let other = op("Other");

        let doc = ToolPathDocument::new(vec![base, child, other]);
        let labels: Vec<&str> = doc.active_operations().map(|v| v.label()).collect();
        assert_eq!(labels, vec!["Other"]);
    }

    #[test]
    fn test_missing_base_is_ignored() {
        let mut child = op("Child");
        child.base = Some(7);
        let doc = ToolPathDocument::new(vec![child]);
        let views: Vec<_> = doc.active_operations().collect();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].coolant(), CoolantMode::None);
    }

    #[test]
    fn test_validate_rejects_non_path_member() {
        let mut stock = Operation::new("Stock");
        stock.commands = None;
        let doc = ToolPathDocument::new(vec![op("A"), stock, op("B")]);
        assert_eq!(
            doc.validate(),
            Err(GcodeError::InvalidOperationMember {
                label: "Stock".to_string()
            })
        );
    }

    #[test]
    fn test_tool_controller_missing() {
        let tc = ToolController {
            vertical_feed: 0.0,
            horizontal_feed: 10.0,
            spindle_speed: 0.0,
        };
        assert_eq!(tc.missing(), vec!["vertical feed", "spindle speed"]);
    }
}
