//! Motion command types
//!
//! A toolpath is a tree of [`PathNode`]s. Leaves are [`MotionCommand`]s (a name
//! plus lettered numeric parameters); groups nest further nodes and carry no
//! parameters of their own.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Parameter letter of a motion command
///
/// Declaration order is the canonical emission order, so iterating a
/// `BTreeMap<Param, _>` yields parameters in program order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Param {
    X,
    Y,
    Z,
    A,
    B,
    C,
    I,
    J,
    F,
    S,
    T,
    Q,
    R,
    L,
    H,
    D,
    P,
}

impl Param {
    /// The letter written in front of the value
    pub fn letter(self) -> char {
        match self {
            Param::X => 'X',
            Param::Y => 'Y',
            Param::Z => 'Z',
            Param::A => 'A',
            Param::B => 'B',
            Param::C => 'C',
            Param::I => 'I',
            Param::J => 'J',
            Param::F => 'F',
            Param::S => 'S',
            Param::T => 'T',
            Param::Q => 'Q',
            Param::R => 'R',
            Param::L => 'L',
            Param::H => 'H',
            Param::D => 'D',
            Param::P => 'P',
        }
    }

    /// Tool, offset and spindle words are written as integers
    pub fn is_integer(self) -> bool {
        matches!(self, Param::T | Param::H | Param::D | Param::S)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Classification of a command name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// G0 rapid move
    Rapid,
    /// G1 feed move
    Feed,
    /// G2/G3 arc move
    Arc,
    /// G4 dwell
    Dwell,
    /// M6 tool change
    ToolChange,
    /// M3/M4/M5 spindle directive
    Spindle,
    /// M7/M8/M9 coolant directive
    Coolant,
    /// Name is itself a parenthesised comment
    Comment,
    /// Operator message
    Message,
    /// Anything else (passed through verbatim)
    Other,
}

impl CommandKind {
    /// Classify a command name
    pub fn of(name: &str) -> Self {
        if name.starts_with('(') {
            return Self::Comment;
        }
        match name.to_ascii_uppercase().as_str() {
            "G0" | "G00" => Self::Rapid,
            "G1" | "G01" => Self::Feed,
            "G2" | "G02" | "G3" | "G03" => Self::Arc,
            "G4" | "G04" => Self::Dwell,
            "M6" | "M06" => Self::ToolChange,
            "M3" | "M03" | "M4" | "M04" | "M5" | "M05" => Self::Spindle,
            "M7" | "M07" | "M8" | "M08" | "M9" | "M09" => Self::Coolant,
            "MESSAGE" => Self::Message,
            _ => Self::Other,
        }
    }
}

/// A single motion command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionCommand {
    /// Command name, e.g. "G1", "M6", "(comment)" or "message"
    pub name: String,
    /// Parameter values; lengths in mm, feed rates in mm/s
    #[serde(default)]
    pub params: BTreeMap<Param, f64>,
}

impl MotionCommand {
    /// Create a command without parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    /// Builder-style parameter setter
    pub fn with(mut self, param: Param, value: f64) -> Self {
        self.params.insert(param, value);
        self
    }

    /// Get a parameter value
    pub fn get(&self, param: Param) -> Option<f64> {
        self.params.get(&param).copied()
    }

    /// Classify the command name
    pub fn kind(&self) -> CommandKind {
        CommandKind::of(&self.name)
    }
}

/// Node of a toolpath tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathNode {
    /// A motion command leaf
    Command(MotionCommand),
    /// A compound: nested nodes, flattened in order
    Group(Vec<PathNode>),
    /// A non-path leaf (stock, fixtures); contributes nothing
    Opaque(String),
}

impl PathNode {
    /// Depth-first iterator over every command below this node
    pub fn commands(&self) -> Commands<'_> {
        Commands::new(std::slice::from_ref(self))
    }
}

/// Depth-first iterator over the commands of a node list
///
/// Groups are flattened transparently and opaque leaves are skipped.
pub struct Commands<'a> {
    stack: Vec<std::slice::Iter<'a, PathNode>>,
}

impl<'a> Commands<'a> {
    /// Iterate over the commands of a node list
    pub fn new(nodes: &'a [PathNode]) -> Self {
        Self {
            stack: vec![nodes.iter()],
        }
    }
}

impl<'a> Iterator for Commands<'a> {
    type Item = &'a MotionCommand;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some(PathNode::Command(command)) => return Some(command),
                Some(PathNode::Group(children)) => self.stack.push(children.iter()),
                Some(PathNode::Opaque(_)) => {}
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}
