//! Tool-change aware program optimizer
//!
//! A single forward pass over emitted program lines. After a tool change,
//! combined XY+Z moves are split so horizontal travel comes first and Z-only
//! moves are held back until the first XY move. Optionally, feed and Z words
//! repeating the previous value are stripped.

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Optimize program text; see [`GCodeOptimizer`]
pub fn optimize(text: &str, trim_redundant: bool, reorder_around_tool_change: bool) -> String {
    GCodeOptimizer::new(trim_redundant, reorder_around_tool_change).optimize(text)
}

fn word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z])([-+]?(?:\d+\.?\d*|\.\d+))$").expect("invalid regex pattern")
    })
}

/// One whitespace-separated piece of a program line
#[derive(Debug, Clone, PartialEq)]
enum Token<'a> {
    /// Block delete marker or N word at the start of the line
    Prefix(&'a str),
    /// Letter plus numeric value
    Word {
        text: &'a str,
        letter: char,
        value: &'a str,
    },
    /// Parenthesised comment, `;` remark, or anything unrecognised
    Other(&'a str),
}

impl<'a> Token<'a> {
    fn text(&self) -> &'a str {
        match self {
            Token::Prefix(text) | Token::Other(text) => text,
            Token::Word { text, .. } => text,
        }
    }

    fn letter(&self) -> Option<char> {
        match self {
            Token::Word { letter, .. } => Some(*letter),
            _ => None,
        }
    }

    fn is_letter(&self, wanted: char) -> bool {
        self.letter() == Some(wanted)
    }

    fn is_xy(&self) -> bool {
        self.is_letter('X') || self.is_letter('Y')
    }
}

fn classify(text: &str) -> Token<'_> {
    match word_regex().captures(text) {
        Some(caps) => {
            let letter = caps[1]
                .chars()
                .next()
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or_default();
            let value = caps.get(2).map_or("", |m| m.as_str());
            Token::Word {
                text,
                letter,
                value,
            }
        }
        None => Token::Other(text),
    }
}

fn split_raw(line: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = line.trim_start();
    while !rest.is_empty() {
        let end = if rest.starts_with(';') {
            rest.len()
        } else if rest.starts_with('(') {
            rest.find(')').map_or(rest.len(), |i| i + 1)
        } else {
            rest.find(|c: char| c.is_whitespace() || c == '(' || c == ';')
                .unwrap_or(rest.len())
        };
        pieces.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }
    pieces
}

/// Split a line into tokens, recognising the leading block delete and N prefix
fn tokenize(line: &str) -> Vec<Token<'_>> {
    let mut in_prefix = true;
    split_raw(line)
        .into_iter()
        .map(|piece| {
            if in_prefix {
                if piece == "/" {
                    return Token::Prefix(piece);
                }
                let token = classify(piece);
                if token.is_letter('N') {
                    return Token::Prefix(piece);
                }
                in_prefix = false;
                token
            } else {
                classify(piece)
            }
        })
        .collect()
}

fn join(tokens: &[&Token<'_>]) -> String {
    tokens
        .iter()
        .map(|t| t.text())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Line is a comment iff it starts and ends with the comment delimiters
pub fn is_comment(line: &str) -> bool {
    line.starts_with('(') && line.ends_with(')')
}

fn is_tool_change(tokens: &[Token<'_>]) -> bool {
    tokens.iter().any(|t| match t {
        Token::Word { letter: 'M', value, .. } => value.parse::<f64>().is_ok_and(|v| v == 6.0),
        _ => false,
    })
}

/// Blank, or a rapid/feed word without parameters
fn is_droppable(tokens: &[Token<'_>]) -> bool {
    let body: Vec<&Token<'_>> = tokens
        .iter()
        .filter(|t| !matches!(t, Token::Prefix(_)))
        .collect();
    match body.as_slice() {
        [] => true,
        [word] => matches!(word.text().to_ascii_uppercase().as_str(), "G0" | "G00" | "G1" | "G01"),
        _ => false,
    }
}

/// Rolling state of one optimizer run
#[derive(Debug, Default, Clone)]
struct OptimizerState {
    /// Z-only lines withheld after a tool change
    buffer: Vec<String>,
    /// A tool change was seen and its first XY move is pending
    post_tool_change: bool,
    /// Value text of the last feed word kept
    last_feed: Option<String>,
    /// Value text of the last Z word kept
    last_z: Option<String>,
}

/// Line-level rewriter applied to emitted programs
#[derive(Debug, Clone, Copy)]
pub struct GCodeOptimizer {
    trim_redundant: bool,
    reorder_around_tool_change: bool,
}

impl GCodeOptimizer {
    pub fn new(trim_redundant: bool, reorder_around_tool_change: bool) -> Self {
        Self {
            trim_redundant,
            reorder_around_tool_change,
        }
    }

    /// Optimize program text; the result is newline-terminated unless empty
    pub fn optimize(&self, text: &str) -> String {
        let lines: Vec<&str> = text.lines().collect();
        let out = self.optimize_lines(&lines);
        if out.is_empty() {
            return String::new();
        }
        let mut result = out.join("\n");
        result.push('\n');
        result
    }

    /// Optimize a sequence of lines
    pub fn optimize_lines<S: AsRef<str>>(&self, lines: &[S]) -> Vec<String> {
        let mut state = OptimizerState::default();
        let mut out = Vec::with_capacity(lines.len());
        let mut splits = 0usize;

        for raw in lines {
            let line = raw.as_ref().trim();
            let comment = is_comment(line);
            let tokens = tokenize(line);

            if !comment && is_tool_change(&tokens) {
                state.post_tool_change = true;
                out.push(line.to_string());
                continue;
            }

            if state.post_tool_change && self.reorder_around_tool_change && !comment {
                let has_z = tokens.iter().any(|t| t.is_letter('Z'));
                let has_xy = tokens.iter().any(Token::is_xy);
                if has_z && has_xy {
                    let (xy, z) = split_xy_z(&tokens);
                    out.push(xy);
                    out.push(z);
                    state.post_tool_change = false;
                    splits += 1;
                } else if has_z {
                    state.buffer.push(line.to_string());
                } else if has_xy {
                    out.push(line.to_string());
                    out.append(&mut state.buffer);
                    state.post_tool_change = false;
                } else if !is_droppable(&tokens) {
                    out.push(line.to_string());
                }
                continue;
            }

            let line = if self.trim_redundant && !comment {
                trim_line(&tokens, &mut state).unwrap_or_else(|| line.to_string())
            } else {
                line.to_string()
            };
            if !is_droppable(&tokenize(&line)) {
                out.push(line);
            }
        }

        if !state.buffer.is_empty() {
            debug!("Flushing {} held Z moves at end of program", state.buffer.len());
            out.append(&mut state.buffer);
        }
        debug!("Optimized {} lines into {} ({} split)", lines.len(), out.len(), splits);
        out
    }
}

/// XY line and Z line sharing the prefix and leading G/M word
///
/// Only Z words move to the Z line. Feed and every other non-Z word stay on
/// the XY line, so the first horizontal move keeps its feed rate.
fn split_xy_z(tokens: &[Token<'_>]) -> (String, String) {
    let leading = tokens
        .iter()
        .position(|t| !matches!(t, Token::Prefix(_)))
        .filter(|&i| matches!(tokens[i].letter(), Some('G') | Some('M')));

    let mut shared: Vec<&Token<'_>> = tokens
        .iter()
        .take_while(|t| matches!(t, Token::Prefix(_)))
        .collect();
    if let Some(i) = leading {
        shared.push(&tokens[i]);
    }
    let body = tokens
        .iter()
        .enumerate()
        .filter(|(i, t)| !matches!(t, Token::Prefix(_)) && Some(*i) != leading)
        .map(|(_, t)| t);

    let mut xy = shared.clone();
    let mut z = shared;
    for token in body {
        if token.is_letter('Z') {
            z.push(token);
        } else {
            xy.push(token);
        }
    }
    (join(&xy), join(&z))
}

/// Strip F and Z words repeating the last kept value; `None` if nothing changed
fn trim_line(tokens: &[Token<'_>], state: &mut OptimizerState) -> Option<String> {
    let mut skip = [None, None];
    for (slot, letter) in [(0, 'F'), (1, 'Z')] {
        let Some((index, value)) = tokens.iter().enumerate().find_map(|(i, t)| match t {
            Token::Word { letter: l, value, .. } if *l == letter => Some((i, *value)),
            _ => None,
        }) else {
            continue;
        };
        let last = if letter == 'F' {
            &mut state.last_feed
        } else {
            &mut state.last_z
        };
        if last.as_deref() == Some(value) {
            skip[slot] = Some(index);
        } else {
            *last = Some(value.to_string());
        }
    }
    if skip == [None, None] {
        return None;
    }
    let kept: Vec<&Token<'_>> = tokens
        .iter()
        .enumerate()
        .filter(|(i, _)| !skip.contains(&Some(*i)))
        .map(|(_, t)| t)
        .collect();
    Some(join(&kept))
}
