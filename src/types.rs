//! This module defines the core data structures and types used throughout the interpreter,
//! including tape symbols, head directions, transition rules, execution results, and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::MachineConfig;

/// The control state the machine starts in unless configured otherwise.
pub const DEFAULT_INITIAL_STATE: char = '0';
/// The distinguished control state that signals termination.
pub const DEFAULT_HALT_STATE: char = 'H';
/// The number of cells on the tape unless configured otherwise.
pub const DEFAULT_TAPE_CAPACITY: usize = 20;
/// The largest tape a machine may be configured with.
pub const MAX_TAPE_CAPACITY: usize = 1 << 20;
/// The maximum number of steps `run` executes before giving up.
pub const MAX_EXECUTION_STEPS: usize = 10000;

/// A tape symbol from the closed binary alphabet.
///
/// The declaration order (`Blank < Zero < One`) is the order used when listing rules.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Symbol {
    /// An empty cell, written `_`.
    #[default]
    #[serde(rename = "_")]
    Blank,
    /// Written `0`.
    #[serde(rename = "0")]
    Zero,
    /// Written `1`.
    #[serde(rename = "1")]
    One,
}

impl Symbol {
    /// Returns the single-character token of this symbol.
    pub fn as_char(self) -> char {
        match self {
            Symbol::Blank => '_',
            Symbol::Zero => '0',
            Symbol::One => '1',
        }
    }

    /// Converts a single-character token into a symbol.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '_' => Some(Symbol::Blank),
            '0' => Some(Symbol::Zero),
            '1' => Some(Symbol::One),
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Symbol {
    type Err = MachineError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        single_char(token)
            .and_then(Symbol::from_char)
            .ok_or_else(|| {
                MachineError::MalformedProgram(format!("unrecognized symbol token {:?}", token))
            })
    }
}

/// Represents the possible directions the head can move. There is no "stay".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    #[serde(rename = "L")]
    Left,
    /// Move the head one position to the right.
    #[serde(rename = "R")]
    Right,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "L"),
            Direction::Right => write!(f, "R"),
        }
    }
}

impl FromStr for Direction {
    type Err = MachineError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "L" => Ok(Direction::Left),
            "R" => Ok(Direction::Right),
            _ => Err(MachineError::MalformedProgram(format!(
                "unrecognized direction token {:?}",
                token
            ))),
        }
    }
}

/// A program as supplied by an ingestion source: a name, a rule list, and optionally
/// an initial tape and configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// The name of the program.
    #[serde(alias = "function")]
    pub name: String,
    /// Free-form description of the program's states, shown by hosts.
    #[serde(default)]
    pub states: Vec<String>,
    /// The transition rules, in source order.
    #[serde(alias = "delta")]
    pub rules: Vec<RuleSpec>,
    /// The initial tape. Hosts may supply a separate one instead.
    #[serde(default)]
    pub tape: TapeSpec,
    #[serde(default)]
    pub config: MachineConfig,
}

/// One transition rule in token form. Tokens are validated when the machine is loaded.
///
/// Accepts both the object form and the compact `[[state, symbol], [state, symbol, dir]]` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RuleEntry")]
pub struct RuleSpec {
    pub from_state: String,
    pub from_symbol: String,
    pub to_state: String,
    pub to_symbol: String,
    pub direction: String,
}

impl RuleSpec {
    pub fn new(
        from_state: char,
        from_symbol: &str,
        to_state: char,
        to_symbol: &str,
        direction: &str,
    ) -> Self {
        Self {
            from_state: from_state.to_string(),
            from_symbol: from_symbol.to_string(),
            to_state: to_state.to_string(),
            to_symbol: to_symbol.to_string(),
            direction: direction.to_string(),
        }
    }

    /// Validates the tokens of this rule and converts it into an `Instruction`.
    pub fn to_instruction(&self) -> Result<Instruction, MachineError> {
        Ok(Instruction {
            key: InstructionKey {
                state: parse_state(&self.from_state)?,
                symbol: self.from_symbol.parse()?,
            },
            body: InstructionBody {
                next_state: parse_state(&self.to_state)?,
                write: self.to_symbol.parse()?,
                direction: self.direction.parse()?,
            },
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RuleEntry {
    Compact([String; 2], [String; 3]),
    Named {
        from_state: String,
        from_symbol: String,
        to_state: String,
        to_symbol: String,
        direction: String,
    },
}

impl From<RuleEntry> for RuleSpec {
    fn from(entry: RuleEntry) -> Self {
        match entry {
            RuleEntry::Compact([from_state, from_symbol], [to_state, to_symbol, direction]) => {
                Self {
                    from_state,
                    from_symbol,
                    to_state,
                    to_symbol,
                    direction,
                }
            }
            RuleEntry::Named {
                from_state,
                from_symbol,
                to_state,
                to_symbol,
                direction,
            } => Self {
                from_state,
                from_symbol,
                to_state,
                to_symbol,
                direction,
            },
        }
    }
}

/// The initial tape assignment: symbols written from `start_offset` onwards.
/// The head starts at `start_offset`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapeSpec {
    #[serde(alias = "start_cell", default)]
    pub start_offset: usize,
    #[serde(alias = "data", default)]
    pub symbols: Vec<String>,
}

impl TapeSpec {
    pub fn new(start_offset: usize, symbols: &[&str]) -> Self {
        Self {
            start_offset,
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Parses a control-state token, which must be exactly one character.
pub fn parse_state(token: &str) -> Result<char, MachineError> {
    single_char(token).ok_or_else(|| {
        MachineError::MalformedProgram(format!(
            "state token {:?} must be a single character",
            token
        ))
    })
}

fn single_char(token: &str) -> Option<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// The left-hand side of a transition rule: `d(state, symbol)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstructionKey {
    pub state: char,
    pub symbol: Symbol,
}

/// The right-hand side of a transition rule: `(new state, new symbol, direction)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionBody {
    pub next_state: char,
    pub write: Symbol,
    pub direction: Direction,
}

/// A complete transition rule, as fetched for the current (state, symbol) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub key: InstructionKey,
    pub body: InstructionBody,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "d({}, {}) = ({}, {}, {})",
            self.key.state,
            self.key.symbol,
            self.body.next_state,
            self.body.write,
            self.body.direction
        )
    }
}

/// Why the machine stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// The fetched instruction targets the halt state.
    HaltState,
    /// No rule exists for the current (state, symbol) pair.
    NoMatchingRule(InstructionKey),
}

/// Represents the outcome of a single `step`.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The machine performed a step and can continue.
    Continue,
    /// The machine cannot perform any further step.
    Halt(Halt),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Halt {
    /// Stopped on an instruction targeting the halt state.
    Ok,

    Err(MachineError),
}

impl From<HaltReason> for Halt {
    fn from(reason: HaltReason) -> Self {
        match reason {
            HaltReason::HaltState => Halt::Ok,
            HaltReason::NoMatchingRule(key) => Halt::Err(MachineError::NoMatchingRule {
                state: key.state,
                symbol: key.symbol,
            }),
        }
    }
}

/// Represents the errors that can occur while loading or running a machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    /// A rule uses an unknown token, a duplicate key, or starts from the halt state.
    #[error("Malformed program: {0}")]
    MalformedProgram(String),
    /// The initial tape data does not fit on the tape.
    #[error("Initial data at offset {offset} with {len} symbols exceeds tape capacity {capacity}")]
    OutOfRange {
        offset: usize,
        len: usize,
        capacity: usize,
    },
    /// No transition is defined for the current state and symbol.
    #[error("No rule defined for state {state} and symbol {symbol}")]
    NoMatchingRule { state: char, symbol: Symbol },
    /// Moving the head would leave the tape.
    #[error("Head at {position} cannot move {direction} on a tape of {capacity} cells")]
    HeadOutOfBounds {
        position: usize,
        direction: Direction,
        capacity: usize,
    },
    /// Execute was attempted after the machine halted.
    #[error("Machine has already halted")]
    AlreadyHalted,
    /// Execute was attempted with no fetched instruction.
    #[error("No instruction has been fetched")]
    NotFetched,
    /// A program or tape file could not be read.
    #[error("File error: {0}")]
    FileError(String),
    /// No embedded program matches the requested index or name.
    #[error("Unknown program: {0}")]
    UnknownProgram(String),
    /// A program or tape document is not valid JSON for its format.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<serde_json::Error> for MachineError {
    fn from(error: serde_json::Error) -> Self {
        MachineError::ParseError(error.to_string())
    }
}
