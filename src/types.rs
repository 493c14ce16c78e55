//! This module defines the core data structures and types used throughout the simulator,
//! including the parsed program, control states, transitions, step outcomes and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::Rule;

/// The wildcard symbol. On read it matches any non-blank symbol, on write it leaves the cell unchanged.
/// It never occupies a tape cell.
pub const WILDCARD: char = '*';
/// The maximum allowed size for a machine description in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB
/// The maximum number of tapes a description may declare.
pub const MAX_TAPES: usize = 256;
/// The default number of steps a driver executes before giving up.
pub const MAX_EXECUTION_STEPS: usize = 10000;

/// A parsed machine description.
///
/// Holds everything declared in a `.tm` document: the alphabets, the control states and
/// the ordered transition table. A [`TuringMachine`](crate::TuringMachine) is built from it
/// together with an input word.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Program {
    /// Declared control states (`#Q`).
    pub states: Vec<State>,
    /// Symbols an input word may consist of (`#S`).
    pub input_symbols: Vec<char>,
    /// Symbols that may appear on any tape (`#G`).
    pub tape_symbols: Vec<char>,
    /// The state the machine starts in (`#q0`).
    pub initial_state: State,
    /// The symbol of every unwritten cell (`#B`).
    pub blank: char,
    /// States a driver treats as accepting (`#F`).
    pub final_states: Vec<State>,
    /// Number of tapes (`#N`).
    pub tapes: usize,
    /// Transitions in declaration order, which is also their priority.
    pub transitions: Vec<Transition>,
}

impl Program {
    /// Checks whether `state` is one of the declared final states.
    pub fn is_final(&self, state: &State) -> bool {
        self.final_states.contains(state)
    }
}

/// A named control state. Two states are equal when their names are.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(String);

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for State {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Represents a single transition rule.
///
/// When the machine is in `state` and the symbols under its heads match `read`, it writes
/// `write`, moves each head by `directions` and continues in `next_state`. All three lists
/// hold one entry per tape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The state this rule triggers in.
    pub state: State,
    /// A vector of characters to be read from each tape.
    pub read: Vec<char>,
    /// A vector of characters to be written to each tape.
    pub write: Vec<char>,
    /// A vector of directions for each tape's head to move after the transition.
    pub directions: Vec<Direction>,
    /// The next state the machine transitions to.
    pub next_state: State,
}

impl Transition {
    /// Checks whether this rule applies to the given configuration.
    ///
    /// Every position must match: either literally, or through a [`WILDCARD`] trigger
    /// standing for any symbol except `blank`.
    pub fn matches(&self, state: &State, symbols: &[char], blank: char) -> bool {
        self.state == *state
            && self.read.len() == symbols.len()
            && self
                .read
                .iter()
                .zip(symbols)
                .all(|(&read, &symbol)| read == symbol || (read == WILDCARD && symbol != blank))
    }
}

/// Represents the possible directions a head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl TryFrom<char> for Direction {
    type Error = char;

    /// Converts the direction characters of the description format: `l`, `r` and `*`.
    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'l' => Ok(Direction::Left),
            'r' => Ok(Direction::Right),
            '*' => Ok(Direction::Stay),
            other => Err(other),
        }
    }
}

/// Represents the outcome of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A transition was applied and the machine may continue.
    Continue,
    /// No transition applies; state and tapes are left unchanged.
    Halt,
}

/// Represents various errors that can occur while loading, parsing or starting a machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// Indicates a malformed description: unexpected tokens, misplaced or repeated sections.
    #[error("Syntax error: {0}")]
    SyntaxError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates a well-formed description whose parts do not fit together,
    /// e.g. a transition that does not address every tape.
    #[error("Structural error: {0}")]
    StructuralError(String),
    /// Indicates an input word containing a symbol outside the input alphabet.
    #[error("Illegal input symbol '{symbol}' at index {index}")]
    InvalidInputSymbol { index: usize, symbol: char },
    /// Indicates an error during the validation of a program's consistency.
    #[error("Program validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to file system operations, such as reading program files.
    #[error("File error: {0}")]
    FileError(String),
}
