//! This crate provides the core logic for a multi-tape Turing machine simulator.
//! It includes modules for parsing machine descriptions, validating input words, simulating
//! execution on lazily grown tapes, analyzing descriptions and a catalogue of embedded programs.

pub mod analyzer;
pub mod checker;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod tape;
pub mod trace;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the analysis entry points and `AnalysisError` from the analyzer module.
pub use analyzer::{analyze, diagnose, AnalysisError};
pub use checker::Checker;
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the `TuringMachine` struct from the machine module.
pub use machine::{TuringMachine, COMPACTION_INTERVAL};
/// Re-exports the parsing functions from the parser module.
pub use parser::{parse, parse_machine};
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
pub use tape::Tape;
pub use trace::{Snapshot, TapeView, TRACE_TARGET};
/// Re-exports the machine definition and execution types from the types module.
pub use types::{
    Direction, Program, State, Step, Transition, TuringMachineError, MAX_EXECUTION_STEPS,
    MAX_PROGRAM_SIZE, MAX_TAPES, WILDCARD,
};
