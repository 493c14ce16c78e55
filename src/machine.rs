//! This module defines the `TuringMachine` struct, which simulates a multi-tape Turing Machine.
//! It owns the tapes, the current control state and the ordered transition table, and
//! advances one transition per step.

use crate::checker::Checker;
use crate::tape::Tape;
use crate::trace::{Snapshot, TapeView, TRACE_TARGET};
use crate::types::{
    Program, State, Step, Transition, TuringMachineError, MAX_TAPES, WILDCARD,
};
use tracing::{debug, info, trace, warn};

/// Tapes are compacted after every this many applied transitions.
pub const COMPACTION_INTERVAL: usize = 1024;

/// Represents a multi-tape Turing Machine.
///
/// Transitions are tried in declaration order and the first one matching the current
/// configuration is applied. The machine halts once none matches; classifying the halt as
/// accepting or rejecting is left to the caller, see [`Program::is_final`].
#[derive(Debug, Clone)]
pub struct TuringMachine {
    state: State,
    tapes: Vec<Tape>,
    transitions: Vec<Transition>,
    blank: char,
    step_count: usize,
}

impl TuringMachine {
    /// Creates a machine for `program` with `input` on its first tape.
    ///
    /// # Returns
    ///
    /// * `Ok(TuringMachine)` if every symbol of `input` belongs to the input alphabet.
    /// * `Err(TuringMachineError::InvalidInputSymbol)` for the first one that does not.
    pub fn new(program: &Program, input: &str) -> Result<Self, TuringMachineError> {
        Checker::new(&program.input_symbols).check(input)?;

        Ok(Self::from_parts(
            program.tapes,
            input,
            program.transitions.clone(),
            program.initial_state.clone(),
            program.blank,
        ))
    }

    /// Creates a machine with `tapes` tapes, clamped to `1..=MAX_TAPES`, without validating `input`.
    ///
    /// `input` is written onto the first tape, all other tapes start blank.
    pub fn from_parts(
        tapes: usize,
        input: &str,
        transitions: Vec<Transition>,
        initial_state: State,
        blank: char,
    ) -> Self {
        let tapes = std::iter::once(Tape::new(blank, input))
            .chain(std::iter::repeat_with(|| Tape::empty(blank)))
            .take(tapes.clamp(1, MAX_TAPES))
            .collect();

        Self {
            state: initial_state,
            tapes,
            transitions,
            blank,
            step_count: 0,
        }
    }

    /// Executes a single step.
    ///
    /// With `verbose` set, a [`Snapshot`] of the configuration before the step is emitted as
    /// an `INFO` event on the [`TRACE_TARGET`](crate::trace::TRACE_TARGET) target.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if a transition was applied.
    /// * `Step::Halt` if no transition matches; state and tapes are left untouched.
    pub fn step(&mut self, verbose: bool) -> Step {
        let symbols = self.symbols();

        if verbose {
            let snapshot = self.snapshot();
            info!(target: TRACE_TARGET, "{snapshot}");
        }

        self.step_count += 1;

        let Some(index) = self
            .transitions
            .iter()
            .position(|t| t.matches(&self.state, &symbols, self.blank))
        else {
            debug!(state = %self.state, steps = self.step_count, "no transition applies, halting");
            return Step::Halt;
        };

        let transition = &self.transitions[index];
        trace!(
            from = %transition.state,
            to = %transition.next_state,
            read = ?symbols,
            "applying transition #{index}"
        );

        for ((tape, &write), &direction) in self
            .tapes
            .iter_mut()
            .zip(&transition.write)
            .zip(&transition.directions)
        {
            if write != WILDCARD {
                tape.write(write);
            }
            tape.move_head(direction);
        }

        self.state = transition.next_state.clone();

        if self.step_count % COMPACTION_INTERVAL == 0 {
            self.tapes.iter_mut().for_each(Tape::compact);
        }

        Step::Continue
    }

    /// Runs the machine until it halts or its step count reaches `limit`.
    ///
    /// # Returns
    ///
    /// * `Step::Halt` if the machine halted.
    /// * `Step::Continue` if the limit was reached first.
    pub fn run(&mut self, limit: Option<usize>, verbose: bool) -> Step {
        loop {
            if let Some(limit) = limit.filter(|&limit| self.step_count >= limit) {
                warn!(limit, state = %self.state, "step limit reached before halting");
                return Step::Continue;
            }

            if self.step(verbose) == Step::Halt {
                return Step::Halt;
            }
        }
    }

    /// Returns the content of the first tape without surrounding blanks.
    pub fn output(&mut self) -> String {
        self.tapes
            .first_mut()
            .map(|tape| {
                tape.compact();
                tape.content()
            })
            .unwrap_or_default()
    }

    /// Returns the current state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Returns the number of steps taken, including a final step that halted.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn tapes(&self) -> &[Tape] {
        &self.tapes
    }

    pub fn blank(&self) -> char {
        self.blank
    }

    /// Returns the symbol under each head, one per tape.
    pub fn symbols(&self) -> Vec<char> {
        self.tapes.iter().map(Tape::read).collect()
    }

    /// Returns the transition the next step would apply, if any.
    pub fn transition(&self) -> Option<&Transition> {
        let symbols = self.symbols();

        self.transitions
            .iter()
            .find(|t| t.matches(&self.state, &symbols, self.blank))
    }

    /// Captures the current configuration. Compacts every tape.
    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot {
            step: self.step_count,
            state: self.state.to_string(),
            tapes: self
                .tapes
                .iter_mut()
                .map(|tape| TapeView {
                    cells: tape.cells(),
                    head: tape.head(),
                })
                .collect(),
        }
    }
}
