//! This module provides functions for analyzing parsed programs to detect inconsistencies
//! the description format itself does not rule out: undeclared states and symbols, overlapping
//! alphabets and states the machine can never reach.

use crate::types::{Program, State, TuringMachineError, WILDCARD};
use std::collections::HashSet;
use thiserror::Error;

/// Represents the findings of an analysis of a program.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum AnalysisError {
    /// Indicates that the initial state is not among the declared states.
    #[error("Invalid start state: {0}")]
    InvalidStartState(String),
    /// Indicates final states that are not among the declared states.
    #[error("Final states not declared in '#Q': {0:?}")]
    UndeclaredFinalStates(Vec<String>),
    /// Indicates that transitions use states that are not declared.
    #[error("Transitions reference undeclared states: {0:?}")]
    UndeclaredStates(Vec<String>),
    /// Indicates that transitions read or write symbols missing from the tape alphabet.
    #[error("Transitions use symbols not declared in '#G': {0:?}")]
    UndeclaredSymbols(Vec<char>),
    /// Indicates input symbols missing from the tape alphabet.
    #[error("Input symbols not declared in '#G': {0:?}")]
    InputSymbolsNotOnTape(Vec<char>),
    /// Indicates a blank symbol that is missing from the tape alphabet or part of the input alphabet.
    #[error("Invalid blank symbol '{0}': {1}")]
    InvalidBlank(char, &'static str),
    /// Indicates declared states that cannot be reached from the initial state.
    #[error("Unreachable states detected: {0:?}")]
    UnreachableStates(Vec<String>),
    /// Indicates structural problems with the program (no tapes, mismatched transitions).
    #[error("{0}")]
    StructuralError(String),
}

impl From<AnalysisError> for TuringMachineError {
    /// Converts an `AnalysisError` into a `TuringMachineError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        TuringMachineError::ValidationError(error.to_string())
    }
}

/// Analyzes a given `Program`, stopping at the first finding.
///
/// # Returns
///
/// * `Ok(())` if no issues are found.
/// * `Err(TuringMachineError::ValidationError)` describing the first one otherwise.
pub fn analyze(program: &Program) -> Result<(), TuringMachineError> {
    match diagnose(program).into_iter().next() {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

/// Runs every check and collects all findings, in a fixed order.
pub fn diagnose(program: &Program) -> Vec<AnalysisError> {
    [
        check_structure,
        check_valid_start_state,
        check_final_states,
        check_alphabets,
        check_transition_states,
        check_transition_symbols,
        check_unreachable_states,
    ]
    .iter()
    .filter_map(|f| f(program).err())
    .collect()
}

/// Checks that there is at least one tape and every transition addresses each of them.
fn check_structure(program: &Program) -> Result<(), AnalysisError> {
    if program.tapes == 0 {
        return Err(AnalysisError::StructuralError(
            "No tapes defined".to_string(),
        ));
    }

    for (i, transition) in program.transitions.iter().enumerate() {
        if transition.read.len() != program.tapes
            || transition.write.len() != program.tapes
            || transition.directions.len() != program.tapes
        {
            return Err(AnalysisError::StructuralError(format!(
                "Transition #{} in state '{}' has inconsistent tape counts",
                i, transition.state
            )));
        }
    }

    Ok(())
}

/// Checks whether the initial state is one of the declared states.
fn check_valid_start_state(program: &Program) -> Result<(), AnalysisError> {
    if !program.states.contains(&program.initial_state) {
        return Err(AnalysisError::InvalidStartState(
            program.initial_state.to_string(),
        ));
    }

    Ok(())
}

/// Checks that every final state is declared.
fn check_final_states(program: &Program) -> Result<(), AnalysisError> {
    let undeclared = undeclared_states(program, program.final_states.iter());

    if !undeclared.is_empty() {
        return Err(AnalysisError::UndeclaredFinalStates(undeclared));
    }

    Ok(())
}

/// Checks that the input alphabet fits on the tape and the blank is a tape-only symbol.
fn check_alphabets(program: &Program) -> Result<(), AnalysisError> {
    let missing = sorted_unique(
        program
            .input_symbols
            .iter()
            .filter(|&c| !program.tape_symbols.contains(c))
            .copied(),
    );

    if !missing.is_empty() {
        return Err(AnalysisError::InputSymbolsNotOnTape(missing));
    }

    if !program.tape_symbols.contains(&program.blank) {
        return Err(AnalysisError::InvalidBlank(
            program.blank,
            "not part of the tape alphabet",
        ));
    }

    if program.input_symbols.contains(&program.blank) {
        return Err(AnalysisError::InvalidBlank(
            program.blank,
            "part of the input alphabet",
        ));
    }

    Ok(())
}

/// Checks that transitions only move between declared states.
fn check_transition_states(program: &Program) -> Result<(), AnalysisError> {
    let used = program
        .transitions
        .iter()
        .flat_map(|t| [&t.state, &t.next_state]);
    let undeclared = undeclared_states(program, used);

    if !undeclared.is_empty() {
        return Err(AnalysisError::UndeclaredStates(undeclared));
    }

    Ok(())
}

/// Checks that transitions only read and write declared tape symbols or the wildcard.
fn check_transition_symbols(program: &Program) -> Result<(), AnalysisError> {
    let undeclared = sorted_unique(
        program
            .transitions
            .iter()
            .flat_map(|t| t.read.iter().chain(&t.write))
            .filter(|&&c| c != WILDCARD && !program.tape_symbols.contains(&c))
            .copied(),
    );

    if !undeclared.is_empty() {
        return Err(AnalysisError::UndeclaredSymbols(undeclared));
    }

    Ok(())
}

/// Checks for declared states that no sequence of transitions leads to from the initial state.
fn check_unreachable_states(program: &Program) -> Result<(), AnalysisError> {
    let mut visited = HashSet::new();
    let mut queue = vec![&program.initial_state];

    while let Some(state) = queue.pop() {
        if !visited.insert(state) {
            continue;
        }

        for transition in program.transitions.iter().filter(|t| t.state == *state) {
            if !visited.contains(&transition.next_state) {
                queue.push(&transition.next_state);
            }
        }
    }

    let mut unreachable: Vec<String> = program
        .states
        .iter()
        .filter(|state| !visited.contains(state))
        .map(State::to_string)
        .collect();

    if !unreachable.is_empty() {
        unreachable.sort(); // Sort for deterministic output
        unreachable.dedup();
        return Err(AnalysisError::UnreachableStates(unreachable));
    }

    Ok(())
}

fn undeclared_states<'a>(
    program: &Program,
    states: impl Iterator<Item = &'a State>,
) -> Vec<String> {
    let mut undeclared: Vec<String> = states
        .filter(|&state| !program.states.contains(state))
        .map(State::to_string)
        .collect();

    undeclared.sort();
    undeclared.dedup();
    undeclared
}

fn sorted_unique(symbols: impl Iterator<Item = char>) -> Vec<char> {
    let mut symbols: Vec<char> = symbols.collect();
    symbols.sort();
    symbols.dedup();
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn sample(transitions: &str) -> Program {
        parse(&format!(
            "#Q = {{q0,q1,q2}}\n#S = {{0,1}}\n#G = {{0,1,_}}\n#q0 = q0\n#B = _\n#F = {{q2}}\n#N = 1\n{transitions}"
        ))
        .unwrap()
    }

    #[test]
    fn test_valid_program() {
        let program = sample("q0 * * r q1\nq1 _ _ * q2");
        assert!(diagnose(&program).is_empty());
        assert!(analyze(&program).is_ok());
    }

    #[test]
    fn test_invalid_start_state() {
        let mut program = sample("q0 0 1 r q1\nq1 _ _ * q2");
        program.initial_state = State::from("start");

        assert_eq!(
            check_valid_start_state(&program),
            Err(AnalysisError::InvalidStartState("start".to_string()))
        );
    }

    #[test]
    fn test_undeclared_final_states() {
        let mut program = sample("q0 0 1 r q1\nq1 _ _ * q2");
        program.final_states.push(State::from("done"));

        assert_eq!(
            check_final_states(&program),
            Err(AnalysisError::UndeclaredFinalStates(vec!["done".to_string()]))
        );
    }

    #[test]
    fn test_undeclared_transition_states() {
        let program = sample("q0 0 1 r q1\nq1 _ _ * q2\nq1 0 0 r halt\nhalt 1 1 r q0");

        assert_eq!(
            check_transition_states(&program),
            Err(AnalysisError::UndeclaredStates(vec!["halt".to_string()]))
        );
    }

    #[test]
    fn test_undeclared_symbols() {
        let program = sample("q0 0 x r q1\nq1 y _ * q2\nq1 x x * q2");

        assert_eq!(
            check_transition_symbols(&program),
            Err(AnalysisError::UndeclaredSymbols(vec!['x', 'y']))
        );
    }

    #[test]
    fn test_alphabets() {
        let mut program = sample("");
        program.input_symbols.push('2');
        assert_eq!(
            check_alphabets(&program),
            Err(AnalysisError::InputSymbolsNotOnTape(vec!['2']))
        );

        let mut program = sample("");
        program.blank = 'B';
        assert!(matches!(
            check_alphabets(&program),
            Err(AnalysisError::InvalidBlank('B', _))
        ));

        let mut program = sample("");
        program.input_symbols.push('_');
        assert_eq!(
            check_alphabets(&program),
            Err(AnalysisError::InvalidBlank('_', "part of the input alphabet"))
        );
    }

    #[test]
    fn test_unreachable_states() {
        let program = sample("q0 0 1 r q0");

        assert_eq!(
            check_unreachable_states(&program),
            Err(AnalysisError::UnreachableStates(vec![
                "q1".to_string(),
                "q2".to_string()
            ]))
        );
    }

    #[test]
    fn test_inconsistent_tape_counts() {
        let mut program = sample("q0 0 1 r q1\nq1 _ _ * q2");
        program.transitions[1].directions.clear();

        assert!(matches!(
            check_structure(&program),
            Err(AnalysisError::StructuralError(_))
        ));
    }

    #[test]
    fn test_analyze_returns_first_finding() {
        let mut program = sample("q0 0 1 r q0");
        program.initial_state = State::from("start");

        let error = analyze(&program).unwrap_err();
        assert_eq!(
            error,
            TuringMachineError::ValidationError("Invalid start state: start".to_string())
        );
        assert_eq!(diagnose(&program).len(), 2);
    }
}
