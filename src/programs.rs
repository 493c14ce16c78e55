//! Machine descriptions embedded in the crate.

use crate::types::{Program, TuringMachineError};
use tracing::warn;

// Default embedded programs
const PROGRAM_TEXTS: [(&str, &str); 2] = [
    ("palindrome", include_str!("../programs/palindrome.tm")),
    ("binary-increment", include_str!("../programs/binary-increment.tm")),
];

lazy_static::lazy_static! {
    /// Every embedded program that parses, by name, in declaration order.
    pub static ref PROGRAMS: Vec<(&'static str, Program)> = PROGRAM_TEXTS
        .iter()
        .filter_map(|&(name, text)| match crate::parser::parse(text) {
            Ok(program) => Some((name, program)),
            Err(e) => {
                warn!(name, error = %e, "failed to parse embedded program");
                None
            }
        })
        .collect();
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<Program, TuringMachineError> {
        PROGRAMS
            .get(index)
            .map(|(_, program)| program.clone())
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!("Program index {} out of range", index))
            })
    }

    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Result<Program, TuringMachineError> {
        PROGRAMS
            .iter()
            .find(|(program_name, _)| *program_name == name)
            .map(|(_, program)| program.clone())
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!("Program '{}' not found", name))
            })
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        PROGRAMS.iter().map(|(name, _)| name.to_string()).collect()
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, TuringMachineError> {
        let (name, program) = PROGRAMS.get(index).ok_or_else(|| {
            TuringMachineError::ValidationError(format!("Program index {} out of range", index))
        })?;

        Ok(ProgramInfo {
            index,
            name: name.to_string(),
            initial_state: program.initial_state.to_string(),
            tapes: program.tapes,
            state_count: program.states.len(),
            transition_count: program.transitions.len(),
        })
    }

    /// Get the original text of a program by its name
    pub fn get_program_text_by_name(name: &str) -> Result<&'static str, TuringMachineError> {
        PROGRAM_TEXTS
            .iter()
            .find(|(program_name, _)| *program_name == name)
            .map(|&(_, text)| text)
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!("Program '{}' not found", name))
            })
    }
}

#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub initial_state: String,
    pub tapes: usize,
    pub state_count: usize,
    pub transition_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;
    use crate::machine::TuringMachine;
    use crate::types::{State, Step};

    fn run(name: &str, input: &str) -> (String, State, usize) {
        let program = ProgramManager::get_program_by_name(name).unwrap();
        let mut machine = TuringMachine::new(&program, input).unwrap();

        assert_eq!(machine.run(Some(10_000), false), Step::Halt);
        (machine.output(), machine.state().clone(), machine.step_count())
    }

    #[test]
    fn test_all_programs_are_loaded() {
        assert_eq!(ProgramManager::get_program_count(), PROGRAM_TEXTS.len());
        assert_eq!(
            ProgramManager::list_program_names(),
            vec!["palindrome".to_string(), "binary-increment".to_string()]
        );
    }

    #[test]
    fn test_all_programs_are_valid() {
        for i in 0..ProgramManager::get_program_count() {
            let program = ProgramManager::get_program_by_index(i).unwrap();
            assert!(analyze(&program).is_ok(), "Program #{} is invalid", i);
        }
    }

    #[test]
    fn test_palindrome() {
        let program = ProgramManager::get_program_by_name("palindrome").unwrap();

        for (input, accepted) in [
            ("", true),
            ("1", true),
            ("1001", true),
            ("01010", true),
            ("10", false),
            ("1101", false),
        ] {
            let (output, state, _) = run("palindrome", input);
            assert_eq!(output, input);
            assert_eq!(program.is_final(&state), accepted, "input {input:?}");
        }

        assert_eq!(run("palindrome", "1001").2, 16);
    }

    #[test]
    fn test_binary_increment() {
        for (input, expected) in [("", "1"), ("0", "1"), ("1011", "1100"), ("111", "1000")] {
            let (output, state, _) = run("binary-increment", input);
            assert_eq!(output, expected);
            assert_eq!(state, State::from("done"));
        }

        assert_eq!(run("binary-increment", "1011").2, 9);
    }

    #[test]
    fn test_get_program_by_index() {
        assert!(ProgramManager::get_program_by_index(0).is_ok());
        assert!(ProgramManager::get_program_by_index(999).is_err());
    }

    #[test]
    fn test_get_program_by_name() {
        let program = ProgramManager::get_program_by_name("palindrome").unwrap();
        assert_eq!(program.tapes, 2);

        assert!(ProgramManager::get_program_by_name("Nonexistent").is_err());
    }

    #[test]
    fn test_get_program_info() {
        let info = ProgramManager::get_program_info(1).unwrap();

        assert_eq!(info.index, 1);
        assert_eq!(info.name, "binary-increment");
        assert_eq!(info.initial_state, "right");
        assert_eq!(info.tapes, 1);
        assert_eq!(info.state_count, 3);
        assert_eq!(info.transition_count, 5);

        assert!(ProgramManager::get_program_info(999).is_err());
    }

    #[test]
    fn test_get_program_text() {
        let text = ProgramManager::get_program_text_by_name("binary-increment").unwrap();
        assert!(text.contains("#N = 1"));
        assert!(ProgramManager::get_program_text_by_name("missing").is_err());
    }
}
