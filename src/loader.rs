//! This module provides the `ProgramLoader` struct, responsible for loading machine
//! descriptions from various sources, including files and strings.

use crate::parser::parse;
use crate::types::{Program, TuringMachineError, MAX_PROGRAM_SIZE};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File extension of machine descriptions.
pub const PROGRAM_EXTENSION: &str = "tm";

/// `ProgramLoader` is a utility struct for loading machine descriptions.
/// It provides methods to load programs from individual files, from string content,
/// and to discover and load all `.tm` files within a specified directory.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single program from the specified file path.
    ///
    /// # Arguments
    ///
    /// * `path` - A reference to the `Path` of the `.tm` file to load.
    ///
    /// # Returns
    ///
    /// * `Ok(Program)` if the file is successfully read and parsed into a `Program`.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read or is too large.
    /// * Any parsing error if the file content is not a valid description.
    pub fn load_program(path: &Path) -> Result<Program, TuringMachineError> {
        let content = Self::read_program(path)?;
        parse(&content)
    }

    /// Reads the raw text of a description, enforcing [`MAX_PROGRAM_SIZE`].
    pub fn read_program(path: &Path) -> Result<String, TuringMachineError> {
        debug!(path = %path.display(), "reading program");

        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        if content.len() > MAX_PROGRAM_SIZE {
            return Err(TuringMachineError::FileError(format!(
                "File {} is too large: {} bytes (maximum is {})",
                path.display(),
                content.len(),
                MAX_PROGRAM_SIZE
            )));
        }

        Ok(content)
    }

    /// Loads a single program from the provided string content.
    pub fn load_program_from_string(content: &str) -> Result<Program, TuringMachineError> {
        parse(content)
    }

    /// Loads all machine descriptions (`.tm` extension) from a given directory.
    ///
    /// Directories and files with other extensions are skipped. Every remaining file yields
    /// one entry, either its path and program or the error that occurred while loading it.
    pub fn load_programs(directory: &Path) -> Vec<Result<(PathBuf, Program), TuringMachineError>> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(TuringMachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();

                // Skip directories and non-.tm files
                if path.is_dir()
                    || path.extension().and_then(|ext| ext.to_str()) != Some(PROGRAM_EXTENSION)
                {
                    return None;
                }

                match Self::load_program(&path) {
                    Ok(program) => Some(Ok((path, program))),
                    Err(e) => Some(Err(TuringMachineError::FileError(format!(
                        "Failed to load program from {}: {}",
                        path.display(),
                        e
                    )))),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const PROGRAM: &str =
        "#Q={q0,q1}\n#S={0,1}\n#G={0,1,_}\n#q0=q0\n#B=_\n#F={q1}\n#N=1\nq0 0 1 r q1\n";

    fn write_file(path: &Path, content: &str) {
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_load_valid_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("flip.tm");
        write_file(&file_path, PROGRAM);

        let program = ProgramLoader::load_program(&file_path).unwrap();
        assert_eq!(program.tapes, 1);
        assert_eq!(program.transitions.len(), 1);
    }

    #[test]
    fn test_load_invalid_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("invalid.tm");
        write_file(&file_path, "This is not a valid program");

        let result = ProgramLoader::load_program(&file_path);
        assert!(matches!(result, Err(TuringMachineError::SyntaxError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = ProgramLoader::load_program(&dir.path().join("missing.tm"));

        assert!(matches!(result, Err(TuringMachineError::FileError(_))));
    }

    #[test]
    fn test_load_oversized_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("large.tm");
        let padding = format!("; {}\n", "x".repeat(MAX_PROGRAM_SIZE));
        write_file(&file_path, &format!("{padding}{PROGRAM}"));

        let error = ProgramLoader::load_program(&file_path).unwrap_err();
        assert!(matches!(error, TuringMachineError::FileError(_)));
        assert!(error.to_string().contains("too large"));
    }

    #[test]
    fn test_load_from_string() {
        assert!(ProgramLoader::load_program_from_string(PROGRAM).is_ok());
    }

    #[test]
    fn test_load_programs_from_directory() {
        let dir = tempdir().unwrap();

        write_file(&dir.path().join("valid.tm"), PROGRAM);
        write_file(&dir.path().join("invalid.tm"), "#N = 1");
        write_file(&dir.path().join("ignored.txt"), "This file should be ignored");
        fs::create_dir(dir.path().join("nested.tm")).unwrap();

        let results = ProgramLoader::load_programs(dir.path());

        // We should have 2 results: 1 success and 1 error
        assert_eq!(results.len(), 2);
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
    }

    #[test]
    fn test_load_programs_missing_directory() {
        let dir = tempdir().unwrap();
        let results = ProgramLoader::load_programs(&dir.path().join("missing"));

        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(TuringMachineError::FileError(_))));
    }
}
