//! This module provides the `ProgramLoader` struct, responsible for loading programs and
//! initial tapes from JSON files and strings.

use crate::types::{MachineError, Program, TapeSpec};
use std::fs;
use std::path::{Path, PathBuf};

/// `ProgramLoader` is a utility struct for loading programs and tapes.
/// It provides methods to load programs from individual files, from string content,
/// and to discover and load all `.json` files within a specified directory.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single program from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Program)` if the file is successfully read and decoded.
    /// * `Err(MachineError::FileError)` if the file cannot be read.
    /// * `Err(MachineError::ParseError)` if the content is not a valid program.
    pub fn load_program(path: &Path) -> Result<Program, MachineError> {
        Self::load_program_from_string(&read(path)?)
    }

    /// Loads a single program from the provided JSON content.
    pub fn load_program_from_string(content: &str) -> Result<Program, MachineError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Loads an initial tape assignment from the specified file path.
    pub fn load_tape(path: &Path) -> Result<TapeSpec, MachineError> {
        Self::load_tape_from_string(&read(path)?)
    }

    /// Loads an initial tape assignment from the provided JSON content.
    pub fn load_tape_from_string(content: &str) -> Result<TapeSpec, MachineError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Loads all program files (`.json` extension) from a given directory.
    ///
    /// Directories and non-`.json` files are skipped. Each element of the result is either
    /// the path and its program, or the error that prevented loading it.
    pub fn load_programs(directory: &Path) -> Vec<Result<(PathBuf, Program), MachineError>> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(MachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut results: Vec<_> = entries
            .filter_map(|entry| {
                let path = match entry {
                    Ok(entry) => entry.path(),
                    Err(e) => {
                        return Some(Err(MachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                if path.is_dir() || path.extension().is_none_or(|ext| ext != "json") {
                    return None;
                }

                Some(Self::load_program(&path).map(|program| (path, program)))
            })
            .collect();

        // Directory iteration order is platform dependent.
        results.sort_by(|a, b| match (a, b) {
            (Ok((a, _)), Ok((b, _))) => a.cmp(b),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => std::cmp::Ordering::Equal,
        });

        results
    }
}

fn read(path: &Path) -> Result<String, MachineError> {
    fs::read_to_string(path).map_err(|e| {
        MachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
    })
}
