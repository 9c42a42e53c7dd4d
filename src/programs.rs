use crate::loader::ProgramLoader;
use crate::types::{MachineError, Program};

// Default embedded programs
const PROGRAM_TEXTS: [&str; 5] = [
    include_str!("../programs/unary-increment.json"),
    include_str!("../programs/binary-increment.json"),
    include_str!("../programs/binary-invert.json"),
    include_str!("../programs/busy-beaver-2.json"),
    include_str!("../programs/binary-addition.json"),
];

lazy_static::lazy_static! {
    /// Embedded programs that decode successfully, paired with their source index.
    pub static ref PROGRAMS: Vec<(usize, Program)> = PROGRAM_TEXTS
        .iter()
        .enumerate()
        .filter_map(|(index, text)| match ProgramLoader::load_program_from_string(text) {
            Ok(program) => Some((index, program)),
            Err(error) => {
                tracing::warn!(index, %error, "failed to load embedded program");
                None
            }
        })
        .collect();
}

/// Read-only access to the embedded program catalog.
pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<Program, MachineError> {
        PROGRAMS
            .get(index)
            .map(|(_, program)| program.clone())
            .ok_or_else(|| {
                MachineError::UnknownProgram(format!("index {} out of range", index))
            })
    }

    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Result<Program, MachineError> {
        PROGRAMS
            .iter()
            .find(|(_, program)| program.name == name)
            .map(|(_, program)| program.clone())
            .ok_or_else(|| MachineError::UnknownProgram(name.to_string()))
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        PROGRAMS
            .iter()
            .map(|(_, program)| program.name.clone())
            .collect()
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, MachineError> {
        let program = Self::get_program_by_index(index)?;

        let mut states: Vec<&str> = program
            .rules
            .iter()
            .map(|rule| rule.from_state.as_str())
            .collect();
        states.sort_unstable();
        states.dedup();

        Ok(ProgramInfo {
            index,
            name: program.name.clone(),
            initial_tape: program.tape.symbols.concat(),
            state_count: states.len(),
            rule_count: program.rules.len(),
        })
    }

    /// Search for programs by name, case-insensitively
    pub fn search_programs(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();

        PROGRAMS
            .iter()
            .enumerate()
            .filter(|(_, (_, program))| program.name.to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect()
    }

    /// Get the original text of a program by its index
    pub fn get_program_text_by_index(index: usize) -> Result<&'static str, MachineError> {
        PROGRAMS
            .get(index)
            .map(|(source, _)| PROGRAM_TEXTS[*source])
            .ok_or_else(|| {
                MachineError::UnknownProgram(format!("text index {} out of range", index))
            })
    }
}

#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub initial_tape: String,
    pub state_count: usize,
    pub rule_count: usize,
}
