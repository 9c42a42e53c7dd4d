//! Machine configuration: tape size, distinguished states, and the step budget of `run`.

use serde::{Deserialize, Serialize};

use crate::types::{
    DEFAULT_HALT_STATE, DEFAULT_INITIAL_STATE, DEFAULT_TAPE_CAPACITY, MAX_EXECUTION_STEPS,
};

/// Tunables of a single machine instance.
///
/// Every field has a default, so a program file may carry a partial `"config"` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Number of cells on the tape. Fixed for the lifetime of the machine.
    pub tape_capacity: usize,
    /// The control state the machine starts in.
    pub initial_state: char,
    /// The control state that signals termination. No rule may start from it.
    pub halt_state: char,
    /// How many instructions `run` executes before giving up.
    pub max_steps: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            tape_capacity: DEFAULT_TAPE_CAPACITY,
            initial_state: DEFAULT_INITIAL_STATE,
            halt_state: DEFAULT_HALT_STATE,
            max_steps: MAX_EXECUTION_STEPS,
        }
    }
}

impl MachineConfig {
    pub fn with_tape_capacity(mut self, tape_capacity: usize) -> Self {
        self.tape_capacity = tape_capacity;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}
