//! This crate provides the core logic for a binary-alphabet Turing Machine interpreter.
//! It includes modules for loading programs and tapes, building the transition table,
//! stepping the machine through its fetch/execute cycle, analyzing programs, and managing
//! a collection of predefined programs.

pub mod analyzer;
pub mod config;
pub mod loader;
pub mod machine;
pub mod programs;
pub mod table;
pub mod tape;
pub mod types;

/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports the `MachineConfig` struct from the config module.
pub use config::MachineConfig;
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the `Machine` struct and its companions from the machine module.
pub use machine::{Machine, Phase, Snapshot};
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports the `TransitionTable` struct from the table module.
pub use table::TransitionTable;
/// Re-exports the `Tape` and `Cell` structs from the tape module.
pub use tape::{Cell, Tape};
/// Re-exports the types used to define and run a machine from the types module.
pub use types::{
    Direction, Halt, HaltReason, Instruction, InstructionBody, InstructionKey, MachineError,
    Program, RuleSpec, Step, Symbol, TapeSpec,
};
