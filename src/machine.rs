//! This module defines the `Machine` struct, which interprets a binary-alphabet Turing
//! Machine with an explicit fetch/execute cycle. The host fetches the instruction for the
//! current state and symbol, displays it, and then decides whether to execute it.

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::MachineConfig;
use crate::table::TransitionTable;
use crate::tape::{Cell, Tape};
use crate::types::{
    Direction, Halt, HaltReason, Instruction, InstructionKey, MachineError, Program, RuleSpec,
    Step, TapeSpec,
};

/// Where the interpreter is in its fetch/execute cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing fetched since load or since the last execute.
    Ready,
    /// An instruction is cached and may be executed.
    Fetched,
    /// Terminal until `reset`.
    Halted(HaltReason),
}

/// A single-tape binary Turing Machine.
///
/// The transition table is immutable after load. The tape, head, and control state only
/// change through `execute`, and only to apply the instruction cached by `fetch`.
#[derive(Debug, Clone)]
pub struct Machine {
    config: MachineConfig,
    table: TransitionTable,
    initial_tape: Tape,
    initial_head: usize,
    tape: Tape,
    head: usize,
    state: char,
    phase: Phase,
    current: Option<Instruction>,
    step_count: usize,
}

impl Machine {
    /// Builds a machine from rules and an initial tape assignment.
    ///
    /// The head starts at `tape.start_offset` and the control state at
    /// `config.initial_state`. Nothing is fetched yet.
    ///
    /// # Returns
    ///
    /// * `Err(MachineError::MalformedProgram)` for unrecognized tokens, duplicate keys,
    ///   rules leaving the halt state, or an initial state equal to the halt state.
    /// * `Err(MachineError::OutOfRange)` if the tape data does not fit.
    pub fn load(
        rules: &[RuleSpec],
        tape: &TapeSpec,
        config: MachineConfig,
    ) -> Result<Self, MachineError> {
        if config.initial_state == config.halt_state {
            return Err(MachineError::MalformedProgram(format!(
                "initial state {} is the halt state",
                config.initial_state
            )));
        }

        let table = TransitionTable::build(rules, config.halt_state)?;
        let initial_tape = Tape::load(config.tape_capacity, tape)?;

        debug!(
            rules = table.len(),
            capacity = config.tape_capacity,
            head = tape.start_offset,
            "machine loaded"
        );

        Ok(Self {
            config,
            table,
            tape: initial_tape.clone(),
            initial_tape,
            initial_head: tape.start_offset,
            head: tape.start_offset,
            state: config.initial_state,
            phase: Phase::Ready,
            current: None,
            step_count: 0,
        })
    }

    /// Builds a machine from a program using its own tape and configuration.
    pub fn from_program(program: &Program) -> Result<Self, MachineError> {
        Self::load(&program.rules, &program.tape, program.config)
    }

    /// Looks up the rule for the current state and the symbol under the head, and caches it.
    ///
    /// Calling this repeatedly without an intervening `execute` returns the same
    /// instruction and never touches the tape, head, or state.
    ///
    /// # Returns
    ///
    /// * `Ok(Instruction)` with the cached instruction. If it targets the halt state the
    ///   machine is now halted.
    /// * `Err(MachineError::NoMatchingRule)` if no rule exists. The machine is now halted.
    pub fn fetch(&mut self) -> Result<Instruction, MachineError> {
        let key = self.key();

        match self.table.get(&key) {
            Some(instruction) => {
                self.current = Some(instruction);
                self.phase = if instruction.body.next_state == self.config.halt_state {
                    debug!(%instruction, steps = self.step_count, "machine halted");
                    Phase::Halted(HaltReason::HaltState)
                } else {
                    Phase::Fetched
                };
                trace!(%instruction, "fetched");
                Ok(instruction)
            }
            None => {
                self.current = None;
                self.phase = Phase::Halted(HaltReason::NoMatchingRule(key));
                debug!(
                    state = %key.state,
                    symbol = %key.symbol,
                    steps = self.step_count,
                    "no matching rule"
                );
                Err(MachineError::NoMatchingRule {
                    state: key.state,
                    symbol: key.symbol,
                })
            }
        }
    }

    /// Applies the cached instruction: writes its symbol, switches state, and moves the head.
    ///
    /// On error nothing is mutated.
    ///
    /// # Returns
    ///
    /// * `Err(MachineError::AlreadyHalted)` if the machine has halted.
    /// * `Err(MachineError::NotFetched)` if `fetch` has not been called since the last execute.
    /// * `Err(MachineError::HeadOutOfBounds)` if the move would leave the tape.
    pub fn execute(&mut self) -> Result<(), MachineError> {
        let instruction = match (self.phase, self.current) {
            (Phase::Halted(_), _) => return Err(MachineError::AlreadyHalted),
            (Phase::Fetched, Some(instruction)) => instruction,
            _ => return Err(MachineError::NotFetched),
        };

        let body = instruction.body;
        let head = self.next_head(body.direction)?;

        let written = self.tape.set(self.head, body.write);
        debug_assert!(written, "head {} is off the tape", self.head);
        self.state = body.next_state;
        self.head = head;
        self.step_count += 1;
        self.phase = Phase::Ready;

        trace!(%instruction, head, step = self.step_count, "executed");
        Ok(())
    }

    /// Executes one instruction and fetches the next.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if another instruction is ready to execute.
    /// * `Step::Halt(Halt::Ok)` if the next instruction targets the halt state.
    /// * `Step::Halt(Halt::Err(_))` if no rule matches or the head would leave the tape.
    pub fn step(&mut self) -> Step {
        if self.phase == Phase::Ready {
            if let Err(error) = self.fetch() {
                return Step::Halt(Halt::Err(error));
            }
        }

        if let Phase::Halted(reason) = self.phase {
            return Step::Halt(reason.into());
        }

        if let Err(error) = self.execute() {
            return Step::Halt(Halt::Err(error));
        }

        match self.fetch() {
            Ok(_) if self.is_halted() => Step::Halt(Halt::Ok),
            Ok(_) => Step::Continue,
            Err(error) => Step::Halt(Halt::Err(error)),
        }
    }

    /// Steps until the machine stops or `max_steps` instructions have been executed.
    ///
    /// Returns `Step::Continue` if the step budget ran out first.
    pub fn run(&mut self) -> Step {
        for _ in 0..self.config.max_steps {
            match self.step() {
                Step::Continue => continue,
                halt => return halt,
            }
        }

        Step::Continue
    }

    /// Restores the loaded tape, head, and state, and clears any halt condition.
    pub fn reset(&mut self) {
        self.tape = self.initial_tape.clone();
        self.head = self.initial_head;
        self.state = self.config.initial_state;
        self.phase = Phase::Ready;
        self.current = None;
        self.step_count = 0;
    }

    /// Returns `true` once `fetch` has observed the halt state or a missing rule.
    pub fn is_halted(&self) -> bool {
        matches!(self.phase, Phase::Halted(_))
    }

    pub fn halt_reason(&self) -> Option<HaltReason> {
        match self.phase {
            Phase::Halted(reason) => Some(reason),
            _ => None,
        }
    }

    /// Renders the cached instruction as `d(state, symbol) = (state, symbol, direction)`.
    ///
    /// Returns `None` when nothing is cached.
    pub fn describe_current_instruction(&self) -> Option<String> {
        self.current.map(|instruction| instruction.to_string())
    }

    pub fn current_instruction(&self) -> Option<Instruction> {
        self.current
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the current control state.
    pub fn state(&self) -> char {
        self.state
    }

    /// Returns the current head position.
    pub fn head(&self) -> usize {
        self.head
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Tape cells with the head cell highlighted.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.tape.cells(self.head)
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Returns the total number of executed instructions since load or reset.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Captures the displayable state of the machine.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            head: self.head,
            tape: self.tape.to_string(),
            steps: self.step_count,
            halted: self.is_halted(),
            instruction: self.describe_current_instruction(),
        }
    }

    fn key(&self) -> InstructionKey {
        InstructionKey {
            state: self.state,
            symbol: self.tape.get(self.head).unwrap_or_default(),
        }
    }

    fn next_head(&self, direction: Direction) -> Result<usize, MachineError> {
        let next = match direction {
            Direction::Left => self.head.checked_sub(1),
            Direction::Right => self.head.checked_add(1).filter(|&h| h < self.tape.len()),
        };

        next.ok_or(MachineError::HeadOutOfBounds {
            position: self.head,
            direction,
            capacity: self.tape.len(),
        })
    }
}

/// The displayable state of a machine at one moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub state: char,
    pub head: usize,
    pub tape: String,
    pub steps: usize,
    pub halted: bool,
    pub instruction: Option<String>,
}
