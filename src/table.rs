//! The transition table: an immutable mapping from `(state, symbol)` to the rule body.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

use crate::types::{Instruction, InstructionBody, InstructionKey, MachineError, RuleSpec};

/// Maps each `InstructionKey` to its `InstructionBody`. Built once at load time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionTable {
    rules: HashMap<InstructionKey, InstructionBody>,
}

impl TransitionTable {
    /// Builds a table from rules in token form.
    ///
    /// # Returns
    ///
    /// * `Err(MachineError::MalformedProgram)` if a token is unrecognized, a key appears
    ///   twice, or a rule starts from `halt_state`.
    pub fn build(rules: &[RuleSpec], halt_state: char) -> Result<Self, MachineError> {
        let mut table = HashMap::with_capacity(rules.len());

        for rule in rules {
            let Instruction { key, body } = rule.to_instruction()?;

            if key.state == halt_state {
                return Err(MachineError::MalformedProgram(format!(
                    "halt state {} cannot be the left side of a rule",
                    halt_state
                )));
            }

            match table.entry(key) {
                Entry::Occupied(_) => {
                    return Err(MachineError::MalformedProgram(format!(
                        "duplicate rule for d({}, {})",
                        key.state, key.symbol
                    )))
                }
                Entry::Vacant(slot) => {
                    slot.insert(body);
                }
            }
        }

        Ok(Self { rules: table })
    }

    /// Looks up the rule for a key.
    pub fn get(&self, key: &InstructionKey) -> Option<Instruction> {
        self.rules
            .get(key)
            .map(|body| Instruction { key: *key, body: *body })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns `true` if at least one rule starts from `state`.
    pub fn has_state(&self, state: char) -> bool {
        self.rules.keys().any(|key| key.state == state)
    }

    /// States that appear on the left side of some rule, sorted.
    pub fn states(&self) -> BTreeSet<char> {
        self.rules.keys().map(|key| key.state).collect()
    }

    /// All rules sorted by state, then by symbol.
    pub fn listing(&self) -> Vec<Instruction> {
        let mut listing: Vec<Instruction> = self
            .rules
            .iter()
            .map(|(key, body)| Instruction { key: *key, body: *body })
            .collect();
        listing.sort_by_key(|instruction| instruction.key);
        listing
    }

    /// Renders the sorted listing, one rule per line, with a separator line whenever
    /// the left-hand state changes.
    pub fn render_listing(&self) -> String {
        let mut lines = Vec::new();
        let mut previous = None;

        for instruction in self.listing() {
            if previous.is_some_and(|state| state != instruction.key.state) {
                lines.push("-".repeat(20));
            }
            previous = Some(instruction.key.state);
            lines.push(instruction.to_string());
        }

        lines.join("\n")
    }
}
