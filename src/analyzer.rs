//! This module provides static checks of a transition table before execution: that the
//! initial state has rules, that every target state is defined, that every defined state is
//! reachable, and that the halt state can be reached at all.

use std::collections::{BTreeSet, VecDeque};
use thiserror::Error;

use crate::config::MachineConfig;
use crate::table::TransitionTable;

/// Represents the problems that can be found by analyzing a transition table.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum AnalysisError {
    /// No rule starts from the initial state.
    #[error("Invalid start state: no rule leaves state {0}")]
    InvalidStartState(char),
    /// Rules target states that have no rules of their own and are not the halt state.
    #[error("Transitions reference undefined states: {0:?}")]
    UndefinedNextStates(Vec<char>),
    /// States with rules that cannot be reached from the initial state.
    #[error("Unreachable states detected: {0:?}")]
    UnreachableStates(Vec<char>),
    /// No rule targets the halt state.
    #[error("No rule targets the halt state {0}")]
    HaltUnreachable(char),
}

/// Analyzes a table under the given configuration.
///
/// # Returns
///
/// * `Ok(())` if no problems are found.
/// * `Err(AnalysisError)` with the first problem found.
pub fn analyze(table: &TransitionTable, config: &MachineConfig) -> Result<(), AnalysisError> {
    [
        check_valid_start_state,
        check_undefined_next_states,
        check_unreachable_states,
        check_halt_reachable,
    ]
    .iter()
    .try_for_each(|check| check(table, config))
}

fn check_valid_start_state(
    table: &TransitionTable,
    config: &MachineConfig,
) -> Result<(), AnalysisError> {
    if !table.has_state(config.initial_state) {
        return Err(AnalysisError::InvalidStartState(config.initial_state));
    }

    Ok(())
}

fn check_undefined_next_states(
    table: &TransitionTable,
    config: &MachineConfig,
) -> Result<(), AnalysisError> {
    let defined = table.states();

    let undefined: BTreeSet<char> = table
        .listing()
        .iter()
        .map(|instruction| instruction.body.next_state)
        .filter(|state| *state != config.halt_state && !defined.contains(state))
        .collect();

    if !undefined.is_empty() {
        return Err(AnalysisError::UndefinedNextStates(
            undefined.into_iter().collect(),
        ));
    }

    Ok(())
}

fn check_unreachable_states(
    table: &TransitionTable,
    config: &MachineConfig,
) -> Result<(), AnalysisError> {
    let listing = table.listing();

    let mut reachable = BTreeSet::from([config.initial_state]);
    let mut queue = VecDeque::from([config.initial_state]);

    while let Some(state) = queue.pop_front() {
        for instruction in listing.iter().filter(|i| i.key.state == state) {
            if reachable.insert(instruction.body.next_state) {
                queue.push_back(instruction.body.next_state);
            }
        }
    }

    let unreachable: Vec<char> = table.states().difference(&reachable).copied().collect();

    if !unreachable.is_empty() {
        return Err(AnalysisError::UnreachableStates(unreachable));
    }

    Ok(())
}

fn check_halt_reachable(
    table: &TransitionTable,
    config: &MachineConfig,
) -> Result<(), AnalysisError> {
    let halts = table
        .listing()
        .iter()
        .any(|instruction| instruction.body.next_state == config.halt_state);

    if !halts {
        return Err(AnalysisError::HaltUnreachable(config.halt_state));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RuleSpec;

    fn table(rules: &[RuleSpec]) -> TransitionTable {
        TransitionTable::build(rules, 'H').unwrap()
    }

    #[test]
    fn test_valid_table() {
        let table = table(&[
            RuleSpec::new('0', "1", '0', "1", "R"),
            RuleSpec::new('0', "_", '1', "1", "L"),
            RuleSpec::new('1', "1", 'H', "1", "R"),
        ]);
        assert_eq!(analyze(&table, &MachineConfig::default()), Ok(()));
    }

    #[test]
    fn test_invalid_start_state() {
        let table = table(&[RuleSpec::new('1', "1", 'H', "1", "R")]);
        assert_eq!(
            analyze(&table, &MachineConfig::default()),
            Err(AnalysisError::InvalidStartState('0'))
        );
    }

    #[test]
    fn test_undefined_next_states() {
        let table = table(&[
            RuleSpec::new('0', "1", '3', "1", "R"),
            RuleSpec::new('0', "0", '2', "1", "R"),
            RuleSpec::new('0', "_", 'H', "1", "R"),
        ]);
        assert_eq!(
            analyze(&table, &MachineConfig::default()),
            Err(AnalysisError::UndefinedNextStates(vec!['2', '3']))
        );
    }

    #[test]
    fn test_unreachable_states() {
        let table = table(&[
            RuleSpec::new('0', "1", 'H', "1", "R"),
            RuleSpec::new('5', "1", '0', "1", "R"),
        ]);
        assert_eq!(
            analyze(&table, &MachineConfig::default()),
            Err(AnalysisError::UnreachableStates(vec!['5']))
        );
    }

    #[test]
    fn test_halt_unreachable() {
        let table = table(&[RuleSpec::new('0', "_", '0', "1", "R")]);
        let error = analyze(&table, &MachineConfig::default()).unwrap_err();
        assert_eq!(error, AnalysisError::HaltUnreachable('H'));
        assert!(error.to_string().contains("halt state H"));
    }
}
