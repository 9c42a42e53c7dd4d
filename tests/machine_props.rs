use bintur::{
    Direction, Halt, Machine, MachineConfig, MachineError, RuleSpec, Step, Symbol, TapeSpec,
};
use proptest::prelude::*;

const STATES: [char; 3] = ['0', '1', '2'];
const SYMBOLS: [&str; 3] = ["_", "0", "1"];

fn symbol_token() -> impl Strategy<Value = &'static str> {
    prop::sample::select(SYMBOLS.to_vec())
}

/// A complete table over states 0..=2 where every target is drawn from 0, 1, 2, or H.
fn complete_rules() -> impl Strategy<Value = Vec<RuleSpec>> {
    let body = (
        prop::sample::select(vec!['0', '1', '2', 'H']),
        symbol_token(),
        prop::sample::select(vec!["L", "R"]),
    );

    proptest::collection::vec(body, STATES.len() * SYMBOLS.len()).prop_map(|bodies| {
        STATES
            .iter()
            .flat_map(|&state| SYMBOLS.iter().map(move |&symbol| (state, symbol)))
            .zip(bodies)
            .map(|((state, symbol), (next, write, direction))| {
                RuleSpec::new(state, symbol, next, write, direction)
            })
            .collect()
    })
}

fn tape_spec(capacity: usize) -> impl Strategy<Value = TapeSpec> {
    (0..capacity).prop_flat_map(move |offset| {
        proptest::collection::vec(symbol_token(), 0..=(capacity - offset)).prop_map(
            move |symbols| TapeSpec {
                start_offset: offset,
                symbols: symbols.into_iter().map(str::to_string).collect(),
            },
        )
    })
}

fn machine_inputs() -> impl Strategy<Value = (Vec<RuleSpec>, TapeSpec, usize)> {
    (2usize..12).prop_flat_map(|capacity| (complete_rules(), tape_spec(capacity), Just(capacity)))
}

proptest! {
    #[test]
    fn fetch_after_load_matches_initial_pair(
        (rules, tape, capacity) in machine_inputs(),
    ) {
        let config = MachineConfig::default().with_tape_capacity(capacity);
        let mut machine = Machine::load(&rules, &tape, config).expect("complete table loads");

        let instruction = machine.fetch().expect("complete table always matches");
        prop_assert_eq!(instruction.key.state, '0');
        prop_assert_eq!(Some(instruction.key.symbol), machine.tape().get(tape.start_offset));
    }

    #[test]
    fn repeated_fetch_is_idempotent(
        (rules, tape, capacity) in machine_inputs(),
        steps in 0usize..16,
    ) {
        let config = MachineConfig::default().with_tape_capacity(capacity);
        let mut machine = Machine::load(&rules, &tape, config).expect("complete table loads");
        for _ in 0..steps {
            if machine.step() != Step::Continue {
                break;
            }
        }

        let first = machine.fetch();
        let (state, head, cells) = (machine.state(), machine.head(), machine.tape().clone());
        let second = machine.fetch();

        prop_assert_eq!(first, second);
        prop_assert_eq!(machine.state(), state);
        prop_assert_eq!(machine.head(), head);
        prop_assert_eq!(machine.tape(), &cells);
    }

    #[test]
    fn execute_then_fetch_tracks_live_pair(
        (rules, tape, capacity) in machine_inputs(),
        steps in 1usize..32,
    ) {
        let config = MachineConfig::default().with_tape_capacity(capacity);
        let mut machine = Machine::load(&rules, &tape, config).expect("complete table loads");
        machine.fetch().expect("complete table always matches");

        for _ in 0..steps {
            if machine.is_halted() {
                prop_assert_eq!(machine.execute(), Err(MachineError::AlreadyHalted));
                break;
            }

            let before = (machine.state(), machine.head(), machine.tape().clone());
            match machine.execute() {
                Ok(()) => {
                    let instruction = machine.fetch().expect("complete table always matches");
                    prop_assert_eq!(instruction.key.state, machine.state());
                    prop_assert_eq!(Some(instruction.key.symbol), machine.tape().get(machine.head()));
                }
                Err(MachineError::HeadOutOfBounds { position, direction, .. }) => {
                    prop_assert_eq!(position, before.1);
                    prop_assert!(
                        (direction == Direction::Left && position == 0)
                            || (direction == Direction::Right && position == capacity - 1)
                    );
                    prop_assert_eq!((machine.state(), machine.head(), machine.tape().clone()), before);
                    break;
                }
                Err(other) => prop_assert!(false, "unexpected error {:?}", other),
            }
        }
    }

    #[test]
    fn halted_machine_rejects_execute_without_mutation(
        (rules, tape, capacity) in machine_inputs(),
    ) {
        let config = MachineConfig::default()
            .with_tape_capacity(capacity)
            .with_max_steps(64);
        let mut machine = Machine::load(&rules, &tape, config).expect("complete table loads");

        if machine.run() == Step::Halt(Halt::Ok) {
            let snapshot = machine.snapshot();
            prop_assert!(machine.is_halted());
            prop_assert_eq!(machine.execute(), Err(MachineError::AlreadyHalted));
            prop_assert_eq!(machine.snapshot(), snapshot);
            prop_assert!(machine.is_halted());
        }
    }

    #[test]
    fn duplicate_keys_are_rejected(
        mut rules in complete_rules(),
        pick in 0usize..9,
    ) {
        let duplicate = rules[pick].clone();
        rules.push(duplicate);

        let result = Machine::load(&rules, &TapeSpec::default(), MachineConfig::default());
        prop_assert!(matches!(result, Err(MachineError::MalformedProgram(_))));
    }
}

#[test]
fn left_move_from_first_cell_is_reported() {
    let rules = [RuleSpec::new('0', "_", '0', "1", "L")];
    let mut machine = Machine::load(&rules, &TapeSpec::default(), MachineConfig::default()).unwrap();

    machine.fetch().unwrap();
    let before = machine.snapshot();
    assert!(matches!(
        machine.execute(),
        Err(MachineError::HeadOutOfBounds {
            position: 0,
            direction: Direction::Left,
            ..
        })
    ));
    assert_eq!(machine.snapshot(), before);
    assert_eq!(machine.tape().get(0), Some(Symbol::Blank));
}
