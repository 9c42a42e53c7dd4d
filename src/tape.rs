//! A fixed-capacity tape of binary-alphabet symbols.

use std::fmt;

use crate::types::{MachineError, Symbol, TapeSpec, MAX_TAPE_CAPACITY};

/// A render-only view of a tape cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub symbol: Symbol,
    /// Whether the head is over this cell.
    pub active: bool,
}

/// The machine's storage. Its length never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<Symbol>,
}

impl Tape {
    fn blank(capacity: usize) -> Self {
        Self {
            cells: vec![Symbol::Blank; capacity],
        }
    }

    /// Creates a tape of `capacity` cells and writes the initial data into it.
    ///
    /// # Returns
    ///
    /// * `Err(MachineError::OutOfRange)` if `capacity` exceeds `MAX_TAPE_CAPACITY`, or if
    ///   the data, or the head position at `start_offset`, would fall outside the tape.
    /// * `Err(MachineError::MalformedProgram)` if a symbol token is unrecognized.
    pub fn load(capacity: usize, spec: &TapeSpec) -> Result<Self, MachineError> {
        let offset = spec.start_offset;
        let len = spec.symbols.len();

        let fits = offset
            .checked_add(len)
            .is_some_and(|end| end <= capacity);
        if !fits || offset >= capacity || capacity > MAX_TAPE_CAPACITY {
            return Err(MachineError::OutOfRange {
                offset,
                len,
                capacity,
            });
        }

        let mut tape = Self::blank(capacity);
        for (i, token) in spec.symbols.iter().enumerate() {
            tape.cells[offset + i] = token.parse()?;
        }

        Ok(tape)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<Symbol> {
        self.cells.get(position).copied()
    }

    /// Writes a symbol. Returns `false` if `position` is outside the tape.
    pub fn set(&mut self, position: usize, symbol: Symbol) -> bool {
        match self.cells.get_mut(position) {
            Some(cell) => {
                *cell = symbol;
                true
            }
            None => false,
        }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.cells
    }

    /// Cells annotated with the head highlight, for drawing.
    pub fn cells(&self, head: usize) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().enumerate().map(move |(i, &symbol)| Cell {
            symbol,
            active: i == head,
        })
    }
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.cells {
            write!(f, "{}", symbol)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_tape() {
        let tape = Tape::blank(4);
        assert_eq!(tape.len(), 4);
        assert_eq!(tape.to_string(), "____");
    }

    #[test]
    fn test_load_writes_at_offset() {
        let tape = Tape::load(6, &TapeSpec::new(2, &["1", "0", "1"])).unwrap();
        assert_eq!(tape.to_string(), "__101_");
        assert_eq!(tape.get(2), Some(Symbol::One));
        assert_eq!(tape.get(6), None);
    }

    #[test]
    fn test_load_exactly_fills_tape() {
        let tape = Tape::load(3, &TapeSpec::new(0, &["1", "1", "1"])).unwrap();
        assert_eq!(tape.to_string(), "111");
    }

    #[test]
    fn test_load_out_of_range() {
        let result = Tape::load(3, &TapeSpec::new(2, &["1", "1"]));
        assert_eq!(
            result,
            Err(MachineError::OutOfRange {
                offset: 2,
                len: 2,
                capacity: 3
            })
        );

        // The head must start on the tape even when there is no data.
        assert!(matches!(
            Tape::load(3, &TapeSpec::new(3, &[])),
            Err(MachineError::OutOfRange { .. })
        ));
        assert!(matches!(
            Tape::load(0, &TapeSpec::default()),
            Err(MachineError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_load_rejects_oversized_capacity() {
        assert_eq!(
            Tape::load(usize::MAX, &TapeSpec::default()),
            Err(MachineError::OutOfRange {
                offset: 0,
                len: 0,
                capacity: usize::MAX
            })
        );
        assert!(Tape::load(MAX_TAPE_CAPACITY + 1, &TapeSpec::default()).is_err());

        let tape = Tape::load(MAX_TAPE_CAPACITY, &TapeSpec::new(0, &["1"])).unwrap();
        assert_eq!(tape.len(), MAX_TAPE_CAPACITY);
    }

    #[test]
    fn test_load_rejects_bad_symbol() {
        assert!(matches!(
            Tape::load(3, &TapeSpec::new(0, &["a"])),
            Err(MachineError::MalformedProgram(_))
        ));
    }

    #[test]
    fn test_set_and_cells() {
        let mut tape = Tape::blank(3);
        assert!(tape.set(1, Symbol::Zero));
        assert!(!tape.set(3, Symbol::Zero));

        let cells: Vec<Cell> = tape.cells(1).collect();
        assert_eq!(cells.len(), 3);
        assert!(!cells[0].active);
        assert!(cells[1].active);
        assert_eq!(cells[1].symbol, Symbol::Zero);
    }
}
