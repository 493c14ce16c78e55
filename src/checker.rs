//! Input word validation against the declared input alphabet.

use crate::types::TuringMachineError;

/// Checks input words against an input alphabet.
pub struct Checker<'a> {
    input_symbols: &'a [char],
}

impl<'a> Checker<'a> {
    pub fn new(input_symbols: &'a [char]) -> Self {
        Self { input_symbols }
    }

    /// Returns `Err(TuringMachineError::InvalidInputSymbol)` for the first character of
    /// `input` that is not part of the alphabet. Indices count characters, not bytes.
    pub fn check(&self, input: &str) -> Result<(), TuringMachineError> {
        match input
            .chars()
            .enumerate()
            .find(|(_, symbol)| !self.input_symbols.contains(symbol))
        {
            Some((index, symbol)) => Err(TuringMachineError::InvalidInputSymbol { index, symbol }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_words_over_alphabet() {
        let checker = Checker::new(&['0', '1']);

        assert!(checker.check("").is_ok());
        assert!(checker.check("0110").is_ok());
    }

    #[test]
    fn test_reports_first_illegal_symbol() {
        let checker = Checker::new(&['0', '1']);

        assert_eq!(
            checker.check("01a1b"),
            Err(TuringMachineError::InvalidInputSymbol {
                index: 2,
                symbol: 'a'
            })
        );
    }

    #[test]
    fn test_blank_is_not_input() {
        let checker = Checker::new(&['a']);

        assert_eq!(
            checker.check("a_"),
            Err(TuringMachineError::InvalidInputSymbol {
                index: 1,
                symbol: '_'
            })
        );
    }
}
