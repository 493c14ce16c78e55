//! Read-only snapshots of a machine configuration, used for execution traces.

use serde::Serialize;
use std::fmt::{self, Write};

/// The `tracing` target verbose steps are emitted on.
pub const TRACE_TARGET: &str = "mtm::trace";

const SEPARATOR: &str = "---------------------------------------------";

/// A machine configuration as seen right before a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub step: usize,
    pub state: String,
    pub tapes: Vec<TapeView>,
}

/// The materialized cells of one tape and the index of its head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TapeView {
    pub cells: Vec<(char, isize)>,
    pub head: isize,
}

impl fmt::Display for Snapshot {
    /// Renders the snapshot as aligned columns, one block of index, symbol and head rows per tape:
    ///
    /// ```text
    /// Step   : 1
    /// State  : q1
    /// Index0 : 0 1
    /// Tape0  : 1 _
    /// Head0  :   ^
    /// ---------------------------------------------
    /// ```
    ///
    /// Negative indices are shown by magnitude.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Step   : {}", self.step)?;
        writeln!(f, "State  : {}", self.state)?;

        for (i, tape) in self.tapes.iter().enumerate() {
            let mut index = String::new();
            let mut symbols = String::new();
            let mut head = String::new();

            for &(symbol, position) in &tape.cells {
                let label = position.unsigned_abs().to_string();
                let width = label.len();
                let marker = if position == tape.head { '^' } else { ' ' };

                write!(index, "{label} ")?;
                write!(symbols, "{symbol:<width$} ")?;
                write!(head, "{marker:<width$} ")?;
            }

            writeln!(f, "Index{i} : {}", index.trim_end())?;
            writeln!(f, "Tape{i}  : {}", symbols.trim_end())?;
            writeln!(f, "Head{i}  : {}", head.trim_end())?;
        }

        write!(f, "{SEPARATOR}")
    }
}
