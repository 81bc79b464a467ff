//! Codec error types.

use std::error::Error;
use std::fmt;

/// Errors from encoding or decoding a compressed cost grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodecError {
    /// Interning one more distinct cost would exceed the 22-symbol
    /// alphabet. Encoding degrades by leaving the cell out; the skip is
    /// reported, not swallowed.
    SymbolTableFull {
        /// The cost value that could not be interned.
        cost: u8,
    },
    /// A decoded symbol has no entry in the decoding table.
    UnknownSymbol {
        /// The out-of-range symbol.
        symbol: u8,
    },
    /// A body unit unpacks to a cell index outside the region.
    CorruptUnit {
        /// The offending unit.
        unit: u16,
    },
    /// A frozen header announced more symbols than the data contains.
    TruncatedHeader {
        /// Symbols announced by the count unit.
        expected: usize,
        /// Units actually present after the count.
        actual: usize,
    },
    /// A frozen header announced more symbols than the alphabet allows.
    OversizedTable {
        /// The announced symbol count.
        len: usize,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SymbolTableFull { cost } => {
                write!(f, "symbol table full, cannot intern cost {cost}")
            }
            Self::UnknownSymbol { symbol } => write!(f, "symbol {symbol} not in table"),
            Self::CorruptUnit { unit } => write!(f, "unit {unit} unpacks outside the region"),
            Self::TruncatedHeader { expected, actual } => {
                write!(f, "frozen header truncated: {expected} symbols announced, {actual} present")
            }
            Self::OversizedTable { len } => {
                write!(f, "frozen header announces {len} symbols, alphabet holds 22")
            }
        }
    }
}

impl Error for CodecError {}
