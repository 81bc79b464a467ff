//! The bounded cost-value alphabet.

use crate::error::CodecError;
use smallvec::SmallVec;

/// Alphabet size: the number of distinct non-zero cost values one table
/// can hold. Packed units reserve `log2(REGION_AREA * 22)` bits, so this
/// bound is part of the wire format, not a tuning knob.
pub const MAX_SYMBOLS: usize = 22;

/// Ordered registry of distinct non-zero cost values.
///
/// A cost's position in the table is its encoding symbol, so the table
/// is append-only: removing or reordering entries would re-map symbols
/// in every grid encoded against it. The owner (the cost cache) resets
/// the table only when nothing encoded against it remains.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolTable {
    values: SmallVec<[u8; MAX_SYMBOLS]>,
}

impl SymbolTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a table from a frozen snapshot.
    pub fn from_snapshot(values: &[u8]) -> Result<Self, CodecError> {
        if values.len() > MAX_SYMBOLS {
            return Err(CodecError::OversizedTable { len: values.len() });
        }
        Ok(Self {
            values: SmallVec::from_slice(values),
        })
    }

    /// The symbol for `cost`, interning it if new.
    ///
    /// Fails with [`CodecError::SymbolTableFull`] when interning would
    /// exceed [`MAX_SYMBOLS`]; the table is left unchanged.
    pub fn intern(&mut self, cost: u8) -> Result<u8, CodecError> {
        if let Some(sym) = self.symbol_of(cost) {
            return Ok(sym);
        }
        if self.values.len() >= MAX_SYMBOLS {
            return Err(CodecError::SymbolTableFull { cost });
        }
        self.values.push(cost);
        Ok((self.values.len() - 1) as u8)
    }

    /// The symbol already assigned to `cost`, if any.
    pub fn symbol_of(&self, cost: u8) -> Option<u8> {
        self.values.iter().position(|&v| v == cost).map(|i| i as u8)
    }

    /// The cost value behind `symbol`, if assigned.
    pub fn cost_of(&self, symbol: u8) -> Option<u8> {
        self.values.get(symbol as usize).copied()
    }

    /// Snapshot of the current values, in symbol order.
    pub fn snapshot(&self) -> &[u8] {
        &self.values
    }

    /// Number of assigned symbols.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no symbols are assigned.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Forget every assignment.
    ///
    /// Only safe when no non-frozen encoding produced against this
    /// table will be decoded again.
    pub fn reset(&mut self) {
        self.values.clear();
    }
}
