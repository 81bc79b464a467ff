//! Bounded-alphabet compression for wend cost grids.
//!
//! A cost grid is sparse in practice: most cells sit at the implicit
//! baseline (0), so a grid is stored as one packed unit per non-zero
//! cell. Distinct cost values are interned into a bounded
//! [`SymbolTable`]; a cell's unit combines its flat index with its
//! cost's symbol, keeping the encoded size proportional to the number
//! of modified cells rather than the region area.
//!
//! The table is an owned, injectable codec context with an explicit
//! lifecycle — the cache layer decides when it resets — never a
//! process-wide singleton.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod error;
mod packed;
mod symbol;

pub use error::CodecError;
pub use packed::{decode, encode, CompressedGrid, Encoded, SNAPSHOT_MARK};
pub use symbol::{SymbolTable, MAX_SYMBOLS};
