//! # busmap register-map model
//!
//! Core types shared by the compiler, code generator, and runtime:
//!
//! - Immutable chip model: chip → pages → registers → bitfields
//! - Pure bitfield codec (logical value ↔ per-byte mask/shift patches)
//! - Deterministic identifier sanitization
//! - Bus transaction and trace types
//!
//! Addressing is byte-oriented: a register address is 16 bits, with the page
//! address in the high byte and the byte offset within the page in the low
//! byte. Registers may be several bytes wide; fields may span byte
//! boundaries.

pub mod bitfield;
pub mod chip;
pub mod error;
pub mod ident;
pub mod trace;

pub use bitfield::{decode, encode, spans, ByteSpan, BytePatch};
pub use chip::{Access, Chip, ChipBuilder, Field, FieldRef, Page, Register};
pub use error::{LookupError, ModelError, RangeError};
pub use ident::Ident;
pub use trace::{BusTransaction, ByteRead, TraceEntry, TraceSegment};

/// Number of byte offsets addressable within one page.
pub const PAGE_SIZE: usize = 256;

/// Widest supported field, in bits.
pub const MAX_FIELD_BITS: u8 = 64;
