//! Shared error types for the register-map model

use thiserror::Error;

/// Unknown symbol or address during model lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("unknown symbol `{path}`")]
    Symbol { path: String },

    #[error("no register declared at address {address:#06x}")]
    Address { address: u16 },
}

impl LookupError {
    pub fn symbol(path: impl Into<String>) -> Self {
        LookupError::Symbol { path: path.into() }
    }

    pub fn address(page: u8, offset: u8) -> Self {
        LookupError::Address {
            address: (page as u16) << 8 | offset as u16,
        }
    }
}

/// Value or bit range outside declared bounds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("value {value:#x} does not fit in the {width} bit(s) of `{path}`")]
    ValueTooWide { path: String, value: u64, width: u8 },

    #[error(
        "field `{path}` spans bits [{lsb}:{msb}] but its register is {register_bytes} byte(s) wide"
    )]
    FieldExceedsRegister {
        path: String,
        lsb: u16,
        msb: u16,
        register_bytes: u8,
    },
}

/// Structural violation detected while building a chip model.
///
/// The compiler wraps these into its `ParseError` with the source line
/// attached; parse-time failures never yield a partial model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("duplicate page name `{name}`")]
    DuplicatePage { name: String },

    #[error("register address {address:#06x} declared twice (`{first}` and `{second}`)")]
    DuplicateAddress {
        address: u16,
        first: String,
        second: String,
    },

    #[error("fields `{first}` and `{second}` of `{register}` overlap without an alias marker")]
    OverlappingFields {
        register: String,
        first: String,
        second: String,
    },

    #[error("register `{name}` has invalid width {width}")]
    InvalidWidth { name: String, width: usize },

    #[error("register `{name}` at offset {offset:#04x} with width {width} runs past the page end")]
    RegisterPastPageEnd { name: String, offset: u8, width: u8 },

    #[error("register `{name}` declares {given} default byte(s) for width {width}")]
    DefaultWidthMismatch {
        name: String,
        given: usize,
        width: u8,
    },

    #[error(transparent)]
    Range(#[from] RangeError),
}
