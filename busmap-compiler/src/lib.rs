//! # busmap register-description compiler
//!
//! Parses the line-oriented register-description language into an immutable
//! [`busmap_spec::Chip`] model:
//!
//! ```text
//! chip GSU1K1
//!
//! page AG 0x06
//! reg control 0x00 width 1 default 0x00
//!     field i2c_audio_format bits[5:7] rw default 0b011
//!     field power_down bits[0] rw
//! ```
//!
//! Parsing is all-or-nothing: any malformed line or structural violation
//! aborts with a [`ParseError`] and no partial model is returned.

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{ParseError, Result};
pub use parser::parse;
