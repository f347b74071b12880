//! # busmap test-script language
//!
//! A constrained procedural language for device bring-up scripts: top-level
//! functions containing assignments, symbolic field reads/writes, branches,
//! and counted loops. Scripts are parsed into an explicit IR
//! ([`ast::Script`]) which the runtime tree-walks against a virtual device;
//! nothing is ever spliced as text, so every execution fault carries a
//! source line.
//!
//! ```text
//! fn init_audio {
//!     AG.control.i2c_audio_format.write(0x3)
//!     let mode = AG.control.power_down.read()
//!     if mode == 1 {
//!         AG.control.power_down.write(0)
//!     }
//!     repeat 3 {
//!         PLL.div.ratio.write(0x20)
//!     }
//! }
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{BinOp, Expr, FieldPath, Function, Script, Stmt};
pub use error::{Result, ScriptError};
pub use parser::parse;
