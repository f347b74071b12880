//! # busmap runtime
//!
//! Executes test scripts against a simulated device:
//!
//! - [`BusTranslator`] turns symbolic field accesses into ordered byte-level
//!   bus transactions, independent of transport.
//! - [`VirtualDeviceMemory`] holds simulated register storage seeded from
//!   declared defaults, applies transactions via read-modify-write, and
//!   records an ordered trace.
//! - [`ScriptExecutionEngine`] tree-walks a parsed script, one session per
//!   device instance, producing per-function trace segments.
//!
//! Everything is single-threaded and synchronous; the core never blocks.
//! Callers wanting parallel sessions use independent device instances.

pub mod device;
pub mod engine;
pub mod error;
pub mod translate;

pub use device::{BusDriver, VirtualDeviceMemory};
pub use engine::{EngineConfig, FunctionRun, RunState, ScriptExecutionEngine};
pub use error::{Result, RuntimeError, SequenceError};
pub use translate::BusTranslator;
