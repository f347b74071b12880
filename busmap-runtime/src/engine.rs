//! Script execution engine
//!
//! Tree-walks a parsed script against one virtual device session. Each
//! top-level function runs as a state machine `Idle → Executing →
//! {Committed | Aborted}`: a committed function contributes a delimited
//! trace segment; an aborted one discards its partial trace entirely while
//! leaving device memory at the last applied transaction.

use crate::device::VirtualDeviceMemory;
use crate::error::{Result, RuntimeError, SequenceError};
use crate::translate::BusTranslator;
use busmap_script::{Expr, FieldPath, Function, Script, Stmt};
use busmap_spec::{bitfield, Chip, TraceSegment};
use std::collections::HashMap;

/// Engine limits.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on executed statements and loop iterations per function,
    /// so a malformed `repeat` cannot hang the session.
    pub max_steps: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_steps: 1_000_000,
        }
    }
}

/// Lifecycle of one function execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Executing,
    Committed,
    Aborted,
}

/// Outcome of one top-level function.
#[derive(Debug)]
pub struct FunctionRun {
    pub name: String,
    pub state: RunState,
    /// The fault that aborted the function, if any.
    pub error: Option<RuntimeError>,
    /// Trace segment; present exactly when the function committed.
    pub segment: Option<TraceSegment>,
}

/// Executes one script per session against exactly one device instance.
///
/// Single-threaded by design: no internal locking, and none should be added.
/// Parallel scripts need independent engines over independent devices.
pub struct ScriptExecutionEngine<'a> {
    translator: BusTranslator<'a>,
    device: VirtualDeviceMemory,
    config: EngineConfig,
    committed: usize,
    state: RunState,
}

impl<'a> ScriptExecutionEngine<'a> {
    /// Fresh session: device memory seeded from the chip's declared defaults.
    pub fn new(chip: &'a Chip) -> Self {
        Self::with_config(chip, EngineConfig::default())
    }

    pub fn with_config(chip: &'a Chip, config: EngineConfig) -> Self {
        ScriptExecutionEngine {
            translator: BusTranslator::new(chip),
            device: VirtualDeviceMemory::new(chip),
            config,
            committed: 0,
            state: RunState::Idle,
        }
    }

    pub fn device(&self) -> &VirtualDeviceMemory {
        &self.device
    }

    /// State of the most recent function, `Executing` while one runs.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// End the session, releasing the device with its accumulated trace.
    pub fn into_device(self) -> VirtualDeviceMemory {
        self.device
    }

    /// Run every function of the script in author order. A fault aborts only
    /// the faulting function; the remaining functions still run.
    pub fn run(&mut self, script: &Script) -> Vec<FunctionRun> {
        script
            .functions
            .iter()
            .map(|function| self.run_function(function))
            .collect()
    }

    /// Committed segments of `runs`, in commit order.
    pub fn committed_segments(runs: &[FunctionRun]) -> Vec<TraceSegment> {
        runs.iter()
            .filter_map(|run| run.segment.clone())
            .collect()
    }

    fn run_function(&mut self, function: &Function) -> FunctionRun {
        tracing::debug!(function = %function.name, "executing");
        self.state = RunState::Executing;
        let mark = self.device.trace_len();
        let mut frame = Frame::new();

        match self.exec_block(&function.body, &mut frame, &function.name) {
            Ok(()) => {
                self.state = RunState::Committed;
                self.committed += 1;
                let entries = self.device.trace()[mark..].to_vec();
                tracing::debug!(
                    function = %function.name,
                    transactions = entries.len(),
                    "committed"
                );
                FunctionRun {
                    name: function.name.clone(),
                    state: RunState::Committed,
                    error: None,
                    segment: Some(TraceSegment {
                        index: self.committed,
                        name: function.name.clone(),
                        calls: frame.calls,
                        entries,
                    }),
                }
            }
            Err(error) => {
                // All-or-nothing per function: drop the partial trace. The
                // byte store keeps every applied transaction, matching real
                // non-atomic hardware.
                self.state = RunState::Aborted;
                self.device.truncate_trace(mark);
                tracing::warn!(
                    function = %function.name,
                    %error,
                    "aborted, partial trace discarded"
                );
                FunctionRun {
                    name: function.name.clone(),
                    state: RunState::Aborted,
                    error: Some(error),
                    segment: None,
                }
            }
        }
    }

    fn exec_block(&mut self, stmts: &[Stmt], frame: &mut Frame, function: &str) -> Result<()> {
        for stmt in stmts {
            frame.bump(function, self.config.max_steps)?;
            match stmt {
                Stmt::Let { name, value, line } => {
                    let value = self.eval(value, frame).map_err(|e| e.at(*line))?;
                    frame.vars.insert(name.clone(), value);
                }
                Stmt::Write { path, value, line } => {
                    let value = self.eval(value, frame).map_err(|e| e.at(*line))?;
                    self.write_field(path, value, frame).map_err(|e| e.at(*line))?;
                }
                Stmt::Read { path, line } => {
                    self.read_field(path, frame).map(|_| ()).map_err(|e| e.at(*line))?;
                }
                Stmt::If {
                    cond,
                    then_body,
                    else_body,
                    line,
                } => {
                    let taken = self.eval(cond, frame).map_err(|e| e.at(*line))? != 0;
                    let body = if taken { then_body } else { else_body };
                    self.exec_block(body, frame, function)?;
                }
                Stmt::Repeat { count, body, line } => {
                    let count = self.eval(count, frame).map_err(|e| e.at(*line))?;
                    for _ in 0..count {
                        frame.bump(function, self.config.max_steps)?;
                        self.exec_block(body, frame, function)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn eval(&mut self, expr: &Expr, frame: &mut Frame) -> Result<u64> {
        match expr {
            Expr::Number(value) => Ok(*value),
            Expr::Var { name, line } => frame.vars.get(name).copied().ok_or_else(|| {
                RuntimeError::from(SequenceError::UnknownVariable { name: name.clone() })
                    .at(*line)
            }),
            Expr::Read(path) => self.read_field(path, frame).map_err(|e| e.at(path.line)),
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.eval(lhs, frame)?;
                let rhs = self.eval(rhs, frame)?;
                Ok(op.apply(lhs, rhs))
            }
        }
    }

    /// Symbolic field write: one applied transaction per covered byte, in
    /// declared byte order, never coalesced.
    fn write_field(&mut self, path: &FieldPath, value: u64, frame: &mut Frame) -> Result<()> {
        let fr = self
            .translator
            .resolve(&path.page, &path.register, &path.field)?;
        if !fr.field.access.writable() {
            return Err(SequenceError::NotWritable {
                path: path.dotted(),
                access: fr.field.access.qualifier(),
            }
            .into());
        }
        let transactions =
            self.translator
                .translate_write(&path.page, &path.register, &path.field, value)?;
        frame.calls.push(format!("{}.write({value:#x})", path.dotted()));
        for txn in &transactions {
            self.device.apply(txn)?;
        }
        Ok(())
    }

    /// Symbolic field read, reflecting every write applied earlier in the
    /// session.
    fn read_field(&mut self, path: &FieldPath, frame: &mut Frame) -> Result<u64> {
        let fr = self
            .translator
            .resolve(&path.page, &path.register, &path.field)?;
        if !fr.field.access.readable() {
            return Err(SequenceError::NotReadable {
                path: path.dotted(),
                access: fr.field.access.qualifier(),
            }
            .into());
        }
        let reads = self
            .translator
            .translate_read(&path.page, &path.register, &path.field)?;
        let mut bytes = vec![0u8; fr.register.width as usize];
        for read in &reads {
            bytes[(read.offset - fr.register.offset) as usize] =
                self.device.read(read.page, read.offset)?;
        }
        frame.calls.push(format!("{}.read()", path.dotted()));
        Ok(bitfield::decode(fr.field, &bytes))
    }
}

/// Per-function execution state: local variables, issued-call echo, and the
/// step counter.
struct Frame {
    vars: HashMap<String, u64>,
    calls: Vec<String>,
    steps: u64,
}

impl Frame {
    fn new() -> Self {
        Frame {
            vars: HashMap::new(),
            calls: Vec::new(),
            steps: 0,
        }
    }

    fn bump(&mut self, function: &str, limit: u64) -> Result<()> {
        self.steps += 1;
        if self.steps > limit {
            return Err(SequenceError::StepLimit {
                function: function.to_string(),
                limit,
            }
            .into());
        }
        Ok(())
    }
}
