//! Command-log rendering
//!
//! Turns committed trace segments into the textual bus-command log consumed
//! by downstream tooling: one line per applied transaction, a header and
//! `End` marker delimiting each function, and non-executable comment lines
//! echoing the symbolic calls that produced the block.

use busmap_spec::TraceSegment;
use std::fmt::Write as _;

#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Device prefix column, typically the bus address of the target.
    pub device_prefix: String,
    /// Major index of the `:MM-NN name:` block headers.
    pub major_index: u8,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            device_prefix: "B0".to_string(),
            major_index: 1,
        }
    }
}

/// Render segments into the command log.
///
/// ```text
/// :01-01 init_audio:
/// ; calls:
/// ;   AG.control.i2c_audio_format.write(0x3)
/// B0 0600 60
/// End
/// ```
///
/// Transactions appear exactly as applied: one line each, author order,
/// never coalesced.
pub fn render_command_log(segments: &[TraceSegment], opts: &ReportOptions) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            let _ = writeln!(out);
        }
        let _ = writeln!(
            out,
            ":{:02}-{:02} {}:",
            opts.major_index, segment.index, segment.name
        );
        if !segment.calls.is_empty() {
            let _ = writeln!(out, "; calls:");
            for call in &segment.calls {
                let _ = writeln!(out, ";   {call}");
            }
        }
        for entry in &segment.entries {
            let _ = writeln!(
                out,
                "{} {:04X} {:02X}",
                opts.device_prefix,
                entry.address(),
                entry.value
            );
        }
        let _ = writeln!(out, "End");
    }
    out
}
