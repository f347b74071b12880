//! End-to-end pipeline tests: description source → model → artifacts →
//! script execution → rendered command log.

use busmap_codegen::{render_command_log, ReportOptions};
use busmap_runtime::{RunState, ScriptExecutionEngine};

const CHIP: &str = "\
chip GSU1K1

page AG 0x06
reg control 0x00 default 0x00
    field i2c_audio_format bits[5:7] rw
    field power_down bits[0] rw

page PLL 0x08
reg div 0x10 width 2
    field ratio bits[4:11] rw
";

#[test]
fn audio_format_scenario_renders_byte_exact_log() {
    let chip = busmap_compiler::parse(CHIP).unwrap();
    let script = busmap_script::parse(
        "fn set_audio_format {\n  AG.control.i2c_audio_format.write(0x3)\n}\n",
    )
    .unwrap();

    let mut engine = ScriptExecutionEngine::new(&chip);
    let runs = engine.run(&script);
    assert!(runs.iter().all(|r| r.state == RunState::Committed));

    let segments = ScriptExecutionEngine::committed_segments(&runs);
    let log = render_command_log(&segments, &ReportOptions::default());

    // Register other bits 0: (0 & 0x1F) | (3 << 5) = 0x60.
    assert_eq!(
        log,
        ":01-01 set_audio_format:\n\
         ; calls:\n\
         ;   AG.control.i2c_audio_format.write(0x3)\n\
         B0 0600 60\n\
         End\n"
    );
}

#[test]
fn multi_function_script_renders_delimited_segments() {
    let chip = busmap_compiler::parse(CHIP).unwrap();
    let script = busmap_script::parse(
        "\
fn power_cycle {
    AG.control.power_down.write(1)
    AG.control.power_down.write(0)
}

fn set_ratio {
    PLL.div.ratio.write(0xA5)
}
",
    )
    .unwrap();

    let mut engine = ScriptExecutionEngine::new(&chip);
    let runs = engine.run(&script);
    let segments = ScriptExecutionEngine::committed_segments(&runs);
    let log = render_command_log(&segments, &ReportOptions::default());

    assert_eq!(
        log,
        ":01-01 power_cycle:\n\
         ; calls:\n\
         ;   AG.control.power_down.write(0x1)\n\
         ;   AG.control.power_down.write(0x0)\n\
         B0 0600 01\n\
         B0 0600 00\n\
         End\n\
         \n\
         :01-02 set_ratio:\n\
         ; calls:\n\
         ;   PLL.div.ratio.write(0xa5)\n\
         B0 0810 50\n\
         B0 0811 0A\n\
         End\n"
    );
}

#[test]
fn aborted_function_is_absent_from_the_log() {
    let chip = busmap_compiler::parse(CHIP).unwrap();
    let script = busmap_script::parse(
        "\
fn good {
    AG.control.power_down.write(1)
}

fn bad {
    AG.control.bogus_field.write(1)
}

fn also_good {
    AG.control.power_down.write(0)
}
",
    )
    .unwrap();

    let mut engine = ScriptExecutionEngine::new(&chip);
    let runs = engine.run(&script);
    assert_eq!(runs[1].state, RunState::Aborted);
    let error = runs[1].error.as_ref().unwrap().to_string();
    assert!(error.contains("AG.control.bogus_field"));

    let segments = ScriptExecutionEngine::committed_segments(&runs);
    let log = render_command_log(&segments, &ReportOptions::default());
    assert!(log.contains(":01-01 good:"));
    assert!(log.contains(":01-02 also_good:"));
    assert!(!log.contains("bad"));
}

#[test]
fn branching_script_traces_only_the_taken_path() {
    let chip = busmap_compiler::parse(CHIP).unwrap();
    let script = busmap_script::parse(
        "\
fn conditional {
    let fmt = AG.control.i2c_audio_format.read()
    if fmt == 0 {
        AG.control.i2c_audio_format.write(0x2)
    } else {
        AG.control.i2c_audio_format.write(0x7)
    }
}
",
    )
    .unwrap();

    let mut engine = ScriptExecutionEngine::new(&chip);
    let runs = engine.run(&script);
    let segment = runs[0].segment.as_ref().unwrap();

    // Default is 0, so the then-branch ran: a single 0x40 write.
    assert_eq!(segment.entries.len(), 1);
    assert_eq!(segment.entries[0].value, 0x40);
    assert_eq!(
        segment.calls,
        vec![
            "AG.control.i2c_audio_format.read()",
            "AG.control.i2c_audio_format.write(0x2)",
        ]
    );
}

#[test]
fn generated_artifacts_agree_with_the_executed_translation() {
    let chip = busmap_compiler::parse(CHIP).unwrap();
    let map = busmap_codegen::accessor_map(&chip, &busmap_codegen::GenOptions::default()).unwrap();

    let entry = &map["AG.control.i2c_audio_format"];
    assert_eq!(entry.address, 0x0600);
    assert_eq!(entry.spans.len(), 1);

    let script =
        busmap_script::parse("fn f {\n  AG.control.i2c_audio_format.write(0x7)\n}\n").unwrap();
    let mut engine = ScriptExecutionEngine::new(&chip);
    let runs = engine.run(&script);
    let entry_trace = runs[0].segment.as_ref().unwrap().entries[0];

    // The trace lands on the address and mask the accessor map advertises.
    assert_eq!(entry_trace.address(), entry.address);
    assert_eq!(entry_trace.value & !entry.spans[0].mask, 0);
}
