//! Shared helpers for the integration tests under `tests/`. This system has no persisted,
//! native-executable artifact to shell out to, so these helpers call `glossa`'s in-process
//! `compile`/`run` API directly.

use glossa::error::{Diagnostic, RuntimeError};
use glossa::vm::{BufferedInput, NoInput};
use glossa::{bytecode::BytecodeProgram, pipeline};

/// Compiles and runs `source` under the `en` language table with no input available, asserting
/// both stages succeed, and returns the printed output lines.
pub fn run_en(source: &str) -> Vec<String> {
    run(source, "en")
}

/// Compiles and runs `source` under `lang_code`'s keyword table with no input available,
/// asserting both stages succeed, and returns the printed output lines.
pub fn run(source: &str, lang_code: &str) -> Vec<String> {
    let program = compile(source, lang_code);
    execute(&program, &mut NoInput).expect("program should run without a runtime error")
}

/// Like [`run`], but feeds `input_lines` to the `INPUT` instruction in order.
pub fn run_with_input(source: &str, lang_code: &str, input_lines: &[&str]) -> Vec<String> {
    let program = compile(source, lang_code);
    let mut io = BufferedInput::new(input_lines.iter().map(|l| l.to_string()));
    execute(&program, &mut io).expect("program should run without a runtime error")
}

/// Compiles `source` under `lang_code`, asserting that compilation succeeds.
pub fn compile(source: &str, lang_code: &str) -> BytecodeProgram {
    pipeline::compile(source, lang_code).expect("program should compile without a diagnostic")
}

/// Compiles `source` under `lang_code`, returning the [`Diagnostic`] the pipeline raised.
pub fn expect_compile_error(source: &str, lang_code: &str) -> Diagnostic {
    pipeline::compile(source, lang_code).expect_err("program should fail to compile")
}

/// Compiles and runs `source`, returning the [`RuntimeError`] the VM raised.
pub fn expect_runtime_error(source: &str, lang_code: &str) -> RuntimeError {
    let program = compile(source, lang_code);
    execute(&program, &mut NoInput).expect_err("program should fail at runtime")
}

fn execute(
    program: &BytecodeProgram,
    io: &mut dyn glossa::vm::InputProvider,
) -> Result<Vec<String>, RuntimeError> {
    pipeline::run(program, io).map(|result| result.output_lines)
}
