//! Host-facing entry points: `compile` runs the lexer, parser, and bytecode compiler in
//! sequence; `run` hands a compiled program to a fresh [`Vm`]. Everything else in this crate is
//! reachable through these two functions plus [`list_languages`] and [`example_for`].

use log::info;

use crate::bytecode::BytecodeProgram;
use crate::error::{Diagnostic, DiagnosticKind, Position, RuntimeError};
use crate::lang_table::{self, LanguageEntry, NotFound};
use crate::lexer::{strip_newlines, Lexer};
use crate::parser::Parser;
use crate::vm::{ExecutionResult, InputProvider, Vm};
use crate::{compiler::Compiler, demos};

/// Lex, parse, and compile `source` under the keyword table for `lang_code`.
///
/// Each stage surfaces the first error it hits and stops; there is no fallback to a previous
/// stage, and no stage retries a previous one.
pub fn compile(source: &str, lang_code: &str) -> Result<BytecodeProgram, Diagnostic> {
    let lang = lookup_language(lang_code)?;
    info!("compiling {} byte(s) of source for language '{lang_code}'", source.len());

    let tokens = strip_newlines(Lexer::new(source, lang).lex());
    let program = Parser::new(tokens).parse_program()?;
    Compiler::new(lang).compile(&program)
}

/// Execute a compiled program to completion on a fresh VM state: the stack, variable table, and
/// output buffer are reset on each execution.
pub fn run(
    program: &BytecodeProgram,
    io: &mut dyn InputProvider,
) -> Result<ExecutionResult, RuntimeError> {
    Vm::new(program).run(io)
}

/// Same as [`run`], but terminates with `ExecutionLimitExceeded` once `budget` instructions have
/// executed. Hosts use this to bound suspected infinite loops.
pub fn run_with_budget(
    program: &BytecodeProgram,
    io: &mut dyn InputProvider,
    budget: usize,
) -> Result<ExecutionResult, RuntimeError> {
    Vm::new(program).with_instruction_budget(budget).run(io)
}

/// All registered language entries, in catalog order.
pub fn list_languages() -> &'static [LanguageEntry] {
    lang_table::list_all()
}

/// A canonical demo program for `lang_code`, or `None` if the code isn't registered.
pub fn example_for(lang_code: &str) -> Option<&'static str> {
    demos::example_for(lang_code)
}

fn lookup_language(lang_code: &str) -> Result<&'static LanguageEntry, Diagnostic> {
    lang_table::lookup(lang_code).map_err(|NotFound| {
        Diagnostic::new(
            DiagnosticKind::SyntaxError,
            format!("unknown language code '{lang_code}'"),
            Position::default(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::NoInput;

    fn run_source(source: &str, lang_code: &str) -> Vec<String> {
        let program = compile(source, lang_code).unwrap();
        run(&program, &mut NoInput).unwrap().output_lines
    }

    #[test]
    fn addition_scenario() {
        assert_eq!(
            run_source("var x = 10; var y = 20; print(x + y);", "en"),
            vec!["30"]
        );
    }

    #[test]
    fn string_biased_addition_scenario() {
        assert_eq!(
            run_source(r#"var s = "hi"; print(s + " " + 3);"#, "en"),
            vec!["hi 3"]
        );
    }

    #[test]
    fn factorial_via_while_loop_scenario() {
        let source = "var n = 5; var f = 1; while (n > 1) { f = f * n; n = n - 1; } print(f);";
        assert_eq!(run_source(source, "en"), vec!["120"]);
    }

    #[test]
    fn factorial_via_recursion_scenario() {
        let source = "function fact(n) { if (n <= 1) { return 1; } else { return n * fact(n - 1); } } print(fact(5));";
        assert_eq!(run_source(source, "en"), vec!["120"]);
    }

    #[test]
    fn if_else_scenario() {
        let source = r#"if (1 < 2) { print("a"); } else { print("b"); } print("c");"#;
        assert_eq!(run_source(source, "en"), vec!["a", "c"]);
    }

    #[test]
    fn redeclaring_var_aliases_the_same_slot() {
        assert_eq!(run_source("var x = 1; var x = x + 1; print(x);", "en"), vec!["2"]);
    }

    #[test]
    fn division_by_zero_scenario() {
        let program = compile("print(1/0);", "en").unwrap();
        let err = run(&program, &mut NoInput).unwrap_err();
        assert_eq!(err.kind, crate::error::RuntimeErrorKind::DivisionByZero);
    }

    #[test]
    fn undefined_name_scenario() {
        let err = compile("print(y);", "en").unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::UndefinedName);
    }

    #[test]
    fn invalid_assignment_target_scenario() {
        let err = compile("var = 1;", "en").unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::SyntaxError);
    }

    #[test]
    fn hindi_keyword_scenario() {
        assert_eq!(
            run_source(r#"agar (1 < 2) { dikhaao("ok"); }"#, "hi"),
            vec!["ok"]
        );
    }

    #[test]
    fn unknown_language_code_is_reported_as_a_diagnostic() {
        let err = compile("var x = 1;", "xx").unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::SyntaxError);
    }

    #[test]
    fn list_languages_includes_every_catalog_entry() {
        let codes: Vec<_> = list_languages().iter().map(|l| l.code).collect();
        assert!(codes.contains(&"en"));
        assert!(codes.contains(&"hi"));
        assert!(codes.contains(&"es"));
        assert!(codes.contains(&"de"));
    }

    #[test]
    fn every_language_has_a_runnable_example() {
        for entry in list_languages() {
            let source = example_for(entry.code).expect("every language ships a demo");
            let program = compile(source, entry.code).expect("demo program must compile");
            run(&program, &mut NoInput).expect("demo program must run without error");
        }
    }
}
