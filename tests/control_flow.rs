use test_utils::run_en;

#[test]
fn if_else_picks_the_matching_branch() {
    let source = r#"if (1 < 2) { print("a"); } else { print("b"); } print("c");"#;
    assert_eq!(run_en(source), vec!["a", "c"]);
}

#[test]
fn if_without_else_falls_through_when_false() {
    assert_eq!(run_en(r#"if (false) { print("a"); } print("b");"#), vec!["b"]);
}

#[test]
fn while_loop_runs_until_condition_is_falsy() {
    let source = "var i = 0; while (i < 3) { print(i); i = i + 1; }";
    assert_eq!(run_en(source), vec!["0", "1", "2"]);
}

#[test]
fn for_loop_with_all_three_clauses() {
    let source = "for (var i = 0; i < 3; i = i + 1) { print(i); }";
    assert_eq!(run_en(source), vec!["0", "1", "2"]);
}

#[test]
fn for_loop_with_omitted_condition_defaults_to_true_and_a_return_ends_it() {
    // no condition clause means the loop runs unconditionally; this language has no
    // `break` statement, so the only way out of an unbounded `for` is a `return` from the
    // enclosing function.
    let source = "function count_to_three() { var result = 0; for (var i = 0;; i = i + 1) { if (i >= 3) { return result; } result = result + i; } } print(count_to_three());";
    assert_eq!(run_en(source), vec!["3"]);
}

#[test]
fn and_and_or_do_not_short_circuit() {
    // both sides are evaluated; side effects in the "untaken" branch are observable.
    let source = "var calls = 0; function bump() { calls = calls + 1; return true; } var x = false && bump(); print(calls);";
    assert_eq!(run_en(source), vec!["1"]);
}

#[test]
fn or_returns_the_truthy_first_operand() {
    assert_eq!(run_en("print(1 || 2);"), vec!["1"]);
}

#[test]
fn and_returns_the_second_operand_when_first_is_truthy() {
    assert_eq!(run_en("print(1 && 2);"), vec!["2"]);
}

#[test]
fn nested_blocks_execute_in_source_order() {
    let source = "{ print(1); { print(2); } print(3); }";
    assert_eq!(run_en(source), vec!["1", "2", "3"]);
}
