use test_utils::run_en;

#[test]
fn redeclaring_a_var_aliases_the_same_slot() {
    assert_eq!(run_en("var x = 1; var x = x + 1; print(x);"), vec!["2"]);
}

#[test]
fn assignment_is_an_expression_that_yields_its_value() {
    assert_eq!(run_en("var x; print(x = 5);"), vec!["5"]);
}

#[test]
fn chained_assignment_is_right_associative() {
    assert_eq!(run_en("var a; var b; a = b = 7; print(a, b);"), vec!["7 7"]);
}

#[test]
fn block_scoped_names_alias_the_flat_outer_table() {
    // the compiler uses one flat variable table: a `var` declared inside a block reuses
    // the same slot as an identically-named outer variable rather than shadowing it.
    let source = "var x = 1; { var x = 2; } print(x);";
    assert_eq!(run_en(source), vec!["2"]);
}

#[test]
fn function_parameters_do_not_leak_into_the_caller_after_return() {
    let source = "function identity(n) { return n; } var n = 42; identity(1); print(n);";
    assert_eq!(run_en(source), vec!["42"]);
}

#[test]
fn reading_an_undeclared_but_assigned_slot_is_null_until_assigned() {
    // `var` with no initializer binds to `null` explicitly.
    assert_eq!(run_en("var x; print(x);"), vec!["null"]);
}
