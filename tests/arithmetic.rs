use test_utils::run_en;

#[test]
fn addition_of_two_variables() {
    assert_eq!(run_en("var x = 10; var y = 20; print(x + y);"), vec!["30"]);
}

#[test]
fn operator_precedence_multiplies_before_adding() {
    assert_eq!(run_en("print(2 + 3 * 4);"), vec!["14"]);
}

#[test]
fn parentheses_override_precedence() {
    assert_eq!(run_en("print((2 + 3) * 4);"), vec!["20"]);
}

#[test]
fn modulo_operator() {
    assert_eq!(run_en("print(17 % 5);"), vec!["2"]);
}

#[test]
fn unary_negation() {
    assert_eq!(run_en("var x = 5; print(-x);"), vec!["-5"]);
}

#[test]
fn factorial_via_while_loop() {
    let source = "var n = 5; var f = 1; while (n > 1) { f = f * n; n = n - 1; } print(f);";
    assert_eq!(run_en(source), vec!["120"]);
}

#[test]
fn comparisons_produce_booleans() {
    assert_eq!(run_en("print(3 < 4, 3 > 4, 3 <= 3, 3 >= 4);"), vec!["true false true false"]);
}
