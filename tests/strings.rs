use test_utils::run_en;

#[test]
fn string_biased_addition_converts_the_number() {
    assert_eq!(run_en(r#"var s = "hi"; print(s + " " + 3);"#), vec!["hi 3"]);
}

#[test]
fn number_plus_string_is_also_string_biased() {
    assert_eq!(run_en(r#"print(1 + " apple");"#), vec!["1 apple"]);
}

#[test]
fn string_escapes_decode_in_output() {
    assert_eq!(run_en(r#"print("a\nb");"#), vec!["a\nb"]);
}

#[test]
fn single_and_double_quoted_strings_are_equivalent() {
    assert_eq!(run_en(r#"print('hi' == "hi");"#), vec!["true"]);
}

#[test]
fn empty_string_is_falsy() {
    assert_eq!(run_en(r#"if ("") { print("yes"); } else { print("no"); }"#), vec!["no"]);
}

#[test]
fn print_joins_multiple_arguments_with_a_single_space() {
    assert_eq!(run_en(r#"print("a", "b", "c");"#), vec!["a b c"]);
}
