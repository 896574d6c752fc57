//! Canonical demo programs, one per registered language, used by `pipeline::example_for`. Kept
//! as inline string constants rather than files on disk, since this system has no native build
//! step to load fixtures against.

/// The demo program for `lang_code`, or `None` if the language isn't registered.
pub fn example_for(lang_code: &str) -> Option<&'static str> {
    match lang_code {
        "en" => Some(EN_DEMO),
        "hi" => Some(HI_DEMO),
        "es" => Some(ES_DEMO),
        "de" => Some(DE_DEMO),
        _ => None,
    }
}

const EN_DEMO: &str = r#"
function fib(n) {
    if (n <= 1) {
        return n;
    }
    return fib(n - 1) + fib(n - 2);
}

var i = 0;
while (i < 8) {
    print("fib(" + i + ") =", fib(i));
    i = i + 1;
}
"#;

const HI_DEMO: &str = r#"
kaarya fib(n) {
    agar (n <= 1) {
        vapas n;
    }
    vapas fib(n - 1) + fib(n - 2);
}

chal i = 0;
jabtak (i < 8) {
    dikhaao("fib(" + i + ") =", fib(i));
    i = i + 1;
}
"#;

const ES_DEMO: &str = r#"
funcion fib(n) {
    si (n <= 1) {
        retornar n;
    }
    retornar fib(n - 1) + fib(n - 2);
}

variable i = 0;
mientras (i < 8) {
    imprimir("fib(" + i + ") =", fib(i));
    i = i + 1;
}
"#;

const DE_DEMO: &str = r#"
funktion fib(n) {
    wenn (n <= 1) {
        zurueck n;
    }
    zurueck fib(n - 1) + fib(n - 2);
}

variable i = 0;
waehrend (i < 8) {
    drucke("fib(" + i + ") =", fib(i));
    i = i + 1;
}
"#;
