/// Integration tests for script reformatting
///
/// Tests verify:
/// - Prettyprint only touches indentation and is idempotent
/// - Full reformat never changes the token sequence
/// - Block nesting moves the indent by exactly one level per brace
/// - Malformed scripts are rejected without partial output

use indoc::indoc;
use quickcheck::{QuickCheck, TestResult};

use eidos_assist::errors::FormatError;
use eidos_assist::format::{reformat, reformat_source, FormatOptions, Mode};
use eidos_assist::script::{tokenize, Token, TokenKind};
use test_utils::script::generator::{EidosScript, Layout, SlimScript};

fn significant(tokens: &[Token]) -> Vec<(String, TokenKind)> {
    tokens
        .iter()
        .filter(|t| t.is_significant())
        .map(|t| (t.text.clone(), t.kind))
        .collect()
}

fn prettyprint(source: &str) -> String {
    reformat_source(source, Mode::Prettyprint, &FormatOptions::default()).unwrap()
}

fn full(source: &str) -> String {
    reformat_source(source, Mode::FullReformat, &FormatOptions::default()).unwrap()
}

#[test]
fn test_full_reformat_if_else_example() {
    let formatted = reformat(&tokenize("if(x){y=1;}else{y=2;}"), Mode::FullReformat).unwrap();
    let lines: Vec<&str> = formatted.lines().collect();
    assert_eq!(lines, vec!["if (x)", "{", "\ty = 1;", "}", "else", "{", "\ty = 2;", "}"]);
}

#[test]
fn test_full_reformat_slim_script() {
    let source = indoc! {r#"
        initialize(){initializeMutationRate(1e-7);
        initializeMutationType("m1",0.5,"f",0.0);
          }
        1 early(){sim.addSubpop("p1",500);}
        2000 late(){ for(i in 1:3){ if(i==2) next; print(i); } }
    "#};
    let expected = indoc! {r#"
        initialize()
        {
        	initializeMutationRate(1e-7);
        	initializeMutationType("m1", 0.5, "f", 0.0);
        }

        1 early()
        {
        	sim.addSubpop("p1", 500);
        }

        2000 late()
        {
        	for (i in 1:3)
        	{
        		if (i == 2) next;
        		print(i);
        	}
        }
    "#};
    assert_eq!(full(source), expected);
}

#[test]
fn test_full_reformat_keeps_comments() {
    let source = indoc! {"
        // setup
        x=1; // one
        /* block */
        y=2;
    "};
    assert_eq!(full(source), "// setup\nx = 1; // one\n\n/* block */\ny = 2;\n");
}

#[test]
fn test_prettyprint_only_reindents() {
    let source = indoc! {"
        function (integer)twice(integer x)
        {
                  if (x > 0)
              {
        return 2*x;
        }
        return   0;
        }
    "};
    let expected = indoc! {"
        function (integer)twice(integer x)
        {
        	if (x > 0)
        	{
        		return 2*x;
        	}
        	return   0;
        }
    "};
    assert_eq!(prettyprint(source), expected);
}

#[test]
fn test_prettyprint_continuation_lines() {
    let source = "x = c(1,\n2,\n3);\nif (x)\ny = 1;\nz = 2;\n";
    assert_eq!(prettyprint(source), "x = c(1,\n\t2,\n\t3);\nif (x)\n\ty = 1;\nz = 2;\n");
}

#[test]
fn test_prettyprint_custom_indent() {
    let options = FormatOptions { indent: "    ".to_string() };
    let formatted = reformat_source("{\nx;\n{\ny;\n}\n}\n", Mode::Prettyprint, &options).unwrap();
    assert_eq!(formatted, "{\n    x;\n    {\n        y;\n    }\n}\n");
}

#[test]
fn test_indent_monotonicity() {
    for depth in 1..8 {
        let source = format!("{}{}", "{\n".repeat(depth), "}\n".repeat(depth));
        let formatted = prettyprint(&source);
        let levels: Vec<usize> = formatted.lines().map(|l| l.chars().take_while(|&c| c == '\t').count()).collect();

        let expected: Vec<usize> = (0..depth).chain((0..depth).rev()).collect();
        assert_eq!(levels, expected, "depth {depth}");
    }
}

#[test]
fn test_malformed_input_is_rejected() {
    for mode in [Mode::Prettyprint, Mode::FullReformat] {
        let err = reformat_source("x = 1;\n}\n", mode, &FormatOptions::default()).unwrap_err();
        assert_eq!(err, FormatError::UnbalancedBrace { offset: 7 });

        let err = reformat_source("x = #;", mode, &FormatOptions::default()).unwrap_err();
        assert!(matches!(err, FormatError::BadToken { offset: 4 }));
    }
}

#[test]
fn test_unsafe_regeneration_is_rejected() {
    let err = reformat_source("y = 5 .x;", Mode::FullReformat, &FormatOptions::default()).unwrap_err();
    assert_eq!(err, FormatError::Retokenize { offset: 4 });
    // The whitespace-only mode has nothing to break
    assert_eq!(prettyprint("y = 5 .x;"), "y = 5 .x;");
}

#[test]
fn test_empty_script() {
    assert_eq!(prettyprint(""), "");
    assert_eq!(full(""), "");
    assert_eq!(full("  \n\n"), "");
}

#[test]
fn test_property_prettyprint_idempotent() {
    fn prop(script: EidosScript) -> TestResult {
        let code = script.to_code();
        let once = match reformat_source(&code, Mode::Prettyprint, &FormatOptions::default()) {
            Ok(text) => text,
            Err(_) => return TestResult::failed(),
        };
        let twice = prettyprint(&once);
        TestResult::from_bool(once == twice)
    }

    QuickCheck::new().tests(300).quickcheck(prop as fn(EidosScript) -> TestResult);
}

#[test]
fn test_property_prettyprint_keeps_tokens() {
    fn prop(script: SlimScript) -> bool {
        let code = script.to_code();
        significant(&tokenize(&prettyprint(&code))) == significant(&tokenize(&code))
    }

    QuickCheck::new().tests(300).quickcheck(prop as fn(SlimScript) -> bool);
}

#[test]
fn test_property_full_reformat_round_trip() {
    fn prop(script: EidosScript) -> TestResult {
        let code = script.to_code();
        let formatted = match reformat_source(&code, Mode::FullReformat, &FormatOptions::default()) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("full reformat failed with {e} on:\n{code}");
                return TestResult::failed();
            }
        };
        TestResult::from_bool(significant(&tokenize(&formatted)) == significant(&tokenize(&code)))
    }

    QuickCheck::new().tests(300).quickcheck(prop as fn(EidosScript) -> TestResult);
}

#[test]
fn test_property_full_reformat_ignores_layout() {
    fn prop(script: SlimScript) -> TestResult {
        let mut compact = script.clone();
        compact.layout = Layout::Compact;
        let a = full(&script.to_code());
        let b = full(&compact.to_code());
        TestResult::from_bool(a == b)
    }

    QuickCheck::new().tests(200).quickcheck(prop as fn(SlimScript) -> TestResult);
}
