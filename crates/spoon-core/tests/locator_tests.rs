use spoon_core::locator::{MarkerInjector, SENTINEL_STATEMENT};
use spoon_core::{locate_test_name, Dialect, LocateError, Locator, LocatorOptions, ScanMode};

/// Character offset just after the first occurrence of `marker`.
fn after(source: &str, marker: &str) -> usize {
    let byte = source.find(marker).unwrap() + marker.len();
    source[..byte].chars().count()
}

#[test]
fn test_single_describe() {
    let source = r#"describe("X", function(){ expect(1).toBe(1); });"#;
    assert_eq!(locate_test_name(source, after(source, "function(){ ")).as_deref(), Some("X"));
}

#[test]
fn test_nested_describe_it() {
    let source = r#"describe("Outer", function(){ it("Inner", function(){  }); })"#;
    let cursor = after(source, r#"it("Inner", function(){ "#);
    assert_eq!(locate_test_name(source, cursor).as_deref(), Some("Outer Inner"));
}

#[test]
fn test_single_quoted_nested() {
    let source = "describe('A', function() { it('B', function() { }); });";
    let cursor = after(source, "it('B', function() { ");
    assert_eq!(locate_test_name(source, cursor).as_deref(), Some("A B"));
}

#[test]
fn test_cursor_before_any_test_call() {
    let source = "var helper = 1;\n\ndescribe('A', function() {\n  it('B', function() {});\n});\n";
    assert_eq!(locate_test_name(source, 4), None);
}

#[test]
fn test_second_sibling_wins() {
    let source = r#"
describe("Calculator", function() {
  it("adds", function() {
    expect(add(1, 2)).toEqual(3);
  });

  it("subtracts", function() {
    expect(sub(2, 1)).toEqual(1);
  });
});
"#;
    let cursor = after(source, "expect(sub");
    assert_eq!(locate_test_name(source, cursor).as_deref(), Some("Calculator subtracts"));

    let cursor = after(source, "expect(add");
    assert_eq!(locate_test_name(source, cursor).as_deref(), Some("Calculator adds"));
}

#[test]
fn test_cursor_in_describe_between_its() {
    let source = r#"
describe("Suite", function() {
  var shared = 1;
  it("one", function() {});
});
"#;
    let cursor = after(source, "var shared");
    assert_eq!(locate_test_name(source, cursor).as_deref(), Some("Suite"));
}

#[test]
fn test_deep_nesting() {
    let source = r#"
describe("Outer block", function() {
  describe("inner", function() {
    it("behavior", function() {
      run();
    });
  });
});
"#;
    let cursor = after(source, "run(");
    assert_eq!(
        locate_test_name(source, cursor).as_deref(),
        Some("Outer block inner behavior")
    );
}

#[test]
fn test_injection_round_trip() {
    let source = "describe('A', function() {\n  it('B', function() {\n    go();\n  });\n});\n";
    let cursor = source.find("go").unwrap();
    let injection = MarkerInjector::default().inject(source, cursor).unwrap();

    assert_eq!(injection.text.matches(SENTINEL_STATEMENT).count(), 1);
    assert_eq!(injection.text.replacen(SENTINEL_STATEMENT, "", 1), source);
    assert_eq!(injection.strip(), source);
}

#[test]
fn test_unbalanced_braces_yield_none() {
    let source = "describe('A', function() {\n  it('B', function() {\n    go();\n";
    assert_eq!(locate_test_name(source, after(source, "go(")), None);

    let err = Locator::default().locate(source, after(source, "go(")).unwrap_err();
    assert!(matches!(err, LocateError::Parse(_)));
}

#[test]
fn test_anchor_without_function_body() {
    let source = "describe('A', () => { it('B', () => { go(); }); });";
    let cursor = after(source, "go(");
    assert_eq!(locate_test_name(source, cursor), None);

    let arrows = Locator::new(LocatorOptions {
        arrow_functions: true,
        ..LocatorOptions::default()
    });
    assert_eq!(arrows.locate(source, cursor).unwrap().render(), "A B");
}

#[test]
fn test_helper_function_before_body_is_a_known_mismatch() {
    let source = r#"
describe("Suite", function() {
  it("uses a helper", wrap(function() { return 1; }), function() {
    go();
  });
});
"#;
    let cursor = after(source, "go(");

    // The textual scan stops at the helper and still names a test.
    assert_eq!(locate_test_name(source, cursor).as_deref(), Some("Suite uses a helper"));

    let structural = Locator::new(LocatorOptions {
        scan: ScanMode::Structural,
        ..LocatorOptions::default()
    });
    assert_eq!(structural.locate(source, cursor).unwrap().render(), "Suite uses a helper");
}

#[test]
fn test_multibyte_labels_and_offsets() {
    let source = "describe('café', function() { it('naïve ✓', function() { go(); }); });";
    let cursor = after(source, "go(");
    assert_eq!(locate_test_name(source, cursor).as_deref(), Some("café naïve ✓"));
}

#[test]
fn test_typescript_spec() {
    let source = r#"
describe("Typed", function() {
  it("keeps annotations", function() {
    const total: number = add(1, 2);
  });
});
"#;
    let cursor = after(source, "const total");
    let locator = Locator::new(LocatorOptions {
        dialect: Dialect::TypeScript,
        ..LocatorOptions::default()
    });
    assert_eq!(locator.locate(source, cursor).unwrap().render(), "Typed keeps annotations");
    assert_eq!(locate_test_name(source, cursor), None);
}

#[test]
fn test_label_quotes_are_stripped() {
    let source = r#"describe("it's \"quoted\"", function() { go(); });"#;
    let cursor = after(source, "go(");
    assert_eq!(locate_test_name(source, cursor).as_deref(), Some(r#"it's \"quoted\"#));
}
