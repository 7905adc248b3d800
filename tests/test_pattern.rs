use loglens::parser::LineParser;
use loglens::pattern::{compile_mask_pattern, datetime_mask};

fn handler(name: &str) -> Option<String> {
    match name {
        "datetime" => Some(datetime_mask("yyyy-MM-dd HH:mm:ss.fff")),
        "message" => Some(".+".to_string()),
        "level" => Some("[A-Z]+".to_string()),
        "thread" => Some(r"[\w-]+".to_string()),
        _ => None,
    }
}

// Round-trip law: a line built by substituting sample values for each
// placeholder parses back into exactly those values.
#[test]
fn mask_round_trips_sample_values() {
    let compiled = compile_mask_pattern(
        r"%{datetime} \[%{level}\] \[%{thread}\] %{message}",
        handler,
    )
    .expect("well-formed mask must compile");

    let parser = LineParser::new(&compiled, "yyyy-MM-dd HH:mm:ss.fff").unwrap();
    let parsed = parser
        .parse("2026-03-01 09:15:00.250 [WARN] [worker-2] disk usage above threshold")
        .expect("constructed line must match its own mask");

    assert_eq!(parsed.timestamp, "2026-03-01 09:15:00.250");
    assert_eq!(parsed.level, "WARN");
    assert_eq!(
        parsed.fields,
        vec![("thread".to_string(), "worker-2".to_string())]
    );
    assert_eq!(parsed.message, "disk usage above threshold");
}

#[test]
fn unknown_placeholder_defaults_to_greedy_match() {
    let compiled = compile_mask_pattern("%{datetime} %{session} %{message}", handler).unwrap();
    assert!(compiled.contains("(?<session>.+)"));

    let parser = LineParser::new(&compiled, "yyyy-MM-dd HH:mm:ss.fff").unwrap();
    let parsed = parser
        .parse("2026-03-01 09:15:00.250 abc-123 hello")
        .unwrap();
    assert_eq!(
        parsed.fields,
        vec![("session".to_string(), "abc-123".to_string())]
    );
}

#[test]
fn unterminated_group_always_yields_none() {
    assert_eq!(compile_mask_pattern("%{datetime} %{message", handler), None);
    assert_eq!(compile_mask_pattern("%{", handler), None);
}

#[test]
fn space_in_group_name_yields_none() {
    assert_eq!(compile_mask_pattern("%{date time} %{message}", handler), None);
}

#[test]
fn variable_whitespace_in_lines_is_tolerated() {
    // Literal spaces in the mask become \s, so parsing survives a tab.
    let compiled = compile_mask_pattern("%{datetime} %{message}", handler).unwrap();
    let parser = LineParser::new(&compiled, "yyyy-MM-dd HH:mm:ss.fff").unwrap();
    assert!(parser.parse("2026-03-01 09:15:00.250\thello").is_some());
}
