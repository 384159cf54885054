//! Integration tests for `check_descriptions` (the `handwitch check` subcommand).

use std::fs;

use handwitch_telegram::check_descriptions;

const DESCRIPTIONS: &str = r#"
weather:
  url_template: "https://api.example.com/weather/{{city}}"
  body: "{{response.temp}}"
  help: Current weather
  parameters:
    city:
      help: City name
      destination: URL
      type: string
    units:
      help: Units
      destination: query
      type: string
      optional: true
"#;

/// **Test: A valid file lists every hand with its brief help.**
#[test]
fn check_lists_hands() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hands.yaml");
    fs::write(&path, DESCRIPTIONS).unwrap();

    let out = check_descriptions(&path).unwrap();

    assert!(out.starts_with("1 hands in "));
    assert!(out.contains("weather\n\tCurrent weather\n"));
}

/// **Test: Validation errors fail the check with every violation in the message.**
#[test]
fn check_reports_validation_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hands.json");
    fs::write(
        &path,
        r#"{"bad": {"url_template": "http://x/{{id}}", "parameters": {
            "id": {"destination": "URL", "type": "integer", "optional": true}
        }}}"#,
    )
    .unwrap();

    let err = check_descriptions(&path).unwrap_err();

    assert!(format!("{:#}", err).contains("hand \"bad\""));
}

/// **Test: Unknown extensions are rejected.**
#[test]
fn check_rejects_unknown_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hands.toml");
    fs::write(&path, "").unwrap();

    assert!(check_descriptions(&path).is_err());
}
