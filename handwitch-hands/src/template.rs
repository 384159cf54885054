//! Handlebars rendering for URL and body templates. Strict mode: a missing variable is an error
//! rather than an empty string. No HTML escaping.

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::{HandError, Result};

fn registry() -> Handlebars<'static> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.register_escape_fn(handlebars::no_escape);
    registry
}

pub(crate) fn render<T: Serialize>(template: &str, data: &T) -> Result<String> {
    registry()
        .render_template(template, data)
        .map_err(|e| HandError::Template(e.to_string()))
}

/// Compiles a template without rendering it; used at load time.
pub(crate) fn check(name: &str, template: &str) -> std::result::Result<(), String> {
    registry()
        .register_template_string(name, template)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_does_not_escape() {
        let out = render("{{a}} & {{b}}", &json!({"a": "<x>", "b": 5})).unwrap();
        assert_eq!(out, "<x> & 5");
    }

    #[test]
    fn test_render_strict_missing_variable() {
        assert!(matches!(
            render("{{missing}}", &json!({})),
            Err(HandError::Template(_))
        ));
    }

    #[test]
    fn test_check_rejects_unclosed_block() {
        assert!(check("t", "{{#if a}}x").is_err());
        assert!(check("t", "{{a}}").is_ok());
    }
}
