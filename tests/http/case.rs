//! Property tests for name case conversion

use proptest::prelude::*;
use weft_http::case::parse_case;

fn identifier() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9]{0,20}"
}

proptest! {
    #[test]
    fn components_are_lowercase_and_nonempty(name in identifier()) {
        for component in parse_case(&name).components() {
            prop_assert!(!component.is_empty());
            prop_assert!(component.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn kebab_case_keeps_every_character(name in identifier()) {
        let kebab = parse_case(&name).kebab_case();
        prop_assert_eq!(kebab.replace('-', ""), name.to_lowercase());
    }

    #[test]
    fn converted_names_parse_to_the_same_components(name in identifier()) {
        let parsed = parse_case(&name);
        let kebab = parse_case(&parsed.kebab_case());
        prop_assert_eq!(kebab.components(), parsed.components());
        let snake = parse_case(&parsed.snake_case());
        prop_assert_eq!(snake.components(), parsed.components());
    }
}

#[test]
fn header_style_names() {
    assert_eq!(parse_case("contentType").kebab_case(), "content-type");
    assert_eq!(parse_case("ETag").kebab_case(), "e-tag");
    assert_eq!(parse_case("XRequestID").kebab_case(), "x-request-id");
}
