//! Proptest strategies for noteward domain values.

use proptest::prelude::*;

use noteward_core::Visibility;

/// Lowercase emails in a reserved test domain.
pub fn email() -> impl Strategy<Value = String> {
    "[a-z]{3,12}".prop_map(|local| format!("{}@example.com", local))
}

/// Printable note titles, possibly with internal spaces.
pub fn title() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 ]{0,40}".prop_map(|s| s.trim_end().to_string())
}

/// Raw tag labels, before normalization: mixed case, stray whitespace.
pub fn raw_tag() -> impl Strategy<Value = String> {
    " ?[A-Za-z]{1,8} ?"
}

/// One of the three visibility states.
pub fn visibility() -> impl Strategy<Value = Visibility> {
    prop::sample::select(vec![
        Visibility::Private,
        Visibility::Shared,
        Visibility::Public,
    ])
}

/// Well-formed token strings (what `LinkToken::generate` produces).
pub fn token_string() -> impl Strategy<Value = String> {
    "[0-9a-f]{32}"
}

/// Optional expiry instants around a fixed "now" of 1_000_000 ms.
pub fn expiry() -> impl Strategy<Value = Option<i64>> {
    prop::option::of(900_000i64..1_100_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use noteward_core::{LinkToken, TOKEN_LEN};

    proptest! {
        #[test]
        fn generated_token_strings_parse(s in token_string()) {
            let token: LinkToken = s.parse().unwrap();
            prop_assert_eq!(token.as_str(), s.as_str());
        }

        #[test]
        fn emails_have_single_at(e in email()) {
            prop_assert_eq!(e.matches('@').count(), 1);
        }

        #[test]
        fn titles_are_trimmed(t in title()) {
            prop_assert_eq!(t.trim_end(), t.as_str());
        }
    }

    #[test]
    fn real_tokens_match_the_generator_shape() {
        let token = LinkToken::generate();
        assert_eq!(token.as_str().len(), TOKEN_LEN);
        assert!(token.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
