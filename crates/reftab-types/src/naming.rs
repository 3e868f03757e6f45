//! Naming helpers for lookup constants.
//!
//! A table publishes each record with a text `name` under a constant such as
//! `GIVE_MONEY` or `HELLO_WORLD`, so application code can reach well-known
//! rows without a query.

/// Convert `PascalCase` or spaced text to `snake_case`.
///
/// An underscore is inserted before every ASCII capital except the first
/// character, then spaces are dropped and the result is lowercased:
/// `HelloWorld` and `Hello World` both become `hello_world`.
pub fn snake_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    for (i, ch) in text.chars().enumerate() {
        if i > 0 && ch.is_ascii_uppercase() {
            out.push('_');
        }
        if ch != ' ' {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

/// Lookup constant derived from a record name: `snake_case` upper-cased.
pub fn lookup_constant(name: &str) -> String {
    snake_case(name).to_uppercase()
}
