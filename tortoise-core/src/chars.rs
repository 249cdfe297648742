//! Character classes shared by the command parser and the expression
//! scanner.

/// Whitespace between commands and inside parameter lists.
#[must_use]
pub const fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\0')
}

#[must_use]
pub const fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Characters allowed in procedure and variable names.
#[must_use]
pub const fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$')
}

/// Whether `s` as a whole is a usable name. A lone `$` is not.
#[must_use]
pub fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s != "$" && s.chars().all(is_identifier_char)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
