//! SQL quoting for values embedded in provisioning statements

/// Escape a value for use inside a single-quoted SQL string literal
pub fn escape_string_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\'' => escaped.push_str("\\'"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Single-quoted SQL string literal
pub fn string_literal(value: &str) -> String {
    format!("'{}'", escape_string_literal(value))
}

/// Backtick-quoted identifier
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Schema pattern for a GRANT that matches `name` and nothing else.
///
/// `_` is a single-character wildcard in grant patterns, so it is escaped.
pub fn grant_schema_pattern(name: &str) -> String {
    quote_identifier(&name.replace('_', "\\_"))
}

/// `'user'@'host'` account name
pub fn account(user: &str, host: &str) -> String {
    format!("{}@{}", string_literal(user), string_literal(host))
}
