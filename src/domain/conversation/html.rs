//! Escaping for Telegram's HTML parse mode.
//!
//! Every outbound message is sent with `parse_mode=HTML`, so any text that
//! comes from a user (names, usernames) must be escaped before it is
//! interpolated into a template.

/// Escapes `&`, `<` and `>`; quotes are only special inside attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
