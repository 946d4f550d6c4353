//! Terminal utility functions

/// Format a URL as a clickable terminal hyperlink if supported.
///
/// Uses OSC 8 escape sequences where the terminal understands them and
/// falls back to plain cyan text elsewhere.
pub fn terminal_link(url: &str) -> String {
    if supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout) {
        format!("\x1b]8;;{url}\x07\x1b[36m{url}\x1b[0m\x1b]8;;\x07")
    } else {
        format!("\x1b[36m{url}\x1b[0m")
    }
}
