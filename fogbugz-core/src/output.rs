//! # Output Formatting
//!
//! Colored, emoji-prefixed messages for the end-of-run summary. Progress and
//! diagnostics go through `tracing` instead.

use owo_colors::OwoColorize;

/// Helper function to safely get an emoji or fallback to a default character
pub fn get_emoji_or_default(name: &str, default: &str) -> String {
  match emojis::get_by_shortcode(name) {
    Some(emoji) => emoji.to_string(),
    None => default.to_string(),
  }
}

/// Print a success message
pub fn print_success(message: &str) {
  let check = get_emoji_or_default("white_check_mark", "✓");
  println!("{} {}", check.green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
  let cross = get_emoji_or_default("x", "✗");
  eprintln!("{} {}", cross.red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
  let warning = get_emoji_or_default("warning", "⚠");
  println!("{} {}", warning.yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
  let info = get_emoji_or_default("information_source", "ℹ");
  println!("{} {}", info.blue().bold(), message);
}

/// Format a file path for display
pub fn format_path(path: &str) -> String {
  path.bright_green().to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_get_emoji_or_default() {
    assert!(!get_emoji_or_default("warning", "!").is_empty());
    assert_eq!(get_emoji_or_default("not_an_emoji_shortcode", "!"), "!");
  }

  #[test]
  fn test_format_path_keeps_text() {
    assert!(format_path("tickets.csv").contains("tickets.csv"));
  }
}
