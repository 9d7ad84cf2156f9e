//! Output formatting utilities

use colored::Colorize;

/// Print a section header
pub(crate) fn section(title: &str) {
    println!("\n{}", format!("=== {title} ===").cyan().bold());
}

/// Print a key-value pair
pub(crate) fn kv(key: &str, value: impl std::fmt::Display) {
    println!("  {}: {}", key.white().bold(), value);
}

/// Print a success message
pub(crate) fn success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// Print a warning message
pub(crate) fn warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// Print an info message
pub(crate) fn info(msg: &str) {
    println!("{} {}", "[INFO]".blue(), msg);
}

/// Format an R² score, or "n/a" when absent
pub(crate) fn format_r2(r2: Option<f64>) -> String {
    r2.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

/// Format a signed weight with fixed precision
pub(crate) fn format_weight(value: f64) -> String {
    format!("{value:+.4}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_r2() {
        assert_eq!(format_r2(Some(0.876)), "0.88");
        assert_eq!(format_r2(None), "n/a");
    }

    #[test]
    fn test_format_weight() {
        assert_eq!(format_weight(2.0), "+2.0000");
        assert_eq!(format_weight(-0.12345), "-0.1235");
    }
}
