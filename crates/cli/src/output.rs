//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output.

use imghost_core::settings::Theme;
use owo_colors::OwoColorize;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }
}

/// Paint text in the theme's accent colour
pub fn accent(text: &str, theme: Theme) -> String {
    let (r, g, b) = theme.accent_rgb();
    text.truecolor(r, g, b).to_string()
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{}m {:.0}s", mins, remaining_secs)
    }
}

/// Format a file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format `original -> processed` as a signed percentage change
pub fn format_reduction(original: u64, processed: u64) -> String {
    if original == 0 {
        return "0.0%".to_string();
    }
    let change = (processed as f64 - original as f64) / original as f64 * 100.0;
    format!("{:+.1}%", change)
}

/// Format a link lifetime given in minutes
pub fn format_expiry(minutes: u32) -> String {
    if minutes % (24 * 60) == 0 {
        format_count((minutes / (24 * 60)) as usize, "day", "days")
    } else if minutes % 60 == 0 {
        format_count((minutes / 60) as usize, "hour", "hours")
    } else {
        format_count(minutes as usize, "minute", "minutes")
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_format_duration_ms() {
        let d = Duration::from_millis(500);
        assert_eq!(format_duration(d), "500ms");
    }

    #[test]
    fn test_format_duration_mins() {
        let d = Duration::from_secs(125);
        assert_eq!(format_duration(d), "2m 5s");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(15 * 1024 * 1024), "15.00 MB");
    }

    #[test]
    fn test_format_reduction() {
        assert_eq!(format_reduction(1000, 250), "-75.0%");
        assert_eq!(format_reduction(1000, 1000), "+0.0%");
        assert_eq!(format_reduction(0, 0), "0.0%");
    }

    #[test]
    fn test_format_expiry() {
        assert_eq!(format_expiry(1440), "1 day");
        assert_eq!(format_expiry(120), "2 hours");
        assert_eq!(format_expiry(60), "1 hour");
        assert_eq!(format_expiry(5), "5 minutes");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(1, "file", "files"), "1 file");
        assert_eq!(format_count(5, "file", "files"), "5 files");
    }

    #[test]
    fn test_accent_keeps_text() {
        assert!(accent("imghost", Theme::Nordic).contains("imghost"));
    }
}
