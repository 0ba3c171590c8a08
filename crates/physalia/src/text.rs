//! Label wrapping and deterministic text measurement.
//!
//! The production renderer measured labels against the DOM; headless we use
//! fixed per-character metrics so collision boxes are reproducible across
//! runs and platforms.

const CHAR_ADVANCE_EM: f64 = 0.6;
const LINE_HEIGHT_EM: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
}

/// Greedy word wrap: words accumulate onto a line while it stays within
/// `max_line_length` characters.
pub fn split_long_text(text: &str, max_line_length: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split(' ').filter(|w| !w.is_empty()) {
        if current.chars().count() + word.chars().count() <= max_line_length {
            current.push_str(word);
            current.push(' ');
        } else {
            lines.push(current.trim().to_string());
            current = format!("{word} ");
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        lines.push(trimmed.to_string());
    }

    lines
}

/// Approximate box of a wrapped label at `font_size`.
pub fn measure_label(lines: &[String], font_size: f64) -> TextMetrics {
    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    TextMetrics {
        width: longest as f64 * font_size * CHAR_ADVANCE_EM,
        height: lines.len() as f64 * font_size * LINE_HEIGHT_EM,
    }
}
