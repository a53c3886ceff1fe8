//! Greedy word wrapping

use super::canvas::Canvas;
use super::typeface::{TextStyle, Typeface};

/// One committed line and the baseline it sits on
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    pub text: String,
    pub baseline: f32,
}

/// Break `text` into lines no wider than `max_width` where possible.
///
/// Words are split on single spaces and the candidate line is measured with its
/// trailing space. A word is only moved to a new line when the buffer already
/// holds something, so an over-long first word still gets a line of its own.
/// Returns the lines and the cursor one line height below the last baseline.
pub fn wrap_lines(
    face: &dyn Typeface,
    text: &str,
    style: &TextStyle,
    start_y: f32,
    max_width: f32,
    line_height: f32,
) -> (Vec<WrappedLine>, f32) {
    let mut lines = Vec::new();
    let mut buffer = String::new();
    let mut y = start_y;

    for word in text.split(' ') {
        let candidate = format!("{}{} ", buffer, word);
        if face.measure(&candidate, style) > max_width && !buffer.is_empty() {
            lines.push(WrappedLine {
                text: buffer.trim_end().to_string(),
                baseline: y,
            });
            buffer = format!("{} ", word);
            y += line_height;
        } else {
            buffer = candidate;
        }
    }
    lines.push(WrappedLine {
        text: buffer.trim_end().to_string(),
        baseline: y,
    });

    (lines, y + line_height)
}

/// Wrap and draw `text` left-aligned at `x`; returns the cursor below the block
#[allow(clippy::too_many_arguments)]
pub fn wrap_text(
    canvas: &mut Canvas,
    face: &dyn Typeface,
    text: &str,
    x: f32,
    y: f32,
    max_width: f32,
    line_height: f32,
    style: &TextStyle,
) -> f32 {
    let (lines, next_y) = wrap_lines(face, text, style, y, max_width, line_height);
    for line in &lines {
        face.draw(canvas, &line.text, x, line.baseline, style);
    }
    next_y
}
