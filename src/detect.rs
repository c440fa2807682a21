//! Question region detection from OCR text lines
//!
//! Turns recognized text lines of an exam page into one source-pixel
//! rectangle per numbered question. The result feeds
//! [`CropEngine::set_auto_regions`](crate::engine::CropEngine::set_auto_regions).

use serde::{Deserialize, Serialize};

use crate::domain::PixelRect;

/// Question numbers must start within this fraction of the page width
const LEFT_REGION_RATIO: f32 = 0.3;
/// Lines shorter than this fraction of the average line height are never question numbers
const MIN_LINE_HEIGHT_RATIO: f32 = 0.5;

const MARGIN_TOP: i32 = 15;
const MARGIN_BOTTOM: i32 = 20;
/// Space kept below the last answer option
const OPTION_MARGIN: i32 = 10;
/// Minimum height of a question without options that is followed by another question
const MIN_QUESTION_HEIGHT: i32 = 50;

const MIN_REGION_WIDTH: i32 = 50;
const MIN_REGION_HEIGHT: i32 = 30;

const CONFIDENCE: f32 = 0.95;

/// One recognized line of text in source-image pixels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    pub bounds: PixelRect,
}

impl TextLine {
    pub fn new(text: impl Into<String>, bounds: PixelRect) -> Self {
        Self {
            text: text.into(),
            bounds,
        }
    }
}

/// A detected question and its bounds in source-image pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRegion {
    pub bounds: PixelRect,
    pub number: String,
    pub confidence: f32,
}

/// Leading question number: one or two ASCII digits followed by `.` or `、`
pub fn question_number(text: &str) -> Option<&str> {
    let text = text.trim();
    let digits = text.chars().take_while(|c| c.is_ascii_digit()).count();
    if !(1..=2).contains(&digits) {
        return None;
    }
    match text[digits..].chars().next() {
        Some('.' | '、') => Some(&text[..digits]),
        _ => None,
    }
}

/// Answer option line: `A`-`D` followed by a delimiter or whitespace
pub fn is_option_line(text: &str) -> bool {
    let mut chars = text.trim().chars();
    matches!(chars.next(), Some('A'..='D'))
        && chars
            .next()
            .is_some_and(|c| matches!(c, '.' | '、' | ')' | '）') || c.is_whitespace())
}

/// Lines that start a new question, in top-to-bottom order
fn question_start_lines<'a>(lines: &[&'a TextLine], image_width: u32) -> Vec<(&'a TextLine, String)> {
    let average_height =
        lines.iter().map(|l| l.bounds.height() as f32).sum::<f32>() / lines.len().max(1) as f32;
    let left_limit = image_width as f32 * LEFT_REGION_RATIO;

    lines
        .iter()
        .filter_map(|&line| {
            let number = question_number(&line.text)?;
            if (line.bounds.height() as f32) < average_height * MIN_LINE_HEIGHT_RATIO {
                log::debug!("Question {} rejected: line too short", number);
                return None;
            }
            if line.bounds.left as f32 > left_limit {
                log::debug!("Question {} rejected: not in left margin", number);
                return None;
            }
            Some((line, number.to_string()))
        })
        .collect()
}

/// Bottom of the lowest option line between `top` and `next_top`
fn last_option_bottom(lines: &[&TextLine], top: i32, next_top: Option<i32>) -> Option<i32> {
    lines
        .iter()
        .filter(|l| l.bounds.top >= top && next_top.is_none_or(|next| l.bounds.top < next))
        .filter(|l| is_option_line(&l.text))
        .map(|l| l.bounds.bottom)
        .max()
}

/// Whether a line overlaps the vertical range `[top, bottom)`
fn in_range(bounds: &PixelRect, top: i32, bottom: i32) -> bool {
    let center = (bounds.top + bounds.bottom) / 2;
    let inside = |y: i32| y >= top && y < bottom;
    inside(bounds.top)
        || inside(bounds.bottom)
        || inside(center)
        || (bounds.top < top && bounds.bottom > bottom)
}

/// Grow `bounds` so every line fits with a margin, clamped to the image
fn include_all_lines(bounds: PixelRect, lines: &[&TextLine], width: i32, height: i32) -> PixelRect {
    lines.iter().fold(bounds, |mut acc, line| {
        let b = line.bounds;
        if b.left < acc.left {
            acc.left = (b.left - 20).max(0);
        }
        if b.right > acc.right {
            acc.right = (b.right + 20).min(width);
        }
        if b.top < acc.top {
            acc.top = (b.top - 15).max(0);
        }
        if b.bottom > acc.bottom {
            acc.bottom = (b.bottom + 15).min(height);
        }
        acc
    })
}

/// Detect one region per numbered question
pub fn detect_question_regions(
    lines: &[TextLine],
    image_width: u32,
    image_height: u32,
) -> Vec<QuestionRegion> {
    if lines.is_empty() {
        return Vec::new();
    }
    let (width, height) = (image_width as i32, image_height as i32);

    let mut sorted: Vec<&TextLine> = lines.iter().collect();
    sorted.sort_by_key(|l| l.bounds.top);

    let questions = question_start_lines(&sorted, image_width);
    log::debug!("Found {} question numbers in {} lines", questions.len(), sorted.len());

    let mut regions = Vec::new();
    for (i, (line, number)) in questions.iter().enumerate() {
        let top = (line.bounds.top - MARGIN_TOP).max(0);
        let next_top = questions.get(i + 1).map(|(next, _)| next.bounds.top);
        let option_bottom = last_option_bottom(&sorted, top, next_top);

        let bottom = match (option_bottom, next_top) {
            (Some(option), next) => {
                (option + OPTION_MARGIN).min(next.map_or(height, |n| n - MARGIN_BOTTOM))
            }
            (None, Some(next)) => (top + MIN_QUESTION_HEIGHT).max(next - MARGIN_BOTTOM),
            (None, None) => height,
        };

        let included: Vec<&TextLine> = sorted
            .iter()
            .copied()
            .filter(|l| in_range(&l.bounds, top, bottom))
            .collect();

        let bounds = match included
            .iter()
            .map(|l| l.bounds)
            .reduce(|a, b| a.union(b))
        {
            Some(text) => {
                let text_bottom = match option_bottom {
                    Some(option) if text.bottom < option => option + OPTION_MARGIN,
                    _ => text.bottom + 5,
                };
                PixelRect::new(
                    (text.left - 15).max(0),
                    (text.top - 10).max(0),
                    (text.right + 15).min(width),
                    text_bottom.min(height),
                )
            }
            None => PixelRect::new(0, top, width, bottom),
        };
        let bounds = include_all_lines(bounds, &included, width, height);

        if bounds.width() > MIN_REGION_WIDTH && bounds.height() > MIN_REGION_HEIGHT {
            regions.push(QuestionRegion {
                bounds,
                number: number.clone(),
                confidence: CONFIDENCE,
            });
        } else {
            log::debug!("Question {} region too small: {:?}", number, bounds);
        }
    }

    log::info!("Detected {} question regions", regions.len());
    regions
}
