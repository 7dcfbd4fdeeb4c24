use itertools::Itertools;
use serde::Serialize;

use crate::formats::xlsx::{CellFormat, Color};

pub const SOURCED_TEXT_COLOR: &str = "#0000FF";
pub const CALCULATED_TEXT_COLOR: &str = "#000000";
pub const DEFAULT_BACKGROUND_COLOR: &str = "#FFFFFF";

/// Normalized cell style as it's stored in the document and used for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleRecord {
    pub text_color: String,
    pub text_bold: bool,
    pub background_color: String,
    pub indents: u32,
    pub border: String,
}

/// Derives the style of a cell.
///
/// Hardcoded and sourced values are rendered blue, calculated ones are black.
pub fn extract(format: &CellFormat, is_source: bool, is_formula: bool) -> StyleRecord {
    let text_color = if is_source || !is_formula {
        SOURCED_TEXT_COLOR
    } else {
        CALCULATED_TEXT_COLOR
    };

    StyleRecord {
        text_color: text_color.to_owned(),
        text_bold: format.bold,
        background_color: background_color(format),
        indents: format.indent.unwrap_or(0),
        border: border(format),
    }
}

fn background_color(format: &CellFormat) -> String {
    match format.fill.as_ref().and_then(|fill| fill.foreground.as_ref()) {
        Some(Color::Rgb(rgb)) => normalize_rgb(rgb),
        _ => DEFAULT_BACKGROUND_COLOR.to_owned(),
    }
}

fn normalize_rgb(color: &str) -> String {
    let color = color.strip_prefix('#').unwrap_or(color);

    if !color.chars().all(|c| c.is_ascii_hexdigit()) {
        return DEFAULT_BACKGROUND_COLOR.to_owned();
    }

    match color.len() {
        8 => format!("#{}", color[2..].to_ascii_uppercase()),
        6 => format!("#{}", color.to_ascii_uppercase()),
        _ => DEFAULT_BACKGROUND_COLOR.to_owned(),
    }
}

fn border(format: &CellFormat) -> String {
    let sides = format.border.sides().into_iter()
        .filter_map(|(side, style)| style.map(|style| format!("{side}: {style}")))
        .join(", ");

    if sides.is_empty() {
        "none".to_owned()
    } else {
        sides
    }
}
