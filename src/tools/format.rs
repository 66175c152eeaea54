//! Cell formatting model and application.
//!
//! The merge semantics are asymmetric and contractual:
//!
//! - **font** fields are merged one by one onto the cell's existing font;
//!   unspecified fields keep their current values.
//! - **fill** and **border**, when present, replace the existing fill or
//!   border object wholesale.
//!
//! A fill whose `type` is not `"pattern"` is coerced into a solid pattern
//! fill, using `fgColor` when given and otherwise the `type` token itself
//! as the foreground color. This mirrors the legacy behavior callers rely
//! on.

use std::str::FromStr;

use serde::Deserialize;
use umya_spreadsheet::{Border, Cell, Fill, PatternValues};

/// Formatting directives for a single cell. All sections are optional;
/// an absent section leaves the corresponding state untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CellFormat {
    /// Font changes, merged field-by-field.
    #[serde(default)]
    pub font: Option<FontFormat>,
    /// Fill replacement.
    #[serde(default)]
    pub fill: Option<FillFormat>,
    /// Border replacement.
    #[serde(default)]
    pub border: Option<BorderFormat>,
}

/// Font directives. Unset fields preserve the cell's current font.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FontFormat {
    /// Bold flag.
    #[serde(default)]
    pub bold: Option<bool>,
    /// Italic flag.
    #[serde(default)]
    pub italic: Option<bool>,
    /// Font size in points.
    #[serde(default)]
    pub size: Option<f64>,
    /// ARGB color token, e.g. `FFFF0000`.
    #[serde(default)]
    pub color: Option<String>,
}

/// Fill directives. Applied as a whole; any previous fill is discarded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillFormat {
    /// Fill kind. `"pattern"` is the only recognised kind; anything else
    /// triggers the solid-fill coercion described in the module docs.
    #[serde(rename = "type")]
    pub fill_type: String,
    /// Pattern name (`solid`, `darkGray`, …). Defaults to `solid`.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Foreground ARGB color token.
    #[serde(default)]
    pub fg_color: Option<String>,
    /// Background ARGB color token.
    #[serde(default)]
    pub bg_color: Option<String>,
}

/// Border directives. Applied as a whole; any previous borders are
/// discarded, including sides not named here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BorderFormat {
    /// Top edge.
    #[serde(default)]
    pub top: Option<BorderSide>,
    /// Left edge.
    #[serde(default)]
    pub left: Option<BorderSide>,
    /// Bottom edge.
    #[serde(default)]
    pub bottom: Option<BorderSide>,
    /// Right edge.
    #[serde(default)]
    pub right: Option<BorderSide>,
}

/// One border edge.
#[derive(Debug, Clone, Deserialize)]
pub struct BorderSide {
    /// Border style token (`thin`, `medium`, `dashed`, …).
    pub style: String,
    /// ARGB color token.
    pub color: String,
}

/// Applies the format to a cell. Value and formatting are orthogonal; the
/// cell's stored value is never touched.
pub fn apply_format(cell: &mut Cell, format: &CellFormat) {
    if let Some(font_format) = &format.font {
        let font = cell.get_style_mut().get_font_mut();
        if let Some(bold) = font_format.bold {
            font.set_bold(bold);
        }
        if let Some(italic) = font_format.italic {
            font.set_italic(italic);
        }
        if let Some(size) = font_format.size {
            font.set_size(size);
        }
        if let Some(color) = &font_format.color {
            font.get_color_mut().set_argb(color.clone());
        }
    }

    if let Some(fill_format) = &format.fill {
        *cell.get_style_mut().get_fill_mut() = build_fill(fill_format);
    }

    if let Some(border_format) = &format.border {
        let borders = cell.get_style_mut().get_borders_mut();
        // Wholesale replacement: discard any previous borders, including
        // sides not named in this directive. The `Borders` type is not
        // publicly nameable, so reset through the `&mut` the cell exposes.
        *borders = Default::default();
        apply_side(borders.get_top_border_mut(), border_format.top.as_ref());
        apply_side(borders.get_left_border_mut(), border_format.left.as_ref());
        apply_side(borders.get_bottom_border_mut(), border_format.bottom.as_ref());
        apply_side(borders.get_right_border_mut(), border_format.right.as_ref());
    }
}

fn build_fill(format: &FillFormat) -> Fill {
    let mut fill = Fill::default();
    let pattern = fill.get_pattern_fill_mut();

    if format.fill_type == "pattern" {
        let kind = format.pattern.as_deref().unwrap_or("solid");
        pattern.set_pattern_type(PatternValues::from_str(kind).unwrap_or(PatternValues::Solid));
        if let Some(fg) = &format.fg_color {
            pattern.get_foreground_color_mut().set_argb(fg.clone());
        }
        if let Some(bg) = &format.bg_color {
            pattern.get_background_color_mut().set_argb(bg.clone());
        }
    } else {
        // Legacy coercion: treat the unrecognised type token as a color.
        pattern.set_pattern_type(PatternValues::Solid);
        let fg = format
            .fg_color
            .clone()
            .unwrap_or_else(|| format.fill_type.clone());
        pattern.get_foreground_color_mut().set_argb(fg);
        if let Some(bg) = &format.bg_color {
            pattern.get_background_color_mut().set_argb(bg.clone());
        }
    }

    fill
}

fn apply_side(border: &mut Border, side: Option<&BorderSide>) {
    if let Some(side) = side {
        border.set_border_style(side.style.clone());
        border.get_color_mut().set_argb(side.color.clone());
    }
}
