//! Editor settings and style overrides
//!
//! This module defines `EditorSettings`, the configuration record for one
//! markdown editor instance, with serde support for JSON persistence.
//! Style overrides are typed records whose fields are all optional; missing
//! fields fall back to the documented defaults when resolved.

use eframe::egui::Color32;
use log::warn;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Color Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Parse a `#rrggbb` or `#rrggbbaa` color string.
///
/// Returns `None` for anything else, including the short `#rgb` form.
pub fn parse_hex_color(value: &str) -> Option<Color32> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        6 => Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?)),
        8 => Some(Color32::from_rgba_unmultiplied(
            channel(0)?,
            channel(2)?,
            channel(4)?,
            channel(6)?,
        )),
        _ => None,
    }
}

/// Drop a color override that does not parse, logging the rejected value.
fn sanitize_color(field: &str, color: &mut Option<String>) {
    if let Some(value) = color {
        if parse_hex_color(value).is_none() {
            warn!("Ignoring invalid color for {}: {:?}", field, value);
            *color = None;
        }
    }
}

fn clamp_font_size(size: &mut Option<f32>) {
    if let Some(value) = size {
        *value = if value.is_finite() {
            value.clamp(EditorSettings::MIN_FONT_SIZE, EditorSettings::MAX_FONT_SIZE)
        } else {
            EditorSettings::MIN_FONT_SIZE
        };
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Edit Surface Overrides
// ─────────────────────────────────────────────────────────────────────────────

/// Overrides for the HTML edit surface.
///
/// Defaults: background `#f5f5f5`, text `#000000`, 16pt, placeholder
/// "Start typing...".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorStyleOverrides {
    /// Surface background color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Text color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    /// Font size in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    /// Hint shown while the surface is empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl EditorStyleOverrides {
    fn sanitize(&mut self) {
        sanitize_color("editor_style.background", &mut self.background);
        sanitize_color("editor_style.text_color", &mut self.text_color);
        clamp_font_size(&mut self.font_size);
    }
}

/// Resolved edit surface style.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorStyle {
    pub background: Color32,
    pub text_color: Color32,
    pub font_size: f32,
    pub placeholder: String,
}

impl Default for EditorStyle {
    fn default() -> Self {
        Self {
            background: Color32::from_rgb(0xf5, 0xf5, 0xf5),
            text_color: Color32::BLACK,
            font_size: 16.0,
            placeholder: "Start typing...".to_string(),
        }
    }
}

impl EditorStyle {
    /// Merge the overrides over the default style.
    pub fn resolve(overrides: &EditorStyleOverrides) -> Self {
        let defaults = Self::default();
        Self {
            background: overrides
                .background
                .as_deref()
                .and_then(parse_hex_color)
                .unwrap_or(defaults.background),
            text_color: overrides
                .text_color
                .as_deref()
                .and_then(parse_hex_color)
                .unwrap_or(defaults.text_color),
            font_size: overrides.font_size.unwrap_or(defaults.font_size),
            placeholder: overrides
                .placeholder
                .clone()
                .unwrap_or(defaults.placeholder),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Preview Overrides
// ─────────────────────────────────────────────────────────────────────────────

/// Overrides for the rendered markdown preview body.
///
/// Defaults: background `#f5f5f5`, text `#000000`, links `#0000ff`, 14pt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewStyleOverrides {
    /// Body background color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Body text color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    /// Link color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_color: Option<String>,
    /// Body font size in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
}

impl PreviewStyleOverrides {
    fn sanitize(&mut self) {
        sanitize_color("preview_style.background", &mut self.background);
        sanitize_color("preview_style.text_color", &mut self.text_color);
        sanitize_color("preview_style.link_color", &mut self.link_color);
        clamp_font_size(&mut self.font_size);
    }
}

/// Resolved preview style.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewStyle {
    pub background: Color32,
    pub text_color: Color32,
    pub link_color: Color32,
    pub code_background: Color32,
    pub muted: Color32,
    pub font_size: f32,
}

impl Default for PreviewStyle {
    fn default() -> Self {
        Self {
            background: Color32::from_rgb(0xf5, 0xf5, 0xf5),
            text_color: Color32::BLACK,
            link_color: Color32::from_rgb(0, 0, 0xff),
            code_background: Color32::from_rgb(230, 230, 230),
            muted: Color32::from_rgb(100, 100, 100),
            font_size: 14.0,
        }
    }
}

impl PreviewStyle {
    /// Merge the overrides over the default style.
    pub fn resolve(overrides: &PreviewStyleOverrides) -> Self {
        let defaults = Self::default();
        let color = |value: &Option<String>, fallback: Color32| {
            value
                .as_deref()
                .and_then(parse_hex_color)
                .unwrap_or(fallback)
        };
        Self {
            background: color(&overrides.background, defaults.background),
            text_color: color(&overrides.text_color, defaults.text_color),
            link_color: color(&overrides.link_color, defaults.link_color),
            font_size: overrides.font_size.unwrap_or(defaults.font_size),
            ..defaults
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for one markdown editor instance.
///
/// All fields have defaults via the `Default` trait and `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Markdown the editor starts with
    pub initial_content: String,

    /// Suppress the edit toggle and stay in preview
    pub read_only: bool,

    /// Edit surface overrides
    pub editor_style: EditorStyleOverrides,

    /// Preview overrides
    pub preview_style: PreviewStyleOverrides,

    /// How long to wait for the conversion sandbox, `0` waits forever
    pub conversion_timeout_ms: u64,

    /// syntect theme used for code blocks and the HTML surface
    pub syntax_theme: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            initial_content: String::new(),
            read_only: false,
            editor_style: EditorStyleOverrides::default(),
            preview_style: PreviewStyleOverrides::default(),
            conversion_timeout_ms: 10_000,
            syntax_theme: String::from("InspiredGitHub"),
        }
    }
}

impl EditorSettings {
    // ─────────────────────────────────────────────────────────────────────────
    // Validation Constants and Sanitization
    // ─────────────────────────────────────────────────────────────────────────

    /// Minimum allowed font size.
    pub const MIN_FONT_SIZE: f32 = 8.0;
    /// Maximum allowed font size.
    pub const MAX_FONT_SIZE: f32 = 48.0;
    /// Maximum conversion timeout (10 minutes).
    pub const MAX_TIMEOUT_MS: u64 = 600_000;

    /// Sanitize settings by clamping values to valid ranges and dropping
    /// colors that do not parse.
    pub fn sanitize(&mut self) {
        self.editor_style.sanitize();
        self.preview_style.sanitize();
        self.conversion_timeout_ms = self.conversion_timeout_ms.min(Self::MAX_TIMEOUT_MS);
        if self.syntax_theme.trim().is_empty() {
            self.syntax_theme = Self::default().syntax_theme;
        }
    }

    /// Parse settings from JSON and sanitize them.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// The conversion timeout, `None` when disabled.
    pub fn conversion_timeout(&self) -> Option<Duration> {
        (self.conversion_timeout_ms > 0).then(|| Duration::from_millis(self.conversion_timeout_ms))
    }

    /// Resolved edit surface style.
    pub fn editor_style(&self) -> EditorStyle {
        EditorStyle::resolve(&self.editor_style)
    }

    /// Resolved preview style.
    pub fn preview_style(&self) -> PreviewStyle {
        PreviewStyle::resolve(&self.preview_style)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
