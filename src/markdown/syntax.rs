//! Syntax Highlighting Module
//!
//! This module integrates syntect for highlighting fenced code blocks in the
//! preview and the HTML source shown on the edit surface.
//!
//! Highlighted output is an egui `LayoutJob`, so it can be painted directly
//! with a label or fed to a `TextEdit` layouter.

use eframe::egui::text::{LayoutJob, TextFormat};
use eframe::egui::{Color32, FontId, Stroke};
use log::{debug, warn};
use std::sync::OnceLock;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Fallback theme if the requested theme is not found
pub const FALLBACK_THEME: &str = "InspiredGitHub";

// ─────────────────────────────────────────────────────────────────────────────
// Syntax Highlighter
// ─────────────────────────────────────────────────────────────────────────────

/// Syntax highlighter that caches syntect sets for performance.
///
/// The syntax and theme sets are expensive to load and never change after
/// loading, so a single instance is shared (see [`get_highlighter`]).
pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxHighlighter {
    /// Create a new syntax highlighter with default syntax and theme sets.
    pub fn new() -> Self {
        debug!("Loading syntect syntax and theme sets");
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();
        debug!(
            "Loaded {} syntaxes and {} themes",
            syntax_set.syntaxes().len(),
            theme_set.themes.len()
        );
        Self {
            syntax_set,
            theme_set,
        }
    }

    /// Get a theme by name, falling back to the default if not found.
    pub fn theme(&self, name: &str) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(name)
            .or_else(|| self.theme_set.themes.get(FALLBACK_THEME))
    }

    /// Find syntax definition for a language identifier.
    ///
    /// Tries the token as a file extension first, then as a syntax name.
    fn find_syntax(&self, language: &str) -> Option<&SyntaxReference> {
        if language.is_empty() {
            return None;
        }

        let lang_lower = language.to_lowercase();
        let extension = match lang_lower.as_str() {
            "rust" => "rs",
            "python" => "py",
            "javascript" => "js",
            "typescript" => "ts",
            "latex" | "tex" => "tex",
            "shell" | "bash" | "zsh" => "sh",
            "htm" => "html",
            "yml" => "yaml",
            "markdown" => "md",
            other => other,
        };

        self.syntax_set
            .find_syntax_by_extension(extension)
            .or_else(|| self.syntax_set.find_syntax_by_name(language))
            .or_else(|| {
                self.syntax_set
                    .syntaxes()
                    .iter()
                    .find(|syntax| syntax.name.to_lowercase() == lang_lower)
            })
    }

    /// Highlight `code` into a layout job.
    ///
    /// Unknown languages and missing themes produce a single plain section
    /// in `fallback_color`.
    pub fn highlight(
        &self,
        code: &str,
        language: &str,
        theme_name: &str,
        font_id: FontId,
        fallback_color: Color32,
    ) -> LayoutJob {
        let mut job = LayoutJob::default();

        let (Some(syntax), Some(theme)) = (self.find_syntax(language), self.theme(theme_name))
        else {
            debug!("No highlighting for language {:?}", language);
            job.append(code, 0.0, TextFormat::simple(font_id, fallback_color));
            return job;
        };

        let mut highlighter = HighlightLines::new(syntax, theme);
        for line in LinesWithEndings::from(code) {
            match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => {
                    for (style, text) in ranges {
                        job.append(text, 0.0, style_to_format(style, font_id.clone()));
                    }
                }
                Err(e) => {
                    warn!("Failed to highlight line: {}", e);
                    job.append(line, 0.0, TextFormat::simple(font_id.clone(), fallback_color));
                }
            }
        }
        job
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Convert syntect Color to egui Color32.
pub fn syntect_to_egui_color(color: syntect::highlighting::Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

/// Convert a syntect Style to an egui text format.
fn style_to_format(style: Style, font_id: FontId) -> TextFormat {
    let color = syntect_to_egui_color(style.foreground);
    TextFormat {
        font_id,
        color,
        italics: style.font_style.contains(FontStyle::ITALIC),
        underline: if style.font_style.contains(FontStyle::UNDERLINE) {
            Stroke::new(1.0, color)
        } else {
            Stroke::NONE
        },
        ..Default::default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared Highlighter Instance
// ─────────────────────────────────────────────────────────────────────────────

static HIGHLIGHTER: OnceLock<SyntaxHighlighter> = OnceLock::new();

/// Get or create the shared, read-only syntax highlighter.
pub fn get_highlighter() -> &'static SyntaxHighlighter {
    HIGHLIGHTER.get_or_init(SyntaxHighlighter::new)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
