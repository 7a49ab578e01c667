//! HTML edit surface
//!
//! A multiline `TextEdit` over the surface HTML, highlighted as HTML with
//! syntect and painted in the configured editor style.

use crate::config::EditorStyle;
use crate::markdown::syntax::{get_highlighter, FALLBACK_THEME};
use eframe::egui::{self, FontId, Frame, TextEdit, Ui};
use std::sync::Arc;

/// Result of showing the edit surface.
pub struct SurfaceOutput {
    /// Whether the HTML was modified this frame.
    pub changed: bool,
    pub response: egui::Response,
}

pub struct HtmlEditSurface<'a> {
    html: &'a mut String,
    style: &'a EditorStyle,
    syntax_theme: &'a str,
    interactive: bool,
    id: Option<egui::Id>,
}

impl<'a> HtmlEditSurface<'a> {
    pub fn new(html: &'a mut String, style: &'a EditorStyle) -> Self {
        Self {
            html,
            style,
            syntax_theme: FALLBACK_THEME,
            interactive: true,
            id: None,
        }
    }

    #[must_use]
    pub fn syntax_theme(mut self, theme: &'a str) -> Self {
        self.syntax_theme = theme;
        self
    }

    /// Lock the surface while a save is being converted.
    #[must_use]
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    #[must_use]
    pub fn id(mut self, id: egui::Id) -> Self {
        self.id = Some(id);
        self
    }

    pub fn show(self, ui: &mut Ui) -> SurfaceOutput {
        let id = self.id.unwrap_or_else(|| ui.id().with("html_surface"));
        let font_size = self.style.font_size;
        let text_color = self.style.text_color;
        let theme = self.syntax_theme;

        let mut layouter = move |ui: &Ui, text: &str, wrap_width: f32| -> Arc<egui::Galley> {
            let mut job = get_highlighter().highlight(
                text,
                "html",
                theme,
                FontId::monospace(font_size),
                text_color,
            );
            job.wrap.max_width = wrap_width;
            ui.fonts(|f| f.layout_job(job))
        };

        let inner = Frame::none()
            .fill(self.style.background)
            .inner_margin(8.0)
            .show(ui, |ui| {
                TextEdit::multiline(self.html)
                    .id(id)
                    .frame(false)
                    .hint_text(self.style.placeholder.as_str())
                    .font(FontId::monospace(font_size))
                    .desired_width(f32::INFINITY)
                    .desired_rows(12)
                    .interactive(self.interactive)
                    .layouter(&mut layouter)
                    .show(ui)
                    .response
            });

        SurfaceOutput {
            changed: inner.inner.changed(),
            response: inner.response,
        }
    }
}
