//! Math render adapters.
//!
//! `render_latex_inline` and `render_latex_block` map a LaTeX string to a
//! [`MathView`], the visual node the preview paints. The adapters only pick
//! placement and sizing; the glyph layout itself belongs to a [`Typesetter`].
//! Malformed markup is passed through untouched.

use eframe::egui::text::{LayoutJob, TextFormat};
use eframe::egui::{Align, Color32, FontId, Layout, Response, Ui};

/// Inline math font size in points.
pub const INLINE_FONT_SIZE: f32 = 16.0;
/// Inline math line height in points.
pub const INLINE_LINE_HEIGHT: f32 = 22.0;
/// Block math font size in points.
pub const BLOCK_FONT_SIZE: f32 = 20.0;
/// Block math line height in points.
pub const BLOCK_LINE_HEIGHT: f32 = 28.0;
/// Space above and below block math.
pub const BLOCK_VERTICAL_MARGIN: f32 = 10.0;

/// Where a math node sits in the document flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathPlacement {
    /// Baseline-aligned within a line of text
    Inline,
    /// Centered on its own line
    Block,
}

/// A math node ready to paint.
#[derive(Debug, Clone, PartialEq)]
pub struct MathView {
    pub markup: String,
    pub placement: MathPlacement,
    pub font_size: f32,
    pub line_height: f32,
    pub vertical_margin: f32,
}

/// Lays out math markup as text.
pub trait Typesetter {
    fn typeset(&self, view: &MathView, color: Color32) -> LayoutJob;
}

/// Lays the markup out verbatim in italics at the view's size.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTypesetter;

impl Typesetter for PlainTypesetter {
    fn typeset(&self, view: &MathView, color: Color32) -> LayoutJob {
        let mut job = LayoutJob::default();
        view.append_to(&mut job, color);
        job
    }
}

/// Inline math: compact and baseline aligned.
pub fn render_latex_inline(markup: &str) -> MathView {
    MathView {
        markup: markup.to_string(),
        placement: MathPlacement::Inline,
        font_size: INLINE_FONT_SIZE,
        line_height: INLINE_LINE_HEIGHT,
        vertical_margin: 0.0,
    }
}

/// Block math: larger, centered, with vertical spacing.
pub fn render_latex_block(markup: &str) -> MathView {
    MathView {
        markup: markup.to_string(),
        placement: MathPlacement::Block,
        font_size: BLOCK_FONT_SIZE,
        line_height: BLOCK_LINE_HEIGHT,
        vertical_margin: BLOCK_VERTICAL_MARGIN,
    }
}

impl MathView {
    /// The text format used for this node.
    pub fn text_format(&self, color: Color32) -> TextFormat {
        TextFormat {
            font_id: FontId::proportional(self.font_size),
            line_height: Some(self.line_height),
            color,
            italics: true,
            valign: Align::BOTTOM,
            ..Default::default()
        }
    }

    /// Append this node to a paragraph being laid out, so inline math flows
    /// with the surrounding text.
    pub fn append_to(&self, job: &mut LayoutJob, color: Color32) {
        job.append(&self.markup, 0.0, self.text_format(color));
    }

    /// Paint this node on its own with the given typesetter.
    pub fn show_with(&self, ui: &mut Ui, typesetter: &dyn Typesetter, color: Color32) -> Response {
        let job = typesetter.typeset(self, color);
        match self.placement {
            MathPlacement::Inline => ui.label(job),
            MathPlacement::Block => {
                ui.add_space(self.vertical_margin);
                let response = ui
                    .with_layout(Layout::top_down(Align::Center), |ui| ui.label(job))
                    .inner;
                ui.add_space(self.vertical_margin);
                response
            }
        }
    }

    /// Paint this node with the [`PlainTypesetter`].
    pub fn show(&self, ui: &mut Ui, color: Color32) -> Response {
        self.show_with(ui, &PlainTypesetter, color)
    }
}
