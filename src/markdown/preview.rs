//! Read-only markdown preview widget
//!
//! Parses the content with a math-enabled profile and paints the AST with
//! egui. Every node is offered to the [`RenderRules`] table first; math nodes
//! are painted from the adapter's [`MathView`](crate::math::MathView), all
//! other nodes take the regular rendering path below.

use crate::config::PreviewStyle;
use crate::markdown::syntax::{get_highlighter, FALLBACK_THEME};
use crate::markdown::{ListType, MarkdownNode, MarkdownNodeType, MarkdownProfile};
use crate::math::{MathPlacement, MathView, RenderRules};
use eframe::egui::{self, FontId, Frame, Grid, Response, RichText, ScrollArea, Ui, Vec2};

/// Left indent per nesting level.
const INDENT_STEP: f32 = 20.0;

// ─────────────────────────────────────────────────────────────────────────────
// Widget
// ─────────────────────────────────────────────────────────────────────────────

/// Paints markdown content as formatted, non-editable text.
///
/// # Example
///
/// ```ignore
/// MarkdownPreview::new(&content, &profile, &rules)
///     .style(settings.preview_style())
///     .syntax_theme(&settings.syntax_theme)
///     .show(ui);
/// ```
pub struct MarkdownPreview<'a> {
    content: &'a str,
    profile: &'a MarkdownProfile,
    rules: &'a RenderRules,
    style: PreviewStyle,
    syntax_theme: &'a str,
    id: Option<egui::Id>,
}

impl<'a> MarkdownPreview<'a> {
    pub fn new(content: &'a str, profile: &'a MarkdownProfile, rules: &'a RenderRules) -> Self {
        Self {
            content,
            profile,
            rules,
            style: PreviewStyle::default(),
            syntax_theme: FALLBACK_THEME,
            id: None,
        }
    }

    #[must_use]
    pub fn style(mut self, style: PreviewStyle) -> Self {
        self.style = style;
        self
    }

    /// Theme used to highlight fenced code blocks.
    #[must_use]
    pub fn syntax_theme(mut self, theme: &'a str) -> Self {
        self.syntax_theme = theme;
        self
    }

    #[must_use]
    pub fn id(mut self, id: egui::Id) -> Self {
        self.id = Some(id);
        self
    }

    pub fn show(self, ui: &mut Ui) -> Response {
        let id = self.id.unwrap_or_else(|| ui.id().with("preview"));
        let document = self.profile.parse(self.content);
        let ctx = RenderContext {
            rules: self.rules,
            style: &self.style,
            syntax_theme: self.syntax_theme,
        };

        Frame::none()
            .fill(self.style.background)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_source(id.with("scroll"))
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        render_node(ui, &document.root, &ctx, 0);
                    });
            })
            .response
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────────────────────────────────────

struct RenderContext<'a> {
    rules: &'a RenderRules,
    style: &'a PreviewStyle,
    syntax_theme: &'a str,
}

/// Accumulated inline formatting from enclosing nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct TextStyle {
    bold: bool,
    italic: bool,
    strikethrough: bool,
}

impl TextStyle {
    fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn with_italic(mut self) -> Self {
        self.italic = true;
        self
    }

    fn with_strikethrough(mut self) -> Self {
        self.strikethrough = true;
        self
    }

    fn apply(&self, mut text: RichText) -> RichText {
        if self.bold {
            text = text.strong();
        }
        if self.italic {
            text = text.italics();
        }
        if self.strikethrough {
            text = text.strikethrough();
        }
        text
    }
}

/// A paragraph split around display math.
#[derive(Debug)]
enum InlineSegment<'n> {
    /// Nodes that flow together on wrapped lines
    Flow(Vec<&'n MarkdownNode>),
    /// A `$$…$$` node that gets its own centered line
    Display(&'n MarkdownNode),
}

/// Split inline children so display math breaks out of the text flow.
fn split_display_math(children: &[MarkdownNode]) -> Vec<InlineSegment<'_>> {
    let mut segments = Vec::new();
    let mut flow = Vec::new();

    for child in children {
        if matches!(child.node_type, MarkdownNodeType::Math { display: true, .. }) {
            if !flow.is_empty() {
                segments.push(InlineSegment::Flow(std::mem::take(&mut flow)));
            }
            segments.push(InlineSegment::Display(child));
        } else {
            flow.push(child);
        }
    }
    if !flow.is_empty() {
        segments.push(InlineSegment::Flow(flow));
    }
    segments
}

/// Heading size relative to body text.
fn heading_scale(level: u8) -> f32 {
    match level {
        1 => 2.0,
        2 => 1.6,
        3 => 1.3,
        4 => 1.15,
        5 => 1.0,
        _ => 0.9,
    }
}

/// Marker text for the item at `index` in a list.
fn list_marker(list_type: ListType, index: usize) -> String {
    match list_type {
        ListType::Bullet => "•".to_string(),
        ListType::Ordered { start, delimiter } => {
            format!("{}{}", start as usize + index, delimiter)
        }
    }
}

fn render_node(ui: &mut Ui, node: &MarkdownNode, ctx: &RenderContext<'_>, indent_level: usize) {
    if let Some(view) = ctx.rules.dispatch(node) {
        view.show(ui, ctx.style.text_color);
        return;
    }

    match &node.node_type {
        MarkdownNodeType::Document => {
            for child in &node.children {
                render_node(ui, child, ctx, indent_level);
            }
        }
        MarkdownNodeType::Heading(level) => {
            ui.add_space(6.0);
            let size = ctx.style.font_size * heading_scale(*level);
            render_inline_children(ui, &node.children, ctx, size, TextStyle::default().with_bold());
            ui.add_space(4.0);
        }
        MarkdownNodeType::Paragraph => {
            render_inline_children(ui, &node.children, ctx, ctx.style.font_size, TextStyle::default());
            ui.add_space(4.0);
        }
        MarkdownNodeType::CodeBlock { language, literal } => {
            render_code_block(ui, ctx, language, literal);
        }
        MarkdownNodeType::BlockQuote => render_blockquote(ui, node, ctx, indent_level),
        MarkdownNodeType::List { list_type, .. } => {
            render_list(ui, node, ctx, indent_level, *list_type);
        }
        MarkdownNodeType::ThematicBreak => render_thematic_break(ui, ctx),
        MarkdownNodeType::Table => render_table(ui, node, ctx),
        MarkdownNodeType::HtmlBlock(html) => {
            ui.label(
                RichText::new(html.trim_end())
                    .font(FontId::monospace(ctx.style.font_size * 0.9))
                    .color(ctx.style.muted),
            );
        }
        // Handled by their parents
        MarkdownNodeType::Item
        | MarkdownNodeType::TaskItem { .. }
        | MarkdownNodeType::TableRow { .. }
        | MarkdownNodeType::TableCell => {}
        _ => {
            let text = node.text_content();
            if !text.is_empty() {
                ui.label(RichText::new(text).color(ctx.style.text_color));
            }
        }
    }
}

/// Render a run of inline nodes, breaking out display math.
fn render_inline_children(
    ui: &mut Ui,
    children: &[MarkdownNode],
    ctx: &RenderContext<'_>,
    font_size: f32,
    style: TextStyle,
) {
    for segment in split_display_math(children) {
        match segment {
            InlineSegment::Flow(nodes) => {
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing.x = 0.0;
                    for node in nodes {
                        render_inline_node(ui, node, ctx, font_size, style);
                    }
                });
            }
            InlineSegment::Display(node) => render_node(ui, node, ctx, 0),
        }
    }
}

/// Render a single inline node. `style` carries formatting from parent nodes.
fn render_inline_node(
    ui: &mut Ui,
    node: &MarkdownNode,
    ctx: &RenderContext<'_>,
    font_size: f32,
    style: TextStyle,
) {
    if let Some(view) = ctx.rules.dispatch(node) {
        // Display math nested inside emphasis or links stays in the flow
        let view = MathView {
            placement: MathPlacement::Inline,
            vertical_margin: 0.0,
            ..view
        };
        view.show(ui, ctx.style.text_color);
        return;
    }

    match &node.node_type {
        MarkdownNodeType::Text(text) => {
            let rich = RichText::new(text)
                .size(font_size)
                .color(ctx.style.text_color);
            ui.label(style.apply(rich));
        }
        MarkdownNodeType::Strong => {
            for child in &node.children {
                render_inline_node(ui, child, ctx, font_size, style.with_bold());
            }
        }
        MarkdownNodeType::Emphasis => {
            for child in &node.children {
                render_inline_node(ui, child, ctx, font_size, style.with_italic());
            }
        }
        MarkdownNodeType::Strikethrough => {
            for child in &node.children {
                render_inline_node(ui, child, ctx, font_size, style.with_strikethrough());
            }
        }
        MarkdownNodeType::Code(code) => {
            ui.label(
                RichText::new(code)
                    .font(FontId::monospace(font_size * 0.9))
                    .color(ctx.style.text_color)
                    .background_color(ctx.style.code_background),
            );
        }
        MarkdownNodeType::Link { url, title } => {
            let label = style.apply(
                RichText::new(node.text_content())
                    .size(font_size)
                    .color(ctx.style.link_color),
            );
            let response = ui.hyperlink_to(label, url);
            if !title.is_empty() {
                response.on_hover_text(title);
            }
        }
        MarkdownNodeType::Image { url, .. } => {
            let alt = node.text_content();
            let text = if alt.is_empty() {
                "[image]".to_string()
            } else {
                format!("[image: {}]", alt)
            };
            ui.label(RichText::new(text).size(font_size).color(ctx.style.muted))
                .on_hover_text(url);
        }
        MarkdownNodeType::HtmlInline(html) => {
            ui.label(
                RichText::new(html)
                    .font(FontId::monospace(font_size * 0.9))
                    .color(ctx.style.muted),
            );
        }
        MarkdownNodeType::SoftBreak => {
            ui.label(RichText::new(" ").size(font_size));
        }
        MarkdownNodeType::LineBreak => {
            ui.end_row();
        }
        _ => {
            for child in &node.children {
                render_inline_node(ui, child, ctx, font_size, style);
            }
        }
    }
}

fn render_code_block(ui: &mut Ui, ctx: &RenderContext<'_>, language: &str, literal: &str) {
    let job = get_highlighter().highlight(
        literal.trim_end_matches('\n'),
        language,
        ctx.syntax_theme,
        FontId::monospace(ctx.style.font_size * 0.9),
        ctx.style.text_color,
    );

    Frame::none()
        .fill(ctx.style.code_background)
        .inner_margin(8.0)
        .rounding(4.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(job);
        });
    ui.add_space(4.0);
}

fn render_blockquote(ui: &mut Ui, node: &MarkdownNode, ctx: &RenderContext<'_>, indent_level: usize) {
    ui.horizontal(|ui| {
        let (rect, _) =
            ui.allocate_exact_size(Vec2::new(4.0, ui.available_height()), egui::Sense::hover());
        ui.painter().rect_filled(rect, 0.0, ctx.style.muted);

        ui.add_space(8.0);

        ui.vertical(|ui| {
            for child in &node.children {
                render_node(ui, child, ctx, indent_level + 1);
            }
        });
    });
}

fn render_list(
    ui: &mut Ui,
    node: &MarkdownNode,
    ctx: &RenderContext<'_>,
    indent_level: usize,
    list_type: ListType,
) {
    for (index, item) in node.children.iter().enumerate() {
        let marker = match item.node_type {
            MarkdownNodeType::TaskItem { checked: true } => "☑".to_string(),
            MarkdownNodeType::TaskItem { checked: false } => "☐".to_string(),
            _ => list_marker(list_type, index),
        };

        ui.horizontal_top(|ui| {
            ui.add_space(indent_level as f32 * INDENT_STEP);
            ui.label(
                RichText::new(marker)
                    .size(ctx.style.font_size)
                    .color(ctx.style.muted),
            );
            ui.vertical(|ui| {
                for child in &item.children {
                    render_node(ui, child, ctx, indent_level + 1);
                }
            });
        });
    }
    ui.add_space(4.0);
}

fn render_thematic_break(ui: &mut Ui, ctx: &RenderContext<'_>) {
    ui.add_space(4.0);
    let (rect, _) =
        ui.allocate_exact_size(Vec2::new(ui.available_width(), 1.0), egui::Sense::hover());
    ui.painter().rect_filled(rect, 0.0, ctx.style.muted);
    ui.add_space(4.0);
}

fn render_table(ui: &mut Ui, node: &MarkdownNode, ctx: &RenderContext<'_>) {
    Grid::new(ui.id().with("table").with(node.start_line))
        .striped(true)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            for row in &node.children {
                let header = matches!(row.node_type, MarkdownNodeType::TableRow { header: true });
                let style = if header {
                    TextStyle::default().with_bold()
                } else {
                    TextStyle::default()
                };
                for cell in &row.children {
                    ui.horizontal_wrapped(|ui| {
                        ui.spacing_mut().item_spacing.x = 0.0;
                        for child in &cell.children {
                            render_inline_node(ui, child, ctx, ctx.style.font_size, style);
                        }
                    });
                }
                ui.end_row();
            }
        });
    ui.add_space(4.0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{render_latex_block, render_latex_inline};
    use std::cell::RefCell;

    thread_local! {
        static CALLS: RefCell<Vec<(&'static str, String)>> = const { RefCell::new(Vec::new()) };
    }

    fn recording_inline(content: &str) -> MathView {
        CALLS.with(|c| c.borrow_mut().push(("inline", content.to_string())));
        render_latex_inline(content)
    }

    fn recording_block(content: &str) -> MathView {
        CALLS.with(|c| c.borrow_mut().push(("block", content.to_string())));
        render_latex_block(content)
    }

    fn take_calls() -> Vec<(&'static str, String)> {
        CALLS.with(|c| std::mem::take(&mut *c.borrow_mut()))
    }

    /// Render `markdown` for one headless frame and return the adapter calls.
    fn render_frame(markdown: &str) -> Vec<(&'static str, String)> {
        take_calls();
        let profile = MarkdownProfile::with_math();
        let rules = RenderRules::with_adapters(recording_inline, recording_block);
        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                MarkdownPreview::new(markdown, &profile, &rules).show(ui);
            });
        });
        take_calls()
    }

    fn first_paragraph(markdown: &str) -> MarkdownNode {
        let doc = MarkdownProfile::with_math().parse(markdown);
        doc.root
            .find(&|n| n.node_type == MarkdownNodeType::Paragraph)
            .cloned()
            .expect("paragraph")
    }

    #[test]
    fn test_split_keeps_plain_paragraph_together() {
        let para = first_paragraph("Just $x$ inline");
        let segments = split_display_math(&para.children);
        assert_eq!(segments.len(), 1);
        assert!(matches!(segments[0], InlineSegment::Flow(_)));
    }

    #[test]
    fn test_split_breaks_out_display_math() {
        let para = first_paragraph("Before $$x^2$$ after");
        let segments = split_display_math(&para.children);
        assert_eq!(segments.len(), 3);
        assert!(matches!(segments[0], InlineSegment::Flow(_)));
        match &segments[1] {
            InlineSegment::Display(node) => assert_eq!(
                node.node_type,
                MarkdownNodeType::Math {
                    display: true,
                    literal: "x^2".to_string()
                }
            ),
            other => panic!("Expected display math, got {:?}", other),
        }
        assert!(matches!(segments[2], InlineSegment::Flow(_)));
    }

    #[test]
    fn test_split_display_only() {
        let para = first_paragraph("$$a$$");
        let segments = split_display_math(&para.children);
        assert_eq!(segments.len(), 1);
        assert!(matches!(segments[0], InlineSegment::Display(_)));
    }

    #[test]
    fn test_heading_scale_decreases() {
        for level in 1..6u8 {
            assert!(heading_scale(level) >= heading_scale(level + 1));
        }
    }

    #[test]
    fn test_list_markers() {
        assert_eq!(list_marker(ListType::Bullet, 3), "•");
        let ordered = ListType::Ordered {
            start: 3,
            delimiter: ')',
        };
        assert_eq!(list_marker(ordered, 0), "3)");
        assert_eq!(list_marker(ordered, 2), "5)");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Headless rendering
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_display_math_renders_through_block_adapter() {
        assert_eq!(render_frame("$$x^2$$"), vec![("block", "x^2".to_string())]);
    }

    #[test]
    fn test_inline_math_renders_through_inline_adapter() {
        assert_eq!(
            render_frame("Area is $r^2$ here"),
            vec![("inline", "r^2".to_string())]
        );
    }

    #[test]
    fn test_mixed_paragraph_renders_each_math_once() {
        assert_eq!(
            render_frame("Let $a$ be\n\n$$a + b$$"),
            vec![("inline", "a".to_string()), ("block", "a + b".to_string())]
        );
    }

    #[test]
    fn test_text_style_accumulates() {
        let style = TextStyle::default().with_bold().with_italic();
        assert!(style.bold && style.italic && !style.strikethrough);
    }
}
