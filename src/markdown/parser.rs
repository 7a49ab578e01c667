//! Markdown parser profiles using comrak
//!
//! A `MarkdownProfile` is an immutable parser configuration. Each editor
//! session builds two of them: one with dollar math enabled for the preview,
//! and one without math for seeding the HTML edit surface.

use comrak::{
    markdown_to_html,
    nodes::{AstNode, ListDelimType, ListType as ComrakListType, NodeValue},
    parse_document, Arena, Options,
};

// ─────────────────────────────────────────────────────────────────────────────
// Options
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration options for markdown parsing and rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Enable GitHub Flavored Markdown tables
    pub tables: bool,
    /// Enable strikethrough syntax (~~text~~)
    pub strikethrough: bool,
    /// Enable autolink URLs and emails
    pub autolink: bool,
    /// Enable task lists (- [ ] and - [x])
    pub tasklist: bool,
    /// Recognize `$...$` and `$$...$$` as math
    pub math: bool,
    /// Escape raw HTML in the source instead of passing it through
    pub safe_html: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            autolink: true,
            tasklist: true,
            math: true,
            safe_html: true,
        }
    }
}

impl MarkdownOptions {
    /// Convert to comrak Options.
    fn to_comrak_options(&self) -> Options {
        let mut options = Options::default();

        options.extension.strikethrough = self.strikethrough;
        options.extension.table = self.tables;
        options.extension.autolink = self.autolink;
        options.extension.tasklist = self.tasklist;
        options.extension.math_dollars = self.math;

        options.render.unsafe_ = !self.safe_html;

        options
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AST Types
// ─────────────────────────────────────────────────────────────────────────────

/// List type (ordered or unordered)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListType {
    Bullet,
    Ordered { start: u32, delimiter: char },
}

/// Represents the type of a markdown node.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkdownNodeType {
    Document,
    BlockQuote,
    List { list_type: ListType, tight: bool },
    Item,
    CodeBlock { language: String, literal: String },
    HtmlBlock(String),
    Paragraph,
    /// Heading level 1-6
    Heading(u8),
    ThematicBreak,
    Table,
    TableRow { header: bool },
    TableCell,
    Text(String),
    TaskItem { checked: bool },
    SoftBreak,
    LineBreak,
    Code(String),
    HtmlInline(String),
    Emphasis,
    Strong,
    Strikethrough,
    Link { url: String, title: String },
    Image { url: String, title: String },
    /// Dollar math; `display` is true for `$$...$$`
    Math { display: bool, literal: String },
    /// Anything the preview has no dedicated rendering for
    Other,
}

/// A node in the markdown AST with position information.
#[derive(Debug, Clone)]
pub struct MarkdownNode {
    /// The type of this node
    pub node_type: MarkdownNodeType,
    /// Child nodes
    pub children: Vec<MarkdownNode>,
    /// Start line in source (1-indexed)
    pub start_line: usize,
}

impl MarkdownNode {
    /// Get all text content from this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, output: &mut String) {
        match &self.node_type {
            MarkdownNodeType::Text(t) | MarkdownNodeType::Code(t) => output.push_str(t),
            MarkdownNodeType::Math { literal, .. } => output.push_str(literal),
            MarkdownNodeType::SoftBreak => output.push(' '),
            MarkdownNodeType::LineBreak => output.push('\n'),
            _ => {}
        }
        for child in &self.children {
            child.collect_text(output);
        }
    }

    /// Depth-first search for the first node matching `pred`.
    pub fn find(&self, pred: &impl Fn(&MarkdownNode) -> bool) -> Option<&MarkdownNode> {
        if pred(self) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(pred))
    }
}

/// A parsed markdown document.
#[derive(Debug, Clone)]
pub struct MarkdownDocument {
    /// Root node of the AST
    pub root: MarkdownNode,
}

// ─────────────────────────────────────────────────────────────────────────────
// Profiles
// ─────────────────────────────────────────────────────────────────────────────

/// An immutable parser configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownProfile {
    options: MarkdownOptions,
}

impl MarkdownProfile {
    /// Create a profile from explicit options.
    pub fn new(options: MarkdownOptions) -> Self {
        Self { options }
    }

    /// Profile used by the preview: dollar math enabled.
    pub fn with_math() -> Self {
        Self::new(MarkdownOptions::default())
    }

    /// Profile used to seed the edit surface: math spans stay plain text.
    pub fn plain() -> Self {
        Self::new(MarkdownOptions {
            math: false,
            ..MarkdownOptions::default()
        })
    }

    /// The options this profile was built with.
    pub fn options(&self) -> &MarkdownOptions {
        &self.options
    }

    /// Whether dollar math is recognized.
    pub fn supports_math(&self) -> bool {
        self.options.math
    }

    /// Parse markdown text into an AST document.
    ///
    /// comrak accepts any input, so parsing cannot fail.
    pub fn parse(&self, markdown: &str) -> MarkdownDocument {
        let arena = Arena::new();
        let root = parse_document(&arena, markdown, &self.options.to_comrak_options());
        MarkdownDocument {
            root: convert_node(root),
        }
    }

    /// Render markdown to an HTML fragment.
    pub fn render_html(&self, markdown: &str) -> String {
        markdown_to_html(markdown, &self.options.to_comrak_options())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal Conversion Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Convert a comrak AST node to our MarkdownNode structure.
fn convert_node<'a>(node: &'a AstNode<'a>) -> MarkdownNode {
    let ast = node.data.borrow();

    MarkdownNode {
        node_type: convert_node_value(&ast.value),
        children: node.children().map(convert_node).collect(),
        start_line: ast.sourcepos.start.line,
    }
}

/// Convert a comrak NodeValue to our MarkdownNodeType.
fn convert_node_value(value: &NodeValue) -> MarkdownNodeType {
    match value {
        NodeValue::Document => MarkdownNodeType::Document,
        NodeValue::BlockQuote => MarkdownNodeType::BlockQuote,
        NodeValue::List(list) => {
            let list_type = match list.list_type {
                ComrakListType::Bullet => ListType::Bullet,
                ComrakListType::Ordered => ListType::Ordered {
                    start: list.start as u32,
                    delimiter: if list.delimiter == ListDelimType::Period {
                        '.'
                    } else {
                        ')'
                    },
                },
            };
            MarkdownNodeType::List {
                list_type,
                tight: list.tight,
            }
        }
        NodeValue::Item(_) => MarkdownNodeType::Item,
        NodeValue::CodeBlock(code) => MarkdownNodeType::CodeBlock {
            language: code.info.split_whitespace().next().unwrap_or("").to_string(),
            literal: code.literal.clone(),
        },
        NodeValue::HtmlBlock(html) => MarkdownNodeType::HtmlBlock(html.literal.clone()),
        NodeValue::Paragraph => MarkdownNodeType::Paragraph,
        NodeValue::Heading(heading) => MarkdownNodeType::Heading(heading.level.clamp(1, 6)),
        NodeValue::ThematicBreak => MarkdownNodeType::ThematicBreak,
        NodeValue::Table(_) => MarkdownNodeType::Table,
        NodeValue::TableRow(header) => MarkdownNodeType::TableRow { header: *header },
        NodeValue::TableCell => MarkdownNodeType::TableCell,
        NodeValue::Text(text) => MarkdownNodeType::Text(text.clone()),
        NodeValue::TaskItem(checked) => MarkdownNodeType::TaskItem {
            checked: checked.map(|c| c == 'x' || c == 'X').unwrap_or(false),
        },
        NodeValue::SoftBreak => MarkdownNodeType::SoftBreak,
        NodeValue::LineBreak => MarkdownNodeType::LineBreak,
        NodeValue::Code(code) => MarkdownNodeType::Code(code.literal.clone()),
        NodeValue::HtmlInline(html) => MarkdownNodeType::HtmlInline(html.clone()),
        NodeValue::Emph => MarkdownNodeType::Emphasis,
        NodeValue::Strong => MarkdownNodeType::Strong,
        NodeValue::Strikethrough => MarkdownNodeType::Strikethrough,
        NodeValue::Link(link) => MarkdownNodeType::Link {
            url: link.url.clone(),
            title: link.title.clone(),
        },
        NodeValue::Image(image) => MarkdownNodeType::Image {
            url: image.url.clone(),
            title: image.title.clone(),
        },
        NodeValue::Math(math) => MarkdownNodeType::Math {
            display: math.display_math,
            literal: math.literal.clone(),
        },
        _ => MarkdownNodeType::Other,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn is_math(node: &MarkdownNode) -> bool {
        matches!(node.node_type, MarkdownNodeType::Math { .. })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Basic Parsing Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_empty_document() {
        let doc = MarkdownProfile::with_math().parse("");
        assert!(doc.root.children.is_empty());
    }

    #[test]
    fn test_parse_heading_level() {
        let doc = MarkdownProfile::with_math().parse("## Heading 2");
        assert_eq!(doc.root.children[0].node_type, MarkdownNodeType::Heading(2));
    }

    #[test]
    fn test_parse_ordered_list() {
        let doc = MarkdownProfile::with_math().parse("3. Third\n4. Fourth");
        let list = &doc.root.children[0];
        match &list.node_type {
            MarkdownNodeType::List {
                list_type: ListType::Ordered { start, delimiter },
                ..
            } => {
                assert_eq!(*start, 3);
                assert_eq!(*delimiter, '.');
            }
            other => panic!("Expected ordered list, got {:?}", other),
        }
        assert_eq!(list.children.len(), 2);
    }

    #[test]
    fn test_code_block_language_is_first_word() {
        let doc = MarkdownProfile::with_math().parse("```rust ignore\nfn main() {}\n```");
        match &doc.root.children[0].node_type {
            MarkdownNodeType::CodeBlock { language, literal } => {
                assert_eq!(language, "rust");
                assert_eq!(literal, "fn main() {}\n");
            }
            other => panic!("Expected code block, got {:?}", other),
        }
    }

    #[test]
    fn test_text_content() {
        let doc = MarkdownProfile::with_math().parse("Hello **world**!");
        let text = doc.root.text_content();
        assert!(text.contains("Hello"));
        assert!(text.contains("world"));
    }

    #[test]
    fn test_source_position() {
        let doc = MarkdownProfile::with_math().parse("# Heading\n\nParagraph");
        assert_eq!(doc.root.children[0].start_line, 1);
        assert_eq!(doc.root.children[1].start_line, 3);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Math Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_inline_math() {
        let doc = MarkdownProfile::with_math().parse("Energy $E = mc^2$ here");
        let math = doc.root.find(&is_math).expect("math node");
        assert_eq!(
            math.node_type,
            MarkdownNodeType::Math {
                display: false,
                literal: "E = mc^2".to_string()
            }
        );
    }

    #[test]
    fn test_parse_display_math() {
        let doc = MarkdownProfile::with_math().parse("$$x^2$$");
        let math = doc.root.find(&is_math).expect("math node");
        assert_eq!(
            math.node_type,
            MarkdownNodeType::Math {
                display: true,
                literal: "x^2".to_string()
            }
        );
    }

    #[test]
    fn test_plain_profile_keeps_dollars_as_text() {
        let profile = MarkdownProfile::plain();
        assert!(!profile.supports_math());

        let doc = profile.parse("Energy $E = mc^2$ here");
        assert!(doc.root.find(&is_math).is_none());
        assert!(doc.root.text_content().contains("$E = mc^2$"));
    }

    #[test]
    fn test_profiles_are_independent() {
        let with_math = MarkdownProfile::with_math();
        let plain = MarkdownProfile::plain();
        assert_ne!(with_math, plain);
        assert!(with_math.options().math);
        assert!(!plain.options().math);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // HTML Rendering Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_render_html_plain_keeps_math_source() {
        let html = MarkdownProfile::plain().render_html("A $\\alpha$ value");
        assert!(html.starts_with("<p>"));
        assert!(html.contains("$\\alpha$"));
    }

    #[test]
    fn test_render_html_formats_inline_markup() {
        let html = MarkdownProfile::plain().render_html("# Title\n\n**bold**");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_render_html_escapes_raw_html() {
        let html = MarkdownProfile::plain().render_html("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_parse_malformed_markdown() {
        let profile = MarkdownProfile::with_math();
        for input in ["```\nunclosed", "| broken | table", "$unclosed math", "$$"] {
            let _ = profile.parse(input);
        }
    }
}
