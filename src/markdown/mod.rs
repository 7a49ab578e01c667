//! Markdown parsing, preview rendering, and syntax highlighting
//!
//! Parsing is done with comrak, a CommonMark + GFM compatible parser, through
//! explicit [`MarkdownProfile`]s. The preview paints the parsed AST with egui
//! and routes math nodes through the render-rule table in [`crate::math`].
//!
//! # Example
//! ```ignore
//! use mathdown::markdown::{MarkdownPreview, MarkdownProfile};
//! use mathdown::math::RenderRules;
//!
//! let profile = MarkdownProfile::with_math();
//! let rules = RenderRules::math();
//! MarkdownPreview::new("Energy $E = mc^2$", &profile, &rules).show(ui);
//!
//! let html = MarkdownProfile::plain().render_html("**bold**");
//! ```

mod parser;
pub mod preview;
pub mod syntax;

pub use parser::{
    ListType, MarkdownDocument, MarkdownNode, MarkdownNodeType, MarkdownOptions, MarkdownProfile,
};
pub use preview::MarkdownPreview;
pub use syntax::{get_highlighter, SyntaxHighlighter};
