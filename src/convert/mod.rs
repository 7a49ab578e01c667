//! HTML to Markdown conversion
//!
//! The edit surface produces HTML; the preview needs markdown. Conversion
//! runs in an isolated sandbox (see [`sandbox`]) behind a one-shot
//! request/response channel, and the result goes through an escape fixup
//! for math spans (see [`fixup`]).
//!
//! The [`ConversionChannel`] and [`ChannelMount`] traits are the seam the
//! editor session talks to, so a session can run against the real sandbox
//! or against any other channel implementation.

mod fixup;
pub mod sandbox;

use crate::error::Result;

pub use fixup::fix_math_escapes;
pub use sandbox::{ConverterFactory, Html2MdConverter, HtmlToMarkdown, SandboxChannel, SandboxMount};

/// One in-flight HTML to Markdown request.
///
/// A channel answers at most once. After [`cancel`](Self::cancel) it never
/// answers.
pub trait ConversionChannel {
    /// Provide the HTML to convert. Before the far side is ready only the
    /// latest value is kept; once the request is sent later values are ignored.
    fn post_html(&mut self, html: &str);

    /// Non-blocking check for the outcome.
    fn poll(&mut self) -> Option<Result<String>>;

    /// Drop the request. Any answer still on its way is discarded.
    fn cancel(&mut self);
}

/// Creates a fresh channel each time a conversion starts.
pub trait ChannelMount {
    type Channel: ConversionChannel;

    fn mount(&self) -> Self::Channel;
}
