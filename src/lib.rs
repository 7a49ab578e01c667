//! mathdown - a markdown editor widget for egui
//!
//! The widget toggles between a rendered preview, with inline (`$…$`) and
//! block (`$$…$$`) math, and an HTML edit surface. Saving converts the
//! surface HTML back to markdown inside an isolated sandbox thread.
//!
//! # Example
//! ```ignore
//! use mathdown::{EditorSettings, MarkdownEditor, MarkdownEditorState};
//!
//! let settings = EditorSettings::default();
//! let mut state = MarkdownEditorState::from_settings(&settings)
//!     .on_content_change(|markdown| println!("saved: {markdown}"));
//!
//! // Each frame:
//! MarkdownEditor::new(&mut state).show(ui);
//! ```

pub mod config;
pub mod convert;
pub mod editor;
pub mod error;
pub mod markdown;
pub mod math;

pub use config::{load_config, save_config, EditorSettings, EditorStyle, PreviewStyle};
pub use editor::{MarkdownEditor, MarkdownEditorOutput, MarkdownEditorState};
pub use error::{Error, Result};
