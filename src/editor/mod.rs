//! Markdown editor component
//!
//! - [`state`]: the Preview / Editing / Converting state machine
//! - [`session`]: the state machine wired to a conversion channel
//! - [`surface`] and [`widget`]: egui rendering

pub mod session;
pub mod state;
mod surface;
mod widget;

pub use session::{EditorSession, MarkdownEditorState, SessionEvent};
pub use state::{EditorState, ToggleOutcome, ViewState};
pub use surface::{HtmlEditSurface, SurfaceOutput};
pub use widget::{MarkdownEditor, MarkdownEditorOutput};
