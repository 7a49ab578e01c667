//! Markdown editor widget
//!
//! Shows either the rendered preview or the HTML edit surface of an
//! [`EditorSession`], plus the Edit/Save toggle. The caller keeps the session
//! between frames and passes it in each frame.

use crate::config::{EditorStyle, PreviewStyle};
use crate::convert::{ChannelMount, SandboxMount};
use crate::editor::session::{EditorSession, SessionEvent};
use crate::editor::state::{ToggleOutcome, ViewState};
use crate::editor::surface::HtmlEditSurface;
use crate::markdown::syntax::FALLBACK_THEME;
use crate::markdown::MarkdownPreview;
use eframe::egui::{self, Button, Ui};
use std::time::Duration;

/// Repaint interval while waiting for the sandbox.
const CONVERSION_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Result of showing the editor for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownEditorOutput {
    /// State after this frame
    pub view_state: ViewState,
    /// Set when the toggle button was pressed
    pub toggled: Option<ToggleOutcome>,
    /// Outcome of a conversion that finished this frame
    pub event: Option<SessionEvent>,
    /// Whether the edit surface changed this frame
    pub surface_changed: bool,
}

impl MarkdownEditorOutput {
    /// Markdown stored by a save this frame, if any.
    pub fn saved(&self) -> Option<&str> {
        match &self.event {
            Some(SessionEvent::Saved(markdown)) => Some(markdown),
            _ => None,
        }
    }
}

/// # Example
///
/// ```ignore
/// let output = MarkdownEditor::new(&mut self.editor)
///     .initial_content(&self.document)
///     .read_only(self.locked)
///     .show(ui);
/// if let Some(markdown) = output.saved() {
///     self.document = markdown.to_string();
/// }
/// ```
pub struct MarkdownEditor<'a, M: ChannelMount = SandboxMount> {
    session: &'a mut EditorSession<M>,
    initial_content: Option<&'a str>,
    read_only: Option<bool>,
    editor_style: EditorStyle,
    preview_style: PreviewStyle,
    syntax_theme: &'a str,
    id: Option<egui::Id>,
}

impl<'a, M: ChannelMount> MarkdownEditor<'a, M> {
    pub fn new(session: &'a mut EditorSession<M>) -> Self {
        Self {
            session,
            initial_content: None,
            read_only: None,
            editor_style: EditorStyle::default(),
            preview_style: PreviewStyle::default(),
            syntax_theme: FALLBACK_THEME,
            id: None,
        }
    }

    /// Externally supplied content. A value different from the last one
    /// supplied overwrites the document.
    #[must_use]
    pub fn initial_content(mut self, content: &'a str) -> Self {
        self.initial_content = Some(content);
        self
    }

    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = Some(read_only);
        self
    }

    #[must_use]
    pub fn editor_style(mut self, style: EditorStyle) -> Self {
        self.editor_style = style;
        self
    }

    #[must_use]
    pub fn preview_style(mut self, style: PreviewStyle) -> Self {
        self.preview_style = style;
        self
    }

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

    pub fn show(self, ui: &mut Ui) -> MarkdownEditorOutput {
        let id = self.id.unwrap_or_else(|| ui.id().with("markdown_editor"));
        let session = self.session;

        if let Some(content) = self.initial_content {
            session.set_initial_content(content);
        }
        if let Some(read_only) = self.read_only {
            session.set_read_only(read_only);
        }

        let mut event = session.tick();
        let mut toggled = None;

        ui.horizontal(|ui| {
            let view_state = session.view_state();
            if !session.state().is_read_only() {
                let label = match view_state {
                    ViewState::Preview => "Edit",
                    ViewState::Editing | ViewState::Converting => "Save",
                };
                let enabled = view_state != ViewState::Converting;
                if ui.add_enabled(enabled, Button::new(label)).clicked() {
                    toggled = Some(session.toggle());
                }
            }
            if session.view_state() == ViewState::Converting {
                ui.spinner();
                ui.label("Converting…");
            }
            if let Some(error) = session.state().last_error() {
                ui.colored_label(ui.visuals().error_fg_color, error);
            }
        });

        // A save can complete inside the toggle itself
        if event.is_none() && toggled.is_some() {
            event = session.tick();
        }

        let mut surface_changed = false;
        match session.view_state() {
            ViewState::Preview => {
                MarkdownPreview::new(session.content(), session.preview_profile(), session.rules())
                    .style(self.preview_style)
                    .syntax_theme(self.syntax_theme)
                    .id(id.with("preview"))
                    .show(ui);
            }
            view_state @ (ViewState::Editing | ViewState::Converting) => {
                let mut html = session.state().live_html().to_string();
                let output = HtmlEditSurface::new(&mut html, &self.editor_style)
                    .syntax_theme(self.syntax_theme)
                    .interactive(view_state == ViewState::Editing)
                    .id(id.with("surface").with(session.state().edit_generation()))
                    .show(ui);
                if output.changed {
                    surface_changed = session.surface_changed(html);
                }
            }
        }

        let view_state = session.view_state();
        if view_state == ViewState::Converting {
            ui.ctx().request_repaint_after(CONVERSION_POLL_INTERVAL);
        }

        MarkdownEditorOutput {
            view_state,
            toggled,
            event,
            surface_changed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_accessor() {
        let output = MarkdownEditorOutput {
            view_state: ViewState::Preview,
            toggled: None,
            event: Some(SessionEvent::Saved("# Hi".to_string())),
            surface_changed: false,
        };
        assert_eq!(output.saved(), Some("# Hi"));

        let failed = MarkdownEditorOutput {
            event: Some(SessionEvent::ConversionFailed("boom".to_string())),
            ..output
        };
        assert_eq!(failed.saved(), None);
    }
}
