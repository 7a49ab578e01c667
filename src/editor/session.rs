//! Editor session: the view-state machine wired to a conversion channel
//!
//! A session owns one [`EditorState`], the two parser profiles, the render
//! rules and at most one mounted [`ConversionChannel`]. The channel is
//! mounted while HTML is pending conversion and dropped (cancelled) as soon
//! as nothing is pending, so a late answer from an abandoned conversion can
//! never reach the state.

use crate::config::EditorSettings;
use crate::convert::{ChannelMount, ConversionChannel, ConverterFactory, SandboxMount};
use crate::editor::state::{EditorState, ToggleOutcome, ViewState};
use crate::markdown::MarkdownProfile;
use crate::math::RenderRules;
use log::{debug, info, warn};
use std::fmt;

/// Something the host may want to react to after a [`EditorSession::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Conversion finished; carries the stored markdown
    Saved(String),
    /// Conversion failed; the editor is back on the edit surface
    ConversionFailed(String),
}

type ContentCallback = Box<dyn FnMut(&str)>;

pub struct EditorSession<M: ChannelMount> {
    state: EditorState,
    mount: M,
    channel: Option<M::Channel>,
    preview_profile: MarkdownProfile,
    surface_profile: MarkdownProfile,
    rules: RenderRules,
    on_change: Option<ContentCallback>,
    /// Event produced outside `tick`, reported by the next `tick`
    queued_event: Option<SessionEvent>,
}

/// The session type the widget uses: conversions run in the HTML sandbox.
pub type MarkdownEditorState = EditorSession<SandboxMount>;

impl MarkdownEditorState {
    /// Build a session from settings, using the html2md converter.
    pub fn from_settings(settings: &EditorSettings) -> Self {
        let mount = SandboxMount::new(ConverterFactory::html2md(), settings.conversion_timeout());
        Self::new(mount, settings.initial_content.clone(), settings.read_only)
    }
}

impl<M: ChannelMount> EditorSession<M> {
    pub fn new(mount: M, initial_content: impl Into<String>, read_only: bool) -> Self {
        Self {
            state: EditorState::new(initial_content, read_only),
            mount,
            channel: None,
            preview_profile: MarkdownProfile::with_math(),
            surface_profile: MarkdownProfile::plain(),
            rules: RenderRules::math(),
            on_change: None,
            queued_event: None,
        }
    }

    /// Register the content-change callback. It receives the stored markdown
    /// after every completed save.
    #[must_use]
    pub fn on_content_change(mut self, callback: impl FnMut(&str) + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn with_rules(mut self, rules: RenderRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn view_state(&self) -> ViewState {
        self.state.view_state()
    }

    pub fn content(&self) -> &str {
        self.state.content()
    }

    pub fn rules(&self) -> &RenderRules {
        &self.rules
    }

    /// Profile used to render the preview.
    pub fn preview_profile(&self) -> &MarkdownProfile {
        &self.preview_profile
    }

    pub fn is_channel_mounted(&self) -> bool {
        self.channel.is_some()
    }

    /// Edit/Save toggle. Entering edit mode seeds the surface with the
    /// math-less HTML rendering of the current content.
    pub fn toggle(&mut self) -> ToggleOutcome {
        let outcome = self.state.toggle();
        match outcome {
            ToggleOutcome::EnteredEditing => {
                let html = self.surface_profile.render_html(self.state.content());
                self.state.seed_surface(html);
            }
            ToggleOutcome::SavedEmpty => {
                info!("Saved empty document");
                self.notify("");
                self.queued_event = Some(SessionEvent::Saved(String::new()));
            }
            ToggleOutcome::SaveStaged => self.sync_channel(),
            ToggleOutcome::SavedUnchanged | ToggleOutcome::Busy | ToggleOutcome::ReadOnly => {}
        }
        outcome
    }

    pub fn surface_changed(&mut self, html: impl Into<String>) -> bool {
        self.state.surface_changed(html)
    }

    pub fn set_initial_content(&mut self, value: &str) -> bool {
        self.state.set_initial_content(value)
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.state.set_read_only(read_only);
        self.sync_channel();
    }

    /// Drive the conversion. Call once per frame.
    ///
    /// Also reports a save that completed inside [`toggle`](Self::toggle).
    pub fn tick(&mut self) -> Option<SessionEvent> {
        if let Some(event) = self.queued_event.take() {
            return Some(event);
        }
        self.sync_channel();

        let result = self.channel.as_mut()?.poll()?;
        self.channel = None;

        match result {
            Ok(markdown) => {
                let stored = self.state.complete_conversion(&markdown)?;
                info!("Saved document ({} bytes of markdown)", stored.len());
                self.notify(&stored);
                Some(SessionEvent::Saved(stored))
            }
            Err(e) => {
                let message = e.to_string();
                warn!("Conversion failed: {}", message);
                if !self.state.fail_conversion(message.clone()) {
                    return None;
                }
                Some(SessionEvent::ConversionFailed(message))
            }
        }
    }

    /// Keep the channel mounted exactly while HTML is pending.
    fn sync_channel(&mut self) {
        let pending = self.state.pending_html();
        match (self.channel.as_mut(), pending.is_empty()) {
            (None, false) => {
                debug!("Mounting conversion channel");
                let mut channel = self.mount.mount();
                channel.post_html(pending);
                self.channel = Some(channel);
            }
            (Some(channel), true) => {
                debug!("Unmounting conversion channel");
                channel.cancel();
                self.channel = None;
            }
            _ => {}
        }
    }

    fn notify(&mut self, markdown: &str) {
        if let Some(callback) = self.on_change.as_mut() {
            callback(markdown);
        }
    }
}

impl<M: ChannelMount> fmt::Debug for EditorSession<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorSession")
            .field("state", &self.state)
            .field("channel_mounted", &self.channel.is_some())
            .field("has_callback", &self.on_change.is_some())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
