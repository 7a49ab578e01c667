//! Editor view-state machine
//!
//! `EditorState` owns the authoritative markdown (Content), the edit flag,
//! the live HTML of the edit surface and the HTML staged for conversion.
//! It is a plain state machine: it never talks to the sandbox itself. The
//! session in [`super::session`] mounts and polls the conversion channel and
//! feeds the outcome back through [`EditorState::complete_conversion`] or
//! [`EditorState::fail_conversion`].

use crate::convert::fix_math_escapes;
use log::debug;

// ─────────────────────────────────────────────────────────────────────────────
// View State
// ─────────────────────────────────────────────────────────────────────────────

/// Which surface the editor shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    /// Rendered markdown, read-only
    #[default]
    Preview,
    /// HTML edit surface
    Editing,
    /// Still on the edit surface, waiting for HTML to Markdown conversion
    Converting,
}

/// Result of pressing the Edit/Save toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Preview → Editing
    EnteredEditing,
    /// Editing → Converting; the live HTML is now pending conversion
    SaveStaged,
    /// The surface was cleared; saved as empty markdown without converting
    SavedEmpty,
    /// The surface was never touched and holds no HTML; Content is kept
    SavedUnchanged,
    /// A conversion is already running; nothing changed
    Busy,
    /// The editor is read-only; nothing changed
    ReadOnly,
}

// ─────────────────────────────────────────────────────────────────────────────
// Editor State
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct EditorState {
    content: String,
    editing: bool,
    live_html: String,
    /// Whether the surface reported a change since edit mode was entered
    surface_edited: bool,
    pending_html: String,
    read_only: bool,
    /// Last value supplied through `set_initial_content`
    supplied_initial: String,
    last_error: Option<String>,
    /// Bumped each time edit mode is entered, so the surface can reset
    edit_generation: u64,
}

impl EditorState {
    pub fn new(initial_content: impl Into<String>, read_only: bool) -> Self {
        let content = initial_content.into();
        Self {
            supplied_initial: content.clone(),
            content,
            read_only,
            ..Default::default()
        }
    }

    pub fn view_state(&self) -> ViewState {
        match (self.editing, self.pending_html.is_empty()) {
            (false, _) => ViewState::Preview,
            (true, true) => ViewState::Editing,
            (true, false) => ViewState::Converting,
        }
    }

    /// The authoritative markdown. Stale while the edit surface is open.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn live_html(&self) -> &str {
        &self.live_html
    }

    /// HTML staged for conversion; empty unless converting.
    pub fn pending_html(&self) -> &str {
        &self.pending_html
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn is_converting(&self) -> bool {
        self.view_state() == ViewState::Converting
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Message of the most recent failed conversion.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn edit_generation(&self) -> u64 {
        self.edit_generation
    }

    /// Handle the Edit/Save toggle.
    pub fn toggle(&mut self) -> ToggleOutcome {
        match self.view_state() {
            ViewState::Preview => {
                if self.read_only {
                    return ToggleOutcome::ReadOnly;
                }
                self.editing = true;
                self.live_html.clear();
                self.surface_edited = false;
                self.last_error = None;
                self.edit_generation += 1;
                debug!("Editor: Preview -> Editing");
                ToggleOutcome::EnteredEditing
            }
            ViewState::Editing => {
                self.last_error = None;
                if self.live_html.is_empty() {
                    // Only a surface emptied by the user replaces Content
                    self.exit_editing();
                    if self.surface_edited {
                        self.content.clear();
                        debug!("Editor: empty surface saved without conversion");
                        return ToggleOutcome::SavedEmpty;
                    }
                    debug!("Editor: untouched empty surface, content kept");
                    return ToggleOutcome::SavedUnchanged;
                }
                self.pending_html = self.live_html.clone();
                debug!(
                    "Editor: Editing -> Converting ({} bytes of HTML)",
                    self.pending_html.len()
                );
                ToggleOutcome::SaveStaged
            }
            ViewState::Converting => {
                debug!("Editor: save ignored, conversion already running");
                ToggleOutcome::Busy
            }
        }
    }

    /// Set the HTML the surface starts from. Only valid right after entering
    /// edit mode.
    pub fn seed_surface(&mut self, html: impl Into<String>) {
        if self.view_state() == ViewState::Editing {
            self.live_html = html.into();
        }
    }

    /// Record a change on the edit surface. Returns false when not editing.
    pub fn surface_changed(&mut self, html: impl Into<String>) -> bool {
        if !self.editing {
            return false;
        }
        self.live_html = html.into();
        self.surface_edited = true;
        true
    }

    /// Apply a finished conversion and return the stored markdown.
    ///
    /// The markdown goes through [`fix_math_escapes`] first. Returns `None`
    /// and changes nothing if no conversion is pending.
    pub fn complete_conversion(&mut self, markdown: &str) -> Option<String> {
        if !self.is_converting() {
            debug!("Editor: conversion result dropped, nothing pending");
            return None;
        }
        self.content = fix_math_escapes(markdown);
        self.last_error = None;
        self.exit_editing();
        debug!("Editor: Converting -> Preview");
        Some(self.content.clone())
    }

    /// Return to the edit surface after a failed conversion. The live HTML
    /// is kept so nothing typed is lost.
    pub fn fail_conversion(&mut self, error: impl Into<String>) -> bool {
        if !self.is_converting() {
            return false;
        }
        self.pending_html.clear();
        self.last_error = Some(error.into());
        debug!("Editor: Converting -> Editing after failure");
        true
    }

    /// Overwrite Content with an externally supplied value.
    ///
    /// Only a value different from the previously supplied one counts as an
    /// update. Edit mode and live HTML are left alone.
    pub fn set_initial_content(&mut self, value: &str) -> bool {
        if value == self.supplied_initial {
            return false;
        }
        self.supplied_initial = value.to_string();
        self.content = value.to_string();
        debug!("Editor: content overwritten externally");
        true
    }

    /// Switching to read-only leaves edit mode at once and drops any pending
    /// conversion.
    pub fn set_read_only(&mut self, read_only: bool) {
        if self.read_only == read_only {
            return;
        }
        self.read_only = read_only;
        if read_only && self.editing {
            debug!("Editor: read-only set, leaving edit mode");
            self.exit_editing();
        }
    }

    fn exit_editing(&mut self) {
        self.editing = false;
        self.live_html.clear();
        self.surface_edited = false;
        self.pending_html.clear();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
