//! Isolated HTML to Markdown conversion sandbox.
//!
//! Each mount spawns a dedicated worker thread that owns its own converter
//! instance and talks to the host only through two message channels. The
//! exchange is fixed:
//!
//! 1. the sandbox loads its converter and posts `Ready` (or `LoadFailed`),
//! 2. the host posts exactly one HTML document,
//! 3. the sandbox posts exactly one markdown string and exits.
//!
//! The host never sends before `Ready`. HTML posted earlier waits in a
//! single slot where the newest value replaces older ones.

use crate::convert::{ChannelMount, ConversionChannel};
use crate::error::{Error, Result};
use log::{debug, warn};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Thread name given to every sandbox worker.
const SANDBOX_THREAD_NAME: &str = "html-sandbox";

// ─────────────────────────────────────────────────────────────────────────────
// Converter Contract
// ─────────────────────────────────────────────────────────────────────────────

/// An HTML to Markdown converter that can run inside the sandbox.
pub trait HtmlToMarkdown: Send {
    /// Convert an HTML document or fragment to markdown.
    fn convert(&self, html: &str) -> String;
}

/// Converter backed by `fast_html2md`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Html2MdConverter {
    /// Emit strict CommonMark instead of the library's default flavor
    pub commonmark: bool,
}

impl HtmlToMarkdown for Html2MdConverter {
    fn convert(&self, html: &str) -> String {
        html2md::rewrite_html(html, self.commonmark)
    }
}

type Loader = dyn Fn() -> Result<Box<dyn HtmlToMarkdown>> + Send + Sync;

/// Loads a fresh converter inside each sandbox.
///
/// The loader runs on the sandbox thread, so a slow or failing load never
/// blocks the UI.
#[derive(Clone)]
pub struct ConverterFactory {
    loader: Arc<Loader>,
}

impl ConverterFactory {
    /// Create a factory from a loader function.
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Box<dyn HtmlToMarkdown>> + Send + Sync + 'static,
    {
        Self {
            loader: Arc::new(loader),
        }
    }

    /// Factory for the default `fast_html2md` converter.
    pub fn html2md() -> Self {
        Self::new(|| Ok(Box::new(Html2MdConverter::default()) as Box<dyn HtmlToMarkdown>))
    }

    fn load(&self) -> Result<Box<dyn HtmlToMarkdown>> {
        (self.loader)()
    }
}

impl Default for ConverterFactory {
    fn default() -> Self {
        Self::html2md()
    }
}

impl fmt::Debug for ConverterFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterFactory").finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────────────────────────────────────

/// Host to sandbox.
#[derive(Debug)]
enum HostMessage {
    Convert(String),
}

/// Sandbox to host.
#[derive(Debug)]
enum SandboxMessage {
    Ready,
    LoadFailed(String),
    Converted(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Sandbox Worker
// ─────────────────────────────────────────────────────────────────────────────

fn run_sandbox(
    factory: ConverterFactory,
    inbox: Receiver<HostMessage>,
    outbox: Sender<SandboxMessage>,
    cancelled: Arc<AtomicBool>,
) {
    let converter = match factory.load() {
        Ok(converter) => converter,
        Err(e) => {
            let _ = outbox.send(SandboxMessage::LoadFailed(e.to_string()));
            return;
        }
    };

    if outbox.send(SandboxMessage::Ready).is_err() {
        return;
    }

    // A closed inbox means the host unmounted before posting
    let Ok(HostMessage::Convert(html)) = inbox.recv() else {
        debug!("Sandbox unmounted before a request arrived");
        return;
    };

    debug!("Sandbox converting {} bytes of HTML", html.len());
    let markdown = converter.convert(&html);

    if cancelled.load(Ordering::Acquire) {
        debug!("Sandbox cancelled, dropping conversion result");
        return;
    }
    let _ = outbox.send(SandboxMessage::Converted(markdown));
}

// ─────────────────────────────────────────────────────────────────────────────
// Host Side
// ─────────────────────────────────────────────────────────────────────────────

/// Host end of one mounted sandbox.
///
/// Yields at most one outcome. Dropping the channel cancels it.
pub struct SandboxChannel {
    to_sandbox: Option<Sender<HostMessage>>,
    from_sandbox: Receiver<SandboxMessage>,
    cancelled: Arc<AtomicBool>,
    startup_error: Option<Error>,
    /// HTML waiting for the ready signal
    queued: Option<String>,
    ready: bool,
    sent: bool,
    finished: bool,
    mounted_at: Instant,
    timeout: Option<Duration>,
}

impl SandboxChannel {
    /// Spawn a sandbox that loads its converter from `factory`.
    pub fn mount(factory: &ConverterFactory, timeout: Option<Duration>) -> Self {
        let (to_sandbox, inbox) = channel();
        let (outbox, from_sandbox) = channel();
        let cancelled = Arc::new(AtomicBool::new(false));

        let spawned = thread::Builder::new()
            .name(SANDBOX_THREAD_NAME.to_string())
            .spawn({
                let factory = factory.clone();
                let cancelled = Arc::clone(&cancelled);
                move || run_sandbox(factory, inbox, outbox, cancelled)
            });

        let startup_error = match spawned {
            Ok(_) => {
                debug!("Conversion sandbox mounted");
                None
            }
            Err(e) => {
                warn!("Failed to spawn conversion sandbox: {}", e);
                Some(Error::SandboxLoad(e.to_string()))
            }
        };

        Self {
            to_sandbox: Some(to_sandbox),
            from_sandbox,
            cancelled,
            startup_error,
            queued: None,
            ready: false,
            sent: false,
            finished: false,
            mounted_at: Instant::now(),
            timeout,
        }
    }

    /// Whether the sandbox has signalled readiness.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Whether the request has been handed to the sandbox.
    pub fn is_sent(&self) -> bool {
        self.sent
    }

    fn flush(&mut self) {
        if !self.ready || self.sent {
            return;
        }
        let Some(html) = self.queued.take() else {
            return;
        };
        if let Some(sender) = &self.to_sandbox {
            // A failed send surfaces as a disconnect on the next poll
            let _ = sender.send(HostMessage::Convert(html));
            self.sent = true;
        }
    }

    fn finish(&mut self, outcome: Result<String>) -> Option<Result<String>> {
        self.finished = true;
        self.to_sandbox = None;
        Some(outcome)
    }
}

impl ConversionChannel for SandboxChannel {
    fn post_html(&mut self, html: &str) {
        if self.finished || self.sent {
            debug!("Ignoring HTML posted after the request was sent");
            return;
        }
        if html.is_empty() {
            return;
        }
        self.queued = Some(html.to_string());
        self.flush();
    }

    fn poll(&mut self) -> Option<Result<String>> {
        if self.finished {
            return None;
        }
        if let Some(err) = self.startup_error.take() {
            return self.finish(Err(err));
        }

        loop {
            match self.from_sandbox.try_recv() {
                Ok(SandboxMessage::Ready) => {
                    debug!("Conversion sandbox ready");
                    self.ready = true;
                    self.flush();
                }
                Ok(SandboxMessage::LoadFailed(msg)) => {
                    return self.finish(Err(Error::SandboxLoad(msg)));
                }
                Ok(SandboxMessage::Converted(markdown)) => {
                    return self.finish(Ok(markdown));
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    return self.finish(Err(Error::SandboxDisconnected));
                }
            }
        }

        if let Some(timeout) = self.timeout {
            if self.mounted_at.elapsed() >= timeout {
                warn!("Conversion sandbox timed out after {:?}", timeout);
                self.cancelled.store(true, Ordering::Release);
                return self.finish(Err(Error::ConversionTimeout(timeout)));
            }
        }

        None
    }

    fn cancel(&mut self) {
        if self.finished {
            return;
        }
        debug!("Conversion sandbox cancelled");
        self.cancelled.store(true, Ordering::Release);
        self.finished = true;
        self.queued = None;
        self.to_sandbox = None;
    }
}

impl Drop for SandboxChannel {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for SandboxChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SandboxChannel")
            .field("ready", &self.ready)
            .field("sent", &self.sent)
            .field("finished", &self.finished)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mount
// ─────────────────────────────────────────────────────────────────────────────

/// Mounts real sandboxes for an editor session.
#[derive(Debug, Clone, Default)]
pub struct SandboxMount {
    factory: ConverterFactory,
    timeout: Option<Duration>,
}

impl SandboxMount {
    /// Create a mount with the given converter factory and timeout.
    pub fn new(factory: ConverterFactory, timeout: Option<Duration>) -> Self {
        Self { factory, timeout }
    }
}

impl ChannelMount for SandboxMount {
    type Channel = SandboxChannel;

    fn mount(&self) -> SandboxChannel {
        SandboxChannel::mount(&self.factory, self.timeout)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
