//! # System Instruction Manager
//!
//! Owns the system instruction text. The text is loaded once at startup and kept
//! in a `watch` channel; a single background watcher replaces it when the backing
//! file changes. Readers clone an `Arc` snapshot under a brief read lock and never
//! touch the filesystem.

use crate::{
    constants::{DEFAULT_SYSTEM_PROMPT_PATH, SYSTEM_PROMPT_ENV},
    errors::RagError,
};
use notify::{Config, Event, EventKind, PollWatcher, RecursiveMode, Watcher};
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

/// How the instruction file is observed for changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchMode {
    /// OS file notifications on the parent directory.
    #[default]
    Notify,
    /// Periodic polling that compares file contents.
    Poll { interval: Duration },
}

/// Resolves the instruction file: an explicit path, else `RAG_SYSTEM_PROMPT`, else
/// the file shipped with the crate.
pub fn resolve_prompt_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match std::env::var(SYSTEM_PROMPT_ENV) {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => PathBuf::from(DEFAULT_SYSTEM_PROMPT_PATH),
    }
}

/// Reads an instruction file, trimmed. Blank content is rejected.
pub fn read_instructions(path: &Path) -> Result<String, RagError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        RagError::Configuration(format!(
            "failed to read system prompt '{}': {e}",
            path.display()
        ))
    })?;
    if text.trim().is_empty() {
        return Err(RagError::Configuration(format!(
            "system prompt '{}' is empty",
            path.display()
        )));
    }
    Ok(text.trim().to_string())
}

#[derive(Debug)]
pub struct PromptManager {
    path: PathBuf,
    receiver: watch::Receiver<Arc<str>>,
    /// Taken by the watcher task; `None` once a watcher has started.
    sender: Mutex<Option<watch::Sender<Arc<str>>>>,
    watcher_task: Mutex<Option<JoinHandle<()>>>,
}

impl PromptManager {
    /// Loads the instructions from `path`. A missing, unreadable or blank file is a
    /// `Configuration` error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, RagError> {
        let path = path.into();
        let text = read_instructions(&path)?;
        info!(path = %path.display(), "Loaded system prompt");
        let (sender, receiver) = watch::channel(Arc::<str>::from(text));
        Ok(Self {
            path,
            receiver,
            sender: Mutex::new(Some(sender)),
            watcher_task: Mutex::new(None),
        })
    }

    /// Loads from the path chosen by [`resolve_prompt_path`].
    pub fn from_env() -> Result<Self, RagError> {
        Self::load(resolve_prompt_path(None))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current instruction text.
    ///
    /// Takes the channel's read lock only long enough to clone the `Arc`; the writer
    /// holds it just to swap in text that was already read from disk.
    pub fn current(&self) -> Arc<str> {
        self.receiver.borrow().clone()
    }

    /// A receiver that is marked changed whenever the text is replaced.
    pub fn subscribe(&self) -> watch::Receiver<Arc<str>> {
        self.receiver.clone()
    }

    /// Starts the background watcher. Must be called inside a Tokio runtime.
    ///
    /// Returns `Ok(false)` if a watcher is already running. The watcher stops when
    /// the manager is dropped.
    pub fn start_watcher(&self, mode: WatchMode) -> Result<bool, RagError> {
        let mut sender_slot = self.sender.lock().unwrap_or_else(|p| p.into_inner());
        if sender_slot.is_none() {
            debug!(path = %self.path.display(), "Prompt watcher already running");
            return Ok(false);
        }

        let file_name = self.path.file_name().map(OsString::from).ok_or_else(|| {
            RagError::Configuration(format!(
                "system prompt path '{}' has no file name",
                self.path.display()
            ))
        })?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tx, mut rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
        let handler = move |res: notify::Result<Event>| {
            // The receiver is gone once the task stops; nothing left to notify.
            let _ = tx.send(res);
        };
        let mut watcher: Box<dyn Watcher + Send> = match mode {
            WatchMode::Notify => Box::new(notify::recommended_watcher(handler)?),
            WatchMode::Poll { interval } => Box::new(PollWatcher::new(
                handler,
                Config::default()
                    .with_poll_interval(interval)
                    .with_compare_contents(true),
            )?),
        };
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        let Some(sender) = sender_slot.take() else {
            return Ok(false);
        };
        let path = self.path.clone();
        info!(path = %path.display(), ?mode, "Watching system prompt for changes");

        let task = tokio::spawn(async move {
            // Dropping the watcher stops the notifications, so it lives in the task.
            let _watcher = watcher;
            while let Some(res) = rx.recv().await {
                match res {
                    Ok(event) if concerns_file(&event, &file_name) => {
                        debug!(kind = ?event.kind, "System prompt file event");
                        reload(&path, &sender).await;
                    }
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "System prompt watcher error"),
                }
            }
        });
        *self
            .watcher_task
            .lock()
            .unwrap_or_else(|p| p.into_inner()) = Some(task);
        Ok(true)
    }
}

impl Drop for PromptManager {
    fn drop(&mut self) {
        let task = self
            .watcher_task
            .get_mut()
            .unwrap_or_else(|p| p.into_inner())
            .take();
        if let Some(task) = task {
            task.abort();
        }
    }
}

fn concerns_file(event: &Event, file_name: &OsString) -> bool {
    if matches!(event.kind, EventKind::Access(_)) {
        return false;
    }
    event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(file_name.as_os_str()))
}

/// Re-reads the file and publishes the text if it changed. Failures keep the old text.
async fn reload(path: &Path, sender: &watch::Sender<Arc<str>>) {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to reload system prompt; keeping previous text");
            return;
        }
    };
    if text.is_empty() {
        warn!(path = %path.display(), "System prompt file is empty; keeping previous text");
        return;
    }
    let changed = sender.send_if_modified(|current| {
        if current.as_ref() == text.as_str() {
            false
        } else {
            *current = Arc::from(text);
            true
        }
    });
    if changed {
        info!(path = %path.display(), "Prompt reloaded");
    }
}
