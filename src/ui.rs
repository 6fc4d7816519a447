//! Presentation contract between the controller and the window.
//!
//! Worker tasks never touch view state. They send [`UiCommand`]s through a
//! [`UiHandle`]; the window drains its [`Dispatcher`] once per frame on the
//! UI thread and applies each command to its [`PresentationSurface`].

use std::{path::PathBuf, sync::Arc};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::model::{ProgressEvent, VideoMetadata};
use crate::thumbnail::Thumbnail;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// Output operations the controller can drive.
pub trait PresentationSurface {
    fn show_busy(&mut self);
    fn hide_busy(&mut self);
    fn disable_inputs(&mut self);
    fn enable_inputs(&mut self);
    fn set_status(&mut self, kind: StatusKind, text: String);
    fn set_progress(&mut self, progress: ProgressEvent);
    fn show_metadata(&mut self, info: VideoMetadata, report: String);
    fn show_playlist_prompt(&mut self, message: String, suggested_url: String);
    fn show_thumbnail(&mut self, thumbnail: Thumbnail);
    fn set_destination(&mut self, path: PathBuf);
    fn clear_form(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    ShowBusy,
    HideBusy,
    DisableInputs,
    EnableInputs,
    SetStatus(StatusKind, String),
    SetProgress(ProgressEvent),
    ShowMetadata { info: VideoMetadata, report: String },
    ShowPlaylistPrompt { message: String, suggested_url: String },
    ShowThumbnail(Thumbnail),
    SetDestination(PathBuf),
    ClearForm,
}

impl UiCommand {
    pub fn apply(self, surface: &mut dyn PresentationSurface) {
        match self {
            UiCommand::ShowBusy => surface.show_busy(),
            UiCommand::HideBusy => surface.hide_busy(),
            UiCommand::DisableInputs => surface.disable_inputs(),
            UiCommand::EnableInputs => surface.enable_inputs(),
            UiCommand::SetStatus(kind, text) => surface.set_status(kind, text),
            UiCommand::SetProgress(progress) => surface.set_progress(progress),
            UiCommand::ShowMetadata { info, report } => surface.show_metadata(info, report),
            UiCommand::ShowPlaylistPrompt {
                message,
                suggested_url,
            } => surface.show_playlist_prompt(message, suggested_url),
            UiCommand::ShowThumbnail(thumbnail) => surface.show_thumbnail(thumbnail),
            UiCommand::SetDestination(path) => surface.set_destination(path),
            UiCommand::ClearForm => surface.clear_form(),
        }
    }
}

/// Sending half, cloned into every worker.
#[derive(Clone)]
pub struct UiHandle {
    tx: UnboundedSender<UiCommand>,
    waker: Arc<dyn Fn() + Send + Sync>,
}

impl UiHandle {
    /// Queues `command` for the UI thread and wakes it up.
    pub fn send(&self, command: UiCommand) {
        if self.tx.send(command).is_ok() {
            (self.waker)();
        }
    }

    pub fn status(&self, kind: StatusKind, text: impl Into<String>) {
        self.send(UiCommand::SetStatus(kind, text.into()));
    }
}

/// Receiving half, owned by the UI thread.
pub struct Dispatcher {
    rx: UnboundedReceiver<UiCommand>,
}

impl Dispatcher {
    pub fn try_next(&mut self) -> Option<UiCommand> {
        self.rx.try_recv().ok()
    }

    /// Applies every queued command; returns how many were applied.
    pub fn drain(&mut self, surface: &mut dyn PresentationSurface) -> usize {
        let mut applied = 0;
        while let Some(command) = self.try_next() {
            command.apply(surface);
            applied += 1;
        }
        applied
    }
}

/// Creates a connected handle/dispatcher pair. `waker` is called after
/// every send, typically to request a repaint.
pub fn channel(waker: impl Fn() + Send + Sync + 'static) -> (UiHandle, Dispatcher) {
    let (tx, rx) = unbounded_channel();
    (
        UiHandle {
            tx,
            waker: Arc::new(waker),
        },
        Dispatcher { rx },
    )
}

/// A playlist hint waiting for the user's answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistPrompt {
    pub message: String,
    pub suggested_url: String,
}

/// Everything the window shows, independent of the GUI toolkit.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// URL entry field
    pub url_input: String,
    /// Current download folder as displayed
    pub destination: String,
    pub busy: bool,
    pub inputs_enabled: bool,
    pub status: Option<(StatusKind, String)>,
    pub progress: Option<ProgressEvent>,
    /// Metadata window contents, with its pre-rendered report
    pub metadata: Option<(VideoMetadata, String)>,
    pub playlist_prompt: Option<PlaylistPrompt>,
    pending_thumbnail: Option<Thumbnail>,
}

impl ViewState {
    pub fn new(destination: &std::path::Path) -> Self {
        Self {
            url_input: String::new(),
            destination: destination.display().to_string(),
            busy: false,
            inputs_enabled: true,
            status: None,
            progress: None,
            metadata: None,
            playlist_prompt: None,
            pending_thumbnail: None,
        }
    }

    /// Thumbnail received since the last frame, if any.
    pub fn take_thumbnail(&mut self) -> Option<Thumbnail> {
        self.pending_thumbnail.take()
    }

    pub fn close_metadata(&mut self) {
        self.metadata = None;
        self.pending_thumbnail = None;
    }

    /// Replaces the URL with the suggested first video.
    pub fn accept_suggestion(&mut self) {
        if let Some(prompt) = self.playlist_prompt.take() {
            self.url_input = prompt.suggested_url;
        }
    }

    pub fn dismiss_prompt(&mut self) {
        self.playlist_prompt = None;
    }
}

impl PresentationSurface for ViewState {
    fn show_busy(&mut self) {
        self.busy = true;
    }

    fn hide_busy(&mut self) {
        self.busy = false;
        self.progress = None;
    }

    fn disable_inputs(&mut self) {
        self.inputs_enabled = false;
    }

    fn enable_inputs(&mut self) {
        self.inputs_enabled = true;
    }

    fn set_status(&mut self, kind: StatusKind, text: String) {
        self.status = Some((kind, text));
    }

    fn set_progress(&mut self, progress: ProgressEvent) {
        self.progress = Some(progress);
    }

    fn show_metadata(&mut self, info: VideoMetadata, report: String) {
        self.metadata = Some((info, report));
    }

    fn show_playlist_prompt(&mut self, message: String, suggested_url: String) {
        self.playlist_prompt = Some(PlaylistPrompt {
            message,
            suggested_url,
        });
    }

    fn show_thumbnail(&mut self, thumbnail: Thumbnail) {
        // a late thumbnail for a window the user already closed is dropped
        if self.metadata.is_some() {
            self.pending_thumbnail = Some(thumbnail);
        }
    }

    fn set_destination(&mut self, path: PathBuf) {
        self.destination = path.display().to_string();
    }

    fn clear_form(&mut self) {
        self.url_input.clear();
        self.status = None;
        self.progress = None;
        self.busy = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn dispatcher_applies_in_order_and_wakes() {
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = wakes.clone();
        let (handle, mut dispatcher) = channel(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let mut view = ViewState::new(Path::new("/tmp/v"));

        handle.send(UiCommand::ShowBusy);
        handle.send(UiCommand::DisableInputs);
        handle.status(StatusKind::Info, "Starting download...");
        handle.send(UiCommand::SetProgress(ProgressEvent {
            percent: "50.0%".to_string(),
            speed: "1MiB/s".to_string(),
        }));

        assert_eq!(dispatcher.drain(&mut view), 4);
        assert_eq!(wakes.load(Ordering::SeqCst), 4);
        assert!(view.busy);
        assert!(!view.inputs_enabled);
        assert_eq!(view.status, Some((StatusKind::Info, "Starting download...".to_string())));
        assert_eq!(view.progress.as_ref().and_then(ProgressEvent::fraction), Some(0.5));

        handle.send(UiCommand::HideBusy);
        handle.send(UiCommand::EnableInputs);
        dispatcher.drain(&mut view);
        assert!(!view.busy);
        assert!(view.inputs_enabled);
        assert!(view.progress.is_none());
    }

    #[test]
    fn clear_resets_form() {
        let mut view = ViewState::new(Path::new("/tmp/v"));
        view.url_input = "https://youtu.be/abc".to_string();
        view.set_status(StatusKind::Error, "boom".to_string());
        UiCommand::ClearForm.apply(&mut view);
        assert!(view.url_input.is_empty());
        assert!(view.status.is_none());
    }

    #[test]
    fn accepting_playlist_suggestion_fills_url() {
        let mut view = ViewState::new(Path::new("/tmp/v"));
        view.url_input = "https://www.youtube.com/playlist?list=PL1".to_string();
        view.show_playlist_prompt("playlist".to_string(), "https://www.youtube.com/watch?v=aaa".to_string());
        view.accept_suggestion();
        assert_eq!(view.url_input, "https://www.youtube.com/watch?v=aaa");
        assert!(view.playlist_prompt.is_none());
    }

    #[test]
    fn thumbnail_without_open_window_is_dropped() {
        let mut view = ViewState::new(Path::new("/tmp/v"));
        view.show_thumbnail(Thumbnail {
            size: [1, 1],
            rgba: vec![0; 4],
        });
        assert!(view.take_thumbnail().is_none());
    }

    #[test]
    fn sends_after_dispatcher_drop_are_ignored() {
        let (handle, dispatcher) = channel(|| panic!("must not wake a closed UI"));
        drop(dispatcher);
        handle.send(UiCommand::EnableInputs);
    }
}
