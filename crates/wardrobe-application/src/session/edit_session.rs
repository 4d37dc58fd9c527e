use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, broadcast};
use wardrobe_core::ImageBackend;
use wardrobe_core::config::WardrobeConfig;
use wardrobe_core::error::Result as WardrobeResult;
use wardrobe_core::image::ImageArtifact;
use wardrobe_core::operation::{EditRequest, Hotspot, Operation};
use wardrobe_core::outcome::EditFailure;
use wardrobe_core::preset::{Category, Theme, find_preset};
use wardrobe_core::timeline::{PageBackground, Version, VersionTimeline};

use super::event::{SessionEvent, SessionSnapshot};
use crate::edit_gateway::EditGateway;

const EVENT_CAPACITY: usize = 64;
const BUSY_MESSAGE: &str = "Another edit is already in progress.";
const NO_IMAGE_MESSAGE: &str = "No image loaded to edit.";

/// Result of loading a new upload into the session.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// Background isolation succeeded.
    Isolated(Version),
    /// Isolation failed; the raw upload became the original version.
    Fallback { version: Version, failure: EditFailure },
}

impl LoadOutcome {
    pub fn version(&self) -> &Version {
        match self {
            LoadOutcome::Isolated(version) => version,
            LoadOutcome::Fallback { version, .. } => version,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, LoadOutcome::Fallback { .. })
    }
}

struct SessionState {
    timeline: VersionTimeline,
    last_error: Option<String>,
    theme: Theme,
    active_category: Category,
}

/// One character-customization session.
///
/// Edits are serialized by a busy flag: a second edit while one is in flight
/// fails fast instead of queueing. Navigation stays available while busy.
pub struct EditSession {
    gateway: EditGateway,
    download_prefix: String,
    busy: AtomicBool,
    state: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

/// Clears the busy flag when an edit finishes, however it finishes.
struct BusyGuard<'a> {
    session: &'a EditSession,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.session.busy.store(false, Ordering::Release);
        self.session.emit(SessionEvent::BusyChanged { busy: false });
    }
}

impl EditSession {
    pub fn new(gateway: EditGateway, config: &WardrobeConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            gateway,
            download_prefix: config.download_prefix.clone(),
            busy: AtomicBool::new(false),
            state: Mutex::new(SessionState {
                timeline: VersionTimeline::new(),
                last_error: None,
                theme: config.theme,
                active_category: Category::default(),
            }),
            events,
        }
    }

    pub fn from_backend(
        backend: Arc<dyn ImageBackend>,
        config: &WardrobeConfig,
    ) -> WardrobeResult<Self> {
        Ok(Self::new(EditGateway::new(backend)?, config))
    }

    /// Receiver for every change made after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Replaces the timeline with a new upload.
    ///
    /// The upload is isolated first; if that fails the raw upload is used as
    /// the original version and the failure message is still recorded.
    pub async fn load_image(&self, upload: ImageArtifact) -> Result<LoadOutcome, EditFailure> {
        let _guard = self.begin()?;
        let upload = Arc::new(upload);
        let theme = {
            let mut state = self.state.lock().await;
            self.set_error(&mut state, None);
            state.theme
        };

        tracing::info!("[Session] Loading {}", upload.file_name());
        let result = self
            .gateway
            .run(EditRequest::isolate(upload.clone()), theme)
            .await;

        let mut state = self.state.lock().await;
        let outcome = match result {
            Ok(image) => LoadOutcome::Isolated(Version::new(image)),
            Err(failure) => {
                tracing::warn!(
                    "[Session] Isolation failed, keeping the raw upload: {}",
                    failure
                );
                let message = failure.user_message(&Operation::Isolate);
                self.set_error(&mut state, Some(message));
                LoadOutcome::Fallback {
                    version: Version::new(upload),
                    failure,
                }
            }
        };

        state.timeline.clear();
        state.timeline.append(outcome.version().clone());
        self.emit_timeline(&state);
        Ok(outcome)
    }

    /// Replaces the timeline with `upload` as-is, skipping isolation.
    pub async fn load_raw_image(&self, upload: ImageArtifact) -> Result<Version, EditFailure> {
        let _guard = self.begin()?;
        let version = Version::new(upload);

        let mut state = self.state.lock().await;
        self.set_error(&mut state, None);
        state.timeline.clear();
        state.timeline.append(version.clone());
        self.emit_timeline(&state);
        tracing::info!("[Session] Loaded {} without isolation", version.file_name());
        Ok(version)
    }

    /// Applies free text to the current version using the category's operation.
    pub async fn apply(&self, category: Category, prompt: &str) -> Result<Version, EditFailure> {
        self.run_edit(category.operation(), prompt, Some(category)).await
    }

    /// Applies a named preset of the active theme.
    pub async fn apply_preset(&self, category: Category, name: &str) -> Result<Version, EditFailure> {
        let theme = self.theme().await;
        let Some(preset) = find_preset(theme, category, name) else {
            let failure = EditFailure::invalid(format!(
                "No {} preset named '{}' in the {} theme.",
                category, name, theme
            ));
            self.record_failure(&failure, &category.operation()).await;
            return Err(failure);
        };
        tracing::debug!("[Session] Using preset '{}' ({})", preset.name, category);
        self.apply(category, preset.prompt).await
    }

    pub async fn apply_localized_edit(
        &self,
        hotspot: Hotspot,
        prompt: &str,
    ) -> Result<Version, EditFailure> {
        self.apply_operation(Operation::LocalizedEdit { hotspot }, prompt)
            .await
    }

    /// Runs `operation` on the current version and appends the result.
    ///
    /// On failure the message is recorded and the timeline is left untouched.
    pub async fn apply_operation(
        &self,
        operation: Operation,
        prompt: &str,
    ) -> Result<Version, EditFailure> {
        self.run_edit(operation, prompt, None).await
    }

    /// The result always branches from the version the edit started on, even
    /// if the cursor moved while the request was in flight.
    async fn run_edit(
        &self,
        operation: Operation,
        prompt: &str,
        category: Option<Category>,
    ) -> Result<Version, EditFailure> {
        let _guard = self.begin()?;

        let (source_index, source, theme) = {
            let mut state = self.state.lock().await;
            if let Some(category) = category {
                state.active_category = category;
            }
            let (Some(index), Some(current)) =
                (state.timeline.cursor(), state.timeline.current().cloned())
            else {
                let failure = EditFailure::invalid(NO_IMAGE_MESSAGE);
                self.set_error(&mut state, Some(failure.user_message(&operation)));
                return Err(failure);
            };
            self.set_error(&mut state, None);
            (index, current, state.theme)
        };

        let request = EditRequest::new(source.image.clone(), operation, prompt);
        let image = match self.gateway.run(request, theme).await {
            Ok(image) => Arc::new(image),
            Err(failure) => {
                self.record_failure(&failure, &operation).await;
                return Err(failure);
            }
        };

        let background = match operation {
            Operation::Background => Some(PageBackground::Image(image.clone())),
            _ => source.background.clone(),
        };
        let version = Version::new(image).with_background(background);

        let mut state = self.state.lock().await;
        // Entries up to the source cannot disappear: reset, reload and
        // new-session are refused while busy.
        let index = match state.timeline.append_after(source_index, version.clone()) {
            Ok(index) => index,
            Err(e) => {
                let failure = EditFailure::invalid(format!("Source version is gone: {e}"));
                self.set_error(&mut state, Some(failure.user_message(&operation)));
                return Err(failure);
            }
        };
        tracing::info!(
            "[Session] Added {} as version {} ({})",
            version.file_name(),
            index,
            operation
        );
        self.emit_timeline(&state);
        Ok(version)
    }

    /// Moves the cursor back to the original version; later versions are kept.
    pub async fn reset(&self) -> Result<(), EditFailure> {
        let _guard = self.begin()?;
        let mut state = self.state.lock().await;
        if state.timeline.is_empty() {
            return Ok(());
        }
        state.timeline.reset();
        self.set_error(&mut state, None);
        self.emit_timeline(&state);
        Ok(())
    }

    pub async fn select_index(&self, index: usize) -> WardrobeResult<()> {
        let mut state = self.state.lock().await;
        state.timeline.select_index(index)?;
        self.emit_timeline(&state);
        Ok(())
    }

    pub async fn undo(&self) -> bool {
        let mut state = self.state.lock().await;
        let moved = state.timeline.undo();
        if moved {
            self.emit_timeline(&state);
        }
        moved
    }

    pub async fn redo(&self) -> bool {
        let mut state = self.state.lock().await;
        let moved = state.timeline.redo();
        if moved {
            self.emit_timeline(&state);
        }
        moved
    }

    /// Drops every version, the error and the page background.
    pub async fn start_new_session(&self) -> Result<(), EditFailure> {
        let _guard = self.begin()?;
        let mut state = self.state.lock().await;
        state.timeline.clear();
        self.set_error(&mut state, None);
        self.emit_timeline(&state);
        tracing::info!("[Session] Started a new session");
        Ok(())
    }

    pub async fn dismiss_error(&self) {
        let mut state = self.state.lock().await;
        self.set_error(&mut state, None);
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.lock().await.last_error.clone()
    }

    pub async fn theme(&self) -> Theme {
        self.state.lock().await.theme
    }

    pub async fn set_theme(&self, theme: Theme) {
        self.state.lock().await.theme = theme;
        tracing::debug!("[Session] Theme set to {}", theme);
    }

    pub async fn active_category(&self) -> Category {
        self.state.lock().await.active_category
    }

    pub async fn current(&self) -> Option<Version> {
        self.state.lock().await.timeline.current().cloned()
    }

    pub async fn original(&self) -> Option<Version> {
        self.state.lock().await.timeline.original().cloned()
    }

    pub async fn versions(&self) -> Vec<Version> {
        self.state.lock().await.timeline.iter().cloned().collect()
    }

    /// Background of the current version.
    pub async fn page_background(&self) -> Option<PageBackground> {
        self.state
            .lock()
            .await
            .timeline
            .current()
            .and_then(|version| version.background.clone())
    }

    /// Current image renamed for export.
    pub async fn download(&self) -> Option<ImageArtifact> {
        let state = self.state.lock().await;
        state.timeline.current().map(|version| {
            version
                .image
                .renamed(format!("{}{}", self.download_prefix, version.file_name()))
        })
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        SessionSnapshot {
            len: state.timeline.len(),
            position: state.timeline.position(),
            can_undo: state.timeline.can_undo(),
            can_redo: state.timeline.can_redo(),
            busy: self.is_busy(),
            error: state.last_error.clone(),
            has_background: state
                .timeline
                .current()
                .is_some_and(|version| version.background.is_some()),
        }
    }

    fn begin(&self) -> Result<BusyGuard<'_>, EditFailure> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("[Session] Rejected request while busy");
            return Err(EditFailure::invalid(BUSY_MESSAGE));
        }
        self.emit(SessionEvent::BusyChanged { busy: true });
        Ok(BusyGuard { session: self })
    }

    async fn record_failure(&self, failure: &EditFailure, operation: &Operation) {
        let message = failure.user_message(operation);
        tracing::error!("[Session] {}", message);
        let mut state = self.state.lock().await;
        self.set_error(&mut state, Some(message));
    }

    fn set_error(&self, state: &mut SessionState, message: Option<String>) {
        if state.last_error != message {
            state.last_error = message.clone();
            self.emit(SessionEvent::ErrorChanged { message });
        }
    }

    fn emit_timeline(&self, state: &SessionState) {
        self.emit(SessionEvent::TimelineChanged {
            len: state.timeline.len(),
            cursor: state.timeline.cursor(),
        });
    }

    fn emit(&self, event: SessionEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }
}
