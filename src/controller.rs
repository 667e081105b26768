use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use generation_service::{ContinueRequest, GenerationError, GenerationService, ServiceProfile};
use transcript_store::KeyValueStore;

use crate::session::{
    Indicator, RequestId, Session, SessionHost, StoredTranscript, SubmitOutcome,
};
use crate::transcript::Message;

/// Point-in-time copy of what the UI renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub messages: Vec<Message>,
    pub pending: bool,
    pub indicator: Option<Indicator>,
}

struct ActiveRequest {
    request_id: RequestId,
    join_handle: JoinHandle<()>,
}

enum Job {
    Begin,
    Continue(ContinueRequest),
}

/// Drives a [`Session`] against a generation service and a persisted store.
///
/// Service calls run on short-lived worker threads; their results are applied
/// to the session under its mutex. Store writes happen on whichever thread
/// applies the result. A record that fails to load is never overwritten by
/// this controller.
pub struct SessionController {
    session: Mutex<Session>,
    service: Arc<dyn GenerationService>,
    store: Mutex<Box<dyn KeyValueStore>>,
    store_key: String,
    writes_suspended: AtomicBool,
    next_request_id: AtomicU64,
    active_request: Mutex<Option<ActiveRequest>>,
}

impl SessionController {
    pub fn new(
        service: Arc<dyn GenerationService>,
        store: Box<dyn KeyValueStore>,
        store_key: impl Into<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            session: Mutex::new(Session::new()),
            service,
            store: Mutex::new(store),
            store_key: store_key.into(),
            writes_suspended: AtomicBool::new(false),
            next_request_id: AtomicU64::new(1),
            active_request: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn service_profile(&self) -> ServiceProfile {
        self.service.profile()
    }

    /// Reads the persisted transcript once and hands it to the session.
    pub fn mount(self: &Arc<Self>) {
        let stored = self.read_stored_transcript();
        let mut host = Arc::clone(self);
        lock_unpoisoned(&self.session).mount(stored, &mut host);
    }

    pub fn submit(self: &Arc<Self>, text: &str) -> SubmitOutcome {
        let mut host = Arc::clone(self);
        lock_unpoisoned(&self.session).submit(text, &mut host)
    }

    /// Blocks until no request is outstanding and its outcome has been applied.
    pub fn wait_for_idle(&self) {
        loop {
            let active = self.lock_active_request().take();
            let Some(active) = active else {
                return;
            };

            if active.join_handle.join().is_err() {
                tracing::error!(
                    request_id = active.request_id,
                    "request worker terminated abnormally"
                );
            }
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let session = lock_unpoisoned(&self.session);
        SessionSnapshot {
            messages: session.messages().to_vec(),
            pending: session.is_pending(),
            indicator: session.indicator(),
        }
    }

    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        lock_unpoisoned(&self.session).messages().to_vec()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        lock_unpoisoned(&self.session).is_pending()
    }

    #[must_use]
    pub fn persisted_transcript(&self) -> String {
        lock_unpoisoned(&self.session)
            .persisted_transcript()
            .to_string()
    }

    /// Returns true once the stored record proved unreadable.
    #[must_use]
    pub fn writes_suspended(&self) -> bool {
        self.writes_suspended.load(Ordering::SeqCst)
    }

    fn read_stored_transcript(&self) -> StoredTranscript {
        match lock_unpoisoned(&self.store).read(&self.store_key) {
            Ok(stored) => StoredTranscript::from(stored),
            Err(error) => {
                tracing::error!(
                    key = %self.store_key,
                    %error,
                    "persisted transcript unreadable; leaving it untouched for this run"
                );
                self.writes_suspended.store(true, Ordering::SeqCst);
                StoredTranscript::Unreadable
            }
        }
    }

    fn write_transcript(&self, transcript: &str) {
        if self.writes_suspended() {
            tracing::debug!(key = %self.store_key, "store writes suspended; transcript not persisted");
            return;
        }

        if let Err(error) = lock_unpoisoned(&self.store).write(&self.store_key, transcript) {
            tracing::warn!(
                key = %self.store_key,
                %error,
                "failed to persist transcript"
            );
        }
    }

    fn start_request(self: &Arc<Self>, job: Job) -> Result<RequestId, String> {
        let mut active_request = self.lock_active_request();
        if let Some(previous) = active_request.take() {
            // Its outcome is already applied; only the thread exit can remain.
            if previous.join_handle.join().is_err() {
                tracing::error!(
                    request_id = previous.request_id,
                    "request worker terminated abnormally"
                );
            }
        }

        let request_id = self.next_request_id.fetch_add(1, Ordering::SeqCst);
        let controller = Arc::clone(self);
        let join_handle = thread::Builder::new()
            .name(format!("sage-chat-request-{request_id}"))
            .spawn(move || controller.run_worker(request_id, job))
            .map_err(|error| format!("Failed to spawn request worker: {error}"))?;

        *active_request = Some(ActiveRequest {
            request_id,
            join_handle,
        });

        Ok(request_id)
    }

    fn run_worker(self: Arc<Self>, request_id: RequestId, job: Job) {
        let service = Arc::clone(&self.service);
        let mut host = Arc::clone(&self);

        match job {
            Job::Begin => {
                tracing::debug!(request_id, "requesting session opening");
                let result = catch_unwind(AssertUnwindSafe(|| service.begin_session()))
                    .unwrap_or_else(|_| Err(worker_panicked()));
                lock_unpoisoned(&self.session).on_session_begun(request_id, result, &mut host);
            }
            Job::Continue(request) => {
                tracing::debug!(
                    request_id,
                    history_chars = request.conversation_history.len(),
                    "requesting turn reply"
                );
                let result = catch_unwind(AssertUnwindSafe(|| service.continue_session(request)))
                    .unwrap_or_else(|_| Err(worker_panicked()));
                lock_unpoisoned(&self.session).on_turn_completed(request_id, result, &mut host);
            }
        }
    }

    fn lock_active_request(&self) -> MutexGuard<'_, Option<ActiveRequest>> {
        lock_unpoisoned(&self.active_request)
    }
}

impl SessionHost for Arc<SessionController> {
    fn begin_session(&mut self) -> Result<RequestId, String> {
        self.start_request(Job::Begin)
    }

    fn continue_session(&mut self, request: ContinueRequest) -> Result<RequestId, String> {
        self.start_request(Job::Continue(request))
    }

    fn persist_transcript(&mut self, transcript: &str) {
        self.write_transcript(transcript);
    }
}

fn worker_panicked() -> GenerationError {
    GenerationError::Unavailable("generation service panicked".to_string())
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
