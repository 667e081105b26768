//! Deterministic mock implementation of the shared `generation_service` contract.
//!
//! This crate contains no transport logic and is intended for local
//! development and contract-level integration testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use generation_service::{
    ContinueRequest, ContinueResponse, GenerationError, GenerationService, ServiceProfile,
    SessionOpening,
};

/// Stable service identifier used for explicit startup selection.
pub const MOCK_SERVICE_ID: &str = "mock";

pub const DEFAULT_OPENING_MESSAGE: &str =
    "Hello! I'm your financial sage. What would you like to explore today?";

#[derive(Debug, Default)]
struct FailurePlan {
    fail_begin: bool,
    failing_turns: usize,
}

#[derive(Debug, Default)]
struct Gate {
    held: Mutex<bool>,
    released: Condvar,
}

/// Deterministic mock service used by `sage_chat` tests and local runs.
#[derive(Debug)]
pub struct MockService {
    opening_message: String,
    replies: Vec<String>,
    delay: Duration,
    next_reply: AtomicUsize,
    begin_calls: AtomicUsize,
    continue_calls: AtomicUsize,
    requests: Mutex<Vec<ContinueRequest>>,
    failures: Mutex<FailurePlan>,
    gate: Gate,
}

impl MockService {
    const DEFAULT_DELAY_MS: u64 = 200;

    /// Creates a mock service with caller-provided replies, cycled in order.
    #[must_use]
    pub fn new(opening_message: impl Into<String>, replies: Vec<String>) -> Self {
        let replies = sanitize_replies(replies);

        Self {
            opening_message: opening_message.into(),
            replies,
            delay: Duration::from_millis(Self::DEFAULT_DELAY_MS),
            next_reply: AtomicUsize::new(0),
            begin_calls: AtomicUsize::new(0),
            continue_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            failures: Mutex::new(FailurePlan::default()),
            gate: Gate::default(),
        }
    }

    /// Overrides the simulated latency applied to every call.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Makes every subsequent `begin_session` call fail.
    pub fn fail_begin(&self) {
        lock_unpoisoned(&self.failures).fail_begin = true;
    }

    /// Makes the next `count` `continue_session` calls fail.
    pub fn fail_next_turns(&self, count: usize) {
        lock_unpoisoned(&self.failures).failing_turns = count;
    }

    /// Blocks every call at entry until [`MockService::release`] is called.
    pub fn hold(&self) {
        *lock_unpoisoned(&self.gate.held) = true;
    }

    /// Unblocks held calls.
    pub fn release(&self) {
        *lock_unpoisoned(&self.gate.held) = false;
        self.gate.released.notify_all();
    }

    #[must_use]
    pub fn begin_calls(&self) -> usize {
        self.begin_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn continue_calls(&self) -> usize {
        self.continue_calls.load(Ordering::SeqCst)
    }

    /// Returns every continue request received so far, in call order.
    #[must_use]
    pub fn requests(&self) -> Vec<ContinueRequest> {
        lock_unpoisoned(&self.requests).clone()
    }

    fn wait_for_gate(&self) {
        let mut held = lock_unpoisoned(&self.gate.held);
        while *held {
            held = match self.gate.released.wait(held) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
    }

    fn simulate_latency(&self) {
        self.wait_for_gate();
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }

    fn take_turn_failure(&self) -> bool {
        let mut failures = lock_unpoisoned(&self.failures);
        if failures.failing_turns == 0 {
            return false;
        }

        failures.failing_turns -= 1;
        true
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new(
            DEFAULT_OPENING_MESSAGE,
            vec![
                "A diversified portfolio spreads risk across asset classes so no single loss dominates.".to_string(),
                "An ETF is an exchange-traded fund: a basket of assets that trades like a single stock.\nFees are usually lower than actively managed funds.".to_string(),
                "Compound interest means returns earn returns. Starting early matters more than starting big.".to_string(),
                "An emergency fund of three to six months of expenses is a sensible first milestone.".to_string(),
            ],
        )
    }
}

impl GenerationService for MockService {
    fn profile(&self) -> ServiceProfile {
        ServiceProfile {
            service_id: MOCK_SERVICE_ID.to_string(),
            endpoint: None,
        }
    }

    fn begin_session(&self) -> Result<SessionOpening, GenerationError> {
        self.begin_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency();

        if lock_unpoisoned(&self.failures).fail_begin {
            tracing::debug!("mock service failing begin_session");
            return Err(GenerationError::Unavailable(
                "mock begin_session failure".to_string(),
            ));
        }

        Ok(SessionOpening::new(self.opening_message.clone()))
    }

    fn continue_session(
        &self,
        request: ContinueRequest,
    ) -> Result<ContinueResponse, GenerationError> {
        self.continue_calls.fetch_add(1, Ordering::SeqCst);
        lock_unpoisoned(&self.requests).push(request.clone());
        self.simulate_latency();

        if self.take_turn_failure() {
            tracing::debug!("mock service failing continue_session");
            return Err(GenerationError::Unavailable(
                "mock continue_session failure".to_string(),
            ));
        }

        let index = self.next_reply.fetch_add(1, Ordering::SeqCst) % self.replies.len();
        let reply = self.replies[index].clone();
        let updated = format!("{}\nAI: {reply}", request.conversation_history);
        let updated = updated.trim_start_matches('\n').to_string();

        Ok(ContinueResponse::new(reply, updated))
    }
}

fn sanitize_replies(replies: Vec<String>) -> Vec<String> {
    let mut sanitized: Vec<String> = replies
        .into_iter()
        .filter(|value| !value.trim().is_empty())
        .collect();

    if sanitized.is_empty() {
        sanitized.push("Understood.".to_string());
    }

    sanitized
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
