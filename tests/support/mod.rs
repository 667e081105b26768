#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use generation_service::{
    ContinueRequest, ContinueResponse, GenerationError, GenerationService, ServiceProfile,
    SessionOpening,
};
use generation_service_mock::MockService;
use transcript_store::{KeyValueStore, MemoryStore, StoreError};

pub const OPENING: &str = "Hello! How can I help?";

/// Mock service with no simulated latency and fixed replies.
pub fn instant_service(replies: &[&str]) -> Arc<MockService> {
    Arc::new(
        MockService::new(
            OPENING,
            replies.iter().map(|reply| reply.to_string()).collect(),
        )
        .with_delay(Duration::ZERO),
    )
}

/// In-memory store whose contents stay inspectable after it is handed to a controller.
#[derive(Clone, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<MemoryStore>>,
    writes: Arc<Mutex<usize>>,
}

impl SharedStore {
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = MemoryStore::with_value(key, value).expect("valid key");
        Self {
            inner: Arc::new(Mutex::new(store)),
            writes: Arc::default(),
        }
    }

    pub fn value(&self, key: &str) -> Option<String> {
        lock_unpoisoned(&self.inner).read(key).expect("memory read")
    }

    pub fn writes(&self) -> usize {
        *lock_unpoisoned(&self.writes)
    }
}

impl KeyValueStore for SharedStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        lock_unpoisoned(&self.inner).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        *lock_unpoisoned(&self.writes) += 1;
        lock_unpoisoned(&self.inner).write(key, value)
    }
}

/// Store whose every operation fails with an I/O error.
pub struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn read(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::io(
            "reading record",
            "/broken/store",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        ))
    }

    fn write(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::io(
            "writing record",
            "/broken/store",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        ))
    }
}

/// Service that panics on every call.
pub struct PanickingService;

impl GenerationService for PanickingService {
    fn profile(&self) -> ServiceProfile {
        ServiceProfile {
            service_id: "panicking".to_string(),
            endpoint: None,
        }
    }

    fn begin_session(&self) -> Result<SessionOpening, GenerationError> {
        panic!("begin_session exploded");
    }

    fn continue_session(
        &self,
        _request: ContinueRequest,
    ) -> Result<ContinueResponse, GenerationError> {
        panic!("continue_session exploded");
    }
}

pub fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
