//! Blocking `GenerationService` adapter over the async [`FlowClient`].

use std::future::Future;
use std::sync::Arc;

use generation_service::{
    ContinueRequest, ContinueResponse, GenerationError, GenerationService, ServiceProfile,
    SessionOpening,
};

use crate::client::FlowClient;
use crate::config::HttpServiceConfig;

/// Stable service identifier used for explicit startup selection.
pub const HTTP_SERVICE_ID: &str = "http";

trait FlowTransport: Send + Sync {
    fn begin_session(&self) -> Result<SessionOpening, GenerationError>;

    fn continue_session(&self, request: &ContinueRequest)
        -> Result<ContinueResponse, GenerationError>;
}

#[derive(Debug)]
struct BlockingFlowTransport {
    client: FlowClient,
}

impl BlockingFlowTransport {
    fn block_on<F, T>(&self, future: F) -> Result<T, GenerationError>
    where
        F: Future<Output = Result<T, GenerationError>>,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                GenerationError::Unavailable(format!("failed to initialize tokio runtime: {error}"))
            })?;

        runtime.block_on(future)
    }
}

impl FlowTransport for BlockingFlowTransport {
    fn begin_session(&self) -> Result<SessionOpening, GenerationError> {
        self.block_on(self.client.begin_session())
    }

    fn continue_session(
        &self,
        request: &ContinueRequest,
    ) -> Result<ContinueResponse, GenerationError> {
        self.block_on(self.client.continue_session(request))
    }
}

/// `GenerationService` backed by the HTTP flow endpoints.
pub struct HttpService {
    base_url: String,
    transport: Arc<dyn FlowTransport>,
}

impl HttpService {
    pub fn new(config: HttpServiceConfig) -> Result<Self, GenerationError> {
        let client = FlowClient::new(config)?;

        Ok(Self {
            base_url: client.config().base_url.clone(),
            transport: Arc::new(BlockingFlowTransport { client }),
        })
    }

    #[cfg(test)]
    fn with_transport_for_tests(transport: Arc<dyn FlowTransport>) -> Self {
        Self {
            base_url: "http://test.invalid".to_string(),
            transport,
        }
    }
}

impl GenerationService for HttpService {
    fn profile(&self) -> ServiceProfile {
        ServiceProfile {
            service_id: HTTP_SERVICE_ID.to_string(),
            endpoint: Some(self.base_url.clone()),
        }
    }

    fn begin_session(&self) -> Result<SessionOpening, GenerationError> {
        self.transport.begin_session()
    }

    fn continue_session(
        &self,
        request: ContinueRequest,
    ) -> Result<ContinueResponse, GenerationError> {
        self.transport.continue_session(&request)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingTransport {
        requests: Mutex<Vec<ContinueRequest>>,
    }

    impl FlowTransport for RecordingTransport {
        fn begin_session(&self) -> Result<SessionOpening, GenerationError> {
            Err(GenerationError::Timeout)
        }

        fn continue_session(
            &self,
            request: &ContinueRequest,
        ) -> Result<ContinueResponse, GenerationError> {
            self.requests
                .lock()
                .expect("requests lock")
                .push(request.clone());
            Ok(ContinueResponse::new(
                "reply",
                format!("{}\nAI: reply", request.conversation_history),
            ))
        }
    }

    #[test]
    fn profile_reports_http_identity_and_base_url() {
        let config = HttpServiceConfig::new("http://localhost:3400").expect("config");
        let service = HttpService::new(config).expect("service");

        let profile = service.profile();
        assert_eq!(profile.service_id, HTTP_SERVICE_ID);
        assert_eq!(profile.endpoint.as_deref(), Some("http://localhost:3400"));
    }

    #[test]
    fn service_forwards_requests_and_errors_from_transport() {
        let transport = Arc::new(RecordingTransport::default());
        let service = HttpService::with_transport_for_tests(transport.clone());

        assert_eq!(service.begin_session(), Err(GenerationError::Timeout));

        let response = service
            .continue_session(ContinueRequest::new("q", "User: q"))
            .expect("continue should succeed");
        assert_eq!(response.updated_conversation_history, "User: q\nAI: reply");
        assert_eq!(
            transport.requests.lock().expect("requests lock").len(),
            1
        );
    }
}
