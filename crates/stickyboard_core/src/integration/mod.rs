//! Seams for the hosted integrations: LLM invocation, file upload and
//! payment checkout.
//!
//! # Responsibility
//! - Define the request/response contracts core code depends on.
//! - Keep transport details out of the core; real clients live behind these
//!   traits in the host application.
//!
//! # Invariants
//! - Implementations are synchronous from the caller's point of view and
//!   never retry on their own.

pub mod mock;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub use mock::{LocalCheckout, LocalLlm, LocalUploader, ScriptedLlm};

pub type IntegrationResult<T> = Result<T, IntegrationError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrationError {
    /// Transport or service failure.
    Unavailable(String),
    /// The service answered but refused the request.
    Rejected(String),
    InvalidRequest(String),
}

impl IntegrationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "integration_unavailable",
            Self::Rejected(_) => "integration_rejected",
            Self::InvalidRequest(_) => "integration_invalid_request",
        }
    }
}

impl Display for IntegrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "integration unavailable: {message}"),
            Self::Rejected(message) => write!(f, "integration rejected request: {message}"),
            Self::InvalidRequest(message) => write!(f, "invalid integration request: {message}"),
        }
    }
}

impl Error for IntegrationError {}

/// Prompt plus an optional JSON schema the reply should follow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LlmRequest {
    pub prompt: String,
    pub response_json_schema: Option<Value>,
}

impl LlmRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response_json_schema: None,
        }
    }

    pub fn structured(prompt: impl Into<String>, schema: Value) -> Self {
        Self {
            prompt: prompt.into(),
            response_json_schema: Some(schema),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LlmResponse {
    Text(String),
    Structured(Value),
}

pub trait LlmProvider: Send + Sync {
    fn invoke(&self, request: &LlmRequest) -> IntegrationResult<LlmResponse>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub file_url: String,
}

pub trait FileUploader: Send + Sync {
    fn upload(&self, request: &UploadRequest) -> IntegrationResult<UploadedFile>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub checkout_url: Option<String>,
}

pub trait CheckoutProvider: Send + Sync {
    /// Starts a subscription checkout that returns the user to `origin_url`.
    fn initiate_checkout(&self, origin_url: &str) -> IntegrationResult<CheckoutSession>;
}

/// Bundle of integration handles shared by the services.
#[derive(Clone)]
pub struct Integrations {
    pub llm: Arc<dyn LlmProvider>,
    pub uploader: Arc<dyn FileUploader>,
    pub checkout: Arc<dyn CheckoutProvider>,
}

impl Integrations {
    /// Deterministic in-process implementations of every integration.
    pub fn local() -> Self {
        Self {
            llm: Arc::new(LocalLlm),
            uploader: Arc::new(LocalUploader),
            checkout: Arc::new(LocalCheckout),
        }
    }
}
