//! Local integration implementations for offline runs and tests.

use super::{
    CheckoutProvider, CheckoutSession, FileUploader, IntegrationError, IntegrationResult,
    LlmProvider, LlmRequest, LlmResponse, UploadRequest, UploadedFile,
};
use log::debug;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;

pub const LOCAL_LLM_REPLY: &str = "Mock LLM response: Hello from your AI mock!";
pub const LOCAL_CHECKOUT_URL: &str = "https://mock-checkout-url.com";

/// Answers every prompt with a fixed greeting and no suggestions.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalLlm;

impl LlmProvider for LocalLlm {
    fn invoke(&self, request: &LlmRequest) -> IntegrationResult<LlmResponse> {
        debug!(
            "event=llm_invoke module=integration status=ok provider=local prompt_len={} structured={}",
            request.prompt.len(),
            request.response_json_schema.is_some()
        );
        match request.response_json_schema {
            Some(_) => Ok(LlmResponse::Structured(json!({ "responseText": LOCAL_LLM_REPLY }))),
            None => Ok(LlmResponse::Text(LOCAL_LLM_REPLY.to_string())),
        }
    }
}

/// Pretends to store the file and hands back a stable pseudo URL.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalUploader;

impl FileUploader for LocalUploader {
    fn upload(&self, request: &UploadRequest) -> IntegrationResult<UploadedFile> {
        let name = request.file_name.trim();
        if name.is_empty() {
            return Err(IntegrationError::InvalidRequest(
                "file name must not be blank".to_string(),
            ));
        }
        debug!(
            "event=file_upload module=integration status=ok provider=local size_bytes={}",
            request.bytes.len()
        );
        Ok(UploadedFile {
            file_url: format!("mock-file-url/{name}"),
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalCheckout;

impl CheckoutProvider for LocalCheckout {
    fn initiate_checkout(&self, _origin_url: &str) -> IntegrationResult<CheckoutSession> {
        Ok(CheckoutSession {
            checkout_url: Some(LOCAL_CHECKOUT_URL.to_string()),
        })
    }
}

/// Replays queued replies in order and records every prompt it receives.
///
/// Once the queue is empty every call fails with `Unavailable`.
#[derive(Debug, Default)]
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<IntegrationResult<LlmResponse>>>,
    prompts: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    pub fn new<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = IntegrationResult<LlmResponse>>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        match self.prompts.lock() {
            Ok(prompts) => prompts.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl LlmProvider for ScriptedLlm {
    fn invoke(&self, request: &LlmRequest) -> IntegrationResult<LlmResponse> {
        match self.prompts.lock() {
            Ok(mut prompts) => prompts.push(request.clone()),
            Err(poisoned) => poisoned.into_inner().push(request.clone()),
        }
        let next = match self.replies.lock() {
            Ok(mut replies) => replies.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        };
        next.unwrap_or_else(|| {
            Err(IntegrationError::Unavailable(
                "no scripted reply left".to_string(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{LocalLlm, LocalUploader, ScriptedLlm, LOCAL_LLM_REPLY};
    use crate::integration::{
        FileUploader, IntegrationError, LlmProvider, LlmRequest, LlmResponse, UploadRequest,
    };
    use serde_json::json;

    #[test]
    fn local_llm_wraps_reply_when_schema_requested() {
        let reply = LocalLlm
            .invoke(&LlmRequest::structured("hi", json!({"type": "object"})))
            .unwrap();
        assert_eq!(
            reply,
            LlmResponse::Structured(json!({ "responseText": LOCAL_LLM_REPLY }))
        );
    }

    #[test]
    fn local_uploader_rejects_blank_name() {
        let err = LocalUploader
            .upload(&UploadRequest {
                file_name: " ".to_string(),
                mime_type: "image/png".to_string(),
                bytes: vec![1, 2, 3],
            })
            .unwrap_err();
        assert!(matches!(err, IntegrationError::InvalidRequest(_)));
    }

    #[test]
    fn scripted_llm_fails_after_queue_drains() {
        let llm = ScriptedLlm::new([Ok(LlmResponse::Text("one".to_string()))]);
        assert!(llm.invoke(&LlmRequest::text("a")).is_ok());
        assert!(matches!(
            llm.invoke(&LlmRequest::text("b")),
            Err(IntegrationError::Unavailable(_))
        ));
        assert_eq!(llm.requests().len(), 2);
    }
}
