//! Scripted in-memory provider used by tests.

use super::{ImageOutput, ImageProvider, ImageRequest};
use crate::error::AssetError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

type Scripted = Result<Vec<ImageOutput>, AssetError>;

/// Records every request and answers from a script. Once the script runs out it returns
/// `count` inline images whose bytes are [`MockImageProvider::image_bytes`].
#[derive(Clone, Default)]
pub struct MockImageProvider {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<ImageRequest>>>,
}

impl MockImageProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next unanswered call.
    pub fn push_response(&self, response: Scripted) {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(response);
    }

    /// All requests received so far, in call order.
    pub fn requests(&self) -> Vec<ImageRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Bytes produced for image `index` (0-based) of a default response.
    pub fn image_bytes(prompt: &str, index: u32) -> Vec<u8> {
        format!("mock-image:{}:{}", prompt, index + 1).into_bytes()
    }
}

#[async_trait]
impl ImageProvider for MockImageProvider {
    async fn generate(&self, request: ImageRequest) -> Result<Vec<ImageOutput>, AssetError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let scripted = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match scripted {
            Some(response) => response,
            None => Ok((0..request.count)
                .map(|i| ImageOutput::InlineData(STANDARD.encode(Self::image_bytes(&request.prompt, i))))
                .collect()),
        }
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-image-model"
    }
}
