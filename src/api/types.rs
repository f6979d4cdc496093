//! Shared context for the HTTP API.

use std::sync::Arc;

use crate::config::Settings;
use crate::pipeline::completion::{CompletionClient, OpenAiTransport};
use crate::pipeline::DocumentGenerator;

/// Shared context for all API routes. Cheap to clone.
#[derive(Clone)]
pub struct ApiContext {
    pub settings: Arc<Settings>,
    pub generator: Arc<DocumentGenerator>,
}

impl ApiContext {
    /// Context backed by the HTTPS completion transport.
    pub fn new(settings: Settings) -> Self {
        let transport = OpenAiTransport::from_settings(&settings);
        let generator = DocumentGenerator::new(CompletionClient::with_transport(Box::new(transport)));
        Self::with_generator(settings, generator)
    }

    pub fn with_generator(settings: Settings, generator: DocumentGenerator) -> Self {
        Self {
            settings: Arc::new(settings),
            generator: Arc::new(generator),
        }
    }
}
