//! Completion client: drives a [`CompletionTransport`] with bounded
//! exponential backoff on rate limiting and network failures, and a one-time
//! switch to the fallback model when the primary model is unavailable.

use std::time::Duration;

use super::credential::ApiCredential;
use super::types::{CompletionTransport, GenerationResult};
use super::{CompletionError, TransportError};
use crate::pipeline::registry::{FALLBACK_MODEL, PRIMARY_MODEL};
use crate::pipeline::request::GenerationRequest;

/// Retry budget for one completion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (so `max_retries + 1` calls at most).
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt + 1`: `base_delay * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Blocks the calling thread between attempts.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Real wall-clock sleeping.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

pub struct CompletionClient {
    transport: Box<dyn CompletionTransport + Send + Sync>,
    policy: RetryPolicy,
    sleeper: Box<dyn Sleeper + Send + Sync>,
}

impl CompletionClient {
    pub fn new(
        transport: Box<dyn CompletionTransport + Send + Sync>,
        policy: RetryPolicy,
        sleeper: Box<dyn Sleeper + Send + Sync>,
    ) -> Self {
        Self {
            transport,
            policy,
            sleeper,
        }
    }

    /// Default policy with real sleeping.
    pub fn with_transport(transport: Box<dyn CompletionTransport + Send + Sync>) -> Self {
        Self::new(transport, RetryPolicy::default(), Box::new(ThreadSleeper))
    }

    /// Execute a request to completion.
    ///
    /// - 429 and network failures are retried up to `max_retries` times,
    ///   sleeping `base_delay * 2^n` before retry `n + 1`.
    /// - 404 while requesting [`PRIMARY_MODEL`] switches to [`FALLBACK_MODEL`]
    ///   immediately. The switch does not consume a retry and happens at
    ///   most once, since the fallback is never the primary.
    /// - Anything else fails at once.
    pub fn complete(
        &self,
        request: &GenerationRequest,
        credential: &ApiCredential,
    ) -> Result<GenerationResult, CompletionError> {
        let mut current = request.clone();
        let mut attempt: u32 = 0;

        loop {
            match self.transport.send(&current, credential) {
                Ok(response) => {
                    tracing::debug!(
                        model = %current.model,
                        retries = attempt,
                        "Completion call succeeded"
                    );
                    return Ok(GenerationResult::from_response(response, current.model));
                }
                Err(TransportError::Status { status: 404, .. }) if current.model == PRIMARY_MODEL => {
                    tracing::warn!(
                        from = PRIMARY_MODEL,
                        to = FALLBACK_MODEL,
                        "Model unavailable, falling back"
                    );
                    current.model = FALLBACK_MODEL.to_string();
                }
                Err(e) if e.is_retryable() && attempt < self.policy.max_retries => {
                    let delay = self.policy.delay_for(attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Completion call failed, retrying"
                    );
                    self.sleeper.sleep(delay);
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(
                        model = %current.model,
                        status = ?e.status(),
                        error = %e,
                        "Completion call failed"
                    );
                    return Err(e.into());
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport and recording sleeper shared by pipeline tests.

    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::pipeline::completion::types::{ChatCompletionResponse, ChoiceMessage, Choice, TokenUsage};

    pub fn ok_response(content: &str) -> ChatCompletionResponse {
        ChatCompletionResponse {
            choices: vec![Choice {
                message: Some(ChoiceMessage {
                    content: Some(content.to_string()),
                }),
            }],
            usage: Some(TokenUsage {
                prompt_tokens: 100,
                completion_tokens: 50,
                total_tokens: 150,
            }),
        }
    }

    pub fn status(code: u16) -> TransportError {
        TransportError::Status {
            status: code,
            message: format!("status {code}"),
        }
    }

    /// Replays a fixed sequence of outcomes and records the model of each call.
    #[derive(Clone, Default)]
    pub struct ScriptedTransport {
        script: Arc<Mutex<VecDeque<Result<ChatCompletionResponse, TransportError>>>>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedTransport {
        pub fn new(script: Vec<Result<ChatCompletionResponse, TransportError>>) -> Self {
            Self {
                script: Arc::new(Mutex::new(script.into())),
                calls: Arc::default(),
            }
        }

        /// Models requested, one entry per call.
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CompletionTransport for ScriptedTransport {
        fn send(
            &self,
            request: &GenerationRequest,
            _credential: &ApiCredential,
        ) -> Result<ChatCompletionResponse, TransportError> {
            self.calls.lock().unwrap().push(request.model.clone());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Network("script exhausted".into())))
        }
    }

    /// Records requested delays instead of sleeping.
    #[derive(Clone, Default)]
    pub struct RecordingSleeper {
        slept: Arc<Mutex<Vec<Duration>>>,
    }

    impl RecordingSleeper {
        pub fn slept(&self) -> Vec<Duration> {
            self.slept.lock().unwrap().clone()
        }
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }
}
