//! Text generation backend client
//!
//! The backend is a single slow, stateful resource (a local `ollama` model by
//! default). Callers never see its failures: [`BackendGateway::generate`]
//! returns the empty string for every error, panic or timeout. A timed-out
//! call is cancelled before the next one starts, so the backend never serves
//! two prompts at once.

use super::process::{run_bounded, run_with_timeout, ProcessError};
use async_trait::async_trait;
use attrib_common::config::BackendConfig;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Backend errors
#[derive(Debug, Error)]
pub enum BackendError {
    /// Backend executable could not be started
    #[error("Failed to start backend '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Backend ran but reported failure
    #[error("Backend exited with {status}: {stderr}")]
    NonZeroExit { status: String, stderr: String },

    /// Generation exceeded its deadline
    #[error("Backend timed out after {0:?}")]
    Timeout(Duration),

    #[error("Backend I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ProcessError> for BackendError {
    fn from(e: ProcessError) -> Self {
        match e {
            ProcessError::Spawn { program, source } => BackendError::Spawn {
                command: program,
                source,
            },
            ProcessError::Timeout { timeout, .. } => BackendError::Timeout(timeout),
            ProcessError::Io(e) => BackendError::Io(e),
        }
    }
}

/// Request/response text generator
///
/// Implementations must be cancel-safe: dropping the returned future stops
/// the generation.
#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Generate a completion for `prompt` with `model`
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, BackendError>;
}

/// Backend driven through `<command> run <model>` with the prompt on stdin
#[derive(Debug, Clone)]
pub struct OllamaCliBackend {
    command: String,
    timeout: Duration,
}

impl OllamaCliBackend {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(config.command.clone(), config.timeout())
    }
}

#[async_trait]
impl TextBackend for OllamaCliBackend {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, BackendError> {
        let mut command = Command::new(&self.command);
        command.arg("run").arg(model);

        let output = run_with_timeout(command, Some(prompt), self.timeout).await?;
        if !output.success() {
            return Err(BackendError::NonZeroExit {
                status: output.status.to_string(),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output.stdout.trim().to_string())
    }
}

/// Async, infallible entry point to the backend
///
/// Cloning is cheap; all clones share one backend.
#[derive(Clone)]
pub struct BackendGateway {
    backend: Arc<dyn TextBackend>,
    model: String,
    timeout: Duration,
}

impl BackendGateway {
    pub fn new(backend: Arc<dyn TextBackend>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            backend,
            model: model.into(),
            timeout,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate text, returning "" on any failure
    pub async fn generate(&self, prompt: String) -> String {
        debug!(model = %self.model, prompt_chars = prompt.len(), "Backend request");

        let backend = Arc::clone(&self.backend);
        let model = self.model.clone();
        let response = run_bounded("Backend generation", self.timeout, async move {
            backend.generate(&model, &prompt).await
        })
        .await
        .unwrap_or_default();

        debug!(response_chars = response.len(), "Backend response");
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoBackend;

    #[async_trait]
    impl TextBackend for EchoBackend {
        async fn generate(&self, model: &str, prompt: &str) -> Result<String, BackendError> {
            Ok(format!("{}:{}", model, prompt))
        }
    }

    struct BrokenBackend;

    #[async_trait]
    impl TextBackend for BrokenBackend {
        async fn generate(&self, _model: &str, _prompt: &str) -> Result<String, BackendError> {
            Err(BackendError::NonZeroExit {
                status: "exit status: 1".to_string(),
                stderr: "model not found".to_string(),
            })
        }
    }

    struct PanickingBackend;

    #[async_trait]
    impl TextBackend for PanickingBackend {
        async fn generate(&self, _model: &str, _prompt: &str) -> Result<String, BackendError> {
            panic!("backend crashed")
        }
    }

    /// Sleeps far past any gateway deadline, counting live calls
    #[derive(Default)]
    struct StuckBackend {
        live: Arc<AtomicUsize>,
        max_live: AtomicUsize,
    }

    struct LiveCall(Arc<AtomicUsize>);

    impl Drop for LiveCall {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl TextBackend for StuckBackend {
        async fn generate(&self, _model: &str, _prompt: &str) -> Result<String, BackendError> {
            let now = self.live.fetch_add(1, Ordering::SeqCst) + 1;
            let _call = LiveCall(Arc::clone(&self.live));
            self.max_live.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("too late".to_string())
        }
    }

    #[tokio::test]
    async fn test_gateway_passes_model_and_prompt() {
        let gateway = BackendGateway::new(Arc::new(EchoBackend), "gemma2:2b", Duration::from_secs(1));
        assert_eq!(gateway.generate("hi".to_string()).await, "gemma2:2b:hi");
    }

    #[tokio::test]
    async fn test_gateway_swallows_errors_and_panics() {
        let broken = BackendGateway::new(Arc::new(BrokenBackend), "m", Duration::from_secs(1));
        assert_eq!(broken.generate("x".to_string()).await, "");

        let panicking = BackendGateway::new(Arc::new(PanickingBackend), "m", Duration::from_secs(1));
        assert_eq!(panicking.generate("x".to_string()).await, "");
    }

    #[tokio::test]
    async fn test_timed_out_calls_never_overlap() {
        let backend = Arc::new(StuckBackend::default());
        let gateway = BackendGateway::new(backend.clone(), "m", Duration::from_millis(50));

        assert_eq!(gateway.generate("first".to_string()).await, "");
        assert_eq!(backend.live.load(Ordering::SeqCst), 0);
        assert_eq!(gateway.generate("second".to_string()).await, "");

        assert_eq!(backend.max_live.load(Ordering::SeqCst), 1);
        assert_eq!(backend.live.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_backend_binary_is_spawn_error() {
        let backend = OllamaCliBackend::new("attrib-missing-ollama", Duration::from_secs(1));
        assert!(matches!(
            backend.generate("gemma2:2b", "prompt").await,
            Err(BackendError::Spawn { .. })
        ));
    }
}
