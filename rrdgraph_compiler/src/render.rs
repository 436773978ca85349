//! Serialized access to the graph renderer
//!
//! The renderer keeps process-wide state, so at most one invocation may be
//! in flight. Compilation itself runs concurrently; only rendering goes
//! through the gate.

use crate::host::Renderer;
use crate::logging::codes::{self, Code, Severity};
use crate::pipeline::ErrorClass;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Graph renderer failed: {message}")]
    RendererFailed { message: String },
}

impl RenderError {
    pub fn renderer_failed(message: &str) -> Self {
        Self::RendererFailed {
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        codes::render::RENDERER_FAILED
    }

    pub fn class(&self) -> ErrorClass {
        ErrorClass::Server
    }

    pub fn severity(&self) -> Severity {
        codes::get_severity(self.error_code().as_str())
    }
}

/// Process-wide mutual exclusion around one renderer
pub struct RenderGate<R> {
    renderer: Mutex<R>,
}

impl<R: Renderer> RenderGate<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer: Mutex::new(renderer),
        }
    }

    /// Run the renderer with the gate held
    ///
    /// A renderer that panicked while holding the gate does not poison it
    /// for later requests.
    pub fn render(&self, args: &[String]) -> Result<Vec<u8>, RenderError> {
        let start = Instant::now();
        let renderer = self
            .renderer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let bytes = renderer.render(args).map_err(|message| {
            let err = RenderError::renderer_failed(&message);
            crate::log_error!(err.error_code(), "Graph renderer failed",
                "reason" => message,
                "arguments" => args.len()
            );
            err
        })?;
        drop(renderer);

        crate::log_success!(codes::success::RENDER_COMPLETE, "Graph rendered",
            "bytes" => bytes.len(),
            "duration_ms" => format!("{:.2}", start.elapsed().as_secs_f64() * 1000.0)
        );

        Ok(bytes)
    }

    pub fn into_inner(self) -> R {
        self.renderer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::RecordingRenderer;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_render_passes_arguments_through() {
        let gate = RenderGate::new(RecordingRenderer::default());
        let args = vec!["rrdgraph".to_string(), "-".to_string()];

        let bytes = gate.render(&args).unwrap();
        assert_eq!(bytes, b"\x89PNG");

        let renderer = gate.into_inner();
        assert_eq!(*renderer.calls.lock().unwrap(), vec![args]);
    }

    #[test]
    fn test_renderer_failure_is_server_error() {
        let gate = RenderGate::new(RecordingRenderer {
            fail_with: Some("opening '/g/a.rrd': No such file".to_string()),
            ..RecordingRenderer::default()
        });

        let err = gate.render(&[]).unwrap_err();
        assert_eq!(err.class(), ErrorClass::Server);
        assert!(err.to_string().contains("No such file"));
    }

    #[test]
    fn test_concurrent_renders_are_all_recorded() {
        let gate = Arc::new(RenderGate::new(RecordingRenderer::default()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let gate = Arc::clone(&gate);
                thread::spawn(move || gate.render(&[format!("call{}", i)]).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let gate = Arc::try_unwrap(gate).ok().unwrap();
        assert_eq!(gate.into_inner().calls.lock().unwrap().len(), 8);
    }
}
