use serde::Serialize;
use std::time::Duration;

/// Counters for one compile
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompileStats {
    pub commands: usize,
    pub options: usize,
    pub matches: usize,
    pub arguments: usize,
    pub duration: Duration,
}

impl CompileStats {
    pub fn duration_ms(&self) -> f64 {
        self.duration.as_secs_f64() * 1000.0
    }

    /// Arguments emitted per declared command; above 1.0 when sources fan out
    pub fn expansion_ratio(&self) -> f64 {
        if self.commands == 0 {
            0.0
        } else {
            self.arguments.saturating_sub(self.options) as f64 / self.commands as f64
        }
    }
}
