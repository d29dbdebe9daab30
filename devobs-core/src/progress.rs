//! Progress reporting for in-flight backend requests.
//!
//! The CLI uses `IndicatifReporter` to show a spinner while a call is
//! pending. Library callers can use `NoopReporter` or provide their own.

use std::future::Future;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Trait for reporting the lifecycle of one request.
pub trait ProgressReporter: Send + Sync {
    /// A request described by `task` is now pending.
    fn start(&self, task: &str);

    /// The pending request finished, successfully or not.
    fn finish(&self);
}

#[derive(Debug, Default)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn start(&self, _task: &str) {}
    fn finish(&self) {}
}

/// Spinner on stderr backed by `indicatif`.
#[derive(Debug)]
pub struct IndicatifReporter {
    bar: ProgressBar,
}

impl Default for IndicatifReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatifReporter {
    pub fn new() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Reporter that draws to stderr.
    pub fn stderr() -> Self {
        Self {
            bar: ProgressBar::new_spinner(),
        }
    }
}

impl ProgressReporter for IndicatifReporter {
    fn start(&self, task: &str) {
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg} ({elapsed})") {
            self.bar.set_style(style);
        }
        self.bar.set_message(task.to_string());
        self.bar.reset();
        self.bar.enable_steady_tick(Duration::from_millis(100));
    }

    fn finish(&self) {
        self.bar.disable_steady_tick();
        self.bar.finish_and_clear();
    }
}

/// Run `fut` with `reporter` showing `task` until it settles.
pub async fn track<F, T>(reporter: &dyn ProgressReporter, task: &str, fut: F) -> T
where
    F: Future<Output = T>,
{
    reporter.start(task);
    let out = fut.await;
    reporter.finish();
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recording(Mutex<Vec<String>>);

    impl ProgressReporter for Recording {
        fn start(&self, task: &str) {
            self.0.lock().unwrap().push(format!("start {task}"));
        }
        fn finish(&self) {
            self.0.lock().unwrap().push("finish".into());
        }
    }

    #[test]
    fn noop_reporter_is_silent() {
        let reporter = NoopReporter;
        reporter.start("test");
        reporter.finish();
    }

    #[test]
    fn indicatif_reporter_lifecycle() {
        let reporter = IndicatifReporter::new();
        reporter.start("Fetching repositories");
        reporter.finish();
    }

    #[tokio::test]
    async fn track_brackets_the_future() {
        let reporter = Recording::default();
        let value = track(&reporter, "Loading", async { 7 }).await;
        assert_eq!(value, 7);
        assert_eq!(
            *reporter.0.lock().unwrap(),
            vec!["start Loading".to_string(), "finish".to_string()]
        );
    }
}
