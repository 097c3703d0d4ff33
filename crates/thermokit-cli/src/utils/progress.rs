use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thermokit::engine::progress::{Progress, ProgressCallback};
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;
const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
const BAR_TEMPLATE: &str = "{msg:<20} [{bar:40.cyan/blue}] {pos}/{len} (eta {eta})";

/// Files finished since the current phase started.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct FileTally {
    succeeded: usize,
    failed: usize,
}

impl FileTally {
    fn record(&mut self, success: bool) {
        if success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    fn summary(&self) -> String {
        match (self.succeeded + self.failed, self.failed) {
            (0, _) => "✓ Done".to_string(),
            (total, 0) => format!("✓ {total} file(s) done"),
            (total, failed) => format!("✗ {total} file(s) done, {failed} failed"),
        }
    }
}

struct BarState {
    pb: ProgressBar,
    tally: FileTally,
}

/// Renders engine progress on stderr: a spinner per phase, a bar for files or scan points,
/// and one line per finished input.
#[derive(Clone)]
pub struct CliProgressHandler {
    state: Arc<Mutex<BarState>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Tracks the same state but draws nothing, for `-q` runs.
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::new(0).with_style(spinner_style());
        pb.set_draw_target(target);
        pb.finish_and_clear();
        Self {
            state: Arc::new(Mutex::new(BarState {
                pb,
                tally: FileTally::default(),
            })),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let state = self.state.clone();
        Box::new(move |progress: Progress| {
            let Ok(mut guard) = state.lock() else {
                warn!("Progress state mutex was poisoned; dropping progress event.");
                return;
            };
            guard.apply(progress);
        })
    }
}

impl BarState {
    fn apply(&mut self, progress: Progress) {
        let pb = &self.pb;
        match progress {
            Progress::PhaseStart { name } => {
                self.tally = FileTally::default();
                pb.reset();
                pb.set_length(0);
                pb.set_style(spinner_style());
                pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                pb.set_message(name);
            }
            Progress::PhaseFinish => {
                pb.disable_steady_tick();
                pb.finish_with_message(self.tally.summary());
            }
            Progress::TaskStart { total_steps } => {
                pb.disable_steady_tick();
                pb.reset();
                pb.set_length(total_steps);
                pb.set_style(bar_style());
            }
            Progress::TaskIncrement => pb.inc(1),
            Progress::TaskFinish => {
                if let Some(length) = pb.length() {
                    pb.set_position(length);
                }
                pb.finish();
            }
            Progress::FileFinished { path, success } => {
                self.tally.record(success);
                let mark = if success { "✓" } else { "✗" };
                pb.println(format!("  {mark} {}", path.display()));
            }
            Progress::Message(msg) if pb.is_finished() => pb.set_message(msg),
            Progress::Message(msg) => pb.println(format!("  {msg}")),
        }
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template(SPINNER_TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .map(|style| style.progress_chars("##-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}
