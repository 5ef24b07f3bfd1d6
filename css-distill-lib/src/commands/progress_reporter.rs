use crate::crawl::Progress;
use core::fmt::{Debug, Formatter};
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::task::JoinHandle;

type ProgressCallback = Box<dyn Fn() -> (u64, u64, String) + Send + Sync>;

/// Refresh rate for progress updates (10 Hz).
const REFRESH_INTERVAL_MS: u64 = 100;

const BAR_WIDTH: usize = 25;

const DETERMINATE_TEMPLATE: &str = "{prefix:>12.bold.cyan} [{bar:25}] {msg}";
const DETERMINATE_TEMPLATE_NO_COLOR: &str = "{prefix:>12} [{bar:25}] {msg}";
const INDETERMINATE_TEMPLATE: &str = "{prefix:>12.bold.cyan} [{spinner}] {msg}";
const INDETERMINATE_TEMPLATE_NO_COLOR: &str = "{prefix:>12} [{spinner}] {msg}";

struct DelayedProgressState {
    visible_after: Instant,
    visible: AtomicBool,
    is_indeterminate: AtomicBool,
    phase_start_time: Mutex<Instant>,
}

impl Debug for DelayedProgressState {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DelayedProgressState")
            .field("visible_after", &self.visible_after)
            .field("visible", &self.visible)
            .field("is_indeterminate", &self.is_indeterminate)
            .finish_non_exhaustive()
    }
}

/// A crawl progress bar on stderr that stays hidden unless the crawl takes a while.
#[derive(Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
    state: Arc<DelayedProgressState>,
    message_callback: Arc<Mutex<ProgressCallback>>,
    refresh_task: Arc<JoinHandle<()>>,
    use_colors: bool,
}

impl ProgressReporter {
    /// Create a new progress reporter.
    ///
    /// Must be called from within a tokio runtime. The bar only becomes visible once `delay` has
    /// passed; with `use_colors` false it is drawn without ANSI styling.
    #[must_use]
    pub fn new(delay: Duration, use_colors: bool) -> Self {
        let bar = ProgressBar::hidden();

        let state = Arc::new(DelayedProgressState {
            visible_after: Instant::now() + delay,
            visible: AtomicBool::new(false),
            is_indeterminate: AtomicBool::new(false),
            phase_start_time: Mutex::new(Instant::now()),
        });

        let message_callback = Arc::new(Mutex::new(Box::new(|| (0u64, 0u64, String::new())) as ProgressCallback));

        Self {
            refresh_task: Arc::new(tokio::spawn(refresh_task(
                bar.clone(),
                Arc::clone(&state),
                Arc::clone(&message_callback),
            ))),
            bar,
            state,
            message_callback,
            use_colors,
        }
    }

    fn style(&self, colored: &str, plain: &str, base: ProgressStyle) -> ProgressStyle {
        base.template(if self.use_colors { colored } else { plain })
            .expect("could not create progress bar style")
    }
}

/// Frames of a `===>` pulse sweeping right, then a `<===` pulse sweeping back.
fn bounce_frames() -> Vec<String> {
    const PULSE: usize = 4;
    let span = BAR_WIDTH + PULSE;
    let mut frames = Vec::with_capacity(span * 2);

    for end in 1..=span {
        let line: String = (0..BAR_WIDTH)
            .map(|i| match (i + 1).cmp(&end) {
                core::cmp::Ordering::Equal if end <= BAR_WIDTH => '>',
                core::cmp::Ordering::Less if i + PULSE >= end => '=',
                _ => ' ',
            })
            .collect();
        frames.push(line);
    }

    let forward = frames.clone();
    frames.extend(forward.iter().map(|frame| frame.chars().rev().map(|c| if c == '>' { '<' } else { c }).collect()));
    frames
}

impl Progress for ProgressReporter {
    fn set_phase(&self, phase: &str) {
        self.bar.set_prefix(phase.to_string());
        *self.state.phase_start_time.lock().expect("lock not poisoned") = Instant::now();
    }

    fn set_determinate(&self, callback: Box<dyn Fn() -> (u64, u64, String) + Send + Sync + 'static>) {
        *self.message_callback.lock().expect("lock not poisoned") = callback;
        self.state.is_indeterminate.store(false, Ordering::Relaxed);
        self.bar.disable_steady_tick();
        self.bar.set_length(0);
        self.bar.set_position(0);
        self.bar.set_style(
            self.style(DETERMINATE_TEMPLATE, DETERMINATE_TEMPLATE_NO_COLOR, ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
    }

    fn set_indeterminate(&self, callback: Box<dyn Fn() -> String + Send + Sync + 'static>) {
        *self.message_callback.lock().expect("lock not poisoned") = Box::new(move || (0, 0, callback()));
        *self.state.phase_start_time.lock().expect("lock not poisoned") = Instant::now();
        self.state.is_indeterminate.store(true, Ordering::Relaxed);
        self.bar.enable_steady_tick(Duration::from_millis(REFRESH_INTERVAL_MS));

        let frames = bounce_frames();
        let frames: Vec<&str> = frames.iter().map(String::as_str).collect();
        self.bar.set_style(
            self.style(INDETERMINATE_TEMPLATE, INDETERMINATE_TEMPLATE_NO_COLOR, ProgressStyle::default_spinner())
                .tick_strings(&frames),
        );
    }

    fn done(&self) {
        self.refresh_task.abort();
        if self.state.visible.load(Ordering::Relaxed) {
            self.bar.finish_and_clear();
        }
    }
}

impl Debug for ProgressReporter {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("bar", &self.bar)
            .field("state", &self.state)
            .field("use_colors", &self.use_colors)
            .finish_non_exhaustive()
    }
}

/// Background refresh task that periodically updates the progress bar.
async fn refresh_task(bar: ProgressBar, state: Arc<DelayedProgressState>, callback: Arc<Mutex<ProgressCallback>>) {
    let mut interval = tokio::time::interval(Duration::from_millis(REFRESH_INTERVAL_MS));
    #[expect(clippy::infinite_loop, reason = "task runs until aborted")]
    loop {
        let _ = interval.tick().await;

        if !state.visible.load(Ordering::Relaxed) && Instant::now() >= state.visible_after {
            state.visible.store(true, Ordering::Relaxed);
            bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
        }

        if !state.visible.load(Ordering::Relaxed) {
            continue;
        }

        let (length, position, mut message) = {
            let callback_guard = callback.lock().expect("lock not poisoned");
            callback_guard()
        };

        if state.is_indeterminate.load(Ordering::Relaxed) {
            let elapsed_secs = state.phase_start_time.lock().expect("lock not poisoned").elapsed().as_secs();
            message = format!("{elapsed_secs}s: {message}");
        }

        if length > 0 {
            bar.set_length(length);
            bar.set_position(position);
        }
        bar.set_message(message);
    }
}
