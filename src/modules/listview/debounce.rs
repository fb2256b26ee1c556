use std::sync::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

/// Coalesces rapid input into a single observable value: the published value
/// lags raw input by a fixed delay, and a newer input cancels the pending
/// timer of the one before it.
pub struct Debouncer {
    delay: Duration,
    output: watch::Sender<String>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        let (output, _) = watch::channel(String::new());
        Self {
            delay,
            output,
            timer: Mutex::new(None),
        }
    }

    /// Schedules `value` to be published after the delay, superseding any
    /// not-yet-fired input.
    pub fn input(&self, value: &str) {
        let mut timer = self.timer.lock().unwrap();
        if let Some(pending) = timer.take() {
            pending.abort();
        }
        let output = self.output.clone();
        let value = value.to_string();
        let delay = self.delay;
        *timer = Some(tokio::spawn(async move {
            sleep(delay).await;
            output.send_replace(value);
        }));
    }

    /// Publishes immediately, cancelling any pending input. Used by
    /// "clear all" so the reset does not lag.
    pub fn force(&self, value: &str) {
        let mut timer = self.timer.lock().unwrap();
        if let Some(pending) = timer.take() {
            pending.abort();
        }
        self.output.send_replace(value.to_string());
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.output.subscribe()
    }

    pub fn current(&self) -> String {
        self.output.borrow().clone()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(pending) = self.timer.lock().unwrap().take() {
            pending.abort();
        }
    }
}
