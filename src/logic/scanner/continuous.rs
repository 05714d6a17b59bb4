//! Continuous Scanning
//!
//! Repeated, independent `scan` calls at a fixed interval. The loop holds no
//! state between iterations; callers keep their detector outside it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::logic::network::ScanResult;

use super::Scanner;

/// Granularity of the stop-flag check while waiting for the next scan
const STOP_CHECK_INTERVAL: Duration = Duration::from_millis(100);

/// Scan until `stop` is set. Returns the number of completed scans.
///
/// `on_result` may set `stop` itself, e.g. after a fixed number of scans.
pub fn run_continuous<S, F>(
    scanner: &S,
    interval: Duration,
    timeout: Duration,
    stop: &AtomicBool,
    mut on_result: F,
) -> usize
where
    S: Scanner + ?Sized,
    F: FnMut(ScanResult),
{
    log::info!("Continuous scanning started ({}, every {:?})", scanner.name(), interval);
    let mut completed = 0;

    while !stop.load(Ordering::SeqCst) {
        let started = Instant::now();
        on_result(scanner.scan(timeout));
        completed += 1;

        // Interval is measured start-to-start
        let next = started + interval;
        while !stop.load(Ordering::SeqCst) {
            let now = Instant::now();
            if now >= next {
                break;
            }
            thread::sleep((next - now).min(STOP_CHECK_INTERVAL));
        }
    }

    log::info!("Continuous scanning stopped after {} scans", completed);
    completed
}

/// Background scan loop
pub struct ContinuousHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<usize>>,
}

impl ContinuousHandle {
    /// Ask the loop to stop after the current scan
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    /// Stop and wait; returns the number of completed scans
    pub fn join(mut self) -> usize {
        self.stop();
        self.thread
            .take()
            .and_then(|t| t.join().ok())
            .unwrap_or(0)
    }
}

impl Drop for ContinuousHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Run [`run_continuous`] on a background thread
pub fn spawn_continuous<F>(
    scanner: Arc<dyn Scanner>,
    interval: Duration,
    timeout: Duration,
    on_result: F,
) -> ContinuousHandle
where
    F: FnMut(ScanResult) + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    let thread = thread::spawn(move || run_continuous(scanner.as_ref(), interval, timeout, &flag, on_result));

    ContinuousHandle {
        stop,
        thread: Some(thread),
    }
}
