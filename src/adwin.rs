//! Adaptive windowing (ADWIN) change detection.

use crate::traits::DriftDetector;

/// No cut is attempted below this window size
const MIN_WINDOW: usize = 10;

/// Adaptive windowing change detector.
///
/// Keeps a window of recent observations and checks every cut point against
/// the ADWIN bound: when the means of the two sub-windows differ by more than
/// the bound allows for confidence `delta`, the stale prefix is dropped and a
/// change is signalled. The window mean doubles as the current estimate of
/// the monitored signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Adwin {
    delta: f64,
    window: Vec<f64>,
    total: f64,
    change_detected: bool,
    max_window: usize,
}

impl Adwin {
    /// Create a detector with confidence parameter `delta`, clamped to
    /// `[0.0001, 0.5]`
    pub fn new(delta: f64) -> Self {
        Adwin {
            delta: delta.max(0.0001).min(0.5),
            window: Vec::new(),
            total: 0.0,
            change_detected: false,
            max_window: 10_000,
        }
    }

    /// Bound the window size, which also bounds the per-observation cost
    pub fn with_max_window(mut self, max_window: usize) -> Self {
        self.max_window = max_window.max(MIN_WINDOW);
        self
    }

    /// Number of observations currently kept in the window
    pub fn width(&self) -> usize {
        self.window.len()
    }
}

impl Default for Adwin {
    fn default() -> Self {
        Adwin::new(0.002)
    }
}

impl DriftDetector for Adwin {
    fn add_element(&mut self, value: f64) {
        self.window.push(value);
        self.total += value;
        while self.window.len() > self.max_window {
            self.total -= self.window.remove(0);
        }

        self.change_detected = false;
        let n = self.window.len();
        if n < MIN_WINDOW {
            return;
        }

        // Exhaustive cut-point search; the cut with the largest mean
        // difference above the epsilon bound wins.
        let nf = n as f64;
        let mut best_split = None;
        let mut max_diff = 0.0;
        let mut prefix = 0.0;
        for split in 1..n {
            prefix += self.window[split - 1];
            let n0 = split as f64;
            let n1 = (n - split) as f64;
            let mu0 = prefix / n0;
            let mu1 = (self.total - prefix) / n1;

            let m = 1.0 / (1.0 / n0 + 1.0 / n1);
            let eps_cut = (2.0 / m * (nf / self.delta).ln()).sqrt() / 2.0;

            let diff = (mu0 - mu1).abs();
            if diff > eps_cut && diff > max_diff {
                max_diff = diff;
                best_split = Some(split);
            }
        }

        if let Some(split) = best_split {
            self.window.drain(..split);
            self.total = self.window.iter().sum();
            self.change_detected = true;
        }
    }

    fn estimation(&self) -> f64 {
        if self.window.is_empty() {
            0.0
        } else {
            self.total / self.window.len() as f64
        }
    }

    fn detected_change(&self) -> bool {
        self.change_detected
    }
}
