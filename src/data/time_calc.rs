use std::time::Duration;

/// Accumulates per-stage durations across inference runs.
///
/// Stage `i` is an index chosen by the caller (0 = preprocess, 1 = run, 2 = postprocess).
#[derive(Debug, Default, Clone)]
pub struct TimeCalc {
    runs: usize,
    duration: Vec<Duration>,
}

impl TimeCalc {
    pub fn total(&self) -> Duration {
        self.duration.iter().sum::<Duration>()
    }

    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Average wall time of one full run; zero before the first run.
    pub fn avg(&self) -> Duration {
        if self.runs == 0 {
            return Duration::ZERO;
        }
        self.total() / self.runs as u32
    }

    pub fn avg_i(&self, i: usize) -> Duration {
        match self.duration.get(i) {
            Some(d) if self.runs > 0 => *d / self.runs as u32,
            _ => Duration::ZERO,
        }
    }

    pub fn add_or_push(&mut self, i: usize, x: Duration) {
        match self.duration.get_mut(i) {
            Some(elem) => *elem += x,
            None => {
                self.duration.resize(i, Duration::ZERO);
                self.duration.push(x)
            }
        }
    }

    /// Marks the end of one full run.
    pub fn finish_run(&mut self) {
        self.runs += 1;
    }
}
