use std::collections::VecDeque;

pub const MAX_SAMPLES: usize = 1000;

/// Bounded window of instantaneous frame rates, oldest first.
pub struct FpsHistory {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl Default for FpsHistory {
    fn default() -> Self {
        Self::with_capacity(MAX_SAMPLES)
    }
}

impl FpsHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn record(&mut self, fps: f64) {
        self.samples.push_back(fps);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        let (head, tail) = self.samples.as_slices();
        Snapshot { head, tail }
    }

    pub fn stats(&self) -> Option<FpsStats> {
        self.snapshot().stats()
    }
}

/// Read-only view over the history for the duration of one tick.
#[derive(Clone, Copy)]
pub struct Snapshot<'a> {
    head: &'a [f64],
    tail: &'a [f64],
}

impl<'a> Snapshot<'a> {
    pub fn from_slice(samples: &'a [f64]) -> Self {
        Self {
            head: samples,
            tail: &[],
        }
    }

    pub fn len(&self) -> usize {
        self.head.len() + self.tail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn latest(&self) -> Option<f64> {
        self.tail.last().or_else(|| self.head.last()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + use<'a> {
        self.head.iter().chain(self.tail.iter()).copied()
    }

    #[allow(dead_code)]
    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }

    pub fn stats(&self) -> Option<FpsStats> {
        if self.is_empty() {
            return None;
        }
        let mut min = f64::MAX;
        let mut max = f64::MIN;
        let mut sum = 0.0;
        for fps in self.iter() {
            min = min.min(fps);
            max = max.max(fps);
            sum += fps;
        }
        Some(FpsStats {
            samples: self.len(),
            min,
            mean: sum / self.len() as f64,
            max,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FpsStats {
    pub samples: usize,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}
