//! Per-frame tick timing and re-arming

/// Something that can be asked to deliver one more tick, e.g. a window
/// redraw request.
pub trait TickSource {
    fn arm(&mut self);
}

/// Timing of one tick relative to the previous one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameTiming {
    /// No earlier tick to measure against.
    First,
    /// Seconds since the previous tick. Zero or negative when the timestamp
    /// did not move forward.
    Elapsed(f64),
}

impl FrameTiming {
    /// Elapsed time usable for advancing a scene; never negative.
    pub fn elapsed_secs(&self) -> f64 {
        match *self {
            FrameTiming::First => 0.0,
            FrameTiming::Elapsed(secs) => secs.max(0.0),
        }
    }

    /// `None` whenever the reciprocal would not be a finite positive rate.
    pub fn instantaneous_fps(&self) -> Option<f64> {
        match *self {
            FrameTiming::Elapsed(secs) if secs > 0.0 => {
                Some(1.0 / secs).filter(|fps| fps.is_finite())
            }
            _ => None,
        }
    }
}

/// Tracks the previous tick timestamp and arms the following tick.
#[derive(Default)]
pub struct FrameScheduler {
    /// Timestamp of the previous tick in milliseconds
    last_timestamp: Option<f64>,
    ticks: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, source: &mut dyn TickSource) {
        log::debug!("Arming first tick");
        source.arm();
    }

    /// Records a tick at `timestamp_ms` (monotonic, milliseconds).
    pub fn observe(&mut self, timestamp_ms: f64) -> FrameTiming {
        self.ticks += 1;
        let timing = match self.last_timestamp {
            None => FrameTiming::First,
            Some(last) => FrameTiming::Elapsed((timestamp_ms - last) / 1000.0),
        };
        self.last_timestamp = Some(timestamp_ms);
        timing
    }

    pub fn rearm(&mut self, source: &mut dyn TickSource) {
        source.arm();
    }

    #[allow(dead_code)]
    pub fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
