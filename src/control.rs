pub const MIN_RENDER_COUNT: u32 = 1;
pub const MAX_RENDER_COUNT: u32 = 100;

/// How many times the scene is drawn per frame. Always within
/// `MIN_RENDER_COUNT..=MAX_RENDER_COUNT`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderCount {
    value: u32,
}

impl Default for RenderCount {
    fn default() -> Self {
        Self {
            value: MIN_RENDER_COUNT,
        }
    }
}

impl RenderCount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: u32) -> Self {
        let mut count = Self::default();
        count.set(value);
        count
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn increment(&mut self) -> u32 {
        self.set(self.value.saturating_add(1));
        self.value
    }

    pub fn decrement(&mut self) -> u32 {
        self.set(self.value.saturating_sub(1));
        self.value
    }

    /// Out-of-range writes are clamped, not rejected.
    pub fn set(&mut self, value: u32) {
        self.value = value.clamp(MIN_RENDER_COUNT, MAX_RENDER_COUNT);
    }
}

/// Discrete operator signals feeding [`RenderCount`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlSignal {
    Increment,
    Decrement,
    Reset,
}

impl ControlSignal {
    pub fn apply(self, count: &mut RenderCount) -> u32 {
        match self {
            ControlSignal::Increment => count.increment(),
            ControlSignal::Decrement => count.decrement(),
            ControlSignal::Reset => {
                count.set(MIN_RENDER_COUNT);
                count.value()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_one() {
        assert_eq!(RenderCount::new().value(), 1);
    }

    #[test]
    fn decrement_at_floor_is_noop() {
        let mut count = RenderCount::new();
        assert_eq!(count.decrement(), 1);
        assert_eq!(count.value(), 1);
    }

    #[test]
    fn increment_at_ceiling_is_noop() {
        let mut count = RenderCount::with_value(100);
        assert_eq!(count.increment(), 100);
    }

    #[test]
    fn sweep_up_then_down_stays_in_range() {
        let mut count = RenderCount::new();
        for _ in 0..99 {
            count.increment();
            assert!((1..=100).contains(&count.value()));
        }
        assert_eq!(count.value(), 100);

        for _ in 0..150 {
            count.decrement();
            assert!((1..=100).contains(&count.value()));
        }
        assert_eq!(count.value(), 1);
    }

    #[test]
    fn direct_writes_are_clamped() {
        let mut count = RenderCount::new();
        count.set(0);
        assert_eq!(count.value(), 1);
        count.set(5000);
        assert_eq!(count.value(), 100);
        assert_eq!(RenderCount::with_value(42).value(), 42);
    }

    #[test]
    fn reset_signal_returns_to_floor() {
        let mut count = RenderCount::with_value(37);
        assert_eq!(ControlSignal::Reset.apply(&mut count), 1);
        assert_eq!(ControlSignal::Increment.apply(&mut count), 2);
        assert_eq!(ControlSignal::Decrement.apply(&mut count), 1);
    }
}
