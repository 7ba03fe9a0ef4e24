use image::RgbaImage;

use crate::control::{ControlSignal, RenderCount};
use crate::driver::SceneDriver;
use crate::error::Result;
use crate::fps::FpsHistory;
use crate::scene::{DrawSurface, Scene};
use crate::scheduler::{FrameScheduler, FrameTiming, TickSource};
use crate::visualizer::FpsVisualizer;

/// What a single tick did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    pub timing: FrameTiming,
    /// FPS recorded into the history, if the tick produced one.
    pub sample: Option<f64>,
    pub draw_count: u32,
}

/// Owns every piece of per-frame state and runs one tick at a time.
pub struct Harness<S: Scene, D: DrawSurface> {
    scheduler: FrameScheduler,
    history: FpsHistory,
    render_count: RenderCount,
    visualizer: FpsVisualizer,
    overlay: RgbaImage,
    show_overlay: bool,
    driver: SceneDriver<S>,
    surface: D,
}

impl<S: Scene, D: DrawSurface> Harness<S, D> {
    pub fn new(scene: S, surface: D, render_count: RenderCount) -> Self {
        let visualizer = FpsVisualizer::new();
        Self {
            scheduler: FrameScheduler::new(),
            history: FpsHistory::new(),
            render_count,
            overlay: visualizer.blank_canvas(),
            visualizer,
            show_overlay: true,
            driver: SceneDriver::new(scene),
            surface,
        }
    }

    pub fn with_overlay(mut self, show_overlay: bool) -> Self {
        self.show_overlay = show_overlay;
        self
    }

    pub fn start(&mut self, source: &mut dyn TickSource) {
        self.scheduler.start(source);
    }

    /// Runs one tick at `timestamp_ms`. The next tick is armed only when this
    /// one succeeds; an error ends the loop unless the caller re-arms.
    pub fn tick(&mut self, timestamp_ms: f64, source: &mut dyn TickSource) -> Result<TickReport> {
        let timing = self.scheduler.observe(timestamp_ms);

        let sample = timing.instantaneous_fps();
        match sample {
            Some(fps) => self.history.record(fps),
            None => log::debug!("No FPS sample for tick {timing:?}"),
        }

        self.visualizer
            .render_into(self.history.snapshot(), &mut self.overlay);
        if self.show_overlay {
            self.surface.set_overlay(&self.overlay);
        }

        let draw_count = self.render_count.value();
        self.driver
            .advance_and_draw(&mut self.surface, timing.elapsed_secs() as f32, draw_count)?;

        self.scheduler.rearm(source);

        Ok(TickReport {
            timing,
            sample,
            draw_count,
        })
    }

    pub fn signal(&mut self, signal: ControlSignal) -> u32 {
        signal.apply(&mut self.render_count)
    }

    pub fn render_count(&self) -> u32 {
        self.render_count.value()
    }

    pub fn set_render_count(&mut self, value: u32) {
        self.render_count.set(value);
    }

    pub fn history(&self) -> &FpsHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut FpsHistory {
        &mut self.history
    }

    pub fn overlay(&self) -> &RgbaImage {
        &self.overlay
    }

    #[allow(dead_code)]
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut D {
        &mut self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarnessError;
    use crate::testing::{
        Call, CallLog, ManualTicks, RecordingScene, RecordingSurface, call_log, count,
    };

    fn harness(log: &CallLog) -> Harness<RecordingScene, RecordingSurface> {
        Harness::new(
            RecordingScene::new(log),
            RecordingSurface::new(log),
            RenderCount::new(),
        )
    }

    #[test]
    fn sixty_hz_ticks_record_after_first() {
        let log = call_log();
        let mut harness = harness(&log);
        let mut ticks = ManualTicks::default();
        harness.start(&mut ticks);

        let reports: Vec<TickReport> = [0.0, 16.67, 33.33]
            .into_iter()
            .map(|t| harness.tick(t, &mut ticks).unwrap())
            .collect();

        assert_eq!(reports[0].sample, None);
        let samples = harness.history().snapshot().to_vec();
        assert_eq!(samples.len(), 2);
        for fps in samples {
            assert!(fps > 59.9 && fps < 60.1, "fps {fps}");
        }
        assert!(reports.iter().all(|report| report.draw_count == 1));
        assert_eq!(count(&log, |c| matches!(c, Call::SceneAdvance(_))), 3);
        assert_eq!(count(&log, |c| *c == Call::Draw), 3);
        assert_eq!(ticks.armed, 4);
    }

    #[test]
    fn first_tick_still_advances_and_draws() {
        let log = call_log();
        let mut harness = harness(&log);
        harness.set_render_count(3);
        let mut ticks = ManualTicks::default();

        let report = harness.tick(500.0, &mut ticks).unwrap();

        assert_eq!(report.timing, FrameTiming::First);
        assert!(harness.history().is_empty());
        assert_eq!(count(&log, |c| *c == Call::SceneAdvance(0.0)), 1);
        assert_eq!(count(&log, |c| *c == Call::Draw), 3);
    }

    #[test]
    fn duplicate_timestamp_skips_sample_but_draws() {
        let log = call_log();
        let mut harness = harness(&log);
        harness.set_render_count(5);
        let mut ticks = ManualTicks::default();

        harness.tick(0.0, &mut ticks).unwrap();
        harness.tick(20.0, &mut ticks).unwrap();
        let before = harness.history().len();
        log.borrow_mut().clear();

        let report = harness.tick(20.0, &mut ticks).unwrap();

        assert_eq!(report.sample, None);
        assert_eq!(harness.history().len(), before);
        assert!(harness.history().snapshot().iter().all(f64::is_finite));
        assert_eq!(count(&log, |c| *c == Call::SceneAdvance(0.0)), 1);
        assert_eq!(count(&log, |c| *c == Call::Draw), 5);
        assert_eq!(count(&log, |c| *c == Call::Flush), 1);
    }

    #[test]
    fn control_changes_apply_on_next_tick() {
        let log = call_log();
        let mut harness = harness(&log);
        let mut ticks = ManualTicks::default();

        harness.tick(0.0, &mut ticks).unwrap();
        assert_eq!(harness.signal(ControlSignal::Increment), 2);
        assert_eq!(harness.signal(ControlSignal::Increment), 3);
        let report = harness.tick(16.0, &mut ticks).unwrap();

        assert_eq!(report.draw_count, 3);
        assert_eq!(count(&log, |c| *c == Call::Draw), 1 + 3);
    }

    #[test]
    fn overlay_is_refreshed_every_tick() {
        let log = call_log();
        let mut harness = harness(&log);
        let mut ticks = ManualTicks::default();

        harness.tick(0.0, &mut ticks).unwrap();
        harness.tick(10.0, &mut ticks).unwrap();

        assert_eq!(count(&log, |c| *c == Call::Overlay), 2);
        let expected = FpsVisualizer::new().render(harness.history().snapshot());
        assert_eq!(harness.overlay().as_raw(), expected.as_raw());
        assert_eq!(
            harness.surface().last_overlay.as_ref().map(|image| image.as_raw()),
            Some(expected.as_raw())
        );
    }

    #[test]
    fn hidden_overlay_is_not_sent_to_surface() {
        let log = call_log();
        let mut harness = harness(&log).with_overlay(false);
        let mut ticks = ManualTicks::default();

        harness.tick(0.0, &mut ticks).unwrap();

        assert_eq!(count(&log, |c| *c == Call::Overlay), 0);
    }

    #[test]
    fn failed_tick_is_not_rearmed() {
        let log = call_log();
        let mut harness = harness(&log);
        harness.surface_mut().fail_flush = true;
        let mut ticks = ManualTicks::default();

        let result = harness.tick(0.0, &mut ticks);

        assert!(matches!(result, Err(HarnessError::Render(_))));
        assert_eq!(ticks.armed, 0);
    }

    #[test]
    fn history_stays_bounded_over_long_runs() {
        let log = call_log();
        let mut harness = harness(&log);
        let mut ticks = ManualTicks::default();

        for frame in 0..1200 {
            harness.tick(frame as f64 * 10.0, &mut ticks).unwrap();
        }

        assert_eq!(harness.history().len(), 1000);
        assert_eq!(harness.scheduler().ticks(), 1200);
    }
}
