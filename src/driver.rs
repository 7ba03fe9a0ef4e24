use crate::scene::{Alignment, DrawSurface, Fit, RenderResult, Scene};

/// Advances a scene once per frame and draws it `draw_count` times.
pub struct SceneDriver<S: Scene> {
    scene: S,
}

impl<S: Scene> SceneDriver<S> {
    pub fn new(scene: S) -> Self {
        Self { scene }
    }

    /// Only the draw is repeated; state is advanced exactly once. All draws
    /// share one aligned transform and one flush.
    pub fn advance_and_draw(
        &mut self,
        surface: &mut dyn DrawSurface,
        elapsed_secs: f32,
        draw_count: u32,
    ) -> RenderResult {
        if let Some(machine) = self.scene.state_machine_mut() {
            machine.advance(elapsed_secs)?;
        }
        self.scene.advance(elapsed_secs)?;

        let frame = surface.bounds();
        let content = self.scene.bounds();

        surface.clear();
        surface.save();
        surface.align(Fit::Contain, Alignment::CENTER, frame, content);
        let drawn = (0..draw_count).try_for_each(|_| self.scene.draw(&mut *surface));
        surface.restore()?;
        drawn?;

        surface.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, RecordingScene, RecordingSurface, call_log, count};

    #[test]
    fn issues_k_draws_one_advance_one_flush() {
        for k in [1, 2, 17, 100] {
            let log = call_log();
            let mut driver = SceneDriver::new(RecordingScene::new(&log));
            let mut surface = RecordingSurface::new(&log);

            driver.advance_and_draw(&mut surface, 0.016, k).unwrap();

            assert_eq!(count(&log, |c| *c == Call::Draw), k as usize);
            assert_eq!(count(&log, |c| matches!(c, Call::SceneAdvance(_))), 1);
            assert_eq!(count(&log, |c| matches!(c, Call::MachineAdvance(_))), 1);
            assert_eq!(count(&log, |c| *c == Call::Flush), 1);
            assert_eq!(count(&log, |c| *c == Call::Save), 1);
            assert_eq!(count(&log, |c| *c == Call::Restore), 1);
        }
    }

    #[test]
    fn draws_happen_inside_one_aligned_scope_before_flush() {
        let log = call_log();
        let mut driver = SceneDriver::new(RecordingScene::new(&log));
        let mut surface = RecordingSurface::new(&log);

        driver.advance_and_draw(&mut surface, 0.5, 2).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                Call::MachineAdvance(0.5),
                Call::SceneAdvance(0.5),
                Call::Clear,
                Call::Save,
                Call::Align(Fit::Contain),
                Call::Draw,
                Call::Fill,
                Call::Draw,
                Call::Fill,
                Call::Restore,
                Call::Flush,
            ]
        );
    }

    #[test]
    fn scene_without_state_machine_still_advances() {
        let log = call_log();
        let mut driver = SceneDriver::new(RecordingScene::without_machine(&log));
        let mut surface = RecordingSurface::new(&log);

        driver.advance_and_draw(&mut surface, 0.0, 3).unwrap();

        assert_eq!(count(&log, |c| matches!(c, Call::MachineAdvance(_))), 0);
        assert_eq!(count(&log, |c| *c == Call::SceneAdvance(0.0)), 1);
        assert_eq!(count(&log, |c| *c == Call::Draw), 3);
    }

    #[test]
    fn draw_failure_restores_and_skips_flush() {
        let log = call_log();
        let mut scene = RecordingScene::new(&log);
        scene.fail_draw = true;
        let mut driver = SceneDriver::new(scene);
        let mut surface = RecordingSurface::new(&log);

        assert!(driver.advance_and_draw(&mut surface, 0.016, 4).is_err());
        assert_eq!(count(&log, |c| *c == Call::Restore), 1);
        assert_eq!(count(&log, |c| *c == Call::Flush), 0);
    }

    #[test]
    fn advance_failure_draws_nothing() {
        let log = call_log();
        let mut scene = RecordingScene::new(&log);
        scene.fail_advance = true;
        let mut driver = SceneDriver::new(scene);
        let mut surface = RecordingSurface::new(&log);

        assert!(driver.advance_and_draw(&mut surface, 0.016, 4).is_err());
        assert_eq!(count(&log, |c| *c == Call::Draw), 0);
        assert_eq!(count(&log, |c| *c == Call::Save), 0);
    }
}
