//! Recording doubles for the rendering capabilities.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use image::RgbaImage;

use crate::error::RenderError;
use crate::scene::{Aabb, Alignment, DrawSurface, Fit, RenderResult, Scene, StateMachine};
use crate::scheduler::TickSource;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    MachineAdvance(f32),
    SceneAdvance(f32),
    Draw,
    Clear,
    Save,
    Restore,
    Align(Fit),
    Fill,
    Overlay,
    Flush,
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

pub fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn count(log: &CallLog, predicate: impl Fn(&Call) -> bool) -> usize {
    log.borrow().iter().filter(|call| predicate(call)).count()
}

pub struct RecordingMachine {
    log: CallLog,
}

impl StateMachine for RecordingMachine {
    fn advance(&mut self, dt: f32) -> RenderResult {
        self.log.borrow_mut().push(Call::MachineAdvance(dt));
        Ok(())
    }
}

pub struct RecordingScene {
    log: CallLog,
    machine: Option<RecordingMachine>,
    pub fail_advance: bool,
    pub fail_draw: bool,
}

impl RecordingScene {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: Rc::clone(log),
            machine: Some(RecordingMachine {
                log: Rc::clone(log),
            }),
            fail_advance: false,
            fail_draw: false,
        }
    }

    pub fn without_machine(log: &CallLog) -> Self {
        Self {
            machine: None,
            ..Self::new(log)
        }
    }
}

impl Scene for RecordingScene {
    fn bounds(&self) -> Aabb {
        Aabb::from_size(100.0, 50.0)
    }

    fn advance(&mut self, dt: f32) -> RenderResult {
        if self.fail_advance {
            return Err(RenderError::Advance("scripted failure".into()));
        }
        self.log.borrow_mut().push(Call::SceneAdvance(dt));
        Ok(())
    }

    fn draw(&self, surface: &mut dyn DrawSurface) -> RenderResult {
        if self.fail_draw {
            return Err(RenderError::Draw("scripted failure".into()));
        }
        self.log.borrow_mut().push(Call::Draw);
        surface.fill(
            &[Vec2::ZERO, Vec2::new(100.0, 0.0), Vec2::new(0.0, 50.0)],
            [1.0, 0.0, 0.0, 1.0],
        )
    }

    fn state_machine_mut(&mut self) -> Option<&mut dyn StateMachine> {
        self.machine
            .as_mut()
            .map(|machine| machine as &mut dyn StateMachine)
    }
}

pub struct RecordingSurface {
    log: CallLog,
    depth: usize,
    pub last_overlay: Option<RgbaImage>,
    pub fail_flush: bool,
}

impl RecordingSurface {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: Rc::clone(log),
            depth: 0,
            last_overlay: None,
            fail_flush: false,
        }
    }
}

impl DrawSurface for RecordingSurface {
    fn bounds(&self) -> Aabb {
        Aabb::from_size(640.0, 480.0)
    }

    fn clear(&mut self) {
        self.log.borrow_mut().push(Call::Clear);
    }

    fn save(&mut self) {
        self.depth += 1;
        self.log.borrow_mut().push(Call::Save);
    }

    fn restore(&mut self) -> RenderResult {
        if self.depth == 0 {
            return Err(RenderError::UnbalancedRestore);
        }
        self.depth -= 1;
        self.log.borrow_mut().push(Call::Restore);
        Ok(())
    }

    fn align(&mut self, fit: Fit, _alignment: Alignment, _frame: Aabb, _content: Aabb) {
        self.log.borrow_mut().push(Call::Align(fit));
    }

    fn fill(&mut self, _vertices: &[Vec2], _color: [f32; 4]) -> RenderResult {
        self.log.borrow_mut().push(Call::Fill);
        Ok(())
    }

    fn set_overlay(&mut self, overlay: &RgbaImage) {
        self.last_overlay = Some(overlay.clone());
        self.log.borrow_mut().push(Call::Overlay);
    }

    fn flush(&mut self) -> RenderResult {
        if self.fail_flush {
            return Err(RenderError::Surface(wgpu::SurfaceError::Lost));
        }
        self.log.borrow_mut().push(Call::Flush);
        Ok(())
    }
}

#[derive(Default)]
pub struct ManualTicks {
    pub armed: usize,
}

impl TickSource for ManualTicks {
    fn arm(&mut self) {
        self.armed += 1;
    }
}
