use std::time::Instant;

use image::RgbaImage;
use winit::event::{ElementState, WindowEvent};
use winit::window::Window;

use crate::config::AppConfig;
use crate::control::{ControlSignal, RenderCount};
use crate::demo::OrbitScene;
use crate::error::{HarnessError, RenderError, Result};
use crate::harness::{Harness, TickReport};
use crate::render::WgpuSurface;
use crate::scheduler::TickSource;

/// Arms the next tick by asking the window for another redraw.
struct RedrawTicks<'a> {
    window: &'a Window,
}

impl TickSource for RedrawTicks<'_> {
    fn arm(&mut self) {
        self.window.request_redraw();
    }
}

pub struct AppState {
    // Declared before `window` so the surface is dropped first.
    harness: Harness<OrbitScene, WgpuSurface>,
    window: Window,
    config: AppConfig,
    clock: Instant,
    last_report: Instant,
}

impl AppState {
    pub async fn new(window: Window, config: AppConfig) -> Result<Self> {
        let surface = WgpuSurface::new(&window, config.present_mode).await?;
        let harness = Harness::new(
            OrbitScene::new(),
            surface,
            RenderCount::with_value(config.initial_render_count),
        )
        .with_overlay(config.show_overlay);

        let state = Self {
            harness,
            window,
            config,
            clock: Instant::now(),
            last_report: Instant::now(),
        };
        state.update_title();
        Ok(state)
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn start(&mut self) {
        log::info!(
            "Starting frame loop with {} draw(s) per frame",
            self.harness.render_count()
        );
        let mut ticks = RedrawTicks {
            window: &self.window,
        };
        self.harness.start(&mut ticks);
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.harness.surface_mut().resize(new_size);
    }

    pub fn input(&mut self, event: &WindowEvent) -> bool {
        let WindowEvent::KeyboardInput { input, .. } = event else {
            return false;
        };
        if input.state != ElementState::Pressed {
            return false;
        }
        let Some(key) = input.virtual_keycode else {
            return false;
        };

        let bindings = &self.config.key_bindings;
        let signal = if key == bindings.increment {
            ControlSignal::Increment
        } else if key == bindings.decrement {
            ControlSignal::Decrement
        } else if key == bindings.reset {
            ControlSignal::Reset
        } else {
            return false;
        };
        self.signal(signal);
        true
    }

    pub fn signal(&mut self, signal: ControlSignal) {
        let value = self.harness.signal(signal);
        log::info!("Render count: {value}");
        self.update_title();
    }

    /// Runs one frame. Recoverable swapchain errors are logged and the loop is
    /// re-armed by hand; anything else is returned and ends the loop.
    pub fn tick(&mut self) -> Result<Option<TickReport>> {
        let now_ms = self.clock.elapsed().as_secs_f64() * 1000.0;
        let mut ticks = RedrawTicks {
            window: &self.window,
        };

        match self.harness.tick(now_ms, &mut ticks) {
            Ok(report) => {
                self.report_if_due();
                Ok(Some(report))
            }
            Err(HarnessError::Render(RenderError::Surface(
                err @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated),
            ))) => {
                log::warn!("Surface {err:?}; reconfiguring");
                self.harness.surface_mut().reconfigure();
                ticks.arm();
                Ok(None)
            }
            Err(HarnessError::Render(RenderError::Surface(wgpu::SurfaceError::Timeout))) => {
                log::warn!("Timed out acquiring frame; skipping");
                ticks.arm();
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    #[allow(dead_code)]
    pub fn set_render_count(&mut self, value: u32) {
        self.harness.set_render_count(value);
        self.update_title();
    }

    #[allow(dead_code)]
    pub fn render_count(&self) -> u32 {
        self.harness.render_count()
    }

    #[allow(dead_code)]
    pub fn clear_history(&mut self) {
        self.harness.history_mut().clear();
    }

    #[allow(dead_code)]
    pub fn overlay(&self) -> &RgbaImage {
        self.harness.overlay()
    }

    #[allow(dead_code)]
    pub fn surface_size(&self) -> (u32, u32) {
        self.harness.surface().size()
    }

    #[allow(dead_code)]
    pub fn last_draw_calls(&self) -> usize {
        self.harness.surface().last_draw_calls()
    }

    fn report_if_due(&mut self) {
        let interval = self.config.report_interval_secs;
        if interval <= 0.0 || self.last_report.elapsed().as_secs_f32() < interval {
            return;
        }
        self.last_report = Instant::now();

        match self.harness.history().stats() {
            Some(stats) => log::info!(
                "draws {:>3} | fps mean {:>6.1} min {:>6.1} max {:>6.1} | {}/{} samples | {} draw calls",
                self.harness.render_count(),
                stats.mean,
                stats.min,
                stats.max,
                stats.samples,
                self.harness.history().capacity(),
                self.harness.surface().last_draw_calls(),
            ),
            None => log::info!(
                "draws {:>3} | no FPS samples yet",
                self.harness.render_count()
            ),
        }
    }

    fn update_title(&self) {
        self.window.set_title(&format!(
            "Redraw Harness | draws per frame: {}",
            self.harness.render_count()
        ));
    }
}
