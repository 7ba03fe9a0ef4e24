#![allow(dead_code)]

#[path = "../app/state.rs"]
mod app_state;
#[path = "../config.rs"]
mod config;
#[path = "../control.rs"]
mod control;
#[path = "../demo.rs"]
mod demo;
#[path = "../driver.rs"]
mod driver;
#[path = "../error.rs"]
mod error;
#[path = "../fps.rs"]
mod fps;
#[path = "../harness.rs"]
mod harness;
#[path = "../render/mod.rs"]
mod render;
#[path = "../scene.rs"]
mod scene;
#[path = "../scheduler.rs"]
mod scheduler;
#[cfg(test)]
#[path = "../testing.rs"]
mod testing;
#[path = "../visualizer.rs"]
mod visualizer;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use app_state::AppState;
use config::AppConfig;
use fps::{FpsStats, Snapshot};
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

const STEPS: [u32; 7] = [1, 5, 10, 25, 50, 75, 100];
const WARMUP: Duration = Duration::from_millis(500);
const HOLD: Duration = Duration::from_secs(3);

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = run_benchmark() {
        eprintln!("Benchmark failed: {err}");
        std::process::exit(1);
    }
}

fn run_benchmark() -> error::Result<()> {
    let mut app_config = AppConfig::load();
    // The sweep drives the render count itself and needs uncapped frames.
    app_config.initial_render_count = STEPS[0];
    app_config.present_mode = config::PresentModeSetting::Immediate;
    app_config.report_interval_secs = 0.0;

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("Redraw Harness Benchmark")
        .with_inner_size(LogicalSize::new(
            app_config.window_width,
            app_config.window_height,
        ))
        .build(&event_loop)?;

    let mut app_state = pollster::block_on(AppState::new(window, app_config))?;
    let mut sweep = Sweep::new(STEPS.to_vec(), output_dir());

    println!(
        "Benchmark: {} steps, {:.1}s each (+{:.1}s warmup).",
        sweep.steps.len(),
        HOLD.as_secs_f32(),
        WARMUP.as_secs_f32(),
    );

    app_state.start();

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::WindowEvent { event, window_id } if window_id == app_state.window().id() => {
                match event {
                    WindowEvent::CloseRequested => *control_flow = ControlFlow::Exit,
                    WindowEvent::Resized(size) => app_state.resize(size),
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        app_state.resize(*new_inner_size)
                    }
                    _ => {}
                }
            }
            Event::RedrawRequested(window_id) if window_id == app_state.window().id() => {
                let report = match app_state.tick() {
                    Ok(report) => report,
                    Err(err) => {
                        eprintln!("Frame loop stopped: {err}; ending benchmark early.");
                        sweep.print_summary(app_state.surface_size());
                        *control_flow = ControlFlow::ExitWithCode(1);
                        return;
                    }
                };

                if let Some(fps) = report.and_then(|report| report.sample) {
                    sweep.record(fps);
                }

                if sweep.step_finished() {
                    sweep.finish_step(&app_state);
                    match sweep.next_step() {
                        Some(draws) => {
                            app_state.set_render_count(draws);
                            app_state.clear_history();
                        }
                        None => {
                            sweep.print_summary(app_state.surface_size());
                            *control_flow = ControlFlow::Exit;
                        }
                    }
                }
            }
            _ => {}
        }
    })
}

fn output_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("target/benchmark")
}

struct StepResult {
    draws: u32,
    stats: Option<FpsStats>,
    draw_calls: usize,
}

impl StepResult {
    fn mean_frame_ms(&self) -> Option<f64> {
        self.stats
            .filter(|stats| stats.mean > 0.0)
            .map(|stats| 1000.0 / stats.mean)
    }
}

struct Sweep {
    steps: Vec<u32>,
    current: usize,
    step_started: Instant,
    samples: Vec<f64>,
    results: Vec<StepResult>,
    output_dir: PathBuf,
}

impl Sweep {
    fn new(steps: Vec<u32>, output_dir: PathBuf) -> Self {
        if let Err(err) = std::fs::create_dir_all(&output_dir) {
            log::warn!("Cannot create {}: {err}", output_dir.display());
        }
        Self {
            steps,
            current: 0,
            step_started: Instant::now(),
            samples: Vec::new(),
            results: Vec::new(),
            output_dir,
        }
    }

    fn record(&mut self, fps: f64) {
        if self.step_started.elapsed() >= WARMUP {
            self.samples.push(fps);
        }
    }

    fn step_finished(&self) -> bool {
        self.step_started.elapsed() >= WARMUP + HOLD
    }

    fn finish_step(&mut self, app_state: &AppState) {
        let draws = self.steps[self.current];
        let path = self.output_dir.join(format!("fps_draws_{draws:03}.png"));
        if let Err(err) = app_state.overlay().save(&path) {
            log::warn!("Failed to save {}: {err}", path.display());
        }

        self.results.push(StepResult {
            draws,
            stats: Snapshot::from_slice(&self.samples).stats(),
            draw_calls: app_state.last_draw_calls(),
        });
        self.samples.clear();
    }

    fn next_step(&mut self) -> Option<u32> {
        self.current += 1;
        self.step_started = Instant::now();
        self.steps.get(self.current).copied()
    }

    fn print_summary(&self, resolution: (u32, u32)) {
        if self.results.is_empty() {
            println!("Benchmark finished with no completed steps.");
            return;
        }

        let baseline = self.results.first().and_then(StepResult::mean_frame_ms);

        println!(
            "Benchmark complete: {} steps @ {}x{}.",
            self.results.len(),
            resolution.0,
            resolution.1
        );
        println!("draws | frames | fps mean |  fps min | frame ms | x k=1 | ms/draw | calls");
        for result in &self.results {
            let Some(stats) = result.stats else {
                println!("{:>5} | no samples", result.draws);
                continue;
            };
            let frame_ms = result.mean_frame_ms().unwrap_or(0.0);
            let relative = baseline
                .filter(|base| *base > 0.0)
                .map(|base| frame_ms / base)
                .unwrap_or(0.0);
            println!(
                "{:>5} | {:>6} | {:>8.1} | {:>8.1} | {:>8.3} | {:>5.2} | {:>7.4} | {:>5}",
                result.draws,
                stats.samples,
                stats.mean,
                stats.min,
                frame_ms,
                relative,
                frame_ms / result.draws as f64,
                result.draw_calls,
            );
        }
        println!("Overlay graphs saved to {}", self.output_dir.display());
    }
}
