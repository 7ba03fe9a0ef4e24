use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::config::AppConfig;
use crate::error::Result;

pub mod state;

pub async fn run(config: AppConfig) -> Result<()> {
    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("Redraw Harness")
        .with_inner_size(LogicalSize::new(config.window_width, config.window_height))
        .build(&event_loop)?;

    let mut app_state = state::AppState::new(window, config).await?;
    app_state.start();

    event_loop.run(move |event, _, control_flow| {
        // Ticks arrive as redraw requests armed by the harness itself.
        *control_flow = ControlFlow::Wait;

        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == app_state.window().id() => {
                if !app_state.input(event) {
                    match event {
                        WindowEvent::CloseRequested => *control_flow = ControlFlow::Exit,
                        WindowEvent::KeyboardInput { input, .. } => {
                            if input.state == ElementState::Pressed
                                && input.virtual_keycode == Some(VirtualKeyCode::Escape)
                            {
                                *control_flow = ControlFlow::Exit;
                            }
                        }
                        WindowEvent::Resized(physical_size) => {
                            app_state.resize(*physical_size);
                        }
                        WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                            app_state.resize(**new_inner_size);
                        }
                        _ => {}
                    }
                }
            }
            Event::RedrawRequested(window_id) if window_id == app_state.window().id() => {
                if let Err(err) = app_state.tick() {
                    log::error!("Frame loop stopped: {err}");
                    *control_flow = ControlFlow::ExitWithCode(1);
                }
            }
            _ => {}
        }
    })
}
