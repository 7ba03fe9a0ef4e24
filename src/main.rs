mod app;
mod config;
mod control;
mod demo;
mod driver;
mod error;
mod fps;
mod harness;
mod render;
mod scene;
mod scheduler;
#[cfg(test)]
mod testing;
mod visualizer;

use config::AppConfig;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load();
    if let Err(err) = pollster::block_on(app::run(config)) {
        log::error!("Startup failed: {err}");
        std::process::exit(1);
    }
}
