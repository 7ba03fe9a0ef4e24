use std::fs;
use std::io;
use std::path::PathBuf;

use log::warn;
use serde::Deserialize;
use winit::event::VirtualKeyCode;

use crate::control::{MAX_RENDER_COUNT, MIN_RENDER_COUNT};

const CONFIG_ENV: &str = "REDRAW_HARNESS_CONFIG";
const DEFAULT_REPORT_INTERVAL: f32 = 2.0;
const DEFAULT_WINDOW_WIDTH: u32 = 1280;
const DEFAULT_WINDOW_HEIGHT: u32 = 720;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentModeSetting {
    #[serde(alias = "fifo")]
    VSync,
    Mailbox,
    Immediate,
}

impl PresentModeSetting {
    pub fn as_str(&self) -> &'static str {
        match self {
            PresentModeSetting::VSync => "vsync",
            PresentModeSetting::Mailbox => "mailbox",
            PresentModeSetting::Immediate => "immediate",
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub initial_render_count: u32,
    pub present_mode: PresentModeSetting,
    pub show_overlay: bool,
    /// Seconds between FPS summaries in the log; zero disables them.
    pub report_interval_secs: f32,
    pub window_width: u32,
    pub window_height: u32,
    pub key_bindings: KeyBindings,
}

impl AppConfig {
    pub fn load() -> Self {
        let path = config_path();
        match fs::read(&path) {
            Ok(bytes) => Self::from_json(&bytes).unwrap_or_else(|err| {
                warn!("Failed to parse config file {}: {}", path.display(), err);
                AppConfig::default()
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => AppConfig::default(),
            Err(err) => {
                warn!("Failed to read config file {}: {}", path.display(), err);
                AppConfig::default()
            }
        }
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice::<RawConfig>(bytes).map(AppConfig::from_raw)
    }

    fn from_raw(raw: RawConfig) -> Self {
        let defaults = KeyBindings::default();
        let key_bindings = KeyBindings {
            increment: parse_key(raw.keymap.increment.as_deref(), defaults.increment),
            decrement: parse_key(raw.keymap.decrement.as_deref(), defaults.decrement),
            reset: parse_key(raw.keymap.reset.as_deref(), defaults.reset),
        };

        let requested = raw.initial_render_count.unwrap_or(MIN_RENDER_COUNT);
        let initial_render_count = requested.clamp(MIN_RENDER_COUNT, MAX_RENDER_COUNT);
        if initial_render_count != requested {
            warn!(
                "initial_render_count {} out of range; clamped to {}",
                requested, initial_render_count
            );
        }

        let mut report_interval_secs = raw
            .report_interval_secs
            .unwrap_or(DEFAULT_REPORT_INTERVAL);
        if !report_interval_secs.is_finite() || report_interval_secs < 0.0 {
            warn!(
                "Invalid report_interval_secs {}; falling back to default",
                report_interval_secs
            );
            report_interval_secs = DEFAULT_REPORT_INTERVAL;
        }

        Self {
            initial_render_count,
            present_mode: raw.present_mode.unwrap_or(PresentModeSetting::VSync),
            show_overlay: raw.show_overlay.unwrap_or(true),
            report_interval_secs,
            window_width: raw.window_width.filter(|w| *w > 0).unwrap_or(DEFAULT_WINDOW_WIDTH),
            window_height: raw
                .window_height
                .filter(|h| *h > 0)
                .unwrap_or(DEFAULT_WINDOW_HEIGHT),
            key_bindings,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_raw(RawConfig::default())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeyBindings {
    pub increment: VirtualKeyCode,
    pub decrement: VirtualKeyCode,
    pub reset: VirtualKeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            increment: VirtualKeyCode::Up,
            decrement: VirtualKeyCode::Down,
            reset: VirtualKeyCode::R,
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    initial_render_count: Option<u32>,
    present_mode: Option<PresentModeSetting>,
    show_overlay: Option<bool>,
    report_interval_secs: Option<f32>,
    window_width: Option<u32>,
    window_height: Option<u32>,
    keymap: RawKeyMap,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawKeyMap {
    increment: Option<String>,
    decrement: Option<String>,
    reset: Option<String>,
}

fn parse_key(name: Option<&str>, fallback: VirtualKeyCode) -> VirtualKeyCode {
    let Some(name) = name else {
        return fallback;
    };

    match key_from_str(name) {
        Some(code) => code,
        None => {
            warn!("Unknown key '{}' in config; using {:?}", name, fallback);
            fallback
        }
    }
}

fn key_from_str(name: &str) -> Option<VirtualKeyCode> {
    match name.trim().to_ascii_uppercase().as_str() {
        "UP" => Some(VirtualKeyCode::Up),
        "DOWN" => Some(VirtualKeyCode::Down),
        "LEFT" => Some(VirtualKeyCode::Left),
        "RIGHT" => Some(VirtualKeyCode::Right),
        "PAGEUP" => Some(VirtualKeyCode::PageUp),
        "PAGEDOWN" => Some(VirtualKeyCode::PageDown),
        "HOME" => Some(VirtualKeyCode::Home),
        "END" => Some(VirtualKeyCode::End),
        "+" | "PLUS" => Some(VirtualKeyCode::Plus),
        "=" | "EQUALS" => Some(VirtualKeyCode::Equals),
        "-" | "MINUS" => Some(VirtualKeyCode::Minus),
        "[" | "LBRACKET" => Some(VirtualKeyCode::LBracket),
        "]" | "RBRACKET" => Some(VirtualKeyCode::RBracket),
        "SPACE" => Some(VirtualKeyCode::Space),
        "BACKSPACE" => Some(VirtualKeyCode::Back),
        "R" => Some(VirtualKeyCode::R),
        "0" => Some(VirtualKeyCode::Key0),
        "1" => Some(VirtualKeyCode::Key1),
        _ => None,
    }
}

fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config.json"))
}
