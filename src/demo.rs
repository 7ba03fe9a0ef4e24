//! Procedural stand-in for a loaded animation: a ring of petals orbiting a
//! hub, with a small state machine driving a breathing pulse.

use std::f32::consts::TAU;

use glam::Vec2;

use crate::error::RenderError;
use crate::scene::{Aabb, DrawSurface, RenderResult, Scene, StateMachine};

const ARTBOARD_SIZE: f32 = 500.0;
const PETALS: usize = 12;
const ORBIT_SPEED: f32 = 0.6;
const HUB_SIDES: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PulseState {
    Inhale,
    Exhale,
}

/// Alternates between inhale and exhale, each lasting `half_period` seconds.
pub struct PulseMachine {
    state: PulseState,
    elapsed: f32,
    half_period: f32,
}

impl PulseMachine {
    pub fn new(half_period: f32) -> Self {
        Self {
            state: PulseState::Inhale,
            elapsed: 0.0,
            half_period: half_period.max(f32::EPSILON),
        }
    }

    pub fn state(&self) -> PulseState {
        self.state
    }

    /// Scale factor in `0.8..=1.0`.
    pub fn pulse(&self) -> f32 {
        let t = (self.elapsed / self.half_period).clamp(0.0, 1.0);
        let eased = match self.state {
            PulseState::Inhale => t,
            PulseState::Exhale => 1.0 - t,
        };
        0.8 + 0.2 * eased
    }
}

impl StateMachine for PulseMachine {
    fn advance(&mut self, dt: f32) -> RenderResult {
        if !dt.is_finite() {
            return Err(RenderError::Advance(format!("non-finite time step {dt}")));
        }
        self.elapsed += dt.max(0.0);
        while self.elapsed >= self.half_period {
            self.elapsed -= self.half_period;
            self.state = match self.state {
                PulseState::Inhale => PulseState::Exhale,
                PulseState::Exhale => PulseState::Inhale,
            };
        }
        Ok(())
    }
}

pub struct OrbitScene {
    rotation: f32,
    machine: PulseMachine,
}

impl Default for OrbitScene {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbitScene {
    pub fn new() -> Self {
        Self {
            rotation: 0.0,
            machine: PulseMachine::new(1.2),
        }
    }

    #[cfg(test)]
    fn rotation(&self) -> f32 {
        self.rotation
    }

    #[cfg(test)]
    fn fills_per_draw() -> usize {
        PETALS + 1
    }
}

impl Scene for OrbitScene {
    fn bounds(&self) -> Aabb {
        Aabb::from_size(ARTBOARD_SIZE, ARTBOARD_SIZE)
    }

    fn advance(&mut self, dt: f32) -> RenderResult {
        if !dt.is_finite() {
            return Err(RenderError::Advance(format!("non-finite time step {dt}")));
        }
        self.rotation = (self.rotation + dt * ORBIT_SPEED) % TAU;
        Ok(())
    }

    fn draw(&self, surface: &mut dyn DrawSurface) -> RenderResult {
        let center = Vec2::splat(ARTBOARD_SIZE * 0.5);
        let pulse = self.machine.pulse();

        for i in 0..PETALS {
            let angle = self.rotation + i as f32 * TAU / PETALS as f32;
            let dir = Vec2::from_angle(angle);
            let side = dir.perp();
            let inner = center + dir * 70.0 * pulse;
            let outer = center + dir * 230.0 * pulse;
            let mid = center + dir * 150.0 * pulse;
            let petal = [inner, mid + side * 28.0, outer, mid - side * 28.0];
            surface.fill(&petal, petal_color(i))?;
        }

        let hub: Vec<Vec2> = (0..HUB_SIDES)
            .map(|i| {
                let angle = -self.rotation + i as f32 * TAU / HUB_SIDES as f32;
                center + Vec2::from_angle(angle) * 50.0 * pulse
            })
            .collect();
        surface.fill(&hub, [0.95, 0.95, 0.95, 1.0])
    }

    fn state_machine_mut(&mut self) -> Option<&mut dyn StateMachine> {
        Some(&mut self.machine)
    }
}

fn petal_color(index: usize) -> [f32; 4] {
    let t = index as f32 / PETALS as f32;
    [
        0.5 + 0.5 * (TAU * t).cos(),
        0.5 + 0.5 * (TAU * (t + 1.0 / 3.0)).cos(),
        0.5 + 0.5 * (TAU * (t + 2.0 / 3.0)).cos(),
        0.9,
    ]
}
