use crate::clock::FixedStep;
use macroquad::prelude::*;
use std::time::Duration;

/// Distance from the launch point after which a projectile dies.
pub const MAX_PROJECTILE_RANGE: f32 = 200.0;
/// Period of one projectile step.
pub const PROJECTILE_PERIOD: Duration = Duration::from_millis(30);
/// Edge of the projectile's square hit box.
pub const PROJECTILE_SIZE: f32 = 6.0;

/// A shot flying at constant velocity until it leaves its range.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    /// Centre.
    pub pos: Vec2,
    /// Displacement per step.
    pub velocity: Vec2,
    /// Where it was fired from.
    pub launch: Vec2,
    alive: bool,
    clock: FixedStep,
}

impl Projectile {
    /// Fired from `launch`, moving `velocity` per step.
    pub fn new(launch: Vec2, velocity: Vec2) -> Self {
        Self {
            pos: launch,
            velocity,
            launch,
            alive: true,
            clock: FixedStep::new(PROJECTILE_PERIOD),
        }
    }

    /// `false` once it has left its range.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Square hit box around `pos`.
    pub fn bounds(&self) -> Rect {
        let half = PROJECTILE_SIZE / 2.0;
        Rect::new(self.pos.x - half, self.pos.y - half, PROJECTILE_SIZE, PROJECTILE_SIZE)
    }

    /// One step. Returns true exactly once: on the step that carries the
    /// projectile out of range. Dead projectiles no longer move.
    pub fn step(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        self.pos += self.velocity;
        if self.pos.distance(self.launch) > MAX_PROJECTILE_RANGE {
            self.alive = false;
            return true;
        }
        false
    }

    /// Steps due after `dt`.
    pub(crate) fn due_steps(&mut self, dt: Duration) -> u32 {
        self.clock.advance(dt)
    }
}
