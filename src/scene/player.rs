use super::input::InputFlags;
use macroquad::prelude::*;

/// Top linear speed, pixels per simulation tick.
pub const MAX_SPEED: f32 = 5.0;
/// Linear speed change per tick while a movement key is held.
pub const ACCELERATION: f32 = 0.2;
/// Top key-driven rotation speed, degrees per tick.
pub const MAX_ROTATION_SPEED: i32 = 20;
/// Largest turn per tick while easing towards a joypad heading.
pub const MAX_AIM_ROTATION: f32 = 15.0;
/// Sprite length along its heading.
pub const PLAYER_LENGTH: f32 = 32.0;

/// Unit heading for `angle` degrees; y grows downwards on screen.
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    let r = angle.to_radians();
    vec2(r.cos(), -r.sin())
}

/// Signed shortest turn from `from` to `to`, in (-180, 180].
#[inline]
pub fn shortest_arc(from: f32, to: f32) -> f32 {
    let d = (to - from).rem_euclid(360.0);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

/// The steerable ship. `pos` is the sprite centre.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Centre, scene pixels.
    pub pos: Vec2,
    /// Degrees in `[0, 360)`, counter-clockwise on screen.
    pub angle: f32,
    /// Pixels per tick along the heading; negative is reverse.
    pub speed: f32,
    /// Degrees per tick.
    pub rot_speed: i32,
    /// Heading the joypad asked for; eased towards while no rotation key is held.
    pub requested_angle: Option<f32>,
}

impl Player {
    /// At rest at `pos`, facing east.
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            angle: 0.0,
            speed: 0.0,
            rot_speed: 0,
            requested_angle: None,
        }
    }

    /// Unit vector along the heading.
    #[inline]
    pub fn forward(&self) -> Vec2 {
        heading(self.angle)
    }

    /// Square hit box around `pos`.
    pub fn bounds(&self) -> Rect {
        let half = PLAYER_LENGTH / 2.0;
        Rect::new(self.pos.x - half, self.pos.y - half, PLAYER_LENGTH, PLAYER_LENGTH)
    }

    /// Arrow-key rotation: accelerate, brake three times as hard when
    /// reversing, coast back to zero when released.
    pub fn ease_rotation(&mut self, input: InputFlags) {
        if input.left {
            self.rot_speed += if self.rot_speed < 0 { 3 } else { 1 };
        }
        if input.right {
            self.rot_speed += if self.rot_speed > 0 { -3 } else { -1 };
        }
        if !input.rotating() && self.rot_speed != 0 {
            self.rot_speed += if self.rot_speed > 0 { -1 } else { 1 };
        }
        self.rot_speed = self
            .rot_speed
            .clamp(-MAX_ROTATION_SPEED, MAX_ROTATION_SPEED);
        self.angle = (self.angle + self.rot_speed as f32).rem_euclid(360.0);
    }

    /// Turns towards `requested_angle` by at most [`MAX_AIM_ROTATION`].
    pub fn ease_towards_request(&mut self, input: InputFlags) {
        if input.rotating() {
            return;
        }
        let Some(target) = self.requested_angle else {
            return;
        };
        let diff = shortest_arc(self.angle, target);
        if diff.abs() >= 1.0 {
            let f = self.forward();
            let r = heading(target);
            // cross(f, r) = sin(angle - target): negative means turn up.
            let cross = f.x * r.y - f.y * r.x;
            let sign = if cross < 0.0 { 1.0 } else { -1.0 };
            self.angle = (self.angle + sign * diff.abs().min(MAX_AIM_ROTATION)).rem_euclid(360.0);
        }
        if shortest_arc(self.angle, target).abs() < 1.0 {
            self.requested_angle = None;
        }
    }

    /// Speeds up or down by [`ACCELERATION`], braking twice as hard when
    /// reversing, and coasts to a stop with no key held.
    pub fn ease_speed(&mut self, input: InputFlags) {
        let a = ACCELERATION;
        if input.forward {
            self.speed += if self.speed < 0.0 { 2.0 * a } else { a };
        }
        if input.backward {
            self.speed += if self.speed > 0.0 { -2.0 * a } else { -a };
        }
        if !input.moving() && self.speed != 0.0 {
            if self.speed.abs() < a {
                self.speed = 0.0;
            } else {
                self.speed -= a * self.speed.signum();
            }
        }
        self.speed = self.speed.clamp(-MAX_SPEED, MAX_SPEED);
    }

    /// Moves along the heading; true when the position changed.
    pub fn integrate(&mut self) -> bool {
        let before = self.pos;
        self.pos += self.speed * self.forward();
        self.pos != before
    }

    /// One simulation step in fixed order: rotation, aim, speed, position.
    pub fn step(&mut self, input: InputFlags) -> bool {
        self.ease_rotation(input);
        self.ease_towards_request(input);
        self.ease_speed(input);
        self.integrate()
    }
}
