use crate::clock::FixedStep;
use macroquad::prelude::*;
use std::time::Duration;

/// Which frame strip a sprite plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    /// Muzzle flash and hits.
    Explosion,
    /// Trail left behind the player.
    Afterburn,
}

impl SpriteKind {
    /// `(frame count, frame edge in px, frame period)` of the strip.
    pub fn strip(self) -> (usize, f32, Duration) {
        match self {
            SpriteKind::Explosion => (8, 32.0, Duration::from_millis(60)),
            SpriteKind::Afterburn => (6, 16.0, Duration::from_millis(40)),
        }
    }
}

/// A frame-strip animation placed in the scene. `pos` is its centre.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSprite {
    /// Which strip.
    pub kind: SpriteKind,
    /// Centre.
    pub pos: Vec2,
    /// Frames in the strip.
    pub frame_count: usize,
    /// Edge of a square frame, pixels.
    pub frame_size: f32,
    /// Restart after the last frame.
    pub looped: bool,
    /// Bounce when looped.
    pub ping_pong: bool,
    frame_index: usize,
    playing_forward: bool,
    finished: bool,
    clock: FixedStep,
}

impl AnimationSprite {
    /// Plays once and finishes.
    pub fn once(kind: SpriteKind, pos: Vec2) -> Self {
        let (frame_count, frame_size, period) = kind.strip();
        Self {
            kind,
            pos,
            frame_count: frame_count.max(1),
            frame_size,
            looped: false,
            ping_pong: false,
            frame_index: 0,
            playing_forward: true,
            finished: false,
            clock: FixedStep::new(period),
        }
    }

    /// Loops forever, optionally bouncing between the ends.
    pub fn looping(kind: SpriteKind, pos: Vec2, ping_pong: bool) -> Self {
        Self {
            looped: true,
            ping_pong,
            ..Self::once(kind, pos)
        }
    }

    /// Frame currently shown.
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Played out, or hit.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn finish(&mut self) {
        self.finished = true;
    }

    /// Frame-sized box around `pos`.
    pub fn bounds(&self) -> Rect {
        let half = self.frame_size / 2.0;
        Rect::new(self.pos.x - half, self.pos.y - half, self.frame_size, self.frame_size)
    }

    /// Source rectangle of the current frame inside a horizontal strip.
    pub fn frame_rect(&self) -> Rect {
        Rect::new(
            self.frame_index as f32 * self.frame_size,
            0.0,
            self.frame_size,
            self.frame_size,
        )
    }

    /// Advances one frame. Returns true exactly once, when a non-looping
    /// strip runs off its end.
    pub fn step(&mut self) -> bool {
        if self.finished {
            return false;
        }
        let n = self.frame_count as isize;
        let next = self.frame_index as isize + if self.playing_forward { 1 } else { -1 };
        if (0..n).contains(&next) {
            self.frame_index = next as usize;
            return false;
        }
        match (self.looped, self.ping_pong) {
            (true, false) => self.frame_index = 0,
            (true, true) => {
                let bounced = if next >= n { (n - 2).max(0) } else { (n - 1).min(1) };
                self.frame_index = bounced as usize;
                self.playing_forward = !self.playing_forward;
            }
            (false, _) => {
                self.finished = true;
                return true;
            }
        }
        false
    }

    pub(crate) fn due_steps(&mut self, dt: Duration) -> u32 {
        self.clock.advance(dt)
    }
}
