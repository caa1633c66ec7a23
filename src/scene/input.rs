/// Steering direction shared by the keyboard and the joypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Counter-clockwise.
    Left,
    /// Clockwise.
    Right,
    /// Forward thrust.
    Forward,
    /// Reverse thrust.
    Backward,
}

/// Keys the scene reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Turns counter-clockwise.
    Left,
    /// Turns clockwise.
    Right,
    /// Forward thrust.
    Up,
    /// Reverse thrust.
    Down,
    /// Fires a shot.
    Fire,
}

impl Key {
    /// Steering direction of an arrow key; `None` for fire.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Key::Left => Some(Direction::Left),
            Key::Right => Some(Direction::Right),
            Key::Up => Some(Direction::Forward),
            Key::Down => Some(Direction::Backward),
            Key::Fire => None,
        }
    }
}

/// What the on-screen joypad reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JoypadEvent {
    /// Direction held.
    Press(Direction),
    /// Direction let go.
    Release(Direction),
    /// Stick pointed at an absolute heading, degrees.
    Aim(f32),
    /// Fire button.
    Fire,
}

/// Held steering inputs, sampled once per simulation tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputFlags {
    /// Turning counter-clockwise.
    pub left: bool,
    /// Turning clockwise.
    pub right: bool,
    /// Forward thrust held.
    pub forward: bool,
    /// Reverse thrust held.
    pub backward: bool,
}

impl InputFlags {
    /// Records a press or release of `dir`.
    pub fn set(&mut self, dir: Direction, down: bool) {
        match dir {
            Direction::Left => self.left = down,
            Direction::Right => self.right = down,
            Direction::Forward => self.forward = down,
            Direction::Backward => self.backward = down,
        }
    }

    /// Left or right held.
    #[inline]
    pub fn rotating(&self) -> bool {
        self.left || self.right
    }

    /// Forward or backward held.
    #[inline]
    pub fn moving(&self) -> bool {
        self.forward || self.backward
    }

    /// No steering input held.
    pub fn is_idle(&self) -> bool {
        !self.rotating() && !self.moving()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_flags() {
        let mut flags = InputFlags::default();
        for key in [Key::Left, Key::Up] {
            flags.set(key.direction().unwrap(), true);
        }
        assert!(flags.rotating() && flags.moving());
        flags.set(Direction::Left, false);
        flags.set(Direction::Forward, false);
        assert!(flags.is_idle());
        assert_eq!(Key::Fire.direction(), None);
    }
}
