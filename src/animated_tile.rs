use crate::tileset::TileCoord;

/// A named frame sequence. The first frame is the anchor: every map cell
/// holding the anchor tile plays the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimatedTile {
    /// Shown in the animation list.
    pub name: String,
    frames: Vec<TileCoord>,
    /// Bounce between the ends instead of wrapping.
    pub ping_pong: bool,
    frame_index: usize,
    playing_forward: bool,
}

impl AnimatedTile {
    /// Sequence starting (and anchored) at `anchor`.
    pub fn new(name: impl Into<String>, anchor: TileCoord) -> Self {
        Self {
            name: name.into(),
            frames: vec![anchor],
            ping_pong: false,
            frame_index: 0,
            playing_forward: true,
        }
    }

    /// `None` when `frames` is empty.
    pub fn with_frames(
        name: impl Into<String>,
        frames: Vec<TileCoord>,
        ping_pong: bool,
    ) -> Option<Self> {
        if frames.is_empty() {
            return None;
        }
        Some(Self {
            name: name.into(),
            frames,
            ping_pong,
            frame_index: 0,
            playing_forward: true,
        })
    }

    /// Frames in play order; the first is the anchor.
    pub fn frames(&self) -> &[TileCoord] {
        &self.frames
    }

    /// First frame.
    pub fn anchor(&self) -> TileCoord {
        self.frames[0]
    }

    /// Index of the frame currently shown.
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Tile shown for the current frame.
    pub fn current(&self) -> TileCoord {
        self.frames[self.frame_index.min(self.frames.len() - 1)]
    }

    /// Appends a frame to the sequence.
    pub fn push_frame(&mut self, coord: TileCoord) {
        self.frames.push(coord);
    }

    /// Removes frame `index`. The last remaining frame cannot be removed.
    pub fn remove_frame(&mut self, index: usize) -> bool {
        if self.frames.len() <= 1 || index >= self.frames.len() {
            return false;
        }
        self.frames.remove(index);
        self.clamp();
        true
    }

    /// Back to the first frame, playing forward.
    pub fn rewind(&mut self) {
        self.frame_index = 0;
        self.playing_forward = true;
    }

    fn clamp(&mut self) {
        if self.frame_index >= self.frames.len() {
            self.frame_index = self.frames.len() - 1;
        }
    }

    /// Moves to the next frame: wraps around, or bounces at either end
    /// when `ping_pong` is set.
    pub fn advance(&mut self) {
        let len = self.frames.len();
        self.clamp();
        if len == 1 {
            self.frame_index = 0;
            return;
        }
        if !self.ping_pong {
            self.frame_index = (self.frame_index + 1) % len;
            return;
        }
        if self.playing_forward {
            if self.frame_index + 1 >= len {
                self.playing_forward = false;
                self.frame_index -= 1;
            } else {
                self.frame_index += 1;
            }
        } else if self.frame_index == 0 {
            self.playing_forward = true;
            self.frame_index = 1;
        } else {
            self.frame_index -= 1;
        }
    }
}

/// Ordered collection of [`AnimatedTile`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimatedTileSet {
    tiles: Vec<AnimatedTile>,
}

impl AnimatedTileSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an animation.
    pub fn push(&mut self, tile: AnimatedTile) {
        self.tiles.push(tile);
    }

    /// Removes and returns the animation at `index`.
    pub fn remove(&mut self, index: usize) -> Option<AnimatedTile> {
        (index < self.tiles.len()).then(|| self.tiles.remove(index))
    }

    /// Entry at `index`.
    pub fn get(&self, index: usize) -> Option<&AnimatedTile> {
        self.tiles.get(index)
    }

    /// Mutable entry at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut AnimatedTile> {
        self.tiles.get_mut(index)
    }

    /// Index of the first animation called `name`.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.tiles.iter().position(|t| t.name == name)
    }

    /// Iterates in order.
    pub fn iter(&self) -> impl Iterator<Item = &AnimatedTile> {
        self.tiles.iter()
    }

    /// Iterates mutably in order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut AnimatedTile> {
        self.tiles.iter_mut()
    }

    /// Number of animations.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether there are none.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Drops every animation.
    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    /// Keeps only the animations `keep` accepts.
    pub fn retain<F: FnMut(&AnimatedTile) -> bool>(&mut self, keep: F) {
        self.tiles.retain(keep);
    }
}
