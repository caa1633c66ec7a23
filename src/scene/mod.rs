//! Arcade test scene: a steerable player, its shots and frame-strip effects.
//!
//! The scene never calls back into its owner. Everything that happens during
//! a tick is queued as a [`SceneEvent`] and handed out by
//! [`GameScene::advance`]; the owner reacts between ticks (typically by
//! calling [`GameScene::remove`] on finished actors).

/// Keyboard and joypad input.
pub mod input;
/// The steerable player.
pub mod player;
/// Shots.
pub mod projectile;
/// Frame-strip effects.
pub mod sprite;

use crate::clock::FixedStep;
use input::{InputFlags, JoypadEvent, Key};
use macroquad::prelude::*;
use player::{Player, PLAYER_LENGTH};
use projectile::Projectile;
use sprite::{AnimationSprite, SpriteKind};
use std::time::Duration;
use tracing::trace;

/// Period of one player simulation step.
pub const SIMULATION_PERIOD: Duration = Duration::from_millis(100);
/// How far behind the player the afterburn trail is laid.
pub const AFTERBURN_OFFSET: f32 = 50.0;
/// Minimum spacing between two afterburn puffs.
pub const AFTERBURN_SPACING: f32 = 2.0;
/// Scale of the muzzle flash pattern: the flash sits ten units ahead.
pub const MUZZLE_UNIT: f32 = 5.0;
/// Projectile speed in units of the heading, per projectile step.
pub const PROJECTILE_SPEED: f32 = 2.0;

/// Generational handle into the scene's actor arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorId {
    index: u32,
    generation: u32,
}

/// Transient scene actors.
#[derive(Debug, Clone, PartialEq)]
pub enum Actor {
    /// A shot in flight.
    Projectile(Projectile),
    /// An explosion or afterburn puff.
    Sprite(AnimationSprite),
}

/// What an actor reports from its own clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActorEvent {
    /// A projectile moved; its hit box after the step.
    Stepped(Rect),
    /// A projectile left its range.
    Deactivated,
    /// A one-shot strip played out.
    Finished,
}

impl Actor {
    /// Hit box in scene coordinates.
    pub fn bounds(&self) -> Rect {
        match self {
            Actor::Projectile(p) => p.bounds(),
            Actor::Sprite(s) => s.bounds(),
        }
    }

    /// Runs the actor's own timer for `dt`.
    pub fn tick(&mut self, dt: Duration) -> Vec<ActorEvent> {
        let mut events = Vec::new();
        match self {
            Actor::Projectile(p) => {
                for _ in 0..p.due_steps(dt) {
                    if p.step() {
                        events.push(ActorEvent::Deactivated);
                        break;
                    }
                    if !p.is_alive() {
                        break;
                    }
                    events.push(ActorEvent::Stepped(p.bounds()));
                }
            }
            Actor::Sprite(s) => {
                for _ in 0..s.due_steps(dt) {
                    if s.step() {
                        events.push(ActorEvent::Finished);
                        break;
                    }
                }
            }
        }
        events
    }
}

/// Lifecycle notifications handed to the scene's owner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneEvent {
    /// The player moved; its new centre.
    PlayerPositionChanged(Vec2),
    /// A sprite played out or was hit; the owner should remove it.
    AnimationFinished(ActorId),
    /// A projectile left its range; the owner should remove it.
    ProjectileDeactivated(ActorId),
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    actor: Option<Actor>,
}

/// Flat actor storage addressed by [`ActorId`]; freed slots are reused
/// with a bumped generation so stale ids miss.
#[derive(Debug, Clone, Default)]
pub struct ActorArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl ActorArena {
    /// Stores `actor`, reusing a free slot when there is one.
    pub fn insert(&mut self, actor: Actor) -> ActorId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.actor = Some(actor);
            return ActorId {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            actor: Some(actor),
        });
        ActorId {
            index: self.slots.len() as u32 - 1,
            generation: 0,
        }
    }

    /// Takes the actor out; stale ids return `None`.
    pub fn remove(&mut self, id: ActorId) -> Option<Actor> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let actor = slot.actor.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(actor)
    }

    /// Entry at `index`.
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)?
            .actor
            .as_ref()
    }

    /// Mutable entry at `index`.
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)?
            .actor
            .as_mut()
    }

    /// Snapshot of the live ids, safe to hold across removals.
    pub fn ids(&self) -> Vec<ActorId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Live actors with their ids, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ActorId, &Actor)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.actor.as_ref().map(|a| {
                (
                    ActorId {
                        index: i as u32,
                        generation: s.generation,
                    },
                    a,
                )
            })
        })
    }

    /// Number of live actors.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.actor.is_some()).count()
    }

    /// Whether there are none.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every actor. Outstanding ids go stale.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

/// The game simulation.
#[derive(Debug, Clone)]
pub struct GameScene {
    player: Player,
    input: InputFlags,
    actors: ActorArena,
    clock: FixedStep,
    last_afterburn: Vec2,
    events: Vec<SceneEvent>,
}

impl GameScene {
    /// Scene with the player resting at `spawn`, facing east.
    pub fn new(spawn: Vec2) -> Self {
        let player = Player::new(spawn);
        let last_afterburn = player.pos - AFTERBURN_OFFSET * player.forward();
        Self {
            player,
            input: InputFlags::default(),
            actors: ActorArena::default(),
            clock: FixedStep::new(SIMULATION_PERIOD),
            last_afterburn,
            events: Vec::new(),
        }
    }

    /// The player.
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Mutable player.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// Steering inputs currently held.
    pub fn input(&self) -> InputFlags {
        self.input
    }

    /// Projectiles and sprites.
    pub fn actors(&self) -> &ActorArena {
        &self.actors
    }

    /// Keyboard press or release. Fire reacts to presses only.
    pub fn key(&mut self, key: Key, down: bool) {
        match key.direction() {
            Some(dir) => self.input.set(dir, down),
            None if down => self.fire(),
            None => {}
        }
    }

    /// Joypad input. Aim sets the heading the player eases towards.
    pub fn joypad(&mut self, event: JoypadEvent) {
        match event {
            JoypadEvent::Press(dir) => self.input.set(dir, true),
            JoypadEvent::Release(dir) => self.input.set(dir, false),
            JoypadEvent::Aim(angle) => self.player.requested_angle = Some(angle.rem_euclid(360.0)),
            JoypadEvent::Fire => self.fire(),
        }
    }

    /// Adds a sprite actor.
    pub fn spawn_sprite(&mut self, sprite: AnimationSprite) -> ActorId {
        self.actors.insert(Actor::Sprite(sprite))
    }

    /// Adds a projectile actor.
    pub fn spawn_projectile(&mut self, projectile: Projectile) -> ActorId {
        self.actors.insert(Actor::Projectile(projectile))
    }

    /// Drops an actor; unknown or stale ids are ignored.
    pub fn remove(&mut self, id: ActorId) -> Option<Actor> {
        self.actors.remove(id)
    }

    /// Muzzle flash around the nose plus one projectile along the heading.
    pub fn fire(&mut self) {
        let fwd = self.player.forward();
        let side = fwd.perp();
        let muzzle = self.player.pos + 10.0 * MUZZLE_UNIT * fwd;
        for offset in [
            Vec2::ZERO,
            MUZZLE_UNIT * side,
            -MUZZLE_UNIT * side,
            MUZZLE_UNIT * fwd,
        ] {
            self.spawn_sprite(AnimationSprite::once(SpriteKind::Explosion, muzzle + offset));
        }
        let launch = self.player.pos + 0.5 * PLAYER_LENGTH * fwd;
        self.spawn_projectile(Projectile::new(launch, PROJECTILE_SPEED * fwd));
        trace!(?launch, "fired");
    }

    /// Marks every running sprite overlapping `area` as finished and queues
    /// its [`SceneEvent::AnimationFinished`].
    fn finish_sprites_in(&mut self, area: Rect) {
        for id in self.actors.ids() {
            if let Some(Actor::Sprite(s)) = self.actors.get_mut(id) {
                if !s.is_finished() && s.bounds().overlaps(&area) {
                    s.finish();
                    self.events.push(SceneEvent::AnimationFinished(id));
                }
            }
        }
    }

    /// One simulation step: steer, move, lay the trail, collide.
    pub fn tick(&mut self) {
        let input = self.input;
        if self.player.step(input) {
            self.events
                .push(SceneEvent::PlayerPositionChanged(self.player.pos));
        }

        let trail = self.player.pos - AFTERBURN_OFFSET * self.player.forward();
        if trail.distance(self.last_afterburn) > AFTERBURN_SPACING {
            self.last_afterburn = trail;
            self.spawn_sprite(AnimationSprite::once(SpriteKind::Afterburn, trail));
        }

        self.finish_sprites_in(self.player.bounds());
    }

    /// Runs every actor's own timer for `dt`.
    pub fn step_actors(&mut self, dt: Duration) {
        for id in self.actors.ids() {
            let Some(actor) = self.actors.get_mut(id) else {
                continue;
            };
            for event in actor.tick(dt) {
                match event {
                    ActorEvent::Stepped(area) => self.finish_sprites_in(area),
                    ActorEvent::Deactivated => {
                        self.events.push(SceneEvent::ProjectileDeactivated(id))
                    }
                    ActorEvent::Finished => self.events.push(SceneEvent::AnimationFinished(id)),
                }
            }
        }
    }

    /// Advances the simulation and every actor by `dt` and hands out the
    /// events raised meanwhile.
    pub fn advance(&mut self, dt: Duration) -> Vec<SceneEvent> {
        for _ in 0..self.clock.advance(dt) {
            self.tick();
        }
        self.step_actors(dt);
        self.drain_events()
    }

    /// Takes the events queued outside `advance`.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    /// Default listener: removes the actors named by finish/deactivate events.
    pub fn reap(&mut self, events: &[SceneEvent]) {
        for event in events {
            match *event {
                SceneEvent::AnimationFinished(id) | SceneEvent::ProjectileDeactivated(id) => {
                    self.remove(id);
                }
                SceneEvent::PlayerPositionChanged(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use input::Direction;

    fn sprites(scene: &GameScene) -> usize {
        scene
            .actors()
            .iter()
            .filter(|(_, a)| matches!(a, Actor::Sprite(_)))
            .count()
    }

    #[test]
    fn arena_rejects_stale_ids() {
        let mut arena = ActorArena::default();
        let a = arena.insert(Actor::Sprite(AnimationSprite::once(
            SpriteKind::Explosion,
            Vec2::ZERO,
        )));
        assert!(arena.remove(a).is_some());
        let b = arena.insert(Actor::Projectile(Projectile::new(Vec2::ZERO, Vec2::X)));
        assert_ne!(a, b);
        assert!(arena.get(a).is_none());
        assert!(arena.remove(a).is_none());
        assert!(arena.get(b).is_some());
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn fire_spawns_flash_and_one_projectile() {
        let mut scene = GameScene::new(vec2(100.0, 100.0));
        scene.key(Key::Fire, true);
        scene.key(Key::Fire, false);
        assert_eq!(sprites(&scene), 4);
        let shots: Vec<&Projectile> = scene
            .actors()
            .iter()
            .filter_map(|(_, a)| match a {
                Actor::Projectile(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].velocity, vec2(PROJECTILE_SPEED, 0.0));
        assert_eq!(shots[0].launch, vec2(100.0 + PLAYER_LENGTH / 2.0, 100.0));
    }

    #[test]
    fn moving_player_emits_position_and_lays_trail() {
        let mut scene = GameScene::new(vec2(0.0, 0.0));
        scene.key(Key::Up, true);
        let mut positions = 0;
        for _ in 0..20 {
            scene.tick();
            positions += scene
                .drain_events()
                .iter()
                .filter(|e| matches!(e, SceneEvent::PlayerPositionChanged(_)))
                .count();
        }
        assert_eq!(positions, 20);
        assert!(sprites(&scene) > 0);
    }

    #[test]
    fn standing_still_emits_nothing() {
        let mut scene = GameScene::new(vec2(0.0, 0.0));
        scene.tick();
        assert!(scene.drain_events().is_empty());
        assert_eq!(sprites(&scene), 0);
    }

    #[test]
    fn player_overlap_finishes_sprite_once() {
        let mut scene = GameScene::new(vec2(0.0, 0.0));
        let id = scene.spawn_sprite(AnimationSprite::looping(
            SpriteKind::Explosion,
            Vec2::ZERO,
            false,
        ));
        scene.tick();
        scene.tick();
        assert_eq!(scene.drain_events(), vec![SceneEvent::AnimationFinished(id)]);
    }

    #[test]
    fn projectile_hits_sprite_in_its_path() {
        let mut scene = GameScene::new(vec2(-500.0, -500.0));
        let target = scene.spawn_sprite(AnimationSprite::looping(
            SpriteKind::Explosion,
            vec2(40.0, 0.0),
            true,
        ));
        scene.spawn_projectile(Projectile::new(Vec2::ZERO, vec2(2.0, 0.0)));
        let mut events = Vec::new();
        for _ in 0..20 {
            events.extend(scene.advance(Duration::from_millis(30)));
        }
        assert!(events.contains(&SceneEvent::AnimationFinished(target)));
        scene.reap(&events);
        assert!(scene.actors().get(target).is_none());
    }

    #[test]
    fn joypad_drives_flags_and_aim() {
        let mut scene = GameScene::new(Vec2::ZERO);
        scene.joypad(JoypadEvent::Press(Direction::Forward));
        assert!(scene.input().forward);
        scene.joypad(JoypadEvent::Release(Direction::Forward));
        assert!(scene.input().is_idle());
        scene.joypad(JoypadEvent::Aim(-90.0));
        assert_eq!(scene.player().requested_angle, Some(270.0));
    }
}
