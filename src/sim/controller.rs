//! Level economy controller
//!
//! Owns the [`GameState`] of one level and is the only thing that mutates it.
//! Physics contacts, player actions and timers all arrive here on the game
//! loop's thread:
//! - contacts via [`LevelEconomyController::handle_contact`]
//! - turbulence/evaporation via [`LevelEconomyController::turbulence`] and
//!   [`LevelEconomyController::evaporate`]
//! - sensor samples and due timers via [`LevelEconomyController::tick`]
//!
//! When the last target goes out every pending timer is cancelled and
//! `LevelCompleted` follows after a short grace period.

use glam::Vec2;
use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;
use thiserror::Error;

use super::board::BoardLayout;
use super::contact::{ContactEvent, ContactKind, classify};
use super::drop::{DropError, Droplet};
use super::events::{EventBus, EventListener, GameEvent};
use super::gravity::{GravityMode, GravityOscillator, scale_sensor_sample};
use super::schedule::Scheduler;
use super::scoring::{ObstacleKind, ScoreChange};
use super::state::{GameState, LevelPhase, NodeId};
use super::turbulence::{TurbulenceSide, impulse};
use super::wildfire::TargetKind;
use crate::consts::*;
use crate::level::LevelConfig;
use crate::platform::{Accelerometer, Effect, Scene};
use crate::progress::{ProgressSink, ProgressSnapshot};

/// Delayed work owned by a level
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelTask {
    /// Redraw gravity (repeating)
    OscillateGravity,
    /// Bring a new drop in after a target contact
    RespawnDrop,
    /// Flare a fire or smoke back up where a target went out
    RespawnTarget { position: Vec2 },
    /// Emit `LevelCompleted`
    AnnounceCompletion,
}

/// Why a player action or lifecycle call was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("level is not in play ({0:?})")]
    NotPlaying(LevelPhase),
    #[error("level already started")]
    AlreadyStarted,
    #[error(transparent)]
    Drop(#[from] DropError),
}

/// What a contact did to the level
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactOutcome {
    /// A target went out
    Extinguished { remaining: u32 },
    /// A cloud hit moved the score
    CloudScored(ScoreChange),
    /// Repeat hit on the same cloud; nothing scored
    CloudSuppressed,
    /// Not relevant (wrong categories, contact not from the live drop, level
    /// not in play, unknown node)
    Ignored,
}

pub struct LevelEconomyController {
    config: LevelConfig,
    mode: GravityMode,
    oscillator: GravityOscillator,
    state: GameState,
    scheduler: Scheduler<LevelTask>,
    /// Bumped whenever the scheduler is flushed, so a batch of due tasks
    /// stops as soon as one of them flushes it
    timer_epoch: u64,
    rng: Pcg32,
    events: EventBus,
    sink: Option<Box<dyn ProgressSink>>,
    /// Campaign evaporation/turbulence totals from earlier levels
    carried_counters: (u32, u32),
}

impl std::fmt::Debug for LevelEconomyController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelEconomyController")
            .field("level", &self.config.level_index)
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("pending_timers", &self.scheduler.pending())
            .finish()
    }
}

impl LevelEconomyController {
    /// Set up a level from its config. Nothing touches the scene until `start`.
    pub fn new(config: LevelConfig, seed: u64) -> Self {
        let mode = config.gravity_mode();
        let state = GameState::new(
            config.level_index,
            config.starting_score,
            config.starting_score,
            config.base_gravity,
        );
        Self {
            mode,
            oscillator: GravityOscillator::default(),
            state,
            scheduler: Scheduler::new(),
            timer_epoch: 0,
            rng: Pcg32::seed_from_u64(seed),
            events: EventBus::new(),
            sink: None,
            carried_counters: (0, 0),
            config,
        }
    }

    /// Carry over the player's best score
    pub fn with_best_score(mut self, best_score: i64) -> Self {
        let score = self.state.score();
        self.state.scoring = super::scoring::ScoringEngine::new(score, best_score.max(score));
        self
    }

    /// Carry over the campaign's evaporation and turbulence totals so
    /// snapshots report running totals rather than this level's alone
    pub fn with_campaign_counters(mut self, evaporation_count: u32, turbulence_count: u32) -> Self {
        self.carried_counters = (evaporation_count, turbulence_count);
        self
    }

    pub fn with_progress_sink(mut self, sink: Box<dyn ProgressSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn subscribe(&mut self, listener: Box<dyn EventListener>) {
        self.events.subscribe(listener);
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn gravity_mode(&self) -> GravityMode {
        self.mode
    }

    pub fn phase(&self) -> LevelPhase {
        self.state.phase
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    /// Events published since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    /// Current record for the persistence collaborator
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            score: self.state.score(),
            level: self.state.level,
            best_score: self.state.best_score(),
            evaporation_count: self.carried_counters.0 + self.state.evaporation_count,
            turbulence_count: self.carried_counters.1 + self.state.turbulence_count,
        }
    }

    /// Build the board with its lowest cloud row at `baseline`, take the
    /// entry toll, set up gravity and drop the first drop.
    /// Returns the number of targets placed.
    pub fn start(&mut self, scene: &mut impl Scene, baseline: f32) -> Result<u32, ActionError> {
        if self.state.phase != LevelPhase::Pending {
            return Err(ActionError::AlreadyStarted);
        }

        self.publish_score(self.state.score());
        let toll = self.state.scoring.apply_entry_toll();
        self.publish_score(toll.after);

        let layout = BoardLayout::generate(&self.config, baseline, &mut self.rng);
        for cloud in &layout.clouds {
            let id = self.state.next_node_id();
            scene.place_cloud(id, cloud.position, cloud.kind);
        }
        for target in &layout.targets {
            self.place_target(scene, target.position, target.kind);
        }
        let targets = self.state.wildfires_remaining();
        if targets == 0 {
            log::warn!(
                "Level {} has no targets; it cannot complete",
                self.config.level_index
            );
        }

        match self.mode {
            GravityMode::Static | GravityMode::Sensor => {}
            GravityMode::Oscillating => {
                self.apply_gravity(scene, self.config.base_gravity);
                self.scheduler
                    .schedule_repeating(self.oscillator.period, LevelTask::OscillateGravity);
            }
        }

        self.state.phase = LevelPhase::Playing;
        if let Err(e) = self.spawn_drop(scene) {
            log::debug!("Initial drop not spawned: {e}");
        }

        log::info!(
            "Level {} started: {} gravity, {} clouds, {} targets, score {}",
            self.config.level_index,
            self.mode.as_str(),
            layout.clouds.len(),
            targets,
            self.state.score()
        );
        Ok(targets)
    }

    /// Advance one frame: consume the sensor sample, then run due timers.
    pub fn tick(&mut self, scene: &mut impl Scene, dt: f32, sensor: &mut impl Accelerometer) {
        if self.state.phase.is_finished() || self.state.phase == LevelPhase::Pending {
            return;
        }

        if self.mode == GravityMode::Sensor && self.state.phase.accepts_input() {
            if let Some(sample) = sensor.sample() {
                let gravity = scale_sensor_sample(sample, self.config.base_gravity);
                if gravity != self.state.gravity {
                    self.apply_gravity(scene, gravity);
                }
            }
        }

        let epoch = self.timer_epoch;
        for task in self.scheduler.advance(dt) {
            if self.timer_epoch != epoch {
                break;
            }
            self.run_task(scene, task);
        }
    }

    /// Route a physics contact
    pub fn handle_contact(&mut self, scene: &mut impl Scene, contact: &ContactEvent) -> ContactOutcome {
        if !self.state.phase.accepts_input() {
            return ContactOutcome::Ignored;
        }
        let kind = classify(contact);
        let drop = match kind {
            ContactKind::DropTarget { drop, .. } | ContactKind::DropCloud { drop, .. } => drop,
            ContactKind::Ignored => return ContactOutcome::Ignored,
        };
        // Only the live drop scores; stale contacts from a removed drop are dropped
        if self.state.drop.active().map(|d| d.id) != Some(drop) {
            log::debug!("Contact from inactive drop {drop:?} ignored");
            return ContactOutcome::Ignored;
        }

        match kind {
            ContactKind::DropTarget { target, .. } => {
                self.on_target_contact(scene, target, contact.position)
            }
            ContactKind::DropCloud { cloud, .. } => {
                self.on_cloud_contact(scene, cloud, contact.position)
            }
            ContactKind::Ignored => ContactOutcome::Ignored,
        }
    }

    /// Turbulence button. Always charged; the impulse only lands if a drop
    /// is in play. Returns the applied impulse.
    pub fn turbulence(
        &mut self,
        scene: &mut impl Scene,
        side: TurbulenceSide,
    ) -> Result<Option<Vec2>, ActionError> {
        self.ensure_playing()?;

        let applied = self.state.drop.active().map(|drop| {
            let v = impulse(
                self.state.direction,
                side,
                self.config.turbulence_deviation_x,
                self.config.turbulence_deviation_y,
            );
            scene.apply_impulse(drop.id, v);
            v
        });

        self.state.turbulence_count += 1;
        let change = self.state.scoring.apply_turbulence(self.config.turbulence_price);
        self.publish_score(change.after);
        Ok(applied)
    }

    /// Evaporation button: swap the live drop for a fresh one. Refused (and
    /// free) while no drop is in play.
    pub fn evaporate(&mut self, scene: &mut impl Scene) -> Result<NodeId, ActionError> {
        self.ensure_playing()?;
        if !self.state.drop_active() {
            return Err(DropError::NotActive.into());
        }

        let id = self.state.next_node_id();
        let fresh = Droplet::roll(id, &self.config, &mut self.rng);
        let old = self.state.drop.manual_refresh(fresh)?;
        scene.remove_node(old.id);
        scene.spawn_drop(&fresh);

        self.state.evaporation_count += 1;
        let change = self.state.scoring.apply_evaporation(self.config.evaporation_price);
        self.publish_score(change.after);
        Ok(id)
    }

    /// Abandon the level. Pending timers are dropped and later ticks do nothing.
    pub fn teardown(&mut self) {
        let cancelled = self.flush_timers();
        self.state.phase = LevelPhase::TornDown;
        log::debug!(
            "Level {} torn down, {cancelled} timers cancelled",
            self.config.level_index
        );
    }

    fn on_target_contact(&mut self, scene: &mut impl Scene, target: NodeId, position: Vec2) -> ContactOutcome {
        let drop = match self.state.drop.on_target_contact() {
            Ok(drop) => drop,
            Err(e) => {
                log::debug!("Target contact ignored: {e}");
                return ContactOutcome::Ignored;
            }
        };
        scene.remove_node(target);
        scene.remove_node(drop.id);

        let extinguished = self.state.wildfires.extinguish();
        if let Ok(x) = &extinguished {
            if x.respawn_due {
                let delay = self.config.wildfire_respawn_interval * WILDFIRE_RESPAWN_FACTOR;
                self.scheduler
                    .schedule_once(delay, LevelTask::RespawnTarget { position });
            }
        }

        if !scene.play_effect(Effect::Steam, position) {
            log::debug!("Steam effect unavailable");
        }

        let change = self.state.scoring.apply_target_contact();
        self.publish_score(change.after);
        self.scheduler
            .schedule_once(DROP_RESPAWN_DELAY, LevelTask::RespawnDrop);

        match extinguished {
            Ok(x) => {
                if x.level_completed {
                    self.begin_completion();
                }
                ContactOutcome::Extinguished {
                    remaining: x.remaining,
                }
            }
            Err(e) => {
                log::warn!("Target {target:?} was not tracked: {e}");
                ContactOutcome::Extinguished { remaining: 0 }
            }
        }
    }

    fn on_cloud_contact(&mut self, scene: &mut impl Scene, cloud: NodeId, position: Vec2) -> ContactOutcome {
        let Some(kind) = scene.obstacle_kind(cloud) else {
            return ContactOutcome::Ignored;
        };
        let suppressed = self.state.clouds.observe(cloud);
        if suppressed {
            return ContactOutcome::CloudSuppressed;
        }

        let prices = self.config.cloud_prices();
        let Some(change) = self
            .state
            .scoring
            .apply_cloud_collision(kind, prices, suppressed)
        else {
            return ContactOutcome::CloudSuppressed;
        };
        self.publish_score(change.after);

        if kind == ObstacleKind::Cloud {
            for effect in [Effect::Pulse, Effect::Rain] {
                if !scene.play_effect(effect, position) {
                    log::debug!("{effect:?} effect unavailable");
                }
            }
        }
        ContactOutcome::CloudScored(change)
    }

    fn run_task(&mut self, scene: &mut impl Scene, task: LevelTask) {
        match task {
            LevelTask::OscillateGravity => {
                let gravity = self.oscillator.draw(&mut self.rng);
                self.apply_gravity(scene, gravity);
            }
            LevelTask::RespawnDrop => {
                if let Err(e) = self.spawn_drop(scene) {
                    log::debug!("Drop respawn skipped: {e}");
                }
            }
            LevelTask::RespawnTarget { position } => {
                let kind = TargetKind::RESPAWNABLE
                    .choose(&mut self.rng)
                    .copied()
                    .unwrap_or(TargetKind::Fire);
                self.place_target(scene, position, kind);
            }
            LevelTask::AnnounceCompletion => {
                self.state.phase = LevelPhase::Completed;
                let score = self.state.score();
                let level = self.state.level;
                self.events.publish(GameEvent::LevelCompleted { score, level });
                self.record_progress();
                log::info!("Level {level} completed with score {score}");
            }
        }
    }

    fn begin_completion(&mut self) {
        let cancelled = self.flush_timers();
        self.state.phase = LevelPhase::Completing;
        self.scheduler
            .schedule_once(COMPLETION_GRACE, LevelTask::AnnounceCompletion);
        log::debug!("All targets out, {cancelled} timers cancelled");
    }

    fn flush_timers(&mut self) -> usize {
        self.timer_epoch += 1;
        self.scheduler.cancel_all()
    }

    fn spawn_drop(&mut self, scene: &mut impl Scene) -> Result<NodeId, DropError> {
        if self.state.drop_active() {
            return Err(DropError::AlreadyActive);
        }
        let id = self.state.next_node_id();
        let drop = Droplet::roll(id, &self.config, &mut self.rng);
        self.state.drop.spawn(drop)?;
        scene.spawn_drop(&drop);
        Ok(id)
    }

    fn place_target(&mut self, scene: &mut impl Scene, position: Vec2, kind: TargetKind) {
        let id = self.state.next_node_id();
        if scene.place_target(id, position, kind) {
            self.state.wildfires.register();
        } else {
            log::debug!("{kind:?} asset unavailable, target skipped");
        }
    }

    fn apply_gravity(&mut self, scene: &mut impl Scene, gravity: Vec2) {
        self.state.set_gravity(gravity);
        scene.set_gravity(gravity);
        self.events.publish(GameEvent::GravityChanged {
            x: gravity.x,
            y: gravity.y,
        });
    }

    fn publish_score(&mut self, score: i64) {
        self.events.publish(GameEvent::ScoreChanged {
            score,
            level: self.state.level,
        });
        self.record_progress();
    }

    fn record_progress(&mut self) {
        let snapshot = self.snapshot();
        if let Some(sink) = self.sink.as_mut() {
            sink.record(&snapshot);
        }
    }

    fn ensure_playing(&self) -> Result<(), ActionError> {
        if self.state.phase.accepts_input() {
            Ok(())
        } else {
            Err(ActionError::NotPlaying(self.state.phase))
        }
    }
}
