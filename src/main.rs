//! Rainmaker headless driver
//!
//! Plays the campaign against an in-memory scene with a scripted autopilot
//! standing in for physics and the player. Progress is saved after every
//! score change, so an interrupted run resumes where it stopped.
//!
//! Usage: `rainmaker [seed]`. `RAINMAKER_SAVE` overrides the save path.

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use glam::Vec2;
    use rand::Rng;
    use rand::seq::IndexedRandom;
    use rand_pcg::Pcg32;

    use rainmaker::platform::{HeadlessScene, SceneNode};
    use rainmaker::sim::{
        BodyCategory, ContactBody, ContactEvent, LevelEconomyController, NodeId, TurbulenceSide,
    };

    /// Seconds between autopilot decisions
    const DECISION_INTERVAL: f32 = 0.25;

    /// Decides what "happens" to the drop each decision step
    pub struct Autopilot {
        rng: Pcg32,
        since_decision: f32,
    }

    impl Autopilot {
        pub fn new(rng: Pcg32) -> Self {
            Self {
                rng,
                since_decision: 0.0,
            }
        }

        pub fn step(&mut self, ctl: &mut LevelEconomyController, scene: &mut HeadlessScene, dt: f32) {
            self.since_decision += dt;
            if self.since_decision < DECISION_INTERVAL {
                return;
            }
            self.since_decision = 0.0;

            let Some(drop) = scene.drop_node() else {
                return;
            };
            let roll: f32 = self.rng.random();
            if roll < 0.35 {
                if let Some((cloud, node)) = pick(scene.clouds(), &mut self.rng) {
                    let contact = contact(drop, BodyCategory::Obstacle, cloud, node);
                    ctl.handle_contact(scene, &contact);
                }
            } else if roll < 0.55 {
                if let Some((target, node)) = pick(scene.targets(), &mut self.rng) {
                    let contact = contact(drop, BodyCategory::Target, target, node);
                    ctl.handle_contact(scene, &contact);
                }
            } else if roll < 0.60 {
                let side = if self.rng.random_bool(0.5) {
                    TurbulenceSide::Primary
                } else {
                    TurbulenceSide::Secondary
                };
                if let Err(e) = ctl.turbulence(scene, side) {
                    log::debug!("Turbulence refused: {e}");
                }
            } else if roll < 0.62 {
                if let Err(e) = ctl.evaporate(scene) {
                    log::debug!("Evaporation refused: {e}");
                }
            }
            // Otherwise the drop is still falling
        }
    }

    fn pick<'a>(
        nodes: impl Iterator<Item = (NodeId, &'a SceneNode)>,
        rng: &mut Pcg32,
    ) -> Option<(NodeId, Vec2)> {
        let nodes: Vec<_> = nodes.map(|(id, n)| (id, n.position())).collect();
        nodes.choose(rng).copied()
    }

    fn contact(drop: NodeId, category: BodyCategory, other: NodeId, position: Vec2) -> ContactEvent {
        ContactEvent::new(
            ContactBody {
                category: BodyCategory::Drop,
                node: drop,
            },
            ContactBody {
                category,
                node: other,
            },
            position,
        )
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use rainmaker::consts::SIM_DT;
    use rainmaker::persistence::JsonFileStore;
    use rainmaker::platform::HeadlessScene;
    use rainmaker::progress::display_score;
    use rainmaker::sim::{GameEvent, LevelEconomyController, LevelPhase};
    use rainmaker::{LevelCatalog, LevelOutcome, PlayerProgress};

    /// Give up on a level after this much simulated time
    const LEVEL_TIME_LIMIT: f32 = 600.0;
    /// Attempts per level before the run stops
    const MAX_ATTEMPTS: u32 = 5;

    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0x5eed);
    let save_path =
        std::env::var("RAINMAKER_SAVE").unwrap_or_else(|_| "rainmaker-save.json".to_string());
    let store = JsonFileStore::new(save_path);

    let mut progress = match store.load() {
        Ok(Some(snapshot)) => PlayerProgress::from_snapshot(snapshot),
        Ok(None) => PlayerProgress::new(),
        Err(e) => {
            log::warn!("Ignoring unreadable save: {e}");
            PlayerProgress::new()
        }
    };
    if progress.campaign_finished() {
        log::info!("Campaign already finished, starting over");
        progress = PlayerProgress::new();
    }

    let catalog = LevelCatalog::builtin();
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut attempts = 0;
    log::info!("Rainmaker starting at level {} with seed {seed}", progress.level());

    while !progress.campaign_finished() {
        let level = progress.level();
        progress.begin_level();
        let config = catalog.config_for(level, progress.score(), &mut rng);

        let mut ctl = LevelEconomyController::new(config, seed.wrapping_add(u64::from(level)))
            .with_best_score(progress.snapshot.best_score)
            .with_campaign_counters(
                progress.snapshot.evaporation_count,
                progress.snapshot.turbulence_count,
            )
            .with_progress_sink(Box::new(store.clone()));
        let mut scene = HeadlessScene::new();
        if let Err(e) = ctl.start(&mut scene, 0.0) {
            log::error!("Level {level} failed to start: {e}");
            break;
        }

        let mut pilot = autopilot::Autopilot::new(Pcg32::seed_from_u64(seed ^ u64::from(level)));
        let mut sensor: Option<glam::Vec2> = None;
        let mut elapsed = 0.0;
        let mut completed = None;
        while completed.is_none() && elapsed < LEVEL_TIME_LIMIT {
            pilot.step(&mut ctl, &mut scene, SIM_DT);
            ctl.tick(&mut scene, SIM_DT, &mut sensor);
            elapsed += SIM_DT;
            completed = ctl.drain_events().into_iter().find_map(|e| match e {
                GameEvent::LevelCompleted { score, level } => Some((score, level)),
                _ => None,
            });
        }

        let (score, level) = match completed {
            Some(done) => done,
            None => {
                log::warn!("Level {level} timed out in phase {:?}", ctl.phase());
                (ctl.state().score(), level)
            }
        };
        let counters = ctl.snapshot();
        ctl.teardown();
        debug_assert_eq!(ctl.phase(), LevelPhase::TornDown);

        progress.absorb(&counters);
        let outcome = progress.complete_level(score, level);
        if let Err(e) = store.save(&progress.snapshot) {
            log::warn!("Failed to save progress: {e}");
        }

        match outcome {
            LevelOutcome::Advance { next_level } => {
                attempts = 0;
                println!(
                    "Level {level} cleared with {} points, on to level {next_level}",
                    display_score(score, level)
                );
            }
            LevelOutcome::Finished => {
                println!("Campaign finished with {score} points");
            }
            LevelOutcome::Retry { restored_score } => {
                attempts += 1;
                println!("Level {level} failed ({score}), retrying from {restored_score}");
                if attempts >= MAX_ATTEMPTS {
                    println!("Giving up after {attempts} attempts");
                    break;
                }
            }
        }
    }

    println!("Best score: {}", progress.snapshot.best_score);
}

#[cfg(target_arch = "wasm32")]
fn main() {}
