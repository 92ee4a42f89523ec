//! The tick scheduler.
//!
//! Each admitted tick runs the registered systems in order (clock, then
//! resources, then entities for the core set) and then notifies tick
//! subscribers. A system error stops the engine; a subscriber error is
//! logged and ignored.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use rand::Rng;

use crate::entity::EntityId;
use crate::error::{SimError, SimResult};
use crate::rng::{RngManager, SystemRng};
use crate::snapshot::{EntitySnapshot, Frame, ResourceSnapshot, TimeSnapshot, WorldSnapshot};
use crate::species::{SpeciesCatalog, SpeciesDefinition};
use crate::systems::{ClockSystem, EntitySystem, ResourceSystem};
use crate::world::World;

pub const DEFAULT_TARGET_FPS: f64 = 60.0;
const MIN_TARGET_FPS: f64 = 0.1;
const MAX_TARGET_FPS: f64 = 1_000.0;

pub struct EngineSettings {
    pub name: String,
    pub seed: u64,
    pub width: u32,
    pub height: u32,
    pub target_fps: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            seed: 42,
            width: 30,
            height: 20,
            target_fps: DEFAULT_TARGET_FPS,
        }
    }
}

pub struct EngineBuilder {
    settings: EngineSettings,
    catalog: SpeciesCatalog,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            catalog: SpeciesCatalog::with_defaults(),
            systems: Vec::new(),
        }
    }

    pub fn with_catalog(mut self, catalog: SpeciesCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_species(mut self, definition: SpeciesDefinition) -> Self {
        self.catalog.register(definition);
        self
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    /// Clock, resources, entities: the order every tick must follow.
    pub fn with_core_systems(self) -> Self {
        self.with_system(ClockSystem::new())
            .with_system(ResourceSystem::new())
            .with_system(EntitySystem::new())
    }

    /// Generate the map, scatter resources and return a stopped engine.
    pub fn build(self) -> SimResult<Engine> {
        let mut rng = RngManager::new(self.settings.seed);
        let mut world = World::new(
            self.settings.width,
            self.settings.height,
            self.settings.seed,
            self.catalog,
        )?;
        let nodes = world.ledger.generate(&world.map, &mut rng.stream("resources"));
        tracing::info!(
            scenario = %self.settings.name,
            width = self.settings.width,
            height = self.settings.height,
            seed = self.settings.seed,
            nodes,
            "engine built"
        );

        let mut engine = Engine {
            name: self.settings.name,
            world,
            systems: self.systems,
            rng,
            subscribers: BTreeMap::new(),
            next_subscription: 0,
            running: StopHandle::default(),
            tick: 0,
            last_frame: None,
            frame_interval: frame_interval(DEFAULT_TARGET_FPS),
        };
        engine.set_target_fps(self.settings.target_fps);
        Ok(engine)
    }
}

/// Per-tick inputs handed to every system.
pub struct SystemContext {
    pub tick: u64,
    pub delta_ms: f64,
    /// Entities that failed during this tick; filled by the entity system.
    pub failed_entities: Vec<EntityId>,
}

pub trait System {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &mut SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> SimResult<()>;
}

pub type TickSubscriber = Box<dyn FnMut(f64) -> anyhow::Result<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Cloneable run flag. Clearing it stops the engine after the current tick.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn set_running(&self, running: bool) -> bool {
        self.0.swap(running, Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SystemRunReport {
    pub name: String,
    pub duration_ms: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    pub tick: u64,
    pub delta_ms: f64,
    pub system_reports: Vec<SystemRunReport>,
    pub entities: usize,
    pub failed_entities: Vec<EntityId>,
}

pub struct Engine {
    name: String,
    world: World,
    systems: Vec<Box<dyn System>>,
    rng: RngManager,
    subscribers: BTreeMap<SubscriptionId, TickSubscriber>,
    next_subscription: u64,
    running: StopHandle,
    tick: u64,
    last_frame: Option<Instant>,
    frame_interval: Duration,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("name", &self.name)
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn seed(&self) -> u64 {
        self.rng.master_seed()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct access for setup and tooling. Not meant to be used mid-run.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn is_running(&self) -> bool {
        self.running.is_running()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.running.clone()
    }

    /// Begin admitting ticks. Calling it while running does nothing.
    pub fn start(&mut self) {
        if self.running.set_running(true) {
            return;
        }
        self.last_frame = None;
        tracing::info!(scenario = %self.name, tick = self.tick, "engine started");
    }

    /// Stop admitting ticks. Calling it while stopped does nothing.
    pub fn stop(&mut self) {
        if self.running.set_running(false) {
            tracing::info!(scenario = %self.name, tick = self.tick, "engine stopped");
        }
    }

    pub fn subscribe(
        &mut self,
        subscriber: impl FnMut(f64) -> anyhow::Result<()> + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.insert(id, Box::new(subscriber));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    pub fn target_fps(&self) -> f64 {
        1.0 / self.frame_interval.as_secs_f64()
    }

    /// Clamped to 0.1..=1000; non-finite or non-positive rates are ignored.
    pub fn set_target_fps(&mut self, fps: f64) {
        if fps.is_finite() && fps > 0.0 {
            self.frame_interval = frame_interval(fps);
        } else {
            tracing::warn!(fps, "ignoring invalid target fps");
        }
    }

    /// Run one tick with `delta_ms` of elapsed time.
    ///
    /// Returns `Ok(None)` when the engine is stopped. A failing system stops
    /// the engine and comes back as [`SimError::SchedulerFatal`].
    pub fn tick(&mut self, delta_ms: f64) -> SimResult<Option<TickSummary>> {
        if !self.is_running() {
            return Ok(None);
        }

        let tick = self.tick + 1;
        let mut ctx = SystemContext {
            tick,
            delta_ms,
            failed_entities: Vec::new(),
        };
        let mut system_reports = Vec::with_capacity(self.systems.len());
        for system in &mut self.systems {
            let started = Instant::now();
            let mut stream = self.rng.stream(system.name());
            if let Err(err) = system.run(&mut ctx, &mut self.world, &mut stream) {
                self.running.set_running(false);
                tracing::error!(
                    system = system.name(),
                    tick,
                    error = %err,
                    "system failed, stopping engine"
                );
                return Err(SimError::SchedulerFatal {
                    system: system.name().to_string(),
                    source: Box::new(err),
                });
            }
            system_reports.push(SystemRunReport {
                name: system.name().to_string(),
                duration_ms: started.elapsed().as_secs_f64() * 1_000.0,
            });
        }
        self.tick = tick;

        for (id, subscriber) in self.subscribers.iter_mut() {
            if let Err(err) = subscriber(delta_ms) {
                tracing::warn!(subscriber = id.0, error = %err, "tick subscriber failed");
            }
        }

        tracing::debug!(tick, delta_ms, entities = self.world.registry.len(), "tick");
        Ok(Some(TickSummary {
            tick,
            delta_ms,
            system_reports,
            entities: self.world.registry.len(),
            failed_entities: ctx.failed_entities,
        }))
    }

    /// Feed a wall-clock instant. A tick is admitted once a full frame
    /// interval has passed; the leftover carries into the next frame.
    pub fn frame(&mut self, now: Instant) -> SimResult<Option<TickSummary>> {
        if !self.is_running() {
            return Ok(None);
        }
        let Some(last) = self.last_frame else {
            self.last_frame = Some(now);
            return Ok(None);
        };
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.frame_interval {
            return Ok(None);
        }
        let remainder = elapsed.as_nanos() % self.frame_interval.as_nanos();
        self.last_frame = Some(now - Duration::from_nanos(remainder as u64));
        self.tick(elapsed.as_secs_f64() * 1_000.0)
    }

    /// Fixed-step headless run. Starts the engine if needed and stops it at the end.
    pub fn run_fixed(
        &mut self,
        ticks: u64,
        delta_ms: f64,
        mut on_tick: impl FnMut(&TickSummary, &World),
    ) -> SimResult<u64> {
        self.start();
        let mut completed = 0;
        while completed < ticks {
            match self.tick(delta_ms)? {
                Some(summary) => {
                    completed += 1;
                    on_tick(&summary, &self.world);
                }
                None => break,
            }
        }
        self.stop();
        Ok(completed)
    }

    /// Paced run on the tokio timer until stopped or `max_ticks` is reached.
    pub async fn run_realtime(
        &mut self,
        max_ticks: Option<u64>,
        mut on_tick: impl FnMut(&TickSummary, &World),
    ) -> SimResult<u64> {
        if max_ticks == Some(0) {
            return Ok(0);
        }
        self.start();
        let mut interval = tokio::time::interval(self.frame_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut completed = 0;
        loop {
            if !self.is_running() {
                // Cleared through a `StopHandle`.
                tracing::info!(scenario = %self.name, tick = self.tick, "engine stopped");
                break;
            }
            let now = interval.tick().await.into_std();
            if let Some(summary) = self.frame(now)? {
                completed += 1;
                on_tick(&summary, &self.world);
                if max_ticks.is_some_and(|max| completed >= max) {
                    self.stop();
                    break;
                }
            }
        }
        Ok(completed)
    }

    /// Replace the map, rescatter resources and remove every entity.
    /// Without a seed one is drawn from the engine's `world` stream.
    pub fn regenerate_world(&mut self, width: u32, height: u32, seed: Option<u64>) -> SimResult<()> {
        let seed = seed.unwrap_or_else(|| self.rng.stream("world").gen());
        let nodes = self
            .world
            .regenerate(width, height, seed, &mut self.rng.stream("resources"))?;
        tracing::info!(width, height, seed, nodes, "world regenerated");
        Ok(())
    }

    /// Spawn entities per species. Every id is checked before anything spawns.
    pub fn spawn_entities(&mut self, counts: &BTreeMap<String, usize>) -> SimResult<Vec<EntityId>> {
        for species_id in counts.keys() {
            self.world.catalog.get(species_id)?;
        }
        let mut spawned = Vec::new();
        for (species_id, count) in counts {
            let ids = self
                .world
                .spawn(species_id, *count, &mut self.rng.stream("spawn"))?;
            tracing::info!(species = %species_id, count = ids.len(), "entities spawned");
            spawned.extend(ids);
        }
        Ok(spawned)
    }

    pub fn register_species(&mut self, definition: SpeciesDefinition) {
        self.world.catalog.register(definition);
    }

    pub fn remove_entity(&mut self, id: EntityId) {
        self.world.registry.remove(id);
    }

    pub fn set_time_scale(&mut self, scale: f64) {
        self.world.clock.set_time_scale(scale);
    }

    pub fn time(&self) -> TimeSnapshot {
        self.world.time_snapshot()
    }

    pub fn world_snapshot(&self) -> WorldSnapshot {
        self.world.world_snapshot()
    }

    pub fn entities(&self) -> Vec<EntitySnapshot> {
        self.world.entity_snapshots()
    }

    pub fn resources(&self) -> Vec<ResourceSnapshot> {
        self.world.resource_snapshots()
    }

    pub fn frame_snapshot(&self) -> Frame {
        Frame {
            captured_at: Utc::now(),
            tick: self.tick,
            time: self.time(),
            world: self.world_snapshot(),
            entities: self.entities(),
            resources: self.resources(),
        }
    }
}

fn frame_interval(fps: f64) -> Duration {
    Duration::from_secs_f64(1.0 / fps.clamp(MIN_TARGET_FPS, MAX_TARGET_FPS))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Engine {
        EngineBuilder::new(EngineSettings::default())
            .with_core_systems()
            .build()
            .unwrap()
    }

    #[test]
    fn stopped_engine_ignores_ticks() {
        let mut engine = engine();
        assert_eq!(engine.tick(16.0).unwrap(), None);
        assert_eq!(engine.tick_count(), 0);
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut engine = engine();
        engine.start();
        engine.start();
        assert!(engine.is_running());
        engine.stop();
        engine.stop();
        assert!(!engine.is_running());
    }

    #[test]
    fn systems_run_in_registration_order() {
        let mut engine = engine();
        engine.start();
        let summary = engine.tick(16.0).unwrap().unwrap();
        let names: Vec<_> = summary.system_reports.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["clock", "resources", "entities"]);
        assert_eq!(summary.tick, 1);
    }

    #[test]
    fn first_frame_only_sets_baseline() {
        let mut engine = engine();
        engine.start();
        let t0 = Instant::now();
        assert!(engine.frame(t0).unwrap().is_none());
        assert!(engine.frame(t0 + Duration::from_millis(5)).unwrap().is_none());

        let summary = engine.frame(t0 + Duration::from_millis(20)).unwrap().unwrap();
        assert!((summary.delta_ms - 20.0).abs() < 1e-6);
    }

    #[test]
    fn frame_carries_remainder() {
        let mut engine = engine();
        engine.set_target_fps(100.0);
        engine.start();
        let t0 = Instant::now();
        engine.frame(t0).unwrap();
        // 25ms elapsed: one tick, 5ms carried
        assert!(engine.frame(t0 + Duration::from_millis(25)).unwrap().is_some());
        assert!(engine.frame(t0 + Duration::from_millis(29)).unwrap().is_none());
        assert!(engine.frame(t0 + Duration::from_millis(30)).unwrap().is_some());
    }

    #[test]
    fn invalid_fps_is_ignored() {
        let mut engine = engine();
        engine.set_target_fps(0.0);
        engine.set_target_fps(f64::NAN);
        assert!((engine.target_fps() - 60.0).abs() < 1e-3);
    }
}
