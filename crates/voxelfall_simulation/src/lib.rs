//! VOXELFALL Simulation Core
//!
//! ECS-симуляция воксельной adventure-песочницы на Bevy 0.16 (headless).
//! Ядро владеет: terrain height field, AI врагов, combat/stagger, loot,
//! интеграция движения. Рендер/звук/UI — внешние collaborators, живут на
//! событиях из тика и никогда не держат ссылок внутрь симуляции.
//!
//! Архитектура тика:
//! - Один вызов `Simulation::tick(delta)` за кадр, delta ограничена 0.1с
//! - Все системы в одном schedule `SimulationStep` с фиксированным
//!   порядком фаз (SimSet) — порядок = воспроизводимость
//! - Вся случайность из seeded `DeterministicRng` — тесты управляют seed

use bevy::ecs::schedule::ScheduleLabel;
use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod content;
pub mod effects;
pub mod loot;
pub mod movement;
pub mod persistence;
pub mod registry;
pub mod sim;
pub mod terrain;

// Re-export базовых типов для удобства
pub use ai::{AIPlugin, BehaviorState};
pub use combat::{
    effective_damage, stagger_threshold, CombatPlugin, DamageDealt, DamageRequest, Dead,
    EntityDied, SkillCast, StaggerState, StaggerTriggered,
};
pub use components::*;
pub use content::{ContentError, ContentGenerator, EntityDescriptor, WorldContent};
pub use effects::{ActiveEffects, EffectsPlugin, TimedEffect};
pub use loot::{LootCatalog, LootCollected, LootDropped, LootPlugin};
pub use movement::MovementPlugin;
pub use persistence::{PersistenceError, SaveSnapshot};
pub use registry::EntityRegistry;
pub use sim::{EntityView, SimEvent, Simulation};
pub use terrain::{height, Biome};

/// Seed по умолчанию (переопределяется Simulation::new)
pub const DEFAULT_SEED: u64 = 42;

/// Верхняя граница delta за тик (bound интеграционной ошибки при фризах)
pub const MAX_DELTA: f32 = 0.1;

/// Schedule симуляционного тика (запускается вручную из Simulation::tick,
/// не через winit runner)
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimulationStep;

/// Фазы тика. Порядок фиксирован и chained:
/// игрок → AI решения → combat → движение врагов → loot → buffs → эффекты → cleanup
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    PlayerMove,
    AiDecide,
    Combat,
    EnemyMove,
    Loot,
    Buffs,
    Effects,
    Cleanup,
}

/// Часы симуляции (абсолютное время + delta текущего тика)
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct SimClock {
    pub elapsed: f64,
    pub delta: f32,
}

impl SimClock {
    pub fn now(&self) -> f64 {
        self.elapsed
    }

    pub fn advance(&mut self, delta: f32) {
        self.delta = delta;
        self.elapsed += delta as f64;
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimClock>()
            .init_resource::<EntityRegistry>()
            .init_resource::<PlayerInput>()
            .init_resource::<WorldManifest>()
            .insert_resource(DeterministicRng::new(DEFAULT_SEED));

        // Фиксированный порядок фаз тика
        app.configure_sets(
            SimulationStep,
            (
                SimSet::PlayerMove,
                SimSet::AiDecide,
                SimSet::Combat,
                SimSet::EnemyMove,
                SimSet::Loot,
                SimSet::Buffs,
                SimSet::Effects,
                SimSet::Cleanup,
            )
                .chain(),
        );

        // BuffTracker-проход (после loot: свежие buffs не истекают в тот же тик)
        app.add_systems(
            SimulationStep,
            components::buffs::expire_buffs.in_set(SimSet::Buffs),
        );

        // Подсистемы
        app.add_plugins((
            MovementPlugin,
            AIPlugin,
            CombatPlugin,
            LootPlugin,
            EffectsPlugin,
        ));
    }
}

use once_cell::sync::Lazy;
use std::sync::Mutex;

// Глобальный logger: хост (рендерер, editor, headless бинарь) ставит свой
// sink; ядро пишет через log/log_info/log_warning/log_error
static LOGGER: Lazy<Mutex<Option<Box<dyn LogPrinter>>>> = Lazy::new(|| Mutex::new(None));

static LOGGER_LEVEL: Lazy<Mutex<LogLevel>> = Lazy::new(|| Mutex::new(LogLevel::Debug));

pub fn set_logger(logger: Box<dyn LogPrinter>) {
    *LOGGER.lock().unwrap() = Some(logger);
}

pub fn set_log_level(level: LogLevel) {
    *LOGGER_LEVEL.lock().unwrap() = level;
}

pub fn set_logger_if_needed(logger: Box<dyn LogPrinter>) {
    if LOGGER.lock().unwrap().is_none() {
        set_logger(logger);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

pub trait LogPrinter: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

pub fn log(message: &str) {
    log_with_level(LogLevel::Debug, message);
}

pub fn log_info(message: &str) {
    log_with_level(LogLevel::Info, message);
}

pub fn log_warning(message: &str) {
    log_with_level(LogLevel::Warning, message);
}

pub fn log_error(message: &str) {
    log_with_level(LogLevel::Error, message);
}

pub fn log_with_level(level: LogLevel, message: &str) {
    // Timestamp добавляем здесь, не в sink — все принтеры получают одинаковый формат
    if level < *LOGGER_LEVEL.lock().unwrap() {
        return;
    }

    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        logger.log(level, &format!("[{}] {}", timestamp, message));
    }
}

struct ConsoleLogger;

impl LogPrinter for ConsoleLogger {
    fn log(&self, level: LogLevel, message: &str) {
        println!("[{}] {}", level.as_str(), message);
    }
}

pub fn init_logger() {
    set_logger_if_needed(Box::new(ConsoleLogger));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advance() {
        let mut clock = SimClock::default();
        clock.advance(0.05);
        clock.advance(0.05);

        assert_eq!(clock.delta, 0.05);
        assert!((clock.now() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_rng_seed_reproducible() {
        use rand::Rng;

        let mut a = DeterministicRng::new(7);
        let mut b = DeterministicRng::new(7);

        let seq_a: Vec<u32> = (0..16).map(|_| a.rng.gen()).collect();
        let seq_b: Vec<u32> = (0..16).map(|_| b.rng.gen()).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warning < LogLevel::Error);
    }
}
