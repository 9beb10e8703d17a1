//! ECS Components симулируемых entity
//!
//! Организация по доменам:
//! - actor: базовые характеристики (Actor, Health, CombatStats, Skill)
//! - buffs: временные модификаторы статов (Buff, ActiveBuffs)
//! - movement: перемещение (Velocity, MoveIntent, Heading, SpawnOrigin)
//! - player: player marker + input state
//! - world: voxel-модель и world manifest (spawn-time данные)

pub mod actor;
pub mod buffs;
pub mod movement;
pub mod player;
pub mod world;

// Re-exports для удобного импорта
pub use actor::*;
pub use buffs::*;
pub use movement::*;
pub use player::*;
pub use world::*;
