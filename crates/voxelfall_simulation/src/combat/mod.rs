//! Combat система
//!
//! ECS ответственность:
//! - Game state: Health, StaggerState, LastAttack
//! - Combat rules: mitigation формула, stagger accumulation/decay, death
//! - Events: DamageRequest (вход), DamageDealt, StaggerTriggered, EntityDied,
//!   CastSkillRequest (вход), SkillCast
//!
//! Рендерер/хост ответственность:
//! - Визуал урона, death animation, звук — по событиям из тика
//!
//! Порядок выполнения (SimSet::Combat, chained):
//! 1. expire_stagger_windows — нормализация истёкших stagger окон
//! 2. cast_player_skills    — скиллы игрока → DamageRequest
//! 3. apply_damage          — обработка DamageRequest → hp/stagger/death
//! 4. decay_stagger_points  — спад stagger points (15/сек)

use bevy::prelude::*;

use crate::SimSet;

pub mod attack;
pub mod damage;
pub mod skills;
pub mod stagger;

// Re-export основных типов
pub use attack::{attack_damage, LastAttack, ATTACK_COOLDOWN, MELEE_RANGE};
pub use damage::{
    apply_damage, despawn_dead, effective_damage, DamageDealt, DamageRequest, Dead, EntityDied,
};
pub use skills::{cast_player_skills, CastSkillRequest, SkillCast};
pub use stagger::{
    decay_stagger_points, expire_stagger_windows, stagger_threshold, StaggerState,
    StaggerTriggered, STAGGER_DURATION,
};

/// Combat Plugin
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<DamageRequest>()
            .add_event::<DamageDealt>()
            .add_event::<StaggerTriggered>()
            .add_event::<EntityDied>()
            .add_event::<CastSkillRequest>()
            .add_event::<SkillCast>();

        // Регистрация систем
        app.add_systems(
            crate::SimulationStep,
            (
                expire_stagger_windows,
                cast_player_skills,
                apply_damage,
                decay_stagger_points,
            )
                .chain()
                .in_set(SimSet::Combat),
        );

        // Смерть обрабатывается в конце тика (после loot roll и событий)
        app.add_systems(
            crate::SimulationStep,
            despawn_dead.in_set(SimSet::Cleanup),
        );
    }
}
