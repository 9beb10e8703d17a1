//! Stagger state machine
//!
//! Alive → (points ≥ threshold) → Staggered (2.0с, AI подавлен, урон ×1.5)
//! → Alive; из любого состояния → Dead при hp ≤ 0.
//!
//! Инварианты:
//! - points ∈ [0, threshold) всегда, кроме момента trigger (сброс в 0)
//! - не больше одного активного окна (`until` — None или один момент в будущем)

use bevy::prelude::*;

use crate::combat::damage::Dead;
use crate::SimClock;

/// Длительность stagger окна (секунды)
pub const STAGGER_DURATION: f64 = 2.0;
/// Спад stagger points вне окна (points/сек)
pub const STAGGER_DECAY_RATE: f32 = 15.0;

/// Накопленный stagger и активное окно
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct StaggerState {
    /// Накопленные points (≥ 0)
    pub points: f32,
    /// Конец активного окна (абсолютное время SimClock) или None
    pub until: Option<f64>,
}

impl StaggerState {
    pub fn is_staggered(&self, now: f64) -> bool {
        self.until.is_some_and(|t| t > now)
    }
}

/// Событие: stagger threshold пробит, окно открыто
#[derive(Event, Debug, Clone)]
pub struct StaggerTriggered {
    pub id: u64,
    pub position: Vec3,
}

/// Порог срабатывания stagger: maxHp·0.25 + defense·0.5
///
/// Defense здесь — базовый стат (buffs не двигают порог).
pub fn stagger_threshold(max_hp: f32, defense: f32) -> f32 {
    max_hp * 0.25 + defense * 0.5
}

/// Система: нормализация истёкших stagger окон
///
/// Первая в combat-цепочке: к моменту apply_damage `until` — либо None,
/// либо момент в будущем.
pub fn expire_stagger_windows(clock: Res<SimClock>, mut query: Query<&mut StaggerState>) {
    let now = clock.now();

    for mut stagger in query.iter_mut() {
        if stagger.until.is_some_and(|t| t <= now) {
            stagger.until = None;
        }
    }
}

/// Система: спад stagger points (независимо от damage событий)
///
/// points = max(0, points − 15·delta). После trigger points уже 0,
/// так что спад никогда не конфликтует с открытым окном.
pub fn decay_stagger_points(
    clock: Res<SimClock>,
    mut query: Query<&mut StaggerState, Without<Dead>>,
) {
    let delta = clock.delta;

    for mut stagger in query.iter_mut() {
        if stagger.points > 0.0 {
            stagger.points = (stagger.points - STAGGER_DECAY_RATE * delta).max(0.0);
        }
    }
}
