//! Attack timing + разрешение урона атаки врага

use bevy::prelude::*;

/// Минимальный интервал между атаками врага (секунды)
pub const ATTACK_COOLDOWN: f64 = 1.5;
/// Дистанция melee удара
pub const MELEE_RANGE: f32 = 6.0;
/// Доля power в ranged атаке
pub const RANGED_POWER_SCALE: f32 = 0.5;
/// Доля power в melee атаке
pub const MELEE_POWER_SCALE: f32 = 0.8;

/// Момент последней атаки (None = ещё не атаковал)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct LastAttack {
    pub at: Option<f64>,
}

impl LastAttack {
    /// Cooldown прошёл (или атак ещё не было)
    pub fn ready(&self, now: f64) -> bool {
        self.at.map_or(true, |t| now - t > ATTACK_COOLDOWN)
    }

    pub fn mark(&mut self, now: f64) {
        self.at = Some(now);
    }
}

/// Урон атаки врага по игроку
///
/// Ranged классы бьют с любой дистанции (power·0.5); melee — только в
/// пределах MELEE_RANGE (power·0.8), иначе удар не состоялся (None).
pub fn attack_damage(power: f32, ranged: bool, distance: f32) -> Option<f32> {
    if ranged {
        Some(power * RANGED_POWER_SCALE)
    } else if distance <= MELEE_RANGE {
        Some(power * MELEE_POWER_SCALE)
    } else {
        None
    }
}
