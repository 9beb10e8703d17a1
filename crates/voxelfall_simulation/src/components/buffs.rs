//! Временные модификаторы статов (buffs)
//!
//! Buff — аддитивный модификатор power/speed/defense с абсолютным временем
//! окончания. BuffTracker-проход каждый тик удаляет истёкшие записи;
//! после прохода в списке нет buff с ends_at ≤ now.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::SimClock;

/// Вид модификатора
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuffKind {
    Power,
    Speed,
    Defense,
}

/// Аддитивный модификатор стата
#[derive(Debug, Clone, Copy, Reflect, Serialize, Deserialize)]
pub struct Buff {
    pub kind: BuffKind,
    pub amount: f32,
    /// Абсолютный момент окончания (секунды SimClock)
    pub ends_at: f64,
}

/// Активные buffs актора
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct ActiveBuffs {
    pub buffs: Vec<Buff>,
}

impl ActiveBuffs {
    pub fn push(&mut self, buff: Buff) {
        self.buffs.push(buff);
    }

    /// Сумма активных модификаторов данного вида
    pub fn sum(&self, kind: BuffKind, now: f64) -> f32 {
        self.buffs
            .iter()
            .filter(|b| b.kind == kind && b.ends_at > now)
            .map(|b| b.amount)
            .sum()
    }

    /// Удалить истёкшие записи (ends_at ≤ now)
    pub fn prune(&mut self, now: f64) {
        self.buffs.retain(|b| b.ends_at > now);
    }
}

/// Система: expiry-проход по всем buff-спискам
pub fn expire_buffs(clock: Res<SimClock>, mut query: Query<&mut ActiveBuffs>) {
    let now = clock.now();

    for mut buffs in query.iter_mut() {
        if buffs.buffs.iter().any(|b| b.ends_at <= now) {
            buffs.prune(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buff(kind: BuffKind, amount: f32, ends_at: f64) -> Buff {
        Buff {
            kind,
            amount,
            ends_at,
        }
    }

    #[test]
    fn test_sum_by_kind() {
        let mut buffs = ActiveBuffs::default();
        buffs.push(buff(BuffKind::Power, 5.0, 100.0));
        buffs.push(buff(BuffKind::Power, 3.0, 100.0));
        buffs.push(buff(BuffKind::Speed, 2.0, 100.0));

        assert_eq!(buffs.sum(BuffKind::Power, 10.0), 8.0);
        assert_eq!(buffs.sum(BuffKind::Speed, 10.0), 2.0);
        assert_eq!(buffs.sum(BuffKind::Defense, 10.0), 0.0);
    }

    #[test]
    fn test_expired_excluded_from_sum() {
        let mut buffs = ActiveBuffs::default();
        buffs.push(buff(BuffKind::Defense, 4.0, 30.0));

        // За 0.1с до конца — активен, после — нет
        assert_eq!(buffs.sum(BuffKind::Defense, 29.9), 4.0);
        assert_eq!(buffs.sum(BuffKind::Defense, 30.1), 0.0);
    }

    #[test]
    fn test_prune_removes_exactly_expired() {
        let mut buffs = ActiveBuffs::default();
        buffs.push(buff(BuffKind::Power, 5.0, 30.0));
        buffs.push(buff(BuffKind::Speed, 2.0, 60.0));

        buffs.prune(30.0); // ends_at <= now удаляется
        assert_eq!(buffs.buffs.len(), 1);
        assert_eq!(buffs.buffs[0].kind, BuffKind::Speed);
    }
}
