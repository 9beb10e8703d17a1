//! Damage resolution
//!
//! Обрабатывает DamageRequest события (внешний damage_entity + атаки AI +
//! скиллы игрока) и применяет урон с модификаторами:
//! - Stagger multiplier: staggered цель получает 1.5× урона
//! - Defense mitigation: −defense × 0.2 (база + defense buffs)
//! - Минимальный урон 1.0 — любой удар что-то снимает

use bevy::prelude::*;

use crate::combat::stagger::{stagger_threshold, StaggerState, StaggerTriggered, STAGGER_DURATION};
use crate::components::{ActiveBuffs, Actor, ActorKind, BuffKind, CombatStats, Health};
use crate::registry::EntityRegistry;
use crate::{log_info, SimClock};

/// Множитель урона по staggered цели
pub const STAGGER_DAMAGE_MULTIPLIER: f32 = 1.5;
/// Вклад defense в mitigation
pub const DEFENSE_MITIGATION: f32 = 0.2;
/// Нижняя граница эффективного урона
pub const MIN_DAMAGE: f32 = 1.0;

/// Событие-запрос: нанести `raw` урона актору `target`
///
/// Единственный вход combat resolver: внешний API, AI атаки и скиллы
/// игрока сходятся сюда. Обрабатывается в порядке записи.
#[derive(Event, Debug, Clone)]
pub struct DamageRequest {
    pub target: u64,
    pub raw: f32,
}

/// Событие: урон нанесён (для UI/звука/эффектов)
#[derive(Event, Debug, Clone)]
pub struct DamageDealt {
    pub target: u64,
    pub amount: f32,
    /// Цель была staggered в момент удара
    pub staggered: bool,
    pub remaining_hp: f32,
}

/// Событие: актор умер (hp достиг 0)
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub id: u64,
    pub kind: ActorKind,
    /// Последняя позиция (loot spawn, эффекты)
    pub position: Vec3,
}

/// Компонент-маркер: актор мёртв
///
/// Ставится в момент смерти, монотонен (воскрешения нет). Враги
/// деспавнятся в конце тика; игрок остаётся с маркером (game over — UI).
#[derive(Component, Debug, Default)]
pub struct Dead;

/// Эффективный урон с учётом stagger multiplier и defense mitigation
pub fn effective_damage(raw: f32, defense: f32, staggered: bool) -> f32 {
    let multiplier = if staggered {
        STAGGER_DAMAGE_MULTIPLIER
    } else {
        1.0
    };

    (raw * multiplier - defense * DEFENSE_MITIGATION).max(MIN_DAMAGE)
}

/// Система: apply damage от DamageRequest событий
///
/// 1. Lookup цели через registry (unknown/dead → no-op)
/// 2. Mitigation формула → hp
/// 3. Enemy не в stagger: аккумуляция stagger points, проверка threshold
/// 4. hp ≤ 0 → Dead маркер + EntityDied (despawn — в конце тика)
pub fn apply_damage(
    mut requests: EventReader<DamageRequest>,
    mut commands: Commands,
    registry: Res<EntityRegistry>,
    clock: Res<SimClock>,
    mut targets: Query<
        (
            &Actor,
            &Transform,
            &mut Health,
            &CombatStats,
            &ActiveBuffs,
            &mut StaggerState,
        ),
        Without<Dead>,
    >,
    mut dealt_events: EventWriter<DamageDealt>,
    mut stagger_events: EventWriter<StaggerTriggered>,
    mut died_events: EventWriter<EntityDied>,
) {
    let now = clock.now();

    for request in requests.read() {
        // Unknown target — no-op (InvalidOperation, не ошибка)
        let Some(entity) = registry.entity(request.target) else {
            continue;
        };

        // Dead (маркер) отфильтрован query; умершие в этом же тике — по hp
        let Ok((actor, transform, mut health, stats, buffs, mut stagger)) =
            targets.get_mut(entity)
        else {
            continue;
        };
        if !health.is_alive() {
            continue;
        }

        let was_staggered = stagger.is_staggered(now);
        let defense = stats.defense + buffs.sum(BuffKind::Defense, now);
        let amount = effective_damage(request.raw, defense, was_staggered);

        health.take_damage(amount);

        // Stagger аккумулируется только у врагов и только вне stagger окна
        if actor.kind == ActorKind::Enemy && !was_staggered {
            stagger.points += amount;

            let threshold = stagger_threshold(health.max, stats.defense);
            if stagger.points >= threshold {
                stagger.until = Some(now + STAGGER_DURATION);
                stagger.points = 0.0;

                stagger_events.write(StaggerTriggered {
                    id: actor.id,
                    position: transform.translation,
                });
            }
        }

        dealt_events.write(DamageDealt {
            target: actor.id,
            amount,
            staggered: was_staggered,
            remaining_hp: health.current,
        });

        if !health.is_alive() {
            commands.entity(entity).insert(Dead);

            died_events.write(EntityDied {
                id: actor.id,
                kind: actor.kind,
                position: transform.translation,
            });

            log_info(&format!("Actor {} died", actor.id));
        }
    }
}

/// Система: despawn умерших в конце тика
///
/// Убирает врагов/NPC из registry и мира после того, как loot roll и
/// события этого тика отработали. Игрок остаётся (corpse + game over UI).
pub fn despawn_dead(
    mut commands: Commands,
    mut died_events: EventReader<EntityDied>,
    mut registry: ResMut<EntityRegistry>,
) {
    for event in died_events.read() {
        if event.kind == ActorKind::Player {
            continue;
        }

        if let Some(entity) = registry.entity(event.id) {
            registry.unregister(event.id);

            if let Ok(mut entity_commands) = commands.get_entity(entity) {
                entity_commands.despawn();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_damage_mitigation() {
        // raw 10, defense 20, не staggered: max(1, 10 − 4) = 6
        assert_eq!(effective_damage(10.0, 20.0, false), 6.0);
    }

    #[test]
    fn test_effective_damage_staggered() {
        // Тот же удар по staggered цели: max(1, 15 − 4) = 11
        assert_eq!(effective_damage(10.0, 20.0, true), 11.0);
    }

    #[test]
    fn test_effective_damage_floor() {
        // Высокая защита не обнуляет урон
        assert_eq!(effective_damage(2.0, 100.0, false), 1.0);
    }

    #[test]
    fn test_effective_damage_no_defense() {
        assert_eq!(effective_damage(10.0, 0.0, false), 10.0);
        assert_eq!(effective_damage(10.0, 0.0, true), 15.0);
    }
}
