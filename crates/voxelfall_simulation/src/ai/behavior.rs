//! Behavior selector + per-mode логика
//!
//! Конечный автомат врага в явных tagged-вариантах (никаких nullable
//! полей "target есть/нет"):
//! Idle / Patrolling / Waiting / Chasing / Fleeing / Attacking / Staggered

use bevy::prelude::*;
use rand::Rng;

use crate::combat::damage::{DamageRequest, Dead};
use crate::combat::{attack_damage, LastAttack, StaggerState};
use crate::components::{
    Actor, ActorKind, CombatStats, Health, MoveIntent, Player, SkillBook, SpawnOrigin,
};
use crate::effects::{ActiveEffects, EffectKind, IMPACT_BURST_DURATION, SKILL_TRAVEL_DURATION};
use crate::registry::EntityRegistry;
use crate::terrain::{height, Biome};
use crate::{DeterministicRng, SimClock};

/// Порог hp для бегства (доля от max)
pub const FLEE_HP_RATIO: f32 = 0.3;
/// Дистанция, в пределах которой раненый враг бежит
pub const FLEE_RANGE: f32 = 20.0;
/// Нижняя граница chase-полосы (исключительно)
pub const CHASE_MIN_RANGE: f32 = 10.0;
/// Верхняя граница chase-полосы (исключительно)
pub const CHASE_MAX_RANGE: f32 = 45.0;
/// Дистанция атаки (включительно)
pub const ATTACK_RANGE: f32 = 10.0;

/// Множители скорости по режимам
pub const FLEE_SPEED: f32 = 1.4;
pub const CHASE_SPEED: f32 = 1.1;
pub const ATTACK_APPROACH_SPEED: f32 = 0.3;
pub const PATROL_SPEED: f32 = 0.5;

/// Радиус блуждания вокруг точки спавна
pub const PATROL_RADIUS: f32 = 25.0;
/// Дистанция "дошёл до patrol-цели"
pub const PATROL_ARRIVE_DISTANCE: f32 = 1.5;
/// Вероятность выбрать новую точку (иначе — ждать)
pub const PATROL_MOVE_CHANCE: f64 = 0.7;
/// Диапазон ожидания [min, max) секунд
pub const PATROL_WAIT_MIN: f32 = 2.0;
pub const PATROL_WAIT_MAX: f32 = 5.0;

/// Fallback-цвет атаки врага без скиллов
const ENEMY_ATTACK_COLOR: &str = "#ff5533";

/// Состояние врага (эксклюзивные tagged-варианты)
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub enum BehaviorState {
    /// Нечего делать — следующий patrol-тик выберет точку или ожидание
    Idle,
    /// Идём к точке в patrol-радиусе
    Patrolling { target: Vec3 },
    /// Стоим на месте, таймер убывает
    Waiting { remaining: f32 },
    /// Преследуем игрока
    Chasing,
    /// Убегаем от игрока
    Fleeing,
    /// В радиусе атаки (медленное сближение + удары по cooldown)
    Attacking,
    /// Stagger-lock: решения подавлены, только анимация
    Staggered,
}

impl Default for BehaviorState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Режим, выбранный селектором на этот тик
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorMode {
    Staggered,
    Flee,
    Chase,
    Attack,
    Patrol,
}

/// Приоритетный выбор режима (первое совпадение побеждает)
///
/// Граничные дистанции (ровно 10, ровно 45) уходят в первую проверенную
/// ветку — порядок проверок и есть tie-break.
pub fn select_mode(staggered: bool, hp_ratio: f32, distance_to_player: f32) -> BehaviorMode {
    if staggered {
        BehaviorMode::Staggered
    } else if hp_ratio < FLEE_HP_RATIO && distance_to_player < FLEE_RANGE {
        BehaviorMode::Flee
    } else if distance_to_player > CHASE_MIN_RANGE && distance_to_player < CHASE_MAX_RANGE {
        BehaviorMode::Chase
    } else if distance_to_player <= ATTACK_RANGE {
        BehaviorMode::Attack
    } else {
        BehaviorMode::Patrol
    }
}

/// Система: AI решение для каждого живого врага (в registry порядке)
pub fn ai_decide(
    registry: Res<EntityRegistry>,
    clock: Res<SimClock>,
    mut rng: ResMut<DeterministicRng>,
    mut effects: ResMut<ActiveEffects>,
    players: Query<(&Actor, &Transform), (With<Player>, Without<Dead>)>,
    mut enemies: Query<
        (
            &Actor,
            &Transform,
            &Health,
            &CombatStats,
            &StaggerState,
            &SpawnOrigin,
            &SkillBook,
            &mut BehaviorState,
            &mut MoveIntent,
            &mut LastAttack,
        ),
        (Without<Player>, Without<Dead>),
    >,
    mut damage_events: EventWriter<DamageRequest>,
    mut cast_events: EventWriter<crate::combat::SkillCast>,
) {
    let now = clock.now();
    let delta = clock.delta;

    // Игрок может отсутствовать (мир без player) — враги тогда только патрулируют
    let player = registry
        .player_entity()
        .and_then(|entity| players.get(entity).ok())
        .map(|(actor, transform)| (actor.id, transform.translation));

    let ids: Vec<u64> = registry.ids().collect();

    for id in ids {
        let Some(entity) = registry.entity(id) else {
            continue;
        };
        let Ok((
            actor,
            transform,
            health,
            stats,
            stagger,
            origin,
            skills,
            mut state,
            mut intent,
            mut last_attack,
        )) = enemies.get_mut(entity)
        else {
            continue;
        };
        if actor.kind != ActorKind::Enemy {
            continue;
        }

        let position = transform.translation;
        let (distance, player_info) = match player {
            Some((player_id, player_pos)) => (position.distance(player_pos), Some((player_id, player_pos))),
            None => (f32::INFINITY, None),
        };

        match select_mode(stagger.is_staggered(now), health.ratio(), distance) {
            BehaviorMode::Staggered => {
                // Решения подавлены; качание/звёзды — у рендерера
                *state = BehaviorState::Staggered;
                intent.direction = Vec3::ZERO;
            }

            BehaviorMode::Flee => {
                // Конечная дистанция гарантирует наличие игрока
                let Some((_, player_pos)) = player_info else {
                    continue;
                };
                *state = BehaviorState::Fleeing;
                intent.direction = horizontal_direction(player_pos, position);
                intent.speed_multiplier = FLEE_SPEED;
            }

            BehaviorMode::Chase => {
                let Some((_, player_pos)) = player_info else {
                    continue;
                };
                *state = BehaviorState::Chasing;
                intent.direction = horizontal_direction(position, player_pos);
                intent.speed_multiplier = CHASE_SPEED;
            }

            BehaviorMode::Attack => {
                let Some((player_id, player_pos)) = player_info else {
                    continue;
                };
                *state = BehaviorState::Attacking;
                intent.direction = horizontal_direction(position, player_pos);
                intent.speed_multiplier = ATTACK_APPROACH_SPEED;

                if last_attack.ready(now) {
                    // Timestamp обновляется независимо от melee range check
                    last_attack.mark(now);

                    if let Some(raw) = attack_damage(stats.power, stats.ranged, distance) {
                        damage_events.write(DamageRequest {
                            target: player_id,
                            raw,
                        });

                        let color = skills
                            .skills
                            .first()
                            .map(|s| s.color.clone())
                            .unwrap_or_else(|| ENEMY_ATTACK_COLOR.to_string());

                        if stats.ranged {
                            effects.spawn(
                                EffectKind::SkillTravel {
                                    from: position,
                                    to: player_pos,
                                    color: color.clone(),
                                },
                                now,
                                SKILL_TRAVEL_DURATION,
                            );

                            if let Some(skill) = skills.skills.first() {
                                cast_events.write(crate::combat::SkillCast {
                                    caster: actor.id,
                                    skill: skill.name.clone(),
                                    kind: skill.kind,
                                    color,
                                    origin: position,
                                    target: player_pos,
                                });
                            }
                        } else {
                            effects.spawn(
                                EffectKind::ImpactBurst {
                                    at: player_pos,
                                    color,
                                },
                                now,
                                IMPACT_BURST_DURATION,
                            );
                        }
                    }
                }
            }

            BehaviorMode::Patrol => {
                let next = patrol_step(
                    &state,
                    position,
                    origin.position,
                    delta,
                    &mut rng,
                    &mut intent,
                );
                *state = next;
            }
        }
    }
}

/// Один patrol-шаг: ожидание / движение к цели / выбор новой цели
fn patrol_step(
    state: &BehaviorState,
    position: Vec3,
    spawn: Vec3,
    delta: f32,
    rng: &mut DeterministicRng,
    intent: &mut MoveIntent,
) -> BehaviorState {
    match *state {
        BehaviorState::Waiting { remaining } => {
            intent.direction = Vec3::ZERO;

            let remaining = remaining - delta;
            if remaining <= 0.0 {
                BehaviorState::Idle
            } else {
                BehaviorState::Waiting { remaining }
            }
        }

        BehaviorState::Patrolling { target } => {
            let flat_distance = Vec3::new(target.x - position.x, 0.0, target.z - position.z).length();

            if flat_distance <= PATROL_ARRIVE_DISTANCE {
                pick_patrol_action(spawn, rng, intent)
            } else {
                intent.direction = horizontal_direction(position, target);
                intent.speed_multiplier = PATROL_SPEED;
                BehaviorState::Patrolling { target }
            }
        }

        // Idle или возврат из combat-режима: цели нет
        _ => pick_patrol_action(spawn, rng, intent),
    }
}

/// 70% — новая случайная точка в patrol-радиусе, 30% — ожидание [2, 5)с
fn pick_patrol_action(
    spawn: Vec3,
    rng: &mut DeterministicRng,
    intent: &mut MoveIntent,
) -> BehaviorState {
    intent.direction = Vec3::ZERO;

    if rng.rng.gen_bool(PATROL_MOVE_CHANCE) {
        let angle = rng.rng.gen_range(0.0..std::f32::consts::TAU);
        let radius = rng.rng.gen_range(0.0..PATROL_RADIUS);

        let x = spawn.x + angle.sin() * radius;
        let z = spawn.z + angle.cos() * radius;
        let y = height(x, z, Biome::Hostile);

        BehaviorState::Patrolling {
            target: Vec3::new(x, y, z),
        }
    } else {
        BehaviorState::Waiting {
            remaining: rng.rng.gen_range(PATROL_WAIT_MIN..PATROL_WAIT_MAX),
        }
    }
}

/// Нормализованное горизонтальное направление from → to
fn horizontal_direction(from: Vec3, to: Vec3) -> Vec3 {
    Vec3::new(to.x - from.x, 0.0, to.z - from.z).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_stagger_wins() {
        // Stagger перекрывает всё, даже низкий hp вплотную к игроку
        assert_eq!(select_mode(true, 0.1, 2.0), BehaviorMode::Staggered);
    }

    #[test]
    fn test_priority_flee_needs_both_conditions() {
        assert_eq!(select_mode(false, 0.2, 15.0), BehaviorMode::Flee);
        // Низкий hp, но далеко — не бежим
        assert_eq!(select_mode(false, 0.2, 25.0), BehaviorMode::Chase);
        // Близко, но hp в норме
        assert_eq!(select_mode(false, 0.5, 15.0), BehaviorMode::Chase);
    }

    #[test]
    fn test_chase_band() {
        assert_eq!(select_mode(false, 1.0, 10.5), BehaviorMode::Chase);
        assert_eq!(select_mode(false, 1.0, 44.9), BehaviorMode::Chase);
    }

    #[test]
    fn test_boundary_ties_follow_check_order() {
        // Ровно 10: chase-полоса открыта строго (10 < d), уходит в attack
        assert_eq!(select_mode(false, 1.0, 10.0), BehaviorMode::Attack);
        // Ровно 45: вне chase-полосы — patrol
        assert_eq!(select_mode(false, 1.0, 45.0), BehaviorMode::Patrol);
    }

    #[test]
    fn test_no_player_patrols() {
        assert_eq!(select_mode(false, 0.1, f32::INFINITY), BehaviorMode::Patrol);
    }

    #[test]
    fn test_patrol_target_within_radius() {
        let mut rng = DeterministicRng::new(7);
        let mut intent = MoveIntent::default();
        let spawn = Vec3::new(100.0, 0.0, -40.0);

        // Прогоняем много выборов: каждая цель в patrol-радиусе от спавна
        for _ in 0..200 {
            if let BehaviorState::Patrolling { target } =
                pick_patrol_action(spawn, &mut rng, &mut intent)
            {
                let flat = Vec3::new(target.x - spawn.x, 0.0, target.z - spawn.z).length();
                assert!(flat <= PATROL_RADIUS + 1e-3);
                // Высота цели — terrain height (hostile)
                assert_eq!(target.y, height(target.x, target.z, Biome::Hostile));
            }
        }
    }

    #[test]
    fn test_wait_range() {
        let mut rng = DeterministicRng::new(11);
        let mut intent = MoveIntent::default();

        for _ in 0..200 {
            if let BehaviorState::Waiting { remaining } =
                pick_patrol_action(Vec3::ZERO, &mut rng, &mut intent)
            {
                assert!((PATROL_WAIT_MIN..PATROL_WAIT_MAX).contains(&remaining));
            }
        }
    }

    #[test]
    fn test_waiting_counts_down() {
        let mut rng = DeterministicRng::new(3);
        let mut intent = MoveIntent {
            direction: Vec3::X,
            speed_multiplier: 1.0,
        };

        let state = BehaviorState::Waiting { remaining: 1.0 };
        let next = patrol_step(&state, Vec3::ZERO, Vec3::ZERO, 0.4, &mut rng, &mut intent);

        assert_eq!(intent.direction, Vec3::ZERO); // Во время ожидания стоим
        match next {
            BehaviorState::Waiting { remaining } => assert!((remaining - 0.6).abs() < 1e-6),
            other => panic!("expected Waiting, got {:?}", other),
        }
    }

    #[test]
    fn test_patrol_moves_toward_target() {
        let mut rng = DeterministicRng::new(3);
        let mut intent = MoveIntent::default();

        let target = Vec3::new(10.0, 0.0, 0.0);
        let state = BehaviorState::Patrolling { target };
        let next = patrol_step(&state, Vec3::ZERO, Vec3::ZERO, 0.016, &mut rng, &mut intent);

        assert_eq!(next, BehaviorState::Patrolling { target });
        assert!((intent.direction - Vec3::X).length() < 1e-5);
        assert_eq!(intent.speed_multiplier, PATROL_SPEED);
    }
}
