//! Интеграция движения врагов
//!
//! Позиция интегрируется напрямую из MoveIntent (без velocity-инерции):
//! position += direction × base_speed × mode_multiplier × delta.
//! Высота прижимается к Hostile-рельефу, yaw доворачивается медленнее
//! игрока (фактор 0.1 за тик).

use bevy::prelude::*;

use crate::combat::damage::Dead;
use crate::components::{Actor, ActorKind, CombatStats, Heading, MoveIntent, Player};
use crate::movement::{ease_angle, heading_of, HEIGHT_EASE};
use crate::terrain::{height, Biome};
use crate::SimClock;

/// Ease-фактор yaw врага (за тик)
pub const ENEMY_YAW_EASE: f32 = 0.1;

/// Система: интеграция позиций врагов из MoveIntent
pub fn integrate_enemies(
    clock: Res<SimClock>,
    mut enemies: Query<
        (
            &Actor,
            &CombatStats,
            &MoveIntent,
            &mut Transform,
            &mut Heading,
        ),
        (Without<Player>, Without<Dead>),
    >,
) {
    let delta = clock.delta;

    for (actor, stats, intent, mut transform, mut heading) in enemies.iter_mut() {
        if actor.kind != ActorKind::Enemy {
            continue;
        }

        if intent.direction.length_squared() > 0.0 {
            let step = intent.direction * stats.speed * intent.speed_multiplier * delta;
            transform.translation.x += step.x;
            transform.translation.z += step.z;

            heading.yaw = ease_angle(heading.yaw, heading_of(intent.direction), ENEMY_YAW_EASE);
            transform.rotation = Quat::from_rotation_y(heading.yaw);
        }

        // Вертикаль: ease к Hostile-рельефу (и стоя на месте тоже)
        let ground = height(
            transform.translation.x,
            transform.translation.z,
            Biome::Hostile,
        );
        transform.translation.y += (ground - transform.translation.y) * HEIGHT_EASE;
    }
}
