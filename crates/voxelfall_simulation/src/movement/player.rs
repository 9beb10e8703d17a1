//! Интеграция движения игрока
//!
//! Input — дискретная пара осей (forward/strafe) относительно yaw камеры.
//! Velocity подтягивается к target через lerp (acceleration при движении,
//! friction при простое), позиция интегрируется, высота прижимается к
//! Safe-рельефу, yaw доворачивается к heading скорости.

use bevy::prelude::*;

use crate::combat::damage::Dead;
use crate::components::{
    ActiveBuffs, BuffKind, CombatStats, Heading, Player, PlayerInput, Velocity,
};
use crate::movement::{ease_angle, heading_of, HEIGHT_EASE};
use crate::terrain::{height, Biome};
use crate::SimClock;

/// Скорость подтягивания velocity к target (делится на move_speed)
pub const ACCELERATION: f32 = 40.0;
/// Скорость затухания velocity при отсутствии input (за секунду)
pub const FRICTION: f32 = 12.0;
/// Глобальный множитель скорости игрока
pub const SPEED_SCALE: f32 = 2.0;
/// Ease-фактор yaw (за тик)
pub const YAW_EASE: f32 = 0.15;
/// Ниже этой скорости yaw не трогаем
pub const YAW_MIN_SPEED: f32 = 0.5;

/// Система: интеграция игрока (input → velocity → позиция → yaw)
pub fn integrate_player(
    clock: Res<SimClock>,
    input: Res<PlayerInput>,
    mut players: Query<
        (
            &mut Transform,
            &mut Velocity,
            &mut Heading,
            &CombatStats,
            &ActiveBuffs,
        ),
        (With<Player>, Without<Dead>),
    >,
) {
    let delta = clock.delta;
    let now = clock.now();

    for (mut transform, mut velocity, mut heading, stats, buffs) in players.iter_mut() {
        // Желаемое направление относительно камеры
        let direction = camera_relative_direction(input.axis, input.camera_yaw);

        let move_speed = (stats.speed + buffs.sum(BuffKind::Speed, now)).max(0.1);
        let target = direction * move_speed * SPEED_SCALE;

        if direction.length_squared() > 0.0 {
            let t = (ACCELERATION / move_speed * delta).min(1.0);
            velocity.linear = velocity.linear.lerp(target, t);
        } else {
            let t = (FRICTION * delta).min(1.0);
            velocity.linear = velocity.linear.lerp(Vec3::ZERO, t);
        }

        transform.translation.x += velocity.linear.x * delta;
        transform.translation.z += velocity.linear.z * delta;

        // Вертикаль: ease к Safe-рельефу (фактор за тик)
        let ground = height(transform.translation.x, transform.translation.z, Biome::Safe);
        transform.translation.y += (ground - transform.translation.y) * HEIGHT_EASE;

        // Yaw: ease к heading скорости, только при заметном движении
        let speed = velocity.linear.length();
        if speed > YAW_MIN_SPEED {
            heading.yaw = ease_angle(heading.yaw, heading_of(velocity.linear), YAW_EASE);
            transform.rotation = Quat::from_rotation_y(heading.yaw);
        }
    }
}

/// Unit-направление из пары осей и yaw камеры
///
/// axis.y — вперёд/назад вдоль взгляда камеры, axis.x — strafe. Нулевой
/// input даёт нулевой вектор (не NaN).
pub fn camera_relative_direction(axis: Vec2, camera_yaw: f32) -> Vec3 {
    if axis.length_squared() < 1e-6 {
        return Vec3::ZERO;
    }

    let forward = Vec3::new(camera_yaw.sin(), 0.0, camera_yaw.cos());
    let right = Vec3::new(camera_yaw.cos(), 0.0, -camera_yaw.sin());

    (forward * axis.y + right * axis.x).normalize_or_zero()
}
