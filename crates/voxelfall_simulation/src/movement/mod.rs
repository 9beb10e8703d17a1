//! Movement integration
//!
//! Игрок: input → lerp velocity → позиция; враги: MoveIntent → позиция.
//! Обе ветки прижимаются к terrain по высоте и доворачивают yaw к
//! направлению движения. Фиксированные ease-факторы (0.2 / 0.15 / 0.1)
//! применяются за тик, не за секунду — намеренно не нормализованы по
//! времени, чтобы сохранить наблюдаемое поведение.

use bevy::prelude::*;

use crate::SimSet;

pub mod enemy;
pub mod player;

pub use enemy::integrate_enemies;
pub use player::integrate_player;

/// Ease-фактор прижатия к terrain (за тик)
pub const HEIGHT_EASE: f32 = 0.2;

/// Movement Plugin
pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            crate::SimulationStep,
            integrate_player.in_set(SimSet::PlayerMove),
        );
        app.add_systems(
            crate::SimulationStep,
            integrate_enemies.in_set(SimSet::EnemyMove),
        );
    }
}

/// Доворот yaw к target по кратчайшей дуге с фактором за тик
pub fn ease_angle(current: f32, target: f32, factor: f32) -> f32 {
    use std::f32::consts::{PI, TAU};

    // Разница в (-PI, PI]
    let mut diff = (target - current) % TAU;
    if diff > PI {
        diff -= TAU;
    } else if diff < -PI {
        diff += TAU;
    }

    current + diff * factor
}

/// Yaw направления движения (соглашение: facing = (sin yaw, 0, cos yaw))
pub fn heading_of(direction: Vec3) -> f32 {
    direction.x.atan2(direction.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_ease_angle_direct() {
        let eased = ease_angle(0.0, 1.0, 0.5);
        assert!((eased - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_ease_angle_shortest_path_across_pi() {
        // От +170° к −170°: короткий путь через 180°, не через 0
        let current = 170.0_f32.to_radians();
        let target = -170.0_f32.to_radians();

        let eased = ease_angle(current, target, 0.5);
        // Двигаемся в сторону увеличения угла (через PI), не назад
        assert!(eased > current);
    }

    #[test]
    fn test_ease_angle_converges() {
        let mut yaw = 0.0;
        let target = PI / 2.0;

        for _ in 0..100 {
            yaw = ease_angle(yaw, target, 0.15);
        }
        assert!((yaw - target).abs() < 1e-3);
    }

    #[test]
    fn test_heading_convention() {
        // +Z — yaw 0, +X — yaw 90°
        assert!((heading_of(Vec3::Z) - 0.0).abs() < 1e-6);
        assert!((heading_of(Vec3::X) - PI / 2.0).abs() < 1e-6);
    }
}
