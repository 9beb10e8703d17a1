//! Movement компоненты: скорость, intent от AI, ориентация, spawn origin

use bevy::prelude::*;

/// Текущая скорость актора (м/с, мировые координаты)
///
/// Игрок: интегрируется через lerp к target velocity (см. movement::player).
/// Враги: не используют velocity — их позиция интегрируется напрямую из MoveIntent.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Velocity {
    pub linear: Vec3,
}

/// Желаемое движение врага на этот тик (пишется AI, читается интегратором)
///
/// `speed_multiplier` — множитель базовой скорости текущего behavior mode
/// (flee 1.4, chase 1.1, attack 0.3, patrol 0.5).
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct MoveIntent {
    /// Нормализованное горизонтальное направление (ZERO = стоим)
    pub direction: Vec3,
    pub speed_multiplier: f32,
}

impl Default for MoveIntent {
    fn default() -> Self {
        Self {
            direction: Vec3::ZERO,
            speed_multiplier: 1.0,
        }
    }
}

/// Ориентация актора (yaw в радианах вокруг Y)
///
/// Скалярный yaw — authoritative значение; Transform.rotation синхронизируется
/// из него интеграторами.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Heading {
    pub yaw: f32,
}

/// Точка спавна актора (центр patrol-радиуса)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct SpawnOrigin {
    pub position: Vec3,
}
