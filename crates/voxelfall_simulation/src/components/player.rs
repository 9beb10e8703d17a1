//! Player marker + input state

use bevy::prelude::*;

/// Маркер: этот актор — игрок (singleton)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Player;

/// Input state игрока (заполняется хостом через Simulation::set_input_direction)
///
/// Ось: x = strafe (влево/вправо), y = forward (вперёд/назад), оба в [-1, 1].
/// Направление интерпретируется относительно camera_yaw — камерой владеет
/// рендерер, сюда приходит только её yaw.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct PlayerInput {
    pub axis: Vec2,
    pub camera_yaw: f32,
}
