//! AI decision-making
//!
//! Приоритетный выбор behavior mode раз за тик для каждого живого врага:
//! stagger-lock > flee > chase > attack > patrol (первое совпадение, без
//! fallthrough). Решение пишется в BehaviorState + MoveIntent; интеграция
//! позиции — в movement.

use bevy::prelude::*;

use crate::SimSet;

pub mod behavior;

// Re-export основных типов
pub use behavior::{ai_decide, select_mode, BehaviorMode, BehaviorState};

/// AI Plugin
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            crate::SimulationStep,
            ai_decide.in_set(SimSet::AiDecide),
        );
    }
}
