//! Базовые компоненты акторов: Actor, Health, CombatStats, SkillBook

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Категория актора
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorKind {
    Player,
    Npc,
    Enemy,
}

/// Актор (игрок, NPC, враг) — базовый компонент живых существ
///
/// Автоматически добавляет стандартный набор компонентов через Required Components.
/// `id` — stable ID для registry/saves/событий (не Bevy Entity).
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(
    Health,
    crate::components::CombatStats,
    crate::components::SkillBook,
    crate::components::ActiveBuffs,
    crate::combat::StaggerState,
    crate::combat::LastAttack,
    crate::ai::BehaviorState,
    crate::components::Velocity,
    crate::components::MoveIntent,
    crate::components::Heading,
    crate::components::SpawnOrigin,
    crate::components::VoxelModel
)]
pub struct Actor {
    /// Stable ID (registry, события, персистенс)
    pub id: u64,
    /// Категория (Player / Npc / Enemy)
    pub kind: ActorKind,
}

impl Default for Actor {
    fn default() -> Self {
        Self {
            id: 0,
            kind: ActorKind::Npc,
        }
    }
}

/// Имя актора из генератора (логи, UI)
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct ActorName {
    pub name: String,
}

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn ratio(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }

    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount).min(self.max);
    }
}

/// Боевые характеристики актора
///
/// `ranged` вычисляется один раз при спавне из class-строки генератора
/// (mage/archer) — в горячем combat-пути строковых сравнений нет.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct CombatStats {
    /// Базовая скорость движения (м/с)
    pub speed: f32,
    /// Сила атак
    pub power: f32,
    /// Защита (mitigation + вклад в stagger threshold)
    pub defense: f32,
    /// Класс из генератора ("warrior", "mage", ...) — только для UI/логов
    pub class_name: String,
    /// Дистанционный класс (flag, выставлен при спавне)
    pub ranged: bool,
}

impl Default for CombatStats {
    fn default() -> Self {
        Self {
            speed: 4.0,
            power: 10.0,
            defense: 5.0,
            class_name: String::new(),
            ranged: false,
        }
    }
}

/// Тип скилла
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillKind {
    Basic,
    Special,
    Ultimate,
}

/// Скилл (из генератора контента)
#[derive(Debug, Clone, Reflect, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub kind: SkillKind,
    pub damage: f32,
    /// Цвет визуального эффекта ("#rrggbb")
    pub color: String,
}

/// Набор скиллов актора (у врагов обычно пуст, у игрока — из генератора)
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct SkillBook {
    pub skills: Vec<Skill>,
}
