//! Loot система
//!
//! Смерть врага с вероятностью 0.6 роняет один предмет из фиксированного
//! каталога (5 позиций). Дроп висит над землёй с bob/spin анимацией
//! (косметика для рендерера) и подбирается игроком по дистанции.
//! Health лечит с капом, buff-кристаллы вешают 30-секундный Buff,
//! материалы — hook для прогрессии (статов не меняют).

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::damage::{Dead, EntityDied};
use crate::components::{ActiveBuffs, ActorKind, Buff, BuffKind, Health, Player};
use crate::registry::EntityRegistry;
use crate::{log, DeterministicRng, SimClock, SimSet};

/// Вероятность дропа при смерти врага
pub const LOOT_DROP_CHANCE: f64 = 0.6;
/// Радиус подбора
pub const PICKUP_RANGE: f32 = 4.0;
/// Длительность buff от кристалла (секунды)
pub const BUFF_DURATION: f64 = 30.0;
/// Подъём дропа над точкой смерти
const DROP_RAISE: f32 = 1.0;
/// Bob-анимация: частота (рад/с) и амплитуда (метры)
const BOB_FREQUENCY: f64 = 2.0;
const BOB_AMPLITUDE: f32 = 0.3;
/// Скорость вращения дропа (рад/с)
const SPIN_RATE: f32 = 2.0;

/// Категория предмета
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LootKind {
    Health,
    Buff,
    Material,
}

/// Запись каталога / payload дропа
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub struct LootItem {
    pub name: String,
    pub kind: LootKind,
    /// Вид buff для kind = Buff
    pub buff: Option<BuffKind>,
    /// Heal amount / buff amount / количество материала
    pub value: f32,
    /// "#rrggbb" для рендерера
    pub color: String,
}

/// Каталог дропа (фиксированные 5 позиций)
#[derive(Resource, Debug, Clone)]
pub struct LootCatalog {
    pub items: Vec<LootItem>,
}

impl Default for LootCatalog {
    fn default() -> Self {
        let item = |name: &str, kind, buff, value, color: &str| LootItem {
            name: name.to_string(),
            kind,
            buff,
            value,
            color: color.to_string(),
        };

        Self {
            items: vec![
                item("Heart Cube", LootKind::Health, None, 30.0, "#ff4d6d"),
                item(
                    "Power Crystal",
                    LootKind::Buff,
                    Some(BuffKind::Power),
                    5.0,
                    "#ffb703",
                ),
                item(
                    "Swift Crystal",
                    LootKind::Buff,
                    Some(BuffKind::Speed),
                    2.0,
                    "#4cc9f0",
                ),
                item(
                    "Guard Crystal",
                    LootKind::Buff,
                    Some(BuffKind::Defense),
                    5.0,
                    "#80ed99",
                ),
                item("Voxel Shard", LootKind::Material, None, 1.0, "#c0c0c0"),
            ],
        }
    }
}

/// Активный дроп в мире
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct LootDrop {
    pub id: u64,
    pub item: LootItem,
    /// Базовая высота bob-анимации
    pub base_y: f32,
    pub spawned_at: f64,
    /// Накопленный угол вращения (косметика)
    pub spin: f32,
}

impl Default for LootDrop {
    fn default() -> Self {
        Self {
            id: 0,
            item: LootItem {
                name: String::new(),
                kind: LootKind::Material,
                buff: None,
                value: 0.0,
                color: String::new(),
            },
            base_y: 0.0,
            spawned_at: 0.0,
            spin: 0.0,
        }
    }
}

/// Событие: дроп появился
#[derive(Event, Debug, Clone)]
pub struct LootDropped {
    pub id: u64,
    pub item: LootItem,
    pub position: Vec3,
}

/// Событие: дроп подобран игроком
#[derive(Event, Debug, Clone)]
pub struct LootCollected {
    pub id: u64,
    pub item: LootItem,
}

/// Бросок дропа: None с вероятностью 0.4, иначе равномерный выбор из каталога
pub fn roll_drop(rng: &mut impl Rng, catalog: &LootCatalog) -> Option<LootItem> {
    if catalog.items.is_empty() || !rng.gen_bool(LOOT_DROP_CHANCE) {
        return None;
    }

    let index = rng.gen_range(0..catalog.items.len());
    Some(catalog.items[index].clone())
}

/// Система: roll дропа на смерть врага
pub fn spawn_loot_drops(
    mut died_events: EventReader<EntityDied>,
    mut commands: Commands,
    mut rng: ResMut<DeterministicRng>,
    mut registry: ResMut<EntityRegistry>,
    catalog: Res<LootCatalog>,
    clock: Res<SimClock>,
    mut dropped_events: EventWriter<LootDropped>,
) {
    let now = clock.now();

    for event in died_events.read() {
        if event.kind != ActorKind::Enemy {
            continue;
        }

        let Some(item) = roll_drop(&mut rng.rng, &catalog) else {
            continue;
        };

        let position = event.position + Vec3::Y * DROP_RAISE;
        let id = registry.allocate_id();

        commands.spawn((
            LootDrop {
                id,
                item: item.clone(),
                base_y: position.y,
                spawned_at: now,
                spin: 0.0,
            },
            Transform::from_translation(position),
        ));

        dropped_events.write(LootDropped { id, item, position });
    }
}

/// Система: bob/spin анимация дропа (косметика, читается рендерером)
pub fn animate_loot(clock: Res<SimClock>, mut drops: Query<(&mut LootDrop, &mut Transform)>) {
    let now = clock.now();
    let delta = clock.delta;

    for (mut drop, mut transform) in drops.iter_mut() {
        let age = now - drop.spawned_at;
        transform.translation.y = drop.base_y + (age * BOB_FREQUENCY).sin() as f32 * BOB_AMPLITUDE;

        drop.spin += SPIN_RATE * delta;
        transform.rotation = Quat::from_rotation_y(drop.spin);
    }
}

/// Система: подбор по дистанции до игрока
///
/// Эффект зависит от категории; дроп убирается и LootCollected уходит
/// в любом случае (и для материалов тоже).
pub fn collect_loot(
    mut commands: Commands,
    registry: Res<EntityRegistry>,
    clock: Res<SimClock>,
    drops: Query<(Entity, &LootDrop, &Transform)>,
    mut players: Query<
        (&Transform, &mut Health, &mut ActiveBuffs),
        (With<Player>, Without<Dead>, Without<LootDrop>),
    >,
    mut collected_events: EventWriter<LootCollected>,
) {
    let now = clock.now();

    let Some(player_entity) = registry.player_entity() else {
        return;
    };
    let Ok((player_transform, mut health, mut buffs)) = players.get_mut(player_entity) else {
        return;
    };
    let player_position = player_transform.translation;

    for (entity, drop, transform) in drops.iter() {
        if transform.translation.distance(player_position) >= PICKUP_RANGE {
            continue;
        }

        match drop.item.kind {
            LootKind::Health => health.heal(drop.item.value),
            LootKind::Buff => {
                if let Some(kind) = drop.item.buff {
                    buffs.push(Buff {
                        kind,
                        amount: drop.item.value,
                        ends_at: now + BUFF_DURATION,
                    });
                }
            }
            // Материалы копятся вне core (hook для systems прогрессии)
            LootKind::Material => {}
        }

        commands.entity(entity).despawn();
        collected_events.write(LootCollected {
            id: drop.id,
            item: drop.item.clone(),
        });

        log(&format!("Player picked up {}", drop.item.name));
    }
}

/// Loot Plugin
pub struct LootPlugin;

impl Plugin for LootPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LootCatalog>()
            .add_event::<LootDropped>()
            .add_event::<LootCollected>();

        app.add_systems(
            crate::SimulationStep,
            (spawn_loot_drops, animate_loot, collect_loot)
                .chain()
                .in_set(SimSet::Loot),
        );
    }
}
