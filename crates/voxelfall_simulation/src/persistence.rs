//! Персистенс: snapshot симуляции в JSON
//!
//! Snapshot несёт world manifest, игрока и остальных акторов (чистые
//! данные, без render-handles) + timestamp. Транспорт (файл, local
//! storage) — забота хоста. Load сначала полностью парсит и проверяет
//! snapshot; текущее состояние не трогается, пока ошибка возможна.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::{Dead, LastAttack, StaggerState};
use crate::components::{
    ActiveBuffs, Actor, ActorKind, ActorName, Buff, ChunkRecord, CombatStats, Heading, Health,
    Player, Skill, SkillBook, SpawnOrigin, VoxelBlock, VoxelModel, WorldManifest,
};
use crate::loot::LootDrop;
use crate::registry::EntityRegistry;
use crate::{ActiveEffects, SimClock};

/// Текущая версия формата
pub const SAVE_VERSION: u32 = 1;

/// Ошибки персистенса (surface to caller, состояние не тронуто)
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("failed to parse save data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported save version {0} (expected {SAVE_VERSION})")]
    UnsupportedVersion(u32),
}

/// Сериализуемое состояние актора (без render-handles)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorRecord {
    pub id: u64,
    pub kind: ActorKind,
    pub name: String,
    pub position: [f32; 3],
    pub yaw: f32,
    pub spawn_origin: [f32; 3],
    pub hp: f32,
    pub max_hp: f32,
    pub speed: f32,
    pub power: f32,
    pub defense: f32,
    pub class: String,
    pub ranged: bool,
    pub skills: Vec<Skill>,
    pub buffs: Vec<Buff>,
    pub stagger_points: f32,
    pub stagger_until: Option<f64>,
    pub last_attack: Option<f64>,
    pub blocks: Vec<VoxelBlock>,
}

/// Полный snapshot симуляции
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSnapshot {
    pub version: u32,
    /// RFC 3339 момент сохранения (wall clock)
    pub saved_at: String,
    /// Накопленное время симуляции — все абсолютные таймеры валидны после load
    pub elapsed: f64,
    pub theme: String,
    pub chunks: Vec<ChunkRecord>,
    pub player: Option<ActorRecord>,
    pub entities: Vec<ActorRecord>,
}

impl SaveSnapshot {
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let snapshot: SaveSnapshot = serde_json::from_str(json)?;
        if snapshot.version != SAVE_VERSION {
            return Err(PersistenceError::UnsupportedVersion(snapshot.version));
        }
        Ok(snapshot)
    }
}

/// Снять snapshot с мира (registry порядок обхода сохраняется)
pub fn capture(world: &World) -> SaveSnapshot {
    let registry = world.resource::<EntityRegistry>();
    let clock = world.resource::<SimClock>();
    let manifest = world.resource::<WorldManifest>();

    let mut player = None;
    let mut entities = Vec::new();

    for id in registry.ids() {
        let Some(entity) = registry.entity(id) else {
            continue;
        };
        let Some(record) = capture_actor(world, entity) else {
            continue;
        };

        if record.kind == ActorKind::Player {
            player = Some(record);
        } else {
            entities.push(record);
        }
    }

    SaveSnapshot {
        version: SAVE_VERSION,
        saved_at: chrono::Utc::now().to_rfc3339(),
        elapsed: clock.now(),
        theme: manifest.theme.clone(),
        chunks: manifest.chunks.clone(),
        player,
        entities,
    }
}

fn capture_actor(world: &World, entity: Entity) -> Option<ActorRecord> {
    let actor = world.get::<Actor>(entity)?;
    let transform = world.get::<Transform>(entity)?;
    let health = world.get::<Health>(entity)?;
    let stats = world.get::<CombatStats>(entity)?;
    let skills = world.get::<SkillBook>(entity)?;
    let buffs = world.get::<ActiveBuffs>(entity)?;
    let stagger = world.get::<StaggerState>(entity)?;
    let last_attack = world.get::<LastAttack>(entity)?;
    let heading = world.get::<Heading>(entity)?;
    let origin = world.get::<SpawnOrigin>(entity)?;
    let model = world.get::<VoxelModel>(entity)?;
    let name = world
        .get::<ActorName>(entity)
        .map(|n| n.name.clone())
        .unwrap_or_default();

    Some(ActorRecord {
        id: actor.id,
        kind: actor.kind,
        name,
        position: transform.translation.to_array(),
        yaw: heading.yaw,
        spawn_origin: origin.position.to_array(),
        hp: health.current,
        max_hp: health.max,
        speed: stats.speed,
        power: stats.power,
        defense: stats.defense,
        class: stats.class_name.clone(),
        ranged: stats.ranged,
        skills: skills.skills.clone(),
        buffs: buffs.buffs.clone(),
        stagger_points: stagger.points,
        stagger_until: stagger.until,
        last_attack: last_attack.at,
        blocks: model.blocks.clone(),
    })
}

/// Восстановить мир из snapshot
///
/// Вызывается только с уже распарсенным (и потому валидным) snapshot —
/// текущее состояние заменяется целиком: акторы, loot, эффекты, manifest,
/// часы. Registry сохраняет уникальность ID после restore.
pub fn restore(world: &mut World, snapshot: &SaveSnapshot) {
    // Снести текущую сцену
    let stale: Vec<Entity> = world
        .query_filtered::<Entity, Or<(With<Actor>, With<LootDrop>)>>()
        .iter(world)
        .collect();
    for entity in stale {
        world.despawn(entity);
    }

    world.resource_mut::<EntityRegistry>().reset();
    world.resource_mut::<ActiveEffects>().clear();

    *world.resource_mut::<WorldManifest>() = WorldManifest {
        theme: snapshot.theme.clone(),
        chunks: snapshot.chunks.clone(),
    };

    let mut clock = world.resource_mut::<SimClock>();
    clock.elapsed = snapshot.elapsed;
    clock.delta = 0.0;

    if let Some(record) = &snapshot.player {
        spawn_record(world, record);
    }
    for record in &snapshot.entities {
        spawn_record(world, record);
    }
}

fn spawn_record(world: &mut World, record: &ActorRecord) {
    let position = Vec3::from_array(record.position);

    let entity = world
        .spawn((
            Actor {
                id: record.id,
                kind: record.kind,
            },
            ActorName {
                name: record.name.clone(),
            },
            Transform::from_translation(position)
                .with_rotation(Quat::from_rotation_y(record.yaw)),
            Health {
                current: record.hp,
                max: record.max_hp,
            },
            CombatStats {
                speed: record.speed,
                power: record.power,
                defense: record.defense,
                class_name: record.class.clone(),
                ranged: record.ranged,
            },
            SkillBook {
                skills: record.skills.clone(),
            },
            ActiveBuffs {
                buffs: record.buffs.clone(),
            },
            StaggerState {
                points: record.stagger_points,
                until: record.stagger_until,
            },
            LastAttack {
                at: record.last_attack,
            },
            Heading { yaw: record.yaw },
            SpawnOrigin {
                position: Vec3::from_array(record.spawn_origin),
            },
            VoxelModel {
                blocks: record.blocks.clone(),
            },
        ))
        .id();

    if record.kind == ActorKind::Player {
        world.entity_mut(entity).insert(Player);
    }
    if record.hp <= 0.0 {
        world.entity_mut(entity).insert(Dead);
    }

    world
        .resource_mut::<EntityRegistry>()
        .register(record.id, entity, record.kind);
}
