//! Simulation facade
//!
//! Явный контекст симуляции (registry + часы + RNG внутри Bevy App) —
//! никаких process-wide singleton'ов: тесты создают сколько угодно
//! независимых экземпляров с разными seed. Хост общается только через
//! эту поверхность: ops + события тика + read-only views.

use bevy::prelude::*;

use crate::combat::{CastSkillRequest, DamageDealt, DamageRequest, Dead, EntityDied, SkillCast,
    StaggerState, StaggerTriggered};
use crate::components::{
    Actor, ActorKind, ActorName, Health, Player, PlayerInput, VoxelModel, WorldManifest,
};
use crate::content::{
    sample_content, validate_entity, ContentError, EntityDescriptor, ValidatedActor, WorldContent,
};
use crate::effects::{ActiveEffects, TimedEffect};
use crate::loot::{LootCollected, LootDrop, LootDropped, LootItem};
use crate::persistence::{self, PersistenceError, SaveSnapshot};
use crate::registry::{nearest_among, EntityRegistry};
use crate::terrain::height;
use crate::{
    init_logger, log_info, log_warning, DeterministicRng, SimClock, SimulationPlugin,
    SimulationStep, MAX_DELTA,
};

/// Событие тика для хоста (рендер/звук/UI)
#[derive(Debug, Clone)]
pub enum SimEvent {
    DamageDealt {
        target: u64,
        amount: f32,
        staggered: bool,
        remaining_hp: f32,
    },
    StaggerTriggered {
        entity: u64,
    },
    EntityDied {
        entity: u64,
        kind: ActorKind,
    },
    LootDropped {
        id: u64,
        item: LootItem,
        position: Vec3,
    },
    LootCollected {
        id: u64,
        item: LootItem,
    },
    SkillCast {
        caster: u64,
        skill: String,
        color: String,
    },
}

/// Накопитель событий текущего тика (дренируется в tick)
#[derive(Resource, Debug, Default)]
pub struct EventLog {
    pub events: Vec<SimEvent>,
}

/// Read-only срез состояния актора для рендерера/UI
#[derive(Debug, Clone)]
pub struct EntityView {
    pub id: u64,
    pub kind: ActorKind,
    pub name: String,
    pub position: Vec3,
    pub yaw: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub dead: bool,
    pub staggered: bool,
}

/// Read-only срез loot-дропа
#[derive(Debug, Clone)]
pub struct LootView {
    pub id: u64,
    pub item: LootItem,
    pub position: Vec3,
    pub spin: f32,
}

/// Итог load_content: сколько заспавнено, сколько пропущено
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentReport {
    pub spawned: usize,
    pub skipped: usize,
}

/// Экземпляр симуляции (владеет Bevy App)
pub struct Simulation {
    app: App,
}

impl Simulation {
    /// Пустая симуляция с данным seed
    pub fn new(seed: u64) -> Self {
        init_logger();

        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins(SimulationPlugin)
            .init_resource::<EventLog>();
        app.add_systems(SimulationStep, collect_events.in_set(crate::SimSet::Cleanup));
        app.insert_resource(DeterministicRng::new(seed));

        Self { app }
    }

    /// Симуляция, заполненная из выхода генератора
    pub fn from_content(seed: u64, content: &WorldContent) -> Self {
        let mut sim = Self::new(seed);
        sim.load_content(content);
        sim
    }

    /// Симуляция с встроенной фикстурой (headless бинарь, демо)
    pub fn with_sample_world(seed: u64) -> Self {
        Self::from_content(seed, &sample_content())
    }

    /// Один симуляционный тик
    ///
    /// delta ограничивается [0, 0.1]с; порядок фаз фиксирован. Возвращает
    /// события тика (урон, stagger, смерти, loot, касты) для side effects
    /// хоста.
    pub fn tick(&mut self, delta: f32) -> Vec<SimEvent> {
        let delta = delta.clamp(0.0, MAX_DELTA);

        let world = self.app.world_mut();
        world.resource_mut::<SimClock>().advance(delta);
        world.run_schedule(SimulationStep);
        update_event_buffers(world);

        std::mem::take(&mut world.resource_mut::<EventLog>().events)
    }

    /// Загрузить выход генератора: manifest + игрок + акторы
    ///
    /// Malformed дескриптор пропускается (warning + счётчик), batch
    /// продолжается.
    pub fn load_content(&mut self, content: &WorldContent) -> ContentReport {
        let world = self.app.world_mut();

        *world.resource_mut::<WorldManifest>() = WorldManifest {
            theme: content.theme.clone().unwrap_or_default(),
            chunks: content
                .chunks
                .iter()
                .map(|c| crate::components::ChunkRecord {
                    grid_x: c.x,
                    grid_z: c.z,
                    biome: c.parsed_biome(),
                    palette: c.palette.clone().unwrap_or_default(),
                })
                .collect(),
        };

        let mut report = ContentReport::default();
        let descriptors = content.player.iter().chain(content.entities.iter());

        for descriptor in descriptors {
            match validate_entity(descriptor) {
                Ok(validated) => {
                    spawn_validated(world, &validated);
                    report.spawned += 1;
                }
                Err(error) => {
                    log_warning(&format!("skipping malformed descriptor: {}", error));
                    report.skipped += 1;
                }
            }
        }

        log_info(&format!(
            "content loaded: {} spawned, {} skipped",
            report.spawned, report.skipped
        ));
        report
    }

    /// Спавн одного актора из дескриптора
    pub fn spawn_entity(&mut self, descriptor: &EntityDescriptor) -> Result<u64, ContentError> {
        let validated = validate_entity(descriptor)?;
        Ok(spawn_validated(self.app.world_mut(), &validated))
    }

    /// Убрать всех акторов, loot и эффекты (мир/manifest остаются)
    pub fn clear_entities(&mut self) {
        let world = self.app.world_mut();

        let stale: Vec<Entity> = world
            .query_filtered::<Entity, Or<(With<Actor>, With<LootDrop>)>>()
            .iter(world)
            .collect();
        for entity in stale {
            world.despawn(entity);
        }

        world.resource_mut::<EntityRegistry>().reset();
        world.resource_mut::<ActiveEffects>().clear();
    }

    /// Запросить урон актору (применится внутри следующего tick)
    ///
    /// Unknown/dead id — no-op по месту обработки.
    pub fn damage_entity(&mut self, id: u64, amount: f32) {
        self.app
            .world_mut()
            .send_event(DamageRequest {
                target: id,
                raw: amount,
            });
    }

    /// Каст скилла игрока (слот SkillBook); применится в следующем tick
    pub fn cast_player_skill(&mut self, slot: usize) {
        self.app.world_mut().send_event(CastSkillRequest { slot });
    }

    /// Ближайший живой враг к игроку строго ближе max_range
    ///
    /// None если игрока нет или кандидатов нет; при равных дистанциях
    /// побеждает более ранняя регистрация.
    pub fn nearest_hostile(&self, max_range: f32) -> Option<u64> {
        let world = self.app.world();
        let registry = world.resource::<EntityRegistry>();

        let player_entity = registry.player_entity()?;
        let player_position = world.get::<Transform>(player_entity)?.translation;

        let candidates: Vec<(u64, Vec3)> = registry
            .ids()
            .filter_map(|id| {
                let entity = registry.entity(id)?;
                let actor = world.get::<Actor>(entity)?;
                if actor.kind != ActorKind::Enemy || world.get::<Dead>(entity).is_some() {
                    return None;
                }
                Some((id, world.get::<Transform>(entity)?.translation))
            })
            .collect();

        nearest_among(player_position, &candidates, max_range)
    }

    /// Input игрока: ось (strafe, forward), обе в [-1, 1]
    pub fn set_input_direction(&mut self, axis: Vec2) {
        let mut input = self.app.world_mut().resource_mut::<PlayerInput>();
        input.axis = axis.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
    }

    /// Yaw камеры (рендерер владеет камерой, ядру нужен только угол)
    pub fn set_camera_yaw(&mut self, yaw: f32) {
        self.app.world_mut().resource_mut::<PlayerInput>().camera_yaw = yaw;
    }

    /// Stable ID игрока (если есть)
    pub fn player_id(&self) -> Option<u64> {
        self.app.world().resource::<EntityRegistry>().player_id()
    }

    /// Срезы всех акторов в registry порядке
    pub fn entities(&self) -> Vec<EntityView> {
        let world = self.app.world();
        let now = world.resource::<SimClock>().now();
        let registry = world.resource::<EntityRegistry>();

        registry
            .ids()
            .filter_map(|id| {
                let entity = registry.entity(id)?;
                let actor = world.get::<Actor>(entity)?;
                let transform = world.get::<Transform>(entity)?;
                let health = world.get::<Health>(entity)?;
                let stagger = world.get::<StaggerState>(entity)?;

                Some(EntityView {
                    id,
                    kind: actor.kind,
                    name: world
                        .get::<ActorName>(entity)
                        .map(|n| n.name.clone())
                        .unwrap_or_default(),
                    position: transform.translation,
                    yaw: world
                        .get::<crate::components::Heading>(entity)
                        .map(|h| h.yaw)
                        .unwrap_or(0.0),
                    hp: health.current,
                    max_hp: health.max,
                    dead: world.get::<Dead>(entity).is_some() || !health.is_alive(),
                    staggered: stagger.is_staggered(now),
                })
            })
            .collect()
    }

    /// Срезы активных loot-дропов
    pub fn loot(&mut self) -> Vec<LootView> {
        let world = self.app.world_mut();
        let mut drops = world.query::<(&LootDrop, &Transform)>();

        drops
            .iter(world)
            .map(|(drop, transform)| LootView {
                id: drop.id,
                item: drop.item.clone(),
                position: transform.translation,
                spin: drop.spin,
            })
            .collect()
    }

    /// Активные timed эффекты (копия списка)
    pub fn effects(&self) -> Vec<TimedEffect> {
        self.app
            .world()
            .resource::<ActiveEffects>()
            .effects
            .clone()
    }

    /// Текущее накопленное время симуляции
    pub fn elapsed(&self) -> f64 {
        self.app.world().resource::<SimClock>().now()
    }

    /// Snapshot текущего состояния
    pub fn save(&self) -> SaveSnapshot {
        persistence::capture(self.app.world())
    }

    pub fn save_json(&self) -> Result<String, PersistenceError> {
        self.save().to_json()
    }

    /// Восстановить состояние из snapshot (замена целиком)
    pub fn restore(&mut self, snapshot: &SaveSnapshot) {
        persistence::restore(self.app.world_mut(), snapshot);
    }

    /// Восстановить из JSON: ошибка парсинга оставляет текущее состояние
    /// нетронутым
    pub fn restore_json(&mut self, json: &str) -> Result<(), PersistenceError> {
        let snapshot = SaveSnapshot::from_json(json)?;
        self.restore(&snapshot);
        Ok(())
    }
}

/// Спавн проверенного актора: высота по terrain, registry регистрация,
/// замена player singleton при необходимости. Возвращает stable ID.
pub(crate) fn spawn_validated(world: &mut World, validated: &ValidatedActor) -> u64 {
    // Player — singleton: старый экземпляр уходит целиком
    if validated.kind == ActorKind::Player {
        if let Some(previous_id) = world.resource::<EntityRegistry>().player_id() {
            if let Some(previous) = world.resource::<EntityRegistry>().entity(previous_id) {
                world.despawn(previous);
            }
            world
                .resource_mut::<EntityRegistry>()
                .unregister(previous_id);
        }
    }

    // Высота спавна — terrain по биому точки
    let biome = world
        .resource::<WorldManifest>()
        .biome_at(validated.position.x, validated.position.z);
    let position = Vec3::new(
        validated.position.x,
        height(validated.position.x, validated.position.z, biome),
        validated.position.z,
    );

    let id = world.resource_mut::<EntityRegistry>().allocate_id();

    let entity = world
        .spawn((
            Actor {
                id,
                kind: validated.kind,
            },
            ActorName {
                name: validated.name.clone(),
            },
            Transform::from_translation(position),
            Health::new(validated.max_hp),
            crate::components::CombatStats {
                speed: validated.speed,
                power: validated.power,
                defense: validated.defense,
                class_name: validated.class_name.clone(),
                ranged: validated.ranged,
            },
            crate::components::SkillBook {
                skills: validated.skills.clone(),
            },
            crate::components::SpawnOrigin { position },
            VoxelModel {
                blocks: validated.blocks.clone(),
            },
        ))
        .id();

    if validated.kind == ActorKind::Player {
        world.entity_mut(entity).insert(Player);
    }

    world
        .resource_mut::<EntityRegistry>()
        .register(id, entity, validated.kind);

    log_info(&format!(
        "spawned {:?} `{}` (id {}) at {:.1},{:.1}",
        validated.kind, validated.name, id, position.x, position.z
    ));

    id
}

/// Система: сбор событий тика в EventLog (последняя фаза)
pub fn collect_events(
    mut log: ResMut<EventLog>,
    mut dealt: EventReader<DamageDealt>,
    mut staggered: EventReader<StaggerTriggered>,
    mut died: EventReader<EntityDied>,
    mut dropped: EventReader<LootDropped>,
    mut collected: EventReader<LootCollected>,
    mut casts: EventReader<SkillCast>,
) {
    for event in dealt.read() {
        log.events.push(SimEvent::DamageDealt {
            target: event.target,
            amount: event.amount,
            staggered: event.staggered,
            remaining_hp: event.remaining_hp,
        });
    }
    for event in staggered.read() {
        log.events.push(SimEvent::StaggerTriggered { entity: event.id });
    }
    for event in died.read() {
        log.events.push(SimEvent::EntityDied {
            entity: event.id,
            kind: event.kind,
        });
    }
    for event in dropped.read() {
        log.events.push(SimEvent::LootDropped {
            id: event.id,
            item: event.item.clone(),
            position: event.position,
        });
    }
    for event in collected.read() {
        log.events.push(SimEvent::LootCollected {
            id: event.id,
            item: event.item.clone(),
        });
    }
    for event in casts.read() {
        log.events.push(SimEvent::SkillCast {
            caster: event.caster,
            skill: event.skill.clone(),
            color: event.color.clone(),
        });
    }
}

/// Ручное старение event-буферов (First schedule не гоняем)
fn update_event_buffers(world: &mut World) {
    world.resource_mut::<Events<DamageRequest>>().update();
    world.resource_mut::<Events<DamageDealt>>().update();
    world.resource_mut::<Events<StaggerTriggered>>().update();
    world.resource_mut::<Events<EntityDied>>().update();
    world.resource_mut::<Events<CastSkillRequest>>().update();
    world.resource_mut::<Events<SkillCast>>().update();
    world.resource_mut::<Events<LootDropped>>().update();
    world.resource_mut::<Events<LootCollected>>().update();
}
