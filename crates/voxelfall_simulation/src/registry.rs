//! Entity registry — живой набор симулируемых акторов
//!
//! Владеет отображением stable ID → Bevy Entity в порядке вставки.
//! Порядок обхода (insertion order) фиксирован: от него зависит
//! воспроизводимость тика и tie-break nearest-hostile запроса.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::components::ActorKind;

/// Registry resource: stable ID → Entity, insertion order, player singleton
#[derive(Resource, Debug, Default)]
pub struct EntityRegistry {
    /// Stable IDs в порядке регистрации
    order: Vec<u64>,
    lookup: HashMap<u64, Entity>,
    /// Singleton-ссылка на игрока (stable ID)
    player: Option<u64>,
    next_id: u64,
}

impl EntityRegistry {
    /// Выделить следующий stable ID (монотонный, уникальный на всю сессию)
    pub fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Зарегистрировать актора. Player становится singleton-ссылкой.
    pub fn register(&mut self, id: u64, entity: Entity, kind: ActorKind) {
        self.order.push(id);
        self.lookup.insert(id, entity);

        if kind == ActorKind::Player {
            self.player = Some(id);
        }

        // next_id не должен выдать уже занятый ID (restore из snapshot)
        if id >= self.next_id {
            self.next_id = id;
        }
    }

    /// Убрать актора из обхода (смерть, clear, replace)
    pub fn unregister(&mut self, id: u64) {
        self.order.retain(|&o| o != id);
        self.lookup.remove(&id);

        if self.player == Some(id) {
            self.player = None;
        }
    }

    pub fn entity(&self, id: u64) -> Option<Entity> {
        self.lookup.get(&id).copied()
    }

    pub fn player_id(&self) -> Option<u64> {
        self.player
    }

    pub fn player_entity(&self) -> Option<Entity> {
        self.player.and_then(|id| self.entity(id))
    }

    /// Stable IDs в порядке регистрации
    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Сбросить registry (clear_entities). next_id сохраняется —
    /// ID уникальны на всю сессию.
    pub fn reset(&mut self) {
        self.order.clear();
        self.lookup.clear();
        self.player = None;
    }
}

/// Ближайший кандидат из списка (id, позиция) к точке `from` в радиусе `max_range`
///
/// Линейный скан в переданном порядке; строгий `<` оставляет первого
/// встреченного при равных дистанциях (tie-break = insertion order).
pub fn nearest_among(from: Vec3, candidates: &[(u64, Vec3)], max_range: f32) -> Option<u64> {
    let mut nearest: Option<(u64, f32)> = None;

    for &(id, position) in candidates {
        let distance = from.distance(position);
        if distance >= max_range {
            continue;
        }

        match nearest {
            Some((_, best)) if distance >= best => {}
            _ => nearest = Some((id, distance)),
        }
    }

    nearest.map(|(id, _)| id)
}
