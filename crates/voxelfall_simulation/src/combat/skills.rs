//! Скиллы игрока
//!
//! Хост (UI/input) запрашивает каст слота через CastSkillRequest; цель —
//! ближайший живой враг в радиусе. Урон уходит обычным DamageRequest,
//! визуал — travel-эффект + SkillCast событие.

use bevy::prelude::*;

use crate::combat::damage::{DamageRequest, Dead};
use crate::components::{ActiveBuffs, Actor, ActorKind, BuffKind, Player, SkillBook, SkillKind};
use crate::effects::{ActiveEffects, EffectKind, SKILL_TRAVEL_DURATION};
use crate::registry::{nearest_among, EntityRegistry};
use crate::{log, SimClock};

/// Радиус поиска цели для скиллов игрока
pub const PLAYER_SKILL_RANGE: f32 = 30.0;

/// Событие-запрос: игрок кастует скилл `slot` из своего SkillBook
#[derive(Event, Debug, Clone)]
pub struct CastSkillRequest {
    pub slot: usize,
}

/// Событие: скилл скастован (рендер/звук/UI)
#[derive(Event, Debug, Clone)]
pub struct SkillCast {
    pub caster: u64,
    pub skill: String,
    pub kind: SkillKind,
    pub color: String,
    pub origin: Vec3,
    pub target: Vec3,
}

/// Система: обработка CastSkillRequest
///
/// No-op если игрока нет, слот пуст или в радиусе нет живого врага.
/// Урон = skill.damage + power buffs игрока.
pub fn cast_player_skills(
    mut requests: EventReader<CastSkillRequest>,
    registry: Res<EntityRegistry>,
    clock: Res<SimClock>,
    mut effects: ResMut<ActiveEffects>,
    players: Query<(&Actor, &Transform, &SkillBook, &ActiveBuffs), (With<Player>, Without<Dead>)>,
    candidates: Query<(&Actor, &Transform), Without<Dead>>,
    mut damage_events: EventWriter<DamageRequest>,
    mut cast_events: EventWriter<SkillCast>,
) {
    let now = clock.now();

    for request in requests.read() {
        let Some(player_entity) = registry.player_entity() else {
            continue;
        };
        let Ok((player_actor, player_transform, skills, buffs)) = players.get(player_entity)
        else {
            continue;
        };
        let Some(skill) = skills.skills.get(request.slot) else {
            continue;
        };

        // Кандидаты в registry порядке — tie-break детерминирован
        let hostiles: Vec<(u64, Vec3)> = registry
            .ids()
            .filter_map(|id| {
                let entity = registry.entity(id)?;
                let (actor, transform) = candidates.get(entity).ok()?;
                (actor.kind == ActorKind::Enemy).then_some((id, transform.translation))
            })
            .collect();

        let origin = player_transform.translation;
        let Some(target_id) = nearest_among(origin, &hostiles, PLAYER_SKILL_RANGE) else {
            continue;
        };
        let target_position = registry
            .entity(target_id)
            .and_then(|entity| candidates.get(entity).ok())
            .map(|(_, transform)| transform.translation)
            .unwrap_or(origin);

        let damage = skill.damage + buffs.sum(BuffKind::Power, now);
        damage_events.write(DamageRequest {
            target: target_id,
            raw: damage,
        });

        effects.spawn(
            EffectKind::SkillTravel {
                from: origin,
                to: target_position,
                color: skill.color.clone(),
            },
            now,
            SKILL_TRAVEL_DURATION,
        );

        cast_events.write(SkillCast {
            caster: player_actor.id,
            skill: skill.name.clone(),
            kind: skill.kind,
            color: skill.color.clone(),
            origin,
            target: target_position,
        });

        log(&format!(
            "Player cast {} at enemy {} ({} dmg)",
            skill.name, target_id, damage
        ));
    }
}
