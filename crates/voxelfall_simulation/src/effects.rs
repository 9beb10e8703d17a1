//! Timed visual effects
//!
//! Короткоживущие визуальные/звуковые эффекты (полёт скилла, вспышка удара,
//! звёзды stagger) живут одним списком в ActiveEffects и продвигаются один
//! раз за тик основным циклом — никаких самоперепланирующихся колбэков.
//! Эффект обязан переживать исчезновение своего актора (осиротевшие
//! отбрасываются без обращения к удалённой entity).

use bevy::prelude::*;

use crate::combat::StaggerTriggered;
use crate::registry::EntityRegistry;
use crate::{SimClock, SimSet};

/// Длительность полёта скилла (визуал, урон применяется при касте)
pub const SKILL_TRAVEL_DURATION: f32 = 0.4;
/// Длительность вспышки попадания
pub const IMPACT_BURST_DURATION: f32 = 0.25;

/// Вид эффекта (payload для рендерера)
#[derive(Debug, Clone, Reflect)]
pub enum EffectKind {
    /// Снаряд/луч от from к to
    SkillTravel { from: Vec3, to: Vec3, color: String },
    /// Вспышка в точке удара
    ImpactBurst { at: Vec3, color: String },
    /// Звёзды над staggered врагом (привязаны к актору по stable ID)
    StaggerStars { owner: u64 },
}

/// Активный timed эффект
#[derive(Debug, Clone, Reflect)]
pub struct TimedEffect {
    pub kind: EffectKind,
    /// Момент старта (абсолютное время SimClock)
    pub started_at: f64,
    /// Длительность (секунды)
    pub duration: f32,
}

impl TimedEffect {
    /// Прогресс [0, 1]
    pub fn progress(&self, now: f64) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (((now - self.started_at) / self.duration as f64) as f32).clamp(0.0, 1.0)
    }

    pub fn is_complete(&self, now: f64) -> bool {
        now - self.started_at >= self.duration as f64
    }
}

/// Список активных эффектов (resource, продвигается раз за тик)
#[derive(Resource, Debug, Default)]
pub struct ActiveEffects {
    pub effects: Vec<TimedEffect>,
}

impl ActiveEffects {
    pub fn spawn(&mut self, kind: EffectKind, now: f64, duration: f32) {
        self.effects.push(TimedEffect {
            kind,
            started_at: now,
            duration,
        });
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }
}

/// Система: звёзды stagger по StaggerTriggered событию
pub fn spawn_stagger_stars(
    mut events: EventReader<StaggerTriggered>,
    clock: Res<SimClock>,
    mut effects: ResMut<ActiveEffects>,
) {
    let now = clock.now();

    for event in events.read() {
        effects.spawn(
            EffectKind::StaggerStars { owner: event.id },
            now,
            crate::combat::STAGGER_DURATION as f32,
        );
    }
}

/// Система: продвижение эффектов
///
/// Завершённые отбрасываются; эффекты, чей owner уже убран из registry
/// (смерть, clear), отбрасываются без обращения к entity.
pub fn advance_effects(
    clock: Res<SimClock>,
    registry: Res<EntityRegistry>,
    mut effects: ResMut<ActiveEffects>,
) {
    let now = clock.now();

    effects.effects.retain(|effect| {
        if effect.is_complete(now) {
            return false;
        }

        match &effect.kind {
            EffectKind::StaggerStars { owner } => registry.entity(*owner).is_some(),
            _ => true,
        }
    });
}

/// Effects Plugin
pub struct EffectsPlugin;

impl Plugin for EffectsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActiveEffects>();

        app.add_systems(
            crate::SimulationStep,
            (spawn_stagger_stars, advance_effects)
                .chain()
                .in_set(SimSet::Effects),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effect(started_at: f64, duration: f32) -> TimedEffect {
        TimedEffect {
            kind: EffectKind::ImpactBurst {
                at: Vec3::ZERO,
                color: "#ffffff".to_string(),
            },
            started_at,
            duration,
        }
    }

    #[test]
    fn test_progress_clamped() {
        let fx = effect(10.0, 0.5);
        assert_eq!(fx.progress(9.0), 0.0);
        assert!((fx.progress(10.25) - 0.5).abs() < 1e-5);
        assert_eq!(fx.progress(11.0), 1.0);
    }

    #[test]
    fn test_completion() {
        let fx = effect(10.0, 0.5);
        assert!(!fx.is_complete(10.4));
        assert!(fx.is_complete(10.5));
    }

    #[test]
    fn test_orphaned_stars_dropped() {
        // Осиротевший StaggerStars (owner не в registry) отбрасывается retain-логикой
        let registry = EntityRegistry::default();
        let fx = TimedEffect {
            kind: EffectKind::StaggerStars { owner: 99 },
            started_at: 0.0,
            duration: 2.0,
        };

        let keep = !fx.is_complete(0.1)
            && match &fx.kind {
                EffectKind::StaggerStars { owner } => registry.entity(*owner).is_some(),
                _ => true,
            };
        assert!(!keep);
    }
}
