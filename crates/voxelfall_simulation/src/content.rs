//! Generated content boundary
//!
//! Генеративный pipeline (вне ядра) отдаёт JSON-дескрипторы мира, игрока
//! и акторов. Ядро терпимо к неполным данным: malformed дескриптор
//! пропускается с warning, batch продолжается. Все строковые решения
//! (kind, class → ranged flag, skill kind) разбираются здесь один раз —
//! в горячих путях симуляции строк нет.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::{ActorKind, Skill, SkillKind, VoxelBlock};
use crate::terrain::Biome;

/// Ошибки контент-pipeline (recoverable: спавн пропускается)
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("descriptor is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("unknown actor kind `{0}`")]
    UnknownKind(String),
    #[error("invalid stats: {0}")]
    InvalidStats(String),
    #[error("failed to parse generator output: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Seam для генератора контента
///
/// Реальная реализация (LLM pipeline, сеть) живёт у хоста; ядро видит
/// только готовый WorldContent. Тесты подставляют фикстуры.
pub trait ContentGenerator {
    fn generate(&mut self, prompt: &str) -> Result<WorldContent, ContentError>;
}

/// Полный выход генератора: layout мира + игрок + акторы
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldContent {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub chunks: Vec<ChunkDescriptor>,
    #[serde(default)]
    pub player: Option<EntityDescriptor>,
    #[serde(default)]
    pub entities: Vec<EntityDescriptor>,
}

impl WorldContent {
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Chunk из генератора (grid-координаты + биом + палитра)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkDescriptor {
    pub x: i32,
    pub z: i32,
    #[serde(default)]
    pub biome: Option<String>,
    #[serde(default)]
    pub palette: Option<Vec<String>>,
}

impl ChunkDescriptor {
    /// Биом chunk; нераспознанная строка трактуется как Safe
    pub fn parsed_biome(&self) -> Biome {
        match self.biome.as_deref() {
            Some(s) if s.eq_ignore_ascii_case("hostile") => Biome::Hostile,
            _ => Biome::Safe,
        }
    }
}

/// Статы из генератора (все поля опциональны)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsDescriptor {
    #[serde(default)]
    pub hp: Option<f32>,
    #[serde(default)]
    pub speed: Option<f32>,
    #[serde(default)]
    pub power: Option<f32>,
    #[serde(default)]
    pub defense: Option<f32>,
    #[serde(default)]
    pub ranged: Option<bool>,
    #[serde(default)]
    pub class: Option<String>,
}

/// Скилл из генератора
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub damage: Option<f32>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Дескриптор актора из генератора
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub position: Option<[f32; 3]>,
    #[serde(default)]
    pub stats: Option<StatsDescriptor>,
    #[serde(default)]
    pub skills: Vec<SkillDescriptor>,
    #[serde(default)]
    pub blocks: Vec<VoxelBlock>,
}

/// Проверенный дескриптор, готовый к спавну
#[derive(Debug, Clone)]
pub struct ValidatedActor {
    pub kind: ActorKind,
    pub name: String,
    pub position: Vec3,
    pub max_hp: f32,
    pub speed: f32,
    pub power: f32,
    pub defense: f32,
    pub class_name: String,
    pub ranged: bool,
    pub skills: Vec<Skill>,
    pub blocks: Vec<VoxelBlock>,
}

/// Ranged-классы по имени (решается один раз при валидации)
pub fn is_ranged_class(class: &str) -> bool {
    let lower = class.to_ascii_lowercase();
    lower.contains("mage") || lower.contains("archer")
}

/// Валидация дескриптора актора
///
/// kind и position обязательны; остальное дополняется дефолтами.
/// Кривые значения (hp ≤ 0, NaN позиция) — ошибка, спавн пропускается.
pub fn validate_entity(descriptor: &EntityDescriptor) -> Result<ValidatedActor, ContentError> {
    let kind = match descriptor.kind.as_deref() {
        None => return Err(ContentError::MissingField("kind")),
        Some(s) if s.eq_ignore_ascii_case("player") => ActorKind::Player,
        Some(s) if s.eq_ignore_ascii_case("npc") => ActorKind::Npc,
        Some(s) if s.eq_ignore_ascii_case("enemy") => ActorKind::Enemy,
        Some(other) => return Err(ContentError::UnknownKind(other.to_string())),
    };

    let position = descriptor
        .position
        .ok_or(ContentError::MissingField("position"))?;
    if position.iter().any(|v| !v.is_finite()) {
        return Err(ContentError::InvalidStats("non-finite position".to_string()));
    }

    let stats = descriptor.stats.clone().unwrap_or_default();
    let max_hp = stats.hp.unwrap_or(100.0);
    if !max_hp.is_finite() || max_hp <= 0.0 {
        return Err(ContentError::InvalidStats(format!("hp = {}", max_hp)));
    }

    let class_name = stats.class.unwrap_or_default();
    let ranged = stats.ranged.unwrap_or_else(|| is_ranged_class(&class_name));

    // Кривые скиллы пропускаем по одному — актор из-за них не отбраковывается
    let skills = descriptor
        .skills
        .iter()
        .filter_map(parse_skill)
        .collect();

    Ok(ValidatedActor {
        kind,
        name: descriptor.name.clone().unwrap_or_else(|| "unnamed".to_string()),
        position: Vec3::from_array(position),
        max_hp,
        speed: stats.speed.unwrap_or(4.0),
        power: stats.power.unwrap_or(10.0),
        defense: stats.defense.unwrap_or(5.0),
        class_name,
        ranged,
        skills,
        blocks: descriptor.blocks.clone(),
    })
}

fn parse_skill(descriptor: &SkillDescriptor) -> Option<Skill> {
    let name = descriptor.name.clone()?;

    let kind = match descriptor.kind.as_deref() {
        Some(s) if s.eq_ignore_ascii_case("ultimate") => SkillKind::Ultimate,
        Some(s) if s.eq_ignore_ascii_case("special") => SkillKind::Special,
        _ => SkillKind::Basic,
    };

    Some(Skill {
        name,
        kind,
        damage: descriptor.damage.unwrap_or(10.0),
        color: descriptor
            .color
            .clone()
            .unwrap_or_else(|| "#ffffff".to_string()),
    })
}

/// Фикстурный генератор: всегда отдаёт sample_content()
///
/// Используется headless бинарём и тестами вместо реального pipeline.
pub struct SampleGenerator;

impl ContentGenerator for SampleGenerator {
    fn generate(&mut self, _prompt: &str) -> Result<WorldContent, ContentError> {
        Ok(sample_content())
    }
}

/// Встроенная фикстура: маленький мир для headless бинаря и тестов
pub fn sample_content() -> WorldContent {
    let enemy = |name: &str, class: &str, position: [f32; 3], hp: f32, power: f32| {
        EntityDescriptor {
            name: Some(name.to_string()),
            kind: Some("enemy".to_string()),
            position: Some(position),
            stats: Some(StatsDescriptor {
                hp: Some(hp),
                speed: Some(3.5),
                power: Some(power),
                defense: Some(6.0),
                ranged: None,
                class: Some(class.to_string()),
            }),
            skills: vec![],
            blocks: vec![VoxelBlock {
                x: 0,
                y: 0,
                z: 0,
                color: "#884422".to_string(),
            }],
        }
    };

    WorldContent {
        theme: Some("shattered isles".to_string()),
        chunks: vec![
            ChunkDescriptor {
                x: 0,
                z: 0,
                biome: Some("safe".to_string()),
                palette: Some(vec!["#77aa55".to_string(), "#558844".to_string()]),
            },
            ChunkDescriptor {
                x: 1,
                z: 0,
                biome: Some("hostile".to_string()),
                palette: Some(vec!["#aa5544".to_string()]),
            },
            ChunkDescriptor {
                x: 0,
                z: 1,
                biome: Some("hostile".to_string()),
                palette: None,
            },
        ],
        player: Some(EntityDescriptor {
            name: Some("Wanderer".to_string()),
            kind: Some("player".to_string()),
            position: Some([0.0, 0.0, 0.0]),
            stats: Some(StatsDescriptor {
                hp: Some(120.0),
                speed: Some(4.0),
                power: Some(12.0),
                defense: Some(8.0),
                ranged: Some(false),
                class: Some("warrior".to_string()),
            }),
            skills: vec![
                SkillDescriptor {
                    name: Some("Slash".to_string()),
                    kind: Some("basic".to_string()),
                    damage: Some(15.0),
                    color: Some("#ffd166".to_string()),
                },
                SkillDescriptor {
                    name: Some("Whirlwind".to_string()),
                    kind: Some("special".to_string()),
                    damage: Some(30.0),
                    color: Some("#ef476f".to_string()),
                },
                SkillDescriptor {
                    name: Some("Meteor".to_string()),
                    kind: Some("ultimate".to_string()),
                    damage: Some(60.0),
                    color: Some("#b5179e".to_string()),
                },
            ],
            blocks: vec![VoxelBlock {
                x: 0,
                y: 0,
                z: 0,
                color: "#3366cc".to_string(),
            }],
        }),
        entities: vec![
            enemy("Gnash", "brute", [18.0, 0.0, 6.0], 100.0, 14.0),
            enemy("Vex", "frost mage", [30.0, 0.0, -12.0], 70.0, 18.0),
            enemy("Sliver", "archer", [-24.0, 0.0, 20.0], 80.0, 12.0),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranged_class_detection() {
        assert!(is_ranged_class("frost mage"));
        assert!(is_ranged_class("Archer"));
        assert!(!is_ranged_class("brute"));
        assert!(!is_ranged_class(""));
    }

    #[test]
    fn test_validate_requires_kind_and_position() {
        let mut descriptor = EntityDescriptor::default();
        assert!(matches!(
            validate_entity(&descriptor),
            Err(ContentError::MissingField("kind"))
        ));

        descriptor.kind = Some("enemy".to_string());
        assert!(matches!(
            validate_entity(&descriptor),
            Err(ContentError::MissingField("position"))
        ));

        descriptor.position = Some([1.0, 0.0, 2.0]);
        assert!(validate_entity(&descriptor).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_hp() {
        let descriptor = EntityDescriptor {
            kind: Some("enemy".to_string()),
            position: Some([0.0; 3]),
            stats: Some(StatsDescriptor {
                hp: Some(-5.0),
                ..Default::default()
            }),
            ..Default::default()
        };

        assert!(matches!(
            validate_entity(&descriptor),
            Err(ContentError::InvalidStats(_))
        ));
    }

    #[test]
    fn test_validate_resolves_ranged_from_class() {
        let descriptor = EntityDescriptor {
            kind: Some("enemy".to_string()),
            position: Some([0.0; 3]),
            stats: Some(StatsDescriptor {
                class: Some("dark mage".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let validated = validate_entity(&descriptor).unwrap();
        assert!(validated.ranged);

        // Явный флаг перекрывает класс
        let descriptor = EntityDescriptor {
            stats: Some(StatsDescriptor {
                class: Some("dark mage".to_string()),
                ranged: Some(false),
                ..Default::default()
            }),
            ..descriptor
        };
        assert!(!validate_entity(&descriptor).unwrap().ranged);
    }

    #[test]
    fn test_malformed_skills_skipped_individually() {
        let descriptor = EntityDescriptor {
            kind: Some("player".to_string()),
            position: Some([0.0; 3]),
            skills: vec![
                SkillDescriptor {
                    name: Some("Slash".to_string()),
                    ..Default::default()
                },
                SkillDescriptor::default(), // Без имени — пропускается
            ],
            ..Default::default()
        };

        let validated = validate_entity(&descriptor).unwrap();
        assert_eq!(validated.skills.len(), 1);
        assert_eq!(validated.skills[0].kind, SkillKind::Basic);
    }

    #[test]
    fn test_from_json_tolerates_partial_output() {
        // Генератор вернул только часть полей — парсится без ошибок
        let content = WorldContent::from_json(r#"{"entities": [{"kind": "enemy"}]}"#).unwrap();
        assert!(content.player.is_none());
        assert_eq!(content.entities.len(), 1);

        // Но сам дескриптор без позиции отбракуется на валидации
        assert!(validate_entity(&content.entities[0]).is_err());
    }

    #[test]
    fn test_sample_generator_seam() {
        let mut generator = SampleGenerator;
        let content = generator.generate("any prompt").unwrap();
        assert!(content.player.is_some());
        assert_eq!(content.entities.len(), 3);
    }

    #[test]
    fn test_sample_content_is_valid() {
        let content = sample_content();
        assert!(validate_entity(content.player.as_ref().unwrap()).is_ok());

        for descriptor in &content.entities {
            assert!(validate_entity(descriptor).is_ok());
        }

        // mage/archer распознаны как ranged
        let vex = validate_entity(&content.entities[1]).unwrap();
        let sliver = validate_entity(&content.entities[2]).unwrap();
        assert!(vex.ranged && sliver.ranged);
    }
}
