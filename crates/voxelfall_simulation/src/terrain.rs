//! Процедурный terrain height field
//!
//! Чистая детерминированная функция высоты: используется при генерации мира
//! (размещение entity/декораций) и каждый тик симуляции (ground following).
//! Никакого состояния — одинаковый вход даёт одинаковый выход на всех
//! платформах (в пределах f32 точности).

use serde::{Deserialize, Serialize};

/// Классификация местности (из WorldChunk генератора)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Biome {
    /// Безопасная зона (spawn, NPC поселения)
    Safe,
    /// Враждебная зона (enemy spawns, рельеф выше)
    Hostile,
}

impl Default for Biome {
    fn default() -> Self {
        Self::Safe
    }
}

/// Пространственная частота первого sin/cos слоя (холмы)
const ROLLING_FREQUENCY: f32 = 0.08;
/// Пространственная частота второго слоя (длинные гряды)
const RIDGE_FREQUENCY: f32 = 0.02;
/// Амплитуда холмов (метры)
const ROLLING_AMPLITUDE: f32 = 2.0;
/// Амплитуда гряд (метры)
const RIDGE_AMPLITUDE: f32 = 3.0;
/// Hostile зоны в 1.8 раза выше (рельеф агрессивнее)
const HOSTILE_AMPLIFICATION: f32 = 1.8;

/// Высота ландшафта в мировой точке (x, z)
///
/// Сумма двух синусоидальных слоёв фиксированной частоты.
/// Для Hostile биома результат умножается на 1.8.
pub fn height(x: f32, z: f32, biome: Biome) -> f32 {
    let rolling = (x * ROLLING_FREQUENCY).sin() * (z * ROLLING_FREQUENCY).cos() * ROLLING_AMPLITUDE;
    let ridges = (x * RIDGE_FREQUENCY + z * RIDGE_FREQUENCY).sin() * RIDGE_AMPLITUDE;
    let base = rolling + ridges;

    match biome {
        Biome::Safe => base,
        Biome::Hostile => base * HOSTILE_AMPLIFICATION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_deterministic() {
        // Одинаковый вход — бит-в-бит одинаковый выход
        let a = height(12.5, -7.25, Biome::Safe);
        let b = height(12.5, -7.25, Biome::Safe);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_hostile_amplification() {
        let safe = height(33.0, 91.0, Biome::Safe);
        let hostile = height(33.0, 91.0, Biome::Hostile);
        assert!((hostile - safe * 1.8).abs() < 1e-5);
    }

    #[test]
    fn test_height_bounded() {
        // Сумма амплитуд ограничивает рельеф: |h| <= (2 + 3) * 1.8
        for i in -50..50 {
            for j in -50..50 {
                let h = height(i as f32 * 3.7, j as f32 * 2.3, Biome::Hostile);
                assert!(h.abs() <= 5.0 * 1.8 + 1e-3, "height {} out of bounds", h);
            }
        }
    }

    #[test]
    fn test_height_continuous() {
        // Малый шаг по x даёт малое изменение высоты (нет разрывов)
        let h0 = height(10.0, 10.0, Biome::Safe);
        let h1 = height(10.001, 10.0, Biome::Safe);
        assert!((h1 - h0).abs() < 0.01);
    }
}
