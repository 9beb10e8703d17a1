//! World-level данные: voxel-модель актора и manifest сгенерированного мира
//!
//! Симуляция хранит эти данные, но не мутирует их: voxel-модель нужна
//! рендереру (и сохраняется в snapshot), manifest — для spawn-time
//! классификации биомов и персистенса.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::terrain::Biome;

/// Один voxel-блок модели (локальные координаты + цвет палитры)
#[derive(Debug, Clone, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub struct VoxelBlock {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    /// "#rrggbb"
    pub color: String,
}

/// Voxel-модель актора (opaque для симуляции, spawn-time данные генератора)
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct VoxelModel {
    pub blocks: Vec<VoxelBlock>,
}

/// Запись о chunk сгенерированного мира
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Grid-координаты chunk (не мировые метры)
    pub grid_x: i32,
    pub grid_z: i32,
    pub biome: Biome,
    /// Цветовая палитра chunk ("#rrggbb")
    pub palette: Vec<String>,
}

/// Размер chunk в мировых метрах (layout генератора)
pub const CHUNK_SIZE: f32 = 16.0;

/// Manifest сгенерированного мира (тема + chunk layout)
///
/// Заполняется из WorldContent при load_content, уходит в SaveSnapshot.
#[derive(Resource, Debug, Clone, Default)]
pub struct WorldManifest {
    pub theme: String,
    pub chunks: Vec<ChunkRecord>,
}

impl WorldManifest {
    /// Биом в мировой точке (x, z); вне layout — Safe
    pub fn biome_at(&self, x: f32, z: f32) -> Biome {
        let gx = (x / CHUNK_SIZE).floor() as i32;
        let gz = (z / CHUNK_SIZE).floor() as i32;

        self.chunks
            .iter()
            .find(|c| c.grid_x == gx && c.grid_z == gz)
            .map(|c| c.biome)
            .unwrap_or(Biome::Safe)
    }
}
