// src/grid.rs
//! Сетка тайлов и её построение
//!
//! [`MapDefinition`] — итог генерации: разрешённая конфигурация плюс ровно один
//! тайл на каждую координату внутри радиуса. Тайлы хранятся двухуровневой
//! картой `x → z → тайл`, упорядоченной для детерминированного обхода.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::biome::{Biome, BiomeClassifier};
use crate::config::MapConfig;
use crate::error::MapGenError;
use crate::hex::{AxialCoord, disc, hex_count};
use crate::noise::{HeightSampler, sample_height};

/// Тип тайла
///
/// Суша может стать водой (отсечение островов) или городом (размещение).
/// Вода и город — конечные состояния.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TileType {
    Land,
    Water,
    Town,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileDefinition {
    pub position: AxialCoord,
    #[serde(rename = "type")]
    pub tile_type: TileType,
    pub biome: Biome,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapDefinition {
    pub config: MapConfig,
    tiles: BTreeMap<i32, BTreeMap<i32, TileDefinition>>,
}

impl MapDefinition {
    fn empty(config: MapConfig) -> Self {
        Self {
            config,
            tiles: BTreeMap::new(),
        }
    }

    fn insert(&mut self, tile: TileDefinition) {
        self.tiles
            .entry(tile.position.x)
            .or_default()
            .insert(tile.position.z, tile);
    }

    #[must_use]
    pub fn get(&self, coord: AxialCoord) -> Option<&TileDefinition> {
        self.tiles.get(&coord.x)?.get(&coord.z)
    }

    pub(crate) fn get_mut(&mut self, coord: AxialCoord) -> Option<&mut TileDefinition> {
        self.tiles.get_mut(&coord.x)?.get_mut(&coord.z)
    }

    #[must_use]
    pub fn contains(&self, coord: AxialCoord) -> bool {
        self.get(coord).is_some()
    }

    /// Все тайлы в порядке возрастания (x, z)
    pub fn tiles(&self) -> impl Iterator<Item = &TileDefinition> {
        self.tiles.values().flat_map(BTreeMap::values)
    }

    pub(crate) fn tiles_mut(&mut self) -> impl Iterator<Item = &mut TileDefinition> {
        self.tiles.values_mut().flat_map(BTreeMap::values_mut)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn count(&self, tile_type: TileType) -> usize {
        self.tiles().filter(|t| t.tile_type == tile_type).count()
    }

    /// Координаты всех тайлов данного типа
    #[must_use]
    pub fn positions_of(&self, tile_type: TileType) -> Vec<AxialCoord> {
        self.tiles()
            .filter(|t| t.tile_type == tile_type)
            .map(|t| t.position)
            .collect()
    }

    #[must_use]
    pub fn towns(&self) -> Vec<AxialCoord> {
        self.positions_of(TileType::Town)
    }
}

/// Строит сетку со стратегией биомов из конфигурации
///
/// Классификатор (и его кэш) создаётся заново на каждый вызов.
pub fn build_grid<S>(config: &MapConfig, sampler: &S) -> Result<MapDefinition, MapGenError>
where
    S: HeightSampler + ?Sized,
{
    let mut classifier = BiomeClassifier::new(config, sampler);
    build_grid_with(config, sampler, &mut classifier)
}

/// Строит сетку с заданным классификатором
pub fn build_grid_with<S>(
    config: &MapConfig,
    sampler: &S,
    classifier: &mut BiomeClassifier<'_, S>,
) -> Result<MapDefinition, MapGenError>
where
    S: HeightSampler + ?Sized,
{
    let mut map = MapDefinition::empty(config.clone());
    let water_level = config.water_level();

    for coord in disc(config.radius()) {
        let height = sample_height(sampler, coord)?;
        let (tile_type, biome) = if height <= water_level {
            (TileType::Water, Biome::Water)
        } else if config.generate_biomes() {
            (TileType::Land, classifier.classify(coord)?)
        } else {
            (TileType::Land, Biome::Grassland)
        };

        map.insert(TileDefinition {
            position: coord,
            tile_type,
            biome,
        });
    }

    debug_assert_eq!(map.len(), hex_count(config.radius()));
    tracing::debug!(
        target: "islegen::grid",
        tiles = map.len(),
        land = map.count(TileType::Land),
        water = map.count(TileType::Water),
        "Сетка построена"
    );
    Ok(map)
}
