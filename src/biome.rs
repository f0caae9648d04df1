// src/biome.rs
//! Классификация биомов
//!
//! Базовое правило работает по высоте самого тайла и его шести соседей.
//! Альтернативная стратегия `RegionGrown` сначала выращивает связные области
//! «особого» шума и красит каждую область одним случайным биомом.

use std::collections::{HashMap, VecDeque};

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::{BiomeStrategy, MapConfig};
use crate::error::MapGenError;
use crate::hex::AxialCoord;
use crate::noise::{HeightSampler, SpecialBiomeNoise, sample_height};

/// Смещение сида для потока случайных чисел особых биомов
const SPECIAL_BIOME_STREAM: u64 = 0x5EED_B10E;

/// Выше этой высоты — снежные вершины
const SNOW_LINE: f32 = 0.2;

/// Выше этой высоты — горы
const MOUNTAIN_LINE: f32 = 0.0;

/// Биом тайла. Набор закрыт: рендерер обязан иметь запасной стиль
/// для значений, которых он не знает, а не наоборот.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    Water,
    Grassland,
    Coastline,
    MountainSnow,
    Mountain,
}

impl Biome {
    pub const ALL: [Biome; 5] = [
        Biome::Water,
        Biome::Grassland,
        Biome::Coastline,
        Biome::MountainSnow,
        Biome::Mountain,
    ];

    /// Биомы, которые может получить область особого шума.
    /// Вода исключена: водный биом бывает только у водных тайлов.
    pub const SPECIAL: [Biome; 4] = [
        Biome::Grassland,
        Biome::Coastline,
        Biome::MountainSnow,
        Biome::Mountain,
    ];

    #[must_use]
    pub fn is_water(self) -> bool {
        self == Biome::Water
    }
}

/// Предикат «особого» биома для стратегии `RegionGrown`
pub trait SpecialBiomePredicate {
    fn is_special(&self, coord: AxialCoord) -> bool;
}

impl SpecialBiomePredicate for SpecialBiomeNoise {
    fn is_special(&self, coord: AxialCoord) -> bool {
        self.value(coord) > self.threshold()
    }
}

impl<F> SpecialBiomePredicate for F
where
    F: Fn(AxialCoord) -> bool,
{
    fn is_special(&self, coord: AxialCoord) -> bool {
        self(coord)
    }
}

/// Состояние выращивания областей: кэш живёт ровно один прогон генерации
struct RegionGrowth<'a> {
    predicate: Box<dyn SpecialBiomePredicate + 'a>,
    cache: HashMap<AxialCoord, Biome>,
    rng: ChaCha8Rng,
}

enum Strategy<'a> {
    HeightBased,
    RegionGrown(RegionGrowth<'a>),
}

pub struct BiomeClassifier<'a, S: HeightSampler + ?Sized> {
    sampler: &'a S,
    water_level: f32,
    radius: u32,
    strategy: Strategy<'a>,
}

impl<'a, S: HeightSampler + ?Sized> BiomeClassifier<'a, S> {
    /// Создаёт классификатор со стратегией из конфигурации
    pub fn new(config: &MapConfig, sampler: &'a S) -> Self {
        match config.biome_strategy() {
            BiomeStrategy::HeightBased => Self::height_based(config, sampler),
            BiomeStrategy::RegionGrown => {
                Self::region_grown(config, sampler, SpecialBiomeNoise::new(config))
            }
        }
    }

    pub fn height_based(config: &MapConfig, sampler: &'a S) -> Self {
        Self {
            sampler,
            water_level: config.water_level(),
            radius: config.radius(),
            strategy: Strategy::HeightBased,
        }
    }

    /// Классификатор с выращиванием областей и собственным предикатом
    pub fn region_grown(
        config: &MapConfig,
        sampler: &'a S,
        predicate: impl SpecialBiomePredicate + 'a,
    ) -> Self {
        Self {
            sampler,
            water_level: config.water_level(),
            radius: config.radius(),
            strategy: Strategy::RegionGrown(RegionGrowth {
                predicate: Box::new(predicate),
                cache: HashMap::new(),
                rng: ChaCha8Rng::seed_from_u64(config.seed().wrapping_add(SPECIAL_BIOME_STREAM)),
            }),
        }
    }

    pub fn classify(&mut self, coord: AxialCoord) -> Result<Biome, MapGenError> {
        let height = sample_height(self.sampler, coord)?;
        if height <= self.water_level {
            return Ok(Biome::Water);
        }

        if let Strategy::RegionGrown(growth) = &mut self.strategy {
            if let Some(&biome) = growth.cache.get(&coord) {
                return Ok(biome);
            }
            if growth.predicate.is_special(coord) {
                return Ok(grow_region(growth, coord, self.radius));
            }
        }

        self.classify_by_height(coord, height)
    }

    fn classify_by_height(&self, coord: AxialCoord, height: f32) -> Result<Biome, MapGenError> {
        for neighbor in coord.neighbors() {
            if sample_height(self.sampler, neighbor)? <= self.water_level {
                return Ok(Biome::Coastline);
            }
        }

        Ok(if height > SNOW_LINE {
            Biome::MountainSnow
        } else if height > MOUNTAIN_LINE {
            Biome::Mountain
        } else {
            Biome::Grassland
        })
    }

    /// Количество тайлов в кэше особых областей
    #[must_use]
    pub fn cached_len(&self) -> usize {
        match &self.strategy {
            Strategy::HeightBased => 0,
            Strategy::RegionGrown(growth) => growth.cache.len(),
        }
    }
}

/// Выбирает один биом на всю связную область и раскрашивает её в ширину
fn grow_region(growth: &mut RegionGrowth<'_>, start: AxialCoord, radius: u32) -> Biome {
    let biome = Biome::SPECIAL
        .choose(&mut growth.rng)
        .copied()
        .unwrap_or(Biome::Grassland);

    growth.cache.insert(start, biome);
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for neighbor in current.neighbors() {
            if neighbor.distance_from_origin() > radius || growth.cache.contains_key(&neighbor) {
                continue;
            }
            if growth.predicate.is_special(neighbor) {
                growth.cache.insert(neighbor, biome);
                queue.push_back(neighbor);
            }
        }
    }

    tracing::trace!(target: "islegen::biome", %start, ?biome, "Выращена особая область");
    biome
}
