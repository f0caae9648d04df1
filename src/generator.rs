// src/generator.rs
//! Конвейер генерации острова
//!
//! Стадии идут строго по порядку, каждая начинается только после того, как
//! предыдущая полностью закончила:
//! 1. построение сетки (высоты, тип, биом);
//! 2. отсечение суши, не связанной с центром;
//! 3. размещение городов.
//!
//! Любая ошибка стадии прерывает весь конвейер, частичная карта наружу не отдаётся.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::{MapConfig, MapSettings};
use crate::error::MapGenError;
use crate::grid::{MapDefinition, TileType, build_grid};
use crate::island::filter_island;
use crate::noise::{DecayingNoise, HeightSampler};
use crate::settlement::{Checkpoint, NoCheckpoint, PlacementOutcome, place_settlements};

/// Готовая карта и отчёт о генерации
#[derive(Debug, Clone)]
pub struct GeneratedMap {
    pub map: MapDefinition,
    pub placement: PlacementOutcome,
    /// Сколько тайлов суши отсечено как не связанные с центром
    pub demoted: usize,
}

/// Генерирует карту с шумом по умолчанию и без контрольных точек
pub fn generate_map(settings: &MapSettings) -> Result<GeneratedMap, MapGenError> {
    let config = settings.resolve()?;
    let noise = DecayingNoise::new(&config);
    generate_with(&config, &noise, &mut NoCheckpoint)
}

/// Генерирует карту с заданным источником высот и контрольной точкой
pub fn generate_with<S, C>(
    config: &MapConfig,
    sampler: &S,
    checkpoint: &mut C,
) -> Result<GeneratedMap, MapGenError>
where
    S: HeightSampler + ?Sized,
    C: Checkpoint + ?Sized,
{
    tracing::info!(
        target: "islegen::generator",
        seed = config.seed(),
        radius = config.radius(),
        total_towns = config.total_towns(),
        water_level = config.water_level(),
        strategy = ?config.biome_strategy(),
        "Генерация острова"
    );

    let mut map = build_grid(config, sampler)?;
    let demoted = filter_island(&mut map, sampler)?;

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed());
    let placement = place_settlements(&mut map, config.total_towns(), &mut rng, checkpoint);

    tracing::info!(
        target: "islegen::generator",
        tiles = map.len(),
        land = map.count(TileType::Land),
        water = map.count(TileType::Water),
        towns = placement.placed,
        "Остров готов"
    );

    Ok(GeneratedMap {
        map,
        placement,
        demoted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::Biome;
    use crate::error::ConfigError;
    use crate::hex::AxialCoord;

    #[test]
    fn invalid_settings_fail_before_any_tile_work() {
        let settings = MapSettings {
            radius: -2,
            ..MapSettings::default()
        };
        let err = generate_map(&settings).unwrap_err();
        assert!(matches!(
            err,
            MapGenError::InvalidConfig(ConfigError::NegativeRadius(-2))
        ));
    }

    #[test]
    fn same_seed_same_island() {
        let settings = MapSettings {
            seed: Some(31337),
            radius: 10,
            total_towns: 4,
            ..MapSettings::default()
        };
        let a = generate_map(&settings).unwrap();
        let b = generate_map(&settings).unwrap();
        let a_tiles: Vec<_> = a.map.tiles().copied().collect();
        let b_tiles: Vec<_> = b.map.tiles().copied().collect();
        assert_eq!(a_tiles, b_tiles);
        assert_eq!(a.placement, b.placement);
    }

    #[test]
    fn sampler_failure_mid_pipeline_returns_no_map() {
        let config = MapSettings {
            seed: Some(1),
            radius: 3,
            ..MapSettings::default()
        }
        .resolve()
        .unwrap();
        let sampler = |c: AxialCoord| {
            if c.distance_from_origin() == 3 {
                f32::INFINITY
            } else {
                0.4
            }
        };
        let result = generate_with(&config, &sampler, &mut NoCheckpoint);
        assert!(matches!(result, Err(MapGenError::NonFiniteHeight { .. })));
    }

    #[test]
    fn towns_never_sit_on_water() {
        let settings = MapSettings {
            seed: Some(808),
            radius: 14,
            total_towns: 8,
            ..MapSettings::default()
        };
        let generated = generate_map(&settings).unwrap();
        for tile in generated.map.tiles() {
            if tile.tile_type == TileType::Town {
                assert_ne!(tile.biome, Biome::Water);
            }
        }
        assert_eq!(
            generated.map.count(TileType::Town) as u32,
            generated.placement.placed
        );
    }
}
