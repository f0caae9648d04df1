// src/config.rs
//! Конфигурация генерации острова
//!
//! Этот модуль определяет параметры, управляющие генерацией гексагональной карты:
//! - Радиус сетки и уровень воды
//! - Количество городов
//! - Стратегию назначения биомов
//! - Параметры шума высот
//!
//! Настройки живут в двух формах. [`MapSettings`] — «сырой» вид, читаемый из TOML,
//! где сид и уровень воды могут быть не заданы. [`MapConfig`] — проверенный и
//! разрешённый вид: все значения конкретны, и только из него можно построить
//! поставщик высот.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, MapGenError};

/// Уровень воды по умолчанию
pub const DEFAULT_WATER_LEVEL: f32 = -0.4;

/// Максимальный поддерживаемый радиус карты
pub const MAX_RADIUS: u32 = 4096;

/// Стратегия назначения биомов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BiomeStrategy {
    /// Биом по высоте тайла и его соседей
    #[default]
    HeightBased,
    /// Связные области «особого» шума получают один случайный биом на всю область,
    /// остальные тайлы классифицируются по высоте
    RegionGrown,
}

/// Параметры шума высот
///
/// Управляет формой острова: частотой рельефа и тем, насколько быстро высота
/// спадает к краю карты.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoiseSettings {
    /// Частота базового шума на единицу расстояния между центрами гексов
    #[serde(default = "default_frequency")]
    pub frequency: f32,

    /// Количество октав FBm
    #[serde(default = "default_octaves")]
    pub octaves: i32,

    /// Сила спада высоты к краю:
    /// - `0.0` — без спада (шум без силуэта острова),
    /// - `1.0` — край карты опускается на единицу,
    /// - `>1.0` — более резкий обрыв к океану.
    #[serde(default = "default_falloff")]
    pub falloff: f32,

    /// Порог «особого» канала шума для стратегии `RegionGrown`
    #[serde(default = "default_special_threshold")]
    pub special_threshold: f32,
}

fn default_frequency() -> f32 {
    0.08
}
fn default_octaves() -> i32 {
    4
}
fn default_falloff() -> f32 {
    1.4
}
fn default_special_threshold() -> f32 {
    0.55
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            frequency: 0.08,
            octaves: 4,
            falloff: 1.4,
            special_threshold: 0.55,
        }
    }
}

/// Отладочные флаги. Ядро их только переносит, смысл им придаёт рендерер.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DebugFlags {
    #[serde(default)]
    pub show_coordinates: bool,
    #[serde(default)]
    pub show_heights: bool,
}

/// Параметры генерации в том виде, в котором они приходят из файла
///
/// Поддерживает загрузку из TOML-файлов. Целые поля знаковые, чтобы
/// отрицательные значения из файла не терялись при разборе, а отклонялись
/// проверкой в [`MapSettings::resolve`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapSettings {
    /// Сид генератора. Если не задан, выбирается случайно при разрешении.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Радиус карты в гексах (по умолчанию 20)
    #[serde(default = "default_radius")]
    pub radius: i64,

    /// Вертикальный масштаб для рендерера
    #[serde(default = "default_depth_scale")]
    pub depth_scale: f32,

    /// Сколько городов нужно разместить (по умолчанию 5)
    #[serde(default = "default_total_towns")]
    pub total_towns: i64,

    /// Назначать ли биомы (иначе вся суша — `Grassland`)
    #[serde(default = "default_generate_biomes")]
    pub generate_biomes: bool,

    /// Порог воды: высота `<=` порога — вода. По умолчанию `-0.4`.
    #[serde(default)]
    pub water_level: Option<f32>,

    #[serde(default)]
    pub biome_strategy: BiomeStrategy,

    #[serde(default)]
    pub noise: NoiseSettings,

    #[serde(default)]
    pub debug: DebugFlags,
}

fn default_radius() -> i64 {
    20
}
fn default_depth_scale() -> f32 {
    1.0
}
fn default_total_towns() -> i64 {
    5
}
fn default_generate_biomes() -> bool {
    true
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            seed: None,
            radius: 20,
            depth_scale: 1.0,
            total_towns: 5,
            generate_biomes: true,
            water_level: None,
            biome_strategy: BiomeStrategy::HeightBased,
            noise: NoiseSettings::default(),
            debug: DebugFlags::default(),
        }
    }
}

impl MapSettings {
    /// Загружает параметры из TOML-файла
    ///
    /// # Пример
    /// ```toml
    /// # island.toml
    /// seed = 42
    /// radius = 12
    /// total_towns = 4
    /// biome_strategy = "RegionGrown"
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, MapGenError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| MapGenError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, MapGenError> {
        Ok(toml::from_str(contents)?)
    }

    /// Проверяет настройки и подставляет значения по умолчанию
    ///
    /// Незаданный сид заменяется случайным, и он попадает в журнал, чтобы карту
    /// можно было воспроизвести.
    pub fn resolve(&self) -> Result<MapConfig, ConfigError> {
        if self.radius < 0 {
            return Err(ConfigError::NegativeRadius(self.radius));
        }
        let radius = u32::try_from(self.radius)
            .ok()
            .filter(|r| *r <= MAX_RADIUS)
            .ok_or(ConfigError::RadiusTooLarge {
                value: self.radius,
                max: MAX_RADIUS,
            })?;

        if self.total_towns < 0 {
            return Err(ConfigError::NegativeTownCount(self.total_towns));
        }
        let total_towns = u32::try_from(self.total_towns)
            .map_err(|_| ConfigError::TownCountTooLarge(self.total_towns))?;

        let water_level = self.water_level.unwrap_or(DEFAULT_WATER_LEVEL);
        ensure_finite("water_level", water_level)?;
        ensure_finite("depth_scale", self.depth_scale)?;
        ensure_finite("noise.frequency", self.noise.frequency)?;
        ensure_finite("noise.falloff", self.noise.falloff)?;
        ensure_finite("noise.special_threshold", self.noise.special_threshold)?;

        let seed = match self.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::random::<u64>();
                tracing::info!(target: "islegen::config", seed, "Сид не задан, выбран случайный");
                seed
            }
        };

        Ok(MapConfig {
            radius,
            depth_scale: self.depth_scale,
            total_towns,
            generate_biomes: self.generate_biomes,
            water_level,
            seed,
            biome_strategy: self.biome_strategy,
            noise: self.noise.clone(),
            debug: self.debug,
        })
    }
}

fn ensure_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field, value })
    }
}

/// Разрешённая конфигурация: все значения конкретны и проверены
///
/// Создаётся только через [`MapSettings::resolve`], после этого не меняется.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MapConfig {
    pub(crate) radius: u32,
    pub(crate) depth_scale: f32,
    pub(crate) total_towns: u32,
    pub(crate) generate_biomes: bool,
    pub(crate) water_level: f32,
    pub(crate) seed: u64,
    pub(crate) biome_strategy: BiomeStrategy,
    pub(crate) noise: NoiseSettings,
    pub(crate) debug: DebugFlags,
}

impl MapConfig {
    #[must_use]
    pub fn radius(&self) -> u32 {
        self.radius
    }
    #[must_use]
    pub fn depth_scale(&self) -> f32 {
        self.depth_scale
    }
    #[must_use]
    pub fn total_towns(&self) -> u32 {
        self.total_towns
    }
    #[must_use]
    pub fn generate_biomes(&self) -> bool {
        self.generate_biomes
    }
    #[must_use]
    pub fn water_level(&self) -> f32 {
        self.water_level
    }
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
    #[must_use]
    pub fn biome_strategy(&self) -> BiomeStrategy {
        self.biome_strategy
    }
    #[must_use]
    pub fn noise(&self) -> &NoiseSettings {
        &self.noise
    }
    #[must_use]
    pub fn debug(&self) -> DebugFlags {
        self.debug
    }

    /// Начальный радиус зоны отчуждения городов
    #[must_use]
    pub fn initial_exclusion_radius(&self) -> u32 {
        self.radius.min(10)
    }
}
