// src/error.rs
//! Ошибки генерации карты
//!
//! Все сбои стадий пробрасываются наверх без восстановления: либо вызывающий
//! получает полную карту, удовлетворяющую инвариантам, либо ошибку.
//! Нехватка городов ошибкой не считается, см. [`crate::settlement::PlacementOutcome`].

use std::path::PathBuf;

use thiserror::Error;

use crate::hex::AxialCoord;

/// Дефект конфигурации, обнаруженный до начала работы с тайлами
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("map radius must be non-negative, got {0}")]
    NegativeRadius(i64),
    #[error("map radius {value} exceeds the supported maximum {max}")]
    RadiusTooLarge { value: i64, max: u32 },
    #[error("total_towns must be non-negative, got {0}")]
    NegativeTownCount(i64),
    #[error("total_towns {0} is too large")]
    TownCountTooLarge(i64),
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f32 },
}

#[derive(Debug, Error)]
pub enum MapGenError {
    #[error("invalid map configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Нарушен контракт поставщика высот
    #[error("height sampler returned non-finite value {value} at {coord}")]
    NonFiniteHeight { coord: AxialCoord, value: f32 },

    #[error("failed to read map settings from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse map settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to export map: {0}")]
    Export(#[from] serde_json::Error),

    #[error("failed to write map to {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = MapGenError> = std::result::Result<T, E>;
