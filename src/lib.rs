pub mod biome;
pub mod config;
pub mod error;
pub mod generator;
pub mod grid;
pub mod hex;
pub mod island;
pub mod noise;
pub mod settlement;

pub use biome::{Biome, BiomeClassifier};
pub use config::{BiomeStrategy, MapConfig, MapSettings};
pub use error::{ConfigError, MapGenError};
pub use generator::{GeneratedMap, generate_map, generate_with};
pub use grid::{MapDefinition, TileDefinition, TileType};
pub use hex::AxialCoord;
pub use noise::{DecayingNoise, HeightSampler};
pub use settlement::{Checkpoint, NoCheckpoint, PlacementOutcome, RoundReport};
