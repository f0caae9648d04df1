// src/noise.rs
//! Шум высот для гексагональной карты
//!
//! [`HeightSampler`] — шов между ядром генерации и источником высот. Ядро только
//! вызывает `height(coord)` и ничего не знает о реализации; по умолчанию
//! используется [`DecayingNoise`], затухающий к краю карты шум, который вырезает
//! силуэт острова.

use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};

use crate::config::MapConfig;
use crate::error::MapGenError;
use crate::hex::AxialCoord;

/// Детерминированный источник высот
///
/// Для одной и той же координаты обязан возвращать одно и то же значение.
pub trait HeightSampler {
    fn height(&self, coord: AxialCoord) -> f32;
}

impl<F> HeightSampler for F
where
    F: Fn(AxialCoord) -> f32,
{
    fn height(&self, coord: AxialCoord) -> f32 {
        self(coord)
    }
}

/// Запрашивает высоту и проверяет контракт поставщика
///
/// Нечисловая высота — фатальная ошибка, повторных попыток нет.
pub fn sample_height<S>(sampler: &S, coord: AxialCoord) -> Result<f32, MapGenError>
where
    S: HeightSampler + ?Sized,
{
    let value = sampler.height(coord);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MapGenError::NonFiniteHeight { coord, value })
    }
}

/// Сворачивает 64-битный сид в 32-битный для `FastNoiseLite`
fn noise_seed(seed: u64) -> i32 {
    (seed ^ (seed >> 32)) as i32
}

/// Затухающий шум: FBm по центрам гексов минус радиальный спад
///
/// Значения лежат в `[-1.0, 1.0]`.
pub struct DecayingNoise {
    noise: FastNoiseLite,
    radius: u32,
    falloff: f32,
}

impl DecayingNoise {
    #[must_use]
    pub fn new(config: &MapConfig) -> Self {
        let settings = config.noise();
        let mut noise = FastNoiseLite::new();
        noise.set_seed(Some(noise_seed(config.seed())));
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_fractal_type(Some(FractalType::FBm));
        noise.set_fractal_octaves(Some(settings.octaves));
        noise.set_frequency(Some(settings.frequency));

        Self {
            noise,
            radius: config.radius(),
            falloff: settings.falloff,
        }
    }
}

impl HeightSampler for DecayingNoise {
    fn height(&self, coord: AxialCoord) -> f32 {
        let (px, pz) = coord.to_planar();
        let base = self.noise.get_noise_2d(px, pz);

        // Нормированное расстояние до центра: 0 в центре, 1 на краю
        let t = if self.radius == 0 {
            0.0
        } else {
            coord.distance_from_origin() as f32 / self.radius as f32
        };

        // Небольшой подъём, чтобы центр чаще оказывался сушей
        (base + 0.3 - self.falloff * t * t).clamp(-1.0, 1.0)
    }
}

/// Независимый канал шума для «особых» биомов
///
/// Не затухает к краю: особые области могут появиться где угодно на суше.
pub struct SpecialBiomeNoise {
    noise: FastNoiseLite,
    threshold: f32,
}

impl SpecialBiomeNoise {
    #[must_use]
    pub fn new(config: &MapConfig) -> Self {
        let settings = config.noise();
        let mut noise = FastNoiseLite::new();
        noise.set_seed(Some(noise_seed(config.seed().wrapping_add(1_000_000))));
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(settings.frequency * 1.5));

        Self {
            noise,
            threshold: settings.special_threshold,
        }
    }

    #[must_use]
    pub fn value(&self, coord: AxialCoord) -> f32 {
        let (px, pz) = coord.to_planar();
        self.noise.get_noise_2d(px, pz)
    }

    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapSettings;
    use crate::hex::disc;

    fn config(radius: i64, seed: u64) -> MapConfig {
        MapSettings {
            seed: Some(seed),
            radius,
            ..MapSettings::default()
        }
        .resolve()
        .unwrap()
    }

    #[test]
    fn decaying_noise_is_bounded_and_deterministic() {
        let cfg = config(12, 1234);
        let a = DecayingNoise::new(&cfg);
        let b = DecayingNoise::new(&cfg);
        for coord in disc(12) {
            let h = a.height(coord);
            assert!((-1.0..=1.0).contains(&h), "{coord}: {h}");
            assert_eq!(h.to_bits(), b.height(coord).to_bits());
        }
    }

    #[test]
    fn edge_is_lower_than_center_on_average() {
        let cfg = config(16, 77);
        let noise = DecayingNoise::new(&cfg);
        let mean = |coords: Vec<AxialCoord>| {
            coords.iter().map(|c| noise.height(*c)).sum::<f32>() / coords.len() as f32
        };
        let inner = mean(AxialCoord::ORIGIN.spiral(3));
        let rim = mean(AxialCoord::ORIGIN.ring(16));
        assert!(rim < inner);
        assert!(rim < -0.4);
    }

    #[test]
    fn radius_zero_has_no_falloff() {
        let cfg = config(0, 5);
        let noise = DecayingNoise::new(&cfg);
        let h = noise.height(AxialCoord::ORIGIN);
        assert!(h.is_finite());
    }

    #[test]
    fn non_finite_heights_are_reported() {
        let broken = |_: AxialCoord| f32::NAN;
        let err = sample_height(&broken, AxialCoord::new(1, -1)).unwrap_err();
        assert!(matches!(
            err,
            MapGenError::NonFiniteHeight { coord, .. } if coord == AxialCoord::new(1, -1)
        ));
    }
}
