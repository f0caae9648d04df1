// src/hex.rs
//! Гексагональные координаты
//!
//! Осевая система (x, z) с неявной кубической осью `y = -x - z`.
//! Соседство, кольца и спирали считаются так же, как в кубических координатах:
//! расстояние между двумя гексами равно `max(|dx|, |dy|, |dz|)`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Шесть направлений к соседям в осевых координатах, по кругу
pub const DIRECTIONS: [AxialCoord; 6] = [
    AxialCoord::new(1, 0),
    AxialCoord::new(1, -1),
    AxialCoord::new(0, -1),
    AxialCoord::new(-1, 0),
    AxialCoord::new(-1, 1),
    AxialCoord::new(0, 1),
];

/// Координата гекса на сетке
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AxialCoord {
    pub x: i32,
    pub z: i32,
}

impl AxialCoord {
    pub const ORIGIN: AxialCoord = AxialCoord::new(0, 0);

    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Неявная третья кубическая ось
    #[must_use]
    pub const fn y(self) -> i32 {
        -self.x - self.z
    }

    /// Строковый ключ вида `"x:z"` для хостов, которым нужен текстовый индекс
    #[must_use]
    pub fn key(self) -> String {
        format!("{}:{}", self.x, self.z)
    }

    #[must_use]
    pub fn distance(self, other: AxialCoord) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dz = (self.z - other.z).unsigned_abs();
        let dy = (self.y() - other.y()).unsigned_abs();
        dx.max(dy).max(dz)
    }

    #[must_use]
    pub fn distance_from_origin(self) -> u32 {
        self.distance(Self::ORIGIN)
    }

    #[must_use]
    pub fn offset(self, dir: AxialCoord, steps: i32) -> Self {
        Self::new(self.x + dir.x * steps, self.z + dir.z * steps)
    }

    /// Шесть непосредственных соседей
    pub fn neighbors(self) -> impl Iterator<Item = AxialCoord> {
        DIRECTIONS.into_iter().map(move |d| self.offset(d, 1))
    }

    /// Все гексы ровно на расстоянии `radius`.
    ///
    /// Для `radius == 0` возвращает только сам гекс; для `radius > 0` сам гекс
    /// в кольцо не входит.
    #[must_use]
    pub fn ring(self, radius: u32) -> Vec<AxialCoord> {
        if radius == 0 {
            return vec![self];
        }
        let steps = radius as i32;
        let mut result = Vec::with_capacity(6 * radius as usize);
        let mut hex = self.offset(DIRECTIONS[4], steps);
        for dir in DIRECTIONS {
            for _ in 0..steps {
                result.push(hex);
                hex = hex.offset(dir, 1);
            }
        }
        result
    }

    /// Все гексы на расстоянии не больше `radius`, начиная с центра
    #[must_use]
    pub fn spiral(self, radius: u32) -> Vec<AxialCoord> {
        let mut result = Vec::with_capacity(hex_count(radius));
        result.push(self);
        for r in 1..=radius {
            result.extend(self.ring(r));
        }
        result
    }

    /// Центр гекса на плоскости (pointy-top, единичный размер)
    #[must_use]
    pub fn to_planar(self) -> (f32, f32) {
        let x = self.x as f32;
        let z = self.z as f32;
        (3f32.sqrt() * (x + z / 2.0), 1.5 * z)
    }
}

impl fmt::Display for AxialCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Количество гексов в диске радиуса `radius`: `3R² + 3R + 1`
#[must_use]
pub fn hex_count(radius: u32) -> usize {
    let r = radius as usize;
    3 * r * r + 3 * r + 1
}

/// Обход диска вокруг начала координат двойным циклом по x и z.
///
/// Порядок совпадает с порядком построения сетки: внешний цикл по x,
/// внутренний по z в пределах `max(-R, -x-R)..=min(R, -x+R)`.
pub fn disc(radius: u32) -> impl Iterator<Item = AxialCoord> {
    let r = radius as i32;
    (-r..=r).flat_map(move |x| {
        let lo = (-r).max(-x - r);
        let hi = r.min(-x + r);
        (lo..=hi).map(move |z| AxialCoord::new(x, z))
    })
}
