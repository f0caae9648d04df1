// src/island.rs
//! Отсечение всего, что не связано с центральным островом
//!
//! Заливка в ширину от (0, 0) по высотам поставщика: тайл выше уровня воды
//! достижим и расширяет фронт, тайл на уровне воды или ниже — барьер.
//! После обхода вся недостигнутая суша становится водой.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::biome::Biome;
use crate::error::MapGenError;
use crate::grid::{MapDefinition, TileType};
use crate::hex::AxialCoord;
use crate::noise::{HeightSampler, sample_height};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reach {
    Reachable,
    Blocked,
}

/// Оставляет на карте только сушу, связанную с центром
///
/// Центр считается достижимым без проверки высоты. Возвращает количество
/// тайлов, превращённых из суши в воду. Повторный вызов ничего не меняет.
pub fn filter_island<S>(map: &mut MapDefinition, sampler: &S) -> Result<usize, MapGenError>
where
    S: HeightSampler + ?Sized,
{
    let water_level = map.config.water_level();
    let mut reach: HashMap<AxialCoord, Reach> = HashMap::new();
    let mut queue = VecDeque::new();

    reach.insert(AxialCoord::ORIGIN, Reach::Reachable);
    queue.push_back(AxialCoord::ORIGIN);

    while let Some(current) = queue.pop_front() {
        for neighbor in current.neighbors() {
            if !map.contains(neighbor) || reach.contains_key(&neighbor) {
                continue;
            }
            if sample_height(sampler, neighbor)? <= water_level {
                reach.insert(neighbor, Reach::Blocked);
            } else {
                reach.insert(neighbor, Reach::Reachable);
                queue.push_back(neighbor);
            }
        }
    }

    let mut demoted = 0;
    for tile in map.tiles_mut() {
        if tile.tile_type == TileType::Land
            && reach.get(&tile.position) != Some(&Reach::Reachable)
        {
            tile.tile_type = TileType::Water;
            tile.biome = Biome::Water;
            demoted += 1;
        }
    }

    tracing::debug!(
        target: "islegen::island",
        reachable = reach.values().filter(|r| **r == Reach::Reachable).count(),
        demoted,
        "Отсечены оторванные участки суши"
    );
    Ok(demoted)
}

/// Координаты, достижимые из центра по тайлам, которые не являются водой
///
/// Обход, как и в [`filter_island`], начинается с центра без проверки;
/// сам центр входит в результат, только если он не вода.
#[must_use]
pub fn reachable_from_origin(map: &MapDefinition) -> HashSet<AxialCoord> {
    let passable = |coord: AxialCoord| {
        map.get(coord)
            .is_some_and(|tile| tile.tile_type != TileType::Water)
    };

    let mut visited = HashSet::from([AxialCoord::ORIGIN]);
    let mut queue = VecDeque::from([AxialCoord::ORIGIN]);
    while let Some(current) = queue.pop_front() {
        for neighbor in current.neighbors() {
            if passable(neighbor) && visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    if !passable(AxialCoord::ORIGIN) {
        visited.remove(&AxialCoord::ORIGIN);
    }
    visited
}
