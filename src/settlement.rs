// src/settlement.rs
//! Размещение городов
//!
//! Города ставятся раундами. В каждом раунде выбираются случайные тайлы суши,
//! и кандидат принимается, только если в радиусе отчуждения нет другого города.
//! Три раунда подряд без единого принятого кандидата сужают радиус на единицу;
//! когда радиус уходит ниже нуля, размещение заканчивается с тем, что успели
//! поставить.
//!
//! После каждого раунда вызывается [`Checkpoint`] — единственная точка, где
//! хост может передать управление другой работе или отменить размещение.

use std::ops::ControlFlow;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::grid::{MapDefinition, TileDefinition, TileType};
use crate::hex::AxialCoord;

/// Сколько пустых раундов допускается на одном радиусе
pub const MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacerState {
    /// Последний раунд поставил хотя бы один город
    Placing,
    /// Последний раунд был пустым, радиус пока не меняется
    Retrying,
    /// Пустых раундов набралось `MAX_RETRIES`, радиус сужается
    Relaxing,
    /// Радиус ушёл ниже нуля, больше ставить некуда
    Exhausted,
    /// Поставлено столько, сколько просили
    Done,
}

impl PlacerState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, PlacerState::Exhausted | PlacerState::Done)
    }
}

/// Сводка одного раунда, которую видит контрольная точка
#[derive(Debug, Clone)]
pub struct RoundReport {
    pub round: u32,
    /// Радиус, с которым проверялись кандидаты этого раунда
    pub exclusion_radius: u32,
    /// Города, поставленные в этом раунде, в порядке постановки
    pub accepted: Vec<AxialCoord>,
    pub placed: u32,
    pub requested: u32,
    pub retries: u32,
    pub state: PlacerState,
}

/// Точка кооперативной передачи управления между раундами
pub trait Checkpoint {
    fn round_finished(&mut self, report: &RoundReport) -> ControlFlow<()>;
}

impl<F> Checkpoint for F
where
    F: FnMut(&RoundReport) -> ControlFlow<()>,
{
    fn round_finished(&mut self, report: &RoundReport) -> ControlFlow<()> {
        self(report)
    }
}

/// Контрольная точка, которая всегда продолжает
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCheckpoint;

impl Checkpoint for NoCheckpoint {
    fn round_finished(&mut self, _report: &RoundReport) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementOutcome {
    pub requested: u32,
    /// Сколько городов реально стоит на карте. Именно это число авторитетно.
    pub placed: u32,
    pub rounds: u32,
    /// Радиус отчуждения на момент остановки; `None`, если он исчерпан
    pub final_exclusion_radius: Option<u32>,
    pub cancelled: bool,
}

impl PlacementOutcome {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.placed == self.requested
    }

    #[must_use]
    pub fn shortfall(&self) -> u32 {
        self.requested - self.placed
    }
}

/// Случайная выборка различных тайлов данного типа без возвращения
///
/// Длина результата не больше числа таких тайлов на карте.
pub fn sample_tiles<R>(
    map: &MapDefinition,
    tile_type: TileType,
    count: usize,
    rng: &mut R,
) -> Vec<TileDefinition>
where
    R: Rng + ?Sized,
{
    let pool: Vec<&TileDefinition> = map.tiles().filter(|t| t.tile_type == tile_type).collect();
    pool.choose_multiple(rng, count).map(|t| **t).collect()
}

struct Placer {
    requested: u32,
    placed: u32,
    /// `-1` означает, что радиус исчерпан
    exclusion_radius: i64,
    retries: u32,
    rounds: u32,
}

impl Placer {
    fn exclusion(&self) -> u32 {
        u32::try_from(self.exclusion_radius).unwrap_or(0)
    }

    /// Один раунд выборки и проверки кандидатов
    fn round<R>(&mut self, map: &mut MapDefinition, rng: &mut R) -> (PlacerState, Vec<AxialCoord>)
    where
        R: Rng + ?Sized,
    {
        self.rounds += 1;
        let exclusion = self.exclusion();
        let remaining = (self.requested - self.placed) as usize;

        let mut accepted = Vec::new();
        for candidate in sample_tiles(map, TileType::Land, remaining, rng) {
            let crowded = candidate
                .position
                .spiral(exclusion)
                .into_iter()
                .any(|c| map.get(c).is_some_and(|t| t.tile_type == TileType::Town));
            if crowded {
                continue;
            }
            if let Some(tile) = map.get_mut(candidate.position) {
                tile.tile_type = TileType::Town;
                accepted.push(candidate.position);
            }
        }
        self.placed += accepted.len() as u32;

        let state = if self.placed == self.requested {
            PlacerState::Done
        } else if !accepted.is_empty() {
            PlacerState::Placing
        } else {
            self.retries += 1;
            if self.retries >= MAX_RETRIES {
                PlacerState::Relaxing
            } else {
                PlacerState::Retrying
            }
        };
        (state, accepted)
    }

    fn relax(&mut self) -> PlacerState {
        self.exclusion_radius -= 1;
        self.retries = 0;
        if self.exclusion_radius < 0 {
            PlacerState::Exhausted
        } else {
            PlacerState::Placing
        }
    }
}

/// Ставит до `count_needed` городов на сушу карты
///
/// Начальный радиус отчуждения — `min(radius, 10)`. Цикл заканчивается
/// успехом, исчерпанием радиуса или отменой в контрольной точке; число
/// раундов ограничено сверху `count_needed + MAX_RETRIES * (радиус + 1)`.
pub fn place_settlements<R, C>(
    map: &mut MapDefinition,
    count_needed: u32,
    rng: &mut R,
    checkpoint: &mut C,
) -> PlacementOutcome
where
    R: Rng + ?Sized,
    C: Checkpoint + ?Sized,
{
    let initial = map.config.initial_exclusion_radius();
    let mut placer = Placer {
        requested: count_needed,
        placed: 0,
        exclusion_radius: i64::from(initial),
        retries: 0,
        rounds: 0,
    };

    let mut state = if count_needed == 0 {
        PlacerState::Done
    } else {
        PlacerState::Placing
    };
    let mut cancelled = false;

    while !state.is_terminal() {
        let exclusion = placer.exclusion();
        let (state_after_round, accepted) = placer.round(map, rng);
        let retries = placer.retries;
        state = state_after_round;
        if state == PlacerState::Relaxing {
            tracing::debug!(
                target: "islegen::settlement",
                exclusion_radius = exclusion,
                "Радиус отчуждения сужается"
            );
            // Хост видит Relaxing за этот раунд, следующий раунд идёт уже на новом радиусе
            if placer.relax().is_terminal() {
                state = PlacerState::Exhausted;
            }
        }

        if state.is_terminal() {
            break;
        }

        let report = RoundReport {
            round: placer.rounds,
            exclusion_radius: exclusion,
            accepted,
            placed: placer.placed,
            requested: placer.requested,
            retries,
            state,
        };
        tracing::trace!(
            target: "islegen::settlement",
            round = report.round,
            placed = report.placed,
            exclusion_radius = report.exclusion_radius,
            ?state,
            "Раунд размещения завершён"
        );
        if checkpoint.round_finished(&report).is_break() {
            cancelled = true;
            break;
        }
    }

    let outcome = PlacementOutcome {
        requested: count_needed,
        placed: placer.placed,
        rounds: placer.rounds,
        final_exclusion_radius: u32::try_from(placer.exclusion_radius).ok(),
        cancelled,
    };

    if outcome.is_complete() {
        tracing::info!(
            target: "islegen::settlement",
            placed = outcome.placed,
            rounds = outcome.rounds,
            "Все города размещены"
        );
    } else {
        tracing::warn!(
            target: "islegen::settlement",
            placed = outcome.placed,
            requested = outcome.requested,
            shortfall = outcome.shortfall(),
            cancelled,
            "Размещено меньше городов, чем запрошено"
        );
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapSettings;
    use crate::grid::build_grid;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn land_map(radius: i64) -> MapDefinition {
        let cfg = MapSettings {
            seed: Some(1),
            radius,
            ..MapSettings::default()
        }
        .resolve()
        .unwrap();
        build_grid(&cfg, &|_: AxialCoord| 0.5_f32).unwrap()
    }

    #[test]
    fn zero_towns_means_zero_rounds() {
        let mut map = land_map(4);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut calls = 0;
        let mut checkpoint = |_: &RoundReport| {
            calls += 1;
            ControlFlow::Continue(())
        };
        let outcome = place_settlements(&mut map, 0, &mut rng, &mut checkpoint);
        assert_eq!(outcome.placed, 0);
        assert_eq!(outcome.rounds, 0);
        assert!(outcome.is_complete());
        assert_eq!(calls, 0);
        assert_eq!(map.count(TileType::Town), 0);
    }

    #[test]
    fn towns_respect_spacing_at_placement_time() {
        let mut map = land_map(12);
        let mut rng = ChaCha8Rng::seed_from_u64(77);
        let mut placed: Vec<AxialCoord> = Vec::new();
        let mut last_count = 0;
        let mut checkpoint = |report: &RoundReport| {
            assert!(report.placed >= last_count);
            last_count = report.placed;
            for &town in &report.accepted {
                for &earlier in &placed {
                    assert!(town.distance(earlier) > report.exclusion_radius);
                }
                placed.push(town);
            }
            ControlFlow::Continue(())
        };
        let outcome = place_settlements(&mut map, 6, &mut rng, &mut checkpoint);
        assert_eq!(map.count(TileType::Town) as u32, outcome.placed);
        assert!(outcome.placed <= 6);
    }

    #[test]
    fn too_many_towns_exhausts_the_radius() {
        let mut map = land_map(2);
        let land = map.count(TileType::Land) as u32;
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let outcome = place_settlements(&mut map, land + 5, &mut rng, &mut NoCheckpoint);

        assert!(outcome.placed < outcome.requested);
        assert_eq!(outcome.final_exclusion_radius, None);
        assert!(!outcome.cancelled);
        // На нулевом радиусе занимается вся суша
        assert_eq!(outcome.placed, land);
        assert_eq!(map.count(TileType::Land), 0);
        assert!(outcome.rounds <= outcome.requested + MAX_RETRIES * 3);
    }

    #[test]
    fn no_land_at_all_still_terminates() {
        let cfg = MapSettings {
            seed: Some(1),
            radius: 3,
            ..MapSettings::default()
        }
        .resolve()
        .unwrap();
        let mut map = build_grid(&cfg, &|_: AxialCoord| -1.0_f32).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let outcome = place_settlements(&mut map, 2, &mut rng, &mut NoCheckpoint);
        assert_eq!(outcome.placed, 0);
        assert_eq!(outcome.rounds, MAX_RETRIES * 4);
    }

    #[test]
    fn host_sees_relaxing_before_radius_shrinks() {
        use PlacerState::{Relaxing, Retrying};

        let cfg = MapSettings {
            seed: Some(1),
            radius: 2,
            ..MapSettings::default()
        }
        .resolve()
        .unwrap();
        let mut map = build_grid(&cfg, &|_: AxialCoord| -1.0_f32).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut seen = Vec::new();
        let mut checkpoint = |report: &RoundReport| {
            seen.push((report.exclusion_radius, report.retries, report.state));
            ControlFlow::Continue(())
        };
        let outcome = place_settlements(&mut map, 2, &mut rng, &mut checkpoint);

        assert_eq!(
            seen,
            vec![
                (2, 1, Retrying),
                (2, 2, Retrying),
                (2, 3, Relaxing),
                (1, 1, Retrying),
                (1, 2, Retrying),
                (1, 3, Relaxing),
                (0, 1, Retrying),
                (0, 2, Retrying),
            ]
        );
        assert_eq!(outcome.rounds, 9);
        assert_eq!(outcome.final_exclusion_radius, None);
    }

    #[test]
    fn checkpoint_can_cancel_between_rounds() {
        let mut map = land_map(6);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut checkpoint = |_: &RoundReport| ControlFlow::Break(());
        let outcome = place_settlements(&mut map, 50, &mut rng, &mut checkpoint);
        assert!(outcome.cancelled);
        assert_eq!(outcome.rounds, 1);
        assert_eq!(map.count(TileType::Town) as u32, outcome.placed);
    }

    #[test]
    fn single_tile_island_gets_its_town() {
        let mut map = land_map(0);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let outcome = place_settlements(&mut map, 1, &mut rng, &mut NoCheckpoint);
        assert_eq!(outcome.placed, 1);
        assert_eq!(map.towns(), vec![AxialCoord::ORIGIN]);
    }

    #[test]
    fn sampling_is_distinct_and_bounded() {
        let map = land_map(3);
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let sample = sample_tiles(&map, TileType::Land, 10, &mut rng);
        let unique: HashSet<_> = sample.iter().map(|t| t.position).collect();
        assert_eq!(sample.len(), 10);
        assert_eq!(unique.len(), 10);

        let all = sample_tiles(&map, TileType::Land, 1000, &mut rng);
        assert_eq!(all.len(), 37);
        assert!(sample_tiles(&map, TileType::Town, 3, &mut rng).is_empty());
    }
}
