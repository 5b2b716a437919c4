//! A* pathfinding over the tile grid
//!
//! Each search runs on a snapshot: the static grid plus the tiles occupied by
//! every other entity at the moment the search starts. Movement is
//! 4-directional with a weighted Euclidean heuristic.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::AHashMap;
use ordered_float::OrderedFloat;
use rand::Rng;

use crate::core::types::{EntityId, TileCoord};
use crate::movement::entity::MovingEntity;
use crate::spatial::collidable::Collidable;
use crate::spatial::grid::Grid;
use crate::world::grid::WorldGrid;

/// Blocking flags for one planning call
#[derive(Debug, Clone, PartialEq)]
pub struct WalkabilityGrid {
    blocked: Grid<bool>,
}

impl WalkabilityGrid {
    /// Static obstacles only
    pub fn from_world(world: &WorldGrid) -> Self {
        Self {
            blocked: world.walkability(),
        }
    }

    /// Static obstacles plus every tile occupied by an entity other than
    /// `requester`
    pub fn snapshot<'a, I>(world: &WorldGrid, requester: EntityId, entities: I) -> Self
    where
        I: IntoIterator<Item = &'a MovingEntity>,
    {
        let mut grid = Self::from_world(world);
        for entity in entities.into_iter().filter(|e| e.id != requester) {
            for tile in entity.occupied_tiles() {
                grid.block(tile);
            }
        }
        grid
    }

    pub fn block(&mut self, coord: TileCoord) {
        self.blocked.set(coord, true);
    }

    pub fn clear(&mut self, coord: TileCoord) {
        self.blocked.set(coord, false);
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        self.blocked.contains(coord)
    }

    /// In bounds and not blocked
    pub fn is_walkable(&self, coord: TileCoord) -> bool {
        matches!(self.blocked.get(coord), Some(false))
    }
}

/// Node in the A* open set
#[derive(Debug, Clone)]
struct PathNode {
    coord: TileCoord,
    g_cost: f32,
    f_cost: OrderedFloat<f32>,
    h_cost: OrderedFloat<f32>,
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; ties go to the node nearer the goal,
        // then to the smaller coordinate so results never depend on hashing
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.h_cost.cmp(&self.h_cost))
            .then_with(|| other.coord.cmp(&self.coord))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Plan a path for `requester` from `from` to `to`
///
/// Other entities' occupied tiles are blocked; `from` and `to` are always
/// cleared so the requester is never trapped by its own footprint. The
/// returned path excludes `from` and ends at `to`. Returns `None` when either
/// end is outside the world or no path exists.
pub fn find_path<'a, I>(
    world: &WorldGrid,
    from: TileCoord,
    to: TileCoord,
    requester: EntityId,
    entities: I,
    heuristic_weight: f32,
) -> Option<Vec<TileCoord>>
where
    I: IntoIterator<Item = &'a MovingEntity>,
{
    if !world.contains(from) || !world.contains(to) {
        tracing::debug!("{} requested path {} -> {} outside the world", requester, from, to);
        return None;
    }

    let mut walkability = WalkabilityGrid::snapshot(world, requester, entities);
    walkability.clear(from);
    walkability.clear(to);

    let path = search(&walkability, from, to, heuristic_weight);
    if path.is_none() {
        tracing::debug!("{} has no path {} -> {}", requester, from, to);
    }
    path
}

/// Run A* on a prepared walkability grid
pub fn search(
    walkability: &WalkabilityGrid,
    from: TileCoord,
    to: TileCoord,
    heuristic_weight: f32,
) -> Option<Vec<TileCoord>> {
    if !walkability.is_walkable(from) || !walkability.is_walkable(to) {
        return None;
    }
    if from == to {
        return Some(Vec::new());
    }

    let heuristic = |coord: TileCoord| heuristic_weight * coord.euclidean(to);

    let mut open_set = BinaryHeap::new();
    let mut came_from: AHashMap<TileCoord, TileCoord> = AHashMap::new();
    let mut g_scores: AHashMap<TileCoord, f32> = AHashMap::new();

    g_scores.insert(from, 0.0);
    open_set.push(PathNode {
        coord: from,
        g_cost: 0.0,
        f_cost: OrderedFloat(heuristic(from)),
        h_cost: OrderedFloat(heuristic(from)),
    });

    while let Some(current) = open_set.pop() {
        if current.coord == to {
            return Some(reconstruct_path(&came_from, from, to));
        }

        let current_g = *g_scores.get(&current.coord).unwrap_or(&f32::INFINITY);

        // Skip stale heap entries
        if current.g_cost > current_g {
            continue;
        }

        for neighbor in current.coord.neighbors() {
            if !walkability.is_walkable(neighbor) {
                continue;
            }

            let tentative_g = current_g + 1.0;
            let neighbor_g = *g_scores.get(&neighbor).unwrap_or(&f32::INFINITY);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.coord);
                g_scores.insert(neighbor, tentative_g);

                let h = heuristic(neighbor);
                open_set.push(PathNode {
                    coord: neighbor,
                    g_cost: tentative_g,
                    f_cost: OrderedFloat(tentative_g + h),
                    h_cost: OrderedFloat(h),
                });
            }
        }
    }

    None
}

/// Walk `came_from` back to the start; the start itself is left out
fn reconstruct_path(
    came_from: &AHashMap<TileCoord, TileCoord>,
    from: TileCoord,
    to: TileCoord,
) -> Vec<TileCoord> {
    let mut path = vec![to];
    let mut current = to;
    while let Some(&prev) = came_from.get(&current) {
        if prev == from {
            break;
        }
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Pick a uniformly random free tile of the static grid
///
/// Samples with rejection first; on a nearly full grid falls back to choosing
/// among the remaining free tiles. Returns `None` only if every tile blocks.
pub fn random_free_tile(world: &WorldGrid, rng: &mut impl Rng) -> Option<TileCoord> {
    let (width, height) = (world.width(), world.height());
    if width == 0 || height == 0 {
        return None;
    }

    for _ in 0..width * height * 4 {
        let coord = TileCoord::new(rng.gen_range(0..width) as i32, rng.gen_range(0..height) as i32);
        if !world.is_blocked(coord) {
            return Some(coord);
        }
    }

    let free: Vec<TileCoord> = (0..height as i32)
        .flat_map(|y| (0..width as i32).map(move |x| TileCoord::new(x, y)))
        .filter(|&coord| !world.is_blocked(coord))
        .collect();
    if free.is_empty() {
        None
    } else {
        Some(free[rng.gen_range(0..free.len())])
    }
}
