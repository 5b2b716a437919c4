//! Incremental tile streaming around the viewport
//!
//! The streamer keeps a registry of live tiles. When the render area changes
//! it evicts every tile that left the area and instantiates every in-bounds
//! tile that entered it, reporting each through a `TilePresenter`.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{TileCoord, Vector2};
use crate::render::camera::Viewport;
use crate::world::grid::WorldGrid;
use crate::world::tile::Tile;

/// Inclusive rectangle of tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderArea {
    pub start: TileCoord,
    pub end: TileCoord,
}

impl RenderArea {
    pub fn new(start: TileCoord, end: TileCoord) -> Self {
        Self { start, end }
    }

    /// Area covering the viewport around `center` plus `margin` tiles on every
    /// side
    ///
    /// Saturates instead of overflowing when the viewport spans more tiles than
    /// `i32` can address.
    pub fn around(center: Vector2, viewport: &Viewport, margin: i32) -> Self {
        let (columns, rows) = viewport.tiles_visible();
        let half_x = (columns.saturating_add(1) / 2).saturating_add(margin);
        let half_y = (rows.saturating_add(1) / 2).saturating_add(margin);
        let center = center.tile();
        Self {
            start: TileCoord::new(center.x.saturating_sub(half_x), center.y.saturating_sub(half_y)),
            end: TileCoord::new(center.x.saturating_add(half_x), center.y.saturating_add(half_y)),
        }
    }

    /// Part of the area inside a `width` x `height` grid
    pub fn clamped_to(&self, width: usize, height: usize) -> Option<Self> {
        let max_x = i32::try_from(width).unwrap_or(i32::MAX).checked_sub(1)?;
        let max_y = i32::try_from(height).unwrap_or(i32::MAX).checked_sub(1)?;
        let start = TileCoord::new(self.start.x.max(0), self.start.y.max(0));
        let end = TileCoord::new(self.end.x.min(max_x), self.end.y.min(max_y));
        (start.x <= end.x && start.y <= end.y).then(|| Self::new(start, end))
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        coord.x >= self.start.x && coord.x <= self.end.x && coord.y >= self.start.y && coord.y <= self.end.y
    }

    /// Every coordinate in the area, row by row
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> {
        let (start, end) = (self.start, self.end);
        (start.y..=end.y).flat_map(move |y| (start.x..=end.x).map(move |x| TileCoord::new(x, y)))
    }
}

/// Presentation-layer side effects of streaming
pub trait TilePresenter {
    fn instantiate(&mut self, tile: &Tile);
    fn destroy(&mut self, tile: &Tile);
}

/// Presenter that draws nothing, for headless runs
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl TilePresenter for NullPresenter {
    fn instantiate(&mut self, _tile: &Tile) {}
    fn destroy(&mut self, _tile: &Tile) {}
}

/// Counts of one applied area change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDelta {
    pub spawned: usize,
    pub evicted: usize,
}

impl StreamDelta {
    pub fn is_empty(&self) -> bool {
        self.spawned == 0 && self.evicted == 0
    }
}

/// Owner of the live tile registry
#[derive(Debug, Clone, Default)]
pub struct WorldStreamer {
    registry: AHashMap<TileCoord, Tile>,
    last_area: Option<RenderArea>,
}

impl WorldStreamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last area applied, if any
    pub fn area(&self) -> Option<RenderArea> {
        self.last_area
    }

    /// Apply `area`
    ///
    /// Does nothing without a grid or when `area` equals the last applied one.
    /// Afterwards the registry holds exactly the in-bounds coordinates of
    /// `area`.
    pub fn update_render_area<P: TilePresenter>(
        &mut self,
        area: RenderArea,
        world: Option<&WorldGrid>,
        presenter: &mut P,
    ) -> StreamDelta {
        let Some(world) = world else {
            return StreamDelta::default();
        };
        if self.last_area == Some(area) {
            return StreamDelta::default();
        }

        let mut delta = StreamDelta::default();

        let leaving: Vec<TileCoord> = self
            .registry
            .keys()
            .copied()
            .filter(|&coord| !area.contains(coord))
            .collect();
        for coord in leaving {
            if let Some(tile) = self.registry.remove(&coord) {
                presenter.destroy(&tile);
                delta.evicted += 1;
            }
        }

        let visible = area.clamped_to(world.width(), world.height());
        for coord in visible.into_iter().flat_map(|visible| visible.coords()) {
            if self.registry.contains_key(&coord) {
                continue;
            }
            if let Some(tile) = world.tile(coord) {
                presenter.instantiate(&tile);
                self.registry.insert(coord, tile);
                delta.spawned += 1;
            }
        }

        self.last_area = Some(area);
        tracing::debug!(
            "render area {}..{}: {} spawned, {} evicted, {} live",
            area.start,
            area.end,
            delta.spawned,
            delta.evicted,
            self.registry.len()
        );
        delta
    }

    /// Live tile at `coord`
    pub fn element_at(&self, coord: TileCoord) -> Option<&Tile> {
        self.registry.get(&coord)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn live_coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.registry.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::tile::TileKind;

    /// Records every callback
    #[derive(Default)]
    struct Recorder {
        instantiated: Vec<TileCoord>,
        destroyed: Vec<TileCoord>,
    }

    impl TilePresenter for Recorder {
        fn instantiate(&mut self, tile: &Tile) {
            self.instantiated.push(tile.coord);
        }
        fn destroy(&mut self, tile: &Tile) {
            self.destroyed.push(tile.coord);
        }
    }

    fn area(x0: i32, y0: i32, x1: i32, y1: i32) -> RenderArea {
        RenderArea::new(TileCoord::new(x0, y0), TileCoord::new(x1, y1))
    }

    #[test]
    fn test_initial_area_spawns_every_tile() {
        let world = WorldGrid::open(10, 10);
        let mut streamer = WorldStreamer::new();
        let mut recorder = Recorder::default();

        let delta = streamer.update_render_area(area(0, 0, 4, 4), Some(&world), &mut recorder);

        assert_eq!(delta, StreamDelta { spawned: 25, evicted: 0 });
        assert_eq!(streamer.len(), 25);
        assert_eq!(recorder.instantiated.len(), 25);
    }

    #[test]
    fn test_same_area_is_noop() {
        let world = WorldGrid::open(10, 10);
        let mut streamer = WorldStreamer::new();
        streamer.update_render_area(area(0, 0, 4, 4), Some(&world), &mut NullPresenter);

        let mut recorder = Recorder::default();
        let delta = streamer.update_render_area(area(0, 0, 4, 4), Some(&world), &mut recorder);

        assert!(delta.is_empty());
        assert!(recorder.instantiated.is_empty());
        assert!(recorder.destroyed.is_empty());
    }

    #[test]
    fn test_shift_evicts_and_spawns_edges() {
        let world = WorldGrid::open(10, 10);
        let mut streamer = WorldStreamer::new();
        streamer.update_render_area(area(0, 0, 4, 4), Some(&world), &mut NullPresenter);

        let mut recorder = Recorder::default();
        let delta = streamer.update_render_area(area(1, 0, 5, 4), Some(&world), &mut recorder);

        assert_eq!(delta, StreamDelta { spawned: 5, evicted: 5 });
        assert!(recorder.destroyed.iter().all(|c| c.x == 0));
        assert!(recorder.instantiated.iter().all(|c| c.x == 5));
        assert!(streamer.element_at(TileCoord::new(0, 2)).is_none());
        assert!(streamer.element_at(TileCoord::new(5, 2)).is_some());
    }

    #[test]
    fn test_out_of_bounds_coords_are_skipped() {
        let world = WorldGrid::open(3, 3);
        let mut streamer = WorldStreamer::new();
        let delta = streamer.update_render_area(area(-2, -2, 1, 1), Some(&world), &mut NullPresenter);
        assert_eq!(delta.spawned, 4);
        assert!(streamer.live_coords().all(|c| world.contains(c)));
    }

    #[test]
    fn test_missing_world_is_noop() {
        let mut streamer = WorldStreamer::new();
        let delta = streamer.update_render_area(area(0, 0, 4, 4), None, &mut NullPresenter);
        assert!(delta.is_empty());
        assert!(streamer.area().is_none());
    }

    #[test]
    fn test_element_kind_follows_grid() {
        let world = WorldGrid::from_ascii(".#").unwrap();
        let mut streamer = WorldStreamer::new();
        streamer.update_render_area(area(0, 0, 1, 0), Some(&world), &mut NullPresenter);
        assert_eq!(streamer.element_at(TileCoord::new(1, 0)).map(|t| t.kind), Some(TileKind::Rock));
        assert_eq!(streamer.element_at(TileCoord::new(0, 0)).map(|t| t.kind), Some(TileKind::Free));
    }

    #[test]
    fn test_huge_area_only_walks_world_tiles() {
        let world = WorldGrid::open(4, 3);
        let mut streamer = WorldStreamer::new();
        let huge = area(i32::MIN, i32::MIN, i32::MAX, i32::MAX);

        let delta = streamer.update_render_area(huge, Some(&world), &mut NullPresenter);

        assert_eq!(delta.spawned, 12);
        assert_eq!(streamer.area(), Some(huge));
        assert!(streamer.live_coords().all(|c| world.contains(c)));
    }

    #[test]
    fn test_clamped_area() {
        assert_eq!(area(-3, -3, 1, 8).clamped_to(4, 5), Some(area(0, 0, 1, 4)));
        assert_eq!(area(6, 0, 9, 2).clamped_to(4, 5), None);
        assert_eq!(area(0, 0, 2, 2).clamped_to(0, 5), None);
    }

    #[test]
    fn test_area_around_zero_tile_size_saturates() {
        let viewport = Viewport::new(800.0, 600.0, 0.0);
        let area = RenderArea::around(Vector2::new(10.0, 10.0), &viewport, 2);
        assert!(area.start.x < 0 && area.start.y < 0);
        assert!(area.end.x > 1_000_000_000 && area.end.y > 1_000_000_000);
        assert!(area.contains(TileCoord::new(10, 10)));
    }

    #[test]
    fn test_area_around_covers_viewport_plus_margin() {
        let viewport = Viewport::new(480.0, 240.0, 48.0);
        let area = RenderArea::around(Vector2::new(10.2, 9.7), &viewport, 2);
        // 10 x 5 tiles visible -> half extents 5 and 3, plus margin
        assert_eq!(area.start, TileCoord::new(3, 5));
        assert_eq!(area.end, TileCoord::new(17, 15));
        assert!(area.contains(TileCoord::new(10, 10)));
    }
}
