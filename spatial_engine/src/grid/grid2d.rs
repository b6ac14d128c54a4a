/// Grid2D - fixed-size dense 2-D grid for screen-space or bounded 2-D worlds.
///
/// The grid covers `[0, width * cell_size) x [0, height * cell_size)` and
/// never grows. Cells are a flat row-major array of buckets (`cy * width + cx`).
/// Each bucket keeps `(id, position)` so queries filter exactly.

use glam::Vec2;
use rustc_hash::FxHashMap;
use crate::config::Grid2dConfig;
use crate::error::Result;
use crate::primitives::EntityId;
use crate::{spatial_bail, spatial_debug};

const SOURCE: &str = "spatial::Grid2D";

/// Axis-aligned rectangle `[x, x + width) x [y, y + height)`.
///
/// Half-open, so adjacent rectangles (and grid cells) never share a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}

/// Inclusive cell rectangle, already clamped to the grid
struct CellSpan {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

pub struct Grid2D {
    config: Grid2dConfig,
    cells: Vec<Vec<(EntityId, Vec2)>>,
    /// Reverse lookup: entity id → (cx, cy)
    entity_cells: FxHashMap<EntityId, (u32, u32)>,
}

impl Grid2D {
    /// Allocate `width * height` empty cells.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for a zero dimension, `InvalidCellSize` for a cell
    /// size that is not finite and positive.
    pub fn new(config: Grid2dConfig) -> Result<Self> {
        if let Err(err) = config.validate() {
            spatial_bail!(SOURCE, err);
        }

        let cell_count = config.width as usize * config.height as usize;
        spatial_debug!(SOURCE, "Created {}x{} grid ({} cells of size {})",
            config.width, config.height, cell_count, config.cell_size);

        Ok(Self {
            config,
            cells: vec![Vec::new(); cell_count],
            entity_cells: FxHashMap::default(),
        })
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    pub fn cell_size(&self) -> f32 {
        self.config.cell_size
    }

    pub fn len(&self) -> usize {
        self.entity_cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entity_cells.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entity_cells.contains_key(&id)
    }

    /// Cell holding `position`, or `None` outside the grid.
    pub fn cell_of(&self, position: Vec2) -> Option<(u32, u32)> {
        let cell = (position / self.config.cell_size).floor();
        let in_grid = cell.x >= 0.0
            && cell.y >= 0.0
            && cell.x < self.config.width as f32
            && cell.y < self.config.height as f32;
        in_grid.then(|| (cell.x as u32, cell.y as u32))
    }

    fn index(&self, cx: u32, cy: u32) -> usize {
        cy as usize * self.config.width as usize + cx as usize
    }

    // ===== MUTATION =====

    /// Store `id` at `position`. Returns false (nothing stored) outside the grid.
    ///
    /// An id already present is updated instead.
    pub fn insert(&mut self, id: EntityId, position: Vec2) -> bool {
        if self.entity_cells.contains_key(&id) {
            return self.update(id, position);
        }
        let Some((cx, cy)) = self.cell_of(position) else {
            spatial_debug!(SOURCE, "Rejected entity {} at {:?}: outside grid", id, position);
            return false;
        };

        let index = self.index(cx, cy);
        self.cells[index].push((id, position));
        self.entity_cells.insert(id, (cx, cy));
        true
    }

    pub fn remove(&mut self, id: EntityId) -> bool {
        let Some((cx, cy)) = self.entity_cells.remove(&id) else {
            return false;
        };
        let index = self.index(cx, cy);
        let bucket = &mut self.cells[index];
        if let Some(pos) = bucket.iter().position(|(stored, _)| *stored == id) {
            bucket.swap_remove(pos);
        }
        true
    }

    /// Move an entity. Moving outside the grid drops it and returns false.
    pub fn update(&mut self, id: EntityId, position: Vec2) -> bool {
        if let Some(&(cx, cy)) = self.entity_cells.get(&id) {
            if self.cell_of(position) == Some((cx, cy)) {
                let index = self.index(cx, cy);
                if let Some(slot) = self.cells[index].iter_mut().find(|(stored, _)| *stored == id) {
                    slot.1 = position;
                    return true;
                }
            }
            self.remove(id);
        }
        self.insert(id, position)
    }

    /// Empty every bucket, keeping the allocation.
    pub fn clear(&mut self) {
        for bucket in &mut self.cells {
            bucket.clear();
        }
        self.entity_cells.clear();
    }

    // ===== QUERIES =====

    /// Ids stored in cell `(cx, cy)`. Empty for a cell outside the grid.
    pub fn query_cell(&self, cx: u32, cy: u32) -> Vec<EntityId> {
        if cx >= self.config.width || cy >= self.config.height {
            return Vec::new();
        }
        self.cells[self.index(cx, cy)].iter().map(|(id, _)| *id).collect()
    }

    /// Ids within `radius` of `center`.
    pub fn query_radius(&self, center: Vec2, radius: f32) -> Vec<EntityId> {
        let mut results = Vec::new();
        if radius.is_nan() || radius < 0.0 {
            return results;
        }

        let cs = self.config.cell_size;
        let span = self.clamp_span(
            ((center.x - radius) / cs).floor(),
            ((center.y - radius) / cs).floor(),
            ((center.x + radius) / cs).floor(),
            ((center.y + radius) / cs).floor(),
        );
        let radius_sq = radius * radius;
        self.for_each_in_span(span, |id, position| {
            if position.distance_squared(center) <= radius_sq {
                results.push(id);
            }
        });
        results
    }

    /// Ids whose position lies in `rect` (half-open).
    pub fn query_rect(&self, rect: &Rect) -> Vec<EntityId> {
        let mut results = Vec::new();
        if !(rect.width > 0.0 && rect.height > 0.0) {
            return results;
        }

        let cs = self.config.cell_size;
        // Right/top edges are excluded: the last cell is the one before ceil()
        let span = self.clamp_span(
            (rect.x / cs).floor(),
            (rect.y / cs).floor(),
            ((rect.x + rect.width) / cs).ceil() - 1.0,
            ((rect.y + rect.height) / cs).ceil() - 1.0,
        );
        self.for_each_in_span(span, |id, position| {
            if rect.contains_point(position) {
                results.push(id);
            }
        });
        results
    }

    /// Clamp a cell rectangle in float cell units to the grid.
    fn clamp_span(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> Option<CellSpan> {
        let max_x = (self.config.width - 1) as f32;
        let max_y = (self.config.height - 1) as f32;
        if x1 < 0.0 || y1 < 0.0 || x0 > max_x || y0 > max_y {
            return None;
        }
        // f32::max/min drop NaN, so a NaN edge falls back to the grid edge
        Some(CellSpan {
            x0: x0.max(0.0) as u32,
            y0: y0.max(0.0) as u32,
            x1: x1.min(max_x) as u32,
            y1: y1.min(max_y) as u32,
        })
    }

    fn for_each_in_span<F: FnMut(EntityId, Vec2)>(&self, span: Option<CellSpan>, mut visit: F) {
        let Some(span) = span else {
            return;
        };
        for cy in span.y0..=span.y1 {
            for cx in span.x0..=span.x1 {
                for &(id, position) in &self.cells[self.index(cx, cy)] {
                    visit(id, position);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "grid2d_tests.rs"]
mod tests;
