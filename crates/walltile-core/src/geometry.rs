//! Tile-grid to pixel-space geometry.
//!
//! Gaps (mullions/bezels) are counted only between tiles of one sub-canvas, never around its
//! outer edge.

use crate::error::{Error, Result};
use crate::model::{ClusterDocument, DisplayGridSpec, HostAssignment, LeaderEntry, TileCoord};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PixelOffset {
    pub x: u32,
    pub y: u32,
}

/// Pixel geometry of one process's sub-canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Geometry {
    pub local: PixelSize,
    pub master: PixelSize,
    pub offset: PixelOffset,
}

/// Inclusive tile-space bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileBounds {
    pub min_i: u32,
    pub max_i: u32,
    pub min_j: u32,
    pub max_j: u32,
}

impl TileBounds {
    pub fn of(tile: TileCoord) -> Self {
        Self {
            min_i: tile.i,
            max_i: tile.i,
            min_j: tile.j,
            max_j: tile.j,
        }
    }

    pub fn include(self, tile: TileCoord) -> Self {
        self.union(Self::of(tile))
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min_i: self.min_i.min(other.min_i),
            max_i: self.max_i.max(other.max_i),
            min_j: self.min_j.min(other.min_j),
            max_j: self.max_j.max(other.max_j),
        }
    }

    /// Folds `tiles` seeded by the first one; `None` for an empty set.
    pub fn from_tiles(tiles: &[TileCoord]) -> Option<Self> {
        let (first, rest) = tiles.split_first()?;
        Some(rest.iter().fold(Self::of(*first), |b, t| b.include(*t)))
    }

    /// Columns spanned; `None` when the count does not fit in a `u32`.
    pub fn span_i(&self) -> Option<u32> {
        self.max_i.checked_sub(self.min_i)?.checked_add(1)
    }

    /// Rows spanned; `None` when the count does not fit in a `u32`.
    pub fn span_j(&self) -> Option<u32> {
        self.max_j.checked_sub(self.min_j)?.checked_add(1)
    }
}

/// How to treat the axis mix-ups of older deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisMode {
    #[default]
    Corrected,
    /// Follower `offset_y` uses `min_i` for its gap term, and a leader matched by hostname
    /// reports its declared width as its height.
    Legacy,
}

/// `count` tiles of `size` pixels with `gap` pixels between neighbours.
fn span_pixels(count: u32, size: u32, gap: u32) -> Option<u32> {
    count
        .checked_mul(size)?
        .checked_add(count.saturating_sub(1).checked_mul(gap)?)
}

/// Full size of the global canvas, independent of any assignment.
pub fn master_size(grid: &DisplayGridSpec) -> Option<PixelSize> {
    Some(PixelSize {
        width: span_pixels(grid.tiles_x, grid.tile_width, grid.bezel_x)?,
        height: span_pixels(grid.tiles_y, grid.tile_height, grid.bezel_y)?,
    })
}

/// The leader renders its declared surface at the origin; its canvas is its own surface.
pub fn compute_leader(leader: &LeaderEntry) -> Geometry {
    let local = PixelSize {
        width: leader.surface.width,
        height: leader.surface.height,
    };
    Geometry {
        local,
        master: local,
        offset: PixelOffset::default(),
    }
}

/// Leader geometry older deployments produce when the leader is found by hostname.
pub(crate) fn compute_leader_legacy_hostname(leader: &LeaderEntry) -> Geometry {
    let local = PixelSize {
        width: leader.surface.width,
        height: leader.surface.width,
    };
    Geometry {
        local,
        master: local,
        offset: PixelOffset::default(),
    }
}

pub fn compute_follower(
    assignment: &HostAssignment,
    grid: &DisplayGridSpec,
    mode: AxisMode,
) -> Result<Geometry> {
    let overflow = || Error::GeometryOverflow {
        entry: assignment.label(),
    };
    let bounds = TileBounds::from_tiles(&assignment.tiles).ok_or_else(|| {
        Error::malformed(assignment.label(), "tile", "entry owns no tiles")
    })?;

    let local = PixelSize {
        width: bounds
            .span_i()
            .and_then(|n| span_pixels(n, grid.tile_width, grid.bezel_x))
            .ok_or_else(overflow)?,
        height: bounds
            .span_j()
            .and_then(|n| span_pixels(n, grid.tile_height, grid.bezel_y))
            .ok_or_else(overflow)?,
    };
    let master = master_size(grid).ok_or_else(overflow)?;

    let y_gap_index = match mode {
        AxisMode::Corrected => bounds.min_j,
        AxisMode::Legacy => bounds.min_i,
    };
    let offset = PixelOffset {
        x: bounds
            .min_i
            .checked_mul(grid.tile_width)
            .and_then(|v| v.checked_add(bounds.min_i.checked_mul(grid.bezel_x)?))
            .ok_or_else(overflow)?,
        y: bounds
            .min_j
            .checked_mul(grid.tile_height)
            .and_then(|v| v.checked_add(y_gap_index.checked_mul(grid.bezel_y)?))
            .ok_or_else(overflow)?,
    };

    Ok(Geometry {
        local,
        master,
        offset,
    })
}

/// Every entry except the grid spec and the leader: the same value for every process.
pub fn num_followers(document: &ClusterDocument) -> usize {
    document.entry_count.saturating_sub(2)
}
