//! Typed view of a tile-wall configuration document.

use serde::Serialize;

/// Global tile grid shared by every process of a cluster run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayGridSpec {
    /// Pixel width of one tile.
    pub tile_width: u32,
    /// Pixel height of one tile.
    pub tile_height: u32,
    /// Number of tile columns (>= 1).
    pub tiles_x: u32,
    /// Number of tile rows (>= 1).
    pub tiles_y: u32,
    /// Horizontal gap between adjacent tiles, in pixels.
    pub bezel_x: u32,
    /// Vertical gap between adjacent tiles, in pixels.
    pub bezel_y: u32,
    pub debug_enabled: bool,
}

impl DisplayGridSpec {
    pub fn contains(&self, tile: TileCoord) -> bool {
        tile.i < self.tiles_x && tile.j < self.tiles_y
    }
}

/// Explicit render-surface size declared for the leader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LeaderSurface {
    pub width: u32,
    pub height: u32,
}

/// The distinguished leader process, framed at the origin of the global canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderEntry {
    pub host: String,
    pub port: u16,
    pub rank: u32,
    pub surface: LeaderSurface,
}

/// Column/row of one tile in the global grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TileCoord {
    pub i: u32,
    pub j: u32,
}

impl TileCoord {
    pub const fn new(i: u32, j: u32) -> Self {
        Self { i, j }
    }
}

/// Tiles owned by one follower process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostAssignment {
    pub host: String,
    pub rank: u32,
    /// Distinguishes processes that share one physical host.
    pub display: String,
    /// Non-empty, duplicate-free, in document order.
    pub tiles: Vec<TileCoord>,
}

impl HostAssignment {
    /// Human-readable label used in errors and logs.
    pub fn label(&self) -> String {
        format!("{} (rank {}, display {:?})", self.host, self.rank, self.display)
    }
}

/// A validated configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterDocument {
    pub grid: DisplayGridSpec,
    pub leader: Option<LeaderEntry>,
    pub hosts: Vec<HostAssignment>,
    /// Number of element entries under the root, including `dimensions` and `head`.
    pub entry_count: usize,
}
