#![forbid(unsafe_code)]

//! Tile-wall cluster configuration (headless).
//!
//! Every process of a tiled-display cluster reads the same XML document and works out, on its
//! own, whether it is the leader, how large its sub-canvas is, and where that sub-canvas sits
//! on the shared global canvas. No runtime coordination is involved.
//!
//! ```no_run
//! use walltile_core::{ProcessIdentity, ResolveOptions, resolve_file};
//!
//! let identity = ProcessIdentity::from_env()?;
//! let config = resolve_file("configuration.xml", &identity, ResolveOptions::default())?;
//! println!("{}x{} at {},{}", config.local_width(), config.local_height(),
//!     config.offset_x(), config.offset_y());
//! # Ok::<(), walltile_core::Error>(())
//! ```

pub mod document;
pub mod error;
pub mod geometry;
pub mod identity;
pub mod model;
pub mod node;
pub mod resolve;

pub use document::{load_document, parse_document};
pub use error::{Error, Result};
pub use geometry::{AxisMode, Geometry, PixelOffset, PixelSize, TileBounds};
pub use identity::{IdentityOverrides, ProcessIdentity};
pub use model::{
    ClusterDocument, DisplayGridSpec, HostAssignment, LeaderEntry, LeaderSurface, TileCoord,
};
pub use node::{ResolutionPath, SelectedEntry, resolve_node};
pub use resolve::{ResolveOptions, ResolvedConfig, resolve, resolve_file, resolve_str};
