//! XML configuration loader.
//!
//! The document looks like:
//!
//! ```xml
//! <configuration>
//!   <dimensions screenWidth="1920" screenHeight="1080" numTilesWidth="2" numTilesHeight="1"
//!               mullionWidth="10" mullionHeight="10" debug="0"/>
//!   <head host="leader" port="9002" rank="0"><surface width="3850" height="1080"/></head>
//!   <child host="render-1" rank="1" display=":0.0"><tile i="0" j="0"/></child>
//!   <child host="render-1" rank="2" display=":0.1"><tile i="1" j="0"/></child>
//! </configuration>
//! ```
//!
//! `dimensions` and `head` are matched by tag name. Every other element under the root is a
//! host entry regardless of its tag name.

use crate::error::{Error, Result};
use crate::model::{
    ClusterDocument, DisplayGridSpec, HostAssignment, LeaderEntry, LeaderSurface, TileCoord,
};
use roxmltree::{Document, Node};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::str::FromStr;

const ROOT_TAG: &str = "configuration";
const GRID_TAG: &str = "dimensions";
const LEADER_TAG: &str = "head";

/// Reads and parses a configuration file.
pub fn load_document(path: impl AsRef<Path>) -> Result<ClusterDocument> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&text)
}

/// Parses and validates a configuration document.
pub fn parse_document(text: &str) -> Result<ClusterDocument> {
    let doc = Document::parse(text)?;
    let root = config_root(&doc)?;

    let entries: Vec<Node<'_, '_>> = root.children().filter(|n| n.is_element()).collect();

    let grid_node = entries
        .iter()
        .find(|n| n.has_tag_name(GRID_TAG))
        .ok_or_else(|| Error::malformed(ROOT_TAG, GRID_TAG, "entry is missing"))?;
    let grid = parse_grid(&doc, *grid_node)?;

    let leader = entries
        .iter()
        .find(|n| n.has_tag_name(LEADER_TAG))
        .map(|n| parse_leader(&doc, *n))
        .transpose()?;

    let hosts = entries
        .iter()
        .filter(|n| !n.has_tag_name(GRID_TAG) && !n.has_tag_name(LEADER_TAG))
        .map(|n| parse_host(&doc, *n))
        .collect::<Result<Vec<_>>>()?;

    let document = ClusterDocument {
        grid,
        leader,
        hosts,
        entry_count: entries.len(),
    };
    validate(&document)?;
    Ok(document)
}

fn config_root<'a, 'input>(doc: &'a Document<'input>) -> Result<Node<'a, 'input>> {
    let root = doc.root_element();
    if root.has_tag_name(ROOT_TAG) {
        return Ok(root);
    }
    root.children()
        .find(|n| n.has_tag_name(ROOT_TAG))
        .ok_or_else(|| Error::malformed("document", ROOT_TAG, "root element is missing"))
}

fn entry_label(doc: &Document<'_>, node: Node<'_, '_>) -> String {
    let pos = doc.text_pos_at(node.range().start);
    format!("<{}> at {}:{}", node.tag_name().name(), pos.row, pos.col)
}

fn str_attr<'a>(node: Node<'a, '_>, entry: &str, name: &str) -> Result<&'a str> {
    node.attribute(name)
        .ok_or_else(|| Error::malformed(entry, name, "is missing"))
}

fn int_attr<T: FromStr>(node: Node<'_, '_>, entry: &str, name: &str) -> Result<T> {
    let raw = str_attr(node, entry, name)?;
    raw.trim().parse::<T>().map_err(|_| {
        Error::malformed(
            entry,
            name,
            format!("must be a non-negative integer in range, got `{raw}`"),
        )
    })
}

fn parse_grid(doc: &Document<'_>, node: Node<'_, '_>) -> Result<DisplayGridSpec> {
    let entry = entry_label(doc, node);
    // Stored as an integer; anything but 1 is off.
    let debug: i64 = int_attr(node, &entry, "debug")?;
    Ok(DisplayGridSpec {
        tile_width: int_attr(node, &entry, "screenWidth")?,
        tile_height: int_attr(node, &entry, "screenHeight")?,
        tiles_x: int_attr(node, &entry, "numTilesWidth")?,
        tiles_y: int_attr(node, &entry, "numTilesHeight")?,
        bezel_x: int_attr(node, &entry, "mullionWidth")?,
        bezel_y: int_attr(node, &entry, "mullionHeight")?,
        debug_enabled: debug == 1,
    })
}

fn parse_leader(doc: &Document<'_>, node: Node<'_, '_>) -> Result<LeaderEntry> {
    let entry = entry_label(doc, node);
    let surface_node = node
        .children()
        .find(|n| n.is_element())
        .ok_or_else(|| Error::malformed(&entry, "width", "surface entry is missing"))?;
    let surface_entry = entry_label(doc, surface_node);
    Ok(LeaderEntry {
        host: str_attr(node, &entry, "host")?.to_string(),
        port: int_attr(node, &entry, "port")?,
        rank: int_attr(node, &entry, "rank")?,
        surface: LeaderSurface {
            width: int_attr(surface_node, &surface_entry, "width")?,
            height: int_attr(surface_node, &surface_entry, "height")?,
        },
    })
}

fn parse_host(doc: &Document<'_>, node: Node<'_, '_>) -> Result<HostAssignment> {
    let entry = entry_label(doc, node);
    let tiles = node
        .children()
        .filter(|n| n.is_element())
        .map(|tile| {
            let tile_entry = entry_label(doc, tile);
            Ok(TileCoord {
                i: int_attr(tile, &tile_entry, "i")?,
                j: int_attr(tile, &tile_entry, "j")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    if tiles.is_empty() {
        return Err(Error::malformed(&entry, "tile", "entry owns no tiles"));
    }
    Ok(HostAssignment {
        host: str_attr(node, &entry, "host")?.to_string(),
        rank: int_attr(node, &entry, "rank")?,
        display: str_attr(node, &entry, "display")?.to_string(),
        tiles,
    })
}

/// Checks the invariants the resolver relies on.
///
/// First-match lookup is only deterministic when ranks and `(host, display)` pairs are unique,
/// so duplicates are rejected here instead of being resolved silently.
pub fn validate(document: &ClusterDocument) -> Result<()> {
    let grid = &document.grid;
    if grid.tiles_x == 0 {
        return Err(Error::malformed(GRID_TAG, "numTilesWidth", "must be at least 1"));
    }
    if grid.tiles_y == 0 {
        return Err(Error::malformed(GRID_TAG, "numTilesHeight", "must be at least 1"));
    }

    let mut ranks: BTreeMap<u32, String> = BTreeMap::new();
    if let Some(leader) = &document.leader {
        ranks.insert(leader.rank, format!("{LEADER_TAG} {}", leader.host));
    }
    let mut identities: BTreeSet<(&str, &str)> = BTreeSet::new();

    for host in &document.hosts {
        let label = host.label();
        if host.tiles.is_empty() {
            return Err(Error::malformed(&label, "tile", "entry owns no tiles"));
        }
        let mut seen: BTreeSet<_> = BTreeSet::new();
        for &tile in &host.tiles {
            if !grid.contains(tile) {
                return Err(Error::malformed(
                    &label,
                    "tile",
                    format!(
                        "({}, {}) lies outside the {}x{} grid",
                        tile.i, tile.j, grid.tiles_x, grid.tiles_y
                    ),
                ));
            }
            if !seen.insert(tile) {
                return Err(Error::malformed(
                    &label,
                    "tile",
                    format!("({}, {}) is listed more than once", tile.i, tile.j),
                ));
            }
        }
        if let Some(previous) = ranks.insert(host.rank, label.clone()) {
            return Err(Error::malformed(
                &label,
                "rank",
                format!("duplicates the rank of {previous}"),
            ));
        }
        if !identities.insert((host.host.as_str(), host.display.as_str())) {
            return Err(Error::malformed(
                &label,
                "display",
                "duplicates another entry's host and display",
            ));
        }
    }
    Ok(())
}
