use crate::document::{load_document, parse_document, validate};
use crate::error::Result;
use crate::geometry::{self, AxisMode, Geometry};
use crate::identity::ProcessIdentity;
use crate::model::ClusterDocument;
use crate::node::{ResolutionPath, SelectedEntry, resolve_node};
use serde::Serialize;
use std::path::Path;

/// Leader host assumed when the document has no `head` entry.
pub const DEFAULT_LEADER_HOST: &str = "localhost";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    pub axis_mode: AxisMode,
}

impl ResolveOptions {
    /// Corrected geometry.
    pub fn strict() -> Self {
        Self {
            axis_mode: AxisMode::Corrected,
        }
    }

    /// Reproduce the axis mix-ups of older deployments bit for bit, for walls whose content
    /// was authored against them.
    pub fn legacy() -> Self {
        Self {
            axis_mode: AxisMode::Legacy,
        }
    }
}

/// The resolved placement of this process; computed once, read for the rest of its life.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    is_leader: bool,
    rank: u32,
    path: ResolutionPath,
    num_followers: usize,
    debug_enabled: bool,
    local_width: u32,
    local_height: u32,
    master_width: u32,
    master_height: u32,
    offset_x: u32,
    offset_y: u32,
    leader_host: String,
    leader_port: Option<u16>,
}

impl ResolvedConfig {
    pub fn is_leader(&self) -> bool {
        self.is_leader
    }

    /// The rank from the environment, or the matched entry's declared rank when resolved by
    /// hostname.
    pub fn rank(&self) -> u32 {
        self.rank
    }

    pub fn path(&self) -> ResolutionPath {
        self.path
    }

    pub fn num_followers(&self) -> usize {
        self.num_followers
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug_enabled
    }

    pub fn local_width(&self) -> u32 {
        self.local_width
    }

    pub fn local_height(&self) -> u32 {
        self.local_height
    }

    pub fn master_width(&self) -> u32 {
        self.master_width
    }

    pub fn master_height(&self) -> u32 {
        self.master_height
    }

    pub fn offset_x(&self) -> u32 {
        self.offset_x
    }

    pub fn offset_y(&self) -> u32 {
        self.offset_y
    }

    pub fn leader_host(&self) -> &str {
        &self.leader_host
    }

    /// `None` when the document declares no leader.
    pub fn leader_port(&self) -> Option<u16> {
        self.leader_port
    }
}

/// Resolves role, canvas sizes and offset for `identity`.
///
/// The document is validated first, so hand-built documents get the same checks as parsed ones.
pub fn resolve(
    document: &ClusterDocument,
    identity: &ProcessIdentity,
    options: ResolveOptions,
) -> Result<ResolvedConfig> {
    validate(document)?;

    let (leader_host, leader_port) = match &document.leader {
        Some(leader) => {
            tracing::debug!(host = %leader.host, port = leader.port, "leader");
            (leader.host.clone(), Some(leader.port))
        }
        None => {
            tracing::warn!(
                "configuration has no head entry; assuming leader at {DEFAULT_LEADER_HOST}"
            );
            (DEFAULT_LEADER_HOST.to_string(), None)
        }
    };

    let path = ResolutionPath::for_identity(identity);
    if path == ResolutionPath::Hostname {
        tracing::info!(
            hostname = %identity.hostname,
            display = %identity.display,
            "RANK is not set, using hostname lookup; export RANK for each process instead"
        );
    }

    let selected = resolve_node(document, identity)?;
    let geometry: Geometry = match (selected, options.axis_mode, path) {
        (SelectedEntry::Leader(leader), AxisMode::Legacy, ResolutionPath::Hostname) => {
            geometry::compute_leader_legacy_hostname(leader)
        }
        (SelectedEntry::Leader(leader), _, _) => geometry::compute_leader(leader),
        (SelectedEntry::Follower(host), mode, _) => {
            geometry::compute_follower(host, &document.grid, mode)?
        }
    };

    let rank = identity.rank.unwrap_or_else(|| selected.rank());
    let resolved = ResolvedConfig {
        is_leader: selected.is_leader(),
        rank,
        path,
        num_followers: geometry::num_followers(document),
        debug_enabled: document.grid.debug_enabled,
        local_width: geometry.local.width,
        local_height: geometry.local.height,
        master_width: geometry.master.width,
        master_height: geometry.master.height,
        offset_x: geometry.offset.x,
        offset_y: geometry.offset.y,
        leader_host,
        leader_port,
    };

    tracing::info!(
        "Settings: Rank: {}, leader: {}, offsets: {},{}, lDims: {},{}, mDims: {},{}",
        resolved.rank,
        resolved.is_leader,
        resolved.offset_x,
        resolved.offset_y,
        resolved.local_width,
        resolved.local_height,
        resolved.master_width,
        resolved.master_height
    );
    Ok(resolved)
}

pub fn resolve_str(
    text: &str,
    identity: &ProcessIdentity,
    options: ResolveOptions,
) -> Result<ResolvedConfig> {
    resolve(&parse_document(text)?, identity, options)
}

pub fn resolve_file(
    path: impl AsRef<Path>,
    identity: &ProcessIdentity,
    options: ResolveOptions,
) -> Result<ResolvedConfig> {
    resolve(&load_document(path)?, identity, options)
}
