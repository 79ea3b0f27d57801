//! Locates the document entry describing the current process.

use crate::error::{Error, Result};
use crate::identity::ProcessIdentity;
use crate::model::{ClusterDocument, HostAssignment, LeaderEntry};
use serde::Serialize;

/// Which lookup strategy selected the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPath {
    Rank,
    Hostname,
}

impl ResolutionPath {
    pub fn for_identity(identity: &ProcessIdentity) -> Self {
        match identity.rank {
            Some(_) => Self::Rank,
            None => Self::Hostname,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectedEntry<'a> {
    Leader(&'a LeaderEntry),
    Follower(&'a HostAssignment),
}

impl SelectedEntry<'_> {
    pub fn is_leader(&self) -> bool {
        matches!(self, Self::Leader(_))
    }

    pub fn rank(&self) -> u32 {
        match self {
            Self::Leader(leader) => leader.rank,
            Self::Follower(host) => host.rank,
        }
    }
}

/// Selects the entry for `identity`, first match in document order.
///
/// With a rank, the leader wins if its rank matches, otherwise the first host entry with that
/// rank. Without one, the leader wins if its host matches the local hostname, otherwise the
/// first host entry whose `(host, display)` pair matches.
pub fn resolve_node<'a>(
    document: &'a ClusterDocument,
    identity: &ProcessIdentity,
) -> Result<SelectedEntry<'a>> {
    match identity.rank {
        Some(rank) => by_rank(document, rank),
        None => by_host(document, &identity.hostname, &identity.display),
    }
}

fn by_rank(document: &ClusterDocument, rank: u32) -> Result<SelectedEntry<'_>> {
    if let Some(leader) = document.leader.as_ref().filter(|l| l.rank == rank) {
        return Ok(SelectedEntry::Leader(leader));
    }
    document
        .hosts
        .iter()
        .find(|h| h.rank == rank)
        .map(SelectedEntry::Follower)
        .ok_or_else(|| Error::UnresolvedIdentity {
            key: format!("rank {rank}"),
        })
}

fn by_host<'a>(
    document: &'a ClusterDocument,
    hostname: &str,
    display: &str,
) -> Result<SelectedEntry<'a>> {
    let not_found = || Error::UnresolvedIdentity {
        key: format!("host {hostname:?}, display {display:?}"),
    };
    // An empty hostname means the lookup failed; it must not match a blank `host` attribute.
    if hostname.is_empty() {
        return Err(not_found());
    }
    if let Some(leader) = document.leader.as_ref().filter(|l| l.host == hostname) {
        return Ok(SelectedEntry::Leader(leader));
    }
    document
        .hosts
        .iter()
        .find(|h| h.host == hostname && h.display == display)
        .map(SelectedEntry::Follower)
        .ok_or_else(not_found)
}
