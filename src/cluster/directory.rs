/// Immutable view of the cluster that one request is routed against.
///
/// Maps every gallery server id to its base address and records which server
/// is this process and which one currently accepts writes.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ClusterSnapshot {
    local_id: GalleryId,
    leader_id: GalleryId,
    servers: BTreeMap<GalleryId, ServerAddress>,
}

impl ClusterSnapshot {
    /// Creates a snapshot, validating that the local and leader servers are known.
    pub fn new(
        local_id: GalleryId,
        leader_id: GalleryId,
        servers: BTreeMap<GalleryId, ServerAddress>,
    ) -> Result<Self> {
        if !servers.contains_key(&local_id) {
            return Err(CatalogError::Config(format!(
                "local server {} is missing from the server directory",
                local_id
            )));
        }
        if !servers.contains_key(&leader_id) {
            return Err(CatalogError::Config(format!(
                "leader {} is missing from the server directory",
                leader_id
            )));
        }
        Ok(Self {
            local_id,
            leader_id,
            servers,
        })
    }

    pub fn local_id(&self) -> GalleryId {
        self.local_id
    }

    pub fn leader_id(&self) -> GalleryId {
        self.leader_id
    }

    pub fn servers(&self) -> &BTreeMap<GalleryId, ServerAddress> {
        &self.servers
    }

    /// Returns the base address of a server, if it is tracked.
    pub fn lookup(&self, id: GalleryId) -> Option<&ServerAddress> {
        self.servers.get(&id)
    }

    pub fn contains(&self, id: GalleryId) -> bool {
        self.servers.contains_key(&id)
    }

    pub fn is_local(&self, id: GalleryId) -> bool {
        id == self.local_id
    }

    /// True when this process is the single writer.
    pub fn is_leader(&self) -> bool {
        self.local_id == self.leader_id
    }
}

/// Holds the current cluster snapshot and swaps it on membership changes.
///
/// Readers clone the `Arc` once per request; replacements never mutate a
/// snapshot that is already handed out.
#[derive(Debug)]
pub struct ClusterState {
    current: RwLock<Arc<ClusterSnapshot>>,
}

impl ClusterState {
    pub fn new(snapshot: ClusterSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn snapshot(&self) -> Result<Arc<ClusterSnapshot>> {
        Ok(Arc::clone(&*self.current.read()?))
    }

    /// Points writes at a new leader. The leader must be in the directory.
    pub fn set_leader(&self, leader_id: GalleryId) -> Result<Arc<ClusterSnapshot>> {
        let mut current = self.current.write()?;
        if !current.contains(leader_id) {
            return Err(CatalogError::validation(format!(
                "leader {} is not in the server directory",
                leader_id
            )));
        }
        let mut next = ClusterSnapshot::clone(&current);
        next.leader_id = leader_id;
        info!(
            previous_leader = current.leader_id,
            leader_id, "gallery leader changed"
        );
        *current = Arc::new(next);
        Ok(Arc::clone(&current))
    }

    /// Replaces the server directory.
    ///
    /// The new directory must still contain this server. A leader that drops
    /// out of the directory is kept as-is; write redirects then answer 404
    /// until a new leader is set.
    pub fn replace_servers(
        &self,
        servers: BTreeMap<GalleryId, ServerAddress>,
    ) -> Result<Arc<ClusterSnapshot>> {
        let mut current = self.current.write()?;
        if !servers.contains_key(&current.local_id) {
            return Err(CatalogError::validation(format!(
                "server directory must contain the local server {}",
                current.local_id
            )));
        }
        let mut next = ClusterSnapshot::clone(&current);
        next.servers = servers;
        info!(
            servers = next.servers.len(),
            leader_known = next.contains(next.leader_id),
            "gallery server directory replaced"
        );
        *current = Arc::new(next);
        Ok(Arc::clone(&current))
    }
}

#[cfg(test)]
mod directory_tests {
    use super::*;

    fn servers(ids: &[GalleryId]) -> BTreeMap<GalleryId, ServerAddress> {
        ids.iter()
            .map(|id| {
                let address = ServerAddress::parse(&format!("http://gallery-{id}:8080")).unwrap();
                (*id, address)
            })
            .collect()
    }

    #[test]
    fn snapshot_requires_local_and_leader_in_directory() {
        assert!(ClusterSnapshot::new(1, 1, servers(&[1, 2])).is_ok());
        assert!(ClusterSnapshot::new(3, 1, servers(&[1, 2])).is_err());
        assert!(ClusterSnapshot::new(1, 3, servers(&[1, 2])).is_err());
    }

    #[test]
    fn set_leader_rejects_unknown_server() {
        let state = ClusterState::new(ClusterSnapshot::new(1, 1, servers(&[1, 2])).unwrap());
        assert!(matches!(
            state.set_leader(9),
            Err(CatalogError::Validation(_))
        ));

        let updated = state.set_leader(2).unwrap();
        assert_eq!(updated.leader_id(), 2);
        assert!(!updated.is_leader());
    }

    #[test]
    fn handed_out_snapshots_are_not_mutated() {
        let state = ClusterState::new(ClusterSnapshot::new(1, 1, servers(&[1, 2])).unwrap());
        let before = state.snapshot().unwrap();

        state.replace_servers(servers(&[1, 2, 3])).unwrap();

        assert!(!before.contains(3));
        assert!(state.snapshot().unwrap().contains(3));
    }

    #[test]
    fn replace_servers_keeps_local_server() {
        let state = ClusterState::new(ClusterSnapshot::new(1, 2, servers(&[1, 2])).unwrap());
        assert!(state.replace_servers(servers(&[2, 3])).is_err());

        let updated = state.replace_servers(servers(&[1, 3])).unwrap();
        assert_eq!(updated.leader_id(), 2);
        assert!(updated.lookup(2).is_none());
    }
}
