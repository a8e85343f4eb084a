/// Path segment that stands in for the concrete gallery id on batch endpoints.
pub const BATCH_TOKEN: &str = "batch";

/// Rewrites a batch path into the single-target path served by a peer.
///
/// Only whole segments equal to [`BATCH_TOKEN`] are replaced, so
/// `/galleries/batch/arts` becomes `/galleries/2/arts`.
pub fn rewrite_batch_path(path: &str, gallery_id: GalleryId) -> String {
    let id = gallery_id.to_string();
    path.split('/')
        .map(|segment| if segment == BATCH_TOKEN { id.as_str() } else { segment })
        .collect::<Vec<_>>()
        .join("/")
}

/// Method and path of the inbound batch request, used to build forwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub method: Method,
    pub path: String,
}

impl BatchRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

/// Placeholder recorded when a forward to a peer fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectFailure {
    pub gallery_id: GalleryId,
}

impl std::fmt::Display for RedirectFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed call to Gallery ID: {}", self.gallery_id)
    }
}

impl Serialize for RedirectFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One element of an aggregated batch response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Entity(Value),
    Failed(RedirectFailure),
}

impl BatchEntry {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// What a routed gallery request answers with.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteResponse {
    /// 200 with one entry per resolved target, in processing order.
    Aggregated(Vec<BatchEntry>),
    /// 307 to another gallery server.
    TemporaryRedirect(Url),
    /// 404, the server to redirect to is not in the directory.
    UnknownServer(GalleryId),
}

impl IntoResponse for RouteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Aggregated(entries) => (StatusCode::OK, Json(entries)).into_response(),
            Self::TemporaryRedirect(location) => {
                Redirect::temporary(location.as_str()).into_response()
            }
            Self::UnknownServer(id) => {
                WebError::from(CatalogError::UnknownServer(id)).into_response()
            }
        }
    }
}

/// A write-batch item: names its target gallery and carries the payload that
/// is forwarded when the target is a peer.
pub trait BatchWriteTarget {
    fn target_id(&self) -> GalleryId;

    fn forward_body(&self) -> Result<Value>;
}

/// Routes batches of gallery ids or gallery entities across the cluster.
///
/// Items are processed one at a time in input order. Local items go to the
/// caller's handler, remote ones are forwarded to their peer and awaited
/// before the next item starts.
#[derive(Clone)]
pub struct BatchRouter {
    forwarder: Arc<dyn PeerForwarder>,
}

impl BatchRouter {
    pub fn new(forwarder: Arc<dyn PeerForwarder>) -> Self {
        Self { forwarder }
    }

    /// 307 to the server hosting `id` with `path` appended, or 404 when `id`
    /// is not tracked.
    pub fn temporary_redirect(
        cluster: &ClusterSnapshot,
        id: GalleryId,
        path: &str,
    ) -> Result<RouteResponse> {
        match cluster.lookup(id) {
            Some(address) => Ok(RouteResponse::TemporaryRedirect(address.with_path(path)?)),
            None => Ok(RouteResponse::UnknownServer(id)),
        }
    }

    /// Read path: serves local ids with `local`, forwards the rest with an
    /// empty body. Ids missing from the directory produce no entry.
    pub async fn route_read<F, Fut>(
        &self,
        cluster: &ClusterSnapshot,
        ids: &[GalleryId],
        request: &BatchRequest,
        mut local: F,
    ) -> Result<RouteResponse>
    where
        F: FnMut(GalleryId) -> Fut,
        Fut: Future<Output = Result<LocalOutcome>>,
    {
        let mut entries = Vec::with_capacity(ids.len());
        for &gallery_id in ids {
            let Some(address) = cluster.lookup(gallery_id) else {
                debug!(gallery_id, path = %request.path, "skipping unknown gallery id");
                continue;
            };
            if cluster.is_local(gallery_id) {
                let outcome = local(gallery_id).await?;
                entries.push(BatchEntry::Entity(outcome.entity));
            } else {
                let entry = self
                    .redirect(gallery_id, address, request, ForwardBody::Empty)
                    .await?;
                entries.push(entry);
            }
        }
        Self::log_summary(request, &entries);
        Ok(RouteResponse::Aggregated(entries))
    }

    /// Write path: only the leader executes writes.
    ///
    /// A follower answers the whole batch with a 307 to the leader without
    /// touching any item. The leader handles its own gallery with `local` and
    /// forwards every other known target with that target's payload.
    pub async fn route_write<T, F, Fut>(
        &self,
        cluster: &ClusterSnapshot,
        targets: Vec<T>,
        request: &BatchRequest,
        mut local: F,
    ) -> Result<RouteResponse>
    where
        T: BatchWriteTarget,
        F: FnMut(T) -> Fut,
        Fut: Future<Output = Result<LocalOutcome>>,
    {
        if !cluster.is_leader() {
            info!(
                local_id = cluster.local_id(),
                leader_id = cluster.leader_id(),
                path = %request.path,
                "write batch received by follower, redirecting to leader"
            );
            return Self::temporary_redirect(cluster, cluster.leader_id(), &request.path);
        }

        let mut entries = Vec::with_capacity(targets.len());
        for target in targets {
            let gallery_id = target.target_id();
            let Some(address) = cluster.lookup(gallery_id) else {
                debug!(gallery_id, path = %request.path, "skipping unknown gallery id");
                continue;
            };
            if cluster.is_local(gallery_id) {
                let outcome = local(target).await?;
                entries.push(BatchEntry::Entity(outcome.entity));
            } else {
                let body = ForwardBody::Json(target.forward_body()?);
                let entry = self.redirect(gallery_id, address, request, body).await?;
                entries.push(entry);
            }
        }
        Self::log_summary(request, &entries);
        Ok(RouteResponse::Aggregated(entries))
    }

    /// Forwards one item to its peer. Peer failures become a placeholder;
    /// only a target URL that cannot be built is an error.
    async fn redirect(
        &self,
        gallery_id: GalleryId,
        address: &ServerAddress,
        request: &BatchRequest,
        body: ForwardBody,
    ) -> Result<BatchEntry> {
        let path = rewrite_batch_path(&request.path, gallery_id);
        let forward = ForwardRequest {
            method: request.method.clone(),
            url: address.with_path(&path)?,
            body,
        };

        match self.forwarder.forward(forward).await {
            Ok(entity) => Ok(BatchEntry::Entity(entity)),
            Err(err) => Ok(Self::fallback_redirect(gallery_id, request, &err)),
        }
    }

    fn log_summary(request: &BatchRequest, entries: &[BatchEntry]) {
        let failed = entries.iter().filter(|entry| entry.is_failure()).count();
        debug!(
            method = %request.method,
            path = %request.path,
            entries = entries.len(),
            failed,
            "batch routed"
        );
    }

    fn fallback_redirect(
        gallery_id: GalleryId,
        request: &BatchRequest,
        err: &ForwardError,
    ) -> BatchEntry {
        info!(gallery_id, path = %request.path, error = %err, "failed call to gallery server");
        BatchEntry::Failed(RedirectFailure { gallery_id })
    }
}
