/// Forwards to gallery routers hosted in the same process.
///
/// Peers are registered by base address; a forward is dispatched to the router
/// whose address matches the target URL's origin. Used to run a multi-server
/// gallery cluster without sockets.
#[derive(Clone, Default)]
pub struct InProcessForwarder {
    peers: Arc<tokio::sync::RwLock<HashMap<String, Router>>>,
}

impl InProcessForwarder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the router serving `address`, replacing any earlier one.
    pub async fn register_peer(&self, address: &ServerAddress, router: Router) -> Result<()> {
        let origin = address.with_path("/")?.origin().ascii_serialization();
        self.peers.write().await.insert(origin, router);
        Ok(())
    }

    /// Drops a peer so later forwards to it fail like an unreachable server.
    pub async fn remove_peer(&self, address: &ServerAddress) -> Result<bool> {
        let origin = address.with_path("/")?.origin().ascii_serialization();
        Ok(self.peers.write().await.remove(&origin).is_some())
    }

    async fn peer(&self, url: &Url) -> std::result::Result<Router, ForwardError> {
        let origin = url.origin().ascii_serialization();
        self.peers.read().await.get(&origin).cloned().ok_or_else(|| {
            ForwardError::Transport(format!("no gallery server listening at {}", origin))
        })
    }
}

#[async_trait]
impl PeerForwarder for InProcessForwarder {
    async fn forward(&self, request: ForwardRequest) -> std::result::Result<Value, ForwardError> {
        let router = self.peer(&request.url).await?;

        let mut uri = request.url.path().to_string();
        if let Some(query) = request.url.query() {
            uri.push('?');
            uri.push_str(query);
        }
        let body = match request.body {
            ForwardBody::Empty => Body::empty(),
            ForwardBody::Json(value) => Body::from(value.to_string()),
        };
        let http_request = Request::builder()
            .method(request.method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .map_err(|err| ForwardError::Transport(err.to_string()))?;

        let response = router
            .oneshot(http_request)
            .await
            .map_err(|err| ForwardError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ForwardError::Status(status));
        }
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|err| ForwardError::Transport(err.to_string()))?;
        decode_peer_body(&bytes)
    }
}
