/// Why a single forward to a peer did not produce an entity.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("peer answered with status {0}")]
    Status(StatusCode),
    #[error("peer did not answer in time")]
    Timeout,
    #[error("peer body is not valid JSON: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ForwardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Payload of a forwarded request.
#[derive(Debug, Clone, PartialEq)]
pub enum ForwardBody {
    /// Reads carry no payload.
    Empty,
    Json(Value),
}

/// One outbound call made on behalf of a batch item.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    pub url: Url,
    pub body: ForwardBody,
}

/// Transport used by the batch router to reach peer gallery servers.
#[async_trait]
pub trait PeerForwarder: Send + Sync {
    /// Sends one request and returns the peer's JSON body.
    ///
    /// Any non-2xx answer is an error. An empty body decodes to `null`.
    async fn forward(&self, request: ForwardRequest) -> std::result::Result<Value, ForwardError>;
}

fn decode_peer_body(bytes: &[u8]) -> std::result::Result<Value, ForwardError> {
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes).map_err(|err| ForwardError::Decode(err.to_string()))
}

/// Forwards over HTTP with a per-call timeout.
#[derive(Debug, Clone)]
pub struct HttpPeerForwarder {
    client: reqwest::Client,
}

impl HttpPeerForwarder {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            // Redirects between galleries are answered to the client, never followed here.
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PeerForwarder for HttpPeerForwarder {
    async fn forward(&self, request: ForwardRequest) -> std::result::Result<Value, ForwardError> {
        debug!(method = %request.method, url = %request.url, "forwarding to gallery server");

        let mut builder = self
            .client
            .request(request.method, request.url)
            .header(header::CONTENT_TYPE, "application/json");
        if let ForwardBody::Json(body) = request.body {
            builder = builder.json(&body);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ForwardError::Status(status));
        }
        let bytes = response.bytes().await?;
        decode_peer_body(&bytes)
    }
}
