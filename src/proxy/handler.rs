//! One client connection, end to end.
//!
//! Reads the request, routes on `Host`, answers the easter egg locally or
//! relays to the origin, transforms the response, and replies. Both
//! sockets are released on every path.

use std::net::SocketAddr;
use std::sync::Arc;

use rand::rngs::StdRng;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::Instrument;

use crate::error::ProxyError;
use crate::http::{Authority, RawMessage, RequestHead};
use crate::net::{close_quietly, ConnectionGuard, ConnectionState};
use crate::observability::metrics;
use crate::proxy::ProxyContext;
use crate::random::connection_rng;
use crate::resilience::timeouts::within;

/// Serve one accepted connection. Never fails; errors are logged here.
pub async fn handle_connection(
    context: Arc<ProxyContext>,
    client: TcpStream,
    peer_addr: SocketAddr,
    guard: ConnectionGuard,
) {
    let span = tracing::info_span!("connection", connection_id = %guard.id(), peer_addr = %peer_addr);

    async move {
        let mut conn = Connection {
            context,
            client: Some(client),
            upstream: None,
            rng: Some(connection_rng()),
            state: ConnectionState::AwaitingRequest,
        };

        match conn.drive().await {
            Ok(()) => tracing::debug!("Connection finished"),
            Err(e) if e.is_peer_gone() => {
                tracing::info!(state = %conn.state, error = %e, "Client closed connection prematurely")
            }
            Err(e @ ProxyError::Timeout { .. }) => {
                tracing::info!(state = %conn.state, error = %e, "Connection timed out")
            }
            Err(e) => tracing::warn!(state = %conn.state, error = %e, "Connection failed"),
        }

        conn.close().await;
        drop(guard);
    }
    .instrument(span)
    .await
}

struct Connection {
    context: Arc<ProxyContext>,
    client: Option<TcpStream>,
    upstream: Option<TcpStream>,
    rng: Option<StdRng>,
    state: ConnectionState,
}

impl Connection {
    fn enter(&mut self, state: ConnectionState) {
        tracing::trace!(from = %self.state, to = %state, "State transition");
        self.state = state;
    }

    fn client(&mut self) -> Result<&mut TcpStream, ProxyError> {
        self.client
            .as_mut()
            .ok_or_else(|| ProxyError::Io(std::io::ErrorKind::NotConnected.into()))
    }

    async fn drive(&mut self) -> Result<(), ProxyError> {
        let ctx = Arc::clone(&self.context);

        self.enter(ConnectionState::AwaitingRequest);
        let request = ctx.reader.read_request(self.client()?).await?;
        if request.is_empty() {
            tracing::debug!("Client sent nothing");
            return Ok(());
        }

        self.enter(ConnectionState::Routing);
        let head = RequestHead::parse(&request)?;
        tracing::debug!(method = %head.method, request_target = %head.target, host = ?head.host, "Request received");

        if head.is_connect() {
            tracing::info!(request_target = %head.target, "Refusing CONNECT request");
            metrics::record_request("rejected");
            return Ok(());
        }

        let host = head.host.ok_or(ProxyError::MissingHost)?;
        if ctx.easter_egg.matches(&host) {
            self.enter(ConnectionState::EasterEgg);
            metrics::record_request("easter_egg");
            return self.serve_easter_egg().await;
        }

        metrics::record_request("forward");
        self.enter(ConnectionState::Forwarding);
        let authority = Authority::parse(&host, ctx.default_port)?;
        self.forward(&authority, &request)
            .await
            .inspect_err(|_| metrics::record_upstream_error())?;

        self.enter(ConnectionState::AwaitingResponse);
        let upstream = self
            .upstream
            .as_mut()
            .ok_or_else(|| ProxyError::Io(std::io::ErrorKind::NotConnected.into()))?;
        let response = ctx
            .reader
            .read_response(upstream)
            .await
            .inspect_err(|_| metrics::record_upstream_error())?;
        tracing::debug!(bytes = response.len(), "Upstream response received");

        self.enter(ConnectionState::Transforming);
        let response = self.transform(response).await?;

        self.enter(ConnectionState::Replying);
        self.reply(response.as_bytes()).await
    }

    async fn serve_easter_egg(&mut self) -> Result<(), ProxyError> {
        let easter_egg = self.context.easter_egg.clone();
        let mut rng = self.rng.take().unwrap_or_else(connection_rng);

        let response = tokio::task::spawn_blocking(move || easter_egg.respond(&mut rng)).await?;
        tracing::info!(bytes = response.len(), "Serving easter egg");
        self.reply(&response).await
    }

    async fn forward(&mut self, authority: &Authority, request: &RawMessage) -> Result<(), ProxyError> {
        let ctx = Arc::clone(&self.context);

        let connect = TcpStream::connect((authority.host.as_str(), authority.port));
        let upstream = match tokio::time::timeout(ctx.connect_timeout, connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(ProxyError::Connect {
                    authority: authority.to_string(),
                    source,
                })
            }
            Err(_) => {
                return Err(ProxyError::Timeout {
                    operation: "upstream connect",
                    timeout: ctx.connect_timeout,
                })
            }
        };
        tracing::debug!(upstream = %authority, "Connected to origin");

        let upstream = self.upstream.insert(upstream);
        within("upstream write", ctx.io_timeout, upstream.write_all(request.as_bytes())).await?;
        Ok(())
    }

    async fn transform(&mut self, response: RawMessage) -> Result<RawMessage, ProxyError> {
        let transformer = self.context.transformer.clone();
        let mut rng = self.rng.take().unwrap_or_else(connection_rng);

        let (response, outcome, rng) = tokio::task::spawn_blocking(move || {
            let (response, outcome) = transformer.transform(response, &mut rng);
            (response, outcome, rng)
        })
        .await?;

        self.rng = Some(rng);
        tracing::debug!(outcome = ?outcome, bytes = response.len(), "Response transformed");
        Ok(response)
    }

    async fn reply(&mut self, bytes: &[u8]) -> Result<(), ProxyError> {
        let io_timeout = self.context.io_timeout;
        let client = self.client()?;
        within("client write", io_timeout, client.write_all(bytes)).await?;
        within("client flush", io_timeout, client.flush()).await
    }

    async fn close(&mut self) {
        self.enter(ConnectionState::Closed);
        if let Some(upstream) = self.upstream.take() {
            close_quietly(upstream).await;
        }
        if let Some(client) = self.client.take() {
            close_quietly(client).await;
        }
    }
}
