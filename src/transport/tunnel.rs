//! WebSocket tunnel carrying the remote-framebuffer byte stream.
//!
//! The tunnel advertises exactly one sub-protocol on the handshake and
//! frames the byte stream according to it:
//!
//! | Sub-protocol | Frame type | Payload |
//! |--------------|------------|---------|
//! | `binary` | Binary | Raw bytes |
//! | `text` | Text | Base64 of the raw bytes |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, trace};

use crate::config::{ConnectionConfig, SubProtocol};
use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Handshake header carrying the sub-protocol.
pub const SEC_WEBSOCKET_PROTOCOL: &str = "Sec-WebSocket-Protocol";

/// Timeout for the WebSocket handshake.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Tunnel
// ============================================================================

/// An open WebSocket tunnel to the remote-framebuffer server.
pub struct Tunnel {
    /// Underlying WebSocket stream.
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    /// Negotiated sub-protocol.
    sub_protocol: SubProtocol,
    /// Endpoint the tunnel was opened against.
    url: String,
}

impl fmt::Debug for Tunnel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tunnel")
            .field("url", &self.url)
            .field("sub_protocol", &self.sub_protocol)
            .finish_non_exhaustive()
    }
}

impl Tunnel {
    /// Opens the tunnel described by a resolved configuration.
    ///
    /// # Errors
    ///
    /// See [`Tunnel::open`].
    pub async fn open_for(config: &ConnectionConfig) -> Result<Self> {
        Self::open(config.url(), config.sub_protocol()).await
    }

    /// Performs the WebSocket handshake advertising `sub_protocol`.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if `url` is empty
    /// - [`Error::Connection`] if the handshake does not finish within 30s
    /// - [`Error::WebSocket`] if the handshake fails
    /// - [`Error::SubProtocolRejected`] if the server picks another sub-protocol
    pub async fn open(url: &str, sub_protocol: SubProtocol) -> Result<Self> {
        if url.is_empty() {
            return Err(Error::config("No URL provided"));
        }

        let mut request = url.into_client_request()?;
        request.headers_mut().insert(
            SEC_WEBSOCKET_PROTOCOL,
            HeaderValue::from_static(sub_protocol.as_str()),
        );

        debug!(url, %sub_protocol, "Opening WebSocket tunnel");

        let (stream, response) = timeout(HANDSHAKE_TIMEOUT, connect_async(request))
            .await
            .map_err(|_| {
                Error::connection(format!(
                    "Handshake timed out after {}ms",
                    HANDSHAKE_TIMEOUT.as_millis()
                ))
            })??;

        let negotiated = response
            .headers()
            .get(SEC_WEBSOCKET_PROTOCOL)
            .and_then(|v| v.to_str().ok());

        if negotiated != Some(sub_protocol.as_str()) {
            return Err(Error::sub_protocol_rejected(
                sub_protocol.as_str(),
                negotiated,
            ));
        }

        info!(url, %sub_protocol, "WebSocket tunnel established");

        Ok(Self {
            stream,
            sub_protocol,
            url: url.to_string(),
        })
    }

    /// Returns the negotiated sub-protocol.
    #[inline]
    #[must_use]
    pub fn sub_protocol(&self) -> SubProtocol {
        self.sub_protocol
    }

    /// Returns the endpoint URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends bytes, framed for the negotiated sub-protocol.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the tunnel is already closed
    /// - [`Error::WebSocket`] if the frame cannot be written
    pub async fn send(&mut self, data: &[u8]) -> Result<()> {
        let message = match self.sub_protocol {
            SubProtocol::Binary => Message::Binary(data.to_vec().into()),
            SubProtocol::Text => Message::Text(STANDARD.encode(data).into()),
        };

        self.stream.send(message).await.map_err(map_send_error)?;
        trace!(len = data.len(), "Tunnel frame sent");
        Ok(())
    }

    /// Receives the next chunk of bytes.
    ///
    /// Returns `Ok(None)` once the server closes the tunnel.
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`] if a frame does not match the sub-protocol
    /// - [`Error::Base64`] if a `text` frame is not valid base64
    /// - [`Error::WebSocket`] on transport failure
    pub async fn recv(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            let Some(message) = self.stream.next().await else {
                debug!("Tunnel stream ended");
                return Ok(None);
            };

            match (message?, self.sub_protocol) {
                (Message::Binary(bytes), SubProtocol::Binary) => return Ok(Some(bytes.to_vec())),

                (Message::Text(text), SubProtocol::Text) => {
                    return Ok(Some(STANDARD.decode(text.as_str())?));
                }

                (Message::Close(frame), _) => {
                    debug!(?frame, "Tunnel closed by server");
                    return Ok(None);
                }

                (Message::Binary(_), SubProtocol::Text) => {
                    return Err(Error::protocol("Binary frame on a text tunnel"));
                }

                (Message::Text(_), SubProtocol::Binary) => {
                    return Err(Error::protocol("Text frame on a binary tunnel"));
                }

                // Ping, Pong and raw frames are handled by tungstenite
                _ => {}
            }
        }
    }

    /// Closes the tunnel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WebSocket`] if the close frame cannot be sent.
    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        debug!(url = %self.url, "Tunnel closed");
        Ok(())
    }
}

/// Folds tungstenite's closed-socket errors into [`Error::ConnectionClosed`].
fn map_send_error(e: WsError) -> Error {
    match e {
        WsError::ConnectionClosed | WsError::AlreadyClosed => Error::ConnectionClosed,
        other => Error::WebSocket(other),
    }
}

// ============================================================================
// Tests
// ============================================================================
