use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{AUTHORIZATION, HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use super::{FrameSink, FrameSource};
use crate::error::{Error, Result};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const WS_BASE_URL: &str = "wss://api.openai.com/v1/realtime";
pub const BETA_HEADER_VALUE: &str = "realtime=v1";

/// Everything needed to open one realtime socket.
#[derive(Clone, Copy)]
pub struct ConnectOptions<'a> {
    pub endpoint: &'a str,
    pub model: &'a str,
    pub api_key: Option<&'a str>,
    /// Value of the `OpenAI-Beta` header; `None` leaves it off.
    pub beta_header: Option<&'a str>,
    pub extra_headers: &'a [(String, String)],
}

/// Build the socket URL for `model`.
///
/// # Errors
/// Returns an error if `endpoint` is not a valid URL.
#[allow(clippy::result_large_err)]
pub fn realtime_url(endpoint: &str, model: &str) -> Result<Url> {
    let mut url = Url::parse(endpoint)?;
    url.query_pairs_mut().append_pair("model", model);
    Ok(url)
}

/// Establish a WebSocket connection to the Realtime API.
///
/// # Errors
/// Returns an error if the URL or a header is invalid, or if the handshake fails.
pub async fn connect(options: ConnectOptions<'_>) -> Result<(WsFrameSink, WsFrameSource)> {
    let url = realtime_url(options.endpoint, options.model)?;

    let mut req = url.as_str().into_client_request()?;
    let headers = req.headers_mut();
    if let Some(key) = options.api_key {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {key}"))?);
    }
    if let Some(beta) = options.beta_header {
        headers.insert(HeaderName::from_static("openai-beta"), HeaderValue::from_str(beta)?);
    }
    for (name, value) in options.extra_headers {
        headers.insert(
            HeaderName::from_bytes(name.as_bytes())?,
            HeaderValue::from_str(value)?,
        );
    }

    let (ws_stream, _) = connect_async(req).await?;
    tracing::info!("Connected to OpenAI Realtime (model {})", options.model);

    let (write, read) = ws_stream.split();
    Ok((WsFrameSink { write }, WsFrameSource { read }))
}

/// The sending half of a realtime socket.
pub struct WsFrameSink {
    write: SplitSink<Socket, Message>,
}

#[async_trait]
impl FrameSink for WsFrameSink {
    async fn send(&mut self, frame: String) -> Result<()> {
        self.write.send(Message::Text(frame.into())).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        match self.write.close().await {
            Ok(())
            | Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// The receiving half of a realtime socket.
pub struct WsFrameSource {
    read: SplitStream<Socket>,
}

#[async_trait]
impl FrameSource for WsFrameSource {
    async fn next_frame(&mut self) -> Result<Option<String>> {
        while let Some(msg) = self.read.next().await {
            match msg? {
                Message::Text(text) => return Ok(Some(text.as_str().to_owned())),
                Message::Binary(bytes) => {
                    return Ok(Some(String::from_utf8_lossy(&bytes).into_owned()));
                }
                Message::Close(frame) => {
                    return close_outcome(frame.map(|f| (f.code, f.reason.as_str().to_owned())));
                }
                // tungstenite answers pings itself.
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
        tracing::info!("WebSocket stream ended");
        Ok(None)
    }
}

#[allow(clippy::result_large_err)]
fn close_outcome(frame: Option<(CloseCode, String)>) -> Result<Option<String>> {
    match frame {
        None | Some((CloseCode::Normal | CloseCode::Away, _)) => {
            tracing::info!("WebSocket connection closed by server");
            Ok(None)
        }
        Some((code, reason)) => {
            let code = u16::from(code);
            tracing::error!("WebSocket closed abnormally (code {code}): {reason}");
            Err(Error::ConnectionClosedAbnormally { code, reason })
        }
    }
}
