//! Minimal WebSocket client helpers for receiving the feed.

use std::{path::Path, sync::Arc};

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, connect_async_tls_with_config, tungstenite::Message, Connector,
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::TlsError;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// What one read from the socket produced.
#[derive(Debug, PartialEq)]
pub enum Feed {
    Frame(String),
    /// Binary or control frame; nothing to dispatch.
    Skip,
    Closed,
}

pub fn parse_feed_url(url: &str) -> anyhow::Result<Url> {
    let parsed = Url::parse(url)?;
    match parsed.scheme() {
        "ws" | "wss" => Ok(parsed),
        other => anyhow::bail!("unsupported scheme '{other}' in {url} (expected ws:// or wss://)"),
    }
}

// Root store built from the user's CA bundle, used for wss:// with self-signed feeds
fn tls_connector(ca_path: &Path) -> Result<Connector, TlsError> {
    let pem = std::fs::read(ca_path).map_err(|source| TlsError::Read {
        path: ca_path.to_path_buf(),
        source,
    })?;
    let mut roots = rustls::RootCertStore::empty();
    for cert in rustls_pemfile::certs(&mut pem.as_slice()) {
        let cert = cert.map_err(|source| TlsError::Read {
            path: ca_path.to_path_buf(),
            source,
        })?;
        roots.add(cert)?;
    }
    if roots.is_empty() {
        return Err(TlsError::NoCertificates(ca_path.to_path_buf()));
    }
    let cfg = rustls::ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    Ok(Connector::Rustls(Arc::new(cfg)))
}

// Connect to the feed and return the WS stream
pub async fn connect(url: &str, tls_ca: Option<&str>) -> anyhow::Result<WsStream> {
    let parsed = parse_feed_url(url)?;
    let ws = match tls_ca {
        Some(ca) if parsed.scheme() == "wss" => {
            let connector = tls_connector(Path::new(ca))?;
            let (ws, _) =
                connect_async_tls_with_config(url, None, false, Some(connector)).await?;
            ws
        }
        _ => {
            if tls_ca.is_some() {
                warn!(url, "--tls-ca ignored for a plain ws:// feed");
            }
            let (ws, _) = connect_async(url).await?;
            ws
        }
    };
    info!(url, "connected to feed");
    Ok(ws)
}

/// Await the next frame. Cancel-safe: the only await point is the stream poll.
pub async fn next_frame(ws: &mut WsStream) -> Feed {
    match ws.next().await {
        Some(Ok(Message::Text(text))) => Feed::Frame(text),
        Some(Ok(Message::Close(reason))) => {
            info!(?reason, "feed closed the connection");
            Feed::Closed
        }
        Some(Ok(_)) => {
            debug!("ignoring non-text frame");
            Feed::Skip
        }
        Some(Err(e)) => {
            warn!(error = %e, "feed read failed");
            Feed::Closed
        }
        None => Feed::Closed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_url_requires_ws_scheme() {
        assert!(parse_feed_url("ws://127.0.0.1:5000/ws").is_ok());
        assert!(parse_feed_url("wss://feed.example/ws").is_ok());
        assert!(parse_feed_url("http://127.0.0.1:5000/").is_err());
        assert!(parse_feed_url("not a url").is_err());
    }

    #[test]
    fn missing_ca_file_is_read_error() {
        let Err(err) = tls_connector(Path::new("/definitely/not/here.pem")) else {
            panic!("missing CA file accepted");
        };
        assert!(matches!(err, TlsError::Read { .. }));
    }

    #[test]
    fn ca_file_without_certs_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pem");
        std::fs::write(&path, "no pem blocks here\n").unwrap();
        let Err(err) = tls_connector(&path) else {
            panic!("CA file without certificates accepted");
        };
        assert!(matches!(err, TlsError::NoCertificates(_)));
    }
}
