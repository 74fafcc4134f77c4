//! TCP health check.

use crate::options::TcpOptions;
use async_trait::async_trait;
use healthcheck_core::{format_host, HealthCheckError, HealthChecker};
use std::fmt;
use std::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

/// Checks that a TCP service accepts connections and, optionally, answers
/// a payload with the expected bytes.
#[derive(Debug, Clone, Default)]
pub struct TcpHealthCheck {
    options: TcpOptions,
}

impl TcpHealthCheck {
    pub fn new(options: TcpOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TcpOptions {
        &self.options
    }

    async fn connect(&self, host: &str) -> Result<TcpStream, HealthCheckError> {
        let host = format_host(host, self.options.alt_port)?;
        let stream = match timeout(self.options.timeout(), TcpStream::connect(&host)).await {
            Ok(stream) => stream,
            Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "i/o timeout")),
        };
        let stream = stream.map_err(|source| HealthCheckError::Io {
            context: "failed to connect",
            source,
        })?;
        debug!(%host, "TCP connection established");
        Ok(stream)
    }
}

impl fmt::Display for TcpHealthCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TcpHealthCheck")
    }
}

#[async_trait]
impl HealthChecker for TcpHealthCheck {
    async fn check(&self, host: &str) -> Result<(), HealthCheckError> {
        let mut stream = self.connect(host).await?;

        if let Some(send) = &self.options.send {
            stream
                .write_all(send.data())
                .await
                .map_err(|source| HealthCheckError::Io {
                    context: "failed to write payload",
                    source,
                })?;
        }

        for expected in &self.options.receive {
            let expected = expected.data();
            let mut buf = vec![0u8; expected.len()];
            let read = match timeout(self.options.timeout(), stream.read_exact(&mut buf)).await {
                Ok(read) => read,
                Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "i/o timeout")),
            };
            read.map_err(|source| HealthCheckError::ReadFailed {
                expected: expected.len(),
                source,
            })?;

            if buf != expected {
                return Err(HealthCheckError::PayloadMismatch {
                    expected: String::from_utf8_lossy(expected).into_owned(),
                    received: String::from_utf8_lossy(&buf).into_owned(),
                });
            }
            trace!(len = buf.len(), "TCP response matched");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthcheck_core::Payload;
    use std::time::Duration;
    use tokio::net::TcpListener;

    /// Accepts one connection, reads `expect_len` bytes and writes `response`.
    async fn serve_once(response: &'static [u8], expect_len: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; expect_len];
            stream.read_exact(&mut buf).await.unwrap();
            stream.write_all(response).await.unwrap();
            // Keep the connection open until the client is done reading.
            let mut rest = Vec::new();
            let _ = stream.read_to_end(&mut rest).await;
        });
        addr
    }

    #[tokio::test]
    async fn test_connect_only() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let checker = TcpHealthCheck::default();
        assert!(checker.check(&addr).await.is_ok());
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let err = TcpHealthCheck::default().check(&addr).await.unwrap_err();
        assert!(err.to_string().starts_with("failed to connect"), "{}", err);
    }

    #[tokio::test]
    async fn test_missing_port() {
        let err = TcpHealthCheck::default().check("127.0.0.1").await.unwrap_err();
        assert!(matches!(err, HealthCheckError::InvalidAddress { .. }));
    }

    #[tokio::test]
    async fn test_payload_match() {
        let addr = serve_once(b"pong", 4).await;
        let checker = TcpHealthCheck::new(TcpOptions {
            send: Some(Payload::text("ping")),
            receive: vec![Payload::text("po"), Payload::binary(b"ng".to_vec())],
            ..Default::default()
        });
        checker.check(&addr).await.unwrap();
    }

    #[tokio::test]
    async fn test_payload_mismatch() {
        let addr = serve_once(b"nope", 4).await;
        let checker = TcpHealthCheck::new(TcpOptions {
            send: Some(Payload::text("ping")),
            receive: vec![Payload::text("pong")],
            ..Default::default()
        });
        let err = checker.check(&addr).await.unwrap_err();
        assert_eq!(err.to_string(), "expected pong, got nope");
    }

    #[tokio::test]
    async fn test_read_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
            drop(stream);
        });

        let checker = TcpHealthCheck::new(TcpOptions {
            receive: vec![Payload::text("pong")],
            timeout: Duration::from_millis(100),
            ..Default::default()
        });
        let err = checker.check(&addr).await.unwrap_err();
        assert!(err.to_string().starts_with("failed to read 4 bytes"), "{}", err);
        server.abort();
    }

    #[tokio::test]
    async fn test_alt_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let checker = TcpHealthCheck::new(TcpOptions {
            alt_port: Some(port),
            ..Default::default()
        });
        checker.check("127.0.0.1:1").await.unwrap();
    }

    #[test]
    fn test_display() {
        assert_eq!(TcpHealthCheck::default().to_string(), "TcpHealthCheck");
    }
}
