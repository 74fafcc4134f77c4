#![allow(dead_code)]

use healthcheck::{IcmpFamily, IcmpSocket, SocketKind};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

/// Routes checker logs to the test output. Set `RUST_LOG` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// True when the sandbox lets us open ICMP sockets of the given kind.
pub fn icmp_available(family: IcmpFamily, kind: SocketKind) -> bool {
    if std::env::var_os("HEALTHCHECK_SKIP_ICMP").is_some() {
        return false;
    }
    let available = match kind {
        SocketKind::Raw => IcmpSocket::open_listener(family).is_ok(),
        SocketKind::Datagram => IcmpSocket::open_echo(family, 0).is_ok(),
    };
    if !available {
        eprintln!("skipping: {} {:?} sockets unavailable", family, kind);
    }
    available
}

/// Local UDP server answering every datagram with a fixed response.
pub struct UdpServer {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<Vec<u8>>>>,
    count: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl UdpServer {
    /// Starts a server that sends `response` back, or nothing when it is `None`.
    pub async fn start(response: Option<&'static [u8]>) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));
        let count = Arc::new(AtomicUsize::new(0));

        let task = {
            let received = Arc::clone(&received);
            let count = Arc::clone(&count);
            tokio::spawn(async move {
                let mut buf = vec![0u8; 1024];
                while let Ok((n, peer)) = socket.recv_from(&mut buf).await {
                    received.lock().unwrap().push(buf[..n].to_vec());
                    count.fetch_add(1, Ordering::SeqCst);
                    if let Some(response) = response {
                        let _ = socket.send_to(response, peer).await;
                    }
                }
            })
        };

        Self {
            addr,
            received,
            count,
            task,
        }
    }

    pub fn addr(&self) -> String {
        self.addr.to_string()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Polls the received count until it reaches `expected` or a second passed.
    pub async fn eventually_count(&self, expected: usize) -> usize {
        for _ in 0..20 {
            if self.count() >= expected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        self.count()
    }

    pub fn received(&self) -> Vec<Vec<u8>> {
        self.received.lock().unwrap().clone()
    }

    /// Stops the server and waits until its socket is closed.
    pub async fn close(self) {
        self.task.abort();
        let _ = self.task.await;
    }
}
