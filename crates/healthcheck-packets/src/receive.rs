//! Background receive loop feeding ICMP packets to a correlation loop.

use crate::IcmpSocket;
use std::io;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, trace};

/// Capacity of the queue between the receive task and its consumer.
pub const RECEIVE_QUEUE_CAPACITY: usize = 5;

/// Size of the buffer each read lands in.
pub const READ_BUFFER_SIZE: usize = 1500;

/// A datagram read from an ICMP socket.
#[derive(Debug, Clone)]
pub struct ProbePacket {
    bytes: Vec<u8>,
    /// Address the datagram came from.
    pub peer: IpAddr,
}

impl ProbePacket {
    pub fn new(bytes: Vec<u8>, peer: IpAddr) -> Self {
        Self { bytes, peer }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Handle on a task reading an [`IcmpSocket`] until told to stop.
///
/// Reads are bounded by `delay` and re-armed when it expires, so the task
/// notices a stop request promptly. A hard socket error is forwarded on the
/// queue and ends the task. Dropping the handle aborts the task; call
/// [`PacketReceiver::stop`] to wait until the task released the socket.
pub struct PacketReceiver {
    rx: mpsc::Receiver<io::Result<ProbePacket>>,
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PacketReceiver {
    /// Spawns the receive task on the current runtime.
    pub fn spawn(socket: Arc<IcmpSocket>, delay: Duration) -> Self {
        let (tx, rx) = mpsc::channel(RECEIVE_QUEUE_CAPACITY);
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(receive_loop(socket, delay, tx, stop_rx));
        Self {
            rx,
            stop: Some(stop_tx),
            task: Some(task),
        }
    }

    /// Wraps an existing queue fed by something other than a socket task.
    ///
    /// [`PacketReceiver::stop`] only closes the queue in that case.
    pub fn from_queue(rx: mpsc::Receiver<io::Result<ProbePacket>>) -> Self {
        Self {
            rx,
            stop: None,
            task: None,
        }
    }

    /// Next packet, or `None` once the task is gone and the queue is empty.
    pub async fn recv(&mut self) -> Option<io::Result<ProbePacket>> {
        self.rx.recv().await
    }

    /// Signals the task to stop and waits until it has exited.
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.rx.close();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                debug!(error = %err, "ICMP receive task ended abnormally");
            }
        }
    }
}

impl Drop for PacketReceiver {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn receive_loop(
    socket: Arc<IcmpSocket>,
    delay: Duration,
    tx: mpsc::Sender<io::Result<ProbePacket>>,
    mut stop: oneshot::Receiver<()>,
) {
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    loop {
        let read = tokio::select! {
            biased;
            _ = &mut stop => return,
            read = timeout(delay, socket.recv_from(&mut buf)) => read,
        };

        let item = match read {
            Err(_) => {
                trace!("ICMP read deadline reached, re-arming");
                continue;
            }
            Ok(Ok((n, peer))) => Ok(ProbePacket::new(buf[..n].to_vec(), peer)),
            Ok(Err(err)) => {
                debug!(error = %err, "ICMP receive failed, stopping receive loop");
                Err(err)
            }
        };
        let is_err = item.is_err();

        tokio::select! {
            biased;
            _ = &mut stop => return,
            sent = tx.send(item) => {
                if sent.is_err() || is_err {
                    return;
                }
            }
        }
    }
}
