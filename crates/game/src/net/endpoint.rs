use std::io;
use std::net::SocketAddr;

use tokio::net::{ToSocketAddrs, UdpSocket};

use super::protocol::{MAX_PACKET_SIZE, Message};
use super::stats::{NetworkStats, StatsCounters};

/// UDP socket speaking the ASCII game protocol.
///
/// All methods take `&self`, so one endpoint can be shared through an `Arc`
/// by the listener and every sender.
#[derive(Debug)]
pub struct NodeEndpoint {
    socket: UdpSocket,
    local_addr: SocketAddr,
    stats: StatsCounters,
}

impl NodeEndpoint {
    pub async fn bind<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        let local_addr = socket.local_addr()?;

        Ok(Self {
            socket,
            local_addr,
            stats: StatsCounters::default(),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn stats(&self) -> NetworkStats {
        self.stats.snapshot()
    }

    pub async fn send_to(&self, message: &Message, addr: SocketAddr) -> io::Result<usize> {
        let data = message.encode();
        if data.len() > MAX_PACKET_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Message exceeds datagram limit",
            ));
        }

        let bytes = self.socket.send_to(&data, addr).await?;
        self.stats.record_sent(bytes);
        Ok(bytes)
    }

    /// Waits for the next well-formed message.
    ///
    /// Datagrams that fail to decode are counted as dropped and skipped.
    pub async fn receive(&self) -> io::Result<(Message, SocketAddr)> {
        let mut buf = [0u8; MAX_PACKET_SIZE];
        loop {
            let (size, addr) = self.socket.recv_from(&mut buf).await?;
            match Message::decode(&buf[..size]) {
                Ok(message) => {
                    self.stats.record_received(size);
                    return Ok((message, addr));
                }
                Err(e) => {
                    self.stats.record_dropped();
                    log::debug!("Dropping datagram from {}: {}", addr, e);
                }
            }
        }
    }
}
