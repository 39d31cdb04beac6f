use std::io;
use std::net::{SocketAddr, UdpSocket};

use super::types::FeedEvent;

/// Consumer of the spectator feed.
pub trait EventSink: Send {
    fn publish(&mut self, event: &FeedEvent);
}

#[derive(Debug, Default)]
pub struct NullFeed;

impl EventSink for NullFeed {
    fn publish(&mut self, _event: &FeedEvent) {}
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn publish(&mut self, event: &FeedEvent) {
        (**self).publish(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn publish(&mut self, event: &FeedEvent) {
        (**self).publish(event);
    }
}

impl EventSink for Vec<FeedEvent> {
    fn publish(&mut self, event: &FeedEvent) {
        self.push(event.clone());
    }
}

/// Sends each event as one JSON datagram.
///
/// Publishing is synchronous on a non-blocking socket; a send that would
/// block is dropped.
#[derive(Debug)]
pub struct UdpFeed {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpFeed {
    pub fn new(target: SocketAddr) -> io::Result<Self> {
        let bind_addr: SocketAddr = if target.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let socket = UdpSocket::bind(bind_addr)?;
        socket.set_nonblocking(true)?;
        socket.set_broadcast(true)?;
        Ok(Self { socket, target })
    }
}

impl EventSink for UdpFeed {
    fn publish(&mut self, event: &FeedEvent) {
        let data = match serde_json::to_vec(event) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Failed to encode {} event: {}", event.kind(), e);
                return;
            }
        };

        if let Err(e) = self.socket.send_to(&data, self.target) {
            log::debug!("Spectator feed send to {} failed: {}", self.target, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_udp_feed_delivers_json() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_millis(500)))
            .unwrap();

        let mut feed = UdpFeed::new(receiver.local_addr().unwrap()).unwrap();
        feed.publish(&FeedEvent::Lose);

        let mut buf = [0u8; 256];
        let (len, _) = receiver.recv_from(&mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf[..len]).unwrap();
        assert_eq!(value["type"], "lose");
    }
}
