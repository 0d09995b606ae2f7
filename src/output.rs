//! LED frame fan-out.
//!
//! Every produced frame goes out as one OSC datagram per enabled
//! destination, either as a full copy of the strip or as a per-destination
//! slice. All destinations share a single unbound UDP socket; a failed send
//! is logged and never reaches the frame loop.

use crate::color::Rgb;
use crate::config::DestinationConfig;
use log::{info, warn};
use rosc::{encoder, OscMessage, OscPacket, OscType};
use std::io;
use std::net::UdpSocket;

pub struct LedOutput {
    socket: UdpSocket,
    address: String,
    destinations: Vec<DestinationConfig>,
}

impl LedOutput {
    pub fn new(address: String, destinations: Vec<DestinationConfig>) -> io::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        let enabled = destinations.iter().filter(|d| d.enabled).count();
        if enabled == 0 {
            warn!("no enabled LED destinations configured, frames will go nowhere");
        }
        for destination in destinations.iter().filter(|d| d.enabled) {
            info!(
                "LED destination {} -> {}:{} ({})",
                destination.label(),
                destination.ip,
                destination.port,
                if destination.copy_mode {
                    "full copy".to_string()
                } else {
                    format!("LEDs {}..={}", destination.start_led, destination.end_led)
                }
            );
        }
        Ok(Self {
            socket,
            address,
            destinations,
        })
    }

    /// Send one frame to every enabled destination.
    pub fn send_frame(&self, frame: &[Rgb]) {
        for destination in &self.destinations {
            if !destination.enabled {
                continue;
            }
            let Some(payload) = payload_for(destination, frame) else {
                continue;
            };
            let packet = OscPacket::Message(OscMessage {
                addr: self.address.clone(),
                args: vec![OscType::Blob(payload)],
            });
            match encoder::encode(&packet) {
                Ok(bytes) => {
                    if let Err(e) = self
                        .socket
                        .send_to(&bytes, (destination.ip.as_str(), destination.port))
                    {
                        warn!("send to {} failed: {}", destination.label(), e);
                    }
                }
                Err(e) => warn!("failed to encode LED frame: {:?}", e),
            }
        }
    }
}

/// The RGB byte sequence for one destination: the whole strip in copy mode,
/// otherwise the configured range clipped to the strip. An empty range means
/// no emission.
fn payload_for(destination: &DestinationConfig, frame: &[Rgb]) -> Option<Vec<u8>> {
    let leds = if destination.copy_mode {
        frame
    } else {
        let last = frame.len() as i64 - 1;
        if last < 0 {
            return None;
        }
        let start = destination.start_led.max(0);
        let end = if destination.end_led < 0 {
            last
        } else {
            destination.end_led.min(last)
        };
        if start > end || start > last {
            return None;
        }
        &frame[start as usize..=end as usize]
    };
    if leds.is_empty() {
        return None;
    }
    let mut bytes = Vec::with_capacity(leds.len() * 3);
    for led in leds {
        bytes.extend_from_slice(led);
    }
    Some(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn destination(copy_mode: bool, start: i64, end: i64) -> DestinationConfig {
        DestinationConfig {
            name: String::new(),
            ip: "127.0.0.1".to_string(),
            port: 7000,
            copy_mode,
            start_led: start,
            end_led: end,
            enabled: true,
        }
    }

    #[test]
    fn copy_mode_sends_whole_strip() {
        let frame = vec![[1, 2, 3], [4, 5, 6]];
        let payload = payload_for(&destination(true, 0, -1), &frame).unwrap();
        assert_eq!(payload, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn range_is_inclusive_and_clipped() {
        let frame: Vec<Rgb> = (0..10u8).map(|i| [i, i, i]).collect();
        let payload = payload_for(&destination(false, 8, 300), &frame).unwrap();
        assert_eq!(payload.len(), 6);
        assert_eq!(&payload[0..3], &[8, 8, 8]);

        // end_led = -1 runs to the end of the strip
        let payload = payload_for(&destination(false, 5, -1), &frame).unwrap();
        assert_eq!(payload.len(), 15);
    }

    #[test]
    fn empty_range_emits_nothing() {
        let frame: Vec<Rgb> = (0..10u8).map(|i| [i, i, i]).collect();
        assert!(payload_for(&destination(false, 6, 3), &frame).is_none());
        assert!(payload_for(&destination(false, 42, -1), &frame).is_none());
        assert!(payload_for(&destination(true, 0, -1), &[]).is_none());
    }
}
