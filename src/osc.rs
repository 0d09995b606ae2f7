//! OSC control channel.
//!
//! One blocking worker receives datagrams, decodes them with `rosc`, and
//! turns each recognized address into an `EngineCommand` on the bounded
//! queue the frame loop drains. Bad arities, bad types and unknown addresses
//! are warned and dropped; nothing from this side can fail the render
//! thread. The two loader addresses do their file I/O here so the frame
//! loop never touches the disk.

use crate::engine::EngineCommand;
use crate::store;
use log::{debug, warn};
use regex::Regex;
use rosc::{decoder, OscMessage, OscPacket, OscType};
use std::net::UdpSocket;
use std::sync::mpsc::SyncSender;

/// Receive loop; runs until the engine side hangs up.
pub fn run_input_worker(socket: UdpSocket, tx: SyncSender<EngineCommand>) {
    let palette_route =
        Regex::new(r"^/palette/([A-E0-4])/([0-5])$").expect("palette route regex is valid");
    let mut buf = [0u8; decoder::MTU];

    loop {
        let (size, peer) = match socket.recv_from(&mut buf) {
            Ok(received) => received,
            Err(e) => {
                warn!("control socket receive failed: {}", e);
                continue;
            }
        };
        match decoder::decode_udp(&buf[..size]) {
            Ok((_, packet)) => {
                if !dispatch_packet(packet, &palette_route, &tx) {
                    // Engine gone; no point receiving further.
                    return;
                }
            }
            Err(e) => warn!("malformed OSC packet from {}: {:?}", peer, e),
        }
    }
}

/// Returns false once the command queue is disconnected.
fn dispatch_packet(
    packet: OscPacket,
    palette_route: &Regex,
    tx: &SyncSender<EngineCommand>,
) -> bool {
    match packet {
        OscPacket::Message(message) => {
            debug!("osc: {} {:?}", message.addr, message.args);
            match command_for(&message, palette_route) {
                Some(command) => tx.send(command).is_ok(),
                None => true,
            }
        }
        OscPacket::Bundle(bundle) => {
            for inner in bundle.content {
                if !dispatch_packet(inner, palette_route, tx) {
                    return false;
                }
            }
            true
        }
    }
}

fn command_for(message: &OscMessage, palette_route: &Regex) -> Option<EngineCommand> {
    match message.addr.as_str() {
        "/load_json" => {
            let path = string_arg(message)?;
            match store::load_scene_set(&path) {
                Ok(set) => Some(EngineCommand::LoadShow(set)),
                Err(e) => {
                    warn!("loading scenes from {} failed: {:#}", path, e);
                    None
                }
            }
        }
        "/load_dissolve_json" => {
            let path = string_arg(message)?;
            match store::load_dissolve_set(&path) {
                Ok(set) => Some(EngineCommand::LoadDissolves(set)),
                Err(e) => {
                    warn!("loading dissolve patterns from {} failed: {:#}", path, e);
                    None
                }
            }
        }
        "/change_scene" => index_arg(message).map(EngineCommand::CacheScene),
        "/change_effect" => index_arg(message).map(EngineCommand::CacheEffect),
        "/change_palette" => index_arg(message).map(EngineCommand::CachePalette),
        "/change_pattern" => Some(EngineCommand::TriggerPattern),
        "/pause" => Some(EngineCommand::Pause),
        "/resume" => Some(EngineCommand::Resume),
        "/set_dissolve_pattern" => index_arg(message).map(EngineCommand::SetDissolvePattern),
        "/set_speed_percent" => int_arg(message).map(EngineCommand::SetSpeedPercent),
        "/master_brightness" => int_arg(message).map(EngineCommand::SetMasterBrightness),
        addr => {
            if let Some(captures) = palette_route.captures(addr) {
                return palette_command(message, &captures);
            }
            warn!("unsupported OSC address: {}", addr);
            None
        }
    }
}

/// `/palette/{pid}/{cid}` with pid `0-4` or `A-E` and cid `0-5`; three
/// integer arguments carry the RGB value, clamped to 0-255.
fn palette_command(message: &OscMessage, captures: &regex::Captures) -> Option<EngineCommand> {
    let pid = captures.get(1)?.as_str().chars().next()?;
    let palette = match pid {
        'A'..='E' => pid as usize - 'A' as usize,
        _ => pid.to_digit(10)? as usize,
    };
    let color = captures.get(2)?.as_str().parse::<usize>().ok()?;

    if message.args.len() < 3 {
        warn!(
            "{} expects 3 RGB arguments, got {}",
            message.addr,
            message.args.len()
        );
        return None;
    }
    let mut rgb = [0u8; 3];
    for (slot, arg) in rgb.iter_mut().zip(&message.args) {
        let value = coerce_int(arg)?;
        if !(0..=255).contains(&value) {
            warn!("{}: RGB value {} clamped to 0-255", message.addr, value);
        }
        *slot = value.clamp(0, 255) as u8;
    }
    Some(EngineCommand::UpdatePaletteEntry {
        palette,
        color,
        rgb,
    })
}

fn string_arg(message: &OscMessage) -> Option<String> {
    match message.args.first() {
        Some(OscType::String(s)) => Some(s.clone()),
        _ => {
            warn!("{} expects a string argument", message.addr);
            None
        }
    }
}

fn coerce_int(arg: &OscType) -> Option<i64> {
    match arg {
        OscType::Int(v) => Some(*v as i64),
        OscType::Long(v) => Some(*v),
        OscType::Float(v) => {
            warn!("float OSC argument {} truncated to integer", v);
            Some(*v as i64)
        }
        OscType::Double(v) => {
            warn!("double OSC argument {} truncated to integer", v);
            Some(*v as i64)
        }
        _ => None,
    }
}

fn int_arg(message: &OscMessage) -> Option<i64> {
    let value = message.args.first().and_then(coerce_int);
    if value.is_none() {
        warn!("{} expects an integer argument", message.addr);
    }
    value
}

fn index_arg(message: &OscMessage) -> Option<usize> {
    let value = int_arg(message)?;
    if value < 0 {
        warn!("{}: id {} must be non-negative", message.addr, value);
        return None;
    }
    Some(value as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(addr: &str, args: Vec<OscType>) -> OscMessage {
        OscMessage {
            addr: addr.to_string(),
            args,
        }
    }

    fn route() -> Regex {
        Regex::new(r"^/palette/([A-E0-4])/([0-5])$").unwrap()
    }

    #[test]
    fn scene_change_maps_to_cache_command() {
        let cmd = command_for(&message("/change_scene", vec![OscType::Int(2)]), &route());
        assert!(matches!(cmd, Some(EngineCommand::CacheScene(2))));
    }

    #[test]
    fn negative_and_missing_ids_are_rejected() {
        assert!(command_for(&message("/change_effect", vec![OscType::Int(-1)]), &route()).is_none());
        assert!(command_for(&message("/change_effect", vec![]), &route()).is_none());
        assert!(
            command_for(
                &message("/change_effect", vec![OscType::String("x".into())]),
                &route()
            )
            .is_none()
        );
    }

    #[test]
    fn palette_route_accepts_letters_and_digits() {
        let args = vec![OscType::Int(10), OscType::Int(300), OscType::Int(-4)];
        let cmd = command_for(&message("/palette/C/5", args.clone()), &route());
        match cmd {
            Some(EngineCommand::UpdatePaletteEntry {
                palette,
                color,
                rgb,
            }) => {
                assert_eq!(palette, 2);
                assert_eq!(color, 5);
                assert_eq!(rgb, [10, 255, 0]);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cmd = command_for(&message("/palette/0/0", args), &route());
        assert!(matches!(
            cmd,
            Some(EngineCommand::UpdatePaletteEntry { palette: 0, color: 0, .. })
        ));
    }

    #[test]
    fn palette_route_rejects_out_of_range_ids() {
        let args = vec![OscType::Int(1), OscType::Int(2), OscType::Int(3)];
        assert!(command_for(&message("/palette/7/0", args.clone()), &route()).is_none());
        assert!(command_for(&message("/palette/A/6", args), &route()).is_none());
    }

    #[test]
    fn unknown_address_is_dropped() {
        assert!(command_for(&message("/nope", vec![]), &route()).is_none());
    }
}
