//! MQTT 3.1.1 packet encoding and decoding
//!
//! Only the packets a publishing client needs are modelled. Anything else the
//! broker sends is surfaced as [`Packet::Other`] and skipped by the session.

use crate::constants::{MQTT_MAX_REMAINING_LENGTH, MQTT_PROTOCOL_LEVEL, MQTT_PROTOCOL_NAME};
use crate::errors::{BenchError, ErrorContext, Result};
use crate::message::QoS;

pub const CONNECT: u8 = 1;
pub const CONNACK: u8 = 2;
pub const PUBLISH: u8 = 3;
pub const PUBACK: u8 = 4;
pub const PUBREC: u8 = 5;
pub const PUBREL: u8 = 6;
pub const PUBCOMP: u8 = 7;
pub const DISCONNECT: u8 = 14;

/// Fields of a CONNECT packet
#[derive(Debug, Clone)]
pub struct Connect<'a> {
    pub client_id: &'a str,
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
    pub keep_alive: u16,
    pub clean_session: bool,
}

/// Packets a publisher can receive from the broker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packet {
    ConnAck {
        session_present: bool,
        return_code: u8,
    },
    PubAck(u16),
    PubRec(u16),
    PubComp(u16),
    Other(u8),
}

/// Human-readable reason for a CONNACK return code
pub fn connack_reason(return_code: u8) -> &'static str {
    match return_code {
        0 => "connection accepted",
        1 => "unacceptable protocol version",
        2 => "identifier rejected",
        3 => "server unavailable",
        4 => "bad user name or password",
        5 => "not authorized",
        _ => "unknown return code",
    }
}

/// Append the variable-length remaining length field
pub fn encode_remaining_length(mut len: usize, buf: &mut Vec<u8>) -> Result<()> {
    if len > MQTT_MAX_REMAINING_LENGTH {
        return Err(BenchError::protocol(format!(
            "Packet of {} bytes exceeds the MQTT limit of {} bytes",
            len, MQTT_MAX_REMAINING_LENGTH
        )));
    }

    loop {
        let mut byte = (len % 128) as u8;
        len /= 128;
        if len > 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if len == 0 {
            return Ok(());
        }
    }
}

fn encode_str(value: &str, buf: &mut Vec<u8>) -> Result<()> {
    encode_bytes(value.as_bytes(), buf)
}

fn encode_bytes(value: &[u8], buf: &mut Vec<u8>) -> Result<()> {
    let len = u16::try_from(value.len())
        .with_protocol_context("String field longer than 65535 bytes")?;
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(value);
    Ok(())
}

fn finish_packet(first_byte: u8, body: &[u8], buf: &mut Vec<u8>) -> Result<()> {
    buf.push(first_byte);
    encode_remaining_length(body.len(), buf)?;
    buf.extend_from_slice(body);
    Ok(())
}

/// Encode a CONNECT packet
pub fn encode_connect(connect: &Connect<'_>, buf: &mut Vec<u8>) -> Result<()> {
    let mut body = Vec::with_capacity(32 + connect.client_id.len());

    encode_str(MQTT_PROTOCOL_NAME, &mut body)?;
    body.push(MQTT_PROTOCOL_LEVEL);

    let mut flags = 0u8;
    if connect.clean_session {
        flags |= 0x02;
    }
    if connect.password.is_some() {
        flags |= 0x40;
    }
    if connect.username.is_some() {
        flags |= 0x80;
    }
    body.push(flags);
    body.extend_from_slice(&connect.keep_alive.to_be_bytes());

    encode_str(connect.client_id, &mut body)?;
    if let Some(username) = connect.username {
        encode_str(username, &mut body)?;
    }
    if let Some(password) = connect.password {
        encode_bytes(password.as_bytes(), &mut body)?;
    }

    finish_packet(CONNECT << 4, &body, buf)
}

/// Encode a PUBLISH packet. QoS 1 and 2 require a packet id.
pub fn encode_publish(
    topic: &str,
    payload: &[u8],
    qos: QoS,
    packet_id: Option<u16>,
    buf: &mut Vec<u8>,
) -> Result<()> {
    let mut body = Vec::with_capacity(2 + topic.len() + 2 + payload.len());
    encode_str(topic, &mut body)?;

    match (qos, packet_id) {
        (QoS::AtMostOnce, _) => {}
        (_, Some(id)) => body.extend_from_slice(&id.to_be_bytes()),
        (_, None) => {
            return Err(BenchError::protocol(format!(
                "QoS {} publish requires a packet id",
                qos
            )));
        }
    }
    body.extend_from_slice(payload);

    finish_packet((PUBLISH << 4) | (qos.level() << 1), &body, buf)
}

/// Encode a PUBREL packet (second half of the QoS 2 handshake)
pub fn encode_pubrel(packet_id: u16, buf: &mut Vec<u8>) -> Result<()> {
    finish_packet((PUBREL << 4) | 0x02, &packet_id.to_be_bytes(), buf)
}

/// Encode a DISCONNECT packet
pub fn encode_disconnect(buf: &mut Vec<u8>) -> Result<()> {
    finish_packet(DISCONNECT << 4, &[], buf)
}

/// Decode a packet body given its fixed header byte
pub fn decode(first_byte: u8, body: &[u8]) -> Result<Packet> {
    let packet_type = first_byte >> 4;

    let packet_id = || -> Result<u16> {
        match body {
            [hi, lo, ..] => Ok(u16::from_be_bytes([*hi, *lo])),
            _ => Err(BenchError::protocol(format!(
                "Packet type {} is missing its packet id",
                packet_type
            ))),
        }
    };

    let packet = match packet_type {
        CONNACK => match body {
            [ack_flags, return_code] => Packet::ConnAck {
                session_present: ack_flags & 0x01 == 0x01,
                return_code: *return_code,
            },
            _ => {
                return Err(BenchError::protocol(format!(
                    "CONNACK must carry 2 bytes, got {}",
                    body.len()
                )));
            }
        },
        PUBACK => Packet::PubAck(packet_id()?),
        PUBREC => Packet::PubRec(packet_id()?),
        PUBCOMP => Packet::PubComp(packet_id()?),
        other => Packet::Other(other),
    };

    Ok(packet)
}

/// Decode the first complete packet in `buf`
///
/// Returns the packet and the number of bytes it occupied, or `None` when
/// more bytes are needed.
pub fn parse_frame(buf: &[u8]) -> Result<Option<(Packet, usize)>> {
    let Some(&first_byte) = buf.first() else {
        return Ok(None);
    };

    let mut remaining = 0usize;
    let mut multiplier = 1usize;
    let mut header_len = 1;
    loop {
        if header_len == 5 {
            return Err(BenchError::protocol(
                "Malformed remaining length: more than 4 bytes",
            ));
        }
        let Some(&byte) = buf.get(header_len) else {
            return Ok(None);
        };
        header_len += 1;
        remaining += (byte & 0x7f) as usize * multiplier;
        if byte & 0x80 == 0 {
            break;
        }
        multiplier *= 128;
    }

    let frame_len = header_len + remaining;
    if buf.len() < frame_len {
        return Ok(None);
    }

    let packet = decode(first_byte, &buf[header_len..frame_len])?;
    Ok(Some((packet, frame_len)))
}
