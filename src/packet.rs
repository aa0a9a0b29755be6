//! Wire-format definitions for protocol segments.
//!
//! Every datagram exchanged between peers is a [`Segment`].  This module is
//! responsible for:
//! - Defining the on-wire binary layout (type tag, header fields, payload).
//! - Serialising a [`Segment`] into a byte buffer ready for transmission.
//! - Deserialising a raw byte slice back into a [`Segment`], returning an
//!   error for a truncated header or an unknown type tag.
//!
//! No I/O happens here — this is pure data transformation.
//!
//! # Wire format
//!
//! All multi-byte integers are **big-endian**.
//!
//! ```text
//! +------+---------------+---------------+--------+------+-------------+
//! | type |   seq (u32)   |   ack (u32)   | length | rsvd | payload ... |
//! |  1B  |      4B       |      4B       |   2B   |  1B  |    var      |
//! +------+---------------+---------------+--------+------+-------------+
//! ```
//!
//! Total header size: [`HEADER_LEN`] = 12 bytes, fixed regardless of payload.
//! `seq` and `ack` are **byte offsets** into the logical stream, not segment
//! indices.  The `length` field declares the payload size; [`Segment::decode`]
//! deliberately does *not* cross-check it against the bytes actually present
//! in the datagram — UDP delivery is message-bounded, so the payload slice is
//! taken verbatim and the declared length is carried alongside it.

use thiserror::Error;

/// Byte length of the fixed-size header on the wire.
pub const HEADER_LEN: usize = 12;

// Byte offsets of each field within the serialised header.
const OFF_TYPE: usize = 0;
const OFF_SEQ: usize = 1;
const OFF_ACK: usize = 5;
const OFF_LENGTH: usize = 9;
const OFF_RESERVED: usize = 11;

/// Segment type tag (first header byte on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SegmentKind {
    /// Handshake initiation.
    Syn = 0,
    /// Handshake response.
    SynAck = 1,
    /// Cumulative acknowledgment.
    Ack = 2,
    /// Application payload.
    Data = 3,
}

impl SegmentKind {
    fn from_wire(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Syn),
            1 => Some(Self::SynAck),
            2 => Some(Self::Ack),
            3 => Some(Self::Data),
            _ => None,
        }
    }
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syn => write!(f, "SYN"),
            Self::SynAck => write!(f, "SYN-ACK"),
            Self::Ack => write!(f, "ACK"),
            Self::Data => write!(f, "DATA"),
        }
    }
}

/// A complete protocol datagram: 12-byte header + payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Segment type tag.
    pub kind: SegmentKind,
    /// Byte offset of the first payload byte in the logical stream.
    pub seq: u32,
    /// Cumulative acknowledgment: all stream bytes below this offset are
    /// confirmed received.
    pub ack: u32,
    /// Payload length as declared in the header.
    ///
    /// On encode this is computed from the actual payload.  On decode it is
    /// whatever the peer declared, which a truncated datagram may contradict.
    pub length: u16,
    /// Payload bytes as actually present in the datagram.
    pub payload: Vec<u8>,
}

impl Segment {
    /// Handshake initiation carrying the client's initial sequence number.
    pub fn syn(seq: u32) -> Self {
        Self::new(SegmentKind::Syn, seq, 0, Vec::new())
    }

    /// Handshake response: server ISN plus acknowledgment of the client's.
    pub fn syn_ack(seq: u32, ack: u32) -> Self {
        Self::new(SegmentKind::SynAck, seq, ack, Vec::new())
    }

    /// Pure cumulative acknowledgment.
    pub fn ack(ack: u32) -> Self {
        Self::new(SegmentKind::Ack, 0, ack, Vec::new())
    }

    /// Payload segment at byte offset `seq`.
    pub fn data(seq: u32, payload: Vec<u8>) -> Self {
        Self::new(SegmentKind::Data, seq, 0, payload)
    }

    fn new(kind: SegmentKind, seq: u32, ack: u32, payload: Vec<u8>) -> Self {
        debug_assert!(payload.len() <= u16::MAX as usize);
        let length = payload.len() as u16;
        Self {
            kind,
            seq,
            ack,
            length,
            payload,
        }
    }

    /// Serialise this segment into a newly allocated byte vector of exactly
    /// `HEADER_LEN + payload.len()` bytes.
    ///
    /// The `length` field on the wire is computed from the actual payload;
    /// any value already stored in `self.length` is ignored.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0u8; HEADER_LEN + self.payload.len()];

        buf[OFF_TYPE] = self.kind as u8;
        buf[OFF_SEQ..OFF_SEQ + 4].copy_from_slice(&self.seq.to_be_bytes());
        buf[OFF_ACK..OFF_ACK + 4].copy_from_slice(&self.ack.to_be_bytes());
        buf[OFF_LENGTH..OFF_LENGTH + 2]
            .copy_from_slice(&(self.payload.len() as u16).to_be_bytes());
        buf[OFF_RESERVED] = 0;
        buf[HEADER_LEN..].copy_from_slice(&self.payload);

        buf
    }

    /// Parse a [`Segment`] from a raw datagram.
    ///
    /// Fails with [`SegmentError::MalformedHeader`] when `buf` holds fewer
    /// than [`HEADER_LEN`] bytes and [`SegmentError::UnknownType`] for an
    /// unrecognised type tag.  The payload is everything after the header;
    /// the declared `length` is **not** validated against it.
    pub fn decode(buf: &[u8]) -> Result<Self, SegmentError> {
        if buf.len() < HEADER_LEN {
            return Err(SegmentError::MalformedHeader { len: buf.len() });
        }

        let kind = SegmentKind::from_wire(buf[OFF_TYPE])
            .ok_or(SegmentError::UnknownType(buf[OFF_TYPE]))?;
        let seq = u32::from_be_bytes(buf[OFF_SEQ..OFF_SEQ + 4].try_into().unwrap());
        let ack = u32::from_be_bytes(buf[OFF_ACK..OFF_ACK + 4].try_into().unwrap());
        let length = u16::from_be_bytes(buf[OFF_LENGTH..OFF_LENGTH + 2].try_into().unwrap());

        Ok(Segment {
            kind,
            seq,
            ack,
            length,
            payload: buf[HEADER_LEN..].to_vec(),
        })
    }
}

/// Errors that can arise when parsing a raw datagram.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum SegmentError {
    /// Fewer than [`HEADER_LEN`] bytes — not even a full header arrived.
    #[error("malformed header: {len} bytes is shorter than the {HEADER_LEN}-byte header")]
    MalformedHeader {
        /// Actual number of bytes received.
        len: usize,
    },
    /// The type tag is none of SYN / SYN-ACK / ACK / DATA.
    #[error("unknown segment type tag {0:#04x}")]
    UnknownType(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let seg = Segment::data(4000, b"hello".to_vec());
        let decoded = Segment::decode(&seg.encode()).unwrap();
        assert_eq!(decoded.kind, SegmentKind::Data);
        assert_eq!(decoded.seq, 4000);
        assert_eq!(decoded.ack, 0);
        assert_eq!(decoded.length, 5);
        assert_eq!(decoded.payload, b"hello");
    }

    #[test]
    fn header_is_fixed_twelve_bytes() {
        assert_eq!(HEADER_LEN, 12);
        assert_eq!(Segment::ack(7).encode().len(), HEADER_LEN);
        assert_eq!(
            Segment::data(0, vec![0xAB; 80]).encode().len(),
            HEADER_LEN + 80
        );
    }

    #[test]
    fn fields_are_big_endian_on_wire() {
        let seg = Segment::syn_ack(0x0102_0304, 0x0506_0708);
        let bytes = seg.encode();
        assert_eq!(bytes[OFF_TYPE], 1);
        assert_eq!(&bytes[OFF_SEQ..OFF_SEQ + 4], &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(&bytes[OFF_ACK..OFF_ACK + 4], &[0x05, 0x06, 0x07, 0x08]);
        assert_eq!(bytes[OFF_RESERVED], 0);
    }

    #[test]
    fn length_field_matches_payload() {
        let bytes = Segment::data(160, vec![9u8; 300]).encode();
        let declared = u16::from_be_bytes([bytes[OFF_LENGTH], bytes[OFF_LENGTH + 1]]);
        assert_eq!(declared, 300);
    }

    #[test]
    fn decode_five_byte_buffer_is_malformed() {
        assert_eq!(
            Segment::decode(&[0u8; 5]),
            Err(SegmentError::MalformedHeader { len: 5 })
        );
    }

    #[test]
    fn decode_empty_buffer_is_malformed() {
        assert_eq!(
            Segment::decode(&[]),
            Err(SegmentError::MalformedHeader { len: 0 })
        );
    }

    #[test]
    fn decode_unknown_type_tag_fails() {
        let mut bytes = Segment::ack(1).encode();
        bytes[OFF_TYPE] = 9;
        assert_eq!(Segment::decode(&bytes), Err(SegmentError::UnknownType(9)));
    }

    #[test]
    fn decode_does_not_validate_declared_length() {
        // Truncated datagram: header claims 4 payload bytes, only 2 arrived.
        let mut bytes = Segment::data(0, b"data".to_vec()).encode();
        bytes.truncate(HEADER_LEN + 2);
        let seg = Segment::decode(&bytes).unwrap();
        assert_eq!(seg.length, 4);
        assert_eq!(seg.payload, b"da");
    }

    #[test]
    fn empty_payload_roundtrip() {
        let seg = Segment::ack(2400);
        let decoded = Segment::decode(&seg.encode()).unwrap();
        assert_eq!(decoded.kind, SegmentKind::Ack);
        assert_eq!(decoded.ack, 2400);
        assert_eq!(decoded.length, 0);
        assert!(decoded.payload.is_empty());
    }
}
