use core::convert::TryFrom;
use core::fmt;
use core::mem::size_of;

use serde::{Deserialize, Serialize};

/// Action tag marking an infrared decoded event on the serial link
pub const ACTION_INFRARED: u8 = 0x03;

/// Value the decode engine reports for a held-down button
pub const REPEAT_CODE: u32 = 0xFFFF_FFFF;

/// Byte count of the fields following the size byte: action, protocol, value, bits
pub const FRAME_SIZE: u8 =
    (size_of::<u8>() + size_of::<u8>() + size_of::<u32>() + size_of::<u8>()) as u8;

/// Length of a complete frame on the wire, size byte included
pub const FRAME_LEN: usize = FRAME_SIZE as usize + 1;

/// Protocol Id
///
/// The numbering is owned by the decode engine, so unlisted ids are carried through as is.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProtocolId(pub u8);

impl ProtocolId {
    pub const UNKNOWN: ProtocolId = ProtocolId(0);
    pub const NEC: ProtocolId = ProtocolId(1);
    pub const SONY: ProtocolId = ProtocolId(2);
    pub const RC5: ProtocolId = ProtocolId(3);
    pub const RC6: ProtocolId = ProtocolId(4);
    pub const PANASONIC_OLD: ProtocolId = ProtocolId(5);
    pub const JVC: ProtocolId = ProtocolId(6);
    pub const NECX: ProtocolId = ProtocolId(7);
    pub const SAMSUNG36: ProtocolId = ProtocolId(8);
    pub const GICABLE: ProtocolId = ProtocolId(9);
    pub const DIRECTV: ProtocolId = ProtocolId(10);
    pub const RCMM: ProtocolId = ProtocolId(11);
    pub const CYKM: ProtocolId = ProtocolId(12);

    pub fn as_u8(self) -> u8 {
        self.0
    }

    pub fn is_unknown(self) -> bool {
        self == ProtocolId::UNKNOWN
    }

    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            ProtocolId::UNKNOWN => "unknown",
            ProtocolId::NEC => "nec",
            ProtocolId::SONY => "sony",
            ProtocolId::RC5 => "rc5",
            ProtocolId::RC6 => "rc6",
            ProtocolId::PANASONIC_OLD => "panasonic",
            ProtocolId::JVC => "jvc",
            ProtocolId::NECX => "necx",
            ProtocolId::SAMSUNG36 => "samsung36",
            ProtocolId::GICABLE => "gicable",
            ProtocolId::DIRECTV => "directv",
            ProtocolId::RCMM => "rcmm",
            ProtocolId::CYKM => "cykm",
            _ => return None,
        };
        Some(name)
    }
}

impl From<u8> for ProtocolId {
    fn from(id: u8) -> Self {
        ProtocolId(id)
    }
}

impl TryFrom<&str> for ProtocolId {
    type Error = ();

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "nec" => Ok(ProtocolId::NEC),
            "sony" => Ok(ProtocolId::SONY),
            "rc5" => Ok(ProtocolId::RC5),
            "rc6" => Ok(ProtocolId::RC6),
            "panasonic" => Ok(ProtocolId::PANASONIC_OLD),
            "jvc" => Ok(ProtocolId::JVC),
            "necx" => Ok(ProtocolId::NECX),
            "samsung36" => Ok(ProtocolId::SAMSUNG36),
            "gicable" => Ok(ProtocolId::GICABLE),
            "directv" => Ok(ProtocolId::DIRECTV),
            "rcmm" => Ok(ProtocolId::RCMM),
            "cykm" => Ok(ProtocolId::CYKM),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "protocol-{}", self.0),
        }
    }
}

/// One classified infrared transmission
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
pub struct DecodedEvent {
    pub protocol: ProtocolId,
    pub value: u32,
    /// Number of significant bits in `value`
    pub bits: u8,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameError {
    /// Fewer than `FRAME_LEN` bytes
    Truncated,
    /// Size byte does not match the fixed layout
    BadSize(u8),
    /// Frame carries another action tag
    BadAction(u8),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Truncated => write!(f, "frame shorter than {} bytes", FRAME_LEN),
            FrameError::BadSize(size) => {
                write!(f, "size byte {} (expected {})", size, FRAME_SIZE)
            }
            FrameError::BadAction(action) => write!(f, "unexpected action tag {:#04x}", action),
        }
    }
}

/// Decoded event as framed for the host
///
/// ```text
/// | size | action | protocol | value (u32 le) | bits |
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Frame {
    pub action: u8,
    pub event: DecodedEvent,
}

impl Frame {
    pub fn new(action: u8, event: DecodedEvent) -> Self {
        Frame { action, event }
    }

    pub fn to_bytes(&self) -> [u8; FRAME_LEN] {
        let value = self.event.value.to_le_bytes();

        [
            FRAME_SIZE,
            self.action,
            self.event.protocol.as_u8(),
            value[0],
            value[1],
            value[2],
            value[3],
            self.event.bits,
        ]
    }

    /// Parse one frame from the start of `buf`, expecting `action` as its tag
    pub fn from_bytes(buf: &[u8], action: u8) -> Result<Frame, FrameError> {
        if buf.len() < FRAME_LEN {
            return Err(FrameError::Truncated);
        }
        if buf[0] != FRAME_SIZE {
            return Err(FrameError::BadSize(buf[0]));
        }
        if buf[1] != action {
            return Err(FrameError::BadAction(buf[1]));
        }

        let value = u32::from_le_bytes([buf[3], buf[4], buf[5], buf[6]]);

        Ok(Frame {
            action,
            event: DecodedEvent {
                protocol: ProtocolId(buf[2]),
                value,
                bits: buf[7],
            },
        })
    }
}

/// Byte-at-a-time frame parser for the receiving end of the link
///
/// Anything that does not start with the size byte followed by the expected action
/// tag is dropped, so text sharing the line is skipped over.
#[derive(Debug, Clone)]
pub struct FrameParser {
    action: u8,
    buf: [u8; FRAME_LEN],
    pos: usize,
}

impl FrameParser {
    pub fn new(action: u8) -> Self {
        FrameParser {
            action,
            buf: [0; FRAME_LEN],
            pos: 0,
        }
    }

    pub fn reset(&mut self) {
        self.pos = 0;
    }

    pub fn feed(&mut self, byte: u8) -> Option<Frame> {
        match self.pos {
            0 if byte != FRAME_SIZE => {
                log::trace!("Skipping byte {:#04x}", byte);
                return None;
            }
            1 if byte != self.action => {
                log::trace!("Resync on byte {:#04x}", byte);
                // The rejected byte may itself open the next frame
                self.pos = if byte == FRAME_SIZE { 1 } else { 0 };
                return None;
            }
            _ => (),
        }

        self.buf[self.pos] = byte;
        self.pos += 1;

        if self.pos < FRAME_LEN {
            return None;
        }

        self.reset();
        Frame::from_bytes(&self.buf, self.action).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(protocol: u8, value: u32, bits: u8) -> DecodedEvent {
        DecodedEvent {
            protocol: ProtocolId(protocol),
            value,
            bits,
        }
    }

    #[test]
    fn test_size_byte_is_static_field_width() {
        assert_eq!(FRAME_SIZE, 7);
        assert_eq!(FRAME_LEN, 8);
    }

    #[test]
    fn test_frame_layout() {
        let frame = Frame::new(ACTION_INFRARED, event(3, 0x00A5_E01F, 32));

        assert_eq!(
            frame.to_bytes(),
            [0x07, ACTION_INFRARED, 0x03, 0x1F, 0xE0, 0xA5, 0x00, 0x20]
        );
    }

    #[test]
    fn test_from_bytes_rejects_bad_header() {
        let bytes = Frame::new(ACTION_INFRARED, event(1, 0x10EF_807F, 32)).to_bytes();

        assert_eq!(
            Frame::from_bytes(&bytes[..7], ACTION_INFRARED),
            Err(FrameError::Truncated)
        );

        let mut bad_size = bytes;
        bad_size[0] = 6;
        assert_eq!(
            Frame::from_bytes(&bad_size, ACTION_INFRARED),
            Err(FrameError::BadSize(6))
        );

        assert_eq!(
            Frame::from_bytes(&bytes, 0x42),
            Err(FrameError::BadAction(ACTION_INFRARED))
        );
    }

    #[test]
    fn test_parser_skips_text_between_frames() {
        let first = Frame::new(ACTION_INFRARED, event(1, 0x20DF_10EF, 32));
        let second = Frame::new(ACTION_INFRARED, event(4, 0x0C, 20));

        let mut stream = Vec::new();
        stream.extend_from_slice(b"8950 4450 600\r\n");
        stream.extend_from_slice(&first.to_bytes());
        stream.extend_from_slice(b"12 ");
        stream.extend_from_slice(&second.to_bytes());

        let mut parser = FrameParser::new(ACTION_INFRARED);
        let frames: Vec<Frame> = stream.iter().filter_map(|b| parser.feed(*b)).collect();

        assert_eq!(frames, vec![first, second]);
    }

    #[test]
    fn test_parser_resyncs_on_repeated_size_byte() {
        let frame = Frame::new(ACTION_INFRARED, event(2, 0xA90, 12));

        let mut parser = FrameParser::new(ACTION_INFRARED);
        assert_eq!(parser.feed(FRAME_SIZE), None);

        let mut found = None;
        for b in frame.to_bytes().iter() {
            if let Some(f) = parser.feed(*b) {
                found = Some(f);
            }
        }

        assert_eq!(found, Some(frame));
    }

    #[test]
    fn test_protocol_names() {
        assert_eq!(ProtocolId::try_from("rc5"), Ok(ProtocolId::RC5));
        assert_eq!(ProtocolId::try_from("bogus"), Err(()));
        assert_eq!(ProtocolId(3).to_string(), "rc5");
        assert_eq!(ProtocolId(77).to_string(), "protocol-77");
        assert!(ProtocolId::from(0).is_unknown());
    }
}
