use crate::capturer::RawCapture;
use crate::protocol::ProtocolId;

/// Protocol decoder run once per finished capture.
///
/// `decode` updates the reported fields, which are read back afterwards.
pub trait DecodeEngine {
    fn decode(&mut self, capture: &RawCapture<'_>);
    /// `ProtocolId::UNKNOWN` when no protocol matched the last capture
    fn protocol(&self) -> ProtocolId;
    fn value(&self) -> u32;
    fn bits(&self) -> u8;
}

/// Decoder that never recognizes anything.
///
/// Every capture takes the raw path, which makes the bridge a pulse dumper for
/// learning new remotes.
#[derive(Debug, Default)]
pub struct NullDecoder {
    decoded: usize,
}

impl NullDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures seen so far
    pub fn decoded(&self) -> usize {
        self.decoded
    }
}

impl DecodeEngine for NullDecoder {
    fn decode(&mut self, _capture: &RawCapture<'_>) {
        self.decoded += 1;
    }

    fn protocol(&self) -> ProtocolId {
        ProtocolId::UNKNOWN
    }

    fn value(&self) -> u32 {
        0
    }

    fn bits(&self) -> u8 {
        0
    }
}
