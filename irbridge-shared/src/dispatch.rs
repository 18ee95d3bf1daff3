//! Decode-result dispatcher
//!
//! [`Dispatcher::poll`] runs at most one capture/decode/frame cycle per call and never
//! waits. Call it from the main loop, as often as you like.

use core::fmt;

use heapless::Vec;

use crate::capturer::{CaptureEngine, RawCapture, CAPTURE_CAPACITY};
use crate::decoder::DecodeEngine;
use crate::protocol::{DecodedEvent, Frame, ProtocolId, ACTION_INFRARED, REPEAT_CODE};
use crate::transport::{self, Diagnostics, Transport};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DispatchConfig {
    /// Action tag written into every frame
    pub action: u8,
    /// Decoder value meaning "button still held"
    pub repeat_code: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig {
            action: ACTION_INFRARED,
            repeat_code: REPEAT_CODE,
        }
    }
}

/// Repeat code that was dropped
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RepeatCode {
    pub protocol: ProtocolId,
}

/// Pulse widths of a capture no protocol matched, gap removed
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RawPayload {
    samples: Vec<u16, CAPTURE_CAPACITY>,
    samplerate: u32,
}

impl RawPayload {
    pub fn from_capture(raw: &RawCapture<'_>) -> Self {
        let pulses = raw.pulses();
        if pulses.len() > CAPTURE_CAPACITY {
            log::warn!(
                "Raw capture of {} entries truncated to {}",
                pulses.len(),
                CAPTURE_CAPACITY
            );
        }

        RawPayload {
            samples: pulses.iter().copied().take(CAPTURE_CAPACITY).collect(),
            samplerate: raw.samplerate(),
        }
    }

    /// Number of buffer entries, declared capture length minus the gap
    pub fn entries(&self) -> usize {
        self.samples.len()
    }

    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    pub fn samplerate(&self) -> u32 {
        self.samplerate
    }
}

/// What one poll cycle did with a finished capture
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Outcome {
    /// Known protocol, frame written to the transport
    Emitted(Frame),
    /// Known protocol, but only a repeat code
    Suppressed(RepeatCode),
    /// Nothing matched, samples went to the diagnostics channel
    Unrecognized(RawPayload),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SendError {
    /// No IR transmitter support yet
    NotImplemented,
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::NotImplemented => f.write_str("infrared send is not implemented"),
        }
    }
}

pub struct Dispatcher<C, D, T, G> {
    capture: C,
    decoder: D,
    transport: T,
    diagnostics: G,
    config: DispatchConfig,
}

impl<C, D, T, G> Dispatcher<C, D, T, G>
where
    C: CaptureEngine,
    D: DecodeEngine,
    T: Transport,
    G: Diagnostics,
{
    pub fn new(
        capture: C,
        decoder: D,
        transport: T,
        diagnostics: G,
        config: DispatchConfig,
    ) -> Self {
        Dispatcher {
            capture,
            decoder,
            transport,
            diagnostics,
            config,
        }
    }

    /// Dispatch the pending capture, if there is one.
    ///
    /// Returns `None` without side effects when no capture is ready. Otherwise the
    /// capture engine is re-armed before returning.
    pub fn poll(&mut self) -> Option<Outcome> {
        if !self.capture.is_ready() {
            return None;
        }

        let outcome = {
            let raw = self.capture.raw();

            self.decoder.decode(&raw);
            let protocol = self.decoder.protocol();

            if protocol.is_unknown() {
                for sample in raw.pulses() {
                    self.diagnostics.raw_sample(*sample);
                }
                self.diagnostics.end_of_dump();

                Outcome::Unrecognized(RawPayload::from_capture(&raw))
            } else if self.decoder.value() == self.config.repeat_code {
                Outcome::Suppressed(RepeatCode { protocol })
            } else {
                let event = DecodedEvent {
                    protocol,
                    value: self.decoder.value(),
                    bits: self.decoder.bits(),
                };
                let frame = Frame::new(self.config.action, event);

                if let Err(err) = transport::send_frame(&mut self.transport, &frame) {
                    log::warn!("Frame for {:?} not sent: {:?}", event, err);
                }

                Outcome::Emitted(frame)
            }
        };

        log::debug!("{:?}", outcome);

        self.capture.rearm();
        Some(outcome)
    }

    /// Transmit `package` through the IR emitter
    pub fn send(&mut self, package: &[u8]) -> Result<(), SendError> {
        log::warn!("Dropping {} byte send package: {}", package.len(), SendError::NotImplemented);
        Err(SendError::NotImplemented)
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn capture(&self) -> &C {
        &self.capture
    }

    /// For feeding samples from the sampling interrupt
    pub fn capture_mut(&mut self) -> &mut C {
        &mut self.capture
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn diagnostics(&self) -> &G {
        &self.diagnostics
    }

    pub fn release(self) -> (C, D, T, G) {
        (self.capture, self.decoder, self.transport, self.diagnostics)
    }
}
