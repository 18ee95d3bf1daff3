#![cfg_attr(not(any(test, feature = "utils")), no_std)]

//! Infrared decode dispatcher and serial framing.
//!
//! The firmware side polls a [`CaptureEngine`], runs the [`DecodeEngine`] on each
//! finished capture and writes one fixed-layout [`Frame`] per new code to a
//! [`Transport`]. The host side (feature `utils`) reads those frames back off a
//! serial port.

pub mod capturer;
pub mod decoder;
pub mod dispatch;
pub mod protocol;
pub mod transport;

#[cfg(feature = "utils")]
pub mod link;

pub use capturer::{CaptureEngine, Capturer, RawCapture};
pub use decoder::{DecodeEngine, NullDecoder};
pub use dispatch::{DispatchConfig, Dispatcher, Outcome, RawPayload, RepeatCode, SendError};
pub use protocol::{DecodedEvent, Frame, FrameError, FrameParser, ProtocolId};
pub use transport::{Diagnostics, NoDiagnostics, TextDiagnostics, Transport};

#[cfg(feature = "utils")]
pub use link::{FrameReader, LinkConfig, SerialLink};
