use core::fmt;

use crate::protocol::Frame;

/// Outbound byte stream, usually the UART or USB serial port.
pub trait Transport {
    type Error: fmt::Debug;

    /// Write as much of `data` as the transport accepts right now.
    ///
    /// `Ok(0)` means busy, try again.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        (**self).write(data)
    }
}

/// Returned by fixed capacity buffers when nothing more fits
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BufferFull;

impl<const N: usize> Transport for heapless::Vec<u8, N> {
    type Error = BufferFull;

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        let count = data.len().min(N - self.len());
        if count == 0 && !data.is_empty() {
            return Err(BufferFull);
        }
        // Fits, checked above
        let _ = self.extend_from_slice(&data[..count]);
        Ok(count)
    }
}

#[cfg(any(test, feature = "utils"))]
impl Transport for std::vec::Vec<u8> {
    type Error = core::convert::Infallible;

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        self.extend_from_slice(data);
        Ok(data.len())
    }
}

/// Write all of `data`, spinning while the transport is busy
pub fn serial_send<T: Transport + ?Sized>(transport: &mut T, data: &[u8]) -> Result<(), T::Error> {
    let mut offset = 0;

    while offset < data.len() {
        offset += transport.write(&data[offset..])?;
    }

    Ok(())
}

pub fn send_frame<T: Transport + ?Sized>(transport: &mut T, frame: &Frame) -> Result<(), T::Error> {
    serial_send(transport, &frame.to_bytes())
}

/// Format `num` as decimal into the tail of `buf`, returns the index of the first digit.
pub fn u32_to_buf(mut num: u32, buf: &mut [u8; 10]) -> usize {
    let mut i = buf.len() - 1;

    loop {
        buf[i] = b'0' + (num % 10) as u8;
        num /= 10;
        if num == 0 {
            break;
        }
        i -= 1;
    }

    i
}

/// Sink for raw samples of captures no decoder recognized
pub trait Diagnostics {
    fn raw_sample(&mut self, sample: u16);
    /// Called once after the last sample of a capture
    fn end_of_dump(&mut self) {}
}

/// Drops all diagnostic output
#[derive(Debug, Default, Copy, Clone)]
pub struct NoDiagnostics;

impl Diagnostics for NoDiagnostics {
    fn raw_sample(&mut self, _sample: u16) {}
}

/// Writes raw samples as decimal text, space separated, one capture per line.
pub struct TextDiagnostics<T> {
    out: T,
    line_open: bool,
}

impl<T: Transport> TextDiagnostics<T> {
    pub fn new(out: T) -> Self {
        TextDiagnostics {
            out,
            line_open: false,
        }
    }

    pub fn get_ref(&self) -> &T {
        &self.out
    }

    pub fn into_inner(self) -> T {
        self.out
    }

    fn write(&mut self, data: &[u8]) {
        if let Err(err) = serial_send(&mut self.out, data) {
            log::warn!("Diagnostics write failed: {:?}", err);
        }
    }
}

impl<T: Transport> Diagnostics for TextDiagnostics<T> {
    fn raw_sample(&mut self, sample: u16) {
        let mut sb = [0; 10];
        let s = u32_to_buf(u32::from(sample), &mut sb);

        if self.line_open {
            self.write(b" ");
        }
        self.write(&sb[s..]);
        self.line_open = true;
    }

    fn end_of_dump(&mut self) {
        if self.line_open {
            self.write(b"\r\n");
            self.line_open = false;
        }
    }
}
