use heapless::Vec;

/// Number of samples one capture can hold
pub const CAPTURE_CAPACITY: usize = 128;

/// Finished capture as handed to the decode engine
///
/// Index 0 is the gap before the frame, the pulse widths start at index 1.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RawCapture<'a> {
    samples: &'a [u16],
    samplerate: u32,
}

impl<'a> RawCapture<'a> {
    pub fn new(samples: &'a [u16], samplerate: u32) -> Self {
        RawCapture {
            samples,
            samplerate,
        }
    }

    /// Declared length, gap included
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samplerate(&self) -> u32 {
        self.samplerate
    }

    pub fn samples(&self) -> &'a [u16] {
        self.samples
    }

    pub fn gap(&self) -> Option<u16> {
        self.samples.first().copied()
    }

    /// Mark and space widths, without the leading gap
    pub fn pulses(&self) -> &'a [u16] {
        self.samples.get(1..).unwrap_or(&[])
    }
}

/// Source of finished captures
pub trait CaptureEngine {
    /// A capture is complete and waiting to be read
    fn is_ready(&self) -> bool;
    /// Drop the current capture and start recording the next one
    fn rearm(&mut self);
    fn raw(&self) -> RawCapture<'_>;
}

/// Edge sampler recording the time between level changes on the receiver pin.
///
/// Feed it from the timer interrupt. Once a capture is complete every sample is
/// ignored until [`CaptureEngine::rearm`] is called.
pub struct Capturer {
    samplerate: u32,
    timeout: u32,
    buf: Vec<u16, CAPTURE_CAPACITY>,
    edge: bool,
    last_edge: u32,
    ready: bool,
}

impl Capturer {
    pub fn new(samplerate: u32) -> Self {
        Self {
            samplerate,
            timeout: samplerate / 10,
            buf: Vec::new(),
            edge: false,
            last_edge: 0,
            ready: false,
        }
    }

    pub fn samplerate(&self) -> u32 {
        self.samplerate
    }

    /// Step the sampler with the current receiver level at sample `ts`
    pub fn sample(&mut self, edge: bool, ts: u32) {
        if self.ready {
            return;
        }

        let delta = ts.wrapping_sub(self.last_edge);

        if edge == self.edge {
            if !self.buf.is_empty() && delta > self.timeout {
                self.ready = true;
            }
            return;
        }

        self.edge = edge;
        self.last_edge = ts;

        let width = if delta > u32::from(u16::MAX) {
            u16::MAX
        } else {
            delta as u16
        };

        // A full buffer sets `ready`, which returns early above
        let _ = self.buf.push(width);

        if self.buf.is_full() {
            self.ready = true;
        }
    }
}

impl CaptureEngine for Capturer {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn rearm(&mut self) {
        // Edge and last edge keep following the line across captures
        self.buf.clear();
        self.ready = false;
    }

    fn raw(&self) -> RawCapture<'_> {
        RawCapture::new(&self.buf, self.samplerate)
    }
}
