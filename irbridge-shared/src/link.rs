use std::collections::VecDeque;
use std::time::Duration;
use std::{io, path::Path};

use serialport::{SerialPort, SerialPortInfo};

use crate::protocol::{Frame, FrameParser, ACTION_INFRARED};

#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub baud_rate: u32,
    /// Read timeout, reads that time out are retried
    pub timeout: Duration,
    /// Action tag the bridge puts into its frames
    pub action: u8,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            baud_rate: 115_200,
            timeout: Duration::from_millis(100),
            action: ACTION_INFRARED,
        }
    }
}

/// Pulls frames out of a byte stream
pub struct FrameReader<R> {
    reader: R,
    parser: FrameParser,
    pending: VecDeque<Frame>,
}

impl<R: io::Read> FrameReader<R> {
    pub fn new(reader: R, action: u8) -> Self {
        FrameReader {
            reader,
            parser: FrameParser::new(action),
            pending: VecDeque::new(),
        }
    }

    /// Block until the next complete frame
    pub fn read_frame(&mut self) -> io::Result<Frame> {
        let mut recvbuf = [0; 64];

        loop {
            if let Some(frame) = self.pending.pop_front() {
                return Ok(frame);
            }

            match self.reader.read(&mut recvbuf) {
                Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),
                Ok(readlen) => {
                    log::trace!("Read {} bytes", readlen);
                    let parser = &mut self.parser;
                    self.pending
                        .extend(recvbuf[..readlen].iter().filter_map(|b| parser.feed(*b)));
                }
                Err(ref e) if e.kind() == io::ErrorKind::TimedOut => continue,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

pub struct SerialLink {
    config: LinkConfig,
    reader: Option<FrameReader<Box<dyn SerialPort>>>,
}

impl SerialLink {
    pub fn new(config: LinkConfig) -> Self {
        SerialLink {
            config,
            reader: None,
        }
    }

    pub fn list_ports() -> Result<Vec<SerialPortInfo>, serialport::Error> {
        serialport::available_ports()
    }

    pub fn connect<P: AsRef<Path>>(&mut self, path: P) -> Result<(), serialport::Error> {
        let path = path.as_ref().to_string_lossy();
        let port = serialport::new(path, self.config.baud_rate)
            .timeout(self.config.timeout)
            .open()?;

        log::info!("Connected to {:?} at {} baud", port.name(), self.config.baud_rate);

        self.reader.replace(FrameReader::new(port, self.config.action));

        Ok(())
    }

    pub fn read_frame(&mut self) -> io::Result<Frame> {
        self.reader
            .as_mut()
            .ok_or(io::ErrorKind::NotConnected)?
            .read_frame()
    }
}
