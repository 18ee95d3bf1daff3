use std::io::{Read, Write};
use std::time::Instant;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use irbridge_shared::DecodedEvent;

/// One entry of an event log
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
pub struct Record {
    /// Milliseconds since the log was opened
    pub elapsed_ms: u64,
    pub event: DecodedEvent,
}

/// Append-only log of decoded events, one cobs framed postcard record each
pub struct EventLog<W: Write> {
    writer: W,
    start: Instant,
}

impl<W: Write> EventLog<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            start: Instant::now(),
        }
    }

    pub fn append(&mut self, event: DecodedEvent) -> anyhow::Result<Record> {
        let record = Record {
            elapsed_ms: self.start.elapsed().as_millis() as u64,
            event,
        };

        let bytes = postcard::to_stdvec_cobs(&record)?;
        self.writer.write_all(&bytes)?;
        self.writer.flush()?;

        Ok(record)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

pub fn read_records<R: Read>(mut reader: R) -> anyhow::Result<Vec<Record>> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;

    data.split_mut(|b| *b == 0)
        .filter(|chunk| !chunk.is_empty())
        .enumerate()
        .map(|(i, chunk)| {
            postcard::from_bytes_cobs::<Record>(chunk)
                .with_context(|| format!("corrupt record #{}", i))
        })
        .collect()
}

pub fn print_records<R: Read>(reader: R, out: &mut dyn Write) -> anyhow::Result<usize> {
    let records = read_records(reader)?;

    for record in &records {
        writeln!(out, "{:>8} ms\t{}", record.elapsed_ms, describe(&record.event))?;
    }

    Ok(records.len())
}

pub fn describe(event: &DecodedEvent) -> String {
    format!(
        "{}\tValue: {:#010x}\tBits: {}",
        event.protocol, event.value, event.bits
    )
}
