use std::fs::File;
use std::io;

use irbridge_shared::{DecodedEvent, Frame, ProtocolId, SerialLink};

use crate::record::{describe, EventLog};

/// Which events `listen` passes on
#[derive(Debug, Default)]
pub struct Filter {
    pub protocol: Option<ProtocolId>,
}

impl Filter {
    pub fn accepts(&self, event: &DecodedEvent) -> bool {
        self.protocol.map_or(true, |p| p == event.protocol)
    }
}

pub fn command_listen(
    link: &mut SerialLink,
    filter: &Filter,
    count: Option<usize>,
    record_file: Option<File>,
) -> anyhow::Result<()> {
    log::info!("Listening");

    let mut record = record_file.map(EventLog::new);

    listen_loop(|| link.read_frame(), filter, count, |event| {
        println!("{}", describe(event));

        if let Some(record) = record.as_mut() {
            record.append(*event)?;
        }
        Ok(())
    })
}

/// Read frames until `count` accepted events have been handled
fn listen_loop<R, H>(
    mut read_frame: R,
    filter: &Filter,
    count: Option<usize>,
    mut handle: H,
) -> anyhow::Result<()>
where
    R: FnMut() -> io::Result<Frame>,
    H: FnMut(&DecodedEvent) -> anyhow::Result<()>,
{
    let mut handled = 0;

    while count.map_or(true, |count| handled < count) {
        let frame = read_frame()?;

        log::debug!("Got frame: {:?}", frame);

        if !filter.accepts(&frame.event) {
            continue;
        }

        handle(&frame.event)?;
        handled += 1;
    }

    Ok(())
}
