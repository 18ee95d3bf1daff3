use std::convert::TryFrom;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;
use structopt::StructOpt;

use irbridge_shared::protocol::ACTION_INFRARED;
use irbridge_shared::{LinkConfig, ProtocolId, SerialLink};

mod listen;
mod record;

use crate::listen::Filter;

#[derive(Debug, StructOpt)]
#[structopt(name = "irbridge", about = "Infrared bridge host tool")]
struct Opt {
    /// Serial Device. Defaults to the first port found, else /dev/ttyACM0
    #[structopt(long = "device", parse(from_os_str))]
    serial: Option<PathBuf>,
    #[structopt(long, default_value = "115200")]
    baud: u32,
    /// Action tag of infrared frames
    #[structopt(long, default_value = "3")]
    action: u8,
    /// Read timeout in milliseconds
    #[structopt(long, default_value = "100")]
    timeout: u64,
    #[structopt(short, long)]
    debug: bool,
    #[structopt(subcommand)]
    cmd: CliCommand,
}

#[derive(StructOpt, Debug)]
enum CliCommand {
    /// List serial ports
    Ports,
    /// Print decoded events from the bridge. Optionally record them to file
    Listen {
        /// Only show this protocol: nec sony rc5 rc6 panasonic jvc necx samsung36 ...
        #[structopt(long)]
        protocol: Option<String>,
        /// Stop after this many events
        #[structopt(long)]
        count: Option<usize>,
        /// Append events to this event log
        #[structopt(long, parse(from_os_str))]
        record: Option<PathBuf>,
    },
    /// Print the events of an event log
    Dump { path: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();

    let loglevel = if opt.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new().filter_level(loglevel).init();

    let config = LinkConfig {
        baud_rate: opt.baud,
        timeout: Duration::from_millis(opt.timeout),
        action: opt.action,
    };

    if config.action != ACTION_INFRARED {
        log::info!("Using action tag {:#04x}", config.action);
    }

    match opt.cmd {
        CliCommand::Ports => {
            for port in SerialLink::list_ports()? {
                println!("{}\t{:?}", port.port_name, port.port_type);
            }
            Ok(())
        }
        CliCommand::Listen {
            protocol,
            count,
            record,
        } => {
            let filter = Filter {
                protocol: protocol.as_deref().map(protocol_from_str).transpose()?,
            };

            let record_file = record.map(open_log).transpose()?;

            let mut link = SerialLink::new(config);
            link.connect(serial_path(opt.serial))?;
            listen::command_listen(&mut link, &filter, count, record_file)
        }
        CliCommand::Dump { path } => {
            let file = File::open(&path)?;
            let n = record::print_records(file, &mut std::io::stdout())?;
            log::info!("{} events in {}", n, path.display());
            Ok(())
        }
    }
}

fn serial_path(serial: Option<PathBuf>) -> PathBuf {
    if let Some(path) = serial {
        return path;
    }

    serialport::available_ports()
        .ok()
        .and_then(|ports| ports.first().map(|port| PathBuf::from(&port.port_name)))
        .unwrap_or_else(|| PathBuf::from("/dev/ttyACM0"))
}

fn protocol_from_str(s: &str) -> anyhow::Result<ProtocolId> {
    ProtocolId::try_from(s)
        .or_else(|_| s.parse::<u8>().map(ProtocolId::from))
        .map_err(|_| anyhow!("Protocol: {} not found", s))
}

fn open_log(path: PathBuf) -> anyhow::Result<File> {
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    log::info!("Recording to {}", path.display());
    Ok(file)
}
