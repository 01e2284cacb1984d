// rigmem test application -- CLI tool for exercising the memory backends
// against real hardware or downloaded clone images.
//
// Usage:
//   rigmem-test-app list
//   rigmem-test-app identify --port /dev/ttyUSB0
//   rigmem-test-app identify --port /dev/ttyUSB0 --baud 4800
//   rigmem-test-app read --port /dev/ttyUSB0 --channel 12
//   rigmem-test-app read --port /dev/ttyUSB0 --model KX3 --channel "20 M2"
//   rigmem-test-app image channels ft1d.img
//   rigmem-test-app image banks ft1d.img
//
// Pass -v (or set RUST_LOG=debug) to see link traffic.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rigmem::elecraft::ElecraftBuilder;
use rigmem::elecraft::models::{self as elecraft_models, ElecraftModel};
use rigmem::link::{CommandChannel, LinkNegotiator, LinkSession, SEMICOLON};
use rigmem::transport::SerialTransport;
use rigmem::yaesu::Ft1Radio;
use rigmem::{BankId, ChannelId, ChannelRecord, format_freq_mhz};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// rigmem test application -- exercises memory backends from the command line.
#[derive(Parser)]
#[command(name = "rigmem-test-app", version, about)]
struct Cli {
    /// Log link traffic and driver decisions to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all supported radio models.
    List,

    /// Negotiate the link and print what the radio reports.
    Identify {
        /// Serial port path (e.g. /dev/ttyUSB0, COM3).
        #[arg(long)]
        port: String,

        /// Baud rate the radio was last seen at. Tried last.
        #[arg(long, default_value_t = 38_400)]
        baud: u32,
    },

    /// Read one memory channel from a live-mode radio.
    Read {
        /// Serial port path (e.g. /dev/ttyUSB0, COM3).
        #[arg(long)]
        port: String,

        /// Channel number or special name (e.g. 12, "20 M2").
        #[arg(long)]
        channel: String,

        /// Expected model (e.g. K3, KX3). Any Elecraft radio if omitted.
        #[arg(long)]
        model: Option<String>,

        /// Baud rate the radio was last seen at.
        #[arg(long)]
        baud: Option<u32>,

        /// Reply timeout in milliseconds.
        #[arg(long, default_value_t = 1000)]
        timeout_ms: u64,
    },

    /// Inspect a clone-mode memory image.
    Image {
        #[command(subcommand)]
        action: ImageAction,
    },
}

#[derive(Subcommand)]
enum ImageAction {
    /// Print every programmed channel.
    Channels {
        /// Image file downloaded from the radio.
        file: PathBuf,
    },
    /// Print every bank with its name and members.
    Banks {
        /// Image file downloaded from the radio.
        file: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Find an Elecraft model by name, case-insensitively.
fn find_model(name: Option<&str>) -> Result<ElecraftModel> {
    let Some(name) = name else {
        return Ok(elecraft_models::generic());
    };
    let models = elecraft_models::all_elecraft_models();
    if let Some(model) = models.iter().find(|m| m.name.eq_ignore_ascii_case(name)) {
        return Ok(model.clone());
    }
    let known: Vec<&str> = models.iter().map(|m| m.name).collect();
    bail!("unknown model '{}'. Supported: {}", name, known.join(", "))
}

fn open_image(path: &Path) -> Result<Ft1Radio> {
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    info!(file = %path.display(), bytes = data.len(), "image file read");
    Ft1Radio::from_bytes(data).with_context(|| format!("loading {}", path.display()))
}

fn print_record_header() {
    println!(
        "{:>5}  {:<8}  {:>15}  {:<4}  {:<5}  {:>15}  {:<16}  {:<5}  {}",
        "Num", "Special", "Frequency", "Mode", "Dup", "Offset", "Name", "Tone", "Skip"
    );
}

fn print_record(rec: &ChannelRecord) {
    let tone = match rec.tone_mode {
        rigmem::ToneMode::None => String::new(),
        rigmem::ToneMode::Dtcs => format!("D{:03}", rec.dtcs),
        _ => rigmem::tones::format_tone(rec.tone),
    };
    let offset = if rec.offset == 0 {
        String::new()
    } else {
        format_freq_mhz(rec.offset.unsigned_abs())
    };
    println!(
        "{:>5}  {:<8}  {:>15}  {:<4}  {:<5}  {:>15}  {:<16}  {:<5}  {}",
        rec.number,
        rec.extended_name.as_deref().unwrap_or(""),
        format_freq_mhz(rec.freq),
        rec.mode.to_string(),
        rec.duplex.to_string(),
        offset,
        rec.name,
        tone,
        rec.skip
    );
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_list() -> Result<()> {
    println!("{:<12}  {:<10}  {:<6}  {:>6}", "Manufacturer", "Model", "Access", "Baud");
    println!("{}", "-".repeat(40));
    for model in rigmem::supported_models() {
        println!(
            "{:<12}  {:<10}  {:<6}  {:>6}",
            model.manufacturer,
            model.name,
            format!("{:?}", model.access),
            model.default_baud_rate
        );
    }
    Ok(())
}

async fn cmd_identify(port: &str, baud: u32) -> Result<()> {
    let transport = SerialTransport::open(port, baud)
        .await
        .with_context(|| format!("opening {port}"))?;
    let channel = CommandChannel::new(Box::new(transport), LinkSession::new(baud, SEMICOLON));

    let result = LinkNegotiator::default().identify(&channel).await;
    channel.close().await.ok();
    let identity = result.context("no radio answered on any baud rate")?;

    println!("Radio Identity");
    println!("  Reported model: {}", identity.model);
    println!("  Baud rate:      {}", identity.baud);
    println!("  Terminator:     {:?}", identity.delimiter.terminator);
    match elecraft_models::model_for_identity(&identity.model) {
        Some(model) => println!("  Driver model:   {}", model.name),
        None => println!("  Driver model:   (none)"),
    }
    Ok(())
}

async fn cmd_read(
    port: &str,
    channel: &str,
    model: Option<&str>,
    baud: Option<u32>,
    timeout_ms: u64,
) -> Result<()> {
    let model = find_model(model)?;
    let mut builder = ElecraftBuilder::new(model)
        .serial_port(port)
        .command_timeout(Duration::from_millis(timeout_ms));
    if let Some(baud) = baud {
        builder = builder.baud_rate(baud);
    }
    let mut radio = builder.build().await.context("connecting to radio")?;

    let id = ChannelId::parse(channel);
    let result = radio.read(&id).await;
    radio.close().await.ok();
    let record = result.with_context(|| format!("reading channel {id}"))?;

    if record.empty {
        println!("Channel {id} is empty");
        return Ok(());
    }
    print_record_header();
    print_record(&record);
    Ok(())
}

fn cmd_image_channels(path: &Path) -> Result<()> {
    let radio = open_image(path)?;
    println!("{} image, {} bytes", radio.model().name, radio.image().len());
    if radio.verify_checksums().is_err() {
        println!("warning: checksums do not match the image contents");
    }
    println!();

    print_record_header();
    let mut programmed = 0;
    for number in radio.resolver().numbers() {
        let record = radio.channel(&ChannelId::Number(number))?;
        if record.empty {
            continue;
        }
        print_record(&record);
        programmed += 1;
    }
    println!();
    println!("{programmed} programmed channels");
    Ok(())
}

fn cmd_image_banks(path: &Path) -> Result<()> {
    let radio = open_image(path)?;
    for bank in (0..radio.bank_count()).map(BankId) {
        let members = radio.channels_in_bank(bank)?;
        let name = radio.bank_name(bank)?;
        let list = members
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!("{:<8} {:<16} ({:>3}) {}", bank.to_string(), name.trim_end(), members.len(), list);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Command::List => cmd_list(),
        Command::Identify { port, baud } => cmd_identify(port, *baud).await,
        Command::Read {
            port,
            channel,
            model,
            baud,
            timeout_ms,
        } => cmd_read(port, channel, model.as_deref(), *baud, *timeout_ms).await,
        Command::Image { action } => match action {
            ImageAction::Channels { file } => cmd_image_channels(file),
            ImageAction::Banks { file } => cmd_image_banks(file),
        },
    }
}
