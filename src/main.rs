//! Dry run of the GMAX4002 bring-up against simulated hardware.
//!
//! Attaches to a mock board, selects a format, applies controls, then
//! starts and stops streaming while reporting the register traffic.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use gmax4002::mock::{Event, MockHardware};
use gmax4002::{
    BoardConfig, ControlId, FormatCode, FormatWhich, Gmax4002, MbusFormat, SelectionTarget,
};

/// Command line options.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Board description (TOML); defaults to a 4-lane CSI-2 board
    #[arg(long)]
    board: Option<PathBuf>,

    /// Media bus code to request, in hex
    #[arg(long, value_parser = parse_code, default_value = "0x300f")]
    code: FormatCode,

    /// Analogue gain step
    #[arg(long, default_value_t = 0)]
    gain: i64,

    /// Flip vertically
    #[arg(long)]
    vflip: bool,

    /// Flip horizontally
    #[arg(long)]
    hflip: bool,

    /// Fail the Nth register write of the stream start (counted from 0)
    #[arg(long)]
    fail_write: Option<usize>,
}

fn parse_code(text: &str) -> Result<FormatCode, String> {
    let digits = text.trim_start_matches("0x").trim_start_matches("0X");
    u32::from_str_radix(digits, 16)
        .map(FormatCode)
        .map_err(|err| format!("invalid bus code {text}: {err}"))
}

fn main() {
    env_logger::init();

    if let Err(err) = run(&Args::parse()) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> gmax4002::Result<()> {
    let board = match &args.board {
        Some(path) => BoardConfig::load_from(path)?,
        None => BoardConfig::default(),
    };

    let mock = MockHardware::new();
    mock.set_clock_rate(board.clock_rate_hz);
    mock.require_power(true);

    let sensor = Gmax4002::attach(mock.hardware(), &board)?;
    println!("Clock: {} Hz", sensor.clock_rate());

    let format = sensor.set_format(
        FormatWhich::Active,
        &MbusFormat::new(args.code, u32::MAX, u32::MAX),
    );
    println!(
        "Format: {}x{} code 0x{:04x}{}",
        format.width,
        format.height,
        format.code.0,
        format
            .code
            .pixel_format()
            .map_or_else(String::new, |fourcc| format!(" ({fourcc})"))
    );
    println!("Crop: {:?}", sensor.get_selection(SelectionTarget::Crop)?);

    sensor.set_control(ControlId::AnalogueGain, args.gain)?;
    sensor.set_control(ControlId::Vflip, i64::from(args.vflip))?;
    sensor.set_control(ControlId::Hflip, i64::from(args.hflip))?;

    if let Some(n) = args.fail_write {
        mock.fail_nth_write(n);
    }
    mock.clear_events();

    let started = sensor.enable_streams();
    let settle: Duration = mock
        .events()
        .iter()
        .filter_map(|event| match event {
            Event::Sleep { min, .. } => Some(*min),
            _ => None,
        })
        .sum();
    println!(
        "Stream start: {} register writes, {} failed, {settle:?} minimum settle time",
        mock.writes().len(),
        mock.count(|event| matches!(event, Event::WriteFailed(_)))
    );
    started?;

    println!(
        "Pixel rate: {} Hz, link frequency: {} Hz",
        Gmax4002::pixel_rate(),
        Gmax4002::link_frequency()
    );

    sensor.disable_streams();
    sensor.detach();
    println!("Sensor powered: {}", mock.is_powered());
    Ok(())
}
