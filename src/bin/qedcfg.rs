//! 配置一条 bridge + GNSS receiver 链路
//!
//! 连接第一个已配对设备，按阶段发送 bridge 命令与 UBX 帧，直到完成或出错。

use clap::Parser;
use qedcfg_rs::link::{DeviceInfo, TcpAdapter};
use qedcfg_rs::session::{ConfigWorld, ConsoleLog, SessionStatus};
use qedcfg_rs::settings::Profile;
use qedcfg_rs::sim::{PacedExit, Scheduler};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(
    name = "qedcfg",
    about = "Configure a serial-to-Bluetooth bridge and the GNSS receiver behind it"
)]
struct Args {
    /// Paired device as NAME=HOST:PORT (repeatable; the first one is used)
    #[arg(long = "device", value_parser = parse_device)]
    devices: Vec<DeviceInfo>,

    /// JSON profile with timing/bridge/receiver overrides
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Stop after this many milliseconds of wall-clock time; defaults to running until done
    #[arg(long)]
    until_ms: Option<u64>,

    /// TCP connect timeout per attempt (ms)
    #[arg(long, default_value_t = 10_000)]
    connect_timeout_ms: u64,

    /// Write the structured session transcript to this JSON file
    #[arg(long)]
    transcript_json: Option<PathBuf>,
}

fn parse_device(raw: &str) -> Result<DeviceInfo, String> {
    let (name, address) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=HOST:PORT, got {raw:?}"))?;
    if name.is_empty() || address.is_empty() {
        return Err(format!("expected NAME=HOST:PORT, got {raw:?}"));
    }
    Ok(DeviceInfo::new(name, address))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();

    let profile = match &args.profile {
        Some(path) => match Profile::from_path(path) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("failed to load profile {}: {e}", path.display());
                return ExitCode::from(2);
            }
        },
        None => Profile::default(),
    };

    let adapter = TcpAdapter::new(args.devices.clone())
        .with_connect_timeout(Duration::from_millis(args.connect_timeout_ms));

    let mut sched = Scheduler::default();
    let mut world = ConfigWorld::new(Box::new(adapter), &profile, Box::new(ConsoleLog));
    if args.transcript_json.is_some() {
        world.enable_transcript();
    }

    world.start(&mut sched);
    let exit = sched.run_paced(args.until_ms.map(Duration::from_millis), &mut world);
    if exit == PacedExit::LimitReached {
        world.shutdown(&mut sched);
    }

    if let Some(path) = &args.transcript_json {
        if let Some(t) = world.take_transcript() {
            match t.to_json_pretty() {
                Ok(json) => match fs::write(path, json) {
                    Ok(()) => eprintln!("wrote transcript to {}", path.display()),
                    Err(e) => eprintln!("failed to write {}: {e}", path.display()),
                },
                Err(e) => eprintln!("failed to serialize transcript: {e}"),
            }
        }
    }

    let stats = world.stats();
    println!(
        "finished @ {:?}\n  status={:?}, error={}\n  connect_attempts={}, sessions={}, packets_written={}, bytes_drained={}",
        sched.now(),
        world.status(),
        world
            .last_error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "none".to_string()),
        stats.connect_attempts,
        stats.sessions_started,
        stats.packets_written,
        stats.bytes_drained,
    );

    if world.status() == SessionStatus::Done {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
