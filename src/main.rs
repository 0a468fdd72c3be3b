use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use parking_lot::Mutex;

use vectrex_av::psg::RegisterFile;
use vectrex_av::{AudioDevice, Config, DemoMachine, FrameScheduler, PacingMode};

fn print_usage() {
    eprintln!("Usage: vectrex-av [options]");
    eprintln!("Options:");
    eprintln!("  -c <file>   Load configuration from a JSON file");
    eprintln!("  -x <width>  Window width in pixels");
    eprintln!("  -y <height> Window height in pixels");
    eprintln!("  -s          Sleep-based tick pacing instead of spinning");
    eprintln!("  -d          Start with the audio debug overlay enabled");
    eprintln!("  -h          Display this help");
    eprintln!();
    eprintln!("Keys: arrows = joystick, A/S/D/F = buttons, P/Space = pause,");
    eprintln!("      W = debug overlay, Q/Escape = quit");
}

fn parse_args() -> anyhow::Result<Config> {
    let mut config: Option<Config> = None;
    let mut width: Option<usize> = None;
    let mut height: Option<usize> = None;
    let mut pacing: Option<PacingMode> = None;
    let mut overlay = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            "-c" => {
                let path: PathBuf = args.next().context("-c requires a file path")?.into();
                config = Some(
                    Config::load(&path)
                        .with_context(|| format!("loading config {}", path.display()))?,
                );
            }
            "-x" => {
                let value = args.next().context("-x requires a width")?;
                width = Some(value.parse().context("window width must be a number")?);
            }
            "-y" => {
                let value = args.next().context("-y requires a height")?;
                height = Some(value.parse().context("window height must be a number")?);
            }
            "-s" => pacing = Some(PacingMode::Sleep),
            "-d" => overlay = true,
            other => {
                print_usage();
                bail!("unknown option '{other}'");
            }
        }
    }

    let mut config = config.unwrap_or_default();
    if let Some(width) = width {
        config.window_width = width;
        // keep a sane aspect ratio when only one dimension is given
        if height.is_none() {
            config.window_height = width * 410 / 330;
        }
    }
    if let Some(height) = height {
        config.window_height = height;
        if width.is_none() {
            config.window_width = height * 330 / 410;
        }
    }
    if config.window_width == 0 || config.window_height == 0 {
        bail!("window size must be positive");
    }
    if let Some(pacing) = pacing {
        config.pacing = pacing;
    }
    config.debug_overlay |= overlay;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let config = parse_args()?;

    let registers = Arc::new(Mutex::new(RegisterFile::new()));
    let diagnostics = Arc::new(Mutex::new(None));

    let audio = AudioDevice::new(Arc::clone(&registers), Arc::clone(&diagnostics))
        .context("opening audio device")?;

    let mut scheduler = FrameScheduler::new(
        DemoMachine::new(),
        &config,
        registers,
        diagnostics,
        audio,
    )
    .context("creating window")?;

    println!(
        "vectrex-av: {}x{} window, {:?} pacing",
        config.window_width, config.window_height, config.pacing
    );
    scheduler.run().context("main loop")?;
    println!("Exit emulation loop.");
    Ok(())
}
