use std::io::{self, BufRead};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::cli::args::Args;
use crate::cli::output::ConsoleWriter;
use crate::core::framing::FrameTemplate;
use crate::core::magic::builtin_dispatcher;
use crate::core::transmit::Transmitter;
use crate::core::Console;
use crate::domain::config::{ByteListPolicy, SermonConfig, SessionConfig};
use crate::domain::error::{SermonError, SermonResult};
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::logging::{init_logging, CaptureLog};
use crate::infrastructure::serial::{available_devices, DeviceInfo, SerialSession};
use crate::tui::App;

/// Execute CLI command
pub async fn execute_command(args: Args) -> SermonResult<()> {
    let config_manager = ConfigManager::new();
    let config = match &args.config {
        Some(path) => config_manager.load_config_from_path(path)?,
        None => config_manager.load_config()?,
    };

    setup_logging(&args, &config);

    if args.list {
        let devices = available_devices()?;
        ConsoleWriter::new(args.output).write_devices(&devices)?;
        return Ok(());
    }

    // Framing errors are fatal before anything is opened
    let template = frame_template(&args, &config)?;
    let policy = args
        .byte_list_policy
        .map(ByteListPolicy::from)
        .unwrap_or(config.framing.byte_list_policy);

    let device = match &args.device {
        Some(device) => device.clone(),
        None => prompt_for_device()?,
    };
    let session_config = session_config(&args, device, &config);
    session_config.validate()?;

    let mut session = SerialSession::open(&session_config)?;
    let (tx, rx) = mpsc::unbounded_channel();
    session.start(tx)?;

    let mut capture = CaptureLog::new();
    if let Some(path) = &args.log {
        capture.start(path);
    }

    let console = Console::new(template, Transmitter::new(policy), builtin_dispatcher(), capture);
    info!(
        device = %session_config.device,
        baud = session_config.baud_rate,
        frame = ?console.template().frame(),
        append = ?console.template().append(),
        ?policy,
        "Starting terminal"
    );

    let mut app = App::new(session, rx, console)?;
    app.run().await
}

fn setup_logging(args: &Args, config: &SermonConfig) {
    let level = if args.verbose {
        "debug"
    } else {
        config.global.log_level.as_str()
    };
    let trace_file = args.trace.as_deref().or(config.global.trace_file.as_deref());

    if let Err(e) = init_logging(trace_file, level) {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }
}

/// Decode the frame and append strings from the command line or config,
/// then add the `-n`/`-r` line ending after decoding.
pub fn frame_template(args: &Args, config: &SermonConfig) -> SermonResult<FrameTemplate> {
    let frame = args.frame.as_deref().unwrap_or(&config.framing.frame);
    let append = args.append.as_deref().unwrap_or(&config.framing.append);
    Ok(FrameTemplate::new(frame, append)?.with_suffix(args.line_ending()))
}

/// Line parameters: command line over config file over built-in defaults.
pub fn session_config(args: &Args, device: String, config: &SermonConfig) -> SessionConfig {
    let mut session = SessionConfig::from_defaults(device, &config.serial);

    if let Some(baud) = args.baud {
        session.baud_rate = baud;
    }
    if let Some(data_bits) = args.data_bits {
        session.data_bits = data_bits;
    }
    if let Some(parity) = args.parity {
        session.parity = parity.into();
    }
    if let Some(stop_bits) = args.stop_bits {
        session.stop_bits = stop_bits.into();
    }
    if let Some(timeout_ms) = args.timeout_ms {
        session.read_timeout = Duration::from_millis(timeout_ms);
    }
    session.xonxoff |= args.xonxoff;
    session.rtscts |= args.rtscts;
    session.dsrdtr |= args.dsrdtr;

    session
}

fn prompt_for_device() -> SermonResult<String> {
    let devices = available_devices()?;
    if devices.is_empty() {
        return Err(SermonError::config("no serial devices found"));
    }

    let mut writer = ConsoleWriter::new(Default::default());
    writer.write_device_menu(&devices)?;

    let mut choice = String::new();
    io::stdin().lock().read_line(&mut choice)?;
    select_device(&devices, &choice)
}

/// Resolve a 1-based menu choice.
pub fn select_device(devices: &[DeviceInfo], choice: &str) -> SermonResult<String> {
    let choice = choice.trim();
    let index: usize = choice
        .parse()
        .map_err(|_| SermonError::config(format!("invalid device choice: '{}'", choice)))?;

    match index.checked_sub(1).and_then(|i| devices.get(i)) {
        Some(device) => Ok(device.name.clone()),
        None => {
            warn!(choice = index, available = devices.len(), "Device choice out of range");
            Err(SermonError::config(format!(
                "device choice {} is out of range 1-{}",
                index,
                devices.len()
            )))
        }
    }
}
