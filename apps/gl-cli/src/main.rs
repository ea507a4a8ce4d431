use clap::{Parser, Subcommand};
use gl_app::{AppResult, LabSession, Script};
use gl_experiment::{DataPoint, EventLog, ExperimentEvent};
use gl_hardware::SerialPortSource;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gaslab")]
#[command(about = "gaslab - ideal-gas experiment driver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a lab configuration file
    Validate {
        /// Path to the configuration (YAML, or JSON by extension)
        config_path: PathBuf,
    },
    /// Run a scripted session without hardware
    Simulate {
        /// Path to the configuration
        config_path: PathBuf,
        /// Command script (YAML); without one, only the initial state is shown
        #[arg(short, long)]
        script: Option<PathBuf>,
        /// Print every event as a JSON line
        #[arg(long)]
        json: bool,
    },
    /// Drive the piston from a serial pressure sensor in real time
    Listen {
        /// Path to the configuration
        config_path: PathBuf,
        /// Serial port, overriding the configuration
        #[arg(short, long)]
        port: Option<String>,
        /// How long to listen
        #[arg(long, default_value_t = 30.0)]
        seconds: f64,
    },
    /// List serial ports on this machine
    Ports,
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Simulate {
            config_path,
            script,
            json,
        } => cmd_simulate(&config_path, script.as_deref(), json),
        Commands::Listen {
            config_path,
            port,
            seconds,
        } => cmd_listen(&config_path, port, seconds),
        Commands::Ports => {
            cmd_ports();
            Ok(())
        }
    }
}

fn cmd_validate(config_path: &Path) -> AppResult<()> {
    println!("Validating configuration: {}", config_path.display());
    let config = gl_config::load(config_path)?;
    println!("✓ Configuration is valid: {}", config.name);
    Ok(())
}

fn cmd_simulate(config_path: &Path, script_path: Option<&Path>, json: bool) -> AppResult<()> {
    let mut config = gl_config::load(config_path)?;
    config.hardware.enabled = false;

    let mut session = LabSession::new(config)?;
    let log = EventLog::new();
    session.subscribe(Box::new(log.clone()));
    session.start()?;

    if let Some(path) = script_path {
        let script = Script::load(path)?;
        println!(
            "Running script: {} ({} steps, {:.2} s)",
            path.display(),
            script.steps.len(),
            script.duration()
        );
        session.run_script(&script);
    }

    let events = log.drain();
    if json {
        for event in &events {
            match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(err) => tracing::error!(error = %err, "failed to encode event"),
            }
        }
    } else {
        for event in &events {
            if let ExperimentEvent::DataPointRecorded(point) = event {
                println!("  {}", format_point(point));
            }
        }
    }

    print_state(&session);
    Ok(())
}

fn cmd_listen(config_path: &Path, port: Option<String>, seconds: f64) -> AppResult<()> {
    let mut config = gl_config::load(config_path)?;
    if let Some(port) = port {
        config.hardware.port = port;
    }
    config.hardware.enabled = true;
    let serial = config.serial_settings();

    let mut session = LabSession::new(config)?;
    let log = EventLog::new();
    session.subscribe(Box::new(log.clone()));
    session.start()?;
    println!("Listening on {} @ {} baud", serial.port, serial.baud);

    let dt = Duration::from_secs_f64(session.clock().dt());
    let started = Instant::now();
    let mut last = started;
    while started.elapsed().as_secs_f64() < seconds {
        std::thread::sleep(dt);
        let now = Instant::now();
        session.advance((now - last).as_secs_f64());
        last = now;

        for event in log.drain() {
            match event {
                ExperimentEvent::InputWarning(w) => println!("! {w:?}"),
                ExperimentEvent::DataPointRecorded(point) => println!("  {}", format_point(&point)),
                _ => {}
            }
        }
        if !session.hardware_running() {
            println!("Serial link closed");
            break;
        }
    }

    session.shutdown();
    print_state(&session);
    Ok(())
}

fn cmd_ports() {
    let ports = SerialPortSource::list_ports();
    if ports.is_empty() {
        println!("No serial ports found");
    } else {
        println!("Serial ports:");
        for port in ports {
            println!("  {port}");
        }
    }
}

fn format_point(point: &DataPoint) -> String {
    match *point {
        DataPoint::PressureVolume {
            pressure_atm,
            volume_cm3,
        } => format!("P-V  P={pressure_atm:.3} atm  V={volume_cm3:.1} cm3"),
        DataPoint::VolumeTemperature {
            volume_cm3,
            temperature_k,
        } => format!("V-T  V={volume_cm3:.1} cm3  T={temperature_k:.2} K"),
        DataPoint::PressureTemperature {
            pressure_atm,
            temperature_k,
        } => format!("P-T  P={pressure_atm:.3} atm  T={temperature_k:.2} K"),
    }
}

fn print_state(session: &LabSession) {
    let state = session.state();
    println!("State after {:.2} s ({}):", session.sim_time(), session.process());
    println!("  Particles:   {}", state.particles);
    println!("  Pressure:    {:.4} atm", state.pressure_atm);
    println!("  Volume:      {:.2} cm3", state.volume_cm3);
    println!("  Temperature: {:.2} K", state.temperature_k);
}
