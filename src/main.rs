use clap::Parser;
use crossterm::{
    cursor::{Hide, Show},
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use skyburst::config::{Config, Settings};
use skyburst::effects::Effect;
use skyburst::effects::fireworks::FireworksEffect;
use skyburst::error::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Stdout, stdout};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

const FIXED_DT: f32 = 1.0 / 60.0;

/// Particle fireworks in the terminal.
#[derive(Parser, Debug)]
#[command(
    name = "skyburst",
    version,
    after_help = "Click the sky to burst. Keys: b/space = Burst Now, a = Auto Fireworks, q/Esc/Ctrl+C = quit"
)]
struct Opt {
    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Background color as hex (e.g. --bg-color 1a1b26)
    #[arg(long, value_name = "RRGGBB")]
    bg_color: Option<String>,

    /// Logical units per half-block pixel; larger values shrink the show
    #[arg(long, value_name = "UNITS")]
    scale: Option<f32>,

    /// Start with auto fireworks running
    #[arg(long)]
    auto: bool,

    /// Hide the control bar
    #[arg(long)]
    no_controls: bool,

    /// Seed for a reproducible show
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file (filter with RUST_LOG, default "info")
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl Opt {
    fn apply(&self, config: &mut Config) {
        if let Some(bg) = &self.bg_color {
            config.display.background = bg.clone();
        }
        if let Some(scale) = self.scale {
            config.display.pixel_scale = scale;
        }
        if self.auto {
            config.ambient.auto = true;
        }
        if self.no_controls {
            config.display.controls = false;
        }
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| Error::Logging(format!("cannot create {}: {e}", path.display())))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}

fn run_effect<E: Effect>(settings: &Settings, rng: fastrand::Rng) -> Result<E> {
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout());

    terminal::enable_raw_mode()?;
    let result = execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All), EnableMouseCapture)
        .map_err(Error::from)
        .and_then(|_| event_loop::<E>(&mut stdout, settings, rng));

    // restore the terminal even when the loop failed
    let restored = execute!(stdout, Show, LeaveAlternateScreen, DisableMouseCapture)
        .and_then(|_| terminal::disable_raw_mode());

    let effect = result?;
    restored?;
    Ok(effect)
}

fn event_loop<E: Effect>(stdout: &mut BufWriter<Stdout>, settings: &Settings, rng: fastrand::Rng) -> Result<E> {
    let (cols, rows) = terminal::size()?;
    let mut effect = E::new(cols as usize, rows as usize, settings, rng);

    let mut last_frame = Instant::now();
    let mut accumulator = 0.0f32;

    loop {
        if event::poll(Duration::from_millis(1))? {
            let event = event::read()?;
            match &event {
                Event::Key(key_event) => {
                    if key_event.code == KeyCode::Char('q')
                        || key_event.code == KeyCode::Esc
                        || (key_event.code == KeyCode::Char('c')
                            && key_event.modifiers.contains(event::KeyModifiers::CONTROL))
                    {
                        break;
                    }
                    effect.handle_event(&event);
                }
                Event::Resize(cols, rows) => {
                    effect.resize(*cols as usize, *rows as usize);
                    execute!(stdout, Clear(ClearType::All))?;
                }
                _ => {
                    effect.handle_event(&event);
                }
            }
        }

        let now = Instant::now();
        let frame_time = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;

        accumulator += frame_time;
        if accumulator > FIXED_DT * 3.0 {
            accumulator = FIXED_DT * 3.0;
        }

        while accumulator >= FIXED_DT {
            effect.update(FIXED_DT);
            accumulator -= FIXED_DT;
        }

        effect.render(stdout)?;
    }

    Ok(effect)
}

fn run() -> Result<()> {
    let opt = Opt::parse();

    if let Some(path) = &opt.log_file {
        init_logging(path)?;
    }

    let mut config = Config::load(opt.config.as_deref())?;
    config.apply_env_overrides();
    opt.apply(&mut config);
    let settings = config.resolve()?;

    let rng = opt.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
    info!(seed = opt.seed, scale = settings.pixel_scale, auto = settings.auto, "starting");

    let effect = run_effect::<FireworksEffect>(&settings, rng)?;

    let stats = effect.stats();
    info!(
        rockets = stats.rockets,
        bursts = stats.bursts,
        live_particles = effect.particle_count(),
        "stopped"
    );
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("skyburst: {err}");
            ExitCode::FAILURE
        }
    }
}
