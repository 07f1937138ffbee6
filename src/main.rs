use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use skyfield::canvas::Surface;
use skyfield::config::{RandomMode, SkyConfig, DEFAULT_SEED};
use skyfield::effects::milkyway::MilkyWayEffect;
use skyfield::effects::Effect;
use skyfield::error::{SkyError, SkyResult};
use skyfield::host::terminal::TerminalHost;
use skyfield::layer::SkyLayer;

#[derive(Parser)]
#[command(name = "skyfield")]
#[command(about = "Procedural Milky Way night sky for the terminal")]
#[command(after_help = "Press 'q', ESC, or Ctrl+C to exit")]
struct Cli {
    #[command(flatten)]
    sky: SkyArgs,

    /// Target refresh rate
    #[arg(long, env = "SKYFIELD_FPS", default_value_t = 60)]
    fps: u32,

    /// Write logs here (the terminal itself is busy drawing)
    #[arg(long, env = "SKYFIELD_LOG_FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args)]
struct SkyArgs {
    /// Seed for the star layout
    #[arg(long, env = "SKYFIELD_SEED", default_value_t = DEFAULT_SEED)]
    seed: u32,

    /// Use a fresh random sky instead of the seeded one
    #[arg(long, conflicts_with = "seed")]
    random: bool,

    /// Device pixels per sky pixel; terminal cells are large, so stars are scaled down
    #[arg(long, default_value_t = 0.3)]
    pixel_ratio: f32,
}

#[derive(Subcommand)]
enum Command {
    /// Render a single frame to a PNG file
    Snapshot {
        #[arg(long, default_value_t = 1920)]
        width: u32,
        #[arg(long, default_value_t = 1080)]
        height: u32,
        /// Frame index to render; twinkles depend on it
        #[arg(long, default_value_t = 0)]
        frame: u64,
        /// Device pixels per sky pixel
        #[arg(long, default_value_t = 1.0)]
        pixel_ratio: f32,
        #[arg(short, long, default_value = "sky.png")]
        out: PathBuf,
    },
}

impl SkyArgs {
    fn to_config(&self, pixel_ratio: f32) -> SkyResult<SkyConfig> {
        let config = SkyConfig {
            random: if self.random {
                RandomMode::Host
            } else {
                RandomMode::Seeded(self.seed)
            },
            pixel_ratio,
            ..SkyConfig::default()
        };
        config.validate()?;
        Ok(config)
    }
}

fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_env("SKYFIELD_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn run_terminal(config: &SkyConfig, fps: u32) -> SkyResult<()> {
    let mut host = TerminalHost::enter(fps.clamp(1, 240))?;
    let mut layer = SkyLayer::mount(&mut host, || MilkyWayEffect::new(config));

    let mut result = Ok(());
    loop {
        match host.next_event() {
            Ok(Some(event)) => {
                if let Err(e) = layer.handle(&mut host, event) {
                    result = Err(e);
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                result = Err(e);
                break;
            }
        }
    }

    layer.unmount(&mut host);
    host.leave()?;
    result
}

fn snapshot(config: &SkyConfig, width: u32, height: u32, frame: u64, out: &Path) -> SkyResult<()> {
    if width == 0 || height == 0 {
        return Err(SkyError::InvalidConfig(format!(
            "snapshot needs a non-empty size, got {width}x{height}"
        )));
    }
    let mut effect = MilkyWayEffect::new(config);
    for _ in 0..frame {
        effect.update();
    }
    let mut surface = Surface::new(width, height);
    effect.render(&mut surface);

    let image = image::RgbImage::from_raw(width, height, surface.to_rgb8())
        .ok_or_else(|| SkyError::InvalidConfig("surface size mismatch".into()))?;
    image.save(out)?;
    info!(
        width,
        height,
        frame,
        stars = effect.populations().total(),
        path = %out.display(),
        "snapshot written"
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    match &cli.command {
        Some(Command::Snapshot {
            width,
            height,
            frame,
            pixel_ratio,
            out,
        }) => {
            let config = cli.sky.to_config(*pixel_ratio)?;
            snapshot(&config, *width, *height, *frame, out)
                .with_context(|| format!("rendering snapshot to {}", out.display()))?;
        }
        None => {
            let config = cli.sky.to_config(cli.sky.pixel_ratio)?;
            run_terminal(&config, cli.fps)?;
        }
    }
    Ok(())
}
