use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use figure_dresser::{
    Backend, Category, Compositor, Configuration, ExportMode, StudioSettings, import_preset,
    picker_strip, write_preset,
};

/// Render a figure configuration to PNG.
#[derive(Parser, Debug)]
#[command(name = "figure-render", version)]
struct Cli {
    /// Preset JSON to start from (defaults otherwise).
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Randomize every category before rendering.
    #[arg(long)]
    random: bool,

    /// Seed for --random.
    #[arg(long, requires = "random")]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = ExportMode::Full)]
    mode: ExportMode,

    /// Overrides the settings file.
    #[arg(long, value_enum)]
    backend: Option<Backend>,

    /// Overrides the settings file.
    #[arg(long)]
    scale: Option<f32>,

    /// Output directory.
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Write the picker strip of a category instead of a figure.
    #[arg(long, value_enum)]
    strip: Option<Category>,

    /// Studio settings JSON.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Also write the rendered configuration as a preset.
    #[arg(long)]
    save_preset: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    fs::create_dir_all(&cli.out)
        .with_context(|| format!("create output directory '{}'", cli.out.display()))?;

    if let Some(category) = cli.strip {
        return write_strip(category, &cli.out);
    }

    let mut settings = match &cli.settings {
        Some(path) => StudioSettings::load(path)
            .with_context(|| format!("load settings '{}'", path.display()))?,
        None => StudioSettings::default(),
    };
    if let Some(backend) = cli.backend {
        settings.export.backend = backend;
    }
    if let Some(scale) = cli.scale {
        settings.export.scale = scale;
    }
    settings.validate()?;

    let mut config = match &cli.preset {
        Some(path) => {
            let bytes =
                fs::read(path).with_context(|| format!("read preset '{}'", path.display()))?;
            import_preset(&bytes)
        }
        None => Configuration::default(),
    };
    if cli.random {
        config = match cli.seed {
            Some(seed) => config.randomize_with(&mut StdRng::seed_from_u64(seed)),
            None => config.randomize(),
        };
    }

    let compositor = Compositor::from_settings(&settings);
    let canvas = compositor.canvas();
    tracing::info!(
        width = canvas.width,
        height = canvas.height,
        scale = compositor.scale(),
        backend = ?compositor.backend(),
        mode = ?cli.mode,
        "exporting"
    );
    let image = compositor
        .export_image(&config, cli.mode)
        .context("export figure")?;
    let path = image.write_to_dir(&cli.out)?;
    println!("{}", path.display());

    if cli.save_preset {
        let preset = write_preset(&config, &cli.out)?;
        println!("{}", preset.display());
    }
    Ok(())
}

fn write_strip(category: Category, out: &Path) -> anyhow::Result<()> {
    let strip = picker_strip(category)?;
    let path = out.join(format!("{}-strip.png", category.key()));
    strip
        .save(&path)
        .with_context(|| format!("write '{}'", path.display()))?;
    println!("{}", path.display());
    Ok(())
}
