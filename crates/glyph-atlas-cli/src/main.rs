use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use glyph_atlas_core::ansi::write_ansi;
use glyph_atlas_core::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::info;

mod source;

use source::FontdbSource;

#[derive(Parser, Debug)]
#[command(
    name = "glyph-atlas",
    about = "Pack font glyphs into a bitmap-font atlas and render strings on an ANSI terminal",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show a progress bar while rasterizing (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rasterize a font into an atlas and export it
    Import(ImportArgs),
    /// Read a binary font from stdin and print a string with it
    Render(RenderArgs),
}

#[derive(Parser, Debug, Clone)]
struct ImportArgs {
    // Font
    /// Font family name
    #[arg(short, long, default_value = "DejaVu Sans", help_heading = "Font")]
    font: String,
    /// Pixel size
    #[arg(short, long, default_value_t = 13, value_parser = clap::value_parser!(u32).range(1..), help_heading = "Font")]
    size: u32,
    /// Font weight (100 thin .. 900 black)
    #[arg(short, long, default_value_t = 200, value_parser = clap::value_parser!(u16).range(1..), help_heading = "Font")]
    weight: u16,
    /// Load this font file instead of querying installed fonts
    #[arg(long, help_heading = "Font")]
    font_file: Option<PathBuf>,

    // Atlas
    /// Atlas side length in pixels
    #[arg(long, default_value_t = DEFAULT_ATLAS_SIZE, help_heading = "Atlas")]
    atlas_size: u32,
    /// Also write records for glyphs without pixels, such as space
    #[arg(long, default_value_t = false, help_heading = "Atlas")]
    emit_empty_glyphs: bool,
    /// YAML config file path (overrides font and atlas options)
    #[arg(long, help_heading = "Atlas")]
    config: Option<PathBuf>,

    // Export
    /// Output format: binary | c | json
    #[arg(long, default_value = "binary", help_heading = "Export")]
    format: String,
    /// Output file (stdout when omitted)
    #[arg(short, long, help_heading = "Export")]
    output: Option<PathBuf>,
    /// Also save the atlas bitmap as PNG
    #[arg(long, help_heading = "Export")]
    atlas_png: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
}

#[derive(Parser, Debug, Clone)]
struct RenderArgs {
    /// Text to render
    text: String,
    /// Maximum number of glyph records read from the font stream [default: 256]
    #[arg(long)]
    max_records: Option<usize>,
    /// YAML config file path (`max_records` is read from it)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Reset terminal attributes after the last row
    #[arg(long, default_value_t = true, action=ArgAction::Set)]
    reset: bool,
}

/// Settings of one import run after CLI and YAML are merged.
#[derive(Debug, Clone, Serialize)]
struct ImportConfig {
    font: FontRequest,
    atlas: AtlasConfig,
    format: ExportFormat,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Import(args) => run_import(args, cli.progress && !cli.quiet),
        Commands::Render(args) => run_render(args),
    }
}

fn run_import(cli: &ImportArgs, show_progress: bool) -> anyhow::Result<()> {
    let base = ImportConfig {
        font: FontRequest {
            family: cli.font.clone(),
            size: cli.size,
            weight: cli.weight,
        },
        atlas: AtlasConfig::builder()
            .atlas_size(cli.atlas_size)
            .emit_empty_glyphs(cli.emit_empty_glyphs)
            .build(),
        format: cli.format.parse()?,
    };
    let cfg = if let Some(path) = &cli.config {
        load_yaml(path)?.into_import_config(base)?
    } else {
        base
    };
    cfg.font.validate()?;
    cfg.atlas.validate()?;

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let mut source = match &cli.font_file {
        Some(path) => FontdbSource::from_file(path, cfg.font.size)?,
        None => FontdbSource::from_system(&cfg.font)?,
    };

    let charset = CharacterSet::latin1();
    let mut registry = GlyphRegistry::new(cfg.atlas.clone())?;
    let bar = if show_progress {
        let b = ProgressBar::new(charset.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} rasterizing {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut tracked = |code: u32| {
        if let Some(b) = &bar {
            b.set_message(format!("U+{code:04X}"));
            b.inc(1);
        }
        source.load_glyph(code)
    };
    let imported = registry.import_glyphs(&mut tracked, charset.codes());
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    imported.with_context(|| format!("import glyphs from {:?}", cfg.font.family))?;

    let stats = registry.stats();
    info!(
        loaded = stats.loaded_glyphs,
        visible = stats.visible_glyphs,
        occupancy = format!("{:.2}%", stats.occupancy * 100.0),
        skyline = stats.skyline_height,
        "stats"
    );

    if let Some(png_path) = &cli.atlas_png {
        registry
            .atlas()
            .save(png_path)
            .with_context(|| format!("write {}", png_path.display()))?;
        info!(?png_path, "wrote atlas bitmap");
    }

    match &cli.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
            let mut w = BufWriter::new(file);
            export(&registry, cfg.format, &mut w)
                .with_context(|| format!("write {}", path.display()))?;
            info!(?path, format = ?cfg.format, "font written");
        }
        None => {
            let mut w = BufWriter::new(io::stdout().lock());
            export(&registry, cfg.format, &mut w).context("write font to stdout")?;
        }
    }
    Ok(())
}

fn load_yaml(path: &Path) -> anyhow::Result<YamlConfig> {
    let file =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    serde_yaml::from_str(&file).with_context(|| format!("parse config {}", path.display()))
}

/// Reader settings: defaults, then the YAML file, then `--max-records`.
fn render_config(cli: &RenderArgs) -> anyhow::Result<AtlasConfig> {
    let mut cfg = AtlasConfig::default();
    if let Some(path) = &cli.config {
        load_yaml(path)?.apply_atlas(&mut cfg);
    }
    if let Some(v) = cli.max_records {
        cfg.max_records = v;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn run_render(cli: &RenderArgs) -> anyhow::Result<()> {
    let cfg = render_config(cli)?;
    let mut input = BufReader::new(io::stdin().lock());
    let font = read_font(&mut input, &cfg).context("read font from stdin")?;
    info!(
        atlas_size = font.atlas_size(),
        glyphs = font.glyphs().len(),
        "font loaded"
    );

    let img = font.render(&cli.text);
    let mut out = BufWriter::new(io::stdout().lock());
    write_ansi(&img, &mut out, cli.reset).context("write to stdout")?;
    out.flush()?;
    Ok(())
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    // stdout carries the font stream and the rendered text
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Debug, Deserialize)]
struct YamlConfig {
    font: Option<String>,
    size: Option<u32>,
    weight: Option<u16>,
    atlas_size: Option<u32>,
    max_records: Option<usize>,
    emit_empty_glyphs: Option<bool>,
    format: Option<String>,
}

impl YamlConfig {
    fn apply_atlas(&self, cfg: &mut AtlasConfig) {
        if let Some(v) = self.atlas_size {
            cfg.atlas_size = v;
        }
        if let Some(v) = self.max_records {
            cfg.max_records = v;
        }
        if let Some(v) = self.emit_empty_glyphs {
            cfg.emit_empty_glyphs = v;
        }
    }

    fn into_import_config(self, mut cfg: ImportConfig) -> anyhow::Result<ImportConfig> {
        self.apply_atlas(&mut cfg.atlas);
        if let Some(v) = self.font {
            cfg.font.family = v;
        }
        if let Some(v) = self.size {
            cfg.font.size = v;
        }
        if let Some(v) = self.weight {
            cfg.font.weight = v;
        }
        if let Some(v) = self.format {
            cfg.format = v.parse()?;
        }
        Ok(cfg)
    }
}
