use crate::config::{Config, load_config};
use crate::render::{render_svg, write_output_svg};
use crate::scenario::{load_scenario, parse_scenario, run_scenario, write_trace};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mlabel", version, about = "Replay map label scenarios and dump their placement")]
pub struct Args {
    /// Scenario file (.json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for JSON and SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Config JSON5 file (label defaults, environment, view, text, colors)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Viewport width, overrides the config file
    #[arg(short = 'w', long = "width")]
    pub width: Option<f64>,

    /// Viewport height, overrides the config file
    #[arg(short = 'H', long = "height")]
    pub height: Option<f64>,

    /// Log label lifecycle at debug level
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = resolve_config(&args)?;
    let scenario = match args.input.as_deref() {
        Some(path) if path != Path::new("-") => load_scenario(path)?,
        _ => parse_scenario(&read_stdin()?)?,
    };

    let (scene, trace) = run_scenario(scenario, &config)?;
    tracing::debug!(frames = trace.frames.len(), "scenario finished");

    match args.output_format {
        OutputFormat::Json => write_trace(&trace, args.output.as_deref())?,
        OutputFormat::Svg => {
            let svg = render_svg(&scene, &config.text, &config.render);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => write_png(&scene, &config, args.output.as_deref())?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("map_label=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.view.width = width;
    }
    if let Some(height) = args.height {
        config.view.height = height;
    }
    config.validate()?;
    Ok(config)
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

#[cfg(feature = "png")]
fn write_png(scene: &crate::scene::Scene, config: &Config, output: Option<&Path>) -> Result<()> {
    let output = ensure_output(output, "png")?;
    let svg = render_svg(scene, &config.text, &config.render);
    crate::render::write_output_png(&svg, output, &config.text)
}

#[cfg(not(feature = "png"))]
fn write_png(_scene: &crate::scene::Scene, _config: &Config, _output: Option<&Path>) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

#[cfg_attr(not(feature = "png"), allow(dead_code))]
fn ensure_output<'a>(output: Option<&'a Path>, ext: &str) -> Result<&'a Path> {
    output.ok_or_else(|| anyhow::anyhow!("Output path required for {} output", ext))
}
