use clap::{Parser, Subcommand, ValueEnum};
use imgchain::encode::optimize::{DEFAULT_MAX_QUALITY, DEFAULT_MIN_QUALITY};
use imgchain::encode::{encode, export};
use imgchain::output::{self, ProcessReport};
use imgchain::placeholder::{LQIP_WIDTH, PALETTE_SIZE};
use imgchain::recipe::parse_operation;
use imgchain::responsive::DEFAULT_WIDTHS;
use imgchain::{Batch, BatchOptions, Format, Image, ResponsiveOptions, config};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "imgchain")]
#[command(about = "Chainable image pipelines for the web")]
#[command(long_about = "\
Chainable image pipelines for the web

Operations are given as recipes with --op and applied in order:

  resize:400          resize:x300         resize:400x300
  thumbnail:200x200   cover:200x200       contain:200x200,#000
  crop:200x200,top-left                   rotate:45
  flip  mirror  grayscale  strip  sepia
  brightness:1.2  contrast:0.8  saturation:1.5  sharpen:2  blur:2
  rounded:16
  watermark:logo.png,bottom-right,0.3,0.2,10
  text:Hello,top-left,24,white,1.0

Anchors: center, top-left, top, top-right, left, right, bottom-left,
bottom, bottom-right. Overlays also accept tiled.

Run 'imgchain gen-config' to generate a documented imgchain.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./imgchain.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Flags shared by commands that run a pipeline.
#[derive(clap::Args, Clone)]
struct PipelineArgs {
    /// Operation recipe, repeatable
    #[arg(long = "op", value_name = "RECIPE")]
    ops: Vec<String>,

    /// Output format (jpeg, png, webp, gif, bmp, tiff)
    #[arg(long)]
    format: Option<Format>,

    /// Encoder quality for JPEG and WEBP (1-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PlaceholderKind {
    Lqip,
    Dominant,
    Palette,
    Svg,
}

#[derive(Subcommand)]
enum Command {
    /// Run a pipeline over one image and write the result
    Process {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        pipeline: PipelineArgs,
        /// Choose PNG, WEBP or JPEG from the content
        #[arg(long, conflicts_with = "format")]
        auto_format: bool,
        /// Search for the highest quality that fits this many KiB
        #[arg(long, conflicts_with = "auto_format")]
        target_kb: Option<u64>,
    },
    /// Write a set of widths as NAME_WIDTH.EXT
    Responsive {
        input: PathBuf,
        dir: PathBuf,
        /// Comma-separated widths
        #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_WIDTHS)]
        widths: Vec<u32>,
        /// Base file name (default: input file stem)
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        pipeline: PipelineArgs,
        /// Let widths larger than the source enlarge it
        #[arg(long)]
        allow_upscale: bool,
    },
    /// Print a placeholder for an image
    Placeholder {
        input: PathBuf,
        #[arg(long, value_enum, default_value = "lqip")]
        kind: PlaceholderKind,
        /// Palette size
        #[arg(long, default_value_t = PALETTE_SIZE)]
        count: usize,
        /// LQIP width
        #[arg(long, default_value_t = LQIP_WIDTH)]
        width: u32,
    },
    /// Run a pipeline over every image in a directory
    Batch {
        dir: PathBuf,
        /// Output path pattern; {name} becomes each source file stem
        pattern: String,
        #[command(flatten)]
        pipeline: PipelineArgs,
        /// Process images in parallel
        #[arg(long)]
        parallel: bool,
        /// Worker count for --parallel (default: min(images, 8))
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Show dimensions, mode and format of an image
    Info {
        input: PathBuf,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock imgchain.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }
    let config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Process {
            input,
            output,
            pipeline,
            auto_format,
            target_kb,
        } => {
            let image = Image::open_with_config(&input, config.clone())?;
            let image = build(image, &pipeline, config.resize.allow_upscale)?;
            let before = (image.width(), image.height());
            let pipeline_text = image
                .pipeline()
                .iter()
                .map(|op| op.to_string())
                .collect::<Vec<_>>()
                .join(", ");

            let buffer = image.execute()?;
            let (bytes, format, optimized) = match target_kb {
                Some(target_kb) => {
                    let format = output_format(&pipeline, &output, image.source_format())?;
                    let result = imgchain::encode::optimize::optimize(
                        &buffer,
                        format,
                        target_kb,
                        DEFAULT_MIN_QUALITY,
                        pipeline.quality.unwrap_or(DEFAULT_MAX_QUALITY),
                        &config,
                    )?;
                    (result.bytes.clone(), format, Some((result, target_kb)))
                }
                None if auto_format => {
                    let (bytes, format) =
                        imgchain::encode::optimize::auto_format(&buffer, pipeline.quality, &config)?;
                    (bytes, format, None)
                }
                None => {
                    let format = output_format(&pipeline, &output, image.source_format())?;
                    (encode(&buffer, format, pipeline.quality, &config)?, format, None)
                }
            };
            export::write(&output, &bytes)?;

            let report = ProcessReport {
                source: &input,
                output: &output,
                before,
                after: buffer.dimensions(),
                format: format.name(),
                bytes: bytes.len() as u64,
                pipeline: &pipeline_text,
            };
            output::print_process_output(&report, optimized.as_ref().map(|(r, t)| (r, *t)));
        }
        Command::Responsive {
            input,
            dir,
            widths,
            name,
            pipeline,
            allow_upscale,
        } => {
            let allow_upscale = allow_upscale || config.resize.allow_upscale;
            let image = Image::open_with_config(&input, config.clone())?.allow_upscale(allow_upscale);
            let image = build(image, &pipeline, allow_upscale)?;
            let paths = image.save_responsive(
                &dir,
                &widths,
                name.as_deref(),
                ResponsiveOptions {
                    format: pipeline.format,
                    quality: pipeline.quality,
                    allow_upscale,
                },
            )?;
            let mut written = BTreeMap::new();
            for (width, path) in paths {
                let size = std::fs::metadata(&path)?.len();
                written.insert(width, (path, size));
            }
            output::print_responsive_output(&input, (image.width(), image.height()), &written);
        }
        Command::Placeholder {
            input,
            kind,
            count,
            width,
        } => {
            let image = Image::open_with_config(&input, config)?;
            match kind {
                PlaceholderKind::Lqip => println!("{}", image.lqip(width)?),
                PlaceholderKind::Dominant => println!("{}", image.dominant_color()?),
                PlaceholderKind::Palette => output::print_palette(&image.color_palette(count)?),
                PlaceholderKind::Svg => println!("{}", image.svg_placeholder(None, None)?),
            }
        }
        Command::Batch {
            dir,
            pattern,
            pipeline,
            parallel,
            workers,
        } => {
            let mut batch = Batch::from_dir_with_config(&dir, config.clone())?;
            for recipe in &pipeline.ops {
                batch = batch.then(parse_operation(recipe, config.resize.allow_upscale)?);
            }
            if let Some(format) = pipeline.format {
                batch = batch.format(format, pipeline.quality);
            }

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = batch.save(
                &pattern,
                BatchOptions {
                    parallel,
                    max_workers: workers,
                    events: Some(tx),
                },
            );
            printer.join().ok();
            for line in output::format_batch_summary(result?.len()) {
                println!("{}", line);
            }
        }
        Command::Info { input, json } => {
            let image = Image::open_with_config(&input, config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&image.info())?);
            } else {
                let dominant = image.dominant_color()?;
                output::print_info(&input, &image.info(), &dominant);
            }
        }
        Command::GenConfig => unreachable!("handled before config loading"),
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `-v` raises the crate's level from the
/// default `warn`.
fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "warn,imgchain=debug",
        _ => "warn,imgchain=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Append every `--op` recipe and the explicit format to `image`.
fn build(
    mut image: Image,
    args: &PipelineArgs,
    allow_upscale: bool,
) -> Result<Image, Box<dyn std::error::Error>> {
    for recipe in &args.ops {
        image = image.then(parse_operation(recipe, allow_upscale)?);
    }
    if let Some(format) = args.format {
        image = image.format(format, args.quality);
    }
    Ok(image)
}

/// Explicit `--format`, then the output extension, then the source format.
fn output_format(
    args: &PipelineArgs,
    output: &Path,
    source: Option<Format>,
) -> imgchain::Result<Format> {
    args.format
        .or_else(|| Format::from_path(output))
        .or(source)
        .ok_or_else(|| {
            imgchain::Error::Format(format!(
                "cannot determine output format for {}; pass --format",
                output.display()
            ))
        })
}
