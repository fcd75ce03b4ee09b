use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use std::io::Write;
use std::path::{Path, PathBuf};

use depthviz::image::{encode_png, render_image};
use depthviz::{page, service, transfer, DepthConfig, PngCompression, UploadForm};

#[derive(Parser)]
#[command(name = "depthviz-cli")]
#[command(about = "Render pseudo-3D depth visualizations of images", long_about = None)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true, default_value_t)]
    verbose: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true, default_value_t)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print the upload page served at `/`
    Form {
        /// Write the page here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Convert an image into its pseudo-3D depth visualization
    Convert(ConvertArgs),
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Input image file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// What to write
    #[arg(short, long, value_enum, default_value_t = OutputArg::Png)]
    format: OutputArg,

    /// Keep bright areas as near instead of flipping the depth levels
    #[arg(long, default_value_t)]
    no_invert: bool,

    /// Blur kernel size for the stand-in depth model (odd)
    #[arg(long, value_name = "PIXELS")]
    kernel: Option<u32>,

    /// PNG compression level
    #[arg(long, value_enum)]
    png_compression: Option<PngCompressionArg>,

    /// Refuse images with more pixels than this
    #[arg(long, value_name = "PIXELS")]
    max_pixels: Option<u64>,

    /// Store the effective settings as the new defaults
    #[arg(long, default_value_t)]
    save_config: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputArg {
    /// Color-mapped depth image
    Png,
    /// Depth image as base64 text
    Base64,
    /// Upload page with the original and depth images embedded
    Html,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PngCompressionArg {
    Fast,
    Default,
    Best,
}

impl From<PngCompressionArg> for PngCompression {
    fn from(arg: PngCompressionArg) -> Self {
        match arg {
            PngCompressionArg::Fast => PngCompression::Fast,
            PngCompressionArg::Default => PngCompression::Default,
            PngCompressionArg::Best => PngCompression::Best,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    setup_logging(args.verbose, args.quiet);

    match args.command {
        Command::Form { output } => write_output(output.as_deref(), service::index().as_bytes()),
        Command::Convert(convert_args) => convert(&convert_args),
    }
}

fn convert(args: &ConvertArgs) -> Result<()> {
    // Validate input file
    if !args.input.exists() {
        anyhow::bail!("Input file does not exist: {}", args.input.display());
    }

    let config = build_config(args)?;

    if args.save_config {
        let path = config.save().context("Failed to save config")?;
        log::info!("Saved settings to {}", path.display());
    }

    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    log::info!("Converting: `{}`", args.input.display());

    let output = match args.format {
        OutputArg::Png => {
            let rgb = transfer::decode_upload(&bytes, &config)?;
            let model = config.depth_model()?;
            let colored = render_image(&model, &rgb, config.invert)?;
            encode_png(&colored, config.png_compression).context("Failed to encode PNG")?
        }
        OutputArg::Base64 => {
            let conversion = transfer::convert(&UploadForm::with_image(bytes), &config)?;
            conversion.depth_base64.into_bytes()
        }
        OutputArg::Html => {
            let conversion = transfer::convert(&UploadForm::with_image(bytes), &config)?;
            page::render(&conversion.into()).into_bytes()
        }
    };

    write_output(args.output.as_deref(), &output)?;

    if let Some(path) = &args.output {
        log::info!("Done: {}", path.display());
    }

    Ok(())
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, bytes).context("Failed to write output file"),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes).context("Failed to write to stdout")?;
            stdout.flush().context("Failed to write to stdout")
        }
    }
}

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn build_config(args: &ConvertArgs) -> Result<DepthConfig> {
    let mut config = DepthConfig::load().unwrap_or_default();

    if args.no_invert {
        config.invert = false;
    }
    if let Some(kernel) = args.kernel {
        config.blur_kernel = kernel;
    }
    if let Some(compression) = args.png_compression {
        config.png_compression = compression.into();
    }
    if let Some(limit) = args.max_pixels {
        config.max_pixels = Some(limit);
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn convert_flags_parse() {
        let args = Args::try_parse_from([
            "depthviz-cli",
            "convert",
            "photo.jpg",
            "--no-invert",
            "-f",
            "html",
            "--kernel",
            "9",
            "-q",
        ])
        .unwrap();

        assert!(args.quiet);
        let Command::Convert(convert) = args.command else {
            panic!("expected convert subcommand");
        };
        assert_eq!(convert.input, PathBuf::from("photo.jpg"));
        assert!(convert.no_invert);
        assert!(convert.format == OutputArg::Html);
        assert_eq!(convert.kernel, Some(9));
        assert_eq!(convert.output, None);
    }

    #[test]
    fn convert_requires_an_input() {
        assert!(Args::try_parse_from(["depthviz-cli", "convert"]).is_err());
    }
}
