use clap::{Parser, Subcommand};
use morph::params::parse_overrides;
use morph::{CancelToken, Engine, Kind, output};
use rayon::prelude::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "morph")]
#[command(about = "Convert images between formats")]
#[command(long_about = "\
Convert images between formats

Formats are addressed by name or alias (jpg and jpe both mean jpeg) and
scoped by a category; file is the only built-in category. Converters
accept string key=value parameters — width and height resize the output
(0 leaves an axis unconstrained; a single axis preserves aspect ratio),
quality tunes lossy encodes (1-100).

Examples:

  morph convert --from png --to jpeg shop.png --output shop.jpeg
  morph convert --from png --to jpeg --param 'width=1024;quality=85' \\
      a.png b.png --out-dir out/
  morph formats --json
  morph params --from svg --to png")]
#[command(version)]
struct Cli {
    /// Conversion category
    #[arg(long, default_value = "file", global = true)]
    kind: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert one or more files
    Convert(ConvertArgs),
    /// List known concepts and registered conversions
    Formats {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show the parameters a converter accepts
    Params {
        /// Source concept name or alias
        #[arg(long)]
        from: String,
        /// Target concept name or alias
        #[arg(long)]
        to: String,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Source concept name or alias
    #[arg(long)]
    from: String,

    /// Target concept name or alias
    #[arg(long)]
    to: String,

    /// Input file(s)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output file (single input only)
    #[arg(long, conflicts_with = "out_dir")]
    output: Option<PathBuf>,

    /// Output directory; files are named after the input stem and the
    /// target format
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Converter parameter (key=value, or key=value;key=value); repeatable
    #[arg(long = "param")]
    params: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let engine = Engine::builtin()?;
    let kind = Kind::new(&cli.kind);

    match cli.command {
        Command::Convert(args) => run_convert(&engine, &kind, &args),
        Command::Formats { json } => {
            output::print_formats(&engine, &kind, json)?;
            Ok(())
        }
        Command::Params { from, to, json } => {
            let converter = engine.get_converter(&kind, &from, &to)?;
            output::print_params(&from, &to, &converter.params(), json)?;
            Ok(())
        }
    }
}

fn run_convert(
    engine: &Engine,
    kind: &Kind,
    args: &ConvertArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let overrides = parse_overrides(&args.params).map_err(|e| format!("--param: {e}"))?;

    // Fail fast on an unsupported pair before touching any file.
    engine.get_converter(kind, &args.from, &args.to)?;

    let jobs = plan_outputs(engine, args)?;
    let cancel = CancelToken::new();

    // Requests are independent; run them on the rayon pool.
    let results: Vec<Result<(PathBuf, PathBuf), String>> = jobs
        .par_iter()
        .map(|(input, output)| {
            let data = std::fs::read(input).map_err(|e| format!("{}: {e}", input.display()))?;
            let converted = engine
                .convert(&cancel, kind, &args.from, &args.to, &data, &overrides)
                .map_err(|e| format!("{}: {e}", input.display()))?;
            if let Some(dir) = output.parent() {
                if !dir.as_os_str().is_empty() {
                    std::fs::create_dir_all(dir)
                        .map_err(|e| format!("{}: {e}", dir.display()))?;
                }
            }
            std::fs::write(output, &converted).map_err(|e| format!("{}: {e}", output.display()))?;
            Ok((input.clone(), output.clone()))
        })
        .collect();

    let mut failures = 0;
    for result in results {
        match result {
            Ok((input, output)) => println!("{} -> {}", input.display(), output.display()),
            Err(message) => {
                eprintln!("error: {message}");
                failures += 1;
            }
        }
    }
    if failures > 0 {
        return Err(format!("{failures} conversion(s) failed").into());
    }
    Ok(())
}

/// Pair each input with its output path.
///
/// A single input may name its output explicitly; otherwise outputs land
/// in `--out-dir` as `<stem>.<canonical target name>`.
fn plan_outputs(
    engine: &Engine,
    args: &ConvertArgs,
) -> Result<Vec<(PathBuf, PathBuf)>, Box<dyn std::error::Error>> {
    if let Some(output) = &args.output {
        if args.inputs.len() != 1 {
            return Err("--output expects exactly one input; use --out-dir for batches".into());
        }
        return Ok(vec![(args.inputs[0].clone(), output.clone())]);
    }

    let Some(out_dir) = &args.out_dir else {
        return Err("either --output or --out-dir is required".into());
    };
    let extension = canonical_extension(engine, &args.to);
    Ok(args
        .inputs
        .iter()
        .map(|input| {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "output".to_string());
            (input.clone(), out_dir.join(format!("{stem}.{extension}")))
        })
        .collect())
}

/// Canonical name of the target concept, used as the file extension for
/// planned outputs. Falls back to the raw token when unknown (the
/// conversion itself will fail with a proper error).
fn canonical_extension(engine: &Engine, to_token: &str) -> String {
    engine
        .registry()
        .catalog()
        .normalize(to_token)
        .map(|c| c.name().to_string())
        .unwrap_or_else(|| to_token.to_string())
}
