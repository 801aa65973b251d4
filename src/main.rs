use anyhow::Result;
use blobtext::BlobTextConfig;
use blobtext::config::CONFIG_FILE;
use blobtext::runner::{RunOptions, run_classify, run_decode, run_list, run_read};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Classify and decode fetched object bytes as text", long_about = None)]
struct Args {
    /// Config file (defaults to ./blobtext.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(ClapArgs, Debug)]
struct DecodeArgs {
    /// Primary encoding to try
    #[arg(short, long)]
    encoding: Option<String>,

    /// Fallback encoding, repeatable; replaces the configured list
    #[arg(long = "fallback")]
    fallbacks: Vec<String>,

    /// Maximum characters of text to print
    #[arg(long, default_value_t = 1000)]
    max_preview: usize,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List objects under the source root
    List {
        /// Directory to list (overrides config root)
        root: Option<PathBuf>,

        /// Only names starting with this prefix
        #[arg(long)]
        prefix: Option<String>,

        /// Maximum names to print
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Report whether a file looks like text or binary
    Classify {
        file: PathBuf,

        /// Bytes to sample
        #[arg(long)]
        sample_size: Option<usize>,
    },
    /// Decode a local file with encoding fallbacks
    Decode {
        file: PathBuf,

        #[command(flatten)]
        opts: DecodeArgs,
    },
    /// Read an object by name through the source root
    Read {
        name: String,

        /// Directory serving objects (overrides config root)
        #[arg(long)]
        root: Option<PathBuf>,

        #[command(flatten)]
        opts: DecodeArgs,
    },
}

impl DecodeArgs {
    fn into_options(self, json: bool) -> RunOptions {
        RunOptions {
            json,
            encoding: self.encoding,
            fallbacks: self.fallbacks,
            max_preview: self.max_preview,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load from file or default; a broken implicit config is reported once logging is up
    let (mut config, config_error) = match &args.config {
        Some(path) => (BlobTextConfig::load(path)?, None),
        None => match BlobTextConfig::load_from_file() {
            Ok(config) => (config.unwrap_or_default(), None),
            Err(err) => (BlobTextConfig::default(), Some(err)),
        },
    };

    // 2. Override with CLI args
    if args.verbose {
        config.verbose = true;
    }

    let default_level = if config.verbose {
        "blobtext=debug"
    } else {
        "blobtext=warn"
    };
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Some(err) = config_error {
        warn!("Ignoring {}, using defaults: {:#}", CONFIG_FILE, err);
    }

    let mut out = std::io::stdout().lock();

    match args.command {
        Command::List {
            root,
            prefix,
            limit,
        } => {
            if let Some(r) = root {
                config.root = r;
            }
            config.validate()?;
            run_list(&config, prefix.as_deref(), limit, args.json, &mut out)
        }
        Command::Classify { file, sample_size } => {
            if let Some(s) = sample_size {
                config.sample_size = s;
            }
            config.validate()?;
            run_classify(&config, &file, args.json, &mut out)
        }
        Command::Decode { file, opts } => {
            config.validate()?;
            run_decode(&config, &file, &opts.into_options(args.json), &mut out)
        }
        Command::Read { name, root, opts } => {
            if let Some(r) = root {
                config.root = r;
            }
            config.validate()?;
            run_read(&config, &name, &opts.into_options(args.json), &mut out)
        }
    }
}
