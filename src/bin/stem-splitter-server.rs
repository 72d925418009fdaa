use clap::{Args, Parser, Subcommand};
use std::{
    fs,
    path::{Path, PathBuf},
    process,
};
use stem_splitter_server::{
    build_output_path,
    io::filename::{has_artifact_suffix, job_stem},
    logging::init_tracing,
    resolve_inputs, server, SeparationMode, SeparationOutcome, SeparationRequest, ServerConfig,
};

#[derive(Parser)]
#[command(name = "stem-splitter-server")]
#[command(about = "HTTP wrapper around an external stem separation tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// JSON config file (defaults to $STEM_SERVER_CONFIG or the user config dir)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(short, long)]
        listen: Option<String>,

        #[arg(long)]
        upload_dir: Option<PathBuf>,

        #[arg(long)]
        output_dir: Option<PathBuf>,

        #[arg(short, long)]
        model: Option<String>,
    },

    /// Separate a file, or every audio file in a directory, without the server
    Separate(SeparateArgs),
}

#[derive(Args, Debug)]
struct SeparateArgs {
    #[arg(short, long)]
    input: PathBuf,

    /// JSON config file; supplies the separation program and defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output root (defaults to the config's output_dir)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long)]
    model: Option<String>,

    /// Split into this stem and everything else instead of every stem
    #[arg(long, value_parser = ["vocals"])]
    two_stems: Option<String>,

    #[arg(long)]
    no_mp3: bool,

    #[arg(long)]
    mp3_bitrate: Option<u32>,

    #[arg(long)]
    float32: bool,

    #[arg(long)]
    int24: bool,

    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            config,
            listen,
            upload_dir,
            output_dir,
            model,
        } => handle_serve(config, listen, upload_dir, output_dir, model).await,
        Commands::Separate(args) => handle_separate(args).await,
    };

    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

async fn handle_serve(
    config: Option<PathBuf>,
    listen: Option<String>,
    upload_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    model: Option<String>,
) -> anyhow::Result<()> {
    init_tracing();

    let mut cfg = ServerConfig::load(config.as_deref())?;
    if let Some(addr) = listen {
        cfg.listen_addr = addr;
    }
    if let Some(dir) = upload_dir {
        cfg.upload_dir = dir;
    }
    if let Some(dir) = output_dir {
        cfg.output_dir = dir;
    }
    if let Some(m) = model {
        cfg.separator.model = m;
    }

    tracing::info!(
        listen_addr = %cfg.listen_addr,
        upload_dir = %cfg.upload_dir.display(),
        output_dir = %cfg.output_dir.display(),
        model = %cfg.separator.model,
        "boot"
    );

    server::serve(cfg).await?;
    Ok(())
}

/// Layer the `separate` flags over the loaded config.
fn separate_settings(
    args: &SeparateArgs,
    mut cfg: ServerConfig,
) -> (ServerConfig, SeparationRequest) {
    if let Some(dir) = &args.output {
        cfg.output_dir = dir.clone();
    }
    if let Some(m) = &args.model {
        cfg.separator.model = m.clone();
    }

    let encoding = &mut cfg.separator.encoding;
    if args.no_mp3 {
        encoding.mp3 = false;
    }
    if let Some(bitrate) = args.mp3_bitrate {
        encoding.mp3_bitrate = bitrate;
    }
    encoding.float32 |= args.float32;
    encoding.int24 |= args.int24;

    let req = cfg.request(SeparationMode::from_selector(args.two_stems.as_deref()));
    (cfg, req)
}

async fn handle_separate(args: SeparateArgs) -> anyhow::Result<()> {
    if !tokio::fs::try_exists(&args.input).await? {
        anyhow::bail!("Input not found: {}", args.input.display());
    }
    if !args.quiet {
        init_tracing();
    }

    let cfg = ServerConfig::load(args.config.as_deref())?;
    let (cfg, req) = separate_settings(&args, cfg);
    let separator = cfg.separator();

    if !args.quiet {
        eprintln!("🎵 Stem Splitter");
        eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        eprintln!("Input:  {}", args.input.display());
        eprintln!("Output: {}", cfg.output_dir.display());
        eprintln!("Model:  {}", req.model_name);
        eprintln!("Stems:  {}", req.mode.two_stems().unwrap_or("all"));
        eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        eprintln!();
    }

    let outcome = separator.separate(&args.input, &req).await?;
    if outcome != SeparationOutcome::Completed {
        anyhow::bail!(outcome.diagnostic());
    }

    if !args.quiet {
        eprintln!();
        eprintln!("✅ {}", outcome.diagnostic());
        eprintln!();
        eprintln!("Output files:");
    }

    let input = args.input.clone();
    let output = cfg.output_dir.clone();
    let model = req.model_name.clone();
    let files = tokio::task::spawn_blocking(move || output_files(&input, &output, &model)).await??;
    for path in files {
        if args.quiet {
            println!("{}", path.display());
        } else {
            eprintln!("  🎧 {}", path.display());
        }
    }

    Ok(())
}

/// Stems written for each input under `<output>/<model>/<job>/`.
fn output_files(input: &Path, output: &Path, model: &str) -> anyhow::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for file in resolve_inputs(input)? {
        let Some(name) = file.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let dir = build_output_path(output, model, job_stem(name));
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let listed = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(has_artifact_suffix);
            if listed {
                found.push(path);
            }
        }
    }
    Ok(found)
}
