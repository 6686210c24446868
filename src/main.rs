//! cutout - image background removal service
//!
//! CLI entry point

use clap::Parser;
use std::sync::Arc;
use std::time::Instant;

use cutout::{
    exit_codes,
    matting::MODEL_ENV_VAR,
    // CLI
    Cli, Commands, RemoveArgs,
    // Config
    CliOverrides, Config,
    // Matting
    model_search_paths, resolve_model_path, BackendKind, MattingBackend, MockBackend, ModelSpec,
    OnnxBackend,
    // Pipeline
    ImageProcessor, OutputStore, ProcessorOptions,
};

#[cfg(feature = "web")]
use cutout::{ServeArgs, ServerConfig, WebServer};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Remove(args) => run_remove(&args),
        Commands::Info => run_info(),
        #[cfg(feature = "web")]
        Commands::Serve(args) => run_serve(&args),
    };

    std::process::exit(match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_codes::GENERAL_ERROR
        }
    });
}

// ============ Remove Command ============

fn run_remove(args: &RemoveArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(args.verbose);

    let start_time = Instant::now();

    // Validate input path
    if !args.input.exists() {
        eprintln!("Error: Input file does not exist: {}", args.input.display());
        std::process::exit(exit_codes::INPUT_NOT_FOUND);
    }

    let mut config = load_config(args.config.as_deref());
    config.merge_with_cli(&create_cli_overrides(args));

    let backend = match build_backend(&config) {
        Ok(backend) => backend,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(exit_codes::MODEL_ERROR);
        }
    };

    let processor = build_processor(backend, &config);
    processor.store().ensure_dir()?;

    let data = std::fs::read(&args.input)?;
    let original_filename = args
        .input
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("image");

    let result = processor.process(&data, original_filename)?;

    let elapsed = start_time.elapsed();
    println!("Saved: {}", result.path.display());
    if args.verbose > 0 {
        println!("  Size: {}x{}", result.width, result.height);
        println!("  Time: {:.2}s", elapsed.as_secs_f64());
    }

    Ok(())
}

// ============ Helper Functions ============

/// Load the config file given on the command line, or fall back to the
/// search paths (./cutout.toml, then the per-user config directory).
fn load_config(explicit: Option<&std::path::Path>) -> Config {
    match explicit {
        Some(config_path) => match Config::load_from_path(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Warning: Failed to load config file: {}", e);
                Config::default()
            }
        },
        None => Config::load().unwrap_or_default(),
    }
}

/// Create CLI overrides from RemoveArgs
///
/// Every flag is optional, so an unset flag leaves the config file
/// value in place.
fn create_cli_overrides(args: &RemoveArgs) -> CliOverrides {
    let mut overrides = CliOverrides::new();

    overrides.output_dir = args.output.clone();
    overrides.naming = args.naming;
    overrides.model_path = args.model.clone();
    overrides.backend = args.backend;
    overrides.svg_dpi = args.svg_dpi;
    overrides.alpha_threshold = args.alpha_threshold;
    overrides.no_alpha_cleanup = args.no_alpha_cleanup;

    overrides
}

/// Build the matting backend selected by the merged config
fn build_backend(config: &Config) -> Result<Arc<dyn MattingBackend>, Box<dyn std::error::Error>> {
    match config.model.backend {
        BackendKind::Onnx => {
            let model_path = resolve_model_path(config.model.path.as_ref())?;
            let spec = ModelSpec::new(model_path, config.model.input_size);
            Ok(Arc::new(OnnxBackend::load(spec)?))
        }
        BackendKind::Mock => Ok(Arc::new(MockBackend::new())),
    }
}

/// Assemble the processing pipeline from the merged config
fn build_processor(backend: Arc<dyn MattingBackend>, config: &Config) -> ImageProcessor {
    let store = OutputStore::new(config.output.dir.clone()).with_naming(config.output.naming);
    let options = ProcessorOptions::default()
        .with_svg_dpi(config.svg.dpi)
        .with_alpha(config.cleanup.to_options());

    ImageProcessor::new(backend, store).with_options(options)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the `-v` count picks the level.
fn init_logging(verbose: u8) {
    let default_directive = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

// ============ Info Command ============

fn run_info() -> Result<(), Box<dyn std::error::Error>> {
    println!("cutout v{}", env!("CARGO_PKG_VERSION"));
    println!();

    // System Information
    println!("System Information:");
    println!("  Platform: {}", std::env::consts::OS);
    println!("  Arch: {}", std::env::consts::ARCH);
    println!("  CPUs: {}", num_cpus::get());

    // Compiled features
    println!();
    println!("Features:");
    println!(
        "  Web server: {}",
        if cfg!(feature = "web") {
            "enabled"
        } else {
            "disabled"
        }
    );

    // Config File Locations
    println!();
    println!("Config File Locations:");
    for path in Config::search_paths() {
        println!("  {} ({})", path.display(), found_marker(&path));
    }

    // Model Search Paths
    println!();
    println!("Model Search Paths:");
    match std::env::var(MODEL_ENV_VAR) {
        Ok(value) => println!("  ${}: {}", MODEL_ENV_VAR, value),
        Err(_) => println!("  ${}: (unset)", MODEL_ENV_VAR),
    }
    for path in model_search_paths(None) {
        println!("  {} ({})", path.display(), found_marker(&path));
    }
    match resolve_model_path(None) {
        Ok(path) => println!("  Resolved: {}", path.display()),
        Err(_) => println!("  Resolved: none"),
    }

    Ok(())
}

fn found_marker(path: &std::path::Path) -> &'static str {
    if path.is_file() {
        "found"
    } else {
        "not found"
    }
}

// ============ Serve Command (Web Server) ============

#[cfg(feature = "web")]
fn run_serve(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(args.verbose);

    let mut config = load_config(args.config.as_deref());
    config.merge_with_cli(&create_serve_overrides(args));

    let backend = match build_backend(&config) {
        Ok(backend) => backend,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(exit_codes::MODEL_ERROR);
        }
    };
    let processor = Arc::new(build_processor(backend, &config));

    let server_config = ServerConfig::default()
        .with_port(config.server.port)
        .with_bind(&config.server.bind)
        .with_upload_limit((config.server.upload_limit_mb * 1024 * 1024) as usize);

    // Create tokio runtime and run the server
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let server = WebServer::with_config(server_config, processor);
        server.run().await.map_err(|e| e.to_string())
    })?;

    Ok(())
}

/// Create CLI overrides from ServeArgs
#[cfg(feature = "web")]
fn create_serve_overrides(args: &ServeArgs) -> CliOverrides {
    let mut overrides = CliOverrides::new();

    overrides.port = args.port;
    overrides.bind = args.bind.clone();
    overrides.upload_limit_mb = args.upload_limit;
    overrides.output_dir = args.output.clone();
    overrides.naming = args.naming;
    overrides.model_path = args.model.clone();
    overrides.backend = args.backend;

    overrides
}
