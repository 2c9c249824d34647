use clap::{Parser, Subcommand};
use siteware::{config, init, output, pipeline, serve};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn version_string() -> &'static str {
    let on_tag = env!("SITEWARE_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("SITEWARE_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "siteware")]
#[command(about = "Static site generator: HTML fragments + per-directory templates")]
#[command(long_about = "\
Static site generator: HTML fragments + per-directory templates

Project structure:

  project/
  ├── siteware.master.json         # Build config: {\"output\": \"public\", \"port\": 8080}
  ├── src/                         # Page sources, mirrored into the output
  │   ├── siteware.json            # Per-directory config (does not cascade)
  │   ├── index.html               # Rendered through its template
  │   └── blog/
  │       └── first.htm
  ├── static/                      # Mirrored to <output>/static/
  └── templates/
      └── default.template         # Layout; includes the page with {% include \"content\" %}

Directory config (siteware.json):

  {
    \"index.html\": { \"template\": \"home.template\", \"data\": { \"title\": \"Home\" } },
    \"static\": { \"autoThumbnail\": {
      \"img/gallery\": { \"method\": \"fill\", \"width\": 200, \"height\": 200 }
    } }
  }

The output directory must exist. Each build clears it, keeping only .git,
static, .gitignore and CNAME.")]
#[command(version = version_string())]
struct Cli {
    /// Project root directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create src/, static/ and templates/ in the project root
    Init,
    /// Regenerate the output directory from src/ and static/
    Build,
    /// Serve the built site over HTTP
    Serve {
        /// Port to listen on (default: build config port, then 8080)
        #[arg(long)]
        port: Option<u16>,
        /// Directory to serve instead of the configured output
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Init => {
            let created = init::init_project(&cli.root)?;
            for dir in &created {
                println!("Created {}", dir.display());
            }
            if created.is_empty() {
                println!("==> Project already initialized: {}", cli.root.display());
            }
        }
        Command::Build => {
            println!("==> Building {}", cli.root.display());
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_build_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = pipeline::build(&cli.root, Some(tx));
            printer.join().ok();
            output::print_build_summary(&result?);
        }
        Command::Serve { port, dir } => {
            let (dir, port) = serve_target(&cli.root, dir, port)?;
            serve::serve(&dir, port, |addr| {
                println!("==> Serving {} at http://{addr}", dir.display());
            })?;
        }
    }

    Ok(())
}

/// Directory and port for `serve`: flags first, then the build config.
///
/// With `--dir` given, a missing or invalid build config only loses its port.
fn serve_target(
    root: &Path,
    dir: Option<PathBuf>,
    port: Option<u16>,
) -> Result<(PathBuf, u16), config::ConfigError> {
    match dir {
        Some(dir) => {
            let port = port
                .or_else(|| config::load_build_config(root).ok().map(|c| c.port()))
                .unwrap_or(config::DEFAULT_PORT);
            Ok((dir, port))
        }
        None => {
            let build_config = config::load_build_config(root)?;
            Ok((
                build_config.output_path(root),
                port.unwrap_or_else(|| build_config.port()),
            ))
        }
    }
}
