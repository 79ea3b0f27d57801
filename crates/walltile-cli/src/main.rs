use serde::Serialize;
use walltile_core::geometry::{master_size, num_followers};
use walltile_core::identity::IdentityOverrides;
use walltile_core::{ClusterDocument, ProcessIdentity, ResolveOptions, load_document, resolve};

const DEFAULT_CONFIG_PATH: &str = "configuration.xml";

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Config(walltile_core::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Config(err) => write!(f, "ERROR: {err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<walltile_core::Error> for CliError {
    fn from(value: walltile_core::Error) -> Self {
        Self::Config(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Resolve,
    Validate,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    legacy: bool,
    rank: Option<String>,
    hostname: Option<String>,
    display: Option<String>,
}

#[derive(Serialize)]
struct GridOut {
    tile_width: u32,
    tile_height: u32,
    tiles_x: u32,
    tiles_y: u32,
    bezel_x: u32,
    bezel_y: u32,
    master_width: Option<u32>,
    master_height: Option<u32>,
}

#[derive(Serialize)]
struct ValidateOut<'a> {
    grid: GridOut,
    debug_enabled: bool,
    leader: Option<&'a walltile_core::LeaderEntry>,
    hosts: usize,
    num_followers: usize,
}

fn usage() -> &'static str {
    "walltile\n\
\n\
USAGE:\n\
  walltile [resolve] [--rank <n>] [--hostname <name>] [--display <id>] [--legacy] [--pretty] [<path>]\n\
  walltile validate [--pretty] [<path>]\n\
\n\
NOTES:\n\
  - <path> defaults to ./configuration.xml.\n\
  - Identity defaults to RANK, DISPLAY and the local hostname; flags override them.\n\
  - --legacy reproduces the axis mix-ups of older deployments.\n\
  - Exit status 3 means no entry in the configuration matches this process.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "resolve" => args.command = Command::Resolve,
            "validate" => args.command = Command::Validate,
            "--pretty" => args.pretty = true,
            "--legacy" => args.legacy = true,
            "--rank" => {
                let Some(rank) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.rank = Some(rank.clone());
            }
            "--hostname" => {
                let Some(host) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.hostname = Some(host.clone());
            }
            "--display" => {
                let Some(display) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.display = Some(display.clone());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

/// Command-line identity flags first; the environment fills in whatever they leave unset.
fn identity(args: &Args) -> Result<ProcessIdentity, CliError> {
    let overrides = IdentityOverrides {
        rank: args.rank.clone(),
        hostname: args.hostname.clone(),
        display: args.display.clone(),
    };
    let identity = ProcessIdentity::from_env_with(&overrides)?;
    log::debug!(
        "identity: rank={:?} hostname={:?} display={:?}",
        identity.rank,
        identity.hostname,
        identity.display
    );
    Ok(identity)
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn summarize(document: &ClusterDocument) -> ValidateOut<'_> {
    let grid = &document.grid;
    let master = master_size(grid);
    ValidateOut {
        grid: GridOut {
            tile_width: grid.tile_width,
            tile_height: grid.tile_height,
            tiles_x: grid.tiles_x,
            tiles_y: grid.tiles_y,
            bezel_x: grid.bezel_x,
            bezel_y: grid.bezel_y,
            master_width: master.map(|m| m.width),
            master_height: master.map(|m| m.height),
        },
        debug_enabled: grid.debug_enabled,
        leader: document.leader.as_ref(),
        hosts: document.hosts.len(),
        num_followers: num_followers(document),
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let path = args.input.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let document = load_document(path)?;

    match args.command {
        Command::Validate => write_json(&summarize(&document), args.pretty),
        Command::Resolve => {
            let identity = identity(&args)?;
            let options = if args.legacy {
                ResolveOptions::legacy()
            } else {
                ResolveOptions::strict()
            };
            let resolved = resolve(&document, &identity, options)?;
            write_json(&resolved, args.pretty)
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(CliError::Config(err)) if err.is_unresolved_identity() => {
            eprintln!("{}", CliError::Config(err));
            std::process::exit(3);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
