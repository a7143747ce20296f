//! `page-router`: inspect a route table from the command line.
//!
//! Loads a TOML route table, then validates it, resolves a location against
//! it, or generates a URL from a named route. Resolution runs against an
//! in-memory history, exactly as it would in a page.

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::{Parser, Subcommand};
use serde_json::json;

use page_router::config::{load_config, RouterConfig};
use page_router::observability::init_logging;
use page_router::platform::MemoryPlatform;
use page_router::{HandlerArgs, Resolution, RouteSpec, Router};

#[derive(Parser)]
#[command(name = "page-router")]
#[command(about = "Inspect a client-side route table", long_about = None)]
struct Cli {
    /// Route table (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the config and print the route table
    Check,
    /// Resolve a location against the route table
    Resolve {
        /// Full location, e.g. http://localhost:8080/queue/7?verbose=1
        location: String,
    },
    /// Build a URL from a named route
    Generate {
        name: String,
        /// Substitutions as key=value
        #[arg(value_parser = parse_pair)]
        params: Vec<(String, String)>,
    },
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{s}`"))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Fired {
    Nothing,
    Default,
    NotFound,
}

fn build_router(config: &RouterConfig, location: &str, fired: Rc<Cell<Fired>>) -> Router {
    let platform = Rc::new(MemoryPlatform::new(location));
    let router = Router::with_config(platform, config);

    for route in &config.routes {
        let mut spec = RouteSpec::new(route.path.as_str(), |_: HandlerArgs<'_>| {});
        if route.path == "/" {
            let fired = fired.clone();
            spec = RouteSpec::new("/", move |_: HandlerArgs<'_>| fired.set(Fired::Default));
        }
        if let Some(name) = &route.name {
            spec = spec.name(name.clone());
        }
        router.on_route(spec);
    }
    router.not_found(move |_: HandlerArgs<'_>| fired.set(Fired::NotFound), None);
    router
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    init_logging(&config.observability);

    tracing::debug!(routes = config.routes.len(), "configuration loaded");

    match cli.command {
        Commands::Check => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "root": config.root,
                    "link_attribute": config.link_attribute,
                    "history": config.history,
                    "routes": config.routes,
                }))?
            );
        }
        Commands::Resolve { location } => {
            let fired = Rc::new(Cell::new(Fired::Nothing));
            let router = build_router(&config, &location, fired.clone());
            let resolution = router.resolve(None);

            let outcome = match (&resolution, fired.get()) {
                (Resolution::Matched(_), _) => "matched",
                (Resolution::Fallback, Fired::Default) => "default",
                (Resolution::Fallback, _) => "not_found",
                (Resolution::NoMatch, _) => "no_match",
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "location": location,
                    "root": router.root(),
                    "outcome": outcome,
                    "route": resolution.route(),
                }))?
            );
        }
        Commands::Generate { name, params } => {
            let root = config.root.clone().unwrap_or_default();
            let fired = Rc::new(Cell::new(Fired::Nothing));
            let router = build_router(&config, &root, fired);
            let url = router.generate(&name, params);
            if url.is_empty() {
                eprintln!("Error: no route named `{name}`");
                std::process::exit(1);
            }
            println!("{url}");
        }
    }

    Ok(())
}
