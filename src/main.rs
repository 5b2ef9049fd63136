use std::fs::File;
use std::io;
use std::path::PathBuf;

use clap::Parser;
use cinedex::StartView;
use cinedex::core::aggregator::BrowseContext;
use cinedex::core::config::{self, CliOverrides};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "cinedex", about = "Browse movies and keep a list of favourites")]
struct Args {
    /// Page to open on start
    #[arg(short, long, default_value_t, value_enum)]
    view: StartView,

    /// Start with movies from this TMDB genre id
    #[arg(short, long, conflicts_with = "search")]
    genre: Option<u64>,

    /// Start with a movie search
    #[arg(short, long)]
    search: Option<String>,

    /// Where to keep favourites (default: ~/.cinedex/favourites.json)
    #[arg(long)]
    favourites_file: Option<PathBuf>,

    /// TMDB language code, e.g. en-US
    #[arg(long)]
    language: Option<String>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        let start_context = match (&self.genre, &self.search) {
            (Some(id), _) => Some(BrowseContext::Genre(*id)),
            (None, Some(query)) if !query.trim().is_empty() => {
                Some(BrowseContext::Search(query.trim().to_string()))
            }
            _ => None,
        };
        CliOverrides {
            start_context,
            favourites_file: self.favourites_file.clone(),
            language: self.language.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to cinedex.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("cinedex.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().map_err(|e| {
        log::error!("{}", e);
        io::Error::new(io::ErrorKind::InvalidData, e.to_string())
    })?;
    let resolved = config::resolve(&file_config, &args.overrides());

    if resolved.tmdb_api_key.is_none() {
        eprintln!(
            "No TMDB API key found. Set TMDB_API_KEY or add api_key under [tmdb] in {}",
            config::config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "~/.cinedex/config.toml".to_string())
        );
        return Err(io::Error::new(io::ErrorKind::NotFound, "missing TMDB API key"));
    }

    log::info!(
        "cinedex starting: context={}, view={:?}",
        resolved.start_context,
        args.view
    );

    cinedex::tui::run(resolved, args.view)
}
