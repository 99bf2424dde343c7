use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use film_agent_server::content::{
    ContentAggregator, ContentRecord, RecordNormalizer, DEFAULT_IMAGE_BASE_URL, HISTORY_LIMIT,
};
use film_agent_server::history::{SearchHistoryStore, SqliteSearchHistoryStore};
use film_agent_server::tmdb::{
    MetadataProvider, TmdbClient, TmdbClientConfig, DEFAULT_TMDB_BASE_URL,
};

use rustyline::{
    completion::Completer, highlight::Highlighter, history::FileHistory, validate::Validator,
    CompletionType, Config, Editor, Helper,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Search history database file. Defaults to ./history.db.
    #[clap(value_parser = parse_path)]
    pub history_db: Option<PathBuf>,

    /// TMDB v3 API key.
    #[clap(long, env = "TMDB_API_KEY", hide_env_values = true)]
    pub tmdb_api_key: String,

    /// Base URL of the TMDB API.
    #[clap(long, env = "TMDB_BASE_URL", default_value = DEFAULT_TMDB_BASE_URL)]
    pub tmdb_base_url: String,

    /// Base URL prepended to poster paths.
    #[clap(long, env = "TMDB_IMAGE_BASE_URL", default_value = DEFAULT_IMAGE_BASE_URL)]
    pub tmdb_image_base_url: String,
}

#[derive(Parser)]
#[command(name = "")]
struct InnerCli {
    #[command(subcommand)]
    command: InnerCommand,
}

#[derive(Subcommand)]
enum InnerCommand {
    /// Runs the full search pipeline (enrichment, person expansion) and
    /// records the query in the history.
    Multi {
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Searches movies only.
    Movie {
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Searches TV shows only.
    Tv {
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Searches people.
    Person {
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Looks up a single title by TMDB id or by title fragment.
    Details { id_or_title: String },

    /// Shows the most recent searches.
    History,

    /// Close this program.
    Exit,
}

enum CommandExecutionResult {
    Ok,
    Exit,
    Error(String),
}

const PROMPT: &str = ">> ";

struct Session {
    provider: Arc<TmdbClient>,
    history: Arc<SqliteSearchHistoryStore>,
    aggregator: ContentAggregator,
}

fn print_record(record: &ContentRecord) {
    println!(
        "[{}] {} ({}) {} - rating {}",
        record.kind, record.title, record.year, record.id, record.rating
    );
    println!("    {} | {} | {}", record.genre, record.runtime, record.country);
    println!("    Director: {}", record.director);
    println!("    Cast: {}", record.actors);
}

async fn execute_command(line: String, session: &Session) -> CommandExecutionResult {
    if line.is_empty() {
        return CommandExecutionResult::Ok;
    }

    let args =
        shlex::split(&line).unwrap_or_else(|| line.split_whitespace().map(String::from).collect());

    let cli = InnerCli::try_parse_from(std::iter::once(" ").chain(args.iter().map(String::as_str)));

    let cli = match cli {
        Ok(cli) => cli,
        Err(e) => {
            if e.print().is_err() {
                println!("{}", e);
            }
            return CommandExecutionResult::Ok;
        }
    };

    println!("{} {}", PROMPT, &line);
    let normalizer = session.aggregator.normalizer();
    match cli.command {
        InnerCommand::Multi { query } => match session.aggregator.search(&query.join(" ")).await {
            Ok(outcome) => {
                println!("Found {} results for '{}'", outcome.total, outcome.query);
                outcome.results.iter().for_each(print_record);
            }
            Err(err) => return CommandExecutionResult::Error(err.to_string()),
        },
        InnerCommand::Movie { query } => {
            match session.provider.search_movies(&query.join(" "), 1).await {
                Ok(page) => page
                    .results
                    .iter()
                    .map(|movie| normalizer.normalize_movie(movie))
                    .for_each(|record| print_record(&record)),
                Err(err) => return CommandExecutionResult::Error(err.to_string()),
            }
        }
        InnerCommand::Tv { query } => {
            match session.provider.search_tv_shows(&query.join(" "), 1).await {
                Ok(page) => page
                    .results
                    .iter()
                    .map(|series| normalizer.normalize_series(series))
                    .for_each(|record| print_record(&record)),
                Err(err) => return CommandExecutionResult::Error(err.to_string()),
            }
        }
        InnerCommand::Person { query } => {
            match session.provider.search_person(&query.join(" "), 1).await {
                Ok(page) => {
                    for person in page.results {
                        println!(
                            "{} - {} (id {}, popularity {:.1})",
                            person.name.unwrap_or_default(),
                            person.known_for_department.unwrap_or_default(),
                            person.id.map(|id| id.to_string()).unwrap_or_default(),
                            person.popularity.unwrap_or(0.0)
                        );
                    }
                }
                Err(err) => return CommandExecutionResult::Error(err.to_string()),
            }
        }
        InnerCommand::Details { id_or_title } => {
            match session.aggregator.get_by_id(&id_or_title).await {
                Ok(record) => {
                    print_record(&record);
                    println!("    {}", record.plot);
                    println!("    {}", record.poster);
                }
                Err(err) => return CommandExecutionResult::Error(err.to_string()),
            }
        }
        InnerCommand::History => match session.history.list_recent(HISTORY_LIMIT) {
            Ok(entries) if entries.is_empty() => println!("(no searches yet)"),
            Ok(entries) => {
                for entry in entries {
                    println!(
                        "{}  {:<30} {} results",
                        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                        entry.query,
                        entry.results_count
                    );
                }
            }
            Err(err) => return CommandExecutionResult::Error(format!("{:#}", err)),
        },
        InnerCommand::Exit => return CommandExecutionResult::Exit,
    }
    CommandExecutionResult::Ok
}

#[derive(rustyline_derive::Hinter)]
struct MyHelper {
    commands_names: Vec<String>,
}

impl MyHelper {
    pub fn new() -> Self {
        let commands_names: Vec<String> = InnerCli::command()
            .get_subcommands()
            .map(|sc| sc.get_name().to_string())
            .collect();

        MyHelper { commands_names }
    }
}

impl Completer for MyHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        if line.contains(' ') {
            return Ok((0, Vec::with_capacity(0)));
        }
        let matches = self
            .commands_names
            .iter()
            .filter(|c| c.starts_with(line))
            .map(|c| c.to_string())
            .collect::<Vec<_>>();

        Ok((0, matches))
    }
}

impl Highlighter for MyHelper {}
impl Validator for MyHelper {}
impl Helper for MyHelper {}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    let history_db = match cli_args.history_db {
        Some(path) => path,
        None => parse_path("history.db")?,
    };

    let history = Arc::new(
        SqliteSearchHistoryStore::new(&history_db)
            .with_context(|| format!("Could not open history database {:?}", history_db))?,
    );
    let provider = Arc::new(TmdbClient::new(TmdbClientConfig {
        api_key: cli_args.tmdb_api_key,
        base_url: cli_args.tmdb_base_url,
        ..Default::default()
    })?);
    let aggregator = ContentAggregator::new(
        provider.clone(),
        history.clone(),
        RecordNormalizer::new(cli_args.tmdb_image_base_url),
    );
    let session = Session {
        provider,
        history,
        aggregator,
    };

    InnerCli::command().print_long_help()?;

    let config = Config::builder()
        .completion_type(CompletionType::List)
        .build();

    let mut rl = Editor::<MyHelper, FileHistory>::with_config(config)?;
    rl.set_helper(Some(MyHelper::new()));

    loop {
        let readline = rl.readline(PROMPT);

        match readline {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                match execute_command(line, &session).await {
                    CommandExecutionResult::Ok => {}
                    CommandExecutionResult::Exit => {
                        break;
                    }
                    CommandExecutionResult::Error(err) => {
                        eprintln!("Error: {}", err);
                        continue;
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("CTRL-D: exiting.");
                break;
            }
            Err(e) => {
                println!("Error: {:?}", e);
                break;
            }
        }
    }
    Ok(())
}
