//! Terminal front-end for the TuneScout proxy: search, paginate, and manage
//! the persisted search history.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tunescout_common::{ErrorBody, SearchError, SearchPage, SearchResponse};
use tunescout_history::{FileKv, HistoryStore, KvStore};
use tunescout_session::{SearchBackend, SearchSession, SessionDriver, SessionPhase};

#[derive(Parser)]
#[command(name = "tunescout")]
#[command(about = "Search music videos from the terminal")]
struct Cli {
    /// Base URL of the TuneScout API server (default: $TUNESCOUT_API_URL
    /// or http://127.0.0.1:3001)
    #[arg(long)]
    api_url: Option<String>,

    /// Results per page
    #[arg(long, default_value_t = 6)]
    page_size: u32,

    /// Path of the search-history file
    #[arg(long, default_value = "tunescout_history.json")]
    history_file: String,
}

impl Cli {
    fn resolved_api_url(&self) -> String {
        self.api_url.clone().unwrap_or_else(|| {
            std::env::var("TUNESCOUT_API_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:3001".to_string())
        })
    }
}

/// `SearchBackend` over the proxy's HTTP surface.
struct ProxyClient {
    client: reqwest::Client,
    base_url: String,
}

impl ProxyClient {
    fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_page(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<SearchPage, SearchError> {
        let url = format!("{}{path}", self.base_url);
        let resp = self.client.get(&url).query(params).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| format!("API error (status {status})"));
            return Err(map_proxy_status(status.as_u16(), message));
        }

        let body: SearchResponse = resp.json().await?;
        Ok(SearchPage {
            items: body.tracks,
            continuation_token: body.next_href,
            prev_token: body.data.pagination.prev_page_token,
            total_estimate: Some(body.total_results).filter(|t| *t > 0),
        })
    }
}

fn map_proxy_status(status: u16, message: String) -> SearchError {
    match status {
        400 => SearchError::BadRequest(message),
        401 | 403 => SearchError::AuthOrQuota(message),
        404 => SearchError::NotFound(message),
        408 => SearchError::Unavailable(message),
        429 => SearchError::RateLimited(message),
        _ => SearchError::Unknown(message),
    }
}

#[async_trait]
impl SearchBackend for ProxyClient {
    async fn search(&self, query: &str, page_size: u32) -> Result<SearchPage, SearchError> {
        let page_size = page_size.to_string();
        self.get_page(
            "/api/youtube/search",
            &[("q", query), ("limit", &page_size)],
        )
        .await
    }

    async fn continue_search(
        &self,
        token: &str,
        query: &str,
        page_size: u32,
    ) -> Result<SearchPage, SearchError> {
        let page_size = page_size.to_string();
        self.get_page(
            "/api/youtube/next",
            &[("pageToken", token), ("q", query), ("limit", &page_size)],
        )
        .await
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Keep the terminal clean unless the user asks for logs.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let mut history = HistoryStore::new(FileKv::open(&cli.history_file));
    let mut driver = SessionDriver::with_page_size(ProxyClient::new(&cli.resolved_api_url()), cli.page_size);

    println!("tunescout — type a query to search, :help for commands");
    if !history.all().is_empty() {
        print_history(history.all());
    }

    let mut input = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;
        input.clear();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let line = input.trim();

        match line {
            "" => {}
            ":quit" | ":q" => break,
            ":help" => print_help(),
            ":history" => print_history(history.all()),
            ":clear" => {
                history.clear();
                println!("History cleared.");
            }
            ":more" => {
                load_more(&mut driver).await;
            }
            _ if line.starts_with(":remove") => {
                let query = line[":remove".len()..].trim();
                if query.is_empty() {
                    println!("Usage: :remove <query>");
                } else {
                    history.remove(query);
                    print_history(history.all());
                }
            }
            _ if line.starts_with(":limit") => match line[":limit".len()..].trim().parse::<usize>()
            {
                Ok(n) => {
                    history.set_limit(n);
                    println!("History limit is now {}.", history.limit());
                }
                Err(_) => println!("Usage: :limit <1-50>"),
            },
            _ if line.starts_with(":move") => {
                move_entry(&mut history, line[":move".len()..].trim());
            }
            _ if line.starts_with(':') => println!("Unknown command. :help for commands."),
            query => {
                search(&mut driver, &mut history, query).await;
            }
        }
    }

    Ok(())
}

async fn search(
    driver: &mut SessionDriver<ProxyClient>,
    history: &mut HistoryStore<FileKv>,
    query: &str,
) {
    driver.search(query).await;
    if driver.session().phase() == SessionPhase::Errored {
        print_error(driver.session());
        return;
    }
    history.add(query);
    render_results(driver.session(), 0);
}

async fn load_more(driver: &mut SessionDriver<ProxyClient>) {
    if driver.session().phase() == SessionPhase::Idle {
        println!("Search for something first.");
        return;
    }
    if !driver.session().has_more() {
        println!("No more videos to load.");
        return;
    }
    let already_shown = driver.session().items().len();
    driver.load_more().await;
    if driver.session().phase() == SessionPhase::Errored {
        print_error(driver.session());
        return;
    }
    render_results(driver.session(), already_shown);
}

fn render_results(session: &SearchSession, from: usize) {
    let items = session.items();
    if items.is_empty() {
        println!(
            "No videos found for \"{}\". Try a different search term.",
            session.query().unwrap_or_default()
        );
        return;
    }
    for (i, track) in items.iter().enumerate().skip(from) {
        println!("{:>3}. {} — {}", i + 1, track.title, track.user.username);
        println!("     {}", track.permalink_url);
        if let Some(published) = track.created_at {
            println!("     published {}", published.format("%Y-%m-%d"));
        }
    }
    match session.total_estimate() {
        Some(total) => println!("Showing {} of ~{total} results", items.len()),
        None => println!("Showing {} results", items.len()),
    }
    if session.has_more() {
        println!("(:more for the next page)");
    } else {
        println!("No more videos to load.");
    }
}

fn print_error(session: &SearchSession) {
    let message = session
        .last_error()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "An unexpected error occurred".to_string());
    println!("Error: {message}");
}

fn print_history(entries: &[String]) {
    if entries.is_empty() {
        println!("No recent searches.");
        return;
    }
    println!("Recent searches (type one to search again):");
    for (i, query) in entries.iter().enumerate() {
        println!("{:>3}. {query}", i + 1);
    }
}

/// `:move <from> <to>` — the terminal's stand-in for dragging a history
/// entry to a new position. Computes the new order and hands it over whole.
fn move_entry<S: KvStore>(history: &mut HistoryStore<S>, args: &str) {
    let positions: Vec<usize> = args
        .split_whitespace()
        .filter_map(|p| p.parse().ok())
        .collect();
    let [from, to] = positions[..] else {
        println!("Usage: :move <from> <to>");
        return;
    };
    let mut order = history.all().to_vec();
    if from < 1 || from > order.len() || to < 1 || to > order.len() {
        println!("Positions must be between 1 and {}.", order.len());
        return;
    }
    let entry = order.remove(from - 1);
    order.insert(to - 1, entry);
    history.reorder(order);
    print_history(history.all());
}

fn print_help() {
    println!("Commands:");
    println!("  <query>            search for music videos");
    println!("  :more              load the next page of results");
    println!("  :history           show recent searches");
    println!("  :remove <query>    remove an entry from the history");
    println!("  :move <from> <to>  reorder the history");
    println!("  :limit <n>         set the history size (1-50)");
    println!("  :clear             clear the history");
    println!("  :quit              exit");
}
