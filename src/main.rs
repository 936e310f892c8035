//! Catalog Console
//!
//! Line-driven front end for the catalog controllers.

use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::StreamExt;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;
use validator::Validate;

use catalog_console::{
    config::AppConfig,
    controllers::{
        PagedListController, PagedListState, PickerStatus, SearchSelectState, SelectionChange,
    },
    models::{AuthorDraft, BookDraft, CabinetDraft, Entity, ShelfDraft, TagDraft},
    repository::{Catalog, PagedCollection},
    Console,
};

const DEMO_AUTHORS: &[&str] = &[
    "Anton Chekhov",
    "Fyodor Dostoevsky",
    "Nikolai Gogol",
    "Ivan Goncharov",
    "Mikhail Lermontov",
    "Alexander Pushkin",
    "Leo Tolstoy",
    "Ivan Turgenev",
    "Jane Austen",
    "Charlotte Bronte",
    "Emily Bronte",
    "Charles Dickens",
    "George Eliot",
];

const DEMO_TAGS: &[&str] = &["classic", "drama", "novel", "poetry", "satire", "short stories"];

#[derive(Parser)]
#[command(name = "catalog-console", version, about = "Browse and edit the book catalog")]
struct Cli {
    /// Use an in-memory catalog with sample data instead of the API
    #[arg(long)]
    demo: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Browse one resource page by page
    List {
        #[arg(value_enum)]
        resource: ResourceKind,
    },
    /// Pick an author with live search
    Pick,
    /// Show every shelf grouped under its cabinet
    Shelves,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ResourceKind {
    Authors,
    Books,
    Shelves,
    Cabinets,
    Tags,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    // Logs go to stderr so they do not interleave with the session output
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("catalog_console={}", config.logging.level).into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }

    tracing::info!("Starting Catalog Console v{}", env!("CARGO_PKG_VERSION"));

    let console = if cli.demo {
        tracing::info!("Using in-memory demo catalog");
        let catalog = Catalog::in_memory(DEMO_AUTHORS);
        for name in DEMO_TAGS {
            catalog.tags.create(TagDraft::new(*name)).await?;
        }
        Console::new(config, catalog)
    } else {
        tracing::info!("Using catalog API at {}", config.api.base_url);
        Console::http(config)?
    };

    match cli.command {
        Command::Pick => run_picker(&console).await,
        Command::Shelves => print_shelves(&console).await,
        Command::List { resource } => match resource {
            ResourceKind::Authors => run_list(console.authors(), |name| AuthorDraft::new(name)).await,
            ResourceKind::Books => run_list(console.books(), |title| BookDraft::new(title)).await,
            ResourceKind::Shelves => {
                run_list(console.shelves(), |name| ShelfDraft::new(name, None)).await
            }
            ResourceKind::Cabinets => {
                run_list(console.cabinets(), |name| CabinetDraft::new(name)).await
            }
            ResourceKind::Tags => run_list(console.tags(), |name| TagDraft::new(name)).await,
        },
    }
}

const LIST_HELP: &str = "commands: / <text> search | n next | p prev | g <page> | r reload | add <name> | rm <row> | q quit";

async fn run_list<C>(
    list: PagedListController<C>,
    make_draft: impl Fn(&str) -> C::Draft,
) -> anyhow::Result<()>
where
    C: PagedCollection<Id = Uuid>,
    C::Draft: Validate,
{
    println!("{}", LIST_HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut updates = list.updates();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                let (command, arg) = line.split_once(' ').unwrap_or((line, ""));
                match command {
                    "" => {}
                    "/" => list.set_search_text(arg),
                    "n" => list.next_page(),
                    "p" => list.prev_page(),
                    "r" => list.reload(),
                    "g" => match arg.trim().parse() {
                        Ok(page) => list.set_page(page),
                        Err(_) => println!("usage: g <page>"),
                    },
                    "add" => match list.create(make_draft(arg)).await {
                        Ok(created) => println!("created {}", created.display_name()),
                        Err(e) => println!("error: {}", e.message()),
                    },
                    "rm" => {
                        let row = arg.trim().parse::<usize>().ok();
                        let id = row
                            .and_then(|row| row.checked_sub(1))
                            .and_then(|index| list.state().items.get(index).map(|e| *e.id()));
                        match id {
                            Some(id) => match list.delete(&id).await {
                                Ok(()) => println!("deleted"),
                                Err(e) => println!("error: {}", e.message()),
                            },
                            None => println!("usage: rm <row>"),
                        }
                    }
                    "q" | "quit" => break,
                    _ => println!("{}", LIST_HELP),
                }
            }
            Some(state) = updates.next() => print_list(&state),
        }
    }

    list.dispose();
    Ok(())
}

fn print_list<E: Entity>(state: &PagedListState<E>) {
    if state.is_loading {
        return;
    }
    if let Some(error) = &state.error {
        println!("! {}", error);
    }
    if state.items.is_empty() {
        println!("  (no entries)");
    }
    for (row, item) in state.items.iter().enumerate() {
        println!("{:>3}. {}", row + 1, item.display_name());
    }
    let search = if state.committed_search_text.is_empty() {
        String::new()
    } else {
        format!(" matching \"{}\"", state.committed_search_text)
    };
    println!("-- page {}/{}{}", state.page, state.total_pages, search);
}

async fn print_shelves(console: &Console) -> anyhow::Result<()> {
    for group in console.shelves_by_cabinet().await? {
        match &group.cabinet {
            Some(cabinet) => println!("{}", cabinet.name),
            None => println!("(no cabinet)"),
        }
        if group.shelves.is_empty() {
            println!("    (empty)");
        }
        for shelf in &group.shelves {
            println!("    {}", shelf.name);
        }
    }
    Ok(())
}

const PICK_HELP: &str = "type to search | :down :up :enter :esc :focus :blur | :bind <id|none> | :q quit";

async fn run_picker(console: &Console) -> anyhow::Result<()> {
    println!("{}", PICK_HELP);
    let (picker, mut changes) = console.author_picker();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut updates = picker.updates();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let (command, arg) = line.trim().split_once(' ').unwrap_or((line.trim(), ""));
                match command {
                    ":down" => picker.on_arrow_down(),
                    ":up" => picker.on_arrow_up(),
                    ":enter" => picker.on_enter(),
                    ":esc" => picker.on_escape(),
                    ":focus" => picker.on_focus(),
                    ":blur" => picker.on_blur_outside(),
                    ":bind" if arg == "none" => picker.on_external_value_changed(None),
                    ":bind" => match Uuid::parse_str(arg.trim()) {
                        Ok(id) => picker.on_external_value_changed(Some(id)),
                        Err(_) => println!("usage: :bind <id|none>"),
                    },
                    ":q" => break,
                    _ if command.starts_with(':') => println!("{}", PICK_HELP),
                    _ => picker.on_query_text_changed(line.as_str()),
                }
            }
            Some(change) = changes.recv() => match change {
                // Echo the pick back the way a bound form field would
                SelectionChange::Selected(id) => {
                    println!("= bound {}", id);
                    picker.on_external_value_changed(Some(id));
                }
                SelectionChange::Cleared => {
                    println!("= bound value cleared");
                    picker.on_external_value_changed(None);
                }
            },
            Some(state) = updates.next() => print_picker(&state),
        }
    }

    picker.dispose();
    Ok(())
}

fn print_picker(state: &SearchSelectState<Uuid>) {
    match state.status() {
        PickerStatus::Closed => println!("[{}]", state.display_text()),
        PickerStatus::Searching => {}
        PickerStatus::NothingFound => println!("  nothing found"),
        PickerStatus::TypeToSearch => println!("  type to search"),
        PickerStatus::Results => {
            for (index, candidate) in state.results.iter().enumerate() {
                let marker = if index == state.highlighted_index { '>' } else { ' ' };
                println!("{} {}", marker, candidate.display_name);
            }
        }
    }
}
