use anyhow::{Context, Result};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use mailscroll::actor::load_next_page;
use mailscroll::config::{Config, DemoConfig};
use mailscroll::constants::{DATE_FORMAT, DEFAULT_BROWSE_PAGES, DEFAULT_WALK_STEPS};
use mailscroll::mail::{ItemFlags, MailItem};
use mailscroll::scroll::{CursorResult, ItemId, ListScroller, MemoryMailbox};

fn setup_logging() {
    use std::fs::OpenOptions;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mailscroll=debug"));

    // Try to create a log file in the config directory
    let log_file = Config::config_dir()
        .ok()
        .and_then(|dir| std::fs::create_dir_all(&dir).ok().map(|_| dir))
        .map(|dir| dir.join("mailscroll.log"))
        .and_then(|path| {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&path)
                .ok()
        });

    if let Some(file) = log_file {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false),
            )
            .init();
    } else {
        // Fallback to stderr if file logging fails
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_usage() {
    eprintln!(
        r#"mailscroll - Browse a mailbox list page by page

Usage: mailscroll <command> [options]

Commands:
    browse              Load pages and print the materialized list
        --unread            Only unread items
        --spam-trash        Include spam and trash
        --pages N           Pages to load (default {pages})
    walk <item-id>      Step a cursor forward from an item
        --steps N           Steps to take (default {steps})
    help                Show this help message

Configuration file: ~/.config/mailscroll/config.toml
"#,
        pages = DEFAULT_BROWSE_PAGES,
        steps = DEFAULT_WALK_STEPS,
    );
}

/// Flags shared by the subcommands
struct Options {
    unread: bool,
    spam_trash: bool,
    pages: usize,
    steps: usize,
    positional: Vec<String>,
}

fn parse_options(args: &[String]) -> Result<Options> {
    let mut options = Options {
        unread: false,
        spam_trash: false,
        pages: DEFAULT_BROWSE_PAGES,
        steps: DEFAULT_WALK_STEPS,
        positional: Vec::new(),
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--unread" => options.unread = true,
            "--spam-trash" => options.spam_trash = true,
            "--pages" => {
                let value = iter.next().context("--pages needs a value")?;
                options.pages = value
                    .parse()
                    .with_context(|| format!("Invalid page count: {}", value))?;
            }
            "--steps" => {
                let value = iter.next().context("--steps needs a value")?;
                options.steps = value
                    .parse()
                    .with_context(|| format!("Invalid step count: {}", value))?;
            }
            flag if flag.starts_with("--") => anyhow::bail!("Unknown option: {}", flag),
            _ => options.positional.push(arg.clone()),
        }
    }

    Ok(options)
}

/// Deterministic sample mailbox: every third item is read, a few are spam or trash.
fn demo_items(count: usize) -> Vec<MailItem> {
    let newest = chrono::Utc::now().timestamp();
    (0..count)
        .map(|i| {
            let mut flags = ItemFlags::empty();
            if i % 3 == 0 {
                flags |= ItemFlags::SEEN;
            }
            if i % 7 == 6 {
                flags |= ItemFlags::SPAM;
            }
            if i % 11 == 10 {
                flags |= ItemFlags::TRASH;
            }
            MailItem::new(
                format!("item-{}", i),
                format!("Conversation {}", i),
                newest - (i as i64) * 3600,
            )
            .with_from(format!("sender{}@example.com", i % 5))
            .with_flags(flags)
        })
        .collect()
}

fn demo_mailbox(demo: &DemoConfig) -> MemoryMailbox {
    MemoryMailbox::new(demo_items(demo.item_count), demo.page_size)
        .with_latency(Duration::from_millis(demo.latency_ms))
}

fn format_item(item: &MailItem) -> String {
    let date = chrono::DateTime::from_timestamp(item.date, 0)
        .map(|dt| dt.format(DATE_FORMAT).to_string())
        .unwrap_or_default();
    let marker = if item.flags.contains(ItemFlags::SPAM) {
        "S"
    } else if item.flags.contains(ItemFlags::TRASH) {
        "T"
    } else if item.is_seen() {
        " "
    } else {
        "*"
    };
    format!(
        "{} {:<10} {:<12} {:<24} {}",
        marker, item.id, date, item.from_addr, item.subject
    )
}

async fn run_browse(config: &Config, options: &Options) -> Result<()> {
    let mailbox = Arc::new(demo_mailbox(&config.demo));
    let filters = config.demo.filters;
    let handle = mailbox.open("Inbox", filters);
    let scroller = ListScroller::new(
        Arc::clone(&mailbox),
        handle.clone(),
        filters,
        config.scroller.clone(),
    );

    if options.unread {
        scroller.filter_unread(true);
    }
    if options.spam_trash {
        if scroller.supports_include_filter().await {
            scroller.show_spam_and_trash(true);
        } else {
            eprintln!("This mailbox cannot include spam and trash; ignoring --spam-trash");
        }
    }

    let retry = config.retry.to_retry_config();
    for page in 1..=options.pages {
        load_next_page(&scroller, &retry)
            .await
            .with_context(|| format!("Failed to load page {}", page))?;
    }

    let items = mailbox.window(&handle);
    println!(
        "{} items in {} ({:?})",
        items.len(),
        handle.label(),
        scroller.filters()
    );
    for item in &items {
        println!("{}", format_item(item));
    }

    scroller.disconnect();
    Ok(())
}

async fn run_walk(config: &Config, options: &Options) -> Result<()> {
    let start = options
        .positional
        .first()
        .context("walk needs an item id, e.g. 'mailscroll walk item-0'")?;

    let mailbox = Arc::new(demo_mailbox(&config.demo));
    let filters = config.demo.filters;
    let handle = mailbox.open("Inbox", filters);
    let scroller = ListScroller::new(
        Arc::clone(&mailbox),
        handle.clone(),
        filters,
        config.scroller.clone(),
    );

    let retry = config.retry.to_retry_config();
    load_next_page(&scroller, &retry)
        .await
        .context("Failed to load first page")?;

    let mut cursor = scroller
        .get_cursor(ItemId::from(start.as_str()))
        .await
        .context("Failed to create cursor")?;

    let describe = |id: &ItemId| {
        mailbox
            .window(&handle)
            .into_iter()
            .find(|item| &item.id == id)
            .map(|item| format_item(&item))
            .unwrap_or_else(|| format!("? {}", id))
    };

    println!("{}", describe(cursor.position()));
    for _ in 0..options.steps {
        match cursor.next_page().await {
            step @ CursorResult::Cursor(_) => {
                let expected = step.item().cloned();
                match cursor.go_forwards() {
                    Some(id) if Some(id) == expected.as_ref() => println!("{}", describe(id)),
                    Some(id) => {
                        println!("{}", describe(id));
                        eprintln!("List changed under the cursor; now at {}", id);
                    }
                    None => {
                        eprintln!("Next item resolved but could not be committed");
                        break;
                    }
                }
            }
            CursorResult::End => {
                println!("-- end of list --");
                break;
            }
            CursorResult::Error(e) => {
                cursor.disconnect();
                scroller.disconnect();
                anyhow::bail!("Cursor navigation failed: {}", e);
            }
        }
    }

    cursor.disconnect();
    scroller.disconnect();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let rest = args.get(2..).unwrap_or_default();

    match args.get(1).map(|s| s.as_str()) {
        Some("help") | Some("--help") | Some("-h") | None => {
            print_usage();
            Ok(())
        }
        Some(cmd @ ("browse" | "walk")) => {
            setup_logging();

            let options = parse_options(rest)?;
            let config = Config::load()?;

            if cmd == "browse" {
                run_browse(&config, &options).await
            } else {
                run_walk(&config, &options).await
            }
        }
        Some(cmd) => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            std::process::exit(1);
        }
    }
}
