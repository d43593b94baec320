//! Query command - walk result pages and print entries.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use datanozzle_fetch::{Entry, FetchError, QueryBuilder, SortOrder, TimeBound};
use datanozzle_store::Config;
use tracing::{debug, info};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments shared by the query and url commands.
#[derive(Args, Debug, Default, Clone)]
pub struct QueryArgs {
    /// Only messages involving this user.
    #[arg(long)]
    pub user: Option<String>,

    /// Only messages involving this package (repeatable).
    #[arg(long = "package", value_name = "PACKAGE")]
    pub packages: Vec<String>,

    /// Only messages in this category (repeatable).
    #[arg(long = "category", value_name = "CATEGORY")]
    pub categories: Vec<String>,

    /// Only messages on this topic (repeatable).
    #[arg(long = "topic", value_name = "TOPIC")]
    pub topics: Vec<String>,

    /// Only messages containing this text (repeatable).
    #[arg(long = "contains", value_name = "TEXT")]
    pub contains: Vec<String>,

    /// Exclude messages involving this user (repeatable).
    #[arg(long = "not-user", value_name = "USER")]
    pub not_users: Vec<String>,

    /// Exclude messages involving this package (repeatable).
    #[arg(long = "not-package", value_name = "PACKAGE")]
    pub not_packages: Vec<String>,

    /// Exclude messages in this category (repeatable).
    #[arg(long = "not-category", value_name = "CATEGORY")]
    pub not_categories: Vec<String>,

    /// Exclude messages on this topic (repeatable).
    #[arg(long = "not-topic", value_name = "TOPIC")]
    pub not_topics: Vec<String>,

    /// Metadata field to attach to each entry (repeatable).
    #[arg(long = "meta", value_name = "FIELD")]
    pub meta: Vec<String>,

    /// Result order (asc or desc).
    #[arg(long, value_parser = parse_order)]
    pub order: Option<SortOrder>,

    /// Group related messages.
    #[arg(long)]
    pub grouped: bool,

    /// Messages per page.
    #[arg(long)]
    pub rows: Option<u32>,

    /// Pages to skip before the first one fetched.
    #[arg(long)]
    pub skip: Option<u32>,

    /// Maximum number of pages to walk.
    #[arg(long)]
    pub pages: Option<u32>,

    /// Window start, as epoch seconds or RFC 3339.
    #[arg(long, value_parser = parse_time_bound)]
    pub start: Option<TimeBound>,

    /// Window end, as epoch seconds or RFC 3339.
    #[arg(long, value_parser = parse_time_bound)]
    pub end: Option<TimeBound>,

    /// Window width in seconds.
    #[arg(long)]
    pub delta: Option<u64>,

    /// Stop after printing this many entries.
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Runs the query command.
pub fn run(args: &QueryArgs, config: &Config, cli: &Cli) -> Result<()> {
    let query = build_query(args, config.query()?)?;
    info!(url = %query, page_limit = ?query.page_limit(), "Running query");

    let limit = args.limit.unwrap_or(usize::MAX);
    let entries = query.iter().take(limit);

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            let mut printed = 0usize;
            for entry in entries {
                println!("{}", formatter.format_entry(&entry?));
                printed += 1;
            }
            debug!(printed, "Query finished");
            if printed == 0 && !cli.quiet {
                eprintln!("{}", formatter.format_empty());
            }
        }
        OutputFormat::Json => {
            let entries: Vec<Entry> = entries.collect::<Result<_, FetchError>>()?;
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_entries(&entries)?);
        }
    }

    Ok(())
}

/// Runs the url command.
pub fn run_url(args: &QueryArgs, config: &Config, cli: &Cli) -> Result<()> {
    let query = build_query(args, config.query()?)?;

    match cli.format {
        OutputFormat::Text => println!("{query}"),
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_query(&query)?);
        }
    }

    Ok(())
}

/// Applies command-line filters on top of a base query.
pub fn build_query(args: &QueryArgs, base: QueryBuilder) -> Result<QueryBuilder, FetchError> {
    let mut query = base;

    if let Some(user) = &args.user {
        query = query.by_user(user.as_str());
    }

    query = apply_list(query, &args.packages, |q, v| q.by_package(v));
    query = apply_list(query, &args.categories, |q, v| q.by_category(v));
    query = apply_list(query, &args.topics, |q, v| q.by_topic(v));
    query = apply_list(query, &args.contains, |q, v| q.containing(v));
    query = apply_list(query, &args.not_users, |q, v| q.without_user(v));
    query = apply_list(query, &args.not_packages, |q, v| q.without_package(v));
    query = apply_list(query, &args.not_categories, |q, v| q.without_category(v));
    query = apply_list(query, &args.not_topics, |q, v| q.without_topic(v));
    query = apply_list(query, &args.meta, |q, v| q.with_meta(v));

    if let Some(order) = args.order {
        query = query.order(order);
    }
    if args.grouped {
        query = query.grouped();
    }
    if let Some(rows) = args.rows {
        query = query.paginate(rows);
    }
    if let Some(skip) = args.skip {
        query = query.skip(skip);
    }
    if let Some(start) = args.start {
        query = query.starting_at(start);
    }
    if let Some(end) = args.end {
        query = query.ending_at(end);
    }
    if let Some(delta) = args.delta {
        query = query.delta_seconds(delta);
    }
    if args.pages.is_some() {
        query = query.take(args.pages)?;
    }

    Ok(query)
}

fn apply_list(
    query: QueryBuilder,
    values: &[String],
    filter: impl Fn(&QueryBuilder, &[String]) -> QueryBuilder,
) -> QueryBuilder {
    if values.is_empty() {
        query
    } else {
        filter(&query, values)
    }
}

fn parse_order(s: &str) -> Result<SortOrder, FetchError> {
    s.parse()
}

/// Parses epoch seconds or an RFC 3339 timestamp.
fn parse_time_bound(s: &str) -> Result<TimeBound, String> {
    if let Ok(secs) = s.parse::<f64>() {
        return if secs.is_finite() {
            Ok(TimeBound::EpochSecs(secs))
        } else {
            Err(format!("{s} is not a finite number of seconds"))
        };
    }

    DateTime::parse_from_rfc3339(s)
        .map(|dt| TimeBound::Instant(dt.with_timezone(&Utc)))
        .map_err(|e| format!("expected epoch seconds or RFC 3339 time: {e}"))
}

// ============================================================================
// Tests
// ============================================================================
