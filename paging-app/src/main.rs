mod config;
mod error;
mod seed;

use crate::config::{LOG_VAR, QueryConfig};
use crate::error::{AppError, AppResult};
use crate::seed::{Person, PersonView};
use error_stack::fmt::ColorMode;
use error_stack::{Report, ResultExt};
use paging_core::{Direction, PageQuery, Pagination, PaginationResult};
use paging_sources::Predicate;
use serde::Serialize;
use std::process::ExitCode;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> ExitCode {
    // PAGING_LOG may itself come from the .env file
    let env_file = config::load_env_file();
    init_logging();
    env_file.log();

    match run_demo().await {
        Ok(()) => {
            info!("all demo queries ran");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("demo query failed: {e:?}");
            ExitCode::FAILURE
        }
    }
}

/// Plain, uncolored reports on a compact fmt layer. Without `PAGING_LOG` only
/// `info` and above is shown.
fn init_logging() {
    Report::set_color_mode(ColorMode::None);

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(log_filter(std::env::var(LOG_VAR).ok().as_deref()))
        .init();
}

fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

async fn run_demo() -> AppResult<()> {
    let config = QueryConfig::from_env()?;
    debug!(?config, "loaded query configuration");

    let people = seed::people();
    let countries = seed::countries();
    debug!(people = people.len(), countries = countries.len(), "seeded sources");

    let raw = query_people(&config)
        .execute(&people)
        .await
        .change_context(AppError)?;
    print_json("people", &raw)?;

    let views = query_people(&config)
        .map(PersonView::from)
        .execute(&people)
        .await
        .change_context(AppError)?;
    print_json("people as views", &views)?;

    let loaded = query_people(&config)
        .map_async(seed::load_view)
        .execute(&people)
        .await
        .change_context(AppError)?;
    print_json("people as loaded views", &loaded)?;

    let by_population = PageQuery::new(Pagination::new(1, 3))
        .sort_by("population", Direction::Descending)
        .map(|c: seed::Country| c.name)
        .execute_blocking(&countries)
        .change_context(AppError)?;
    print_json("most populous countries", &by_population)?;

    Ok(())
}

fn query_people(config: &QueryConfig) -> PageQuery<Predicate<Person>> {
    let query = PageQuery::new(config.pagination).sort(config.sort.clone());

    match &config.filter {
        Some(name) => query.filter(first_name_contains(name)),
        None => query,
    }
}

fn first_name_contains(name: &str) -> Predicate<Person> {
    let name = name.to_lowercase();
    Predicate::new(move |p: &Person| p.firstname.to_lowercase().contains(&name))
}

#[instrument(skip(page), fields(total_items = page.total_items()))]
fn print_json<T: Serialize>(label: &str, page: &PaginationResult<T>) -> AppResult<()> {
    let json = serde_json::to_string_pretty(page)
        .change_context(AppError)
        .attach_with(|| format!("serializing {label}"))?;

    println!("{label}:\n{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(filter: Option<&str>) -> QueryConfig {
        QueryConfig {
            pagination: Pagination::new(1, 20),
            sort: None,
            filter: filter.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn filter_is_case_insensitive() {
        let people = seed::people();

        let page = query_people(&config(Some("JO")))
            .execute(&people)
            .await
            .unwrap();

        assert_eq!(5, page.total_items());
        assert!(
            page.results()
                .iter()
                .all(|p| p.firstname.to_lowercase().contains("jo"))
        );
    }

    #[tokio::test]
    async fn no_filter_returns_everyone() {
        let people = seed::people();

        let page = query_people(&config(None)).execute(&people).await.unwrap();

        assert_eq!(people.len() as u64, page.total_items());
        assert_eq!(None, page.next_page());
    }

    #[test]
    fn log_filter_defaults_to_info() {
        assert_eq!("info", log_filter(None).to_string());
    }

    #[test]
    fn log_filter_uses_given_directives() {
        let filter = log_filter(Some("paging_core=debug"));

        assert_eq!("paging_core=debug", filter.to_string());
    }

    #[test]
    fn countries_by_population() {
        let countries = seed::countries();

        let names = PageQuery::new(Pagination::new(1, 2))
            .sort_by("population", Direction::Descending)
            .map(|c: seed::Country| c.name)
            .execute_blocking(&countries)
            .unwrap()
            .into_results();

        assert_eq!(vec!["Brazil", "Japan"], names);
    }
}
