//! `search` and `categories` command handlers.

use std::sync::Arc;

use dokoiko_core::{load_categories, place_type_label, AppConfig, CategoryMapping, SearchRequest};
use dokoiko_search::{ProviderOutcome, SearchController, SearchServices, SearchView};

use crate::SearchArgs;

fn category_mapping(config: Option<&AppConfig>) -> anyhow::Result<CategoryMapping> {
    match config.and_then(|c| c.categories_path.as_deref()) {
        Some(path) => Ok(load_categories(path)?),
        None => Ok(CategoryMapping::builtin()),
    }
}

pub(crate) fn build_request(args: &SearchArgs) -> SearchRequest {
    let mut request = SearchRequest::new(args.address.clone());
    request.category.clone_from(&args.category);
    request.provider_a_types.clone_from(&args.types);
    request.provider_b_genres.clone_from(&args.genres);
    request.radius_m = args.radius;
    request.keyword.clone_from(&args.keyword);
    request
}

/// Runs one search plus up to `--more` load-more rounds and prints the result.
///
/// # Errors
///
/// Returns an error if the request is invalid, the HTTP clients cannot be
/// built, or a round is rejected.
pub(crate) async fn run_search(config: &AppConfig, args: &SearchArgs) -> anyhow::Result<()> {
    let categories = Arc::new(category_mapping(Some(config))?);
    let services = Arc::new(SearchServices::from_config(config, categories)?);
    let controller = SearchController::new(services);

    let mut view = controller.search(build_request(args)).await?;
    for round in 0..args.more {
        if !view.has_more {
            tracing::info!(round, "nothing more to load");
            break;
        }
        view = controller.load_more().await?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render_table(&view));
    }
    Ok(())
}

fn outcome_label(outcome: &ProviderOutcome) -> String {
    match outcome {
        ProviderOutcome::Ok { count } => format!("{count} results"),
        ProviderOutcome::Failed { reason } => format!("failed ({reason})"),
        ProviderOutcome::Skipped => "skipped".to_owned(),
    }
}

pub(crate) fn render_table(view: &SearchView) -> String {
    if view.status.address_not_found {
        return "address not found; try a different place name or a \"lat,lng\" pair\n".to_owned();
    }

    let mut lines = Vec::with_capacity(view.results.len() + 3);
    if let Some(origin) = view.origin {
        lines.push(format!("origin: {}", origin.to_query()));
    }
    lines.push(format!(
        "google: {}  yahoo: {}  more: {}",
        outcome_label(&view.status.provider_a),
        outcome_label(&view.status.provider_b),
        if view.has_more { "yes" } else { "no" },
    ));

    if view.results.is_empty() {
        lines.push("no results".to_owned());
    } else {
        lines.push(format!("{:<5}{:<8}{:<40}ADDRESS", "#", "SOURCE", "NAME"));
        lines.extend(view.results.iter().enumerate().map(|(index, item)| {
            format!(
                "{:<5}{:<8}{:<40}{}",
                index + 1,
                item.result.source_provider.to_string(),
                item.result.name.as_deref().unwrap_or("-"),
                item.result.address.as_deref().unwrap_or("-"),
            )
        }));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Prints each category with its Google types (and labels) and Yahoo genres.
///
/// # Errors
///
/// Returns an error if a configured categories file cannot be loaded.
pub(crate) fn run_categories() -> anyhow::Result<()> {
    let config = dokoiko_core::load_app_config().ok();
    let mapping = category_mapping(config.as_ref())?;

    for category in mapping.iter() {
        println!("{}", category.name);
        let types: Vec<String> = category
            .provider_a_types
            .iter()
            .map(|code| match place_type_label(code) {
                Some(label) => format!("{code} ({label})"),
                None => code.clone(),
            })
            .collect();
        println!("  google: {}", types.join(", "));
        println!("  yahoo:  {}", category.provider_b_genres.join(", "));
    }
    Ok(())
}
