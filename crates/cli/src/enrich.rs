// `tcgsync enrich`: fill in missing card types from the detail site

use tcgsync_config::Settings;
use tcgsync_io::{load_catalog, load_missing, save_catalog, save_missing};
use tcgsync_recon::enrich::resolve_missing;
use tcgsync_recon::MissingSet;

use crate::fetch::limitless::Limitless;
use crate::CliError;

pub fn cmd_enrich(settings: &Settings, limit: Option<usize>) -> Result<(), CliError> {
    let missing_path = settings.missing_path();
    let missing_set = load_missing(&missing_path);
    if missing_set.is_empty() {
        println!("Nothing to enrich: {} is empty", missing_path.display());
        return Ok(());
    }

    let cards_path = settings.cards_path();
    let mut catalog = load_catalog(&cards_path);
    if catalog.is_empty() {
        log::warn!("{} has no cards; lookups cannot be applied", cards_path.display());
    }

    // With a limit, only the first N members are looked up; the rest stay
    // in the missing set untouched.
    let batch: MissingSet = match limit {
        Some(n) => missing_set.iter().take(n).cloned().collect(),
        None => missing_set.clone(),
    };

    let mut lookup = Limitless::new(settings)?;
    let (resolved_batch, report) = resolve_missing(&mut catalog, &batch, &mut lookup);
    let remaining: MissingSet = missing_set
        .difference(&batch)
        .cloned()
        .chain(resolved_batch)
        .collect();

    if !report.matched.is_empty() {
        save_catalog(&cards_path, &catalog).map_err(CliError::io)?;
        println!("Updated {} cards in {}", report.matched.len(), cards_path.display());
    }
    save_missing(&missing_path, &remaining).map_err(CliError::io)?;

    println!(
        "Resolved {}/{}. Remaining: {} in {}",
        report.matched.len(),
        batch.len(),
        remaining.len(),
        missing_path.display(),
    );
    if !report.failed.is_empty() {
        println!("  {} lookups failed and will be retried next run", report.failed.len());
    }
    Ok(())
}
