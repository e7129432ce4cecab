// `tcgsync cards`: fetch the card feed and merge it into the catalog

use tcgsync_config::Settings;
use tcgsync_io::{load_catalog, load_foil_list, load_missing, save_catalog, save_missing};
use tcgsync_recon::extras::{apply_foil_overrides, ExtrasLookup};
use tcgsync_recon::{canonicalize_all, merge, missing, CanonicalizeOptions, OverridePolicy};

use crate::fetch::pocketdb::PocketDb;
use crate::CliError;

pub fn cmd_cards(settings: &Settings, policy: OverridePolicy) -> Result<(), CliError> {
    let feed = PocketDb::new(settings)?;

    let raw = feed.cards()?;
    let options = CanonicalizeOptions {
        image_base_url: settings.sources.image_base_url.clone(),
    };
    let mut cards = canonicalize_all(&raw, &options);
    log::info!("fetched {} cards", cards.len());

    let foiled = load_foil_list(&settings.foil_list_path());
    if !foiled.is_empty() {
        let marked = apply_foil_overrides(&mut cards, &foiled);
        log::info!("foil list: {} listed, {} marked", foiled.len(), marked);
    }

    // Extras only refine element/type; losing them is not fatal
    match feed.extras() {
        Ok(records) => {
            let lookup = ExtrasLookup::build(&records);
            let touched = lookup.apply(&mut cards);
            log::info!("extras: {} records, {} cards updated", lookup.len(), touched);
        }
        Err(e) => log::warn!("extras unavailable, continuing without: {}", e.message),
    }

    let detected = missing::scan(&cards);

    let cards_path = settings.cards_path();
    let existing = load_catalog(&cards_path);
    let before = existing.len();
    let outcome = merge(&existing, cards, policy);

    let missing_path = settings.missing_path();
    let previous_missing = load_missing(&missing_path);
    let missing_set = missing::prune_resolved(
        &missing::reconcile(&previous_missing, &detected),
        &outcome.catalog,
    );

    save_catalog(&cards_path, &outcome.catalog).map_err(CliError::io)?;
    save_missing(&missing_path, &missing_set).map_err(CliError::io)?;

    let after = outcome.catalog.len();
    println!(
        "Wrote {} cards to {} ({}: {})",
        after,
        cards_path.display(),
        policy.describe(),
        after - before,
    );
    println!(
        "  {} added, {} replaced, {} kept; {} missing type ({} newly detected)",
        outcome.added,
        outcome.replaced,
        outcome.kept,
        missing_set.len(),
        detected.difference(&previous_missing).count(),
    );
    Ok(())
}
