// `tcgsync sets`: rebuild the set catalog

use tcgsync_config::Settings;
use tcgsync_io::save_sets;
use tcgsync_recon::sets::build_set_catalog;

use crate::fetch::pocketdb::PocketDb;
use crate::CliError;

pub fn cmd_sets(settings: &Settings) -> Result<(), CliError> {
    let raw = PocketDb::new(settings)?.sets()?;
    let sets = build_set_catalog(&raw);

    let path = settings.sets_path();
    save_sets(&path, &sets).map_err(CliError::io)?;
    println!("Wrote {} sets to {}", sets.len(), path.display());
    Ok(())
}
