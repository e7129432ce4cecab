// `tcgsync sync`: rebuild the cross-reference mapping

use std::path::PathBuf;

use tcgsync_config::Settings;
use tcgsync_io::{find_reference, load_sync, read_reference, save_sync};
use tcgsync_recon::build_sync_mapping;
use tcgsync_recon::reference::parse_reference_text;

use crate::exit_codes::EXIT_REFERENCE_FORMAT;
use crate::CliError;

pub fn cmd_sync(settings: &Settings, reference: Option<PathBuf>) -> Result<(), CliError> {
    let path = match reference {
        Some(path) if path.is_file() => path,
        Some(path) => {
            return Err(CliError::args(format!("reference export not found: {}", path.display())))
        }
        None => {
            let candidates = settings.reference_candidates();
            find_reference(&candidates).ok_or_else(|| {
                let tried: Vec<String> =
                    candidates.iter().map(|p| p.display().to_string()).collect();
                CliError::args(format!("no reference export found (tried {})", tried.join(", ")))
                    .with_hint("pass --reference <file> or set paths.reference in the config")
            })?
        }
    };

    let text = read_reference(&path).map_err(CliError::io)?;
    let (entries, strategy) = parse_reference_text(&text).map_err(|e| CliError {
        code: EXIT_REFERENCE_FORMAT,
        message: format!("{}: {}", path.display(), e),
        hint: Some("expected JSON, JSON lines, or key/url records".into()),
    })?;
    log::info!("{}: {} entries ({})", path.display(), entries.len(), strategy.name());

    let (mapping, report) = build_sync_mapping(&entries);
    for key in &report.skipped {
        log::warn!("sync: no expansion for {}", key);
    }

    let sync_path = settings.sync_path();
    let previous = load_sync(&sync_path);
    save_sync(&sync_path, &mapping).map_err(CliError::io)?;

    let changed = mapping
        .iter()
        .filter(|(k, v)| previous.get(*k) != Some(*v))
        .count();
    println!(
        "Wrote {} mappings to {} ({} changed since last run)",
        mapping.len(),
        sync_path.display(),
        changed,
    );
    println!(
        "  {} entries, {} skipped, {} duplicates ({} replaced, {} rejected)",
        report.seen,
        report.skipped.len(),
        report.replaced + report.rejected,
        report.replaced,
        report.rejected,
    );
    Ok(())
}
