//! Card-detail pages: scrape the type line (and element for pokemon).
//!
//! Page layout:
//! - `p.card-text-type`: `Pokémon - Basic`, `Trainer - Supporter`, …
//! - `p.card-text-title`: `Bulbasaur - Grass - 70 HP`; the element is the
//!   segment before the HP
//!
//! Both are preferably read from inside `div.card-text-section`.
//! Segments split on a spaced hyphen only, so names like `Ho-Oh` survive.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{Html, Selector};
use tcgsync_config::Settings;
use tcgsync_recon::enrich::{TypeInfo, TypeLookup};

use super::common::FetchClient;
use crate::CliError;

const TYPE_SELECTORS: [&str; 2] = [
    "div.card-text-section p.card-text-type",
    "p.card-text-type",
];
const TITLE_SELECTORS: [&str; 2] = [
    "div.card-text-section p.card-text-title",
    "p.card-text-title",
];

pub(crate) struct Limitless {
    client: FetchClient,
    base_url: String,
}

impl Limitless {
    pub(crate) fn new(settings: &Settings) -> Result<Self, CliError> {
        Ok(Self {
            client: FetchClient::new("limitless", &settings.http)?,
            base_url: settings.sources.detail_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn card_url(&self, set_code: &str, number: u32) -> String {
        format!("{}/cards/{}/{}", self.base_url, set_code, number)
    }
}

impl TypeLookup for Limitless {
    type Error = CliError;

    fn lookup(&mut self, set_code: &str, number: u32) -> Result<Option<TypeInfo>, CliError> {
        let page = self.client.get_page(&self.card_url(set_code, number))?;
        Ok(page.as_deref().and_then(parse_card_page))
    }
}

/// Extract the type line from a card-detail page.
pub(crate) fn parse_card_page(html: &str) -> Option<TypeInfo> {
    let doc = Html::parse_document(html);

    let type_line = first_text(&doc, &TYPE_SELECTORS)?;
    let parts = segments(&type_line);
    let primary = fold_label(parts.first()?);

    let subtype = match primary.as_str() {
        "trainer" => parts.get(1).map(|s| fold_label(s)),
        _ => None,
    };

    let element = match primary.as_str() {
        "pokemon" => first_text(&doc, &TITLE_SELECTORS).and_then(|title| {
            let parts = segments(&title);
            (parts.len() >= 2).then(|| fold_label(&parts[parts.len() - 2]))
        }),
        _ => None,
    };

    Some(TypeInfo {
        primary,
        subtype,
        element,
    })
}

/// Text of the first element matching any selector, whitespace-joined.
/// Empty text counts as no match.
fn first_text(doc: &Html, selectors: &[&str]) -> Option<String> {
    let element = selectors
        .iter()
        .filter_map(|css| Selector::parse(css).ok())
        .find_map(|sel| doc.select(&sel).next())?;

    let text = element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}

fn segments(line: &str) -> Vec<String> {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    let re = SEPARATOR.get_or_init(|| Regex::new(r"\s+-\s+").unwrap());
    re.split(line)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Lowercase ASCII form of a label: accents folded, other non-ASCII dropped.
pub(crate) fn fold_label(label: &str) -> String {
    label
        .chars()
        .filter_map(|c| {
            if c.is_ascii() {
                return Some(c);
            }
            let folded = match c {
                'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'a',
                'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => 'e',
                'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => 'i',
                'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'o',
                'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => 'u',
                'ñ' | 'Ñ' => 'n',
                'ç' | 'Ç' => 'c',
                'ý' | 'ÿ' | 'Ý' => 'y',
                _ => return None,
            };
            Some(folded)
        })
        .collect::<String>()
        .trim()
        .to_lowercase()
}
