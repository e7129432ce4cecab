use crate::model::{Card, RawCard};
use crate::normalize::{build_id, derive_series, normalize_number, normalize_set};

/// Inputs to canonicalization that come from configuration, not the record.
#[derive(Debug, Clone, Default)]
pub struct CanonicalizeOptions {
    /// Prefix for card image locations, e.g.
    /// `https://host/images/cards-by-set/`.
    pub image_base_url: String,
}

/// Map one raw feed record into the canonical schema.
///
/// Identity fields (`set`, `number`, `id`, `series`) are normalized. The
/// image location is built from the *original* set code and number text,
/// since upstream asset storage is keyed by those.
pub fn canonicalize(raw: &RawCard, options: &CanonicalizeOptions) -> Card {
    let original_set = raw.set.as_deref().unwrap_or("").trim();
    let original_number = raw.number.as_deref().unwrap_or("");

    let set = normalize_set(original_set);
    let (padded, number) = normalize_number(original_number);
    let id = build_id(&set, &padded);
    let series = derive_series(&set);

    let name = raw.name.as_deref().unwrap_or("").trim().replace("PROMO", "P");
    let image = format!(
        "{}{}/{}.webp",
        options.image_base_url, original_set, original_number
    );

    Card {
        series,
        set,
        number,
        id,
        name,
        rarity: trimmed(&raw.rarity),
        image,
        packs: raw.packs.clone().unwrap_or_default(),
        element: trimmed(&raw.element),
        card_type: trimmed(&raw.card_type),
        is_foil: raw.is_foil.unwrap_or(false),
    }
}

pub fn canonicalize_all(raws: &[RawCard], options: &CanonicalizeOptions) -> Vec<Card> {
    raws.iter().map(|raw| canonicalize(raw, options)).collect()
}

fn trimmed(field: &Option<String>) -> String {
    field.as_deref().unwrap_or("").trim().to_string()
}
