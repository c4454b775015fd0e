//! Additive weighted field matching for location records.
//!
//! The weights are fixed: a title prefix hit is worth more than a plain
//! title hit, descriptions and category follow, every matching link label
//! adds a little, and coordinates/media only add bonuses on top of a text
//! match.

use mapa_search_data::LocationRecord;

use crate::search::FieldMatch;

pub const TITLE_PREFIX_WEIGHT: u32 = 50;
pub const TITLE_CONTAINS_WEIGHT: u32 = 30;
pub const DESCRIPTION_WEIGHT: u32 = 20;
pub const DETAILED_DESCRIPTION_WEIGHT: u32 = 25;
pub const CATEGORY_WEIGHT: u32 = 15;
pub const LINK_WEIGHT: u32 = 10;
pub const COORDINATES_BONUS: u32 = 5;
pub const MEDIA_BONUS: u32 = 3;

const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoredRecord {
    pub score: u32,
    pub matches: Vec<FieldMatch>,
}

/// Score `record` against `term`.
///
/// A record with no text match scores 0 regardless of bonuses.
pub fn score_record(record: &LocationRecord, term: &str, context_radius: usize) -> ScoredRecord {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return ScoredRecord::default();
    }

    let mut scored = ScoredRecord::default();

    if let Some(title) = record.titulo.as_deref() {
        match find_ignore_case(title, &needle) {
            Some(0) => scored.add(TITLE_PREFIX_WEIGHT, FieldMatch::exact("titulo", title)),
            Some(_) => scored.add(TITLE_CONTAINS_WEIGHT, FieldMatch::exact("titulo", title)),
            None => {}
        }
    }

    for (field, weight, text) in [
        ("descricao", DESCRIPTION_WEIGHT, record.descricao.as_deref()),
        (
            "descricao_detalhada",
            DETAILED_DESCRIPTION_WEIGHT,
            record.descricao_detalhada.as_deref(),
        ),
    ] {
        let Some(text) = text else { continue };
        if let Some(position) = find_ignore_case(text, &needle) {
            let snippet = context_window(text, position, context_radius);
            scored.add(weight, FieldMatch::partial(field, snippet));
        }
    }

    if let Some(category) = record.tipo.as_deref()
        && find_ignore_case(category, &needle).is_some()
    {
        scored.add(CATEGORY_WEIGHT, FieldMatch::exact("tipo", category));
    }

    for link in &record.links {
        if find_ignore_case(&link.texto, &needle).is_some() {
            scored.add(LINK_WEIGHT, FieldMatch::exact("links", link.texto.as_str()));
        }
    }

    if scored.score == 0 {
        return scored;
    }

    if record.coordinates().is_some() {
        scored.score += COORDINATES_BONUS;
    }
    for present in [record.has_images(), record.has_audio(), record.has_video()] {
        if present {
            scored.score += MEDIA_BONUS;
        }
    }
    scored
}

impl ScoredRecord {
    fn add(&mut self, weight: u32, field_match: FieldMatch) {
        self.score += weight;
        self.matches.push(field_match);
    }
}

/// Char index in `haystack` where `needle` first occurs in the lower-cased
/// `haystack`.
///
/// `needle` is expected to be lower-cased already, with [`str::to_lowercase`]
/// as the query term is, so context-sensitive mappings such as a word-final
/// `Σ` line up on both sides.
pub fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let lowered = haystack.to_lowercase();
    let byte = lowered.find(needle)?;

    // Context-sensitive lowering only swaps between same-width chars, so the
    // per-char widths still locate each original char in `lowered`.
    let mut end = 0;
    Some(
        haystack
            .chars()
            .take_while(|c| {
                end += c.to_lowercase().map(char::len_utf8).sum::<usize>();
                end <= byte
            })
            .count(),
    )
}

/// `radius` chars either side of `position`, with ellipses where text was cut.
pub fn context_window(text: &str, position: usize, radius: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let start = position.saturating_sub(radius);
    let end = position.saturating_add(radius).min(chars.len());

    let mut snippet = String::new();
    if start > 0 {
        snippet.push_str(ELLIPSIS);
    }
    snippet.extend(&chars[start..end]);
    if end < chars.len() {
        snippet.push_str(ELLIPSIS);
    }
    snippet
}
