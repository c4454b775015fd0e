//! Parsers for the composite string fields stored on location rows.
//!
//! Each parser is independent: a malformed value in one field never prevents
//! the others from being read.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_LINK_LABEL: &str = "Sem título";
pub const DEFAULT_LINK_URL: &str = "#";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldParseError {
    #[error("field is empty")]
    Empty,
    #[error("expected \"lat,lng\", got {0:?}")]
    MissingComponent(String),
    #[error("not a number: {0:?}")]
    InvalidNumber(String),
    #[error("coordinates out of range: lat={lat}, lng={lng}")]
    OutOfRange { lat: f64, lng: f64 },
}

/// A WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Parse a `"lat,lng"` string.
pub fn parse_coordinates(value: &str) -> Result<Coordinates, FieldParseError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FieldParseError::Empty);
    }
    let Some((lat, lng)) = value.split_once(',') else {
        return Err(FieldParseError::MissingComponent(value.to_string()));
    };

    let lat = parse_number(lat)?;
    let lng = parse_number(lng)?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(FieldParseError::OutOfRange { lat, lng });
    }
    Ok(Coordinates { lat, lng })
}

fn parse_number(part: &str) -> Result<f64, FieldParseError> {
    let part = part.trim();
    if part.is_empty() {
        return Err(FieldParseError::MissingComponent(part.to_string()));
    }
    part.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| FieldParseError::InvalidNumber(part.to_string()))
}

/// An external link attached to a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub texto: String,
    pub url: String,
}

/// Parse `label|url` entries separated by `;`.
///
/// Missing halves fall back to [`DEFAULT_LINK_LABEL`] / [`DEFAULT_LINK_URL`].
/// An entry without a separator is taken as a URL when it looks like one,
/// otherwise as a label.
pub fn parse_links(value: &str) -> Vec<Link> {
    value
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (texto, url) = match entry.split_once('|') {
                Some((texto, url)) => (texto.trim(), url.trim()),
                None if looks_like_url(entry) => ("", entry),
                None => (entry, ""),
            };
            Link {
                texto: non_empty_or(texto, DEFAULT_LINK_LABEL),
                url: non_empty_or(url, DEFAULT_LINK_URL),
            }
        })
        .collect()
}

fn looks_like_url(entry: &str) -> bool {
    entry.starts_with("http://")
        || entry.starts_with("https://")
        || entry.starts_with("www.")
        || entry.starts_with('/')
}

fn non_empty_or(value: &str, default: &str) -> String {
    let value = if value.is_empty() { default } else { value };
    value.to_string()
}

/// Split a comma-separated list of image URLs, dropping blanks and repeats.
pub fn parse_images(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .unique()
        .map(str::to_string)
        .collect()
}

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern"));
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*\n]+?)\*").expect("italic pattern"));

/// Light Markdown substitution used for detailed descriptions.
///
/// Newlines become `<br>`, `**x**` becomes `<strong>x</strong>` and `*x*`
/// becomes `<em>x</em>`. Bold runs first so its asterisks are not read as
/// two italic markers.
pub fn markdown_to_markup(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = BOLD.replace_all(&text, "<strong>$1</strong>");
    let text = ITALIC.replace_all(&text, "<em>$1</em>");
    text.replace('\n', "<br>")
}
