//! Normalized location records.
//!
//! [`normalize_record`] turns a [`RawLocationRecord`] into a [`LocationRecord`]
//! with its composite fields parsed. Each field falls back to a safe default
//! on its own, so one malformed column never drops the whole row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

mod fields;

pub use fields::{
    Coordinates, DEFAULT_LINK_LABEL, DEFAULT_LINK_URL, FieldParseError, Link, markdown_to_markup,
    parse_coordinates, parse_images, parse_links,
};

use crate::raw::RawLocationRecord;

/// A location row after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub id: Option<String>,
    pub titulo: Option<String>,
    pub descricao: Option<String>,
    /// Detailed description with light Markdown already converted to markup
    pub descricao_detalhada: Option<String>,
    pub tipo: Option<String>,
    pub links: Vec<Link>,
    pub imagens: Vec<String>,
    #[serde(rename = "audioUrl")]
    pub audio_url: Option<String>,
    pub video: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
}

impl LocationRecord {
    /// Both coordinates, if the row carried a valid `"lat,lng"` pair.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        }
    }

    pub fn has_images(&self) -> bool {
        !self.imagens.is_empty()
    }

    pub fn has_audio(&self) -> bool {
        self.audio_url.is_some()
    }

    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }
}

/// Normalize a raw row.
pub fn normalize_record(raw: RawLocationRecord) -> LocationRecord {
    let coordinates = raw
        .localizacao
        .as_deref()
        .map(parse_coordinates)
        .transpose()
        .unwrap_or_else(|e| {
            debug!(id = ?raw.id, error = %e, "Discarding unparsable coordinates");
            None
        });

    LocationRecord {
        links: raw.links.as_deref().map(parse_links).unwrap_or_default(),
        imagens: raw.imagens.as_deref().map(parse_images).unwrap_or_default(),
        audio_url: non_blank(raw.audio),
        video: non_blank(raw.video),
        latitude: coordinates.map(|c| c.lat),
        longitude: coordinates.map(|c| c.lng),
        descricao_detalhada: raw.descricao_detalhada.as_deref().map(markdown_to_markup),
        id: raw.id,
        titulo: raw.titulo,
        descricao: raw.descricao,
        tipo: raw.tipo,
        created_at: raw.created_at,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_full_record() {
        let raw = RawLocationRecord {
            id: Some("7".into()),
            titulo: Some("Policlínica Aparecida".into()),
            descricao_detalhada: Some("Av. Pedro Lessa, 1728\n**24h**".into()),
            links: Some("Agendamento|https://saude.santos.sp.gov.br".into()),
            imagens: Some("fachada.jpg,recepcao.jpg".into()),
            audio: Some("guia.mp3".into()),
            localizacao: Some("-23.9713854,-46.318503".into()),
            ..Default::default()
        };

        let record = normalize_record(raw);

        assert_eq!(
            record.descricao_detalhada.as_deref(),
            Some("Av. Pedro Lessa, 1728<br><strong>24h</strong>")
        );
        assert_eq!(record.links.len(), 1);
        assert_eq!(record.imagens.len(), 2);
        assert_eq!(record.audio_url.as_deref(), Some("guia.mp3"));
        assert_eq!(record.latitude, Some(-23.9713854));
        assert_eq!(record.longitude, Some(-46.318503));
        assert!(record.coordinates().is_some());
    }

    #[test]
    fn test_malformed_fields_fall_back_independently() {
        let raw = RawLocationRecord {
            titulo: Some("Mirante".into()),
            localizacao: Some("perto da praia".into()),
            imagens: Some("vista.jpg".into()),
            video: Some("   ".into()),
            ..Default::default()
        };

        let record = normalize_record(raw);

        assert_eq!(record.latitude, None);
        assert_eq!(record.longitude, None);
        assert_eq!(record.imagens, vec!["vista.jpg".to_string()]);
        assert!(!record.has_video());
        assert_eq!(record.titulo.as_deref(), Some("Mirante"));
    }

    #[test]
    fn test_serializes_audio_url_in_camel_case() {
        let record = normalize_record(RawLocationRecord {
            audio: Some("a.mp3".into()),
            ..Default::default()
        });
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["audioUrl"], "a.mp3");
    }
}
