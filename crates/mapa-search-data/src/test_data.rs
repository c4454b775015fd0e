use chrono::{TimeZone, Utc};
use tracing::info;

use crate::raw::RawLocationRecord;

/// Configuration for fixture record generation
#[derive(Debug, Clone)]
pub struct TestDataConfig {
    /// Number of rows to produce
    pub rows: usize,
    /// Whether to use the curated Santos dataset or terse synthetic rows
    pub realistic_data: bool,
}

impl Default for TestDataConfig {
    fn default() -> Self {
        Self {
            rows: REALISTIC_ROWS.len(),
            realistic_data: true,
        }
    }
}

impl TestDataConfig {
    /// Minimal data for unit tests
    pub fn minimal() -> Self {
        Self {
            rows: 3,
            realistic_data: false,
        }
    }

    /// Sample data for integration tests and demos
    pub fn sample() -> Self {
        Self::default()
    }
}

/// Create fixture rows according to `config`.
///
/// Realistic rows are returned in creation order (oldest first) with
/// distinct timestamps, so recency ordering is deterministic.
pub fn create_test_records(config: &TestDataConfig) -> Vec<RawLocationRecord> {
    info!("Creating test records with config: {:?}", config);

    if config.realistic_data {
        realistic_records(config.rows)
    } else {
        minimal_records(config.rows)
    }
}

// (id, titulo, descricao, descricao_detalhada, tipo, links, imagens, audio, video, localizacao)
type Row = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
);

const REALISTIC_ROWS: [Row; 8] = [
    (
        "1",
        "Policlínica Aparecida",
        "Unidade de saúde com atendimento de especialidades",
        "Av. Pedro Lessa, 1728 - Aparecida, Santos\n**Segunda a sexta**, das 7h às 19h",
        "Saúde",
        "Agendamento|https://www.santos.sp.gov.br/saude",
        "",
        "",
        "",
        "-23.9713854,-46.318503",
    ),
    (
        "2",
        "Museu do Café",
        "Antiga Bolsa Oficial de Café, no centro histórico",
        "Rua XV de Novembro, 95\nCafeteria com *cafés especiais* e exposição permanente",
        "Museu",
        "Site oficial|https://www.museudocafe.org.br;Visita virtual|https://tour.museudocafe.org.br",
        "bolsa.jpg,salao.jpg",
        "audioguia-cafe.mp3",
        "",
        "-23.9345,-46.3261",
    ),
    (
        "3",
        "Café Paraíso",
        "Cafeteria tradicional no Gonzaga",
        "",
        "Gastronomia",
        "",
        "fachada.jpg",
        "",
        "",
        "-23.9664,-46.3335",
    ),
    (
        "4",
        "Aquário Municipal de Santos",
        "Um dos aquários mais antigos do país",
        "Av. Bartolomeu de Gusmão, s/n - Ponta da Praia",
        "Lazer",
        "Ingressos|https://www.santos.sp.gov.br/aquario",
        "tanque.jpg",
        "",
        "https://video.santos.sp.gov.br/aquario.mp4",
        "-23.9866,-46.3079",
    ),
    (
        "5",
        "Orquidário Municipal",
        "Parque zoobotânico com orquídeas e aves",
        "Praça Washington, s/n - José Menino",
        "Parque",
        "",
        "",
        "",
        "",
        "coordenadas indisponíveis",
    ),
    (
        "",
        "Praia do Gonzaga",
        "Trecho mais movimentado da orla",
        "Jardins da orla, os maiores do mundo em extensão",
        "Praia",
        "Guia da orla|https://turismo.santos.sp.gov.br/orla",
        "",
        "",
        "",
        "-23.9690,-46.3330",
    ),
    (
        "7",
        "Monte Serrat",
        "Mirante com vista para a cidade e o porto",
        "Acesso pelo bondinho a partir da Praça Correia de Mello",
        "Mirante",
        "",
        "mirante.jpg",
        "",
        "",
        "-23.9420,-46.3330",
    ),
    (
        "8",
        "Pinacoteca Benedicto Calixto",
        "Casarão à beira-mar com acervo do pintor",
        "Av. Bartolomeu de Gusmão, 15 - Boqueirão",
        "Museu",
        "",
        "",
        "",
        "",
        "",
    ),
];

fn opt(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn realistic_records(rows: usize) -> Vec<RawLocationRecord> {
    REALISTIC_ROWS
        .iter()
        .take(rows)
        .zip(1u32..)
        .map(
            |(&(id, titulo, descricao, detalhada, tipo, links, imagens, audio, video, loc), day)| {
                RawLocationRecord {
                    id: opt(id),
                    titulo: opt(titulo),
                    descricao: opt(descricao),
                    descricao_detalhada: opt(detalhada),
                    tipo: opt(tipo),
                    links: opt(links),
                    imagens: opt(imagens),
                    audio: opt(audio),
                    video: opt(video),
                    localizacao: opt(loc),
                    created_at: Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).single(),
                }
            },
        )
        .collect()
}

fn minimal_records(rows: usize) -> Vec<RawLocationRecord> {
    (0..rows)
        .map(|i| RawLocationRecord {
            id: Some(format!("test-{i}")),
            titulo: Some(format!("Local de teste {i}")),
            descricao: Some(format!("Descrição do local {i}")),
            tipo: Some("Teste".to_string()),
            ..Default::default()
        })
        .collect()
}
