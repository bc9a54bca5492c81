use crate::models::{Catalog, CatalogItem};
use crate::services::{Recommender, TfidfModel};

/// Vectorizer fitted on the two-document corpus of [`alien_catalog`]
/// with default settings and smoothed idf.
pub const ALIEN_MODEL_JSON: &str = r#"{
    "vocabulary": { "action": 0, "alien": 1, "aliens": 2, "fi": 3, "horror": 4, "sci": 5 },
    "idf": [1.4054651081081644, 1.4054651081081644, 1.4054651081081644, 1.0, 1.0, 1.0],
    "lowercase": true,
    "token_pattern": "(?u)\\b\\w\\w+\\b",
    "ngram_range": [1, 1],
    "sublinear_tf": false,
    "norm": "l2"
}"#;

pub fn alien_model() -> TfidfModel {
    TfidfModel::from_reader(ALIEN_MODEL_JSON.as_bytes()).unwrap()
}

pub fn alien_catalog() -> Catalog {
    Catalog::from_items(vec![
        CatalogItem::new(1, "Alien", "Horror Sci-Fi"),
        CatalogItem::new(2, "Aliens", "Horror Sci-Fi Action"),
    ])
    .unwrap()
}

pub fn alien_recommender() -> Recommender {
    Recommender::new(alien_catalog(), alien_model())
}

/// Catalog with duplicate documents and unmatched rows for tie-breaking checks
pub fn tied_catalog() -> Catalog {
    Catalog::from_items(vec![
        CatalogItem::new(10, "Heat", "Crime"),
        CatalogItem::new(11, "Alien", "Horror"),
        CatalogItem::new(12, "Ronin", "Crime"),
        CatalogItem::new(13, "Alien", "Horror"),
        CatalogItem::new(14, "Alien", "Horror"),
    ])
    .unwrap()
}
