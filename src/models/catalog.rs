use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// A single movie in the catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogItem {
    pub id: i64,
    pub title: String,
    /// Delimiter-joined genre tags, e.g. "Horror|Sci-Fi"
    pub genres: String,
}

impl CatalogItem {
    pub fn new(id: i64, title: impl Into<String>, genres: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            genres: genres.into(),
        }
    }

    /// Text the feature matrix is built from
    pub fn document(&self) -> String {
        format!("{} {}", self.title, self.genres)
    }
}

/// Read-only movie catalog indexed by dense position and by external id
#[derive(Debug)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    id_to_position: HashMap<i64, usize>,
}

impl Catalog {
    /// Builds a catalog from items in position order, rejecting duplicate ids
    pub fn from_items(items: Vec<CatalogItem>) -> AppResult<Self> {
        if items.is_empty() {
            return Err(AppError::Load("Catalog contains no movies".to_string()));
        }

        let mut id_to_position = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            if let Some(previous) = id_to_position.insert(item.id, position) {
                return Err(AppError::Load(format!(
                    "Duplicate movie id {} at rows {} and {}",
                    item.id, previous, position
                )));
            }
        }

        Ok(Self {
            items,
            id_to_position,
        })
    }

    /// Loads the catalog CSV and checks it against the position-to-id mapping file
    pub fn load(catalog_path: &Path, mappings_path: &Path) -> AppResult<Self> {
        let file = File::open(catalog_path)
            .map_err(|e| AppError::load(format!("Failed to open {}", catalog_path.display()), e))?;
        let catalog = Self::from_csv_reader(file)?;

        let file = File::open(mappings_path)
            .map_err(|e| AppError::load(format!("Failed to open {}", mappings_path.display()), e))?;
        let mappings: BTreeMap<String, i64> = serde_json::from_reader(file).map_err(|e| {
            AppError::load(format!("Invalid mappings in {}", mappings_path.display()), e)
        })?;
        catalog.verify_mappings(&mappings)?;

        tracing::info!(
            movies = catalog.count(),
            mappings = mappings.len(),
            "Catalog loaded"
        );

        Ok(catalog)
    }

    /// Parses catalog rows from CSV with `movieId` (or `id`), `title` and `genres` columns
    pub fn from_csv_reader<R: Read>(reader: R) -> AppResult<Self> {
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| AppError::load("Failed to read catalog headers", e))?
            .clone();

        let id_index = find_column(&headers, &["movieId", "id"])?;
        let title_index = find_column(&headers, &["title"])?;
        let genres_index = find_column(&headers, &["genres"])?;

        let mut items = Vec::new();
        for (row, record) in reader.records().enumerate() {
            // header is line 1
            let line = row + 2;
            let record =
                record.map_err(|e| AppError::load(format!("Catalog line {}", line), e))?;

            let field = |index: usize| record.get(index).unwrap_or_default().trim();
            let id = field(id_index).parse::<i64>().map_err(|e| {
                AppError::load(
                    format!("Catalog line {}: invalid movie id '{}'", line, field(id_index)),
                    e,
                )
            })?;

            items.push(CatalogItem::new(id, field(title_index), field(genres_index)));
        }

        Self::from_items(items)
    }

    /// Ensures the mapping covers exactly positions `0..count` and agrees with row order
    fn verify_mappings(&self, mappings: &BTreeMap<String, i64>) -> AppResult<()> {
        if mappings.len() != self.count() {
            return Err(AppError::Load(format!(
                "Mapping has {} entries but catalog has {} movies",
                mappings.len(),
                self.count()
            )));
        }

        for (key, &id) in mappings {
            let position: usize = key
                .parse()
                .map_err(|e| AppError::load(format!("Invalid mapping position '{}'", key), e))?;
            match self.items.get(position) {
                Some(item) if item.id == id => {}
                Some(item) => {
                    return Err(AppError::Load(format!(
                        "Mapping puts movie {} at position {}, catalog has movie {}",
                        id, position, item.id
                    )))
                }
                None => {
                    return Err(AppError::Load(format!(
                        "Mapping position {} is outside the catalog",
                        position
                    )))
                }
            }
        }

        Ok(())
    }

    pub fn item_at(&self, position: usize) -> Option<&CatalogItem> {
        self.items.get(position)
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn id_to_position(&self, id: i64) -> Option<usize> {
        self.id_to_position.get(&id).copied()
    }

    pub fn position_to_id(&self, position: usize) -> Option<i64> {
        self.items.get(position).map(|item| item.id)
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }
}

/// Position of the first header matching any of `names`, ignoring case
fn find_column(headers: &StringRecord, names: &[&str]) -> AppResult<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|name| h.trim().eq_ignore_ascii_case(name)))
        .ok_or_else(|| AppError::Load(format!("Catalog is missing a '{}' column", names[0])))
}
