use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// Row normalization applied after idf weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// On-disk shape of the fitted vectorizer
#[derive(Debug, Deserialize)]
struct TfidfArtifact {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    #[serde(default = "default_true")]
    lowercase: bool,
    #[serde(default = "default_token_pattern")]
    token_pattern: String,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default)]
    stop_words: Vec<String>,
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default = "default_norm")]
    norm: Option<Norm>,
}

fn default_true() -> bool {
    true
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

/// Sparse weighted vector over the model vocabulary.
///
/// Only produced by [`TfidfModel::vectorize`]. Indices are strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct TermVector {
    dim: usize,
    indices: Vec<u32>,
    values: Vec<f64>,
}

impl TermVector {
    fn from_sorted(dim: usize, entries: BTreeMap<u32, f64>) -> Self {
        let (indices, values) = entries.into_iter().unzip();
        Self {
            dim,
            indices,
            values,
        }
    }

    /// Dimensionality, equal to the vocabulary size of the producing model
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of non-zero entries
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn get(&self, index: u32) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Dot product by merging the two sorted index lists
    pub fn dot(&self, other: &TermVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Fitted TF-IDF term-weighting model.
///
/// Loaded from a JSON export of a fitted scikit-learn `TfidfVectorizer`;
/// `vectorize` reproduces its `transform` (token pattern, stop words, word
/// n-grams, raw or sublinear tf, idf weighting, row normalization).
/// Vocabulary and idf values are taken as-is from the artifact.
#[derive(Debug)]
pub struct TfidfModel {
    vocabulary: HashMap<String, u32>,
    idf: Vec<f64>,
    lowercase: bool,
    token_pattern: Regex,
    ngram_range: (usize, usize),
    stop_words: HashSet<String>,
    sublinear_tf: bool,
    norm: Option<Norm>,
}

impl TfidfModel {
    pub fn load(path: &Path) -> AppResult<Self> {
        let file = File::open(path)
            .map_err(|e| AppError::load(format!("Failed to open {}", path.display()), e))?;
        let model = Self::from_reader(BufReader::new(file))?;

        tracing::info!(
            path = %path.display(),
            vocabulary_size = model.vocabulary_size(),
            ngram_range = ?model.ngram_range,
            "TF-IDF model loaded"
        );

        Ok(model)
    }

    pub fn from_reader<R: Read>(reader: R) -> AppResult<Self> {
        let artifact: TfidfArtifact = serde_json::from_reader(reader)
            .map_err(|e| AppError::load("Invalid TF-IDF model artifact", e))?;
        Self::from_artifact(artifact)
    }

    fn from_artifact(artifact: TfidfArtifact) -> AppResult<Self> {
        let size = artifact.vocabulary.len();
        if artifact.idf.len() != size {
            return Err(AppError::Load(format!(
                "Vocabulary has {} terms but idf has {} weights",
                size,
                artifact.idf.len()
            )));
        }
        if let Some(bad) = artifact.idf.iter().find(|w| !w.is_finite() || **w <= 0.0) {
            return Err(AppError::Load(format!("Invalid idf weight {}", bad)));
        }

        let mut seen = vec![false; size];
        let mut vocabulary = HashMap::with_capacity(size);
        for (term, index) in artifact.vocabulary {
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(AppError::Load(format!(
                        "Vocabulary index {} for '{}' is out of range or repeated",
                        index, term
                    )))
                }
            }
            let index = u32::try_from(index)
                .map_err(|e| AppError::load(format!("Vocabulary index {}", index), e))?;
            vocabulary.insert(term, index);
        }

        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(AppError::Load(format!(
                "Invalid ngram range ({}, {})",
                min_n, max_n
            )));
        }

        let token_pattern = Regex::new(&artifact.token_pattern)
            .map_err(|e| AppError::load("Invalid token pattern", e))?;
        if token_pattern.captures_len() > 2 {
            return Err(AppError::Load(
                "Token pattern may contain at most one capturing group".to_string(),
            ));
        }

        Ok(Self {
            vocabulary,
            idf: artifact.idf,
            lowercase: artifact.lowercase,
            token_pattern,
            ngram_range: artifact.ngram_range,
            stop_words: artifact.stop_words.into_iter().collect(),
            sublinear_tf: artifact.sublinear_tf,
            norm: artifact.norm,
        })
    }

    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    /// Converts free text into a weighted vector over the fitted vocabulary
    pub fn vectorize(&self, text: &str) -> TermVector {
        let mut counts: BTreeMap<u32, f64> = BTreeMap::new();
        for term in self.analyze(text) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        for (&index, weight) in counts.iter_mut() {
            let tf = if self.sublinear_tf {
                1.0 + weight.ln()
            } else {
                *weight
            };
            *weight = tf * self.idf[index as usize];
        }

        let scale = match self.norm {
            Some(Norm::L2) => counts.values().map(|w| w * w).sum::<f64>().sqrt(),
            Some(Norm::L1) => counts.values().map(|w| w.abs()).sum::<f64>(),
            None => 1.0,
        };
        if scale > 0.0 {
            for weight in counts.values_mut() {
                *weight /= scale;
            }
        }

        TermVector::from_sorted(self.vocabulary_size(), counts)
    }

    /// Splits text into the terms the vocabulary was fitted on
    fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let tokens: Vec<&str> = self
            .token_pattern
            .captures_iter(&text)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
            .map(|m| m.as_str())
            .filter(|token| !self.stop_words.contains(*token))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }
}
