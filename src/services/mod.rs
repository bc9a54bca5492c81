pub mod features;
pub mod loader;
pub mod ranker;
pub mod recommendations;
pub mod tfidf;

pub use features::{FeatureCache, FeatureMatrix};
pub use loader::load_recommender;
pub use recommendations::{Recommendations, Recommender};
pub use tfidf::{TermVector, TfidfModel};
