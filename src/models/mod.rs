pub mod catalog;
pub mod model_info;
pub mod recommendation;

pub use catalog::{Catalog, CatalogItem};
pub use model_info::ModelInfo;
pub use recommendation::{
    Recommendation, RecommendationRequest, RecommendationResponse, DEFAULT_TOP_N,
};
