pub mod analysis;
pub mod health;

pub use analysis::{
    classify_by_file, entities_by_file, entity_sentiment_by_file, sentiment_by_file,
    sentiment_by_file_v1, sentiment_by_text, sentiment_by_text_v1, syntax_by_file,
};
pub use health::{health_check, metrics_endpoint, readiness_check};
