pub mod error;
pub mod gate;
pub mod intent;
pub mod models;
pub mod prompt;
pub mod redirect;

pub use error::{validate_message, CoreError};
pub use gate::is_travel_query;
pub use intent::{analyze_message, classify_query_type, extract_duration, score_query, ClassificationScore};
pub use models::*;
pub use prompt::build_system_prompt;
pub use redirect::redirect_message;
