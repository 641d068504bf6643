pub mod encoder;
pub mod enrichment;
pub mod filter;
pub mod recommendations;
pub mod scorer;
pub mod selector;

pub use encoder::CategoryEncoder;
pub use filter::filter_candidates;
pub use recommendations::{recommend_activities, recommend_webinars};
pub use scorer::score_candidates;
