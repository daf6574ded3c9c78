//! EcoScan Common Library
//!
//! CLIと中継サーバで共有される型とユーティリティ

pub mod types;
pub mod error;
pub mod parser;
pub mod prompts;
pub mod stats;
pub mod centers;
pub mod tips;

pub use types::{
    AnalysisResult, ClassifyRequest, Coordinates, ErrorBody, HistoryItem, ImageInput,
    RankedCenter, Recyclable, RecyclingCenter, WasteCategory,
};
pub use error::{Error, Result};
pub use parser::{parse_analysis_response, validate_analysis};
pub use prompts::{build_response_schema, ANALYSIS_PROMPT};
pub use stats::{Achievement, ProfileStats};
pub use centers::{haversine_km, rank_centers, RECYCLING_CENTERS};
pub use tips::{TipCursor, ECO_TIPS};
