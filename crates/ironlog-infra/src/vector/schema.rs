//! Arrow schema for the LanceDB journal memory table.
//!
//! Arrow versions MUST match lancedb's transitive dependency (57.3 for lancedb 0.26).

use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema};

/// BGESmallENV15 embedding dimension.
pub const EMBEDDING_DIMENSION: i32 = 384;

/// Name of the single table holding every campaign's excerpts.
pub const JOURNAL_MEMORY_TABLE: &str = "journal_memory";

/// Schema for the `journal_memory` table.
///
/// One row per embedded exchange, keyed by `"{campaign_id}:{exchange_index}"`.
/// Queries always filter on `campaign_id`.
pub fn journal_memory_schema(dimension: i32) -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("campaign_id", DataType::Utf8, false),
        Field::new("exchange_index", DataType::Int32, false),
        Field::new("text", DataType::Utf8, false),
        Field::new("embedding_model", DataType::Utf8, false),
        Field::new("indexed_at", DataType::Utf8, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                dimension,
            ),
            false,
        ),
    ])
}
