//! LanceDB-backed store for journal excerpts.
//!
//! Implements `JournalVectorStore` from `ironlog-core`. All campaigns share
//! the `journal_memory` table; every read and delete is filtered by
//! `campaign_id`. Similarity is `1 - cosine_distance`.

use std::sync::Arc;

use arrow_array::{
    Array, FixedSizeListArray, Float32Array, Int32Array, RecordBatch, RecordBatchIterator,
    StringArray,
};
use arrow_schema::{DataType, Field};
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};

use ironlog_core::memory::vector::JournalVectorStore;
use ironlog_types::error::RepositoryError;
use ironlog_types::memory::{JournalMemoryEntry, RankedExcerpt};

use super::lance::LanceVectorStore;
use super::schema::{JOURNAL_MEMORY_TABLE, journal_memory_schema};

/// Quote a value for a LanceDB SQL filter.
fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn campaign_filter(campaign_id: &str) -> String {
    format!("campaign_id = {}", sql_literal(campaign_id))
}

fn query_error(context: &str, err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Query(format!("{context}: {err}"))
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, RepositoryError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| RepositoryError::Query(format!("missing or mistyped column '{name}'")))
}

/// LanceDB-backed implementation of `JournalVectorStore`.
pub struct LanceJournalStore {
    store: LanceVectorStore,
    dimension: i32,
}

impl LanceJournalStore {
    /// `dimension` must match the embedder's output.
    pub fn new(store: LanceVectorStore, dimension: usize) -> Self {
        Self {
            store,
            dimension: dimension as i32,
        }
    }

    async fn table(&self) -> Result<lancedb::Table, RepositoryError> {
        let schema = Arc::new(journal_memory_schema(self.dimension));
        self.store
            .ensure_table(JOURNAL_MEMORY_TABLE, schema)
            .await
            .map_err(|e| query_error("Failed to open journal memory table", e))
    }

    fn build_record_batch(
        &self,
        entries: &[JournalMemoryEntry],
        embeddings: &[Vec<f32>],
    ) -> Result<RecordBatch, RepositoryError> {
        let schema = Arc::new(journal_memory_schema(self.dimension));

        let mut flat: Vec<f32> = Vec::with_capacity(entries.len() * self.dimension as usize);
        for (entry, embedding) in entries.iter().zip(embeddings) {
            if embedding.len() != self.dimension as usize {
                return Err(RepositoryError::Query(format!(
                    "embedding for {} has {} dimensions, expected {}",
                    entry.id,
                    embedding.len(),
                    self.dimension
                )));
            }
            flat.extend_from_slice(embedding);
        }

        let ids = StringArray::from_iter_values(entries.iter().map(|e| e.id.as_str()));
        let campaigns = StringArray::from_iter_values(entries.iter().map(|e| e.campaign_id.as_str()));
        let indices = Int32Array::from_iter_values(entries.iter().map(|e| e.exchange_index as i32));
        let texts = StringArray::from_iter_values(entries.iter().map(|e| e.text.as_str()));
        let models =
            StringArray::from_iter_values(entries.iter().map(|e| e.embedding_model.as_str()));
        let indexed_at =
            StringArray::from_iter_values(entries.iter().map(|e| e.indexed_at.to_rfc3339()));

        let field = Arc::new(Field::new("item", DataType::Float32, true));
        let vectors = FixedSizeListArray::try_new(
            field,
            self.dimension,
            Arc::new(Float32Array::from(flat)),
            None,
        )
        .map_err(|e| query_error("Failed to build vector column", e))?;

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(ids),
                Arc::new(campaigns),
                Arc::new(indices),
                Arc::new(texts),
                Arc::new(models),
                Arc::new(indexed_at),
                Arc::new(vectors),
            ],
        )
        .map_err(|e| query_error("Failed to build record batch", e))
    }

    /// Parse result rows back into entries paired with their cosine distance.
    fn batch_to_hits(batch: &RecordBatch) -> Result<Vec<(JournalMemoryEntry, f32)>, RepositoryError> {
        let ids = string_column(batch, "id")?;
        let campaigns = string_column(batch, "campaign_id")?;
        let texts = string_column(batch, "text")?;
        let models = string_column(batch, "embedding_model")?;
        let indexed_at = string_column(batch, "indexed_at")?;
        let indices = batch
            .column_by_name("exchange_index")
            .and_then(|c| c.as_any().downcast_ref::<Int32Array>())
            .ok_or_else(|| RepositoryError::Query("missing column 'exchange_index'".into()))?;
        let distances = batch
            .column_by_name("_distance")
            .and_then(|c| c.as_any().downcast_ref::<Float32Array>());

        let mut hits = Vec::with_capacity(batch.num_rows());
        for i in 0..batch.num_rows() {
            let indexed_at = DateTime::parse_from_rfc3339(indexed_at.value(i))
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now());
            let entry = JournalMemoryEntry {
                id: ids.value(i).to_string(),
                campaign_id: campaigns.value(i).to_string(),
                exchange_index: indices.value(i).max(0) as usize,
                text: texts.value(i).to_string(),
                embedding_model: models.value(i).to_string(),
                indexed_at,
            };
            let distance = distances.map_or(0.0, |d| d.value(i));
            hits.push((entry, distance));
        }
        Ok(hits)
    }
}

impl JournalVectorStore for LanceJournalStore {
    async fn upsert(
        &self,
        entries: &[JournalMemoryEntry],
        embeddings: &[Vec<f32>],
    ) -> Result<(), RepositoryError> {
        if entries.is_empty() {
            return Ok(());
        }
        // Validate before deleting so a rejected batch leaves old rows intact.
        let batch = self.build_record_batch(entries, embeddings)?;
        let ids: Vec<String> = entries.iter().map(|e| e.id.clone()).collect();
        self.delete_ids(&ids).await?;

        let schema = batch.schema();
        let reader = RecordBatchIterator::new(vec![Ok(batch)], schema);

        self.table()
            .await?
            .add(reader)
            .execute()
            .await
            .map_err(|e| query_error("Failed to add journal memory", e))?;

        tracing::debug!(count = entries.len(), "upserted journal memory");
        Ok(())
    }

    async fn delete_ids(&self, ids: &[String]) -> Result<(), RepositoryError> {
        if ids.is_empty() {
            return Ok(());
        }
        let list = ids
            .iter()
            .map(|id| sql_literal(id))
            .collect::<Vec<_>>()
            .join(", ");
        self.table()
            .await?
            .delete(&format!("id IN ({list})"))
            .await
            .map_err(|e| query_error("Failed to delete journal memory", e))?;
        Ok(())
    }

    async fn delete_campaign(&self, campaign_id: &str) -> Result<u64, RepositoryError> {
        if !self.store.table_exists(JOURNAL_MEMORY_TABLE).await {
            return Ok(0);
        }
        let table = self.table().await?;
        let filter = campaign_filter(campaign_id);
        let count = table
            .count_rows(Some(filter.clone()))
            .await
            .map_err(|e| query_error("Failed to count rows before delete", e))?;
        table
            .delete(&filter)
            .await
            .map_err(|e| query_error("Failed to delete campaign memory", e))?;
        Ok(count as u64)
    }

    async fn search(
        &self,
        campaign_id: &str,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<RankedExcerpt>, RepositoryError> {
        let table = self.table().await?;

        let results = table
            .vector_search(query_embedding)
            .map_err(|e| query_error("Vector search setup failed", e))?
            .distance_type(lancedb::DistanceType::Cosine)
            .only_if(campaign_filter(campaign_id))
            .limit(limit)
            .execute()
            .await
            .map_err(|e| query_error("Vector search failed", e))?;

        let batches: Vec<RecordBatch> = results
            .try_collect()
            .await
            .map_err(|e| query_error("Failed to collect results", e))?;

        let mut ranked = Vec::new();
        for batch in &batches {
            for (entry, distance) in Self::batch_to_hits(batch)? {
                let score = 1.0 - distance;
                if score < min_score {
                    continue;
                }
                ranked.push(RankedExcerpt { entry, score });
            }
        }

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(limit);
        Ok(ranked)
    }

    async fn count(&self, campaign_id: &str) -> Result<u64, RepositoryError> {
        if !self.store.table_exists(JOURNAL_MEMORY_TABLE).await {
            return Ok(0);
        }
        let count = self
            .table()
            .await?
            .count_rows(Some(campaign_filter(campaign_id)))
            .await
            .map_err(|e| query_error("Failed to count rows", e))?;
        Ok(count as u64)
    }
}
