//! Memory service: embed-on-write, cosine + rerank on read.
//!
//! Retrieval is a two-stage pipeline. The owner's most recent records are
//! scored by cosine similarity against the query embedding, the top
//! `2 * limit` survive, and the memory backend's reranker picks the final
//! `limit` from those. Backends that cannot rerank return the cosine top
//! `limit` instead.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use attune_types::config::{MemoryConfig, ModelConfig};
use attune_types::llm::{EmbedRequest, LlmError, RerankRequest};
use attune_types::memory::{MemoryRecord, SourceType};
use chrono::Utc;
use uuid::Uuid;

use super::MemoryError;
use super::similarity::cosine_similarity;
use super::store::MemoryRepository;
use crate::llm::box_provider::BoxModelProvider;

/// Stores and retrieves owner-scoped memories.
///
/// Generic over `MemoryRepository` so attune-core never depends on
/// attune-infra.
pub struct MemoryService<M: MemoryRepository> {
    repo: M,
    provider: Arc<BoxModelProvider>,
    embedding_model: String,
    rerank_model: String,
    candidate_window: u32,
}

impl<M: MemoryRepository> MemoryService<M> {
    pub fn new(
        repo: M,
        provider: Arc<BoxModelProvider>,
        models: &ModelConfig,
        memory: &MemoryConfig,
    ) -> Self {
        Self {
            repo,
            provider,
            embedding_model: models.embedding.clone(),
            rerank_model: models.rerank.clone(),
            candidate_window: memory.candidate_window,
        }
    }

    /// Access the memory repository.
    pub fn repo(&self) -> &M {
        &self.repo
    }

    /// Embed `text` and append it as a new record for `owner_id`.
    #[tracing::instrument(name = "memory_store", skip(self, text))]
    pub async fn store(
        &self,
        owner_id: &str,
        text: &str,
        source_type: SourceType,
        source_id: &str,
    ) -> Result<MemoryRecord, MemoryError> {
        let embedding = self.embed_one(text).await?;

        let record = MemoryRecord {
            id: Uuid::now_v7(),
            owner_id: owner_id.to_string(),
            text: text.to_string(),
            source_type,
            source_id: source_id.to_string(),
            embedding: Some(embedding),
            created_at: Utc::now(),
        };
        self.repo.insert(&record).await?;

        tracing::debug!(memory_id = %record.id, "stored memory");
        Ok(record)
    }

    /// Return up to `limit` of the owner's memories most relevant to `query`.
    #[tracing::instrument(name = "memory_retrieve", skip(self, query))]
    pub async fn retrieve(
        &self,
        owner_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, MemoryError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embed_one(query).await?;

        let candidates = self
            .repo
            .recent_for_owner(owner_id, self.candidate_window)
            .await?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let widened = shortlist(
            candidates,
            owner_id,
            &query_embedding,
            limit.saturating_mul(2),
        );
        if widened.is_empty() {
            return Ok(Vec::new());
        }

        if !self.provider.capabilities().rerank {
            tracing::debug!(
                provider = self.provider.name(),
                "memory backend cannot rerank; keeping cosine order"
            );
            return Ok(widened.into_iter().take(limit).collect());
        }

        let request = RerankRequest {
            model: self.rerank_model.clone(),
            query: query.to_string(),
            passages: widened.iter().map(|r| r.text.clone()).collect(),
        };
        let order = self.provider.rerank(&request).await?;

        let shortlisted = widened.len();
        let selected = apply_rerank(widened, &order, limit);
        tracing::debug!(shortlisted, returned = selected.len(), "retrieved memories");
        Ok(selected)
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let request = EmbedRequest {
            model: self.embedding_model.clone(),
            inputs: vec![text.to_string()],
        };
        self.provider
            .embed(&request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Deserialization("embedding response was empty".to_string()))
    }
}

/// Score embedded candidates and keep the best `keep`, best first.
///
/// Equal scores order newer records first, then higher ids.
fn shortlist(
    candidates: Vec<MemoryRecord>,
    owner_id: &str,
    query: &[f32],
    keep: usize,
) -> Vec<MemoryRecord> {
    let mut scored: Vec<(f32, MemoryRecord)> = candidates
        .into_iter()
        .filter(|r| r.owner_id == owner_id)
        .filter_map(|r| {
            let score = cosine_similarity(query, r.embedding.as_deref()?);
            Some((score, r))
        })
        .collect();

    scored.sort_by(|(sa, a), (sb, b)| {
        sb.partial_cmp(sa)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| b.id.cmp(&a.id))
    });
    scored.truncate(keep);
    scored.into_iter().map(|(_, r)| r).collect()
}

/// Reorder `records` by the reranker's index list and keep `limit`.
///
/// Out-of-range and repeated indices are skipped. If the reranker returns
/// nothing usable, cosine order is kept.
fn apply_rerank(records: Vec<MemoryRecord>, order: &[usize], limit: usize) -> Vec<MemoryRecord> {
    let mut slots: Vec<Option<MemoryRecord>> = records.into_iter().map(Some).collect();
    let mut seen = HashSet::new();

    let reranked: Vec<MemoryRecord> = order
        .iter()
        .filter(|&&idx| seen.insert(idx))
        .filter_map(|&idx| slots.get_mut(idx).and_then(Option::take))
        .take(limit)
        .collect();

    if reranked.is_empty() {
        tracing::warn!("reranker returned no usable indices; keeping cosine order");
        return slots.into_iter().flatten().take(limit).collect();
    }
    reranked
}
