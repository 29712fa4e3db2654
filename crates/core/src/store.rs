use crate::error::IngestError;
use crate::models::DocumentChunk;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

/// Identity of one index build, written into both cache artifacts so a
/// stale index can never be paired with a newer document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildStamp {
    pub build_id: Uuid,
    pub model_name: String,
    pub dimensions: usize,
    pub built_at: DateTime<Utc>,
}

impl BuildStamp {
    fn new(model_name: &str, dimensions: usize) -> Self {
        Self {
            build_id: Uuid::new_v4(),
            model_name: model_name.to_string(),
            dimensions,
            built_at: Utc::now(),
        }
    }
}

/// Nearest-neighbor hit: position into the document store plus the
/// squared L2 distance to the query. Lower score means more similar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredHit {
    pub position: usize,
    pub score: f32,
}

/// Flat similarity index over chunk embeddings.
///
/// Brute-force scan; the corpus is a handful of regulation PDFs, far below
/// the point where an approximate index would pay for itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    stamp: BuildStamp,
    vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Top `k` nearest vectors by squared L2 distance, ascending.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<ScoredHit> {
        let mut hits: Vec<ScoredHit> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| ScoredHit {
                position,
                score: squared_l2(query, vector),
            })
            .collect();

        hits.sort_by(|left, right| left.score.total_cmp(&right.score));
        hits.truncate(k);
        hits
    }
}

fn squared_l2(left: &[f32], right: &[f32]) -> f32 {
    if left.len() != right.len() {
        return f32::INFINITY;
    }

    left.iter()
        .zip(right)
        .map(|(a, b)| (a - b) * (a - b))
        .sum()
}

/// Chunk storage parallel to the vector index: position `i` in the index
/// refers to chunk `i` here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStore {
    stamp: BuildStamp,
    chunks: Vec<DocumentChunk>,
}

impl DocumentStore {
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&DocumentChunk> {
        self.chunks.get(position)
    }
}

/// The similarity index and its paired document store.
pub struct KnowledgeBase {
    pub index: VectorIndex,
    pub store: DocumentStore,
}

impl KnowledgeBase {
    /// Builds a fresh knowledge base; both halves carry the same stamp.
    pub fn build(
        model_name: &str,
        dimensions: usize,
        chunks: Vec<DocumentChunk>,
        vectors: Vec<Vec<f32>>,
    ) -> Self {
        debug_assert_eq!(chunks.len(), vectors.len());
        let stamp = BuildStamp::new(model_name, dimensions);

        Self {
            index: VectorIndex {
                stamp: stamp.clone(),
                vectors,
            },
            store: DocumentStore { stamp, chunks },
        }
    }

    /// Nearest chunks for a query vector, ascending by distance score.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(&DocumentChunk, f32)> {
        self.index
            .search(query, k)
            .into_iter()
            .filter_map(|hit| self.store.get(hit.position).map(|chunk| (chunk, hit.score)))
            .collect()
    }

    /// Persists the two cache artifacts.
    pub fn save(&self, index_path: &Path, store_path: &Path) -> Result<(), IngestError> {
        fs::write(index_path, bincode::serialize(&self.index)?)?;
        fs::write(store_path, bincode::serialize(&self.store)?)?;
        debug!(
            index = %index_path.display(),
            store = %store_path.display(),
            chunks = self.store.len(),
            "cache artifacts written"
        );
        Ok(())
    }

    /// Loads a cached pair. `Ok(None)` when either artifact is absent;
    /// `Err` on any corruption or mismatch, in which case the caller must
    /// discard the cache wholesale and rebuild.
    pub fn load(
        index_path: &Path,
        store_path: &Path,
        expected_model: &str,
    ) -> Result<Option<Self>, IngestError> {
        if !index_path.is_file() || !store_path.is_file() {
            return Ok(None);
        }

        let index: VectorIndex = bincode::deserialize(&fs::read(index_path)?)?;
        let store: DocumentStore = bincode::deserialize(&fs::read(store_path)?)?;

        if index.stamp.build_id != store.stamp.build_id {
            return Err(IngestError::CacheMismatch(
                "index and document store come from different builds".to_string(),
            ));
        }
        if index.stamp.model_name != expected_model {
            return Err(IngestError::CacheMismatch(format!(
                "cache was built with model {}, expected {}",
                index.stamp.model_name, expected_model
            )));
        }
        if index.len() != store.len() {
            return Err(IngestError::CacheMismatch(format!(
                "index holds {} vectors but the store holds {} chunks",
                index.len(),
                store.len()
            )));
        }

        Ok(Some(Self { index, store }))
    }
}

#[cfg(test)]
mod tests {
    use super::KnowledgeBase;
    use crate::error::IngestError;
    use crate::models::DocumentChunk;
    use std::fs;
    use tempfile::tempdir;

    fn chunk(source: &str, index: u64, text: &str) -> DocumentChunk {
        DocumentChunk {
            source: source.to_string(),
            page: 1,
            chunk_index: index,
            text: text.to_string(),
        }
    }

    fn sample_base() -> KnowledgeBase {
        KnowledgeBase::build(
            "token-hash-test",
            3,
            vec![
                chunk("a.pdf", 0, "longe"),
                chunk("a.pdf", 1, "perto"),
                chunk("b.pdf", 2, "meio"),
            ],
            vec![
                vec![0.0, 1.0, 0.0],
                vec![1.0, 0.0, 0.0],
                vec![0.5, 0.5, 0.0],
            ],
        )
    }

    #[test]
    fn search_orders_ascending_by_distance() {
        let base = sample_base();
        let hits = base.search(&[1.0, 0.0, 0.0], 3);

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].0.text, "perto");
        assert_eq!(hits[1].0.text, "meio");
        assert_eq!(hits[2].0.text, "longe");
        assert!(hits[0].1 <= hits[1].1 && hits[1].1 <= hits[2].1);
    }

    #[test]
    fn search_caps_at_k() {
        let base = sample_base();
        assert_eq!(base.search(&[1.0, 0.0, 0.0], 2).len(), 2);
        assert_eq!(base.search(&[1.0, 0.0, 0.0], 10).len(), 3);
    }

    #[test]
    fn mismatched_dimensions_rank_last() {
        let base = sample_base();
        let hits = base.search(&[1.0, 0.0], 3);
        assert!(hits.iter().all(|(_, score)| score.is_infinite()));
    }

    #[test]
    fn cache_round_trip_preserves_search_results() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let index_path = dir.path().join("cache_index.bin");
        let store_path = dir.path().join("cache_store.bin");

        let base = sample_base();
        base.save(&index_path, &store_path)?;

        let reloaded = KnowledgeBase::load(&index_path, &store_path, "token-hash-test")?
            .expect("cache should load");

        let fresh: Vec<_> = base
            .search(&[1.0, 0.0, 0.0], 3)
            .into_iter()
            .map(|(chunk, score)| (chunk.clone(), score))
            .collect();
        let cached: Vec<_> = reloaded
            .search(&[1.0, 0.0, 0.0], 3)
            .into_iter()
            .map(|(chunk, score)| (chunk.clone(), score))
            .collect();

        assert_eq!(fresh, cached);
        Ok(())
    }

    #[test]
    fn missing_artifact_is_not_an_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let index_path = dir.path().join("cache_index.bin");
        let store_path = dir.path().join("cache_store.bin");

        assert!(KnowledgeBase::load(&index_path, &store_path, "m")?.is_none());

        sample_base().save(&index_path, &store_path)?;
        fs::remove_file(&store_path)?;
        assert!(KnowledgeBase::load(&index_path, &store_path, "m")?.is_none());
        Ok(())
    }

    #[test]
    fn corrupt_artifact_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let index_path = dir.path().join("cache_index.bin");
        let store_path = dir.path().join("cache_store.bin");

        sample_base().save(&index_path, &store_path)?;
        fs::write(&index_path, b"garbage")?;

        let result = KnowledgeBase::load(&index_path, &store_path, "token-hash-test");
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn artifacts_from_different_builds_are_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let index_path = dir.path().join("cache_index.bin");
        let store_path = dir.path().join("cache_store.bin");
        let other_store = dir.path().join("other_store.bin");

        sample_base().save(&index_path, &store_path)?;
        sample_base().save(&dir.path().join("other_index.bin"), &other_store)?;
        fs::copy(&other_store, &store_path)?;

        let result = KnowledgeBase::load(&index_path, &store_path, "token-hash-test");
        assert!(matches!(result, Err(IngestError::CacheMismatch(_))));
        Ok(())
    }

    #[test]
    fn model_change_invalidates_the_cache() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let index_path = dir.path().join("cache_index.bin");
        let store_path = dir.path().join("cache_store.bin");

        sample_base().save(&index_path, &store_path)?;
        let result = KnowledgeBase::load(&index_path, &store_path, "another-model");
        assert!(matches!(result, Err(IngestError::CacheMismatch(_))));
        Ok(())
    }
}
