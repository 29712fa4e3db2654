use crate::chunk::{build_chunks, ChunkerConfig};
use crate::config::AgentConfig;
use crate::embed::Embedder;
use crate::error::IngestError;
use crate::extractor::extract_page_texts;
use crate::models::DocumentChunk;
use crate::normalize::TextNormalizer;
use crate::store::KnowledgeBase;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

pub fn discover_pdf_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let is_pdf = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

pub struct SkippedPdf {
    pub path: PathBuf,
    pub reason: String,
}

pub struct IngestionReport {
    pub chunks: Vec<DocumentChunk>,
    pub skipped: Vec<SkippedPdf>,
}

/// Extracts, normalizes and chunks every PDF under `folder`.
///
/// A file that cannot be read or parsed is recorded in the report and
/// ingestion continues; an absent directory, an empty one, or a run that
/// yields zero chunks overall are fatal.
pub fn ingest_documents(
    folder: &Path,
    normalizer: &TextNormalizer,
    config: ChunkerConfig,
) -> Result<IngestionReport, IngestError> {
    if !folder.is_dir() {
        return Err(IngestError::MissingDocumentsDir(
            folder.display().to_string(),
        ));
    }

    let files = discover_pdf_files(folder);
    if files.is_empty() {
        return Err(IngestError::NoPdfsFound(folder.display().to_string()));
    }

    let mut chunks = Vec::new();
    let mut skipped = Vec::new();

    for path in files {
        let ingest_one = (|| {
            let source = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| {
                    IngestError::MissingFileName(path.display().to_string())
                })?;

            let mut file_chunks = Vec::new();
            let mut cursor = 0u64;

            for page in extract_page_texts(&path)? {
                let cleaned = normalizer.normalize(&page.text);
                let (page_chunks, next_cursor) =
                    build_chunks(source, page.number, &cleaned, config, cursor);
                cursor = next_cursor;
                file_chunks.extend(page_chunks);
            }

            Ok::<_, IngestError>(file_chunks)
        })();

        match ingest_one {
            Ok(file_chunks) => {
                info!(
                    file = %path.display(),
                    chunks = file_chunks.len(),
                    "pdf ingested"
                );
                chunks.extend(file_chunks);
            }
            Err(error) => {
                warn!(file = %path.display(), reason = %error, "skipping pdf");
                skipped.push(SkippedPdf {
                    path,
                    reason: error.to_string(),
                });
            }
        }
    }

    if chunks.is_empty() {
        return Err(IngestError::NoChunks(folder.display().to_string()));
    }

    Ok(IngestionReport { chunks, skipped })
}

/// Returns the cached knowledge base when a valid artifact pair exists,
/// otherwise rebuilds from the source documents and persists the result.
///
/// Any cache failure is logged and treated as "no cache": a corrupt pair is
/// never partially trusted.
pub fn load_or_build<E: Embedder>(
    config: &AgentConfig,
    embedder: &mut E,
) -> Result<KnowledgeBase, IngestError> {
    match KnowledgeBase::load(
        &config.index_cache_path,
        &config.store_cache_path,
        embedder.model_name(),
    ) {
        Ok(Some(base)) => {
            info!(chunks = base.store.len(), "cached index loaded");
            return Ok(base);
        }
        Ok(None) => {}
        Err(error) => {
            warn!(reason = %error, "cache invalid, rebuilding");
        }
    }

    let normalizer = TextNormalizer::new()?;
    let report = ingest_documents(&config.docs_dir, &normalizer, config.chunker)?;
    if !report.skipped.is_empty() {
        warn!(skipped = report.skipped.len(), "some pdfs were not ingested");
    }

    info!(chunks = report.chunks.len(), "computing embeddings");
    let texts: Vec<String> = report.chunks.iter().map(|chunk| chunk.text.clone()).collect();
    let vectors = embedder.embed_batch(&texts)?;

    let base = KnowledgeBase::build(
        embedder.model_name(),
        embedder.dimensions(),
        report.chunks,
        vectors,
    );
    base.save(&config.index_cache_path, &config.store_cache_path)?;
    info!(chunks = base.store.len(), "index built and cached");

    Ok(base)
}
