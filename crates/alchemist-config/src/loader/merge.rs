//! Configuration merging logic
//!
//! Merges configurations from multiple sources with proper precedence.

use crate::{types::*, Config};

/// Merge two configurations, with `overlay` taking precedence
///
/// This performs a field-wise merge where non-default values from `overlay`
/// override values in `base`. A layer cannot reset a field back to its
/// default once an earlier layer changed it.
pub fn merge(mut base: Config, overlay: Config) -> Config {
    base.chunking = merge_chunking(base.chunking, overlay.chunking);
    base.embedding = merge_embedding(base.embedding, overlay.embedding);
    base.index = merge_index(base.index, overlay.index);
    base.retrieval = merge_retrieval(base.retrieval, overlay.retrieval);
    base.llm = merge_llm(base.llm, overlay.llm);
    base.retry = merge_retry(base.retry, overlay.retry);

    base
}

/// Overlay wins only when it differs from the default
fn pick<T: PartialEq>(base: T, overlay: T, default: &T) -> T {
    if overlay != *default {
        overlay
    } else {
        base
    }
}

fn merge_chunking(base: ChunkingConfig, overlay: ChunkingConfig) -> ChunkingConfig {
    let default = ChunkingConfig::default();
    ChunkingConfig {
        min_tokens: pick(base.min_tokens, overlay.min_tokens, &default.min_tokens),
        max_tokens: pick(base.max_tokens, overlay.max_tokens, &default.max_tokens),
        min_overlap: pick(base.min_overlap, overlay.min_overlap, &default.min_overlap),
        max_overlap: pick(base.max_overlap, overlay.max_overlap, &default.max_overlap),
        tokenizer: pick(base.tokenizer, overlay.tokenizer, &default.tokenizer),
    }
}

fn merge_embedding(base: EmbeddingConfig, overlay: EmbeddingConfig) -> EmbeddingConfig {
    let default = EmbeddingConfig::default();
    EmbeddingConfig {
        model: pick(base.model, overlay.model, &default.model),
        dimensions: pick(base.dimensions, overlay.dimensions, &default.dimensions),
        batch_size: pick(base.batch_size, overlay.batch_size, &default.batch_size),
        concurrency: pick(base.concurrency, overlay.concurrency, &default.concurrency),
        api_base: overlay.api_base.or(base.api_base),
        timeout_secs: pick(base.timeout_secs, overlay.timeout_secs, &default.timeout_secs),
    }
}

fn merge_index(base: IndexConfig, overlay: IndexConfig) -> IndexConfig {
    let default = IndexConfig::default();
    IndexConfig {
        name: pick(base.name, overlay.name, &default.name),
        cloud: pick(base.cloud, overlay.cloud, &default.cloud),
        region: pick(base.region, overlay.region, &default.region),
        upsert_batch_size: pick(
            base.upsert_batch_size,
            overlay.upsert_batch_size,
            &default.upsert_batch_size,
        ),
        control_plane: pick(base.control_plane, overlay.control_plane, &default.control_plane),
        timeout_secs: pick(base.timeout_secs, overlay.timeout_secs, &default.timeout_secs),
    }
}

fn merge_retrieval(base: RetrievalConfig, overlay: RetrievalConfig) -> RetrievalConfig {
    let default = RetrievalConfig::default();
    RetrievalConfig {
        top_k: pick(base.top_k, overlay.top_k, &default.top_k),
        min_score: pick(base.min_score, overlay.min_score, &default.min_score),
    }
}

fn merge_llm(base: LlmConfig, overlay: LlmConfig) -> LlmConfig {
    let default = LlmConfig::default();
    LlmConfig {
        model: pick(base.model, overlay.model, &default.model),
        temperature: pick(base.temperature, overlay.temperature, &default.temperature),
        max_tokens: overlay.max_tokens.or(base.max_tokens),
        api_base: overlay.api_base.or(base.api_base),
        timeout_secs: pick(base.timeout_secs, overlay.timeout_secs, &default.timeout_secs),
    }
}

fn merge_retry(base: RetryConfig, overlay: RetryConfig) -> RetryConfig {
    let default = RetryConfig::default();
    RetryConfig {
        max_attempts: pick(base.max_attempts, overlay.max_attempts, &default.max_attempts),
        base_delay_ms: pick(base.base_delay_ms, overlay.base_delay_ms, &default.base_delay_ms),
        max_delay_ms: pick(base.max_delay_ms, overlay.max_delay_ms, &default.max_delay_ms),
        jitter_ms: pick(base.jitter_ms, overlay.jitter_ms, &default.jitter_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_retrieval_overlay_wins() {
        let base = RetrievalConfig {
            top_k: 10,
            min_score: 0.7,
        };
        let overlay = RetrievalConfig {
            top_k: 20,
            min_score: 0.5,
        };
        let merged = merge_retrieval(base, overlay);
        assert_eq!(merged.top_k, 20);
        assert_eq!(merged.min_score, 0.5);
    }

    #[test]
    fn test_merge_chunking_default_overlay_ignored() {
        let base = ChunkingConfig {
            min_tokens: 300,
            tokenizer: TokenizerKind::Words,
            ..Default::default()
        };
        let merged = merge_chunking(base, ChunkingConfig::default());
        assert_eq!(merged.min_tokens, 300);
        assert_eq!(merged.tokenizer, TokenizerKind::Words);
    }

    #[test]
    fn test_merge_optional_fields() {
        let base = LlmConfig {
            max_tokens: Some(256),
            api_base: Some("http://localhost:8080/v1".to_string()),
            ..Default::default()
        };
        let overlay = LlmConfig {
            max_tokens: Some(1024),
            ..Default::default()
        };
        let merged = merge_llm(base, overlay);
        assert_eq!(merged.max_tokens, Some(1024));
        assert_eq!(merged.api_base.as_deref(), Some("http://localhost:8080/v1"));
    }
}
