use alchemist_config::TokenizerKind;
use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tiktoken_rs::{cl100k_base, CoreBPE};
use unicode_segmentation::UnicodeSegmentation;

/// Deterministic, offline token counting
///
/// One counter sizes both chunks and overlaps in a run; mixing schemes
/// breaks every bound the packer guarantees.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;

    fn name(&self) -> &'static str;
}

static CL100K: OnceCell<Arc<CoreBPE>> = OnceCell::new();

/// `cl100k_base` BPE, the encoding of OpenAI's embedding models
#[derive(Clone)]
pub struct Cl100kCounter {
    bpe: Arc<CoreBPE>,
}

impl Cl100kCounter {
    /// Load the encoder, building it once per process
    pub fn new() -> Result<Self> {
        let bpe = CL100K
            .get_or_try_init(|| {
                cl100k_base()
                    .map(Arc::new)
                    .map_err(|e| anyhow!("failed to load cl100k_base tokenizer: {e}"))
            })?
            .clone();
        Ok(Self { bpe })
    }
}

impl TokenCounter for Cl100kCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }

    fn name(&self) -> &'static str {
        "cl100k_base"
    }
}

/// Unicode word count (UAX #29 word boundaries)
#[derive(Debug, Clone, Copy, Default)]
pub struct WordCounter;

impl TokenCounter for WordCounter {
    fn count(&self, text: &str) -> usize {
        text.unicode_words().count()
    }

    fn name(&self) -> &'static str {
        "words"
    }
}

/// Build the counter selected in configuration
pub fn counter_for(kind: TokenizerKind) -> Result<Arc<dyn TokenCounter>> {
    Ok(match kind {
        TokenizerKind::Cl100k => Arc::new(Cl100kCounter::new()?),
        TokenizerKind::Words => Arc::new(WordCounter),
    })
}
