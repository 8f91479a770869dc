use super::segmenter::SentenceSegmenter;
use super::sink::{BoundaryEvent, BoundarySink, TracingSink};
use super::tokenizer::TokenCounter;
use super::{ChunkParams, Chunker, ChunkingError};
use crate::models::Chunk;
use std::ops::Range;
use std::sync::Arc;
use tracing::debug;

/// Greedy sentence packer with trailing overlap
///
/// Sentences are never split. Each chunk extends while the next sentence
/// still fits under `max_tokens`, then the following chunk starts with the
/// longest suffix of sentences from its predecessor that fits under
/// `max_overlap`. Token counts are always taken on the exact candidate text,
/// so `token_count` matches what the embedding model will see. Summed
/// per-sentence counts only steer where the exact counts are taken, keeping
/// the exact encodes per chunk logarithmic in its sentence count.
pub struct SentenceChunker {
    params: ChunkParams,
    counter: Arc<dyn TokenCounter>,
    sink: Arc<dyn BoundarySink>,
}

impl SentenceChunker {
    /// Validates `params` before any text is seen
    pub fn new(params: ChunkParams, counter: Arc<dyn TokenCounter>) -> Result<Self, ChunkingError> {
        params.validate()?;
        Ok(Self {
            params,
            counter,
            sink: Arc::new(TracingSink),
        })
    }

    pub fn with_sink(mut self, sink: Arc<dyn BoundarySink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn params(&self) -> ChunkParams {
        self.params
    }

    pub fn counter(&self) -> &dyn TokenCounter {
        self.counter.as_ref()
    }

    /// Segment and count every sentence, checking the spans tile the text
    fn measure(&self, text: &str) -> Result<Vec<Span>, ChunkingError> {
        let mut spans = Vec::new();
        let mut expected = 0;

        for (sentence_index, sentence) in SentenceSegmenter::new(text).sentences().enumerate() {
            if sentence.start != expected {
                return Err(ChunkingError::Coverage {
                    sentence_index,
                    sentence_len: sentence.text.len(),
                    expected_offset: expected,
                    actual_offset: sentence.start,
                });
            }
            expected = sentence.end();
            spans.push(Span {
                start: sentence.start,
                end: sentence.end(),
                tokens: self.counter.count(sentence.text),
            });
        }

        if expected != text.len() {
            return Err(ChunkingError::Coverage {
                sentence_index: spans.len(),
                sentence_len: 0,
                expected_offset: text.len(),
                actual_offset: expected,
            });
        }

        Ok(spans)
    }
}

impl Chunker for SentenceChunker {
    fn chunk(&self, text: &str, document_id: Option<&str>) -> Result<Vec<Chunk>, ChunkingError> {
        let sentences = self.measure(text)?;

        let chunks = Packer::new(
            text,
            &sentences,
            self.params,
            self.counter.as_ref(),
            self.sink.as_ref(),
            document_id,
        )
        .run();

        debug!(
            document_id = document_id.unwrap_or("-"),
            sentences = sentences.len(),
            chunks = chunks.len(),
            tokenizer = self.counter.name(),
            "chunked document"
        );

        Ok(chunks)
    }
}

/// Byte span and token count of one sentence
#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
    tokens: usize,
}

/// Packing state for a single document
struct Packer<'a> {
    text: &'a str,
    sentences: &'a [Span],
    /// `prefix[i]` is the summed sentence count of `sentences[..i]`
    prefix: Vec<usize>,
    params: ChunkParams,
    counter: &'a dyn TokenCounter,
    sink: &'a dyn BoundarySink,
    document_id: Option<&'a str>,
    chunks: Vec<Chunk>,
}

impl<'a> Packer<'a> {
    fn new(
        text: &'a str,
        sentences: &'a [Span],
        params: ChunkParams,
        counter: &'a dyn TokenCounter,
        sink: &'a dyn BoundarySink,
        document_id: Option<&'a str>,
    ) -> Self {
        let mut prefix = Vec::with_capacity(sentences.len() + 1);
        prefix.push(0);
        for span in sentences {
            prefix.push(prefix[prefix.len() - 1] + span.tokens);
        }
        Self {
            text,
            sentences,
            prefix,
            params,
            counter,
            sink,
            document_id,
            chunks: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Chunk> {
        let total = self.sentences.len();
        let mut next = 0;
        let mut previous: Option<Range<usize>> = None;

        while next < total {
            let chunk_index = self.chunks.len();
            let sentence = self.sentences[next];

            if sentence.tokens > self.params.max_tokens {
                let event = BoundaryEvent::OversizedSentence {
                    chunk_index,
                    sentence_index: next,
                    token_count: sentence.tokens,
                    max_tokens: self.params.max_tokens,
                };
                self.emit(next..next + 1, 0, sentence.tokens, vec![event]);
                previous = Some(next..next + 1);
                next += 1;
                continue;
            }

            let mut events = Vec::new();
            let first = match previous.take() {
                Some(prev) => self.overlap_start(prev, next, chunk_index, &mut events),
                None => next,
            };
            let overlap_tokens = self.count(first..next);

            let end = self.extend(first, next);
            let tokens = self.count(first..end);

            if tokens < self.params.min_tokens {
                events.push(if end == total {
                    BoundaryEvent::ShortTrailingChunk {
                        chunk_index,
                        token_count: tokens,
                        min_tokens: self.params.min_tokens,
                    }
                } else {
                    BoundaryEvent::UndersizedChunk {
                        chunk_index,
                        token_count: tokens,
                        min_tokens: self.params.min_tokens,
                        next_sentence_index: end,
                    }
                });
            }

            self.emit(first..end, overlap_tokens, tokens, events);
            previous = Some(first..end);
            next = end;
        }

        self.chunks
    }

    /// End of the chunk starting at `first` whose new content starts at `next`
    ///
    /// Sentence `next` is always taken. The exact count of the result is at
    /// most `max_tokens`, and so is every shorter extension tried.
    fn extend(&self, first: usize, next: usize) -> usize {
        let total = self.sentences.len();
        let max = self.params.max_tokens;

        // Summed sentence counts drift from the exact count where tokens merge
        // across sentence edges; rescale the budget once against an exact count.
        let mut guess = self.estimated_end(first, max);
        let sampled = self.count(first..guess);
        let estimated = self.estimate(first..guess);
        if sampled > 0 && sampled != estimated {
            let budget = max.saturating_mul(estimated) / sampled;
            guess = self.estimated_end(first, budget);
        }

        last_fitting(next + 1, total, guess, |end| self.count(first..end) <= max)
    }

    /// Largest end in `first + 1..=total` whose summed count fits `budget`
    fn estimated_end(&self, first: usize, budget: usize) -> usize {
        let limit = self.prefix[first].saturating_add(budget);
        let end = self.prefix.partition_point(|&p| p <= limit).saturating_sub(1);
        end.clamp(first + 1, self.sentences.len())
    }

    fn estimate(&self, range: Range<usize>) -> usize {
        self.prefix[range.end] - self.prefix[range.start]
    }

    /// First sentence of the overlap carried from `prev` into the chunk
    /// whose new content starts at sentence `next`
    fn overlap_start(
        &self,
        prev: Range<usize>,
        next: usize,
        chunk_index: usize,
        events: &mut Vec<BoundaryEvent>,
    ) -> usize {
        debug_assert_eq!(prev.end, next);

        let available = next - prev.start;
        let limit = self.prefix[next].saturating_sub(self.params.max_overlap);
        let guess = next - self.prefix.partition_point(|&p| p < limit).clamp(prev.start, next);
        let taken = last_fitting(0, available, guess, |n| {
            self.count(next - n..next) <= self.params.max_overlap
        });

        // Overlap shares the chunk budget; it may not crowd out the first new sentence.
        let kept = last_fitting(0, taken, taken, |n| {
            self.count(next - n..next + 1) <= self.params.max_tokens
        });
        let first = next - kept;
        let dropped = taken - kept;

        let overlap_tokens = self.count(first..next);
        if dropped > 0 {
            events.push(BoundaryEvent::OverlapTrimmed {
                chunk_index,
                dropped_sentences: dropped,
                overlap_tokens,
            });
        }
        if overlap_tokens < self.params.min_overlap {
            events.push(BoundaryEvent::InsufficientOverlap {
                chunk_index,
                overlap_tokens,
                min_overlap: self.params.min_overlap,
            });
        }

        first
    }

    /// Exact token count of the text covered by a range of sentences
    fn count(&self, range: Range<usize>) -> usize {
        match self.byte_range(range) {
            Some(bytes) => self.counter.count(&self.text[bytes]),
            None => 0,
        }
    }

    fn byte_range(&self, range: Range<usize>) -> Option<Range<usize>> {
        if range.is_empty() {
            return None;
        }
        Some(self.sentences[range.start].start..self.sentences[range.end - 1].end)
    }

    fn emit(
        &mut self,
        range: Range<usize>,
        overlap_tokens: usize,
        token_count: usize,
        events: Vec<BoundaryEvent>,
    ) {
        let Some(bytes) = self.byte_range(range) else {
            return;
        };

        let mut boundary = Vec::with_capacity(events.len());
        for event in &events {
            self.sink.record(event);
            let condition = event.condition();
            if !boundary.contains(&condition) {
                boundary.push(condition);
            }
        }

        self.chunks.push(Chunk {
            index: self.chunks.len(),
            document_id: self.document_id.map(str::to_string),
            text: self.text[bytes.clone()].to_string(),
            token_count,
            overlap_token_count: overlap_tokens,
            start_byte: bytes.start,
            end_byte: bytes.end,
            boundary,
        });
    }
}

/// Largest `n` in `lo..=hi` accepted by `fits`, where `fits(lo)` is taken
/// as given and `fits` accepts a prefix of the range
///
/// Checks `guess` first, then gallops upward or bisects, so the number of
/// calls grows with the log of the distance between `guess` and the answer.
fn last_fitting(lo: usize, hi: usize, guess: usize, mut fits: impl FnMut(usize) -> bool) -> usize {
    let mut good = lo;
    let mut bad = hi + 1;

    let guess = guess.clamp(lo, hi);
    if guess > good {
        if fits(guess) {
            good = guess;
        } else {
            bad = guess;
        }
    }

    let mut step = 1;
    while bad > hi && good < hi {
        let at = good.saturating_add(step).min(hi);
        if fits(at) {
            good = at;
            step = step.saturating_mul(2);
        } else {
            bad = at;
        }
    }

    while bad - good > 1 {
        let mid = good + (bad - good) / 2;
        if fits(mid) {
            good = mid;
        } else {
            bad = mid;
        }
    }
    good
}
