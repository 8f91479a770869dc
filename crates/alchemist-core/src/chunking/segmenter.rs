//! Sentence segmentation
//!
//! Candidate boundaries come from Unicode sentence boundaries (UAX #29).
//! UAX #29 also breaks after bare line breaks, which would turn headings,
//! list items and hard-wrapped prose into separate "sentences"; a candidate
//! is therefore only accepted as a sentence when it ends in terminal
//! punctuation, and is otherwise merged forward into the next one.
//!
//! Segments are contiguous byte ranges of the input, so concatenating them
//! reproduces the document exactly. Whitespace between sentences stays
//! attached to the sentence before it.

use std::iter::Peekable;
use unicode_segmentation::{UnicodeSegmentation, USentenceBoundIndices};

/// A sentence span borrowed from the source document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentence<'a> {
    /// Byte offset of the first character in the source
    pub start: usize,
    pub text: &'a str,
}

impl<'a> Sentence<'a> {
    /// Byte offset one past the last character
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

/// Splits a document into [`Sentence`] spans
///
/// Cheap to copy; each call to [`SentenceSegmenter::sentences`] starts a
/// fresh pass over the text.
#[derive(Debug, Clone, Copy)]
pub struct SentenceSegmenter<'a> {
    text: &'a str,
}

impl<'a> SentenceSegmenter<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    pub fn sentences(&self) -> Sentences<'a> {
        Sentences {
            text: self.text,
            bounds: self.text.split_sentence_bound_indices().peekable(),
        }
    }
}

impl<'a> IntoIterator for &SentenceSegmenter<'a> {
    type Item = Sentence<'a>;
    type IntoIter = Sentences<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.sentences()
    }
}

/// Lazy iterator over the sentences of one document
pub struct Sentences<'a> {
    text: &'a str,
    bounds: Peekable<USentenceBoundIndices<'a>>,
}

impl<'a> Iterator for Sentences<'a> {
    type Item = Sentence<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (start, first) = self.bounds.next()?;
        let mut end = start + first.len();

        while !ends_sentence(&self.text[start..end]) {
            match self.bounds.next() {
                Some((offset, segment)) => end = offset + segment.len(),
                None => break,
            }
        }

        Some(Sentence {
            start,
            text: &self.text[start..end],
        })
    }
}

/// Whether a candidate segment closes a sentence
///
/// Trailing whitespace and closing quotes or brackets are skipped before
/// looking for the terminal mark.
fn ends_sentence(segment: &str) -> bool {
    segment
        .trim_end()
        .chars()
        .rev()
        .find(|c| !is_closing(*c))
        .map(is_terminal)
        .unwrap_or(false)
}

fn is_terminal(c: char) -> bool {
    matches!(
        c,
        '.' | '!' | '?' | '…' | '‽' | '。' | '！' | '？' | '｡' | '؟' | '।'
    )
}

fn is_closing(c: char) -> bool {
    matches!(
        c,
        '"' | '\'' | ')' | ']' | '}' | '”' | '’' | '»' | '›' | '」' | '』' | '）'
    )
}
