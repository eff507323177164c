//! Boundary-aware splitting of long documents into size-bounded chunks.
//!
//! Text is packed paragraph by paragraph. A paragraph that cannot fit in an
//! empty chunk is re-packed sentence by sentence, and a sentence that cannot
//! fit is re-packed word by word. Sizes are measured in characters.

use std::sync::LazyLock;

use regex::Regex;

/// Chunk size used when the caller has no backend-specific limit.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 2000;

/// Split `text` into chunks of at most `max_chunk_size` characters.
///
/// Chunks keep document order. The only chunk that may exceed the limit is
/// a single word longer than the limit, which is returned on its own.
/// A limit of 0 is treated as 1.
pub fn chunk_text(text: &str, max_chunk_size: usize) -> Vec<String> {
    let limit = max_chunk_size.max(1);
    let level = Granularity::Paragraph;
    let (mut chunks, tail) = pack(level.split(text), level, limit);
    flush(&mut chunks, tail);
    chunks
}

// ---------------------------------------------------------------------------
// Packing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Granularity {
    Paragraph,
    Sentence,
    Word,
}

impl Granularity {
    fn separator(self) -> &'static str {
        match self {
            Self::Paragraph => "\n\n",
            Self::Sentence | Self::Word => " ",
        }
    }

    fn finer(self) -> Option<Self> {
        match self {
            Self::Paragraph => Some(Self::Sentence),
            Self::Sentence => Some(Self::Word),
            Self::Word => None,
        }
    }

    fn split(self, text: &str) -> Vec<&str> {
        match self {
            Self::Paragraph => split_paragraphs(text),
            Self::Sentence => split_sentences(text),
            Self::Word => text.split_whitespace().collect(),
        }
    }
}

/// Greedily pack `units` into chunks of at most `limit` characters.
///
/// Returns the completed chunks plus the still-open tail, so a caller one
/// level up can keep appending to it.
fn pack(units: Vec<&str>, level: Granularity, limit: usize) -> (Vec<String>, String) {
    let separator = level.separator();

    units
        .into_iter()
        .fold((Vec::new(), String::new()), |(mut chunks, mut current), unit| {
            if !current.is_empty() {
                if char_len(&current) + char_len(separator) + char_len(unit) <= limit {
                    current.push_str(separator);
                    current.push_str(unit);
                    return (chunks, current);
                }
                flush(&mut chunks, std::mem::take(&mut current));
            }

            if char_len(unit) <= limit {
                return (chunks, unit.to_owned());
            }

            match level.finer() {
                Some(finer) => {
                    let (inner, tail) = pack(finer.split(unit), finer, limit);
                    chunks.extend(inner);
                    (chunks, tail)
                }
                // Irreducible: a single word over the limit.
                None => {
                    chunks.push(unit.to_owned());
                    (chunks, String::new())
                }
            }
        })
}

fn flush(chunks: &mut Vec<String>, chunk: String) {
    let trimmed = chunk.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_owned());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

// ---------------------------------------------------------------------------
// Splitting
// ---------------------------------------------------------------------------

/// Split on blank lines; paragraphs are trimmed and empties dropped.
fn split_paragraphs(text: &str) -> Vec<&str> {
    static BLANK_LINE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

    BLANK_LINE_RE
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Split after `.`, `!` or `?` when followed by whitespace.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        let ends_sentence = matches!(ch, '.' | '!' | '?')
            && chars.peek().is_some_and(|(_, next)| next.is_whitespace());
        if ends_sentence {
            let end = idx + ch.len_utf8();
            sentences.push(&text[start..end]);
            start = end;
        }
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<&str> {
        s.split_whitespace().collect()
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk_text("", 100).is_empty());
        assert!(chunk_text("  \n\n \n", 100).is_empty());
    }

    #[test]
    fn short_text_is_single_chunk() {
        assert_eq!(chunk_text("Just one line.", 100), vec!["Just one line."]);
    }

    #[test]
    fn paragraphs_merge_under_limit() {
        let chunks = chunk_text("aaa\n\nbbb\n\n\nccc", 100);
        assert_eq!(chunks, vec!["aaa\n\nbbb\n\nccc"]);
    }

    #[test]
    fn paragraphs_flush_on_overflow() {
        // 3 + 2 (separator) + 3 exceeds 5.
        let chunks = chunk_text("aaa\n\nbbb", 5);
        assert_eq!(chunks, vec!["aaa", "bbb"]);
    }

    #[test]
    fn long_paragraph_splits_on_sentences() {
        let chunks = chunk_text("One two. Three four! Five six?", 20);
        assert_eq!(chunks, vec!["One two. Three four!", "Five six?"]);
    }

    #[test]
    fn sentence_split_requires_following_whitespace() {
        assert_eq!(
            split_sentences("Version 2.5 ships today. Really?Yes"),
            vec!["Version 2.5 ships today.", "Really?Yes"]
        );
    }

    #[test]
    fn long_sentence_splits_on_words() {
        let chunks = chunk_text("alpha beta gamma delta", 11);
        assert_eq!(chunks, vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn oversized_word_is_kept_whole() {
        let chunks = chunk_text("tiny supercalifragilistic", 5);
        assert_eq!(chunks, vec!["tiny", "supercalifragilistic"]);
    }

    #[test]
    fn sizes_are_measured_in_characters() {
        let chunks = chunk_text("héllo wörld", 5);
        assert_eq!(chunks, vec!["héllo", "wörld"]);
    }

    #[test]
    fn zero_limit_is_treated_as_one() {
        let chunks = chunk_text("a b", 0);
        assert_eq!(chunks, vec!["a", "b"]);
    }

    #[test]
    fn chunks_respect_bound_and_preserve_order() {
        let mut text = String::new();
        for p in 0..40 {
            for s in 0..(p % 7 + 1) {
                text.push_str(&format!("Paragraph {p} sentence {s} mentions lift rental terms. "));
            }
            if p % 9 == 0 {
                text.push_str("Pneumonoultramicroscopicsilicovolcanoconiosis ");
            }
            text.push_str("\n\n");
        }

        for limit in [20, 64, 150, 500, DEFAULT_MAX_CHUNK_SIZE] {
            let chunks = chunk_text(&text, limit);
            for chunk in &chunks {
                let single_word = chunk.split_whitespace().count() == 1;
                assert!(
                    char_len(chunk) <= limit || single_word,
                    "chunk of {} chars exceeds {limit}: {chunk:?}",
                    char_len(chunk)
                );
            }

            let rejoined = chunks.join(" ");
            assert_eq!(words(&rejoined), words(&text), "content lost at limit {limit}");
        }
    }

    #[test]
    fn fixture_document_chunks_cover_all_words() {
        let text = std::fs::read_to_string("../../../fixtures/rfp/holiday-lighting-rfp.txt")
            .expect("read rfp fixture");
        let chunks = chunk_text(&text, 300);
        assert!(chunks.len() > 1);
        assert!(chunks[0].starts_with("CITY OF MAPLE GROVE"));
        assert_eq!(words(&chunks.join("\n\n")), words(&text));
    }
}
