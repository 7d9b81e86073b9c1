//! Segmenting input text into word segments.

use soundlaw_pattern::{Segment, Word};
use soundlaw_registry::Registry;

/// Split text into segments by greedy longest-match against the known
/// phoneme symbols. `#` becomes a boundary segment; anything else that
/// matches no symbol falls back to a single character.
pub fn split_word(registry: &Registry, text: &str) -> Word {
    let longest = registry
        .all_phonemes()
        .map(|spec| spec.name.len())
        .max()
        .unwrap_or(0);

    let mut word = Vec::new();
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        if c == '#' {
            word.push(Segment::Boundary);
            rest = &rest[c.len_utf8()..];
            continue;
        }
        let end = rest
            .char_indices()
            .map(|(i, ch)| i + ch.len_utf8())
            .take_while(|&end| end <= longest.max(c.len_utf8()))
            .filter(|&end| registry.phoneme(&rest[..end]).is_some())
            .max()
            .unwrap_or(c.len_utf8());
        word.push(Segment::Symbol(rest[..end].to_string()));
        rest = &rest[end..];
    }
    word
}
