use super::normalizer::NormalizedText;
use super::vocab::{SplitAlgorithm, Vocabulary};

/// Encoded text: the language control token followed by sub-word ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSequence {
    language: String,
    ids: Vec<i64>,
    unknown_units: usize,
}

impl TokenSequence {
    fn start(language: &str, control_token: i64, capacity: usize) -> Self {
        let mut ids = Vec::with_capacity(capacity + 1);
        ids.push(control_token);
        Self {
            language: language.to_string(),
            ids,
            unknown_units: 0,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// All ids, control token first.
    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    pub fn into_ids(self) -> Vec<i64> {
        self.ids
    }

    pub fn control_token(&self) -> i64 {
        self.ids[0]
    }

    /// Sub-word ids without the control token.
    pub fn body(&self) -> &[i64] {
        &self.ids[1..]
    }

    /// Units that were not in the vocabulary and became the unknown id.
    pub fn unknown_units(&self) -> usize {
        self.unknown_units
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when the sequence holds only the control token.
    pub fn is_empty(&self) -> bool {
        self.ids.len() == 1
    }

    /// Split into sequences of at most `max_len` ids, each starting with the
    /// control token.
    ///
    /// Splits land just after the last boundary id (punctuation) inside the
    /// window when there is one, otherwise at the window end. `max_len` below
    /// 2 is treated as 2.
    pub fn chunks(&self, max_len: usize, boundary_ids: &[i64]) -> Vec<TokenSequence> {
        let window = max_len.max(2) - 1;
        let body = self.body();
        if body.len() <= window {
            return vec![self.clone()];
        }

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < body.len() {
            let end = (start + window).min(body.len());
            let split = if end == body.len() {
                end
            } else {
                body[start..end]
                    .iter()
                    .rposition(|id| boundary_ids.contains(id))
                    .map(|i| start + i + 1)
                    .unwrap_or(end)
            };

            let mut chunk =
                TokenSequence::start(&self.language, self.control_token(), split - start);
            chunk.ids.extend_from_slice(&body[start..split]);
            chunks.push(chunk);
            start = split;
        }

        // Unknown counts are per call, so attribute them to the first chunk.
        if let Some(first) = chunks.first_mut() {
            first.unknown_units = self.unknown_units;
        }
        chunks
    }
}

/// Encode normalized text into a token sequence.
///
/// Whitespace characters become standalone units (the vocabulary's space unit
/// when it declares one); every other run of characters is split with the
/// vocabulary's algorithm. Units the vocabulary lacks map to its unknown id.
/// The result depends only on the arguments.
pub fn encode(
    text: &NormalizedText,
    vocab: &Vocabulary,
    language: &str,
    control_token: i64,
) -> TokenSequence {
    let mut sequence = TokenSequence::start(language, control_token, text.len());
    let mut word = String::new();

    for ch in text.chars() {
        if ch.is_whitespace() {
            flush_word(&mut sequence, &mut word, vocab);
            match vocab.space_unit() {
                Some(space) => push_unit(&mut sequence, space, vocab),
                None => push_unit(&mut sequence, ch.encode_utf8(&mut [0u8; 4]), vocab),
            }
            continue;
        }
        word.push(ch);
    }
    flush_word(&mut sequence, &mut word, vocab);

    if sequence.unknown_units > 0 {
        log::debug!(
            "{} of {} units for '{}' were not in vocabulary {}",
            sequence.unknown_units,
            sequence.len() - 1,
            language,
            vocab.version()
        );
    }
    sequence
}

fn flush_word(sequence: &mut TokenSequence, word: &mut String, vocab: &Vocabulary) {
    if word.is_empty() {
        return;
    }
    for unit in split_word(word, vocab) {
        push_unit(sequence, &unit, vocab);
    }
    word.clear();
}

fn push_unit(sequence: &mut TokenSequence, unit: &str, vocab: &Vocabulary) {
    match vocab.id_of(unit) {
        Some(id) => sequence.ids.push(id),
        None => {
            log::trace!("Unknown unit {unit:?}");
            sequence.ids.push(vocab.unknown_id());
            sequence.unknown_units += 1;
        }
    }
}

/// Split one whitespace-free run into vocabulary units.
pub fn split_word(word: &str, vocab: &Vocabulary) -> Vec<String> {
    match vocab.algorithm() {
        SplitAlgorithm::Merge => merge_split(word, vocab),
        SplitAlgorithm::LongestMatch => longest_match_split(word, vocab),
    }
}

fn merge_split(word: &str, vocab: &Vocabulary) -> Vec<String> {
    let mut parts: Vec<String> = word.chars().map(String::from).collect();

    loop {
        let best = parts
            .windows(2)
            .enumerate()
            .filter_map(|(i, pair)| vocab.merge_rank(&pair[0], &pair[1]).map(|rank| (rank, i)))
            .min();
        let Some((_, at)) = best else {
            break;
        };

        let left = parts[at].clone();
        let right = parts[at + 1].clone();
        let mut merged = Vec::with_capacity(parts.len() - 1);
        let mut i = 0;
        while i < parts.len() {
            if i + 1 < parts.len() && parts[i] == left && parts[i + 1] == right {
                merged.push(format!("{left}{right}"));
                i += 2;
            } else {
                merged.push(std::mem::take(&mut parts[i]));
                i += 1;
            }
        }
        parts = merged;
    }

    parts
}

fn longest_match_split(word: &str, vocab: &Vocabulary) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut units = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let mut end = (start + vocab.max_unit_chars()).min(chars.len());
        let unit = loop {
            let candidate: String = chars[start..end].iter().collect();
            // A lone character is emitted even when unknown.
            if end == start + 1 || vocab.contains(&candidate) {
                break candidate;
            }
            end -= 1;
        };
        units.push(unit);
        start = end;
    }

    units
}
