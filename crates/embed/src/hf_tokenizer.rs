use std::path::Path;

use tracing::debug;

use crate::{EmbedError, TokenDecoder, TokenId, Tokenizer};

/// Adapter over a Hugging Face `tokenizer.json`.
pub struct HfTokenizer {
    inner: tokenizers::Tokenizer,
    add_special_tokens: bool,
}

impl HfTokenizer {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EmbedError> {
        let path = path.as_ref();
        let inner = tokenizers::Tokenizer::from_file(path)
            .map_err(|e| EmbedError::Tokenizer(format!("{}: {e}", path.display())))?;
        Ok(Self::new(inner))
    }

    pub fn new(inner: tokenizers::Tokenizer) -> Self {
        Self {
            inner,
            add_special_tokens: true,
        }
    }

    /// Whether BOS/CLS-style tokens are added while encoding. Defaults to true.
    pub fn with_special_tokens(mut self, add: bool) -> Self {
        self.add_special_tokens = add;
        self
    }
}

impl Tokenizer for HfTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<TokenId>, EmbedError> {
        let encoding = self
            .inner
            .encode(text, self.add_special_tokens)
            .map_err(|e| EmbedError::Tokenizer(e.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decoder(&self) -> Box<dyn TokenDecoder + '_> {
        Box::new(HfDecoder {
            tokenizer: &self.inner,
            ids: Vec::new(),
            emitted: String::new(),
        })
    }
}

/// Decodes the whole id prefix each time and hands out the new suffix.
struct HfDecoder<'a> {
    tokenizer: &'a tokenizers::Tokenizer,
    ids: Vec<TokenId>,
    emitted: String,
}

impl HfDecoder<'_> {
    fn decode_all(&self) -> Result<String, EmbedError> {
        self.tokenizer
            .decode(&self.ids, true)
            .map_err(|e| EmbedError::Tokenizer(e.to_string()))
    }

    fn take_suffix(&mut self, text: String) -> String {
        let (suffix, rewritten) = unseen_suffix(&self.emitted, &text);
        if rewritten {
            debug!(
                emitted_len = self.emitted.len(),
                decoded_len = text.len(),
                "decoder_prefix_rewritten"
            );
        }
        let suffix = suffix.to_string();
        self.emitted = text;
        suffix
    }
}

/// Part of `current` not yet covered by `previous`.
///
/// Normally `previous` is a prefix of `current`. When a re-decode rewrote text
/// that was already handed out, output resumes after the longest shared
/// character prefix and the flag is set; shown text cannot be taken back.
fn unseen_suffix<'t>(previous: &str, current: &'t str) -> (&'t str, bool) {
    if let Some(rest) = current.strip_prefix(previous) {
        return (rest, false);
    }
    let shared = previous
        .chars()
        .zip(current.chars())
        .take_while(|(a, b)| a == b)
        .map(|(c, _)| c.len_utf8())
        .sum::<usize>();
    (&current[shared..], true)
}

impl TokenDecoder for HfDecoder<'_> {
    fn push(&mut self, token: TokenId) {
        self.ids.push(token);
    }

    fn read(&mut self) -> Result<String, EmbedError> {
        let text = self.decode_all()?;
        // A trailing replacement char means a byte-fallback character is still incomplete.
        if text.ends_with(char::REPLACEMENT_CHARACTER) {
            return Ok(String::new());
        }
        Ok(self.take_suffix(text))
    }

    fn flush(&mut self) -> Result<String, EmbedError> {
        let text = self.decode_all()?;
        Ok(self.take_suffix(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_tokenizer_error() {
        let err = HfTokenizer::from_file("./missing/tokenizer.json")
            .err()
            .expect("missing tokenizer must fail");
        assert!(matches!(err, EmbedError::Tokenizer(_)));
        assert!(err.to_string().contains("missing/tokenizer.json"));
    }

    #[test]
    fn suffix_extends_previous_text() {
        assert_eq!(unseen_suffix("hello", "hello world"), (" world", false));
        assert_eq!(unseen_suffix("", "hi"), ("hi", false));
        assert_eq!(unseen_suffix("same", "same"), ("", false));
    }

    #[test]
    fn rewritten_prefix_resyncs_at_shared_chars() {
        assert_eq!(unseen_suffix("hello wor", "hello, world"), (", world", true));
        assert_eq!(unseen_suffix("abc", "ab"), ("", true));
        assert_eq!(unseen_suffix("né", "nè!"), ("è!", true));
    }

    #[test]
    #[ignore = "requires a local tokenizer.json under models/"]
    fn round_trips_through_incremental_decoder() {
        let tokenizer = HfTokenizer::from_file("./models/tokenizer.json")
            .unwrap()
            .with_special_tokens(false);
        let ids = tokenizer.tokenize("hello world").unwrap();
        let mut decoder = tokenizer.decoder();
        let mut text = String::new();
        for id in ids {
            decoder.push(id);
            text.push_str(&decoder.read().unwrap());
        }
        text.push_str(&decoder.flush().unwrap());
        assert_eq!(text.trim(), "hello world");
    }
}
