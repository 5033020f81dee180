use embed::{EmbedError, Tokenizer};

/// Tokenize `text` and render one display string per token.
///
/// Text a decoder holds back until the end (a character split across tokens
/// that never completes) is appended to the last entry after the final flush.
pub fn render_tokens(tokenizer: &dyn Tokenizer, text: &str) -> Result<Vec<String>, EmbedError> {
    let ids = tokenizer.tokenize(text)?;
    let mut decoder = tokenizer.decoder();
    let mut rendered = Vec::with_capacity(ids.len());
    for id in ids {
        decoder.push(id);
        rendered.push(decoder.read()?);
    }

    let tail = decoder.flush()?;
    if !tail.is_empty() {
        match rendered.last_mut() {
            Some(last) => last.push_str(&tail),
            None => rendered.push(tail),
        }
    }
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use embed::ByteTokenizer;

    #[test]
    fn ascii_renders_one_char_per_token() {
        let rendered = render_tokens(&ByteTokenizer, "abc").unwrap();
        assert_eq!(rendered, vec!["a", "b", "c"]);
    }

    #[test]
    fn multibyte_chars_land_on_their_last_token() {
        let rendered = render_tokens(&ByteTokenizer, "aé").unwrap();
        assert_eq!(rendered, vec!["a", "", "é"]);
        assert_eq!(rendered.concat(), "aé");
    }

    #[test]
    fn empty_text_renders_nothing() {
        assert!(render_tokens(&ByteTokenizer, "").unwrap().is_empty());
    }
}
