//! Model-free UTF-8 byte tokenizer.
//!
//! Every byte is one token, so any character outside ASCII spans several
//! tokens. That makes it a faithful stand-in for how real BPE decoders behave
//! around multi-byte characters.

use crate::{EmbedError, TokenDecoder, TokenId, Tokenizer};

#[derive(Debug, Clone, Copy, Default)]
pub struct ByteTokenizer;

impl Tokenizer for ByteTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<TokenId>, EmbedError> {
        Ok(text.bytes().map(TokenId::from).collect())
    }

    fn decoder(&self) -> Box<dyn TokenDecoder + '_> {
        Box::new(ByteDecoder::default())
    }
}

/// Withholds trailing bytes of a character that is not complete yet.
#[derive(Debug, Default)]
pub struct ByteDecoder {
    pending: Vec<u8>,
}

impl TokenDecoder for ByteDecoder {
    fn push(&mut self, token: TokenId) {
        match u8::try_from(token) {
            Ok(byte) => self.pending.push(byte),
            Err(_) => self
                .pending
                .extend_from_slice(char::REPLACEMENT_CHARACTER.to_string().as_bytes()),
        }
    }

    fn read(&mut self) -> Result<String, EmbedError> {
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    break;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match err.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                        None => {
                            self.pending.drain(..valid);
                            break;
                        }
                    }
                }
            }
        }
        Ok(out)
    }

    fn flush(&mut self) -> Result<String, EmbedError> {
        let out = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        Ok(out)
    }
}
