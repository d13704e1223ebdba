use std::time::Duration;

use crate::error::NotifyError;

const TTS_ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// The endpoint rejects longer requests.
const MAX_CHUNK_CHARS: usize = 100;

/// Online text-to-speech via the Google Translate speech endpoint.
pub struct SpeechSynthesizer {
    http: reqwest::Client,
}

impl SpeechSynthesizer {
    pub fn new() -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("speech-reminder/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| NotifyError::Synthesis(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http })
    }

    /// MP3 audio for `text`; chunks are requested in order and concatenated.
    pub async fn synthesize(&self, text: &str, language_code: &str) -> Result<Vec<u8>, NotifyError> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(NotifyError::Synthesis("nothing to speak".to_string()));
        }

        let total = chunks.len().to_string();
        let mut audio = Vec::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            let textlen = chunk.chars().count().to_string();
            let idx = idx.to_string();
            let response = self
                .http
                .get(TTS_ENDPOINT)
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", language_code),
                    ("q", chunk.as_str()),
                    ("total", total.as_str()),
                    ("idx", idx.as_str()),
                    ("textlen", textlen.as_str()),
                ])
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| NotifyError::Synthesis(e.to_string()))?;

            let bytes = response
                .bytes()
                .await
                .map_err(|e| NotifyError::Synthesis(e.to_string()))?;
            audio.extend_from_slice(&bytes);
        }

        Ok(audio)
    }
}

/// Split `text` on whitespace into pieces of at most `max_chars` characters.
///
/// Words longer than `max_chars` are cut at character boundaries.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(
            chunk_text("Standup begins in 5 minutes", 100),
            vec!["Standup begins in 5 minutes"]
        );
    }

    #[test]
    fn test_words_are_not_split_between_chunks() {
        let chunks = chunk_text("aaa bbb ccc", 7);
        assert_eq!(chunks, vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn test_long_word_is_cut() {
        let chunks = chunk_text("ab abcdefgh c", 3);
        assert_eq!(chunks, vec!["ab", "abc", "def", "gh", "c"]);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let chunks = chunk_text("über ärger", 10);
        assert_eq!(chunks, vec!["über ärger"]);
    }

    #[test]
    fn test_blank_text_has_no_chunks() {
        assert!(chunk_text("   ", 100).is_empty());
    }
}
