// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Where the run's tokenizer comes from and where it goes:
//
//   from_pretrained(name)  — download tokenizer.json from the
//                            Hugging Face hub (distilbert-base-uncased),
//                            or read it from a local model directory
//   build_word_level(..)   — offline fallback: a word-level vocabulary
//                            built from the training texts
//   load(dir)              — reload the tokenizer a run saved
//
// The word-level tokenizer is written as tokenizer JSON and read back
// through Tokenizer::from_file, which sidesteps the trainer API.
// Its post-processor wraps every sequence in [CLS] ... [SEP] like the
// pretrained one does.
//
// Reference: Wu et al. (2016) WordPiece
//            tokenizers crate documentation

use anyhow::{anyhow, Context, Result};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use tokenizers::Tokenizer;

use crate::domain::traits::TextEncoder;

pub const TOKENIZER_FILE: &str = "tokenizer.json";

const SPECIAL_TOKENS: [&str; 5] = ["[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]"];

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn tokenizer_path(&self) -> PathBuf {
        self.dir.join(TOKENIZER_FILE)
    }

    /// Fetch a pretrained tokenizer by hub identifier, or read it from
    /// a local directory holding `tokenizer.json`.
    pub fn from_pretrained(name: &str) -> Result<Tokenizer> {
        if Path::new(name).is_dir() {
            return Self::new(name).load();
        }
        tracing::info!("Fetching pretrained tokenizer '{}'", name);
        Tokenizer::from_pretrained(name, None)
            .map_err(|e| anyhow!("Cannot fetch tokenizer '{name}': {e}"))
    }

    /// Load the tokenizer a previous run saved into this directory.
    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.tokenizer_path();
        Tokenizer::from_file(&path)
            .map_err(|e| anyhow!("Cannot load tokenizer from '{}': {e}", path.display()))
    }

    /// Build a word-level vocabulary from `texts`, keep the
    /// `vocab_size - 5` most frequent words (ties broken alphabetically)
    /// and write it as tokenizer JSON into the store directory.
    pub fn build_word_level(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        // ── Step 1: Count words ───────────────────────────────────────────────
        let mut freq: HashMap<String, usize> = HashMap::new();
        for text in texts {
            for word in text.split_whitespace() {
                let w = word.to_lowercase();
                let w = w.trim_matches(|c: char| !c.is_alphanumeric());
                if !w.is_empty() && !SPECIAL_TOKENS.contains(&w) {
                    *freq.entry(w.to_string()).or_insert(0) += 1;
                }
            }
        }

        let mut words: Vec<(String, usize)> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        words.truncate(vocab_size.saturating_sub(SPECIAL_TOKENS.len()));

        // ── Step 2: Contiguous ids, specials first ────────────────────────────
        let mut vocab = serde_json::Map::new();
        for (id, token) in SPECIAL_TOKENS.iter().enumerate() {
            vocab.insert(token.to_string(), serde_json::json!(id));
        }
        for (offset, (word, _)) in words.iter().enumerate() {
            vocab.insert(word.clone(), serde_json::json!(SPECIAL_TOKENS.len() + offset));
        }

        let added_tokens: Vec<serde_json::Value> = SPECIAL_TOKENS
            .iter()
            .enumerate()
            .map(|(id, token)| serde_json::json!({
                "id": id, "content": token, "single_word": false, "lstrip": false,
                "rstrip": false, "normalized": false, "special": true
            }))
            .collect();

        // ── Step 3: Write tokenizer JSON ──────────────────────────────────────
        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": added_tokens,
            "normalizer": {
                "type": "BertNormalizer",
                "clean_text": true,
                "handle_chinese_chars": true,
                "strip_accents": null,
                "lowercase": true
            },
            "pre_tokenizer": {
                "type": "Whitespace"
            },
            "post_processor": {
                "type": "BertProcessing",
                "sep": ["[SEP]", 3],
                "cls": ["[CLS]", 2]
            },
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": "[UNK]"
            }
        });

        let tok_path = self.tokenizer_path();
        fs::write(&tok_path, serde_json::to_string_pretty(&tokenizer_json)?)
            .with_context(|| format!("Cannot write tokenizer JSON '{}'", tok_path.display()))?;

        tracing::info!(
            "Word-level tokenizer built with {} tokens, saved to '{}'",
            SPECIAL_TOKENS.len() + words.len(),
            tok_path.display()
        );

        self.load()
    }
}

// ─── TextEncoder for tokenizers::Tokenizer ────────────────────────────────────
impl TextEncoder for Tokenizer {
    fn encode_ids(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .encode(text, true)
            .map_err(|e| anyhow!("Tokenisation error: {e}"))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn pad_id(&self) -> u32 {
        self.token_to_id("[PAD]").unwrap_or(0)
    }

    fn sep_id(&self) -> Option<u32> {
        self.token_to_id("[SEP]")
    }

    fn vocab_size(&self) -> usize {
        // Added tokens may sit above the base vocabulary
        self.get_vocab(true)
            .values()
            .max()
            .map_or(0, |&max| max as usize + 1)
    }

    fn save_pretrained(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).with_context(|| format!("Cannot create '{}'", dir.display()))?;
        let path = dir.join(TOKENIZER_FILE);
        self.save(&path, true)
            .map_err(|e| anyhow!("Cannot save tokenizer to '{}': {e}", path.display()))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        vec![
            "forest fire near la ronge".to_string(),
            "fire fire evacuation".to_string(),
            "lovely sunny day".to_string(),
        ]
    }

    #[test]
    fn test_word_level_ids_are_contiguous() {
        let tmp   = tempfile::tempdir().unwrap();
        let store = TokenizerStore::new(tmp.path());
        let tok   = store.build_word_level(&corpus(), 100).unwrap();

        assert_eq!(tok.token_to_id("[PAD]"), Some(0));
        assert_eq!(tok.token_to_id("[CLS]"), Some(2));
        // Most frequent word gets the first free id
        assert_eq!(tok.token_to_id("fire"), Some(5));
        // 5 specials + 9 distinct words
        assert_eq!(TextEncoder::vocab_size(&tok), 14);
    }

    #[test]
    fn test_vocab_size_caps_words() {
        let tmp   = tempfile::tempdir().unwrap();
        let tok   = TokenizerStore::new(tmp.path()).build_word_level(&corpus(), 7).unwrap();
        assert_eq!(TextEncoder::vocab_size(&tok), 7);
    }

    #[test]
    fn test_encoding_wraps_in_cls_sep_and_maps_unknown() {
        let tmp = tempfile::tempdir().unwrap();
        let tok = TokenizerStore::new(tmp.path()).build_word_level(&corpus(), 100).unwrap();

        let ids = tok.encode_ids("fire tsunami").unwrap();
        assert_eq!(ids, vec![2, 5, 1, 3]);
        assert_eq!(tok.sep_id(), Some(3));
        assert_eq!(tok.pad_id(), 0);
    }

    #[test]
    fn test_save_and_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let tok = TokenizerStore::new(tmp.path().join("build")).build_word_level(&corpus(), 100).unwrap();

        let out = tmp.path().join("results");
        TextEncoder::save_pretrained(&tok, &out).unwrap();
        let reloaded = TokenizerStore::new(&out).load().unwrap();
        assert_eq!(reloaded.encode_ids("forest fire").unwrap(), tok.encode_ids("forest fire").unwrap());
    }

    #[test]
    fn test_pretrained_name_may_be_a_local_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let tok = TokenizerStore::new(tmp.path()).build_word_level(&corpus(), 100).unwrap();

        let local = TokenizerStore::from_pretrained(tmp.path().to_str().unwrap()).unwrap();
        assert_eq!(local.encode_ids("lovely day").unwrap(), tok.encode_ids("lovely day").unwrap());
    }

    #[test]
    fn test_missing_tokenizer_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(TokenizerStore::new(tmp.path()).load().is_err());
    }
}
