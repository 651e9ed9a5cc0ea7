//! Annotated document returned by a pipeline
//!
//! Mirrors the backend's own structure: a document holds sentences, a
//! sentence holds tokens, and a token holds one or more syntactic words.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub sentences: Vec<Sentence>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub tokens: Vec<Token>,
}

/// A surface token. Multi-word tokens carry an id range such as `[1, 2]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: Vec<usize>,
    pub text: String,
    #[serde(default)]
    pub start_char: Option<usize>,
    #[serde(default)]
    pub end_char: Option<usize>,
    #[serde(default)]
    pub misc: Option<String>,
    #[serde(default)]
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub id: usize,
    pub text: String,
    #[serde(default)]
    pub lemma: Option<String>,
    #[serde(default)]
    pub upos: Option<String>,
    #[serde(default)]
    pub xpos: Option<String>,
    #[serde(default)]
    pub feats: Option<String>,
    /// 0 for the root, absent when the pipeline has no parser
    #[serde(default)]
    pub head: Option<usize>,
    #[serde(default)]
    pub deprel: Option<String>,
    #[serde(default)]
    pub start_char: Option<usize>,
    #[serde(default)]
    pub end_char: Option<usize>,
    #[serde(default)]
    pub misc: Option<String>,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.sentences.iter().all(|s| s.tokens.is_empty())
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.sentences.iter().flat_map(|s| s.tokens.iter())
    }

    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.tokens().flat_map(|t| t.words.iter())
    }

    pub fn num_tokens(&self) -> usize {
        self.tokens().count()
    }

    pub fn num_words(&self) -> usize {
        self.words().count()
    }

    /// Render as CoNLL-U.
    pub fn to_conllu(&self) -> String {
        let mut out = String::new();
        for (idx, sentence) in self.sentences.iter().enumerate() {
            out.push_str(&format!("# sent_id = {}\n", idx + 1));
            if let Some(text) = &sentence.text {
                out.push_str(&format!("# text = {}\n", text));
            }
            for token in &sentence.tokens {
                if token.is_multi_word() {
                    let first = token.id.first().copied().unwrap_or_default();
                    let last = token.id.last().copied().unwrap_or_default();
                    out.push_str(&format!(
                        "{}-{}\t{}\t_\t_\t_\t_\t_\t_\t_\t{}\n",
                        first,
                        last,
                        token.text,
                        or_blank(token.char_span_misc().as_deref())
                    ));
                }
                for word in &token.words {
                    let misc = if token.is_multi_word() {
                        word.misc.clone()
                    } else {
                        word.misc.clone().or_else(|| token.char_span_misc())
                    };
                    out.push_str(&format!(
                        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t_\t{}\n",
                        word.id,
                        word.text,
                        or_blank(word.lemma.as_deref()),
                        or_blank(word.upos.as_deref()),
                        or_blank(word.xpos.as_deref()),
                        or_blank(word.feats.as_deref()),
                        word.head
                            .map(|h| h.to_string())
                            .unwrap_or_else(|| "_".to_string()),
                        or_blank(word.deprel.as_deref()),
                        or_blank(misc.as_deref()),
                    ));
                }
            }
            out.push('\n');
        }
        out
    }
}

impl Token {
    pub fn is_multi_word(&self) -> bool {
        self.words.len() > 1
    }

    /// `start_char=..|end_char=..` when offsets are known, otherwise `misc`.
    pub fn char_span_misc(&self) -> Option<String> {
        match (self.start_char, self.end_char) {
            (Some(start), Some(end)) => Some(format!("start_char={start}|end_char={end}")),
            _ => self.misc.clone(),
        }
    }

    /// Short single-line rendering, e.g.
    /// `<Token id=1;words=[<Word id=1;text=ὅτι;lemma=ὅτι;upos=ADV>]>`
    pub fn pretty(&self) -> String {
        self.to_string()
    }
}

impl Word {
    /// Universal part of speech.
    pub fn pos(&self) -> Option<&str> {
        self.upos.as_deref()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self.id.iter().map(|i| i.to_string()).collect();
        let words: Vec<String> = self.words.iter().map(|w| w.to_string()).collect();
        write!(f, "<Token id={};words=[{}]>", ids.join("-"), words.join(", "))
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Word id={};text={}", self.id, self.text)?;
        let optional = [
            ("lemma", self.lemma.clone()),
            ("upos", self.upos.clone()),
            ("xpos", self.xpos.clone()),
            ("feats", self.feats.clone()),
            ("head", self.head.map(|h| h.to_string())),
            ("deprel", self.deprel.clone()),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                write!(f, ";{}={}", name, value)?;
            }
        }
        f.write_str(">")
    }
}

fn or_blank(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "_",
    }
}
