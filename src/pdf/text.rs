//! Text assembly from positioned chars.
//!
//! Chars are grouped into words by horizontal proximity and into lines by
//! vertical proximity. No reflow: one output line per visual line.

use super::geometry::{cluster_indices, Char};
use super::options::TextTolerance;

/// A run of adjacent non-blank chars.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub x0: f64,
    pub x1: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Word {
    fn start(ch: &Char) -> Self {
        Self {
            text: ch.text.clone(),
            x0: ch.x0,
            x1: ch.x1,
            top: ch.top,
            bottom: ch.bottom,
        }
    }

    fn push(&mut self, ch: &Char) {
        self.text.push_str(&ch.text);
        self.x0 = self.x0.min(ch.x0);
        self.x1 = self.x1.max(ch.x1);
        self.top = self.top.min(ch.top);
        self.bottom = self.bottom.max(ch.bottom);
    }
}

fn begins_new_word(prev: &Char, curr: &Char, tolerance: TextTolerance) -> bool {
    curr.x0 < prev.x0
        || curr.x0 > prev.x1 + tolerance.x
        || (curr.top - prev.top).abs() > tolerance.y
}

/// Split chars into words, line by line, left to right.
pub fn extract_words<'a, I>(chars: I, tolerance: TextTolerance) -> Vec<Word>
where
    I: IntoIterator<Item = &'a Char>,
{
    let chars: Vec<&Char> = chars.into_iter().collect();
    let tops: Vec<f64> = chars.iter().map(|c| c.top).collect();
    let mut words = Vec::new();

    for cluster in cluster_indices(&tops, tolerance.y) {
        let mut line: Vec<&Char> = cluster.into_iter().map(|i| chars[i]).collect();
        line.sort_by(|a, b| a.x0.total_cmp(&b.x0));

        let mut current: Option<(Word, &Char)> = None;
        for ch in line {
            if ch.is_blank() {
                if let Some((word, _)) = current.take() {
                    words.push(word);
                }
                continue;
            }
            current = match current.take() {
                Some((mut word, prev)) if !begins_new_word(prev, ch, tolerance) => {
                    word.push(ch);
                    Some((word, ch))
                }
                Some((word, _)) => {
                    words.push(word);
                    Some((Word::start(ch), ch))
                }
                None => Some((Word::start(ch), ch)),
            };
        }
        if let Some((word, _)) = current {
            words.push(word);
        }
    }

    words
}

/// Plain text of `chars`: words joined by spaces, lines by line feeds.
///
/// Returns an empty string when there are no chars.
pub fn extract_text<'a, I>(chars: I, tolerance: TextTolerance) -> String
where
    I: IntoIterator<Item = &'a Char>,
{
    let words = extract_words(chars, tolerance);
    let tops: Vec<f64> = words.iter().map(|w| w.top).collect();

    cluster_indices(&tops, tolerance.y)
        .into_iter()
        .map(|cluster| {
            let mut line: Vec<&Word> = cluster.into_iter().map(|i| &words[i]).collect();
            line.sort_by(|a, b| a.x0.total_cmp(&b.x0));
            line.iter()
                .map(|w| w.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
