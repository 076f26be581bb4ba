use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub weight: f64,
}

/// Words in the order they should be placed (heaviest first).
#[derive(Debug, Clone, Default)]
pub struct WordList {
    pub words: Vec<Word>,
}

impl WordList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Merge duplicate texts, summing their weights, then sort by descending
    /// weight. Ties keep first-appearance order.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut words: Vec<Word> = Vec::new();
        for (text, weight) in entries {
            if let Some(&idx) = index.get(&text) {
                words[idx].weight += weight;
                continue;
            }
            index.insert(text.clone(), words.len());
            words.push(Word { text, weight });
        }
        words.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        Self { words }
    }

    pub fn truncate(&mut self, max_words: usize) {
        self.words.truncate(max_words);
    }

    pub fn weight_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.words.iter().map(|w| w.weight);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), w| (lo.min(w), hi.max(w))))
    }
}
