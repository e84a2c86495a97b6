//! Knuth-Morris-Pratt substring search over materialized document text.
//!
//! Offsets are byte offsets. A match of a valid UTF-8 pattern inside valid
//! UTF-8 text always starts and ends on character boundaries.

use log::trace;

/// Match start offsets in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    indices: Vec<usize>,
}

impl SearchResults {
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<usize> {
        self.indices.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }
}

impl From<Vec<usize>> for SearchResults {
    fn from(indices: Vec<usize>) -> Self {
        Self { indices }
    }
}

/// `lps[i]` is the length of the longest proper prefix of `pattern[..=i]`
/// that is also a suffix of it.
pub fn compute_prefix_table(pattern: &str) -> Vec<usize> {
    let pattern = pattern.as_bytes();
    let mut lps = vec![0; pattern.len()];
    let mut len = 0;
    let mut i = 1;
    while i < pattern.len() {
        if pattern[i] == pattern[len] {
            len += 1;
            lps[i] = len;
            i += 1;
        } else if len > 0 {
            len = lps[len - 1];
        } else {
            lps[i] = 0;
            i += 1;
        }
    }
    lps
}

/// Every occurrence of `pattern` in `text`, overlapping ones included.
pub fn search(pattern: &str, text: &str) -> SearchResults {
    let needle = pattern.as_bytes();
    let haystack = text.as_bytes();
    if needle.is_empty() || haystack.is_empty() || needle.len() > haystack.len() {
        return SearchResults::default();
    }

    let lps = compute_prefix_table(pattern);
    let mut indices = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < haystack.len() {
        if haystack[i] == needle[j] {
            i += 1;
            j += 1;
            if j == needle.len() {
                indices.push(i - j);
                j = lps[j - 1];
            }
        } else if j > 0 {
            j = lps[j - 1];
        } else {
            i += 1;
        }
    }

    trace!("'{pattern}': {} matches in {} bytes", indices.len(), text.len());
    SearchResults { indices }
}

/// Replace non-overlapping occurrences of `pattern`, scanning left to right.
///
/// Returns the new text and how many replacements were made.
pub fn replace_all(text: &str, pattern: &str, replacement: &str) -> (String, usize) {
    let results = search(pattern, text);
    if results.is_empty() {
        return (text.to_string(), 0);
    }

    let mut output = String::with_capacity(text.len());
    let mut last = 0;
    let mut replaced = 0;
    for start in results.iter() {
        if start < last {
            continue; // overlaps the previous replacement
        }
        output.push_str(&text[last..start]);
        output.push_str(replacement);
        last = start + pattern.len();
        replaced += 1;
    }
    output.push_str(&text[last..]);
    (output, replaced)
}
