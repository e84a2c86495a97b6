use super::search::{self, SearchResults};
use log::debug;
use regex::Regex;
use std::ops::Range;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    pub start: usize,
    pub end: usize,
}

impl SearchMatch {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// Search session: the active pattern, its cached matches and the match the
/// user is currently on.
#[derive(Debug, Clone)]
pub struct SearchState {
    pub pattern: String,
    pub matches: Vec<SearchMatch>,
    pub current_match: Option<usize>,
    pub case_sensitive: bool,
    pub wrap_search: bool,
    pub use_regex: bool,
    regex: Option<Regex>,
}

impl SearchState {
    pub fn new() -> Self {
        Self {
            pattern: String::new(),
            matches: Vec::new(),
            current_match: None,
            case_sensitive: true,
            wrap_search: true,
            use_regex: false,
            regex: None,
        }
    }

    pub fn set_pattern(&mut self, pattern: impl Into<String>) -> Result<(), SearchError> {
        self.pattern = pattern.into();
        self.matches.clear();
        self.current_match = None;
        self.regex = None;

        if self.pattern.is_empty() || (self.case_sensitive && !self.use_regex) {
            return Ok(());
        }

        let source = if self.use_regex {
            self.pattern.clone()
        } else {
            regex::escape(&self.pattern)
        };
        let source = if self.case_sensitive {
            source
        } else {
            format!("(?i){source}")
        };

        let regex = Regex::new(&source).map_err(|e| SearchError::InvalidPattern(e.to_string()))?;
        self.regex = Some(regex);
        Ok(())
    }

    /// Recompute every match of the current pattern in `text`.
    pub fn search_text(&mut self, text: &str) {
        self.current_match = None;
        self.matches = match &self.regex {
            Some(regex) => regex
                .find_iter(text)
                .filter(|m| !m.is_empty())
                .map(|m| SearchMatch {
                    start: m.start(),
                    end: m.end(),
                })
                .collect(),
            None => {
                let len = self.pattern.len();
                search::search(&self.pattern, text)
                    .iter()
                    .map(|start| SearchMatch {
                        start,
                        end: start + len,
                    })
                    .collect()
            }
        };
        debug!("search '{}': {} matches", self.pattern, self.matches.len());
    }

    /// Search `text` again after an edit, keeping the current match by position
    /// in the list when it still exists.
    pub fn update_text(&mut self, text: &str) {
        let current = self.current_match;
        self.search_text(text);
        self.current_match = current.filter(|&i| i < self.matches.len());
    }

    pub fn results(&self) -> SearchResults {
        SearchResults::from(self.matches.iter().map(|m| m.start).collect::<Vec<_>>())
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn next_match(&mut self) -> Option<SearchMatch> {
        let count = self.matches.len();
        if count == 0 {
            return None;
        }
        let next = match self.current_match {
            None => 0,
            Some(current) if current + 1 < count => current + 1,
            Some(_) if self.wrap_search => 0,
            Some(_) => return None,
        };
        self.current_match = Some(next);
        self.matches.get(next).copied()
    }

    pub fn previous_match(&mut self) -> Option<SearchMatch> {
        let count = self.matches.len();
        if count == 0 {
            return None;
        }
        let previous = match self.current_match {
            None => count - 1,
            Some(current) if current > 0 => current - 1,
            Some(_) if self.wrap_search => count - 1,
            Some(_) => return None,
        };
        self.current_match = Some(previous);
        self.matches.get(previous).copied()
    }

    pub fn current(&self) -> Option<SearchMatch> {
        self.current_match.and_then(|i| self.matches.get(i).copied())
    }

    pub fn current_range(&self) -> Option<Range<usize>> {
        self.current().map(|m| m.range())
    }

    /// 1-based index of the current match, for status display.
    pub fn current_match_index(&self) -> Option<usize> {
        self.current_match.map(|idx| idx + 1)
    }

    /// Replace the current match in `text`, which must be the text last searched.
    pub fn replace_current(&self, text: &str, replacement: &str) -> Option<String> {
        let range = self.current_range()?;
        let before = text.get(..range.start)?;
        let after = text.get(range.end..)?;
        Some(format!("{before}{replacement}{after}"))
    }

    /// Replace every non-overlapping match of the current pattern in `text`.
    pub fn replace_all(&self, text: &str, replacement: &str) -> (String, usize) {
        match &self.regex {
            Some(regex) => {
                let mut output = String::with_capacity(text.len());
                let mut last = 0;
                let mut count = 0;
                // Empty matches are never reported by search_text, so skip them here too.
                for caps in regex.captures_iter(text) {
                    let Some(m) = caps.get(0).filter(|m| !m.is_empty()) else {
                        continue;
                    };
                    output.push_str(&text[last..m.start()]);
                    if self.use_regex {
                        caps.expand(replacement, &mut output);
                    } else {
                        output.push_str(replacement);
                    }
                    last = m.end();
                    count += 1;
                }
                output.push_str(&text[last..]);
                (output, count)
            }
            None => search::replace_all(text, &self.pattern, replacement),
        }
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn searched(pattern: &str, text: &str) -> SearchState {
        let mut state = SearchState::new();
        state.set_pattern(pattern).unwrap();
        state.search_text(text);
        state
    }

    #[test]
    fn test_literal_search_uses_overlapping_matches() {
        let state = searched("aa", "aaa");
        assert_eq!(state.results().indices(), &[0, 1]);
        assert_eq!(state.current_match, None);
    }

    #[test]
    fn test_next_and_previous_wrap() {
        let mut state = searched("ana", "banana");
        assert_eq!(state.next_match().map(|m| m.start), Some(1));
        assert_eq!(state.next_match().map(|m| m.start), Some(3));
        assert_eq!(state.next_match().map(|m| m.start), Some(1));
        assert_eq!(state.previous_match().map(|m| m.start), Some(3));
        assert_eq!(state.current_match_index(), Some(2));
        assert_eq!(state.current_range(), Some(3..6));
    }

    #[test]
    fn test_no_wrap_stops_at_ends() {
        let mut state = searched("a", "aXa");
        state.wrap_search = false;
        assert!(state.next_match().is_some());
        assert!(state.next_match().is_some());
        assert!(state.next_match().is_none());
        assert_eq!(state.current_match, Some(1));
    }

    #[test]
    fn test_previous_without_selection_starts_at_last() {
        let mut state = searched("o", "foo boo");
        assert_eq!(state.previous_match().map(|m| m.start), Some(6));
    }

    #[test]
    fn test_empty_pattern_has_no_matches() {
        let mut state = searched("", "anything");
        assert_eq!(state.match_count(), 0);
        assert!(state.next_match().is_none());
    }

    #[test]
    fn test_case_insensitive_literal() {
        let mut state = SearchState::new();
        state.case_sensitive = false;
        state.set_pattern("a.b").unwrap();
        state.search_text("A.B axb a.b");
        assert_eq!(state.results().indices(), &[0, 8]);
    }

    #[test]
    fn test_regex_mode() {
        let mut state = SearchState::new();
        state.use_regex = true;
        state.set_pattern(r"\d+").unwrap();
        state.search_text("a1 b22 c333");
        let ranges: Vec<_> = state.matches.iter().map(|m| m.range()).collect();
        assert_eq!(ranges, vec![1..2, 4..6, 8..11]);
        assert_eq!(state.replace_all("a1 b22", "#"), ("a# b#".to_string(), 2));
    }

    #[test]
    fn test_regex_replace_all_skips_empty_matches() {
        let mut state = SearchState::new();
        state.use_regex = true;
        state.set_pattern("x*").unwrap();
        state.search_text("axb");
        assert_eq!(state.match_count(), 1);
        assert_eq!(state.replace_all("axb", "-"), ("a-b".to_string(), 1));
    }

    #[test]
    fn test_regex_replace_all_expands_groups() {
        let mut state = SearchState::new();
        state.use_regex = true;
        state.set_pattern(r"(\w+)@(\w+)").unwrap();
        assert_eq!(
            state.replace_all("me@home you@work", "$2:$1"),
            ("home:me work:you".to_string(), 2)
        );
    }

    #[test]
    fn test_case_insensitive_replace_all_is_literal() {
        let mut state = SearchState::new();
        state.case_sensitive = false;
        state.set_pattern("Foo").unwrap();
        assert_eq!(state.replace_all("foo FOO", "$0"), ("$0 $0".to_string(), 2));
    }

    #[test]
    fn test_update_text_keeps_current_match() {
        let mut state = searched("ab", "ab ab");
        state.next_match();
        state.next_match();
        state.update_text("xx ab ab");
        assert_eq!(state.current_range(), Some(6..8));
        state.update_text("ab");
        assert_eq!(state.current_match, None);
    }

    #[test]
    fn test_invalid_regex() {
        let mut state = SearchState::new();
        state.use_regex = true;
        assert!(matches!(state.set_pattern("(unclosed"), Err(SearchError::InvalidPattern(_))));
    }

    #[test]
    fn test_replace_current() {
        let text = "one two one";
        let mut state = searched("one", text);
        assert_eq!(state.replace_current(text, "1"), None);
        state.next_match();
        state.next_match();
        assert_eq!(state.replace_current(text, "1"), Some("one two 1".to_string()));
    }

    #[test]
    fn test_replace_all_literal() {
        let state = searched("foo", "foo foo");
        assert_eq!(state.replace_all("foo foo", "$1"), ("$1 $1".to_string(), 2));
    }
}
