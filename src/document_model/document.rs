use super::piece_table::{PieceTable, PieceTableError};
use super::search_state::{SearchError, SearchMatch, SearchState};
use super::undo::UndoRedoStack;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineEnding {
    Unix,    // \n (LF)
    Windows, // \r\n (CRLF)
    Mac,     // \r (CR)
}

impl LineEnding {
    pub fn detect(content: &str) -> Self {
        if content.contains("\r\n") {
            LineEnding::Windows
        } else if content.contains('\r') {
            LineEnding::Mac
        } else {
            LineEnding::Unix
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Unix => "\n",
            LineEnding::Windows => "\r\n",
            LineEnding::Mac => "\r",
        }
    }

    /// Convert any line endings in `content` to `\n`.
    pub fn normalize(content: &str) -> String {
        content.replace("\r\n", "\n").replace('\r', "\n")
    }

    /// Convert `\n` line endings to this style.
    pub fn apply(&self, content: &str) -> String {
        match self {
            LineEnding::Unix => content.to_string(),
            _ => content.replace('\n', self.as_str()),
        }
    }
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Edit(#[from] PieceTableError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error("No file name")]
    NoFileName,
}

/// One open document: its text, edit history and search session.
///
/// Text is held with `\n` line endings; the file's own style is restored on
/// save.
#[derive(Debug, Clone)]
pub struct Document {
    pub filename: Option<PathBuf>,
    pub modified: bool,
    pub line_ending: LineEnding,
    pub search: SearchState,
    table: PieceTable,
    history: UndoRedoStack,
}

impl Document {
    pub fn new() -> Self {
        Self::from_text("")
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            filename: None,
            modified: false,
            line_ending: LineEnding::Unix,
            search: SearchState::new(),
            table: PieceTable::from_text(text),
            history: UndoRedoStack::new(),
        }
    }

    pub fn open(filename: impl Into<PathBuf>) -> Result<Self, DocumentError> {
        let filename = filename.into();
        let content = fs::read_to_string(&filename)?;
        let line_ending = LineEnding::detect(&content);
        info!("opened {} ({} bytes)", filename.display(), content.len());

        let mut document = Self::from_text(LineEnding::normalize(&content));
        document.filename = Some(filename);
        document.line_ending = line_ending;
        Ok(document)
    }

    pub fn save(&mut self) -> Result<(), DocumentError> {
        let filename = self.filename.clone().ok_or(DocumentError::NoFileName)?;
        self.write_to(&filename)
    }

    pub fn save_as(&mut self, filename: impl Into<PathBuf>) -> Result<(), DocumentError> {
        let filename = filename.into();
        self.write_to(&filename)?;
        self.filename = Some(filename);
        Ok(())
    }

    fn write_to(&mut self, filename: &Path) -> Result<(), DocumentError> {
        let content = self.line_ending.apply(&self.table.materialize());
        fs::write(filename, &content)?;
        info!("wrote {} ({} bytes)", filename.display(), content.len());
        self.modified = false;
        Ok(())
    }

    pub fn text(&self) -> String {
        self.table.materialize()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn table(&self) -> &PieceTable {
        &self.table
    }

    /// Zero-based `(line, byte column)` of a byte offset in the current text.
    pub fn offset_to_position(&mut self, offset: usize) -> (usize, usize) {
        self.table.offset_to_position(offset)
    }

    pub fn history(&self) -> &UndoRedoStack {
        &self.history
    }

    pub fn insert(&mut self, at: usize, fragment: &str) -> Result<(), DocumentError> {
        let before = self.table.materialize();
        self.table.insert(at, fragment)?;
        self.record(before);
        Ok(())
    }

    pub fn delete(&mut self, start: usize, count: usize) -> Result<(), DocumentError> {
        let before = self.table.materialize();
        self.table.delete(start, count)?;
        self.record(before);
        Ok(())
    }

    /// Replace the whole text, rebuilding the table and recording the change.
    pub fn replace_text(&mut self, new_text: impl Into<String>) {
        let new_text = new_text.into();
        let before = self.table.materialize();
        if before == new_text {
            return;
        }
        self.history.push(before, new_text.as_str());
        self.set_text(new_text);
    }

    fn set_text(&mut self, text: String) {
        self.table = PieceTable::from_text(text);
        self.modified = true;
        self.text_changed();
    }

    /// Re-run the active search so match offsets follow the text.
    fn text_changed(&mut self) {
        if !self.search.pattern.is_empty() {
            let text = self.table.materialize();
            self.search.update_text(&text);
        }
    }

    fn record(&mut self, before: String) {
        let after = self.table.materialize();
        if before != after {
            self.history.push(before, after);
            self.modified = true;
            self.text_changed();
        }
    }

    /// Restore the text from before the last applied edit.
    pub fn undo(&mut self) -> bool {
        let Some(text) = self.history.undo().map(str::to_owned) else {
            return false;
        };
        debug!("undo -> {} bytes", text.len());
        self.set_text(text);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(text) = self.history.redo().map(str::to_owned) else {
            return false;
        };
        debug!("redo -> {} bytes", text.len());
        self.set_text(text);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Search for `pattern`, returning the number of matches.
    pub fn find(&mut self, pattern: &str) -> Result<usize, DocumentError> {
        self.search.set_pattern(pattern)?;
        self.refresh_search();
        Ok(self.search.match_count())
    }

    fn refresh_search(&mut self) {
        let text = self.table.materialize();
        self.search.search_text(&text);
    }

    pub fn next_match(&mut self) -> Option<SearchMatch> {
        self.search.next_match()
    }

    pub fn previous_match(&mut self) -> Option<SearchMatch> {
        self.search.previous_match()
    }

    /// Replace the current match and search again.
    pub fn replace_current(&mut self, replacement: &str) -> bool {
        let text = self.table.materialize();
        let Some(new_text) = self.search.replace_current(&text, replacement) else {
            return false;
        };
        self.replace_text(new_text);
        self.search.current_match = None;
        true
    }

    pub fn replace_all(&mut self, pattern: &str, replacement: &str) -> Result<usize, DocumentError> {
        if pattern.is_empty() {
            return Ok(0);
        }
        self.search.set_pattern(pattern)?;
        let (new_text, count) = self.search.replace_all(&self.table.materialize(), replacement);
        if count > 0 {
            self.replace_text(new_text);
        }
        self.refresh_search();
        Ok(count)
    }

    pub fn display_name(&self) -> String {
        self.filename
            .as_ref()
            .filter(|path| path.exists())
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string())
    }

    pub fn title(&self) -> String {
        let marker = if self.modified { "*" } else { "" };
        format!("{marker}{} - Text Editor", self.display_name())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_insert_records_history() {
        let mut doc = Document::from_text("hello world");
        doc.insert(6, "big ").unwrap();
        assert_eq!(doc.text(), "hello big world");
        assert!(doc.modified);
        assert!(doc.can_undo());

        assert!(doc.undo());
        assert_eq!(doc.text(), "hello world");
        assert!(doc.redo());
        assert_eq!(doc.text(), "hello big world");
        assert!(!doc.redo());
    }

    #[test]
    fn test_rejected_insert_leaves_history_alone() {
        let mut doc = Document::from_text("abc");
        assert!(matches!(
            doc.insert(10, "x"),
            Err(DocumentError::Edit(PieceTableError::InvalidOffset { .. }))
        ));
        assert!(!doc.can_undo());
        assert!(!doc.modified);
    }

    #[test]
    fn test_replace_text_skips_unchanged() {
        let mut doc = Document::from_text("same");
        doc.replace_text("same");
        assert!(!doc.can_undo());
        doc.replace_text("different");
        assert_eq!(doc.history().len(), 1);
    }

    #[test]
    fn test_edit_after_undo_drops_redo_branch() {
        let mut doc = Document::new();
        doc.insert(0, "a").unwrap();
        doc.insert(1, "b").unwrap();
        doc.undo();
        doc.insert(1, "c").unwrap();
        assert_eq!(doc.text(), "ac");
        assert!(!doc.can_redo());
        doc.undo();
        doc.undo();
        assert_eq!(doc.text(), "");
    }

    #[test]
    fn test_delete_is_undoable() {
        let mut doc = Document::from_text("Hello, Cruel World!");
        doc.delete(7, 6).unwrap();
        assert_eq!(doc.text(), "Hello, World!");
        doc.undo();
        assert_eq!(doc.text(), "Hello, Cruel World!");
    }

    #[test]
    fn test_find_and_replace_current() {
        let mut doc = Document::from_text("one two one");
        assert_eq!(doc.find("one").unwrap(), 2);
        assert_eq!(doc.next_match().map(|m| m.start), Some(0));
        assert!(doc.replace_current("1"));
        assert_eq!(doc.text(), "1 two one");
        assert_eq!(doc.search.match_count(), 1);
        assert!(doc.undo());
        assert_eq!(doc.text(), "one two one");
    }

    #[test]
    fn test_replace_all() {
        let mut doc = Document::from_text("foo bar foo");
        assert_eq!(doc.replace_all("foo", "baz").unwrap(), 2);
        assert_eq!(doc.text(), "baz bar baz");
        assert_eq!(doc.replace_all("", "x").unwrap(), 0);
        doc.undo();
        assert_eq!(doc.text(), "foo bar foo");
    }

    #[test]
    fn test_matches_follow_edits() {
        let mut doc = Document::from_text("one two one");
        doc.find("one").unwrap();
        doc.next_match();
        doc.insert(0, "XX").unwrap();
        assert_eq!(doc.search.current_range(), Some(2..5));
        assert!(doc.replace_current("1"));
        assert_eq!(doc.text(), "XX1 two one");
    }

    #[test]
    fn test_search_session_across_edits_and_history() {
        let mut doc = Document::from_text("cat hat");
        assert_eq!(doc.find("at").unwrap(), 2);

        doc.insert(7, " bat").unwrap();
        assert_eq!(doc.table().piece_count(), 2);
        assert_eq!(doc.search.results().indices(), &[1, 5, 9]);

        doc.delete(0, 4).unwrap();
        assert_eq!(doc.text(), "hat bat");
        assert_eq!(doc.search.results().indices(), &[1, 5]);

        assert!(doc.undo());
        assert_eq!(doc.search.results().indices(), &[1, 5, 9]);
        assert_eq!(doc.previous_match().map(|m| m.start), Some(9));
        assert!(doc.replace_current("ee"));
        assert_eq!(doc.text(), "cat hat bee");
        assert_eq!(doc.search.match_count(), 2);

        assert!(doc.undo());
        assert!(doc.redo());
        assert_eq!(doc.text(), "cat hat bee");
        assert_eq!(doc.replace_all("at", "og").unwrap(), 2);
        assert_eq!(doc.text(), "cog hog bee");
        assert_eq!(doc.search.match_count(), 0);
    }

    #[test]
    fn test_offset_to_position() {
        let mut doc = Document::from_text("ab\ncd");
        assert_eq!(doc.offset_to_position(4), (1, 1));
        doc.insert(0, "\n").unwrap();
        assert_eq!(doc.offset_to_position(4), (2, 0));
    }

    #[test]
    fn test_open_and_save_preserve_line_endings() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"one\r\ntwo\r\n").unwrap();

        let mut doc = Document::open(file.path()).unwrap();
        assert_eq!(doc.line_ending, LineEnding::Windows);
        assert_eq!(doc.text(), "one\ntwo\n");

        doc.insert(4, "1.5\n").unwrap();
        doc.save().unwrap();
        assert!(!doc.modified);
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "one\r\n1.5\r\ntwo\r\n");
    }

    #[test]
    fn test_save_without_filename() {
        let mut doc = Document::from_text("x");
        assert!(matches!(doc.save(), Err(DocumentError::NoFileName)));
    }

    #[test]
    fn test_title() {
        let mut doc = Document::new();
        assert_eq!(doc.title(), "Untitled - Text Editor");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        doc.insert(0, "hi").unwrap();
        assert_eq!(doc.title(), "*Untitled - Text Editor");
        doc.save_as(&path).unwrap();
        assert_eq!(doc.title(), "notes.txt - Text Editor");
    }
}
