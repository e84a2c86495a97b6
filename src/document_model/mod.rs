/// Document model subsystem - Core data structures and text operations
///
/// This module contains the piece table text storage, the undo/redo history,
/// KMP search with its search session, bracket pairing, and the document that
/// ties them together for an editor front end.

pub mod brackets;
pub mod document;
pub mod ordered_list;
pub mod piece_table;
pub mod search;
pub mod search_state;
pub mod undo;

// Re-export main types for convenience
pub use document::{Document, DocumentError, LineEnding};
pub use ordered_list::{IndexError, OrderedList};
pub use piece_table::{Piece, PieceTable, PieceTableError, Source};
pub use search::{SearchResults, compute_prefix_table, replace_all, search};
pub use search_state::{SearchError, SearchMatch, SearchState};
pub use undo::{UndoRedoAction, UndoRedoStack};
