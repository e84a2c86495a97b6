//! Text editing core: a piece-table document model, a branch-truncating
//! undo/redo history and KMP substring search, plus the document session and
//! `.quillrc` configuration an editor front end drives them through.

pub mod config;
pub mod document_model;

pub use config::{RcConfig, RcLoader};
pub use document_model::{
    Document, PieceTable, PieceTableError, SearchResults, SearchState, UndoRedoStack, search,
};
