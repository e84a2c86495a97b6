use super::ordered_list::{IndexError, OrderedList};
use log::trace;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Original,
    Added,
}

/// View descriptor into either the original text or the add-log.
///
/// For `Added` pieces `start` is an offset into the concatenation of all
/// fragments; a piece never spans two fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    source: Source,
    start: usize,
    length: usize,
}

impl Piece {
    pub fn new(source: Source, start: usize, length: usize) -> Self {
        Self {
            source,
            start,
            length,
        }
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PieceTableError {
    #[error("offset {offset} is outside the document (length {len})")]
    InvalidOffset { offset: usize, len: usize },
    #[error("offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },
    #[error("range {start}..{end} is outside the document (length {len})")]
    InvalidRange { start: usize, end: usize, len: usize },
    #[error(transparent)]
    Index(#[from] IndexError),
}

struct LineIndex {
    line_starts: Vec<usize>, // Offset positions where each line starts
    valid: bool,
}

impl LineIndex {
    fn new() -> Self {
        Self {
            line_starts: vec![0],
            valid: false,
        }
    }

    fn invalidate(&mut self) {
        self.valid = false;
    }

    fn rebuild(&mut self, text: &str) {
        self.line_starts.clear();
        self.line_starts.push(0);
        self.line_starts
            .extend(text.match_indices('\n').map(|(pos, _)| pos + 1));
        self.valid = true;
    }

    fn line_of(&self, offset: usize) -> usize {
        self.line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1)
    }
}

/// Document stored as an immutable original buffer, an append-only log of
/// inserted fragments, and the ordered pieces that stitch them together.
///
/// All offsets are UTF-8 byte offsets into the logical document.
pub struct PieceTable {
    original: String,
    fragments: OrderedList<String>,
    add_length: usize,
    pieces: OrderedList<Piece>,
    total_length: usize,
    line_index: LineIndex,
}

impl PieceTable {
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// Create a table whose single piece covers `text`, even when it is empty.
    pub fn from_text(text: impl Into<String>) -> Self {
        let original = text.into();
        let length = original.len();
        let mut pieces = OrderedList::new();
        pieces.push(Piece::new(Source::Original, 0, length));
        Self {
            original,
            fragments: OrderedList::new(),
            add_length: 0,
            pieces,
            total_length: length,
            line_index: LineIndex::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.total_length
    }

    pub fn is_empty(&self) -> bool {
        self.total_length == 0
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter()
    }

    /// Insert `fragment` so that it starts at byte offset `at`.
    ///
    /// `at` must lie in `0..=len()` and on a character boundary; otherwise the
    /// table is left untouched. An offset on a piece boundary links the new
    /// piece after the piece ending there, so no zero-length pieces appear.
    pub fn insert(&mut self, at: usize, fragment: &str) -> Result<(), PieceTableError> {
        self.check_offset(at)?;
        if fragment.is_empty() {
            return Ok(());
        }

        let new_piece = Piece::new(Source::Added, self.add_length, fragment.len());

        if at == 0 {
            self.pieces.insert_at(0, new_piece)?;
        } else {
            let mut offset = 0;
            let mut target = None;
            for (i, piece) in self.pieces.iter().enumerate() {
                if offset + piece.length >= at {
                    target = Some((i, at - offset));
                    break;
                }
                offset += piece.length;
            }

            match target {
                Some((i, split)) if split == self.pieces[i].length => {
                    self.pieces.insert_at(i + 1, new_piece)?;
                }
                Some((i, split)) => {
                    let piece = self.pieces[i];
                    trace!("splitting piece {i} at {split} of {}", piece.length);
                    let right = Piece::new(piece.source, piece.start + split, piece.length - split);
                    self.pieces.insert_at(i + 1, new_piece)?;
                    self.pieces.insert_at(i + 2, right)?;
                    if let Some(left) = self.pieces.get_mut(i) {
                        left.length = split;
                    }
                }
                None => self.pieces.push(new_piece),
            }
        }

        self.fragments.push(fragment.to_string());
        self.add_length += fragment.len();
        self.total_length += fragment.len();
        self.line_index.invalidate();
        Ok(())
    }

    /// Remove `count` bytes starting at `start`.
    ///
    /// Pieces overlapping the range are shrunk, split or dropped; the original
    /// buffer and the fragments are never touched.
    pub fn delete(&mut self, start: usize, count: usize) -> Result<(), PieceTableError> {
        let end = start
            .checked_add(count)
            .filter(|&end| end <= self.total_length)
            .ok_or(PieceTableError::InvalidRange {
                start,
                end: start.saturating_add(count),
                len: self.total_length,
            })?;
        self.check_offset(start)?;
        self.check_offset(end)?;
        if count == 0 {
            return Ok(());
        }

        let mut kept = OrderedList::new();
        let mut offset = 0;
        for piece in &self.pieces {
            let piece_start = offset;
            let piece_end = offset + piece.length;
            offset = piece_end;

            if piece_end <= start || piece_start >= end {
                kept.push(*piece);
                continue;
            }
            if piece_start < start {
                kept.push(Piece::new(piece.source, piece.start, start - piece_start));
            }
            if piece_end > end {
                kept.push(Piece::new(
                    piece.source,
                    piece.start + (end - piece_start),
                    piece_end - end,
                ));
            }
        }
        kept.retain(|piece| !piece.is_empty());

        trace!(
            "deleted {start}..{end}: {} pieces -> {}",
            self.pieces.len(),
            kept.len()
        );
        self.pieces = kept;
        self.total_length -= count;
        self.line_index.invalidate();
        Ok(())
    }

    /// Build the full document text by concatenating every piece in order.
    pub fn materialize(&self) -> String {
        let mut result = String::with_capacity(self.total_length);
        for piece in &self.pieces {
            result.push_str(self.piece_text(piece));
        }
        result
    }

    pub fn line_count(&mut self) -> usize {
        self.ensure_line_index();
        self.line_index.line_starts.len()
    }

    /// Zero-based `(line, byte column)` for a byte offset, clamped to the end.
    pub fn offset_to_position(&mut self, offset: usize) -> (usize, usize) {
        self.ensure_line_index();
        let offset = offset.min(self.total_length);
        let line = self.line_index.line_of(offset);
        (line, offset - self.line_index.line_starts[line])
    }

    fn ensure_line_index(&mut self) {
        if !self.line_index.valid {
            let text = self.materialize();
            self.line_index.rebuild(&text);
        }
    }

    fn piece_text(&self, piece: &Piece) -> &str {
        let end = piece.start + piece.length;
        match piece.source {
            Source::Original => &self.original[piece.start..end],
            Source::Added => {
                let mut offset = 0;
                for fragment in &self.fragments {
                    if piece.start < offset + fragment.len() {
                        return &fragment[piece.start - offset..end - offset];
                    }
                    offset += fragment.len();
                }
                ""
            }
        }
    }

    fn byte_at(&self, position: usize) -> Option<u8> {
        let mut offset = 0;
        for piece in &self.pieces {
            if position < offset + piece.length {
                return self.piece_text(piece).as_bytes().get(position - offset).copied();
            }
            offset += piece.length;
        }
        None
    }

    fn check_offset(&self, offset: usize) -> Result<(), PieceTableError> {
        if offset > self.total_length {
            return Err(PieceTableError::InvalidOffset {
                offset,
                len: self.total_length,
            });
        }
        match self.byte_at(offset) {
            // UTF-8 continuation bytes look like 0b10xx_xxxx
            Some(byte) if byte & 0xC0 == 0x80 => Err(PieceTableError::NotCharBoundary { offset }),
            _ => Ok(()),
        }
    }
}

impl Default for PieceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for PieceTable {
    fn clone(&self) -> Self {
        Self {
            original: self.original.clone(),
            fragments: self.fragments.clone(),
            add_length: self.add_length,
            pieces: self.pieces.clone(),
            total_length: self.total_length,
            line_index: LineIndex::new(),
        }
    }
}

impl fmt::Debug for PieceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PieceTable")
            .field("length", &self.total_length)
            .field("pieces", &self.pieces)
            .field("fragments", &self.fragments.len())
            .finish()
    }
}

impl fmt::Display for PieceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for piece in &self.pieces {
            f.write_str(self.piece_text(piece))?;
        }
        Ok(())
    }
}
