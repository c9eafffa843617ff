//! Offset-stable source rewriting.
//!
//! A [`TextPatcher`] records edits against positions in the original
//! source and only applies them in [`TextPatcher::render`], so positions
//! taken from the syntax tree stay valid no matter how many edits were
//! recorded before.

use thiserror::Error;

/// Edits that cannot be applied to the original source
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("Edit at byte {second} overlaps the edit at byte {first}")]
    Overlap { first: usize, second: usize },

    #[error("Edit at byte {position} (length {len}) exceeds source length {source_len}")]
    OutOfBounds {
        position: usize,
        len: usize,
        source_len: usize,
    },

    #[error("Edit boundary at byte {0} splits a UTF-8 character")]
    NotCharBoundary(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    position: usize,
    original_len: usize,
    replacement: String,
}

/// Immutable source plus an unordered list of pending edits
#[derive(Debug, Clone)]
pub struct TextPatcher<'a> {
    source: &'a str,
    edits: Vec<Edit>,
}

impl<'a> TextPatcher<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            edits: Vec::new(),
        }
    }

    pub fn edit_count(&self) -> usize {
        self.edits.len()
    }

    pub fn insert(&mut self, position: usize, text: impl Into<String>) {
        self.replace(position, 0, text);
    }

    pub fn remove(&mut self, position: usize, len: usize) {
        self.replace(position, len, String::new());
    }

    pub fn replace(&mut self, position: usize, original_len: usize, text: impl Into<String>) {
        self.edits.push(Edit {
            position,
            original_len,
            replacement: text.into(),
        });
    }

    /// Apply all edits in position order.
    ///
    /// Edits recorded at the same position apply in recording order.
    pub fn render(&self) -> Result<String, PatchError> {
        let mut edits: Vec<&Edit> = self.edits.iter().collect();
        // stable: equal positions keep insertion order
        edits.sort_by_key(|edit| edit.position);

        let extra: usize = edits.iter().map(|edit| edit.replacement.len()).sum();
        let mut result = String::with_capacity(self.source.len() + extra);
        let mut cursor = 0;
        let mut previous: Option<usize> = None;

        for edit in edits {
            if edit.position < cursor {
                return Err(PatchError::Overlap {
                    first: previous.unwrap_or_default(),
                    second: edit.position,
                });
            }
            let end = edit.position + edit.original_len;
            if end > self.source.len() {
                return Err(PatchError::OutOfBounds {
                    position: edit.position,
                    len: edit.original_len,
                    source_len: self.source.len(),
                });
            }
            result.push_str(self.slice(cursor, edit.position)?);
            result.push_str(&edit.replacement);
            // validate the skipped range too
            self.slice(edit.position, end)?;
            cursor = end;
            previous = Some(edit.position);
        }

        result.push_str(self.slice(cursor, self.source.len())?);
        Ok(result)
    }

    fn slice(&self, start: usize, end: usize) -> Result<&'a str, PatchError> {
        self.source.get(start..end).ok_or_else(|| {
            let bad = if self.source.is_char_boundary(start) {
                end
            } else {
                start
            };
            PatchError::NotCharBoundary(bad)
        })
    }
}
