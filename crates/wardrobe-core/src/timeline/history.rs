use crate::error::{Result, WardrobeError};

/// A linear edit history with a cursor.
///
/// Entries are kept in insertion order. The cursor is `None` exactly when the
/// history is empty, otherwise it is a valid index. Appending while the
/// cursor is not at the tail discards every entry after the cursor first;
/// navigation never discards anything.
#[derive(Debug, Clone)]
pub struct Timeline<T> {
    entries: Vec<T>,
    cursor: Option<usize>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
        }
    }
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Truncates to `[0, cursor]`, appends `entry` and moves the cursor to it.
    ///
    /// Returns the new cursor.
    pub fn append(&mut self, entry: T) -> usize {
        let keep = self.cursor.map_or(0, |cursor| cursor + 1);
        self.entries.truncate(keep);
        self.entries.push(entry);
        let tail = self.entries.len() - 1;
        self.cursor = Some(tail);
        tail
    }

    /// Like [`append`](Self::append), but branches from `index` instead of the
    /// cursor: truncates to `[0, index]`, appends `entry` and moves the cursor
    /// to it.
    pub fn append_after(&mut self, index: usize, entry: T) -> Result<usize> {
        if index >= self.entries.len() {
            return Err(WardrobeError::OutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        self.cursor = Some(index);
        Ok(self.append(entry))
    }

    /// Jumps back to the first entry without discarding the redo tail.
    pub fn reset(&mut self) {
        if !self.entries.is_empty() {
            self.cursor = Some(0);
        }
    }

    /// Moves the cursor to `index`, rejecting indices past the tail.
    pub fn select_index(&mut self, index: usize) -> Result<()> {
        if index >= self.entries.len() {
            return Err(WardrobeError::OutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        self.cursor = Some(index);
        Ok(())
    }

    /// Steps one entry back. Returns whether the cursor moved.
    pub fn undo(&mut self) -> bool {
        match self.cursor {
            Some(cursor) if cursor > 0 => {
                self.cursor = Some(cursor - 1);
                true
            }
            _ => false,
        }
    }

    /// Steps one entry forward. Returns whether the cursor moved.
    pub fn redo(&mut self) -> bool {
        if self.can_redo() {
            self.cursor = self.cursor.map(|cursor| cursor + 1);
            true
        } else {
            false
        }
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|cursor| cursor > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.cursor
            .is_some_and(|cursor| cursor + 1 < self.entries.len())
    }

    pub fn current(&self) -> Option<&T> {
        self.cursor.and_then(|cursor| self.entries.get(cursor))
    }

    pub fn original(&self) -> Option<&T> {
        self.entries.first()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Cursor as a signed position, `-1` when empty.
    pub fn position(&self) -> isize {
        self.cursor.map_or(-1, |cursor| cursor as isize)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}
