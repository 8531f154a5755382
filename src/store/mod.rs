//! In-memory keyed note collection

use crate::domain::{Note, NoteId};
use std::collections::HashMap;

/// Notes keyed by id, kept in insertion order.
///
/// `all()` exposes a contiguous slice so search engines can refer to notes
/// by position.
#[derive(Debug, Default, Clone)]
pub struct NoteStore {
    notes: Vec<Note>,
    positions: HashMap<NoteId, usize>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a note, replacing an existing note with the same id in place.
    pub fn add(&mut self, note: Note) {
        match self.positions.get(note.id()) {
            Some(&pos) => self.notes[pos] = note,
            None => {
                self.positions.insert(note.id().clone(), self.notes.len());
                self.notes.push(note);
            }
        }
    }

    /// Removes a note, returning true if it existed.
    pub fn remove(&mut self, id: &NoteId) -> bool {
        let Some(pos) = self.positions.remove(id) else {
            return false;
        };
        self.notes.remove(pos);
        for (i, note) in self.notes.iter().enumerate().skip(pos) {
            self.positions.insert(note.id().clone(), i);
        }
        true
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.positions.get(id).map(|&pos| &self.notes[pos])
    }

    /// Mutable access for in-place edits. The id must not change.
    pub fn get_mut(&mut self, id: &NoteId) -> Option<&mut Note> {
        self.positions.get(id).map(|&pos| &mut self.notes[pos])
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.positions.contains_key(id)
    }

    pub fn all(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn clear(&mut self) {
        self.notes.clear();
        self.positions.clear();
    }

    /// Notes whose id starts with `prefix`, ignoring case.
    pub fn find_by_id_prefix(&self, prefix: &str) -> Vec<&Note> {
        self.notes
            .iter()
            .filter(|n| n.id().starts_with(prefix))
            .collect()
    }

    /// Notes whose title equals `title`, ignoring case and surrounding whitespace.
    pub fn find_by_title(&self, title: &str) -> Vec<&Note> {
        let wanted = title.trim().to_lowercase();
        self.notes
            .iter()
            .filter(|n| n.title().trim().to_lowercase() == wanted)
            .collect()
    }
}
