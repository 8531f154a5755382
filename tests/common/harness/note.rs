//! Builder for test notes with sensible defaults.

// Allow dead code since this is a test utility shared by several suites
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use notebox::domain::{Note, NoteId, Tag};

/// Builder for creating test notes with sensible defaults.
///
/// Automatically generates an ID and timestamps, with a fluent API
/// for setting optional fields.
#[derive(Debug, Clone)]
pub struct TestNote {
    id: NoteId,
    title: String,
    content: String,
    tags: Vec<Tag>,
    created: DateTime<Utc>,
}

impl TestNote {
    /// Creates a new test note with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: NoteId::new(),
            title: title.into(),
            content: String::new(),
            tags: Vec::new(),
            created: Utc::now(),
        }
    }

    /// Sets an explicit ID for the note.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into().parse().expect("Invalid NoteId");
        self
    }

    /// Adds a tag to the note.
    pub fn tag(mut self, tag: impl AsRef<str>) -> Self {
        self.tags.push(Tag::new(tag.as_ref()).expect("Invalid tag"));
        self
    }

    /// Sets the body content.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Returns the full ID.
    pub fn note_id(&self) -> &NoteId {
        &self.id
    }

    /// Returns the 10-character ID prefix.
    pub fn id_prefix(&self) -> String {
        self.id.prefix().to_string()
    }

    /// Builds the domain note.
    pub fn to_note(&self) -> Note {
        Note::builder(self.id.clone(), &self.title, self.created, self.created)
            .content(&self.content)
            .tags(self.tags.clone())
            .build()
            .expect("Invalid test note")
    }
}
