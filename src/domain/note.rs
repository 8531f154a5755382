//! Note entity: identity, editable fields and timestamps.

use crate::domain::tag::deduplicate_tags;
use crate::domain::{NoteId, Tag};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of error that occurred when constructing a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseNoteErrorKind {
    UpdatedBeforeCreated,
}

/// Error returned when constructing an invalid note.
#[derive(Debug, Clone)]
pub struct ParseNoteError {
    kind: ParseNoteErrorKind,
}

impl fmt::Display for ParseNoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParseNoteErrorKind::UpdatedBeforeCreated => {
                write!(f, "invalid note: updatedAt is earlier than createdAt")
            }
        }
    }
}

impl std::error::Error for ParseNoteError {}

/// A note with a title, free-form content and tags.
///
/// The id never changes after construction. Every setter bumps
/// `updated_at`, which is kept at or after `created_at`. Tags are unique
/// under case-insensitive comparison; the first spelling wins.
///
/// # Examples
///
/// ```
/// use notebox::domain::{Note, Tag};
///
/// let mut note = Note::new("Groceries", "bread, milk", vec![Tag::new("home").unwrap()]);
/// assert!(note.has_tag("HOME"));
/// note.set_content("bread, milk, eggs");
/// assert!(note.updated_at() >= note.created_at());
/// ```
#[derive(Clone, PartialEq)]
pub struct Note {
    id: NoteId,
    title: String,
    content: String,
    tags: Vec<Tag>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Note {
    /// Creates a new note with a fresh id and both timestamps set to now.
    pub fn new(title: impl Into<String>, content: impl Into<String>, tags: Vec<Tag>) -> Self {
        let now = Utc::now();
        Self {
            id: NoteId::new(),
            title: title.into(),
            content: content.into(),
            tags: deduplicate_tags(tags),
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a builder for rehydrating a note with a known identity.
    pub fn builder(
        id: NoteId,
        title: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> NoteBuilder {
        NoteBuilder {
            id,
            title: title.into(),
            content: String::new(),
            tags: Vec::new(),
            created_at,
            updated_at,
        }
    }

    /// Returns the note's unique identifier.
    pub fn id(&self) -> &NoteId {
        &self.id
    }

    /// Returns the note's title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the note's content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the note's tags in insertion order.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Returns when the note was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the note was last modified.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.touch();
    }

    /// Replaces all tags. Case-insensitive duplicates are dropped.
    pub fn set_tags(&mut self, tags: Vec<Tag>) {
        self.tags = deduplicate_tags(tags);
        self.touch();
    }

    /// Adds a tag unless an equal one (ignoring case) is already present.
    ///
    /// Returns true if the note changed.
    pub fn add_tag(&mut self, tag: Tag) -> bool {
        if self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        self.touch();
        true
    }

    /// Removes the tag equal to `tag` ignoring case.
    ///
    /// Returns true if the note changed.
    pub fn remove_tag(&mut self, tag: &Tag) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        if self.tags.len() == before {
            return false;
        }
        self.touch();
        true
    }

    /// Returns true if the note carries `tag`, ignoring case.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.matches(tag))
    }

    /// Case-insensitive substring match over title, content and tags.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query)
            || self.content.to_lowercase().contains(&query)
            || self.tags.iter().any(|t| t.normalized().contains(&query))
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.title, self.id.prefix())
    }
}

impl fmt::Debug for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Note")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("tags", &self.tags)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}

/// Builder for rehydrating a Note from storage or an import file.
pub struct NoteBuilder {
    id: NoteId,
    title: String,
    content: String,
    tags: Vec<Tag>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl NoteBuilder {
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Sets the tags. Duplicates are removed (first occurrence kept).
    pub fn tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = deduplicate_tags(tags);
        self
    }

    /// Builds the Note.
    ///
    /// # Errors
    ///
    /// Returns `ParseNoteError` if `updated_at` is earlier than `created_at`.
    pub fn build(self) -> Result<Note, ParseNoteError> {
        if self.updated_at < self.created_at {
            return Err(ParseNoteError {
                kind: ParseNoteErrorKind::UpdatedBeforeCreated,
            });
        }

        Ok(Note {
            id: self.id,
            title: self.title,
            content: self.content,
            tags: self.tags,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// On-disk shape of a note.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NoteRecord {
    id: NoteId,
    title: String,
    content: String,
    #[serde(default)]
    tags: Vec<Tag>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Serialize for Note {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        NoteRecord {
            id: self.id.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
            tags: self.tags.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Note {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let record = NoteRecord::deserialize(deserializer)?;

        Note::builder(record.id, record.title, record.created_at, record.updated_at)
            .content(record.content)
            .tags(record.tags)
            .build()
            .map_err(serde::de::Error::custom)
    }
}
