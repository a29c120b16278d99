//! Data models for Memory Lane
//!
//! Defines the core data structures: Note, Location, UserPreferences and
//! the draft/patch shapes used to create and edit notes.
//!
//! Field names serialize in camelCase so stored records keep the shape the
//! mobile app has always written (`createdAt`, `isFavorite`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Maximum title length, in characters
pub const MAX_TITLE_CHARS: usize = 100;
/// Maximum number of tags on a note
pub const MAX_TAGS: usize = 5;
/// Maximum tag length, in characters
pub const MAX_TAG_CHARS: usize = 20;

/// Opaque note identifier
///
/// New notes get a UUID v4, but any string read back from storage is
/// accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Generate a fresh, process-unique identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, for compact display
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NoteId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NoteId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// How a note was captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    #[default]
    Quick,
    Detailed,
    Voice,
}

impl CaptureMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureMode::Quick => "quick",
            CaptureMode::Detailed => "detailed",
            CaptureMode::Voice => "voice",
        }
    }
}

impl std::fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CaptureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quick" => Ok(CaptureMode::Quick),
            "detailed" => Ok(CaptureMode::Detailed),
            "voice" => Ok(CaptureMode::Voice),
            other => Err(format!(
                "unknown capture mode '{}' (expected quick, detailed or voice)",
                other
            )),
        }
    }
}

/// Where a note was captured
///
/// `{0, 0}` with no address means "location unavailable".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            address: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// True for the `{0, 0}` placeholder used when no position was available
    pub fn is_unknown(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0 && self.address.is_none()
    }
}

/// A captured note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier
    pub id: NoteId,
    /// Optional short title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Note body, never empty once saved
    pub content: String,
    /// When this note was created
    pub created_at: DateTime<Utc>,
    /// When this note was last edited
    pub updated_at: DateTime<Utc>,
    /// Capture location
    #[serde(default)]
    pub location: Location,
    /// Labels, unique and in insertion order
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub capture_mode: CaptureMode,
}

impl Note {
    /// Create a new note with the given content and default fields
    pub fn new(content: impl Into<String>) -> Self {
        Self::with_id(NoteId::generate(), content)
    }

    /// Create a note with a specific ID
    pub fn with_id(id: impl Into<NoteId>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: None,
            content: content.into(),
            created_at: now,
            updated_at: now,
            location: Location::default(),
            tags: Vec::new(),
            is_favorite: false,
            capture_mode: CaptureMode::default(),
        }
    }

    /// Title for display, falling back to "Untitled"
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Caller-supplied fields for a new note
///
/// Anything left as `None` is filled in by the lifecycle service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteDraft {
    pub content: String,
    pub title: Option<String>,
    pub location: Option<Location>,
    pub tags: Option<Vec<String>>,
    pub is_favorite: Option<bool>,
    pub capture_mode: Option<CaptureMode>,
}

impl NoteDraft {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = Some(is_favorite);
        self
    }

    pub fn capture_mode(mut self, mode: CaptureMode) -> Self {
        self.capture_mode = Some(mode);
        self
    }
}

/// A partial edit of an existing note
///
/// `title: Some(None)` clears the title; `title: None` leaves it alone.
/// Identity, creation time and capture mode are not editable.
#[derive(Debug, Clone, PartialEq)]
pub struct NotePatch {
    pub id: NoteId,
    pub title: Option<Option<String>>,
    pub content: Option<String>,
    pub location: Option<Location>,
    pub tags: Option<Vec<String>>,
    pub is_favorite: Option<bool>,
}

impl NotePatch {
    pub fn new(id: impl Into<NoteId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            content: None,
            location: None,
            tags: None,
            is_favorite: None,
        }
    }

    pub fn title(mut self, title: Option<String>) -> Self {
        self.title = Some(title);
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = Some(is_favorite);
        self
    }

    /// True when the patch carries no field changes
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.location.is_none()
            && self.tags.is_none()
            && self.is_favorite.is_none()
    }
}

/// Colour scheme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        })
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!(
                "unknown theme '{}' (expected light, dark or system)",
                other
            )),
        }
    }
}

/// App-wide user settings
///
/// Fields missing from a stored record take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPreferences {
    pub theme: Theme,
    pub font_size: u32,
    pub animations_enabled: bool,
    pub reduced_motion: bool,
    pub default_capture_mode: CaptureMode,
    pub location_tracking_enabled: bool,
    pub voice_input_enabled: bool,
    pub auto_save: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            font_size: 16,
            animations_enabled: true,
            reduced_motion: false,
            default_capture_mode: CaptureMode::Quick,
            location_tracking_enabled: true,
            voice_input_enabled: true,
            auto_save: true,
        }
    }
}

/// Trim content and reject it if nothing is left
pub fn normalize_content(content: &str) -> Result<String, ValidationError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    Ok(trimmed.to_string())
}

/// Trim a title; blank titles become `None`
pub fn normalize_title(title: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    let len = title.chars().count();
    if len > MAX_TITLE_CHARS {
        return Err(ValidationError::TitleTooLong {
            len,
            max: MAX_TITLE_CHARS,
        });
    }
    Ok(Some(title.to_string()))
}

/// Trim tags, drop blanks and duplicates, then enforce the limits
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Result<Vec<String>, ValidationError> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.as_ref().trim();
        if tag.is_empty() || out.iter().any(|t| t == tag) {
            continue;
        }
        if tag.chars().count() > MAX_TAG_CHARS {
            return Err(ValidationError::TagTooLong {
                tag: tag.to_string(),
                max: MAX_TAG_CHARS,
            });
        }
        out.push(tag.to_string());
    }
    if out.len() > MAX_TAGS {
        return Err(ValidationError::TooManyTags {
            count: out.len(),
            max: MAX_TAGS,
        });
    }
    Ok(out)
}
