use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::deserialize::FromSqlRow;
use diesel::expression::AsExpression;
use diesel::prelude::*;
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum NoteCategory {
    #[default]
    General,
    Owner,
    Showing,
    Legal,
    Financial,
}

text_enum!(NoteCategory, "note category" {
    General => "general",
    Owner => "owner",
    Showing => "showing",
    Legal => "legal",
    Financial => "financial",
});
text_enum_sql!(NoteCategory);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum NotePriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

text_enum!(NotePriority, "note priority" {
    Low => "low",
    Normal => "normal",
    High => "high",
    Urgent => "urgent",
});
text_enum_sql!(NotePriority);

/// A free-text admin annotation on a listing
///
/// Notes are not removed with their listing.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::notes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Note {
    /// Unique identifier for the note (UUID v7 as string)
    id: String,

    /// The listing this note annotates
    listing_id: String,

    title: String,

    body: String,

    category: NoteCategory,

    priority: NotePriority,

    /// Whether the note shows up in the listing's note panel
    visible: bool,

    created_at: NaiveDateTime,

    updated_at: NaiveDateTime,
}

impl Note {
    /// Creates a new note
    ///
    /// ### Arguments
    ///
    /// * `listing_id` - The listing this note belongs to
    /// * `title` - Short heading
    /// * `body` - Free text
    /// * `category` - What the note is about
    /// * `priority` - How urgent it is
    /// * `visible` - Whether it is shown by default
    pub fn new(
        listing_id: String,
        title: String,
        body: String,
        category: NoteCategory,
        priority: NotePriority,
        visible: bool,
    ) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::now_v7().to_string(),
            listing_id,
            title,
            body,
            category,
            priority,
            visible,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the given changes, leaving `None` fields untouched
    pub fn apply_update(
        &mut self,
        title: Option<String>,
        body: Option<String>,
        category: Option<NoteCategory>,
        priority: Option<NotePriority>,
        visible: Option<bool>,
    ) {
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(body) = body {
            self.body = body;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if let Some(priority) = priority {
            self.priority = priority;
        }
        if let Some(visible) = visible {
            self.visible = visible;
        }
        self.updated_at = Utc::now().naive_utc();
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_listing_id(&self) -> String {
        self.listing_id.clone()
    }

    pub fn get_title(&self) -> String {
        self.title.clone()
    }

    pub fn get_body(&self) -> String {
        self.body.clone()
    }

    pub fn get_category(&self) -> NoteCategory {
        self.category
    }

    pub fn get_priority(&self) -> NotePriority {
        self.priority
    }

    pub fn get_visible(&self) -> bool {
        self.visible
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}
