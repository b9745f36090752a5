use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A contact-form submission from a site visitor
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::leads)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Lead {
    id: String,
    name: String,
    email: String,
    phone: Option<String>,
    message: String,
    /// The listing the visitor asked about, if any
    listing_id: Option<String>,
    created_at: NaiveDateTime,
}

impl Lead {
    pub fn new(
        name: String,
        email: String,
        phone: Option<String>,
        message: String,
        listing_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            name,
            email,
            phone,
            message,
            listing_id,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    pub fn get_email(&self) -> String {
        self.email.clone()
    }

    pub fn get_phone(&self) -> Option<String> {
        self.phone.clone()
    }

    pub fn get_message(&self) -> String {
        self.message.clone()
    }

    pub fn get_listing_id(&self) -> Option<String> {
        self.listing_id.clone()
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}
