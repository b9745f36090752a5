pub mod auth;
pub mod lead;
pub mod listing;
pub mod note;
pub mod upload;
