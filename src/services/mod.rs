pub mod auth;
pub mod file_storage;
pub mod mailer;
pub mod share;
