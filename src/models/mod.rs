pub mod share_link;
pub mod stored_file;
pub mod user;
