//! Outbound collaborators: file storage for trainer notes and the mail relay
//! used to deliver credentials.

pub mod blob;
pub mod dto;
pub mod mail;

pub use blob::{BlobStore, HttpBlobStore, LocalBlobStore};
pub use mail::{HttpMailer, LogMailer, MailMessage, Mailer};
