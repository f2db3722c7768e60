//! Email decoding: raw RFC 5322 bytes into the [`Message`](crate::model::mail::Message) model.

pub mod mime;
