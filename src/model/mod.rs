//! Core data model types: decoded messages, attachments, and resolution provenance.

pub mod attachment;
pub mod candidate;
pub mod mail;
