//! `mailjson`: find and extract the JSON document an email carries.
//!
//! The payload may be a JSON attachment, a JSON literal in the text body,
//! a body link to a `.json` resource, or a body link to a page that links
//! to one. [`resolve::Engine`] tries those in that order and returns the
//! first document that parses.
//!
//! ```no_run
//! use mailjson::config::FetchConfig;
//! use mailjson::fetch::HttpFetcher;
//! use mailjson::resolve::Engine;
//!
//! let engine = Engine::new(HttpFetcher::new(&FetchConfig::default()));
//! let value = mailjson::source::parse_email_file("inbox/report.eml", &engine)?;
//! println!("{value}");
//! # Ok::<(), mailjson::error::MailJsonError>(())
//! ```

pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod parser;
pub mod resolve;
pub mod source;
