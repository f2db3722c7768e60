//! Resolution tiers, candidates, and provenance of a successful match.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// One of the ordered search strategies the engine tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// An attachment named `*.json` or typed as JSON.
    Attachment,
    /// A `{ ... }` literal in the plain-text body.
    BodyLiteral,
    /// An HTML body link whose path ends in `.json`.
    DirectLink,
    /// An HTML body link to a page that links to a `.json` resource.
    PageLink,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Attachment => "attachment",
            Tier::BodyLiteral => "body-literal",
            Tier::DirectLink => "direct-link",
            Tier::PageLink => "page-link",
        };
        f.write_str(name)
    }
}

/// One thing the engine is about to test for JSON-ness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Candidate {
    /// The attachment at `index` in the message.
    Attachment {
        index: usize,
        filename: Option<String>,
    },
    /// Byte range `start..end` of the plain-text body.
    Literal { start: usize, end: usize },
    /// A URL taken straight from the HTML body.
    Link { url: String },
    /// A `.json` URL found on `page`, which was linked from the HTML body.
    PageLink { page: String, url: String },
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Candidate::Attachment {
                index,
                filename: Some(name),
            } => write!(f, "attachment #{index} '{name}'"),
            Candidate::Attachment {
                index,
                filename: None,
            } => write!(f, "attachment #{index}"),
            Candidate::Literal { start, end } => write!(f, "body text [{start}..{end}]"),
            Candidate::Link { url } => write!(f, "link {url}"),
            Candidate::PageLink { page, url } => write!(f, "link {url} (via {page})"),
        }
    }
}

/// A successful resolution: the value plus where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    /// Tier that produced the match.
    pub tier: Tier,
    /// The winning candidate.
    pub candidate: Candidate,
    /// Parsed JSON document.
    pub value: Value,
}

impl Resolution {
    /// Discard provenance and keep only the value.
    pub fn into_value(self) -> Value {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_display() {
        let c = Candidate::PageLink {
            page: "https://ex.com/".into(),
            url: "https://ex.com/d.json".into(),
        };
        assert_eq!(c.to_string(), "link https://ex.com/d.json (via https://ex.com/)");
        let c = Candidate::Attachment {
            index: 2,
            filename: None,
        };
        assert_eq!(c.to_string(), "attachment #2");
    }

    #[test]
    fn test_resolution_serializes_provenance() {
        let r = Resolution {
            tier: Tier::DirectLink,
            candidate: Candidate::Link {
                url: "https://ex.com/d.json".into(),
            },
            value: serde_json::json!({"x": 1}),
        };
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["tier"], "direct_link");
        assert_eq!(v["candidate"]["kind"], "link");
        assert_eq!(v["value"]["x"], 1);
    }
}
