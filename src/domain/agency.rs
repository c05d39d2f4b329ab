//! Agency identity and slug derivation.
//!
//! Every agency that receives records requests gets a routing slug derived
//! from its display name. Outgoing correspondence embeds the slug between
//! `#` delimiters so that replies can be routed back to the right agency
//! regardless of who at the agency answers.

use serde::{Deserialize, Serialize};

/// An external organization that is the subject of records requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agency {
    /// Display name, as configured in the contact directory.
    pub name: String,
}

impl Agency {
    /// Creates an agency from its display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the routing slug: the name with every whitespace character
    /// removed, wrapped in literal `#` on both ends.
    ///
    /// `"City Hall"` becomes `"#CityHall#"`. Slugs compare case-sensitively.
    pub fn slug(&self) -> String {
        let stripped: String = self.name.chars().filter(|c| !c.is_whitespace()).collect();
        format!("#{stripped}#")
    }

    /// Returns the mailbox label name for this agency (`agency/<name>`).
    pub fn label_name(&self) -> String {
        format!("agency/{}", self.name)
    }
}

/// The set of known agencies, in contact-directory order.
///
/// Built once per run and shared read-only by the scanner and resolver.
/// Slug lookups return the first agency whose slug matches; if two
/// configured names collapse to the same slug, the earlier one wins.
#[derive(Debug, Clone, Default)]
pub struct SlugDirectory {
    agencies: Vec<Agency>,
}

impl SlugDirectory {
    /// Builds a directory from agency names, preserving iteration order.
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        Self {
            agencies: names.into_iter().map(Agency::new).collect(),
        }
    }

    /// Returns the configured agencies in directory order.
    pub fn agencies(&self) -> &[Agency] {
        &self.agencies
    }

    /// Returns true when no agencies are configured.
    pub fn is_empty(&self) -> bool {
        self.agencies.is_empty()
    }

    /// Returns the number of configured agencies.
    pub fn len(&self) -> usize {
        self.agencies.len()
    }

    /// Looks up an agency by an unwrapped slug chunk.
    ///
    /// The chunk is re-wrapped in `#` and compared against each agency's
    /// slug in order; the first match wins.
    pub fn resolve(&self, chunk: &str) -> Option<&Agency> {
        let wrapped = format!("#{chunk}#");
        self.agencies.iter().find(|agency| agency.slug() == wrapped)
    }
}
