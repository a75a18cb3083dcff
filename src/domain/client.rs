// Client domain model
use serde::{Deserialize, Serialize};

/// A business the agency reports on, with the upstream properties linked to
/// it. A missing property means that source simply has nothing for this
/// client; it is not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub traffic_site: Option<String>,
    #[serde(default)]
    pub seo_site: Option<String>,
    #[serde(default)]
    pub mention_project: Option<String>,
}

impl Client {
    /// Case-insensitive match against id and display name, used by the
    /// directory search. A blank query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.name.to_lowercase().contains(&query)
            || self.id.to_lowercase().contains(&query)
    }
}
