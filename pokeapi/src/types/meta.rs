use serde::{Deserialize, Serialize};

/// A `{name, url}` reference to another API resource.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

/// Paginated listing returned by collection endpoints such as `/pokemon-species/`.
#[derive(Serialize, Deserialize, Debug)]
pub struct ResourceList {
    /// Total number of resources available, independent of the page size.
    pub count: u32,
    pub next: Option<String>,
    pub previous: Option<String>,
    #[serde(default)]
    pub results: Vec<NamedResource>,
}
