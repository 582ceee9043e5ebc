use serde::{Deserialize, Serialize};

/// Closed set of line-item categories shared with the extraction backend.
///
/// `Unknown` is the fallback for any label the backend cannot match confidently,
/// and for any label this crate does not recognise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Unknown,
    Groceries,
    Clothing,
    AutoRepair,
    Utilities,
    PreparedFood,
    Entertainment,
    Phone,
    Household,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Unknown,
        Category::Groceries,
        Category::Clothing,
        Category::AutoRepair,
        Category::Utilities,
        Category::PreparedFood,
        Category::Entertainment,
        Category::Phone,
        Category::Household,
    ];

    /// Label used in the extraction schema.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Unknown => "Unknown",
            Category::Groceries => "Groceries",
            Category::Clothing => "Clothing",
            Category::AutoRepair => "AutoRepair",
            Category::Utilities => "Utilities",
            Category::PreparedFood => "PreparedFood",
            Category::Entertainment => "Entertainment",
            Category::Phone => "Phone",
            Category::Household => "Household",
        }
    }

    /// Lenient lookup: unrecognised labels fall back to `Unknown`.
    pub fn from_label(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }

    fn normalize(raw: &str) -> String {
        raw.chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = Category::normalize(s);
        Category::ALL
            .iter()
            .find(|category| Category::normalize(category.label()) == wanted)
            .copied()
            .ok_or_else(|| format!("Invalid category: {}", s))
    }
}
