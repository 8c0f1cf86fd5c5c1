//! Column roles and title-based mapping of a board schema onto them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::{BoardApi, BoardColumn};

/// Semantic purpose a board column can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    Website,
    Linkedin,
    Score,
    Location,
    Type,
    Source,
    Email,
    Notes,
    Status,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 9] = [
        ColumnRole::Website,
        ColumnRole::Linkedin,
        ColumnRole::Score,
        ColumnRole::Location,
        ColumnRole::Type,
        ColumnRole::Source,
        ColumnRole::Email,
        ColumnRole::Notes,
        ColumnRole::Status,
    ];

    /// Lowercase title fragments that identify this role.
    pub fn title_keywords(self) -> &'static [&'static str] {
        match self {
            ColumnRole::Website => &["website"],
            ColumnRole::Linkedin => &["linkedin"],
            ColumnRole::Score => &["score", "rating"],
            ColumnRole::Location => &["location"],
            ColumnRole::Type => &["type"],
            ColumnRole::Source => &["source"],
            ColumnRole::Email => &["email"],
            ColumnRole::Notes => &["notes"],
            ColumnRole::Status => &["status"],
        }
    }

    /// First role (in `ALL` order) whose keyword appears in `title`.
    pub fn for_title(title: &str) -> Option<ColumnRole> {
        let t = title.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|role| role.title_keywords().iter().any(|k| t.contains(k)))
    }
}

/// Declared column type as reported by the board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    Link,
    Text,
    Numeric,
    Rating,
    Status,
    LongText,
    Email,
    Other(String),
}

impl ColumnType {
    pub fn as_str(&self) -> &str {
        match self {
            ColumnType::Link => "link",
            ColumnType::Text => "text",
            ColumnType::Numeric => "numbers",
            ColumnType::Rating => "rating",
            ColumnType::Status => "status",
            ColumnType::LongText => "long_text",
            ColumnType::Email => "email",
            ColumnType::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for ColumnType {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "link" => ColumnType::Link,
            "text" => ColumnType::Text,
            "numbers" | "numeric" => ColumnType::Numeric,
            "rating" => ColumnType::Rating,
            "status" | "color" => ColumnType::Status,
            "long_text" | "long-text" | "long text" => ColumnType::LongText,
            "email" => ColumnType::Email,
            _ => ColumnType::Other(s),
        }
    }
}

impl From<&str> for ColumnType {
    fn from(s: &str) -> Self {
        ColumnType::from(s.to_string())
    }
}

impl From<ColumnType> for String {
    fn from(t: ColumnType) -> Self {
        t.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedColumn {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ColumnType,
}

/// Run-scoped role → column table. Missing roles are omitted from uploads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    entries: BTreeMap<ColumnRole, MappedColumn>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map each column to the first role its title matches; the first column
    /// seen for a role keeps it.
    pub fn from_columns(columns: &[BoardColumn]) -> Self {
        let mut map = Self::new();
        for col in columns {
            let Some(role) = ColumnRole::for_title(&col.title) else {
                continue;
            };
            map.entries.entry(role).or_insert_with(|| MappedColumn {
                id: col.id.clone(),
                kind: col.kind.clone(),
            });
        }
        map
    }

    pub fn insert(&mut self, role: ColumnRole, column: MappedColumn) {
        self.entries.insert(role, column);
    }

    /// Configured ids win over title matches for the same role.
    pub fn with_overrides(mut self, fixed: &HashMap<ColumnRole, MappedColumn>) -> Self {
        for (role, col) in fixed {
            self.entries.insert(*role, col.clone());
        }
        self
    }

    pub fn get(&self, role: ColumnRole) -> Option<&MappedColumn> {
        self.entries.get(&role)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColumnRole, &MappedColumn)> {
        self.entries.iter().map(|(r, c)| (*r, c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Introspect the board once and build the run's column map.
///
/// A failed schema fetch degrades to the configured ids alone (often empty);
/// the run continues either way.
pub async fn resolve_column_map(
    api: &dyn BoardApi,
    board_id: u64,
    fixed: &HashMap<ColumnRole, MappedColumn>,
) -> ColumnMap {
    match api.fetch_schema(board_id).await {
        Ok(schema) => {
            let map = ColumnMap::from_columns(&schema.columns).with_overrides(fixed);
            tracing::info!(
                board_id,
                columns = schema.columns.len(),
                mapped = map.len(),
                "board schema mapped"
            );
            for (role, col) in map.iter() {
                tracing::debug!(?role, id = %col.id, kind = col.kind.as_str(), "column role");
            }
            map
        }
        Err(e) => {
            tracing::warn!(board_id, error = %e, "schema fetch failed; uploading without column mapping");
            ColumnMap::new().with_overrides(fixed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_map_to_roles() {
        assert_eq!(ColumnRole::for_title("Company Website"), Some(ColumnRole::Website));
        assert_eq!(ColumnRole::for_title("LinkedIn URL"), Some(ColumnRole::Linkedin));
        assert_eq!(ColumnRole::for_title("Lead Score"), Some(ColumnRole::Score));
        assert_eq!(ColumnRole::for_title("Star Rating"), Some(ColumnRole::Score));
        assert_eq!(ColumnRole::for_title("Investor Type"), Some(ColumnRole::Type));
        assert_eq!(ColumnRole::for_title("Contact Email"), Some(ColumnRole::Email));
        assert_eq!(ColumnRole::for_title("Name"), None);
    }

    #[test]
    fn first_column_wins_a_role() {
        let cols = vec![
            BoardColumn::new("link_1", "Website", ColumnType::Link),
            BoardColumn::new("text_9", "Old website", ColumnType::Text),
        ];
        let map = ColumnMap::from_columns(&cols);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(ColumnRole::Website).map(|c| c.id.as_str()), Some("link_1"));
    }

    #[test]
    fn api_type_names_are_recognized() {
        assert_eq!(ColumnType::from("numbers"), ColumnType::Numeric);
        assert_eq!(ColumnType::from("color"), ColumnType::Status);
        assert_eq!(ColumnType::from("long_text"), ColumnType::LongText);
        assert_eq!(ColumnType::from("date"), ColumnType::Other("date".into()));
    }

    #[test]
    fn overrides_replace_mapped_roles() {
        let cols = vec![BoardColumn::new("text_1", "Location", ColumnType::Text)];
        let mut fixed = HashMap::new();
        fixed.insert(
            ColumnRole::Location,
            MappedColumn {
                id: "text_mkyjfhyc".into(),
                kind: ColumnType::Text,
            },
        );
        let map = ColumnMap::from_columns(&cols).with_overrides(&fixed);
        assert_eq!(map.get(ColumnRole::Location).map(|c| c.id.as_str()), Some("text_mkyjfhyc"));
    }
}
