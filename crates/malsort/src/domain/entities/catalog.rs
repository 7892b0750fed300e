use std::collections::HashMap;

use malsort_tracker::myanimelist::{AnimeListItem, MainPicture};

pub const COMPLETED: &str = "completed";

/// One row of the user's list.
///
/// Built from a list item's `node` and `list_status` objects. `id`, `title`
/// and `main_picture` come from `node`, everything else from `list_status`.
/// If the API ever sends the same key in both objects, the `list_status`
/// value is the one kept.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: i64,
    pub title: String,
    pub main_picture: Option<MainPicture>,
    pub status: Option<String>,
    pub score: i64,
    pub num_episodes_watched: Option<i64>,
    pub is_rewatching: Option<bool>,
    pub updated_at: Option<String>,
    pub start_date: Option<String>,
    pub finish_date: Option<String>,
}

impl CatalogEntry {
    pub fn is_completed(&self) -> bool {
        self.status.as_deref() == Some(COMPLETED)
    }
}

impl From<AnimeListItem> for CatalogEntry {
    fn from(item: AnimeListItem) -> Self {
        let AnimeListItem { node, list_status } = item;

        Self {
            id: node.id,
            title: node.title,
            main_picture: node.main_picture,
            status: list_status.status,
            score: list_status.score,
            num_episodes_watched: list_status.num_episodes_watched,
            is_rewatching: list_status.is_rewatching,
            updated_at: list_status.updated_at,
            start_date: list_status.start_date,
            finish_date: list_status.finish_date,
        }
    }
}

/// Entries keyed by id, iterated in the order they were inserted.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<i64, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `entry`. An entry with an id already present replaces the old
    /// one in place.
    pub fn insert(&mut self, entry: CatalogEntry) {
        match self.index.get(&entry.id) {
            Some(&pos) => self.entries[pos] = entry,
            None => {
                self.index.insert(entry.id, self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn get(&self, id: i64) -> Option<&CatalogEntry> {
        self.index.get(&id).map(|&pos| &self.entries[pos])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn completed(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|entry| entry.is_completed())
    }
}

impl Extend<CatalogEntry> for Catalog {
    fn extend<T: IntoIterator<Item = CatalogEntry>>(&mut self, iter: T) {
        for entry in iter {
            self.insert(entry);
        }
    }
}

impl FromIterator<CatalogEntry> for Catalog {
    fn from_iter<T: IntoIterator<Item = CatalogEntry>>(iter: T) -> Self {
        let mut catalog = Catalog::new();
        catalog.extend(iter);
        catalog
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn entry(id: i64, title: &str, status: &str) -> CatalogEntry {
        CatalogEntry {
            id,
            title: title.to_string(),
            status: Some(status.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_list_item() {
        let item: AnimeListItem = serde_json::from_str(
            r#"{
                "node": {"id": 1, "title": "Cowboy Bebop", "main_picture": {"medium": "m.jpg", "large": "l.jpg"}},
                "list_status": {
                    "status": "completed",
                    "score": 9,
                    "num_episodes_watched": 26,
                    "is_rewatching": false,
                    "updated_at": "2020-03-01T21:04:00+00:00",
                    "finish_date": "2020-03-01"
                }
            }"#,
        )
        .unwrap();

        let entry = CatalogEntry::from(item);

        assert_eq!(entry.id, 1);
        assert_eq!(entry.title, "Cowboy Bebop");
        assert_eq!(entry.main_picture.unwrap().medium, "m.jpg");
        assert!(entry.status.as_deref() == Some(COMPLETED));
        assert_eq!(entry.score, 9);
        assert_eq!(entry.num_episodes_watched, Some(26));
        assert_eq!(entry.start_date, None);
        assert_eq!(entry.finish_date.as_deref(), Some("2020-03-01"));
    }

    #[test]
    fn test_catalog_keeps_insertion_order() {
        let catalog: Catalog = vec![
            entry(30, "Neon Genesis Evangelion", "completed"),
            entry(1, "Cowboy Bebop", "watching"),
            entry(6, "Trigun", "completed"),
        ]
        .into_iter()
        .collect();

        let ids = catalog.iter().map(|e| e.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![30, 1, 6]);

        let completed = catalog.completed().map(|e| e.id).collect::<Vec<_>>();
        assert_eq!(completed, vec![30, 6]);
    }

    #[test]
    fn test_catalog_replaces_duplicate_id() {
        let mut catalog = Catalog::new();
        catalog.insert(entry(1, "Cowboy Bebop", "watching"));
        catalog.insert(entry(6, "Trigun", "completed"));
        catalog.insert(entry(1, "Cowboy Bebop", "completed"));

        assert_eq!(catalog.len(), 2);
        assert!(catalog.get(1).unwrap().is_completed());
        assert_eq!(catalog.iter().next().unwrap().id, 1);
        assert!(catalog.get(20).is_none());
    }
}
