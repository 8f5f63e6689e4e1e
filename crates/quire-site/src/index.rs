//! Site-wide lookup structure.
//!
//! Built fresh every build from the published items, after the first pass
//! and before the second. Never persisted.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDateTime;
use quire_content::{ContentItem, TypeRegistry, by_date_desc};

/// What the index keeps about one item.
///
/// `id` is the item's position in the build's item list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub id: usize,
    pub kind: String,
    pub slug: String,
    pub locale: String,
    pub title: String,
    pub url: String,
    pub date: Option<NaiveDateTime>,
    pub tags: BTreeSet<String>,
    pub shortname: Option<String>,
}

impl IndexEntry {
    fn from_item(id: usize, item: &ContentItem) -> Self {
        Self {
            id,
            kind: item.kind.clone(),
            slug: item.slug.clone(),
            locale: item.locale.clone(),
            title: item.title.clone(),
            url: item.url.clone(),
            date: item.date(),
            tags: item.tags().clone(),
            shortname: item.shortname().map(str::to_owned),
        }
    }
}

/// Lookups by shortname, tag and type over one build's items.
#[derive(Debug, Default)]
pub struct SiteIndex {
    entries: Vec<IndexEntry>,
    by_shortname: HashMap<String, usize>,
    /// Newest first.
    by_tag: BTreeMap<String, Vec<usize>>,
    /// In each type's listing order.
    by_type: BTreeMap<String, Vec<usize>>,
}

impl SiteIndex {
    /// Index `items`; ids are positions in the slice.
    ///
    /// `types` supplies each type's listing order. Shortnames are assumed
    /// unique, which the loader guarantees.
    #[must_use]
    pub fn build(items: &[ContentItem], types: &TypeRegistry) -> Self {
        let entries: Vec<IndexEntry> = items
            .iter()
            .enumerate()
            .map(|(id, item)| IndexEntry::from_item(id, item))
            .collect();

        let mut by_shortname = HashMap::new();
        let mut by_tag: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut by_type: BTreeMap<String, Vec<usize>> = BTreeMap::new();

        for entry in &entries {
            if let Some(shortname) = &entry.shortname {
                by_shortname.insert(shortname.clone(), entry.id);
            }
            for tag in &entry.tags {
                by_tag.entry(tag.clone()).or_default().push(entry.id);
            }
            by_type.entry(entry.kind.clone()).or_default().push(entry.id);
        }

        for ids in by_tag.values_mut() {
            ids.sort_by(|&a, &b| by_date_desc(&items[a], &items[b]));
        }
        for (kind, ids) in &mut by_type {
            match types.get(kind) {
                Ok(kind) => ids.sort_by(|&a, &b| kind.compare(&items[a], &items[b])),
                Err(_) => ids.sort_by(|&a, &b| by_date_desc(&items[a], &items[b])),
            }
        }

        tracing::debug!(
            items = entries.len(),
            tags = by_tag.len(),
            types = by_type.len(),
            "Built site index"
        );

        Self {
            entries,
            by_shortname,
            by_tag,
            by_type,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: usize) -> Option<&IndexEntry> {
        self.entries.get(id)
    }

    /// All entries, by id.
    #[must_use]
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    #[must_use]
    pub fn by_shortname(&self, shortname: &str) -> Option<&IndexEntry> {
        self.by_shortname
            .get(shortname)
            .and_then(|&id| self.entries.get(id))
    }

    /// Items carrying `tag`, newest first.
    pub fn by_tag(&self, tag: &str) -> impl Iterator<Item = &IndexEntry> {
        self.ids_to_entries(self.by_tag.get(tag))
    }

    /// Items of type `kind`, in the type's listing order.
    pub fn by_type(&self, kind: &str) -> impl Iterator<Item = &IndexEntry> {
        self.ids_to_entries(self.by_type.get(kind))
    }

    /// All tags with their item counts, alphabetically.
    pub fn tags(&self) -> impl Iterator<Item = (&str, usize)> {
        self.by_tag.iter().map(|(tag, ids)| (tag.as_str(), ids.len()))
    }

    /// Up to `limit` items sharing at least one tag with item `id`.
    ///
    /// Ranked by shared tag count descending, then newest first, then slug.
    /// The item itself is never included.
    #[must_use]
    pub fn related(&self, id: usize, limit: usize) -> Vec<&IndexEntry> {
        let Some(entry) = self.entries.get(id) else {
            return Vec::new();
        };

        let mut shared: HashMap<usize, usize> = HashMap::new();
        for tag in &entry.tags {
            for &other in self.by_tag.get(tag).into_iter().flatten() {
                if other != id {
                    *shared.entry(other).or_default() += 1;
                }
            }
        }

        let mut ranked: Vec<(usize, &IndexEntry)> = shared
            .into_iter()
            .filter_map(|(other, count)| Some((count, self.entries.get(other)?)))
            .collect();
        ranked.sort_by(|(count_a, a), (count_b, b)| {
            count_b
                .cmp(count_a)
                .then_with(|| newest_first(a.date, b.date))
                .then_with(|| a.slug.cmp(&b.slug))
                .then_with(|| a.id.cmp(&b.id))
        });
        ranked.into_iter().take(limit).map(|(_, e)| e).collect()
    }

    fn ids_to_entries<'a>(
        &'a self,
        ids: Option<&'a Vec<usize>>,
    ) -> impl Iterator<Item = &'a IndexEntry> {
        ids.into_iter()
            .flatten()
            .filter_map(|&id| self.entries.get(id))
    }
}

fn newest_first(a: Option<NaiveDateTime>, b: Option<NaiveDateTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
