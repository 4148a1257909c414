use uuid::Uuid;

use super::entities::FeeRecord;

#[derive(Clone, Debug, PartialEq)]
pub struct ProductEntry {
    pub id: Uuid,
    pub record: FeeRecord,
}

/// Ordered working set of products, owned by the caller and handed to the
/// renderer by reference.
#[derive(Clone, Debug, Default)]
pub struct ProductCollection {
    entries: Vec<ProductEntry>,
}

impl ProductCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: FeeRecord) -> Uuid {
        let id = Uuid::new_v4();
        self.entries.push(ProductEntry { id, record });
        id
    }

    /// Removes every entry whose id is listed. Returns how many were dropped.
    pub fn remove(&mut self, ids: &[Uuid]) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| !ids.contains(&entry.id));
        before - self.entries.len()
    }

    /// Removes by position, highest index first so earlier removals don't shift
    /// later ones. Out-of-range and duplicate indices are ignored.
    pub fn remove_indices(&mut self, indices: &[usize]) -> usize {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        sorted.dedup();

        let mut removed = 0;
        for index in sorted {
            if index < self.entries.len() {
                self.entries.remove(index);
                removed += 1;
            }
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductEntry> {
        self.entries.iter()
    }

    /// Records in insertion order, ready for rendering.
    pub fn records(&self) -> Vec<FeeRecord> {
        self.entries.iter().map(|entry| entry.record.clone()).collect()
    }

    /// One-line selection labels, e.g. `"2. Mouse Gamer - R$ 89.90"`.
    pub fn labels(&self, currency: &str) -> Vec<String> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| match entry.record.price {
                Some(price) => format!(
                    "{}. {} - {currency} {price:.2}",
                    index + 1,
                    entry.record.title
                ),
                None => format!("{}. {} - Price not found", index + 1, entry.record.title),
            })
            .collect()
    }
}
