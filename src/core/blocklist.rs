use crate::domain::ports::Located;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;

/// 被封鎖的都道府県集合
///
/// Matching is exact and case-sensitive: a record is blocked when its
/// prefecture equals an entry, or when an entry occurs anywhere in its
/// address. No width or whitespace normalization is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockList {
    prefectures: BTreeSet<String>,
}

impl BlockList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, prefecture: impl Into<String>) -> bool {
        self.prefectures.insert(prefecture.into())
    }

    pub fn remove(&mut self, prefecture: &str) -> bool {
        self.prefectures.remove(prefecture)
    }

    pub fn replace<I, S>(&mut self, prefectures: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefectures = prefectures.into_iter().map(Into::into).collect();
    }

    pub fn contains(&self, prefecture: &str) -> bool {
        self.prefectures.contains(prefecture)
    }

    pub fn is_empty(&self) -> bool {
        self.prefectures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.prefectures.len()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.prefectures.iter().cloned().collect()
    }

    pub fn is_blocked(&self, address: &str, prefecture: &str) -> bool {
        if !prefecture.is_empty() && self.prefectures.contains(prefecture) {
            return true;
        }

        !address.is_empty()
            && self
                .prefectures
                .iter()
                .any(|blocked| address.contains(blocked.as_str()))
    }

    pub fn blocks<T: Located>(&self, item: &T) -> bool {
        self.is_blocked(item.address(), item.prefecture())
    }

    /// Drops blocked items unless `exclude_blocked` is off or the set is empty.
    pub fn filter<T: Located>(&self, items: Vec<T>, exclude_blocked: bool) -> Vec<T> {
        if !exclude_blocked || self.is_empty() {
            return items;
        }

        items.into_iter().filter(|item| !self.blocks(item)).collect()
    }
}

impl<S: Into<String>> FromIterator<S> for BlockList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            prefectures: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Block list shared by request handlers; writes go through one lock.
#[derive(Debug, Clone, Default)]
pub struct SharedBlockList {
    inner: Arc<RwLock<BlockList>>,
}

impl SharedBlockList {
    pub fn new(initial: BlockList) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn block(&self, prefecture: &str) -> Vec<String> {
        let mut list = self.inner.write();
        if list.add(prefecture) {
            tracing::info!("🚫 Blocked prefecture: {}", prefecture);
        }
        list.to_vec()
    }

    pub fn unblock(&self, prefecture: &str) -> Vec<String> {
        let mut list = self.inner.write();
        if list.remove(prefecture) {
            tracing::info!("✅ Unblocked prefecture: {}", prefecture);
        }
        list.to_vec()
    }

    pub fn replace(&self, prefectures: Vec<String>) -> Vec<String> {
        let mut list = self.inner.write();
        list.replace(prefectures);
        tracing::info!("🔧 Block list replaced ({} entries)", list.len());
        list.to_vec()
    }

    pub fn list(&self) -> Vec<String> {
        self.inner.read().to_vec()
    }

    pub fn snapshot(&self) -> BlockList {
        self.inner.read().clone()
    }
}
