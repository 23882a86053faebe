use crate::key::{ItemKey, KeyMap};
use crate::{LayoutItem, LayoutRect};

/// Two-tier layout cache: predicted sizes and measured sizes.
///
/// Predicted entries are computed lazily through [`LayoutItem::layout_predictor`] and memoized,
/// so the predictor runs at most once per item until the entry is overwritten or cleared.
/// Measured entries live in a separate map and never invalidate the predicted one.
#[derive(Clone, Debug)]
pub struct LayoutCache<K> {
    predicted: KeyMap<K, LayoutRect>,
    real: KeyMap<K, LayoutRect>,
}

impl<K> Default for LayoutCache<K>
where
    K: ItemKey + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> LayoutCache<K>
where
    K: ItemKey + Clone,
{
    pub fn new() -> Self {
        Self {
            predicted: KeyMap::new(),
            real: KeyMap::new(),
        }
    }

    /// Predicted layout, computed on first access.
    pub fn get<I: LayoutItem<Key = K>>(&mut self, item: &I) -> LayoutRect {
        *self
            .predicted
            .entry(item.key())
            .or_insert_with(|| item.layout_predictor())
    }

    pub fn set<I: LayoutItem<Key = K>>(&mut self, item: &I, layout: LayoutRect) {
        self.predicted.insert(item.key(), layout);
    }

    /// Measured layout, read from the item on first access.
    pub fn get_real<I: LayoutItem<Key = K>>(&mut self, item: &I) -> LayoutRect {
        *self
            .real
            .entry(item.key())
            .or_insert_with(|| item.real_layout())
    }

    pub fn set_real<I: LayoutItem<Key = K>>(&mut self, item: &I, layout: LayoutRect) {
        self.real.insert(item.key(), layout);
    }

    pub fn has_real<I: LayoutItem<Key = K>>(&self, item: &I) -> bool {
        self.real.contains_key(&item.key())
    }

    /// Read path for consumers: measured, else predicted, else a zero rect.
    ///
    /// Never computes anything.
    pub fn get_layout<I: LayoutItem<Key = K>>(&self, item: &I) -> LayoutRect {
        let key = item.key();
        self.real
            .get(&key)
            .or_else(|| self.predicted.get(&key))
            .copied()
            .unwrap_or_default()
    }

    /// Layout used for page math: measured if known, otherwise the memoized prediction.
    pub fn resolve<I: LayoutItem<Key = K>>(&mut self, item: &I) -> LayoutRect {
        if let Some(real) = self.real.get(&item.key()) {
            return *real;
        }
        self.get(item)
    }

    /// Recomputes both entries for an item whose content changed.
    pub fn update_layout<I: LayoutItem<Key = K>>(&mut self, item: &I) {
        let key = item.key();
        self.predicted.insert(key.clone(), item.layout_predictor());
        self.real.insert(key, item.real_layout());
    }

    /// Drops both entries for an item.
    pub fn invalidate<I: LayoutItem<Key = K>>(&mut self, item: &I) {
        let key = item.key();
        self.predicted.remove(&key);
        self.real.remove(&key);
    }

    pub fn predicted_len(&self) -> usize {
        self.predicted.len()
    }

    pub fn real_len(&self) -> usize {
        self.real.len()
    }

    pub fn clear(&mut self) {
        self.predicted.clear();
        self.real.clear();
    }
}
