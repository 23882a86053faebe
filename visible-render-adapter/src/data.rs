use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use visible_render::{DataSource, Error, LayoutItem, LayoutRect, RenderCollection, Result};

const DEFAULT_ROW_COUNT: usize = 10_000;
const DEFAULT_SEED: u64 = 0x5eed;
const MIN_ROW_HEIGHT: u32 = 30;
const ROW_HEIGHT_SPAN: u32 = 30;

/// A generated row: an id, some text and a fixed height.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataItem {
    pub id: u64,
    pub content: String,
    pub height: u32,
}

impl LayoutItem for DataItem {
    type Key = u64;

    fn key(&self) -> u64 {
        self.id
    }

    fn layout_predictor(&self) -> LayoutRect {
        LayoutRect::new(self.height)
    }

    fn real_layout(&self) -> LayoutRect {
        LayoutRect::new(self.height)
    }
}

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 11
    }

    fn next_height(&mut self) -> u32 {
        MIN_ROW_HEIGHT + (self.next_u64() % ROW_HEIGHT_SPAN as u64) as u32
    }
}

/// A [`DataSource`] of generated rows with heights in `30..60`.
///
/// Heights come from a seeded generator, so two sources built with the same seed are
/// identical. [`DataSource::refresh`] regenerates every row with the next values of the same
/// generator.
#[derive(Clone, Debug)]
pub struct DefaultDataSource {
    items: Vec<DataItem>,
    rng: Lcg,
}

impl Default for DefaultDataSource {
    fn default() -> Self {
        Self::new(DEFAULT_ROW_COUNT)
    }
}

impl DefaultDataSource {
    pub fn new(total_count: usize) -> Self {
        Self::with_seed(total_count, DEFAULT_SEED)
    }

    pub fn with_seed(total_count: usize, seed: u64) -> Self {
        let mut source = Self {
            items: Vec::with_capacity(total_count),
            rng: Lcg(seed),
        };
        source.generate(total_count);
        source
    }

    fn generate(&mut self, total_count: usize) {
        self.items.clear();
        for index in 0..total_count {
            self.items.push(DataItem {
                id: index as u64,
                content: format!("Row {}", index + 1),
                height: self.rng.next_height(),
            });
        }
    }

    pub fn total_count(&self) -> usize {
        self.items.len()
    }

    /// Height of every row, in order.
    pub fn row_heights(&self) -> impl Iterator<Item = u32> + '_ {
        self.items.iter().map(|item| item.height)
    }

    pub fn items(&self) -> &[DataItem] {
        &self.items
    }
}

impl RenderCollection for DefaultDataSource {
    type Item = DataItem;

    fn len(&self) -> usize {
        self.items.len()
    }

    fn item(&self, index: usize) -> Option<&DataItem> {
        self.items.get(index)
    }
}

impl DataSource for DefaultDataSource {
    fn update_data(&mut self, index: usize, item: DataItem) -> Result<()> {
        let count = self.items.len();
        let slot = self
            .items
            .get_mut(index)
            .ok_or(Error::OutOfBounds { index, count })?;
        *slot = item;
        Ok(())
    }

    fn refresh(&mut self) {
        let count = self.items.len();
        self.generate(count);
        rdebug!(rows = count, "data source regenerated");
    }
}
