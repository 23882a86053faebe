#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

/// Map keyed by item identity; `HashMap` with `std`, `BTreeMap` otherwise.
#[cfg(feature = "std")]
pub(crate) type KeyMap<K, V> = HashMap<K, V>;
#[cfg(not(feature = "std"))]
pub(crate) type KeyMap<K, V> = BTreeMap<K, V>;

/// Bound required of item identities used as [`crate::LayoutCache`] keys.
#[cfg(feature = "std")]
pub trait ItemKey: core::hash::Hash + Eq {}
#[cfg(feature = "std")]
impl<K: core::hash::Hash + Eq> ItemKey for K {}

/// Bound required of item identities used as [`crate::LayoutCache`] keys.
#[cfg(not(feature = "std"))]
pub trait ItemKey: Ord {}
#[cfg(not(feature = "std"))]
impl<K: Ord> ItemKey for K {}
