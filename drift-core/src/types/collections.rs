//! Hash-map/set aliases using the `rustc-hash` FxHash algorithm.
//!
//! Every hot-path map in the pipeline (interning tables, resolution indices,
//! per-scan accumulators) uses these instead of the stdlib `SipHash` maps —
//! FxHash is several times faster for the short string/integer keys this
//! engine deals in, at the cost of DoS resistance we don't need internally.

pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;
pub type FxHashSet<T> = rustc_hash::FxHashSet<T>;
