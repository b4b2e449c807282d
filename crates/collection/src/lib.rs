//! # Ease Collection
//!
//! A keyed set that keeps at most one value per identity key.
//!
//! The model builder stores every package, type and function it meets in a
//! [`Set`], so repeated references to the same declaration always hand back the
//! instance that was registered first. Values are expected to be cheap to clone
//! (`Arc<_>` in practice) since lookups return a clone of the stored value.
//!
//! ```rust
//! use ease_collection::Set;
//!
//! let set = Set::new();
//! let first = set.set("foo", 1);
//! let second = set.set_lazy("foo", || unreachable!("already stored"));
//!
//! assert_eq!(first, second);
//! assert_eq!(set.items(), vec![1]);
//! ```

mod set;

pub use set::Set;
