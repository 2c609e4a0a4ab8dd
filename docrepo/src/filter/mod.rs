//! Filters selecting documents for queries, updates and deletes.
//!
//! A [Filter] is a sum type of portable predicates (equality, ordering,
//! membership, regex, logical combinations) plus a [Filter::Raw] escape hatch
//! for backend-native queries.
//!
//! # Creating filters
//!
//! - `field("price").gt(30)` - comparison operators
//! - `field("color").eq("red")` - equality checks
//! - `field("color").in_array(vec!["red", "blue"])` - membership
//! - `field("car_name").regex("^R")` - pattern matching
//! - `all()` - match every document
//! - `field("a").eq(1).and(field("b").eq(2))` - logical combinations
//! - `predicate(|doc| ...)` - closure evaluated by in-process backends
//!
//! ```rust
//! use docrepo::doc;
//! use docrepo::filter::field;
//!
//! let filter = field("price").gt(30).and(field("color").eq("red"));
//! let car = doc! { price: 40, color: "red" };
//! assert!(filter.apply(&car).unwrap());
//! ```

mod evaluator;
mod filter;
mod fluent;

pub use filter::*;
pub use fluent::*;
