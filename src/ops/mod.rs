//! Table operations: querying, grouping, statistics, ordering and name resolution

mod group;
mod order;
mod query;
mod resolve;
pub mod stats;

pub use group::{group_key, Aggregation, Aggregations, FxIndexMap, Groups, ABSENT_GROUP};
pub use order::{ColumnRef, SortOrder};
pub use query::{Condition, Operator};
pub use resolve::{Member, Resolved};
pub use stats::{Description, Reducer};
