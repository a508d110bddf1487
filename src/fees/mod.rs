// 💰 Fee schedules
//
// classify → aggregate → expand → retain_billable

pub mod aggregate;
pub mod expand;
pub mod filter;
pub mod kind;
pub mod period;

pub use aggregate::{aggregate, FeeGroup, FeeGroups};
pub use expand::{expand, expand_all, DurationShape, ExpansionMode};
pub use filter::retain_billable;
pub use kind::{classify, FeeKind};
pub use period::{FeeColumns, FeePeriod, Location, NodeMarker, PeriodMarker, FEE_HEADER};
