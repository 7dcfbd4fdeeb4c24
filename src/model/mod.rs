mod document;
mod hierarchy;
mod metric;
mod time_series;

pub use self::document::*;
pub use self::hierarchy::{DEFAULT_SECTIONS, HierarchyContext, HierarchyNode, Level};
pub use self::metric::*;
pub use self::time_series::TimePoint;
