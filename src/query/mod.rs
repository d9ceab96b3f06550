// Mon Oct 19 2026 - Alex

pub mod expression;
pub mod report;
pub mod session;

pub use expression::TypeExpression;
pub use report::{LayoutReport, ReportRow, RowKind, PADDING_ROW, VPTR_ROW};
pub use session::{LayoutSession, Snapshot};
