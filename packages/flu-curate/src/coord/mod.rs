pub mod column_sets;
pub mod groups;
pub mod position;

pub use column_sets::ColumnSets;
pub use position::{AlnCol, ProfilePos, QueryPos};
