//! PDS3 labels: the PVL document parser and the column layout it declares.

pub mod column;
pub mod index_label;
pub mod pvl;

pub use column::{slice_line, ColumnDescriptor, ColumnSpec, Decoded, ItemLayout};
pub use index_label::{IndexLabel, POINTER_MARKER};
pub use pvl::{PvlModule, PvlValue};
