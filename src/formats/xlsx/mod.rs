mod cell;
mod package;
mod sheet;
mod styles;
mod util;
mod worksheet;

pub use self::cell::*;
pub use self::sheet::*;
pub use self::styles::{Border, CellFormat, Color, Fill};
