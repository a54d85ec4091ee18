pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{
    dim, error, header, info, qty, section, status, success, summary_row, warn,
};
pub use table::{EntryRow, ItemRow, LookupRow, PriceRow, TableBuilder, render_rows, stats_table};
pub use theme::{theme, Theme, Tone};
