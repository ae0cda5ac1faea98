pub mod calendar_grid;
pub mod date_key;
pub mod day_detail;
pub mod month_aggregate;
pub mod note;
