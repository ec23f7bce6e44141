pub mod signup_sheet;
pub mod team;

pub use signup_sheet::{is_valid_email, CsvSheet, SheetAppender};
pub use team::TeamService;
