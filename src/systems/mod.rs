pub mod district;
pub mod ui;
