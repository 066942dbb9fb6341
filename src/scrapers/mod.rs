pub mod base;
pub mod yahoo;
pub mod calendar;
