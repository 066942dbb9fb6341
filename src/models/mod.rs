pub mod price;
pub mod roi;
pub mod analysis;
pub mod calendar;
