pub mod roi;
pub mod historical;
pub mod event_impact;
