pub mod calculator_service;
