//! Unit tests for genboard.

mod event_bus_tests;
mod resize_tests;
