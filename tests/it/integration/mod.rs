//! Integration tests for genboard.
//!
//! These drive a headless engine through complete workflows: placement from
//! request to resolution, pointer gestures and keyboard handling.

mod interaction_tests;
mod keyboard_tests;
