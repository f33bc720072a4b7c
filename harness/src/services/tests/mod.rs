//! Tests for harness services
