//! Integration test entry point

mod pipeline_tests;
