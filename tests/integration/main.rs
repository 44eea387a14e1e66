//! Integration tests for actmine.

mod cli_test;
mod helpers;
mod pipeline_test;
mod scenarios_test;
