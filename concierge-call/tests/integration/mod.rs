pub mod engine_tests;
