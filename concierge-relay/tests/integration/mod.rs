pub mod routing_tests;
