mod test_connection_lost;
mod test_teardown;
