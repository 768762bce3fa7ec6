mod test_reconnect_after_delay;
