mod test_shutdown_and_permissions;
mod test_stale_messages_ignored;
