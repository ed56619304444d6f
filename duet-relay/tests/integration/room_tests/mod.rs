mod test_leave_on_disconnect;
