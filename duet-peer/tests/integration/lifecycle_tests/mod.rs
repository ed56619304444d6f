mod test_end_call;
mod test_media_controls;
