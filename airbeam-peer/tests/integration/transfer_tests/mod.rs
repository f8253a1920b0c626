mod test_close_mid_transfer;
