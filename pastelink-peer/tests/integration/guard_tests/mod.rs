mod test_malformed_token;
mod test_failed_offer_rolls_back;
