pub mod files;

pub use files::{
    consume_test_listing, load_old_coins, read_json, store_old_coins, used_path, write_json_pretty,
    TestListing,
};
