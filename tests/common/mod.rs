#![allow(dead_code)]

use twelvelabs::{Client, ClientBuilder};
use wiremock::MockServer;

pub const API_KEY: &str = "tlk_test_key";

pub fn client(server: &MockServer) -> Client {
    ClientBuilder::new()
        .api_key(API_KEY)
        .base_url(server.uri())
        .build()
        .unwrap()
}

pub fn client_with_retries(server: &MockServer, retries: u32) -> Client {
    ClientBuilder::new()
        .api_key(API_KEY)
        .base_url(server.uri())
        .max_retries(retries)
        .build()
        .unwrap()
}
