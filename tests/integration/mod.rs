//! Integration tests for the studio gateway.
//!
//! The proxy tests point the gateway at a mock upstream serving images with
//! known bytes and content types, then check the relayed headers and bodies.

pub mod common;
pub mod download_image_test;
