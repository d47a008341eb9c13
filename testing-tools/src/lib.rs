// Testing Tools Library
//
// This crate provides testing utilities and tools for the Tebex webhook receiver.
// Currently includes:
// - webhook-test-client: signs sample Tebex deliveries and checks how a running
//   receiver answers them

pub mod output;
pub mod payloads;
pub mod scenarios;
pub mod webhook_client;
