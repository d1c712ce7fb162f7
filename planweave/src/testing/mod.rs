//! Test doubles for the creator and endpoint seams.

mod mocks;

pub use mocks::{MockCreator, MockEndpoint};
