//! Contract verification harness for a repository-hosting REST API.
//!
//! `harness` is the endpoint-agnostic engine (request templates, contracts,
//! retries, pagination, scheduling); `catalog` declares the scenarios that
//! exercise the API; `config` and `cli` feed the `rharness` binary.
pub mod catalog;
pub mod cli;
pub mod config;
pub mod harness;
pub mod util;
