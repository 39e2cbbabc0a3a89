//! gbt runs git across many repositories at once.
//!
//! Each repository gets a [`worker::RepoWorker`] that runs one git operation
//! at a time on its own thread. A [`pool::WorkerPool`] starts an operation on
//! every worker, shows progress until all of them finish, and the
//! [`report`] module turns the collected state into a status summary or a
//! merged commit log.

pub mod cli;
pub mod commands;
pub mod config;
pub mod display;
pub mod git;
pub mod pool;
pub mod progress;
pub mod report;
pub mod repos;
pub mod shell_exec;
pub mod styling;
pub mod sync;
pub mod utils;
pub mod worker;
