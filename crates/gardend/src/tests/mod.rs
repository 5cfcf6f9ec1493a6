//! Test suites for the Garden daemon.

mod bootstrap_behaviour;
mod support;
