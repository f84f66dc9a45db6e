//! Startup readiness flow.
//!
//! Determines whether the tool can hand off to the downstream invocation:
//! discover the configuration document, validate it, resolve the default
//! configuration, activate the environment. Has a validate-only variant that
//! runs the same checks without side effects, and an environment-variable
//! fallback for file-less hosts.

mod flow;

pub use flow::{
    run_startup, ExitClass, StartupFailure, StartupMode, StartupOutcome, StartupStep,
};
