use std::error;
use std::fmt;

/**
 * Error to represent an invalid time-integration setup. All variants are
 * construction-time faults: once a task list is built, tasks communicate
 * retries through their status codes rather than through this type.
 */
#[derive(Debug)]
pub enum Error {
    UnknownIntegrator(String),
    UnknownTask(u64),
    InvalidConfiguration(String),
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        use Error::*;

        match self {
            UnknownIntegrator(name) => writeln!(fmt, "not a valid time integrator: {}", name),
            UnknownTask(id) => writeln!(fmt, "invalid task id: {:#x}", id),
            InvalidConfiguration(what) => writeln!(fmt, "invalid configuration: {}", what),
        }
    }
}

impl error::Error for Error {}
