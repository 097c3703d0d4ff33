use super::cancel::CancellationToken;
use super::governor::ResourceGovernor;
use super::progress::ProgressReporter;

/// Shared, read-only services handed to every workflow call of one invocation.
#[derive(Clone, Copy)]
pub struct RunContext<'a> {
    pub governor: &'a ResourceGovernor,
    pub cancel: &'a CancellationToken,
    pub reporter: &'a ProgressReporter<'a>,
}

impl<'a> RunContext<'a> {
    pub fn new(
        governor: &'a ResourceGovernor,
        cancel: &'a CancellationToken,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            governor,
            cancel,
            reporter,
        }
    }
}
