//! Test outcome states and summary rendering for the `test` subcommand, matching the
//! five-state model spec.md §6/§8 describes for a manifest test run.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestState {
    /// The test ran and produced the expected result.
    Pass,
    /// The test ran and did not produce the expected result.
    Fail,
    /// The test is marked as a known failure (`dawgt:approval` withdrawn, or similar)
    /// and it failed, as expected.
    XFail,
    /// A known-failure test unexpectedly passed.
    UxPass,
    /// The test was not run (e.g. an expected-result format this driver doesn't parse).
    Skip,
}

impl TestState {
    pub fn short_code(self) -> char {
        match self {
            TestState::Pass => '.',
            TestState::Fail => 'F',
            TestState::XFail => '*',
            TestState::UxPass => '!',
            TestState::Skip => '-',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TestState::Pass => "pass",
            TestState::Fail => "FAIL",
            TestState::XFail => "XFAIL",
            TestState::UxPass => "UXPASS",
            TestState::Skip => "SKIP",
        }
    }

    /// Whether this state should fail the overall suite run.
    pub fn is_failure(self) -> bool {
        matches!(self, TestState::Fail | TestState::UxPass)
    }
}

impl fmt::Display for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One test's outcome, named so `--verbose` output can point back at the manifest.
pub struct Outcome {
    pub name: String,
    pub state: TestState,
    pub detail: Option<String>,
}

#[derive(Default)]
pub struct Summary {
    pass: usize,
    fail: usize,
    xfail: usize,
    uxpass: usize,
    skip: usize,
}

impl Summary {
    pub fn record(&mut self, state: TestState) {
        match state {
            TestState::Pass => self.pass += 1,
            TestState::Fail => self.fail += 1,
            TestState::XFail => self.xfail += 1,
            TestState::UxPass => self.uxpass += 1,
            TestState::Skip => self.skip += 1,
        }
    }

    pub fn failed(&self) -> bool {
        self.fail > 0 || self.uxpass > 0
    }

    pub fn total(&self) -> usize {
        self.pass + self.fail + self.xfail + self.uxpass + self.skip
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tests: {} passed, {} failed, {} expected-failures, {} unexpected-passes, {} skipped",
            self.total(),
            self.pass,
            self.fail,
            self.xfail,
            self.uxpass,
            self.skip
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_codes_match_the_spec_alphabet() {
        assert_eq!(TestState::Pass.short_code(), '.');
        assert_eq!(TestState::Fail.short_code(), 'F');
        assert_eq!(TestState::XFail.short_code(), '*');
        assert_eq!(TestState::UxPass.short_code(), '!');
        assert_eq!(TestState::Skip.short_code(), '-');
    }

    #[test]
    fn summary_flags_fail_and_uxpass_as_failures() {
        let mut s = Summary::default();
        s.record(TestState::Pass);
        s.record(TestState::Skip);
        assert!(!s.failed());
        s.record(TestState::Fail);
        assert!(s.failed());
    }
}
