use error_stack::{Context, Report};
use tracing_error::SpanTrace;

use crate::types;

mod impls;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// What the handlers return on failure: the [`types::Error`]
/// taxonomy entry that decides the HTTP response, plus the report
/// chain and span trace explaining what actually happened.
pub struct Error {
    report: Report<types::Error>,
    trace: SpanTrace,
}

impl Error {
    #[must_use]
    pub fn new(error_type: types::Error) -> Self {
        Self {
            report: Report::new(error_type),
            trace: SpanTrace::capture(),
        }
    }

    #[must_use]
    pub fn from_context(error_type: types::Error, context: impl Context) -> Self {
        Self {
            report: Report::new(context).change_context(error_type),
            trace: SpanTrace::capture(),
        }
    }

    #[must_use]
    pub fn from_report(error_type: types::Error, report: Report<impl Context>) -> Self {
        Self {
            report: report.change_context(error_type),
            trace: SpanTrace::capture(),
        }
    }
}

impl Error {
    #[must_use]
    pub fn as_type(&self) -> &types::Error {
        self.report.current_context()
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Error")
            .field("type", self.as_type())
            .field("report", &self.report)
            .field("trace", &self.trace)
            .finish()
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: ", self.as_type())?;
        writeln!(f, "{:?}", self.report)?;
        std::fmt::Display::fmt(&self.trace, f)
    }
}
