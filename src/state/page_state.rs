/// Per-page outcome tracking for a harvest session
///
/// Every page the driver touches ends up in exactly one of these states.
use std::fmt;

/// Final state of a single catalog page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    /// Page was fetched and handed to the parser
    Parsed,

    /// Server kept answering 429 until retries ran out
    RateLimited,

    /// Server kept answering with a non-200 status until retries ran out
    Failed,

    /// Connection or body read kept failing until retries ran out, or the
    /// body carried no catalog grid
    Unreachable,
}

impl PageState {
    /// Returns true if the page yielded a usable body
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Parsed)
    }

    /// Returns true if the fetch ended in a terminal failure
    pub fn is_error(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Failed | Self::Unreachable)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parsed => "parsed",
            Self::RateLimited => "rate_limited",
            Self::Failed => "failed",
            Self::Unreachable => "unreachable",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
