//! Per-request recovery state
//!
//! ```text
//! Sent --2xx--------------------------------------------> Done
//! Sent --401 (private)--> Refreshing --ok--> Retried ----> Done
//!                                    \--failure---------> Done (error)
//! ```
//!
//! Only `Sent` may start a refresh, so a request is refreshed and resent at
//! most once no matter how its resend turns out.

/// Where a single logical request is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    /// First attempt is in flight
    Sent,
    /// Waiting on the refresh endpoint
    Refreshing,
    /// The original request was resubmitted with a new token
    Retried,
    /// A final answer (success or error) went back to the caller
    Done,
}

/// What to do with a 401
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthorizedAction {
    Refresh,
    Propagate,
}

impl RequestPhase {
    /// Decide how a 401 is handled in this phase
    pub const fn on_unauthorized(self, public_path: bool) -> UnauthorizedAction {
        match self {
            Self::Sent if !public_path => UnauthorizedAction::Refresh,
            _ => UnauthorizedAction::Propagate,
        }
    }

    /// Enter the refresh phase
    pub const fn begin_refresh(self) -> Self {
        match self {
            Self::Sent => Self::Refreshing,
            other => other,
        }
    }

    /// Resubmit after a successful refresh
    pub const fn retry(self) -> Self {
        match self {
            Self::Refreshing => Self::Retried,
            other => other,
        }
    }

    pub const fn finish(self) -> Self {
        Self::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_first_private_attempt_refreshes() {
        assert_eq!(
            RequestPhase::Sent.on_unauthorized(false),
            UnauthorizedAction::Refresh
        );
        assert_eq!(
            RequestPhase::Sent.on_unauthorized(true),
            UnauthorizedAction::Propagate
        );
        for phase in [
            RequestPhase::Refreshing,
            RequestPhase::Retried,
            RequestPhase::Done,
        ] {
            assert_eq!(phase.on_unauthorized(false), UnauthorizedAction::Propagate);
        }
    }

    #[test]
    fn test_transitions() {
        let phase = RequestPhase::Sent.begin_refresh();
        assert_eq!(phase, RequestPhase::Refreshing);
        let phase = phase.retry();
        assert_eq!(phase, RequestPhase::Retried);
        assert_eq!(phase.begin_refresh(), RequestPhase::Retried);
        assert_eq!(phase.finish(), RequestPhase::Done);
    }

    #[test]
    fn test_retry_requires_refresh() {
        assert_eq!(RequestPhase::Sent.retry(), RequestPhase::Sent);
    }
}
