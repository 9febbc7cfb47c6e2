//! Token refresh lifecycle of the API client.
//!
//! A sans-IO state machine: the caller performs HTTP requests and reports
//! their outcomes, the manager answers with what to do next. Only one refresh
//! runs at a time. Requests rejected with 401 while it runs are queued and
//! are all retried, or all rejected, when it settles.

use crate::dates::Clock;
use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Caller-chosen identifier of an in-flight request
pub type RequestId = u64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
    #[serde(default)]
    pub access_expires_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    /// Requests waiting on the refresh, including the one that started it
    Refreshing { queued: Vec<RequestId> },
}

/// What the caller should do after a 401
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnauthorizedAction {
    /// Call the refresh endpoint with this token, then report the outcome
    StartRefresh { refresh_token: String },
    /// Wait for the running refresh to settle
    Queued,
    /// No refresh token; tokens were cleared and the user must sign in
    SignedOut,
    /// The request already retried once; fail it
    GiveUp,
}

/// Outcome of a settled refresh for every queued request
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Settlement {
    pub retry: Vec<RequestId>,
    pub rejected: Vec<RequestId>,
}

pub struct SessionManager<C: Clock> {
    clock: C,
    tokens: Option<Tokens>,
    state: RefreshState,
}

impl<C: Clock> SessionManager<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            tokens: None,
            state: RefreshState::Idle,
        }
    }

    pub fn with_tokens(clock: C, tokens: Tokens) -> Self {
        Self {
            clock,
            tokens: Some(tokens),
            state: RefreshState::Idle,
        }
    }

    pub fn state(&self) -> &RefreshState {
        &self.state
    }

    pub fn tokens(&self) -> Option<&Tokens> {
        self.tokens.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.tokens.is_some()
    }

    pub fn sign_in(&mut self, tokens: Tokens) {
        tracing::info!("Signed in");
        self.tokens = Some(tokens);
        self.state = RefreshState::Idle;
    }

    /// Clear tokens; any queued requests are returned as rejected
    pub fn sign_out(&mut self) -> Settlement {
        tracing::info!("Signed out");
        self.tokens = None;
        let rejected = self.take_queue();
        Settlement {
            retry: Vec::new(),
            rejected,
        }
    }

    /// `Authorization` header value for outgoing requests
    pub fn bearer(&self) -> Option<String> {
        self.tokens
            .as_ref()
            .map(|t| format!("Bearer {}", t.access))
    }

    /// True when signed out or past the access token's expiry
    ///
    /// A token without a known expiry is assumed valid until the server
    /// says otherwise.
    pub fn access_expired(&self) -> bool {
        match &self.tokens {
            None => true,
            Some(tokens) => tokens
                .access_expires_at
                .map(|at| self.clock.now() >= at)
                .unwrap_or(false),
        }
    }

    /// A request came back 401
    pub fn on_unauthorized(&mut self, request: RequestId, already_retried: bool) -> UnauthorizedAction {
        if already_retried {
            tracing::debug!("Request {} rejected after retry", request);
            return UnauthorizedAction::GiveUp;
        }

        if let RefreshState::Refreshing { queued } = &mut self.state {
            queued.push(request);
            tracing::debug!("Request {} queued behind refresh ({} waiting)", request, queued.len());
            return UnauthorizedAction::Queued;
        }

        let refresh_token = self.tokens.as_ref().and_then(|t| t.refresh.clone());
        match refresh_token {
            Some(refresh_token) => {
                tracing::debug!("Request {} starts token refresh", request);
                self.state = RefreshState::Refreshing {
                    queued: vec![request],
                };
                UnauthorizedAction::StartRefresh { refresh_token }
            }
            None => {
                tracing::warn!("Unauthorized without refresh token, signing out");
                self.tokens = None;
                UnauthorizedAction::SignedOut
            }
        }
    }

    /// The refresh endpoint returned a new access token
    ///
    /// `rotated_refresh` replaces the stored refresh token when the server
    /// issues a new one. `expires_in` is measured from the clock's now.
    pub fn refresh_succeeded(
        &mut self,
        access: String,
        rotated_refresh: Option<String>,
        expires_in: Option<Duration>,
    ) -> Result<Settlement> {
        self.ensure_refreshing("refresh_succeeded")?;

        let access_expires_at = expires_in.map(|d| self.clock.now() + d);
        let refresh = match rotated_refresh {
            Some(token) => Some(token),
            None => self.tokens.as_ref().and_then(|t| t.refresh.clone()),
        };
        self.tokens = Some(Tokens {
            access,
            refresh,
            access_expires_at,
        });

        let retry = self.take_queue();
        tracing::info!("Token refreshed, retrying {} request(s)", retry.len());
        Ok(Settlement {
            retry,
            rejected: Vec::new(),
        })
    }

    /// The refresh endpoint failed; the session ends
    pub fn refresh_failed(&mut self) -> Result<Settlement> {
        self.ensure_refreshing("refresh_failed")?;
        tracing::warn!("Token refresh failed");
        Ok(self.sign_out())
    }

    fn ensure_refreshing(&self, op: &str) -> Result<()> {
        match self.state {
            RefreshState::Refreshing { .. } => Ok(()),
            RefreshState::Idle => Err(Error::Session(format!(
                "{} called with no refresh in progress",
                op
            ))),
        }
    }

    fn take_queue(&mut self) -> Vec<RequestId> {
        match std::mem::replace(&mut self.state, RefreshState::Idle) {
            RefreshState::Refreshing { queued } => queued,
            RefreshState::Idle => Vec::new(),
        }
    }
}
