//! Authentication outcomes

use serde_json::Value;

use crate::error::{Error, Result};

/// Terminal result of one authentication attempt.
///
/// Hosting layers interpret these as: continue with the user attached,
/// reject the request (401), or report an internal failure (500).
#[derive(Debug)]
pub enum Outcome<U> {
    /// Credentials accepted
    Success { user: U, info: Option<Value> },
    /// Expected rejection: unknown user, bad password, missing identity
    Fail(Option<Value>),
    /// Directory or callback failure, error kept unmodified
    Error(Error),
}

impl<U> Outcome<U> {
    pub fn success(user: U) -> Self {
        Outcome::Success { user, info: None }
    }

    /// Rejection carrying a human-readable reason
    pub fn fail_with(message: impl Into<String>) -> Self {
        Outcome::Fail(Some(Value::String(message.into())))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Outcome::Fail(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    pub fn user(&self) -> Option<&U> {
        match self {
            Outcome::Success { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn info(&self) -> Option<&Value> {
        match self {
            Outcome::Success { info, .. } | Outcome::Fail(info) => info.as_ref(),
            Outcome::Error(_) => None,
        }
    }

    /// Failure reason when the info is a plain message
    pub fn message(&self) -> Option<&str> {
        self.info().and_then(Value::as_str)
    }
}

/// What a verification callback reports back: the accepted user, if any,
/// plus optional info for the hosting layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Verified<U> {
    pub user: Option<U>,
    pub info: Option<Value>,
}

impl<U> Verified<U> {
    pub fn accept(user: U) -> Self {
        Self {
            user: Some(user),
            info: None,
        }
    }

    pub fn reject() -> Self {
        Self {
            user: None,
            info: None,
        }
    }

    pub fn with_info(mut self, info: impl Into<Value>) -> Self {
        self.info = Some(info.into());
        self
    }
}

impl<U> From<Result<Verified<U>>> for Outcome<U> {
    fn from(result: Result<Verified<U>>) -> Self {
        match result {
            Err(err) => Outcome::Error(err),
            Ok(Verified { user: None, info }) => Outcome::Fail(info),
            Ok(Verified {
                user: Some(user),
                info,
            }) => Outcome::Success { user, info },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_completion_error_wins() {
        let outcome: Outcome<String> =
            Err(Error::Verify(anyhow::anyhow!("boom"))).into();
        assert!(outcome.is_error());
    }

    #[test]
    fn test_completion_without_user_fails_with_info() {
        let outcome: Outcome<String> =
            Ok(Verified::reject().with_info(json!({"message": "locked"}))).into();
        assert!(outcome.is_fail());
        assert_eq!(outcome.info(), Some(&json!({"message": "locked"})));
    }

    #[test]
    fn test_completion_with_user_succeeds() {
        let outcome: Outcome<String> =
            Ok(Verified::accept("jdoe".to_string()).with_info("welcome")).into();
        assert_eq!(outcome.user().map(String::as_str), Some("jdoe"));
        assert_eq!(outcome.message(), Some("welcome"));
    }
}
