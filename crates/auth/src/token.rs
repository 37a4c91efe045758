//! Credential tokens: single-use, expiring grants tied to one user.
//!
//! A token only stores state and answers questions about it. Delivering the
//! secret (mail, etc.) and persisting the record belong to the caller, as does
//! refusing a token that is consumed or expired. Marking a token used and
//! saving it must happen in one transaction owned by the store.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use szuru_core::{DomainError, DomainResult, Entity, TokenId, UserId, Validate, ValidationError};

use crate::user::{User, UserDirectory};

/// What a token lets its holder do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    #[default]
    PasswordReset,
    EmailActivation,
}

/// Derived lifecycle state. Never stored; recomputed on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// Not used, not expired.
    Fresh,
    /// Past its expiration instant (or has none).
    Expired,
    /// Marked used. Takes precedence over expiry.
    Consumed,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    #[error("token has already been used")]
    Consumed,

    #[error("token has expired")]
    Expired,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialToken {
    id: TokenId,
    user_id: Option<UserId>,
    text: String,
    used: bool,
    expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    purpose: TokenPurpose,
}

impl CredentialToken {
    /// A blank record for a store to populate. It does not validate until the
    /// user, text and expiration are set.
    pub fn empty(id: TokenId) -> Self {
        Self {
            id,
            user_id: None,
            text: String::new(),
            used: false,
            expires_at: None,
            purpose: TokenPurpose::default(),
        }
    }

    /// Issue a fresh token. The expiration must lie strictly after `now`.
    pub fn issue(
        user_id: UserId,
        text: impl Into<String>,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if expires_at <= now {
            return Err(ValidationError::invalid(
                "expires_at",
                "must be in the future when issued",
            ));
        }

        let token = Self {
            user_id: Some(user_id),
            text: text.into(),
            expires_at: Some(expires_at),
            ..Self::empty(TokenId::new())
        };
        token.validate()?;

        tracing::debug!(
            token_id = %token.id,
            user_id = %user_id,
            expires_at = %expires_at,
            "issued credential token"
        );
        Ok(token)
    }

    /// Issue a token for `user` that lives for `ttl` from `now`.
    pub fn issue_for(
        user: &User,
        text: impl Into<String>,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        Self::issue(user.id, text, now + ttl, now)
    }

    pub fn with_purpose(mut self, purpose: TokenPurpose) -> Self {
        self.purpose = purpose;
        self
    }

    pub fn purpose(&self) -> TokenPurpose {
        self.purpose
    }

    /// The bearer secret.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn is_used(&self) -> bool {
        self.used
    }

    /// Not guarded: `set_used(false)` re-opens a consumed token. Callers that
    /// need one-way consumption enforce it themselves.
    pub fn set_used(&mut self, used: bool) {
        self.used = used;
    }

    pub fn expiration_date(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn set_expiration_date(&mut self, expires_at: impl Into<Option<DateTime<Utc>>>) {
        self.expires_at = expires_at.into();
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// Resolve the owning user. `None` when the token is orphaned or the id
    /// no longer resolves.
    pub fn user(&self, directory: &dyn UserDirectory) -> Option<User> {
        self.user_id.and_then(|id| directory.find_user_by_id(id))
    }

    /// Like [`CredentialToken::user`], as a domain error.
    pub fn require_user(&self, directory: &dyn UserDirectory) -> DomainResult<User> {
        self.user(directory).ok_or_else(DomainError::not_found)
    }

    /// Link the token to `user`, or orphan it with `None`.
    pub fn set_user(&mut self, user: Option<&User>) {
        self.user_id = user.map(|u| u.id);
    }

    /// `now > expiration`. A token without an expiration counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now > expires_at,
            None => true,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> TokenState {
        if self.used {
            TokenState::Consumed
        } else if self.is_expired_at(now) {
            TokenState::Expired
        } else {
            TokenState::Fresh
        }
    }

    /// Combine the used flag and the expiry check for a consumer deciding
    /// whether to honour the token. Changes nothing.
    pub fn ensure_usable(&self, now: DateTime<Utc>) -> Result<(), TokenRejection> {
        match self.state_at(now) {
            TokenState::Fresh => Ok(()),
            TokenState::Expired => Err(TokenRejection::Expired),
            TokenState::Consumed => Err(TokenRejection::Consumed),
        }
    }
}

impl Entity for CredentialToken {
    type Id = TokenId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Validate for CredentialToken {
    /// Structural checks only; an expired or used token is still valid to store.
    fn validate(&self) -> Result<(), ValidationError> {
        if self.user_id.is_none() {
            return Err(ValidationError::missing("user_id"));
        }
        if self.text.trim().is_empty() {
            return Err(ValidationError::missing("text"));
        }
        if self.expires_at.is_none() {
            return Err(ValidationError::missing("expires_at"));
        }
        Ok(())
    }
}

impl core::fmt::Debug for CredentialToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CredentialToken")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("text", &"<redacted>")
            .field("used", &self.used)
            .field("expires_at", &self.expires_at)
            .field("purpose", &self.purpose)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::user::InMemoryUserDirectory;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn fresh_token() -> CredentialToken {
        CredentialToken::issue(UserId::new(), "s3cr3t", now() + Duration::hours(1), now()).unwrap()
    }

    #[test]
    fn issued_token_is_fresh_and_valid() {
        let token = fresh_token();
        assert!(!token.is_used());
        assert!(token.validate().is_ok());
        assert_eq!(token.state_at(now()), TokenState::Fresh);
        assert_eq!(token.purpose(), TokenPurpose::PasswordReset);
    }

    #[test]
    fn issue_rejects_past_or_present_expiration() {
        let err = CredentialToken::issue(UserId::new(), "s3cr3t", now(), now()).unwrap_err();
        assert_eq!(err.field(), "expires_at");

        let err = CredentialToken::issue(UserId::new(), "s3cr3t", now() - Duration::seconds(1), now())
            .unwrap_err();
        assert_eq!(err.field(), "expires_at");
    }

    #[test]
    fn issue_rejects_blank_text() {
        let err = CredentialToken::issue(UserId::new(), "  ", now() + Duration::hours(1), now())
            .unwrap_err();
        assert_eq!(err, ValidationError::missing("text"));
    }

    #[test]
    fn issue_for_uses_ttl() {
        let user = User::new(UserId::new(), "alice");
        let token = CredentialToken::issue_for(&user, "s3cr3t", Duration::minutes(30), now())
            .unwrap()
            .with_purpose(TokenPurpose::EmailActivation);

        assert_eq!(token.user_id(), Some(user.id));
        assert_eq!(token.expiration_date(), Some(now() + Duration::minutes(30)));
        assert_eq!(token.purpose(), TokenPurpose::EmailActivation);
    }

    #[test]
    fn validate_requires_expiration() {
        let mut token = fresh_token();
        token.set_expiration_date(None);
        assert_eq!(token.validate(), Err(ValidationError::missing("expires_at")));
    }

    #[test]
    fn validate_requires_user() {
        let mut token = fresh_token();
        token.set_user(None);
        assert_eq!(token.validate(), Err(ValidationError::missing("user_id")));
    }

    #[test]
    fn validate_requires_text() {
        let mut token = fresh_token();
        token.set_text("");
        assert_eq!(token.validate(), Err(ValidationError::missing("text")));
    }

    #[test]
    fn empty_record_does_not_validate() {
        let token = CredentialToken::empty(TokenId::new());
        assert!(!token.is_valid());
        assert!(token.is_expired_at(now()));
    }

    #[test]
    fn expired_and_used_tokens_still_validate() {
        let mut token = fresh_token();
        token.set_used(true);
        assert!(token.validate().is_ok());
        assert!(token.is_expired_at(now() + Duration::days(1)));
        assert!(token.validate().is_ok());
    }

    #[test]
    fn mark_used() {
        let mut token = fresh_token();
        token.set_used(true);
        assert!(token.is_used());
        assert_eq!(token.state_at(now()), TokenState::Consumed);
        assert_eq!(token.ensure_usable(now()), Err(TokenRejection::Consumed));
    }

    #[test]
    fn set_used_false_reopens_token() {
        let mut token = fresh_token();
        token.set_used(true);
        token.set_used(false);
        assert!(!token.is_used());
        assert_eq!(token.ensure_usable(now()), Ok(()));
    }

    #[test]
    fn expiry_flips_after_the_instant() {
        let token = fresh_token();
        let expires_at = token.expiration_date().unwrap();

        assert!(!token.is_expired_at(expires_at - Duration::seconds(1)));
        assert!(!token.is_expired_at(expires_at));
        assert!(token.is_expired_at(expires_at + Duration::seconds(1)));
        assert_eq!(
            token.ensure_usable(expires_at + Duration::seconds(1)),
            Err(TokenRejection::Expired)
        );
    }

    #[test]
    fn consumed_wins_over_expired() {
        let mut token = fresh_token();
        token.set_used(true);
        assert_eq!(token.state_at(now() + Duration::days(30)), TokenState::Consumed);
    }

    #[test]
    fn user_is_resolved_through_directory() {
        let mut directory = InMemoryUserDirectory::new();
        let alice = User::new(UserId::new(), "alice");
        directory.insert(alice.clone());

        let mut token = fresh_token();
        token.set_user(Some(&alice));
        assert_eq!(token.user_id(), Some(alice.id));
        assert_eq!(token.user(&directory), Some(alice.clone()));
        assert_eq!(token.require_user(&directory), Ok(alice.clone()));

        token.set_user(None);
        assert_eq!(token.user_id(), None);
        assert_eq!(token.user(&directory), None);
        assert_eq!(token.require_user(&directory), Err(DomainError::NotFound));
    }

    #[test]
    fn stale_user_id_resolves_to_none() {
        let mut directory = InMemoryUserDirectory::new();
        let bob = User::new(UserId::new(), "bob");
        directory.insert(bob.clone());

        let mut token = fresh_token();
        token.set_user(Some(&bob));
        directory.remove(bob.id);

        assert_eq!(token.user_id(), Some(bob.id));
        assert_eq!(token.user(&directory), None);
    }

    #[test]
    fn debug_output_hides_secret() {
        let rendered = format!("{:?}", fresh_token());
        assert!(!rendered.contains("s3cr3t"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn persists_through_serde() {
        let token = fresh_token();
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["used"], false);
        assert_eq!(json["purpose"], "password_reset");
        assert_eq!(json["text"], "s3cr3t");

        let back: CredentialToken = serde_json::from_value(json).unwrap();
        assert_eq!(back, token);
    }
}
