//! Ownership guard for owner-protected records.

use crate::error::AuthorizationError;
use crate::normalize::same_identity;
use std::collections::BTreeSet;

/// The identity performing a request, as established by the auth layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actor {
    pub name: Option<String>,
    pub privileged: bool,
}

impl Actor {
    /// An ordinary contributor.
    pub fn contributor(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            privileged: false,
        }
    }

    /// A privileged caller, optionally also named.
    pub fn privileged(name: Option<String>) -> Self {
        Self {
            name,
            privileged: true,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.trim().is_empty())
    }

    /// Whether the actor may attempt a write at all.
    pub fn is_identified(&self) -> bool {
        self.privileged || self.name().is_some()
    }
}

/// A named set of fields any contributor may change on someone else's record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarveOut {
    pub name: String,
    pub fields: BTreeSet<String>,
}

impl CarveOut {
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Flagging a record as erroneous.
    pub fn error_flag() -> Self {
        Self::new("error_flag", ["error_flag", "error_description", "error_updater"])
    }

    /// True when `changed` is non-empty and entirely inside this carve-out.
    pub fn covers(&self, changed: &BTreeSet<String>) -> bool {
        !changed.is_empty() && changed.iter().all(|field| self.fields.contains(field))
    }
}

/// Why a change was allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    Owner,
    Privileged,
    /// The record has no owner to protect.
    Unowned,
    /// Allowed through the named carve-out.
    CarveOut(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipGuard {
    carve_outs: Vec<CarveOut>,
}

impl Default for OwnershipGuard {
    fn default() -> Self {
        Self::new(vec![CarveOut::error_flag()])
    }
}

impl OwnershipGuard {
    pub fn new(carve_outs: Vec<CarveOut>) -> Self {
        Self { carve_outs }
    }

    pub fn carve_outs(&self) -> &[CarveOut] {
        &self.carve_outs
    }

    /// Decide whether `actor` may change `changed` on a record owned by `owner`.
    pub fn authorize_change(
        &self,
        owner: Option<&str>,
        actor: &Actor,
        changed: &BTreeSet<String>,
    ) -> Result<Authorization, AuthorizationError> {
        if let Some(granted) = self.authorize_identity(owner, actor) {
            return Ok(granted);
        }
        if let Some(carve_out) = self.carve_outs.iter().find(|c| c.covers(changed)) {
            return Ok(Authorization::CarveOut(carve_out.name.clone()));
        }
        Err(deny(owner, actor))
    }

    /// Deletion follows the same rule with no carve-out.
    pub fn authorize_delete(
        &self,
        owner: Option<&str>,
        actor: &Actor,
    ) -> Result<Authorization, AuthorizationError> {
        self.authorize_identity(owner, actor)
            .ok_or_else(|| deny(owner, actor))
    }

    fn authorize_identity(&self, owner: Option<&str>, actor: &Actor) -> Option<Authorization> {
        if actor.privileged {
            return Some(Authorization::Privileged);
        }
        let owner = owner.filter(|o| !o.trim().is_empty());
        match (owner, actor.name()) {
            (None, _) => Some(Authorization::Unowned),
            (Some(owner), Some(name)) if same_identity(owner, name) => Some(Authorization::Owner),
            _ => None,
        }
    }
}

fn deny(owner: Option<&str>, actor: &Actor) -> AuthorizationError {
    match actor.name() {
        Some(name) => AuthorizationError::OwnershipMismatch {
            owner: owner.unwrap_or_default().to_string(),
            requester: name.to_string(),
        },
        None => AuthorizationError::MissingIdentity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_owner_may_change_anything() {
        let guard = OwnershipGuard::default();
        let result = guard.authorize_change(
            Some("Finwen"),
            &Actor::contributor(" finwen "),
            &fields(&["resource", "carbon", "error_flag"]),
        );
        assert_eq!(result, Ok(Authorization::Owner));
    }

    #[test]
    fn test_non_owner_limited_to_carve_out() {
        let guard = OwnershipGuard::default();
        let actor = Actor::contributor("Dommaarraa");

        assert_eq!(
            guard.authorize_change(
                Some("Finwen"),
                &actor,
                &fields(&["error_flag", "error_description"])
            ),
            Ok(Authorization::CarveOut("error_flag".to_string()))
        );
        assert_eq!(
            guard.authorize_change(Some("Finwen"), &actor, &fields(&["error_flag", "carbon"])),
            Err(AuthorizationError::OwnershipMismatch {
                owner: "Finwen".to_string(),
                requester: "Dommaarraa".to_string(),
            })
        );
    }

    #[test]
    fn test_empty_change_set_never_uses_carve_out() {
        let guard = OwnershipGuard::default();
        let result = guard.authorize_change(
            Some("Finwen"),
            &Actor::contributor("Dommaarraa"),
            &BTreeSet::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_prefix_alone_is_not_enough() {
        let guard = OwnershipGuard::default();
        let result = guard.authorize_change(
            Some("Finwen"),
            &Actor::contributor("Dommaarraa"),
            &fields(&["error_flag", "error_screenshot"]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_privileged_and_unowned() {
        let guard = OwnershipGuard::default();
        let changed = fields(&["carbon"]);
        assert_eq!(
            guard.authorize_change(Some("Finwen"), &Actor::privileged(None), &changed),
            Ok(Authorization::Privileged)
        );
        assert_eq!(
            guard.authorize_change(None, &Actor::contributor("Dommaarraa"), &changed),
            Ok(Authorization::Unowned)
        );
    }

    #[test]
    fn test_delete_has_no_carve_out() {
        let guard = OwnershipGuard::default();
        assert_eq!(
            guard.authorize_delete(Some("Finwen"), &Actor::contributor("Finwen")),
            Ok(Authorization::Owner)
        );
        assert!(guard
            .authorize_delete(Some("Finwen"), &Actor::contributor("Dommaarraa"))
            .is_err());
        assert_eq!(
            guard.authorize_delete(Some("Finwen"), &Actor::anonymous()),
            Err(AuthorizationError::MissingIdentity)
        );
    }

    #[test]
    fn test_custom_carve_out() {
        let guard = OwnershipGuard::new(vec![CarveOut::new("notes", ["notes", "image_url"])]);
        assert_eq!(
            guard.authorize_change(
                Some("Finwen"),
                &Actor::contributor("Marlon Blake"),
                &fields(&["notes"])
            ),
            Ok(Authorization::CarveOut("notes".to_string()))
        );
    }
}
