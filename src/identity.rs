//! Request-scoped identity of the calling principal.
//!
//! The container never reaches for ambient state: the identity is passed
//! explicitly by `&mut` through every call that needs it. When a script
//! requires authentication, the container wraps the context in an
//! [`IdentityGuard`], which puts the prior identity back when it is dropped.

use std::ops::{Deref, DerefMut};

/// The principal currently installed for a request, if any.
///
/// # Examples
///
/// ```
/// use webscript_container::IdentityContext;
///
/// let mut identity = IdentityContext::authenticated("alice");
/// assert_eq!(identity.current(), Some("alice"));
///
/// identity.clear();
/// assert!(identity.current().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityContext {
    current: Option<String>,
}

impl IdentityContext {
    /// Creates an unauthenticated context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context with `user` already installed.
    pub fn authenticated(user: impl Into<String>) -> Self {
        Self {
            current: Some(user.into()),
        }
    }

    /// Name of the current principal.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Installs `user` as the current principal.
    pub fn set_current(&mut self, user: impl Into<String>) {
        self.current = Some(user.into());
    }

    /// Removes any installed principal.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Captures the current identity and returns a guard that restores it.
    ///
    /// While the guard is alive it dereferences to the context, so
    /// authenticators may install a different principal. On drop the context
    /// is cleared and the captured principal, if any, is reinstated. This
    /// runs on every exit path, including `?` returns and unwinding.
    pub fn scoped(&mut self) -> IdentityGuard<'_> {
        let prior = self.current.clone();
        IdentityGuard { ctx: self, prior }
    }
}

/// Restores an [`IdentityContext`] to its captured value on drop.
#[derive(Debug)]
pub struct IdentityGuard<'a> {
    ctx: &'a mut IdentityContext,
    prior: Option<String>,
}

impl IdentityGuard<'_> {
    /// The identity captured when the guard was created.
    pub fn prior(&self) -> Option<&str> {
        self.prior.as_deref()
    }
}

impl Deref for IdentityGuard<'_> {
    type Target = IdentityContext;

    fn deref(&self) -> &IdentityContext {
        self.ctx
    }
}

impl DerefMut for IdentityGuard<'_> {
    fn deref_mut(&mut self) -> &mut IdentityContext {
        self.ctx
    }
}

impl Drop for IdentityGuard<'_> {
    fn drop(&mut self) {
        self.ctx.clear();
        if let Some(user) = self.prior.take() {
            self.ctx.set_current(user);
        }
        tracing::debug!(
            identity = self.ctx.current().unwrap_or("unauthenticated"),
            "Authentication reset"
        );
    }
}
