//! The script abstraction the container executes.

use crate::description::Description;
use crate::error::Result;
use crate::identity::IdentityContext;
use crate::request::ScriptRequest;
use crate::response::ScriptResponse;

/// A registered web script.
///
/// Implementations write their output to the response and may consult the
/// identity installed by the container. They are invoked once per
/// transaction attempt.
pub trait WebScript: Send + Sync {
    /// Description the container uses to pick the execution policy.
    fn description(&self) -> &Description;

    /// Runs the script.
    ///
    /// # Errors
    ///
    /// I/O errors from the response writer should be propagated as
    /// [`Error::Io`](crate::Error::Io); the container passes them through unchanged.
    fn execute(
        &self,
        req: &ScriptRequest,
        res: &mut dyn ScriptResponse,
        identity: &IdentityContext,
    ) -> Result<()>;
}

/// A [`WebScript`] backed by a closure.
///
/// # Examples
///
/// ```
/// use std::io::Write;
/// use webscript_container::{
///     Description, FnWebScript, RequiredAuthentication, RequiredTransaction,
/// };
///
/// let script = FnWebScript::new(
///     Description::new("hello.get", RequiredAuthentication::None, RequiredTransaction::None),
///     |_req, res, _identity| {
///         write!(res.writer(), "hello")?;
///         Ok(())
///     },
/// );
/// ```
pub struct FnWebScript<F> {
    description: Description,
    f: F,
}

impl<F> FnWebScript<F>
where
    F: Fn(&ScriptRequest, &mut dyn ScriptResponse, &IdentityContext) -> Result<()> + Send + Sync,
{
    /// Wraps `f` under `description`.
    pub fn new(description: Description, f: F) -> Self {
        Self { description, f }
    }
}

impl<F> WebScript for FnWebScript<F>
where
    F: Fn(&ScriptRequest, &mut dyn ScriptResponse, &IdentityContext) -> Result<()> + Send + Sync,
{
    fn description(&self) -> &Description {
        &self.description
    }

    fn execute(
        &self,
        req: &ScriptRequest,
        res: &mut dyn ScriptResponse,
        identity: &IdentityContext,
    ) -> Result<()> {
        (self.f)(req, res, identity)
    }
}
