//! `arbor check`.

use std::process::ExitCode;

use anyhow::Result;
use arbor_core::{
    AccessDecision, AccessRequest, EffectivePermissionSet, PermissionName, ScopePath, decide,
};
use tracing::debug;

use crate::Subject;
use crate::engine::Engine;
use crate::theme::Theme;

pub(crate) fn run_check(
    engine: &Engine,
    subject: &Subject,
    permission: &str,
    scope: &str,
    elevated: bool,
) -> Result<ExitCode> {
    let set = engine
        .resolver()?
        .resolve_as_of(&subject.context(), subject.as_of())?;

    let decision = evaluate(&set, permission, scope, elevated);
    match &decision {
        Ok(AccessDecision::Allow) => {
            println!("{}", Theme::success(&format!("allowed: {permission} @ {scope}")));
        },
        Ok(AccessDecision::Deny { reason }) => {
            println!(
                "{}",
                Theme::error(&format!("denied: {permission} @ {scope} ({reason})"))
            );
        },
        Err(message) => {
            println!("{}", Theme::error(&format!("denied: {message}")));
        },
    }

    Ok(exit_code(&decision))
}

/// Decide a raw request. Unparseable input is an `Err` and denies.
pub(crate) fn evaluate(
    set: &EffectivePermissionSet,
    permission: &str,
    scope: &str,
    elevated: bool,
) -> Result<AccessDecision, String> {
    let permission = PermissionName::new(permission).map_err(|e| e.to_string())?;
    let scope = ScopePath::parse(scope).map_err(|e| e.to_string())?;
    let request = AccessRequest::new(permission, scope).elevated(elevated);
    let decision = decide(Some(set), &request);
    debug!(?request, ?decision, "access check");
    Ok(decision)
}

fn exit_code(decision: &Result<AccessDecision, String>) -> ExitCode {
    if allowed(decision) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn allowed(decision: &Result<AccessDecision, String>) -> bool {
    decision.as_ref().is_ok_and(AccessDecision::is_allowed)
}
