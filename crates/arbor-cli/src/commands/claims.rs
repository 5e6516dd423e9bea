//! `arbor issue` and `arbor verify`.

use std::fmt::Write as _;
use std::process::ExitCode;

use anyhow::Result;
use arbor_claims::{PermissionClaims, claims_allow};
use arbor_core::{OrganizationId, PrincipalId, ResolutionContext};

use crate::engine::Engine;
use crate::theme::Theme;

pub(crate) fn run_issue(
    engine: &Engine,
    principal: PrincipalId,
    org: Option<OrganizationId>,
) -> Result<ExitCode> {
    let resolver = engine.resolver()?;
    let ctx = ResolutionContext::new(principal, org);
    let set = resolver.resolve(&ctx)?;

    let issuer = engine.issuer(resolver.catalog())?;
    let token = issuer.issue(&ctx, &set)?;

    eprintln!(
        "{}",
        Theme::dimmed(&format!(
            "{} permissions, signed by {}",
            set.len(),
            issuer.verifying_key()
        ))
    );
    println!("{token}");
    Ok(ExitCode::SUCCESS)
}

pub(crate) fn run_verify(
    engine: &Engine,
    token: &str,
    public_key: Option<&str>,
    check: Option<(&str, &str)>,
) -> Result<ExitCode> {
    let verifier = engine.verifier(public_key)?;

    let claims = match verifier.verify(token) {
        Ok(claims) => claims,
        Err(e) => {
            println!("{}", Theme::error(&format!("invalid token: {e}")));
            return Ok(ExitCode::FAILURE);
        },
    };
    print!("{}", render_claims(&claims));

    let Some((permission, scope)) = check else {
        return Ok(ExitCode::SUCCESS);
    };
    if claims_allow(&verifier, Some(token), permission, scope) {
        println!("{}", Theme::success(&format!("allowed: {permission} @ {scope}")));
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{}", Theme::error(&format!("denied: {permission} @ {scope}")));
        Ok(ExitCode::FAILURE)
    }
}

pub(crate) fn render_claims(claims: &PermissionClaims) -> String {
    let mut out = format!(
        "{}\n  Subject:  {}\n  Issuer:   {}\n  Issued:   {}\n  Expires:  {}\n  Catalog:  {}\n",
        Theme::header("Valid token"),
        claims.sub,
        claims.iss,
        claims.iat,
        claims.exp,
        claims.catalog,
    );
    if let Some(org) = claims.org {
        let _ = writeln!(out, "  Org:      {org}");
    }
    for claim in &claims.perms {
        let _ = writeln!(out, "  {claim}");
    }
    if !claims.mfa.is_empty() {
        let _ = writeln!(out, "  Elevated: {}", claims.mfa.join(", "));
    }
    out
}
