//! Test fixtures for common types.

use arbor_catalog::Catalog;
use arbor_core::{GrantId, OrganizationId, PermissionName, PrincipalId, RoleGrant, RoleId, ScopePath};
use chrono::{DateTime, NaiveDate, Utc};

/// Catalog used throughout the test suites.
///
/// | role            | grants                |
/// |-----------------|-----------------------|
/// | `org-admin`     | `organization.update` |
/// | `org-viewer`    | `organization.view`   |
/// | `billing-admin` | `billing.refund`      |
/// | `member-manager`| `member.invite`       |
///
/// Implications: `organization.update -> organization.view`,
/// `billing.refund -> billing.read`, `member.invite -> member.list`.
/// `billing.refund` requires an elevated session.
pub const SAMPLE_CATALOG_TOML: &str = r#"
[[permissions]]
name = "organization.update"
display_name = "Update organization"

[[permissions]]
name = "organization.view"
display_name = "View organization"

[[permissions]]
name = "billing.refund"
display_name = "Issue refunds"
requires_mfa = true

[[permissions]]
name = "billing.read"
display_name = "Read billing data"

[[permissions]]
name = "member.invite"
display_name = "Invite members"

[[permissions]]
name = "member.list"
display_name = "List members"

[[roles]]
name = "org-admin"
permissions = ["organization.update"]

[[roles]]
name = "org-viewer"
permissions = ["organization.view"]

[[roles]]
name = "billing-admin"
permissions = ["billing.refund"]

[[roles]]
name = "member-manager"
permissions = ["member.invite"]

[[implications]]
from = "organization.update"
to = "organization.view"

[[implications]]
from = "billing.refund"
to = "billing.read"

[[implications]]
from = "member.invite"
to = "member.list"
"#;

/// Build the sample catalog.
#[must_use]
pub fn sample_catalog() -> Catalog {
    Catalog::from_toml_str(SAMPLE_CATALOG_TOML).expect("sample catalog is valid")
}

/// Catalog whose implication graph contains the cycle `a -> b -> a`.
#[must_use]
pub fn cyclic_catalog() -> Catalog {
    Catalog::from_toml_str(
        r#"
        [[permissions]]
        name = "a"
        [[permissions]]
        name = "b"
        [[roles]]
        name = "holder"
        permissions = ["a"]
        [[implications]]
        from = "a"
        to = "b"
        [[implications]]
        from = "b"
        to = "a"
        "#,
    )
    .expect("cyclic catalog is structurally valid")
}

/// Parse a scope path.
#[must_use]
pub fn scope(path: &str) -> ScopePath {
    ScopePath::parse(path).expect("valid scope path")
}

/// Parse a permission name.
#[must_use]
pub fn perm(name: &str) -> PermissionName {
    PermissionName::new(name).expect("valid permission name")
}

/// Parse a `YYYY-MM-DD` date.
#[must_use]
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

/// Fluent builder for [`RoleGrant`]s, with roles addressed by name.
#[derive(Debug, Clone)]
pub struct GrantBuilder {
    grant: RoleGrant,
}

impl GrantBuilder {
    /// Unbounded platform-level grant of `role_name` at `root`.
    #[must_use]
    pub fn new(principal: PrincipalId, role_name: &str) -> Self {
        Self {
            grant: RoleGrant::new(principal, RoleId::from_name(role_name), ScopePath::root()),
        }
    }

    /// Grant at `path`.
    #[must_use]
    pub fn at(mut self, path: &str) -> Self {
        self.grant.scope = scope(path);
        self
    }

    /// Restrict to an organization.
    #[must_use]
    pub fn in_org(mut self, organization: OrganizationId) -> Self {
        self.grant.organization = Some(organization);
        self
    }

    /// First day in force.
    #[must_use]
    pub fn valid_from(mut self, day: NaiveDate) -> Self {
        self.grant.valid_from = Some(day);
        self
    }

    /// Last day in force.
    #[must_use]
    pub fn valid_until(mut self, day: NaiveDate) -> Self {
        self.grant.valid_until = Some(day);
        self
    }

    /// Use a specific grant id.
    #[must_use]
    pub fn with_id(mut self, id: GrantId) -> Self {
        self.grant.id = id;
        self
    }

    /// Mark as superseded.
    #[must_use]
    pub fn superseded_by(mut self, id: GrantId) -> Self {
        self.grant.superseded_by = Some(id);
        self
    }

    /// Set the recording timestamp.
    #[must_use]
    pub fn granted_at(mut self, at: DateTime<Utc>) -> Self {
        self.grant.granted_at = at;
        self
    }

    /// Finish.
    #[must_use]
    pub fn build(self) -> RoleGrant {
        self.grant
    }
}

/// Install a test-friendly `tracing` subscriber once.
///
/// Honors `RUST_LOG`. Safe to call from every test.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
