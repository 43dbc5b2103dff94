// crates/authz-gate-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared fixtures for config validation tests.
// Purpose: Reduce duplication across integration tests for authz-gate-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use authz_gate_config::AuthzConfig;
use authz_gate_config::ConfigError;

/// Two-role configuration covering every rule shape.
pub const FIXTURE_TOML: &str = r#"
[audit]
enabled = true
log_verdicts = false

[roles.ANONYMOUS.permissions.User]
read = { id = true, name = true }

[roles.USER]
inherits = "ANONYMOUS"

[roles.USER.permissions.User]
read = { email = { predicate = "is_me" } }
write = { name = { predicate = "is_me" } }

[roles.USER.permissions.UserCreateInput]
write = "User"

[roles.USER.permissions.UserWhereUniqueInput]
write = { id = true }

[roles.USER.permissions.Thing]
read = { foo = true, bar = { predicate = "is_mine", type = "Thing" }, owner = "User" }
write = { foo = true }

[roles.USER.permissions.ThingCreateInput]
write = "Thing"

[roles.ADMIN]
inherits = "USER"

[roles.ADMIN.permissions.User]
read = true
write = true

[schema.types.Query.fields.user]
type = "User"
arguments = { where = "UserWhereUniqueInput!" }

[schema.types.Query.fields.things]
type = "[Thing!]!"

[schema.types.Mutation.fields.createUser]
type = "User!"
arguments = { data = "UserCreateInput!" }
"#;

/// Parses and validates the fixture configuration.
pub fn fixture_config() -> Result<AuthzConfig, ConfigError> {
    AuthzConfig::parse(FIXTURE_TOML)
}
