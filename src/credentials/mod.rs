//! Credential and privilege bootstrap
//!
//! Runs against the temporary server on the fresh-init path:
//! 1. timezone tables (unless skipped)
//! 2. root password: generated, explicit or empty
//! 3. the [`PrivilegeGrantPlan`] batches, first one without a password
//!
//! Root password expiry is a separate step, issued after init scripts.

mod password;
mod plan;
mod sql;
mod timezone;

use std::fmt;

use crate::config::{RootPasswordSource, RuntimeConfig, Settings};
use crate::engine::{Access, EngineResult, SqlInput, SqlSession};
use crate::observability::Logger;

pub use password::{generate_root_password, GENERATED_PASSWORD_BYTES};
pub use plan::{BatchAuth, PrivilegeGrantPlan, SqlBatch, ANY_HOST, LOCALHOST, SAMPLE_DATABASE};
pub use sql::{account, escape_string_literal, grant_schema_pattern, quote_identifier, string_literal};
pub use timezone::{filter_benign_warnings, load_timezones, timezone_sql, BENIGN_TZ_WARNINGS, SYSTEM_SCHEMA};

/// Effective root password after bootstrap
#[derive(Clone, PartialEq, Eq)]
pub struct RootCredential {
    password: String,
    generated: bool,
}

impl RootCredential {
    pub fn password(&self) -> &str {
        &self.password
    }

    #[cfg(test)]
    fn generated(&self) -> bool {
        self.generated
    }

    fn access(&self, auth: BatchAuth) -> Access<'_> {
        match auth {
            BatchAuth::Passwordless => Access::Passwordless,
            BatchAuth::Root => Access::Root(&self.password),
        }
    }
}

impl fmt::Debug for RootCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootCredential")
            .field("password", &"<redacted>")
            .field("generated", &self.generated)
            .finish()
    }
}

/// Provisions root and application accounts on the temporary server
pub struct CredentialBootstrapper<'a> {
    config: &'a RuntimeConfig,
    settings: &'a Settings,
}

impl<'a> CredentialBootstrapper<'a> {
    pub fn new(config: &'a RuntimeConfig, settings: &'a Settings) -> Self {
        Self { config, settings }
    }

    /// Load timezones, settle the root password and apply the grant plan.
    pub fn provision<S: SqlSession + ?Sized>(
        &self,
        source: RootPasswordSource,
        session: &mut S,
    ) -> EngineResult<RootCredential> {
        if !self.config.skip_tzinfo() {
            load_timezones(&self.settings.tzinfo_bin, &self.settings.zoneinfo_dir, session)?;
        }

        let credential = match source {
            RootPasswordSource::Random => {
                let password = generate_root_password();
                Logger::note(&format!("GENERATED ROOT PASSWORD: {}", password), &[]);
                RootCredential {
                    password,
                    generated: true,
                }
            }
            RootPasswordSource::Explicit(password) => RootCredential {
                password,
                generated: false,
            },
            RootPasswordSource::Empty => RootCredential {
                password: String::new(),
                generated: false,
            },
        };

        let plan = PrivilegeGrantPlan::build(self.config, credential.password());
        for batch in plan.batches() {
            self.run_batch(&credential, batch, session)?;
        }

        Ok(credential)
    }

    /// Expire the root password when one-time mode is set.
    pub fn expire_root<S: SqlSession + ?Sized>(
        &self,
        credential: &RootCredential,
        session: &mut S,
    ) -> EngineResult<()> {
        match PrivilegeGrantPlan::expiry(self.config) {
            Some(batch) => self.run_batch(credential, &batch, session),
            None => Ok(()),
        }
    }

    fn run_batch<S: SqlSession + ?Sized>(
        &self,
        credential: &RootCredential,
        batch: &SqlBatch,
        session: &mut S,
    ) -> EngineResult<()> {
        if let Some(note) = batch.note() {
            Logger::note(note, &[]);
        }
        session.run_sql(
            credential.access(batch.auth()),
            Some(SYSTEM_SCHEMA),
            SqlInput::Text(batch.sql()),
        )
    }
}
