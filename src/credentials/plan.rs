//! Privilege grant plan
//!
//! The statements issued on the fresh-init path are derived purely from the
//! runtime configuration and the effective root password. Building the plan
//! has no side effects; the bootstrapper executes it batch by batch.

use super::sql::{account, grant_schema_pattern, quote_identifier, string_literal};
use crate::config::{RuntimeConfig, ROOT_USER};

/// Host of the root account created by data-directory initialization
pub const LOCALHOST: &str = "localhost";

/// Host pattern for application users
pub const ANY_HOST: &str = "%";

/// Sample database dropped on first start
pub const SAMPLE_DATABASE: &str = "test";

/// How a batch authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchAuth {
    /// Before the root password exists
    Passwordless,
    /// With the root password just set
    Root,
}

/// Statements executed as one client invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlBatch {
    auth: BatchAuth,
    note: Option<String>,
    statements: Vec<String>,
}

impl SqlBatch {
    fn new(auth: BatchAuth, note: Option<String>) -> Self {
        Self {
            auth,
            note,
            statements: Vec::new(),
        }
    }

    fn push(&mut self, statement: impl Into<String>) {
        self.statements.push(statement.into());
    }

    pub fn auth(&self) -> BatchAuth {
        self.auth
    }

    /// Progress note logged before the batch runs
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Batch text as fed to the client
    pub fn sql(&self) -> String {
        let mut sql = self.statements.join("\n");
        sql.push('\n');
        sql
    }
}

/// Ordered statement batches for root and application accounts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivilegeGrantPlan {
    batches: Vec<SqlBatch>,
}

impl PrivilegeGrantPlan {
    /// Build the plan for `config` with the effective root password.
    pub fn build(config: &RuntimeConfig, root_password: &str) -> Self {
        let password = string_literal(root_password);
        let local_root = account(ROOT_USER, LOCALHOST);

        let mut root = SqlBatch::new(BatchAuth::Passwordless, None);
        root.push("SET autocommit = 1;");
        // Provisioning must not reach replicas.
        root.push("SET @@SESSION.SQL_LOG_BIN=0;");
        root.push(format!("ALTER USER {} IDENTIFIED BY {} ;", local_root, password));
        root.push(format!("GRANT ALL ON *.* TO {} WITH GRANT OPTION ;", local_root));
        root.push("FLUSH PRIVILEGES ;");
        if config.root_host() != LOCALHOST {
            let remote_root = account(ROOT_USER, config.root_host());
            root.push(format!("CREATE USER {} IDENTIFIED BY {} ;", remote_root, password));
            root.push(format!("GRANT ALL ON *.* TO {} WITH GRANT OPTION ;", remote_root));
        }
        root.push(format!("DROP DATABASE IF EXISTS {} ;", SAMPLE_DATABASE));

        let mut batches = vec![root];

        if let Some(database) = config.database() {
            let mut create = SqlBatch::new(
                BatchAuth::Root,
                Some(format!("Creating database {}", database)),
            );
            create.push(format!(
                "CREATE DATABASE IF NOT EXISTS {} ;",
                quote_identifier(database)
            ));
            batches.push(create);
        }

        if let (Some(user), Some(user_password)) = (config.user(), config.password()) {
            let app_account = account(user, ANY_HOST);

            let mut create =
                SqlBatch::new(BatchAuth::Root, Some(format!("Creating user {}", user)));
            create.push(format!(
                "CREATE USER {} IDENTIFIED BY {} ;",
                app_account,
                string_literal(user_password)
            ));
            batches.push(create);

            if let Some(database) = config.database() {
                let mut grant = SqlBatch::new(
                    BatchAuth::Root,
                    Some(format!("Giving user {} access to schema {}", user, database)),
                );
                grant.push(format!(
                    "GRANT ALL ON {}.* TO {} ;",
                    grant_schema_pattern(database),
                    app_account
                ));
                batches.push(grant);
            }
        }

        Self { batches }
    }

    pub fn batches(&self) -> &[SqlBatch] {
        &self.batches
    }

    /// Batch expiring the wildcard-host root password, when one-time mode
    /// is set.
    ///
    /// The target is fixed at `'root'@'%'` whatever the configured root host.
    /// If that account does not exist the engine rejects the statement and
    /// the bootstrap fails.
    pub fn expiry(config: &RuntimeConfig) -> Option<SqlBatch> {
        if !config.onetime_password() {
            return None;
        }
        let mut expire = SqlBatch::new(
            BatchAuth::Root,
            Some("Expiring root password".to_string()),
        );
        expire.push(format!(
            "ALTER USER {} PASSWORD EXPIRE;",
            account(ROOT_USER, ANY_HOST)
        ));
        Some(expire)
    }
}
