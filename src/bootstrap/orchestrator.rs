//! Bootstrap control flow
//!
//! # Sequence
//!
//! 1. Commands other than the engine, and help/version queries, hand off
//!    immediately.
//! 2. Engine configuration is read back from its help dump.
//! 3. Runtime configuration is resolved from the environment.
//! 4. Directories are created (and owned, when privileged).
//! 5. A privileged run re-executes itself as the service account.
//! 6. The data directory is classified once:
//!    - fresh: initialize, start temporary server, provision accounts, run
//!      init scripts, stop
//!    - pre-existing: socket reconciliation only
//! 7. Hand off to the engine with the original arguments.
//!
//! Nothing is retried. Any error aborts the run.

use std::path::PathBuf;

use nix::unistd::geteuid;

use super::errors::{BootstrapError, BootstrapResult};
use crate::cli::Invocation;
use crate::config::{EnvSource, RuntimeConfig, Settings, MYSQL_ROOT_PASSWORD};
use crate::credentials::CredentialBootstrapper;
use crate::engine::{
    introspect, introspect_builtin, reconcile_socket, HelpDump, MysqlClient, ServerRunState,
    TemporaryServer, DATADIR, SOCKET,
};
use crate::handoff::Handoff;
use crate::init_scripts::{discover, InitScriptExecutor};
use crate::observability::{log_event, log_event_with_fields, Event, Logger};
use crate::provision::{resolve_account, DirectoryPlan, InitDirectoryClassification};

/// Informational image version printed at start
pub const MYSQL_VERSION: &str = "MYSQL_VERSION";

/// One bootstrap run
pub struct Bootstrap<'a, E: EnvSource + ?Sized> {
    settings: &'a Settings,
    env: &'a E,
}

impl<'a, E: EnvSource + ?Sized> Bootstrap<'a, E> {
    pub fn new(settings: &'a Settings, env: &'a E) -> Self {
        Self { settings, env }
    }

    /// Run the bootstrap and return the terminal handoff.
    pub fn run(&self, invocation: Invocation) -> BootstrapResult<Handoff> {
        if !invocation.is_engine_command(&self.settings.engine_command) || invocation.wants_help() {
            return Ok(Handoff::passthrough(invocation));
        }

        let version = self.env.var(MYSQL_VERSION).unwrap_or_default();
        log_event_with_fields(Event::EntrypointStart, &[("version", &version)]);

        let dump = introspect(invocation.program(), invocation.args())?;
        let config = RuntimeConfig::resolve(
            self.env,
            dump.require_path(DATADIR)?,
            dump.require_path(SOCKET)?,
        )?;

        let privileged = geteuid().is_root();
        self.provision_directories(&dump, &config, privileged)?;

        if privileged {
            if let Some(account) = self.settings.service_account.as_deref() {
                return self.drop_privileges(account, invocation, &config);
            }
        }

        let classification = InitDirectoryClassification::detect(config.data_dir());
        let state = if classification.is_fresh() {
            self.initialize(&invocation, &config)?
        } else {
            log_event(Event::ExistingDatabase);
            self.fix_socket(&invocation, &config);
            let mut state = ServerRunState::NotStarted;
            state.transition(ServerRunState::HandedOff)?;
            state
        };
        debug_assert_eq!(state, ServerRunState::HandedOff);

        Ok(Handoff::engine(invocation, config.child_env().clone()))
    }

    fn provision_directories(
        &self,
        dump: &HelpDump,
        config: &RuntimeConfig,
        privileged: bool,
    ) -> BootstrapResult<()> {
        let plan = DirectoryPlan::from_engine(dump, config.data_dir(), config.socket());
        plan.create()?;

        if privileged {
            if let Some(account) = self.settings.service_account.as_deref() {
                let changed = plan.assign_owner(resolve_account(account)?)?;
                if changed > 0 {
                    Logger::note(
                        "reassigned ownership",
                        &[("account", account), ("entries", &changed.to_string())],
                    );
                }
            }
        }
        Ok(())
    }

    fn drop_privileges(
        &self,
        account: &str,
        invocation: Invocation,
        config: &RuntimeConfig,
    ) -> BootstrapResult<Handoff> {
        log_event_with_fields(Event::PrivilegeSwitch, &[("account", account)]);
        let entrypoint = std::env::current_exe().map_err(|source| BootstrapError::Handoff {
            program: self.settings.privilege_helper.display().to_string(),
            source,
        })?;
        Ok(Handoff::drop_privileges(
            &self.settings.privilege_helper,
            account,
            &entrypoint,
            invocation,
            config.child_env().clone(),
        ))
    }

    /// Fresh-init path. Returns the final server state.
    fn initialize(
        &self,
        invocation: &Invocation,
        config: &RuntimeConfig,
    ) -> BootstrapResult<ServerRunState> {
        let source = config.verify_minimum()?;
        // Fail before touching the data directory if scripts cannot be listed.
        let scripts = discover(&self.settings.initdb_dir)?;

        let mut server = TemporaryServer::new(
            invocation.program(),
            invocation.args().to_vec(),
            config.socket(),
            &self.settings.admin_bin,
            config.child_env().clone(),
        );

        log_event(Event::InitializeBegin);
        server.initialize_data_dir()?;
        log_event(Event::InitializeComplete);

        log_event(Event::TemporaryServerStart);
        server.start()?;
        log_event(Event::TemporaryServerStarted);

        self.fix_socket(invocation, config);

        let mut session = MysqlClient::new(
            &self.settings.client_bin,
            config.socket(),
            config.child_env().clone(),
        );
        let credentials = CredentialBootstrapper::new(config, self.settings);
        let root = credentials.provision(source, &mut session)?;

        let script_env = config
            .child_env()
            .with(MYSQL_ROOT_PASSWORD, root.password());
        InitScriptExecutor::new(
            &self.settings.shell_bin,
            script_env,
            config.database().map(str::to_string),
        )
        .execute_all(&scripts, root.password(), &mut session)?;

        credentials.expire_root(&root, &mut session)?;

        log_event(Event::TemporaryServerStop);
        server.stop(root.password())?;
        log_event(Event::TemporaryServerStopped);

        log_event(Event::InitProcessDone);
        server.hand_off()?;
        Ok(server.state())
    }

    /// Link the engine's built-in default socket to the resolved one,
    /// best-effort.
    fn fix_socket(&self, invocation: &Invocation, config: &RuntimeConfig) {
        let default_socket = introspect_builtin(invocation.program())
            .ok()
            .and_then(|dump| dump.configured(SOCKET).map(PathBuf::from));
        match default_socket {
            Some(default_socket) => {
                reconcile_socket(&default_socket, config.socket());
            }
            None => Logger::warn("unable to determine the default socket location", &[]),
        }
    }
}
