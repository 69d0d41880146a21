//! The session façade: one login, one token, seventeen sub-clients.

mod state;
pub mod version;

pub use version::{compare_versions, VersionCheck, COMPATIBLE_SERVER_VERSION};

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use bon::Builder;
use secrecy::SecretString;

use crate::auth::{LoginHandler, PasswordPrompt, TerminalPrompt, Token, TokenCell};
use crate::config::ClientConfig;
use crate::error::{OpencgaError, Result};
use crate::job::{self, JobStatus, WaitTarget};
use crate::rest::*;

use state::SessionState;

/// Poll interval used by [`OpencgaClient::wait_for_job`] callers that have no preference.
pub const DEFAULT_POLL_INTERVAL: Duration = job::MIN_POLL_INTERVAL;

/// Construction options for [`OpencgaClient`].
///
/// # Example
/// ```
/// use opencga::auth::Token;
/// use opencga::session::ClientOptions;
///
/// let options = ClientOptions::builder()
///     .token(Token::new("existing-token"))
///     .auto_refresh(false)
///     .check_versions(false)
///     .build();
/// assert!(!options.auto_refresh);
/// ```
#[derive(Builder)]
pub struct ClientOptions {
    /// Token from an earlier session to start with.
    pub token: Option<Token>,
    /// Policy for requests rejected with an authentication error. Overrides
    /// `auto_refresh` when set.
    pub retry_handler: Option<Arc<dyn RetryHandler>>,
    /// Refresh the token and retry once when a request is rejected.
    #[builder(default = true)]
    pub auto_refresh: bool,
    /// Compare client and server versions on [`OpencgaClient::connect`].
    #[builder(default = true)]
    pub check_versions: bool,
    /// Where `login` reads a password that was not passed in.
    pub password_prompt: Option<Arc<dyn PasswordPrompt>>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("token", &self.token)
            .field("retry_handler", &self.retry_handler.as_ref().map(|_| ".."))
            .field("auto_refresh", &self.auto_refresh)
            .field("check_versions", &self.check_versions)
            .field("password_prompt", &self.password_prompt.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Session coordinator over the OpenCGA REST API.
///
/// Owns the sub-client registry and the login handler. Every sub-client
/// reads the session's single token, so `login`, a refresh, and `logout` are
/// seen by all of them at once.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use opencga::config::ClientConfig;
/// use opencga::job::WaitTarget;
/// use opencga::session::{ClientOptions, OpencgaClient};
///
/// # async fn example() -> opencga::error::Result<()> {
/// let config = ClientConfig::new("https://ws.opencb.org/opencga-prod")?;
/// let client = OpencgaClient::connect(config, ClientOptions::default()).await?;
/// let session = client.scoped();
/// session.login(Some("demo"), Some("demo".to_string().into())).await?;
///
/// let files = session.files().search(&[("study", "demo@family:platinum")]).await?;
/// println!("{} files", files.num_results());
///
/// session
///     .wait_for_job(WaitTarget::ids("demo@family:platinum", "job1"), Duration::from_secs(30))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct OpencgaClient {
    config: Arc<ClientConfig>,
    transport: HttpTransport,
    state: Arc<SessionState>,
    registry: ClientRegistry,
    prompt: Arc<dyn PasswordPrompt>,
}

impl fmt::Debug for OpencgaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpencgaClient")
            .field("config", &self.config)
            .field("user_id", &self.state.user_id())
            .field("token", self.state.token())
            .field("clients", &self.registry.len())
            .finish()
    }
}

impl OpencgaClient {
    /// Build the session and its sub-clients without contacting the server.
    pub fn new(config: ClientConfig, options: ClientOptions) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let transport = HttpTransport::new(config.clone())?;

        let token = TokenCell::new(options.token);
        let state = Arc::new(SessionState::new(token.clone()));
        let retry: Arc<dyn RetryHandler> = match options.retry_handler {
            Some(handler) => handler,
            None if options.auto_refresh => Arc::new(AutoRefresh),
            None => Arc::new(NoRetry),
        };
        let registry = ClientRegistry::build(transport.clone(), token, retry, state.clone());

        Ok(Self {
            config,
            transport,
            state,
            registry,
            prompt: options
                .password_prompt
                .unwrap_or_else(|| Arc::new(TerminalPrompt)),
        })
    }

    /// Build the session, then check client/server version compatibility
    /// unless disabled in `options`. A version mismatch only logs.
    pub async fn connect(config: ClientConfig, options: ClientOptions) -> Result<Self> {
        let check = options.check_versions;
        let client = Self::new(config, options)?;
        if check {
            client.check_versions().await;
        }
        Ok(client)
    }

    /// Compare `major.minor` of the server's reported version with
    /// [`COMPATIBLE_SERVER_VERSION`] and log the outcome.
    pub async fn check_versions(&self) -> VersionCheck {
        let check = match self.registry.meta.server_version().await {
            Ok(server) => compare_versions(COMPATIBLE_SERVER_VERSION, &server),
            Err(err) => {
                tracing::debug!(error = %err, "meta/about failed");
                VersionCheck::Unknown { server: None }
            }
        };
        version::report(&check);
        check
    }

    /// Log in.
    ///
    /// With a `user`, a new login handler is bound to that user and password
    /// (read from the password prompt when `None`) and replaces the previous
    /// one. Without a `user`, the existing handler logs in again with its
    /// stored password, without prompting; this fails with
    /// [`OpencgaError::InvalidOperation`] if there has been no login yet.
    pub async fn login(&self, user: Option<&str>, password: Option<SecretString>) -> Result<Token> {
        let Some(user) = user else {
            return self.state.reauthenticate(false).await;
        };

        let password = match password {
            Some(password) => password,
            None => self.prompt_password(user).await?,
        };
        let handler = LoginHandler::new(self.transport.clone(), user, password);
        self.state.login(handler).await
    }

    /// Extend the current session without re-sending the password.
    pub async fn refresh(&self) -> Result<Token> {
        self.state.reauthenticate(true).await
    }

    /// Forget the token and the login handler. Idempotent.
    pub fn logout(&self) {
        self.state.logout();
    }

    /// A guard that derefs to this client and logs out when dropped.
    pub fn scoped(&self) -> SessionScope<'_> {
        SessionScope { client: self }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn token(&self) -> Option<Token> {
        self.state.token().get()
    }

    /// User of the most recent successful login, until logout.
    pub fn user_id(&self) -> Option<String> {
        self.state.user_id()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.token().is_set()
    }

    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    /// Block until a job reaches a terminal status.
    ///
    /// `poll_interval` is raised to [`job::MIN_POLL_INTERVAL`] when shorter.
    /// Invalid targets fail before any request is sent.
    pub async fn wait_for_job(&self, target: WaitTarget, poll_interval: Duration) -> Result<JobStatus> {
        let (study, job_id) = target.resolve()?;
        job::wait(&self.registry.jobs, &study, &job_id, poll_interval).await
    }

    /// Render the server's endpoint catalogue, or one category of it.
    pub async fn help(&self, category: Option<&str>, show_parameters: bool) -> Result<String> {
        let catalogue = self.registry.meta.api_categories().await?;
        Ok(render_help(&catalogue, category, show_parameters))
    }

    async fn prompt_password(&self, user: &str) -> Result<SecretString> {
        let prompt = self.prompt.clone();
        let user = user.to_string();
        tokio::task::spawn_blocking(move || prompt.read_password(&user))
            .await
            .map_err(|err| OpencgaError::Io(std::io::Error::other(err)))?
    }

    pub fn users(&self) -> &UserClient {
        &self.registry.users
    }

    pub fn projects(&self) -> &ProjectClient {
        &self.registry.projects
    }

    pub fn studies(&self) -> &StudyClient {
        &self.registry.studies
    }

    pub fn files(&self) -> &FileClient {
        &self.registry.files
    }

    pub fn samples(&self) -> &SampleClient {
        &self.registry.samples
    }

    pub fn cohorts(&self) -> &CohortClient {
        &self.registry.cohorts
    }

    pub fn families(&self) -> &FamilyClient {
        &self.registry.families
    }

    pub fn jobs(&self) -> &JobClient {
        &self.registry.jobs
    }

    pub fn individuals(&self) -> &IndividualClient {
        &self.registry.individuals
    }

    pub fn alignments(&self) -> &AlignmentClient {
        &self.registry.alignments
    }

    pub fn variants(&self) -> &VariantClient {
        &self.registry.variants
    }

    pub fn clinical(&self) -> &ClinicalClient {
        &self.registry.clinical
    }

    pub fn ga4gh(&self) -> &Ga4ghClient {
        &self.registry.ga4gh
    }

    pub fn meta(&self) -> &MetaClient {
        &self.registry.meta
    }

    pub fn admin(&self) -> &AdminClient {
        &self.registry.admin
    }

    pub fn disease_panels(&self) -> &DiseasePanelClient {
        &self.registry.disease_panels
    }

    pub fn variant_operations(&self) -> &VariantOperationClient {
        &self.registry.variant_operations
    }

    /// The sub-client for `category`.
    pub fn client(&self, category: Category) -> &ResourceClient {
        self.registry.get(category)
    }
}

/// Accessor names matching the other OpenCGA client libraries.
impl OpencgaClient {
    pub fn get_user_client(&self) -> &UserClient {
        self.users()
    }

    pub fn get_project_client(&self) -> &ProjectClient {
        self.projects()
    }

    pub fn get_study_client(&self) -> &StudyClient {
        self.studies()
    }

    pub fn get_file_client(&self) -> &FileClient {
        self.files()
    }

    pub fn get_sample_client(&self) -> &SampleClient {
        self.samples()
    }

    pub fn get_cohort_client(&self) -> &CohortClient {
        self.cohorts()
    }

    pub fn get_family_client(&self) -> &FamilyClient {
        self.families()
    }

    pub fn get_job_client(&self) -> &JobClient {
        self.jobs()
    }

    pub fn get_individual_client(&self) -> &IndividualClient {
        self.individuals()
    }

    pub fn get_alignment_client(&self) -> &AlignmentClient {
        self.alignments()
    }

    pub fn get_variant_client(&self) -> &VariantClient {
        self.variants()
    }

    pub fn get_clinical_client(&self) -> &ClinicalClient {
        self.clinical()
    }

    pub fn get_ga4gh_client(&self) -> &Ga4ghClient {
        self.ga4gh()
    }

    pub fn get_meta_client(&self) -> &MetaClient {
        self.meta()
    }

    pub fn get_admin_client(&self) -> &AdminClient {
        self.admin()
    }

    pub fn get_disease_panel_client(&self) -> &DiseasePanelClient {
        self.disease_panels()
    }

    pub fn get_variant_operation_client(&self) -> &VariantOperationClient {
        self.variant_operations()
    }
}

/// Scoped session: derefs to the client and calls
/// [`OpencgaClient::logout`] when dropped, including during unwinding.
#[derive(Debug)]
pub struct SessionScope<'a> {
    client: &'a OpencgaClient,
}

impl Deref for SessionScope<'_> {
    type Target = OpencgaClient;

    fn deref(&self) -> &OpencgaClient {
        self.client
    }
}

impl Drop for SessionScope<'_> {
    fn drop(&mut self) {
        self.client.logout();
    }
}
