//! Command execution.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use farmhand_application::{
    AuthenticatedHttpClient, FarmApi, SessionService, VerifyAccountLogin,
};
use farmhand_domain::{Credentials, Registration, TaskFilter, TaskStatus};
use farmhand_infrastructure::{ClientConfig, FileTokenStore, ReqwestTransport, to_json_pretty};
use serde_json::json;
use tracing::{debug, warn};

use crate::cli::{Command, LoginArgs};

type Client = AuthenticatedHttpClient<ReqwestTransport, FileTokenStore>;

/// The wired-up client and the use cases the commands call.
pub struct Console {
    session: SessionService<ReqwestTransport, FileTokenStore>,
    api: FarmApi<ReqwestTransport, FileTokenStore>,
    verifier: VerifyAccountLogin<ReqwestTransport, FileTokenStore>,
}

impl Console {
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.base_url, config.request_timeout())
            .context("failed to build HTTP transport")?;
        let token_file = config.token_file();
        debug!(path = %token_file.display(), base_url = %config.base_url, "connecting");
        let store = FileTokenStore::open(token_file);

        let client: Arc<Client> = Arc::new(
            AuthenticatedHttpClient::new(Arc::new(transport), Arc::new(store))
                .with_routes(config.routes.clone()),
        );
        client.events().subscribe_refresh_failed(|| {
            warn!("session expired, run `farmhand login` to sign in again");
        });

        Ok(Self {
            session: SessionService::new(Arc::clone(&client)),
            api: FarmApi::new(Arc::clone(&client)),
            verifier: VerifyAccountLogin::new(client, config.poll_policy()),
        })
    }

    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Login(LoginArgs { email, password }) => {
                let user = self
                    .session
                    .sign_in(&Credentials::new(email, password))
                    .await
                    .context("sign-in failed")?;
                print_json(&user)
            }
            Command::Signup(args) => {
                let registration = Registration {
                    credentials: Credentials::new(args.login.email, args.login.password),
                    name: args.name,
                };
                let user = self
                    .session
                    .sign_up(&registration)
                    .await
                    .context("sign-up failed")?;
                print_json(&user)
            }
            Command::Logout => {
                self.session.sign_out().await;
                print_json(&json!({"signed_out": true}))
            }
            Command::Whoami => {
                self.require_session()?;
                print_json(&self.session.current_user().await?)
            }
            Command::Agents(page) => {
                self.require_session()?;
                print_json(&self.api.list_agents(page.query()).await?)
            }
            Command::Emulators { agent_id } => {
                self.require_session()?;
                print_json(&self.api.list_emulators(&agent_id).await?)
            }
            Command::Tasks(args) => {
                self.require_session()?;
                let filter = TaskFilter {
                    status: args.status,
                    agent_id: args.agent_id,
                    page: args.page.query(),
                };
                print_json(&self.api.list_tasks(&filter).await?)
            }
            Command::Accounts { platform } => {
                self.require_session()?;
                print_json(&self.api.list_accounts(platform).await?)
            }
            Command::VerifyLogin { account_id } => {
                self.require_session()?;
                let task = self.verifier.execute(&account_id).await?;
                print_json(&task)?;
                if task.status == TaskStatus::Completed {
                    Ok(())
                } else {
                    bail!(
                        "login verification {}: {}",
                        task.status,
                        task.error.as_deref().unwrap_or("no reason given")
                    )
                }
            }
        }
    }

    fn require_session(&self) -> Result<()> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            bail!("not signed in, run `farmhand login` first")
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    print!("{}", to_json_pretty(value)?);
    Ok(())
}
