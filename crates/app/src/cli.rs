//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use farmhand_domain::page::{DEFAULT_PER_PAGE, PageQuery};
use farmhand_domain::{Platform, TaskStatus};

/// Admin console for the emulator farm.
#[derive(Debug, Parser)]
#[command(name = "farmhand", version)]
#[command(about = "Farmhand - admin console client for the agent farm")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (defaults to ./farmhand.toml when present)
    #[arg(short, long, global = true, env = "FARMHAND_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session tokens
    Login(LoginArgs),
    /// Create an operator account and sign in with it
    Signup(SignupArgs),
    /// End the session and delete stored tokens
    Logout,
    /// Show the signed-in operator
    Whoami,
    /// List agents
    Agents(PageArgs),
    /// List the emulators of one agent
    Emulators {
        /// Agent id
        agent_id: String,
    },
    /// List the task queue
    Tasks(TaskArgs),
    /// List social accounts
    Accounts {
        /// Only accounts on this platform (instagram, youtube, tiktok, twitter)
        #[arg(long)]
        platform: Option<Platform>,
    },
    /// Check that the farm can still log into a social account
    VerifyLogin {
        /// Social account id
        account_id: String,
    },
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Operator email
    #[arg(short, long)]
    pub email: String,
    /// Password
    #[arg(long, env = "FARMHAND_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct SignupArgs {
    #[command(flatten)]
    pub login: LoginArgs,
    /// Display name
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, Args)]
pub struct PageArgs {
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    /// Items per page (max 100)
    #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
    pub per_page: u32,
}

impl PageArgs {
    pub fn query(self) -> PageQuery {
        PageQuery::new(self.page, self.per_page)
    }
}

#[derive(Debug, Args)]
pub struct TaskArgs {
    /// Only tasks in this state
    #[arg(long)]
    pub status: Option<TaskStatus>,
    /// Only tasks assigned to this agent
    #[arg(long = "agent")]
    pub agent_id: Option<String>,
    #[command(flatten)]
    pub page: PageArgs,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("farmhand").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_login() {
        let cli = parse(&["login", "--email", "ops@example.com", "--password", "pw"]);
        let Command::Login(args) = cli.command else {
            panic!("expected login");
        };
        assert_eq!(args.email, "ops@example.com");
        assert_eq!(args.password, "pw");
    }

    #[test]
    fn test_signup_with_name() {
        let cli = parse(&[
            "signup", "--email", "new@example.com", "--password", "pw", "--name", "New",
        ]);
        let Command::Signup(args) = cli.command else {
            panic!("expected signup");
        };
        assert_eq!(args.login.email, "new@example.com");
        assert_eq!(args.name.as_deref(), Some("New"));
    }

    #[test]
    fn test_tasks_filters() {
        let cli = parse(&["tasks", "--status", "running", "--agent", "a1", "--per-page", "500"]);
        let Command::Tasks(args) = cli.command else {
            panic!("expected tasks");
        };
        assert_eq!(args.status, Some(TaskStatus::Running));
        assert_eq!(args.agent_id.as_deref(), Some("a1"));
        assert_eq!(args.page.query(), PageQuery::new(1, 100));
    }

    #[test]
    fn test_accounts_platform_alias() {
        let cli = parse(&["accounts", "--platform", "x"]);
        assert!(matches!(
            cli.command,
            Command::Accounts {
                platform: Some(Platform::Twitter)
            }
        ));
    }

    #[test]
    fn test_global_config_flag() {
        let cli = parse(&["agents", "--config", "/etc/farmhand.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/farmhand.toml")));
        assert!(matches!(cli.command, Command::Agents(_)));
    }

    #[test]
    fn test_rejects_unknown_status() {
        assert!(Cli::try_parse_from(["farmhand", "tasks", "--status", "paused"]).is_err());
    }
}
