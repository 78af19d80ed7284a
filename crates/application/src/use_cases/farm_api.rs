//! Typed queries against the farm endpoints.

use std::sync::Arc;

use farmhand_domain::error::validate_id;
use farmhand_domain::{
    Agent, ApiRequest, Emulator, Page, PageQuery, Platform, SocialAccount, Task, TaskFilter,
};

use crate::client::AuthenticatedHttpClient;
use crate::error::ClientResult;
use crate::ports::{HttpTransport, TokenStore};

/// Read-only facade over the agent, emulator, task and account endpoints.
///
/// Every call goes through the authenticated client, so an expired token is
/// refreshed transparently.
pub struct FarmApi<T, S> {
    client: Arc<AuthenticatedHttpClient<T, S>>,
}

impl<T: HttpTransport, S: TokenStore> FarmApi<T, S> {
    /// Creates the facade over a shared client.
    #[must_use]
    pub const fn new(client: Arc<AuthenticatedHttpClient<T, S>>) -> Self {
        Self { client }
    }

    /// Lists agents, one page at a time.
    ///
    /// # Errors
    /// Returns the client error if the request fails.
    pub async fn list_agents(&self, page: PageQuery) -> ClientResult<Page<Agent>> {
        self.client
            .send_json(ApiRequest::get("/agents").with_query_pairs(page.to_query()))
            .await
    }

    /// Fetches one agent.
    ///
    /// # Errors
    /// Returns [`crate::ClientError::Domain`] for a blank id, otherwise the
    /// client error if the request fails.
    pub async fn get_agent(&self, id: &str) -> ClientResult<Agent> {
        let id = validate_id(id)?;
        self.client.get_json(&format!("/agents/{id}")).await
    }

    /// Lists the emulators hosted by an agent.
    ///
    /// # Errors
    /// Same as [`Self::get_agent`].
    pub async fn list_emulators(&self, agent_id: &str) -> ClientResult<Vec<Emulator>> {
        let agent_id = validate_id(agent_id)?;
        self.client
            .get_json(&format!("/agents/{agent_id}/emulators"))
            .await
    }

    /// Lists the task queue.
    ///
    /// # Errors
    /// Returns the client error if the request fails.
    pub async fn list_tasks(&self, filter: &TaskFilter) -> ClientResult<Page<Task>> {
        self.client
            .send_json(ApiRequest::get("/tasks").with_query_pairs(filter.to_query()))
            .await
    }

    /// Fetches one task.
    ///
    /// # Errors
    /// Same as [`Self::get_agent`].
    pub async fn get_task(&self, id: &str) -> ClientResult<Task> {
        let id = validate_id(id)?;
        self.client.get_json(&format!("/tasks/{id}")).await
    }

    /// Lists social accounts, optionally for one platform.
    ///
    /// # Errors
    /// Returns the client error if the request fails.
    pub async fn list_accounts(&self, platform: Option<Platform>) -> ClientResult<Vec<SocialAccount>> {
        let mut request = ApiRequest::get("/accounts");
        if let Some(platform) = platform {
            request = request.with_query("platform", platform);
        }
        self.client.send_json(request).await
    }
}

impl<T, S> Clone for FarmApi<T, S> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}
