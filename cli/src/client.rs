use anyhow::{anyhow, bail, Context, Result};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use taskdeck_core::{
    ApiCall, CreateTaskRequest, DeleteResponse, Outcome, SetStatusRequest, Task, TaskId,
    TaskStatus, UpdateTaskRequest, UserId,
};

/// Header the server reads the caller's identity from.
const USER_ID_HEADER: &str = "x-user-id";

#[derive(Deserialize)]
struct ServerError {
    error: String,
    #[serde(default)]
    details: Option<serde_json::Value>,
}

/// Talks to `taskdeck-server` over HTTP.
#[derive(Clone)]
pub struct HttpTaskClient {
    base_url: Url,
    user_id: Option<UserId>,
    http: reqwest::Client,
}

impl HttpTaskClient {
    pub fn new(base_url: &str, user_id: Option<UserId>) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("invalid server url '{base_url}'"))?;
        if base_url.cannot_be_a_base() {
            bail!("server url '{base_url}' cannot carry a path");
        }
        Ok(Self {
            base_url,
            user_id,
            http: reqwest::Client::new(),
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("server url cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let mut builder = self.http.request(method, self.url(segments)?);
        if let Some(user) = &self.user_id {
            builder = builder.header(USER_ID_HEADER, user.as_str());
        }
        Ok(builder)
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        let response = self.request(Method::GET, &["api", "tasks"])?.send().await?;
        decode(response).await
    }

    pub async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task> {
        let response = self
            .request(Method::POST, &["api", "tasks"])?
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn update_task(&self, id: &TaskId, request: &UpdateTaskRequest) -> Result<Task> {
        let response = self
            .request(Method::PUT, &["api", "tasks", id.as_str()])?
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn delete_task(&self, id: &TaskId) -> Result<()> {
        let response = self
            .request(Method::DELETE, &["api", "tasks", id.as_str()])?
            .send()
            .await?;
        let body: DeleteResponse = decode(response).await?;
        if !body.success {
            bail!("server did not confirm deletion of {id}");
        }
        Ok(())
    }

    pub async fn complete_task(&self, id: &TaskId) -> Result<Task> {
        let response = self
            .request(Method::PATCH, &["api", "tasks", id.as_str(), "complete"])?
            .send()
            .await?;
        decode(response).await
    }

    pub async fn set_status(&self, id: &TaskId, status: TaskStatus) -> Result<Task> {
        let response = self
            .request(Method::PATCH, &["api", "tasks", id.as_str(), "status"])?
            .json(&SetStatusRequest::from(status))
            .send()
            .await?;
        decode(response).await
    }

    /// Issues the request a [`taskdeck_core::TaskBoard`] asked for.
    pub async fn execute(&self, call: &ApiCall) -> Result<Outcome> {
        Ok(match call {
            ApiCall::List => Outcome::Tasks(self.list_tasks().await?),
            ApiCall::Create(request) => Outcome::Task(self.create_task(request).await?),
            ApiCall::Update { id, request } => Outcome::Task(self.update_task(id, request).await?),
            ApiCall::Delete(id) => {
                self.delete_task(id).await?;
                Outcome::Deleted
            }
            ApiCall::Complete(id) => Outcome::Task(self.complete_task(id).await?),
            ApiCall::SetStatus { id, status } => Outcome::Task(self.set_status(id, *status).await?),
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .await
            .with_context(|| format!("decoding {status} response"));
    }

    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ServerError>(&text) {
        Ok(ServerError {
            error,
            details: Some(details),
        }) => bail!("{status}: {error} {details}"),
        Ok(ServerError { error, .. }) => bail!("{status}: {error}"),
        Err(_) => bail!("{status}"),
    }
}
