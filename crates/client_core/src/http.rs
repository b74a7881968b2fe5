use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{NewPerson, Person, PersonId},
    error::ApiError,
    protocol::PERSONS_SEGMENTS,
};
use tracing::{debug, warn};
use url::Url;

use crate::{
    error::ServiceError,
    service::{PersonService, ServiceResult},
};

/// [`PersonService`] backed by the phonebook REST API.
#[derive(Clone)]
pub struct HttpPersonService {
    http: Client,
    base_url: Url,
}

impl HttpPersonService {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .with_context(|| format!("invalid phonebook server url '{base_url}'"))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            bail!(
                "unsupported scheme '{}' in phonebook server url '{base_url}'",
                base_url.scheme()
            );
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("failed to build http client")?;

        Ok(Self { http, base_url })
    }

    /// The persons collection, or one person when `id` is given. The id is pushed
    /// as a single percent-encoded segment.
    fn endpoint(&self, id: Option<&PersonId>) -> ServiceResult<Url> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                ServiceError::transport(format!("cannot build request url from '{}'", self.base_url))
            })?;
            segments.pop_if_empty().extend(PERSONS_SEGMENTS);
            if let Some(id) = id {
                segments.push(&id.to_string());
            }
        }
        Ok(url)
    }
}

async fn ensure_success(response: Response, id: Option<&PersonId>) -> ServiceResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let err = ApiError::from_response(status.as_u16(), &body);
    warn!(status = status.as_u16(), message = %err.message, "phonebook request rejected");
    Err(ServiceError::from_api_error(err, id))
}

#[async_trait]
impl PersonService for HttpPersonService {
    async fn fetch_all(&self) -> ServiceResult<Vec<Person>> {
        let response = self.http.get(self.endpoint(None)?).send().await?;
        let persons: Vec<Person> = ensure_success(response, None).await?.json().await?;
        debug!(count = persons.len(), "fetched persons");
        Ok(persons)
    }

    async fn create(&self, person: NewPerson) -> ServiceResult<Person> {
        let response = self
            .http
            .post(self.endpoint(None)?)
            .json(&person)
            .send()
            .await?;
        let created: Person = ensure_success(response, None).await?.json().await?;
        debug!(person_id = %created.id, name = %created.name, "created person");
        Ok(created)
    }

    async fn update_by_id(&self, id: &PersonId, person: Person) -> ServiceResult<Person> {
        let response = self
            .http
            .put(self.endpoint(Some(id))?)
            .json(&person)
            .send()
            .await?;
        // An unknown id may come back as `200 null` instead of a 404.
        let updated: Option<Person> = ensure_success(response, Some(id)).await?.json().await?;
        let updated = updated.ok_or_else(|| ServiceError::NotFound { id: id.clone() })?;
        debug!(person_id = %updated.id, number = %updated.number, "updated person");
        Ok(updated)
    }

    async fn delete_by_id(&self, id: &PersonId) -> ServiceResult<()> {
        let response = self
            .http
            .delete(self.endpoint(Some(id))?)
            .send()
            .await?;
        ensure_success(response, Some(id)).await?;
        debug!(person_id = %id, "deleted person");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
