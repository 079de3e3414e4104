//! Survey persistence over the REST API.
//!
//! Calls are made once; failures propagate to the caller unchanged.

use serde::Deserialize;
use websurvey_core::survey::{SurveyPayload, SurveyResource};
use websurvey_core::types::DbId;

use crate::error::GatewayError;
use crate::form::SurveyForm;
use crate::http::ApiClient;

#[derive(Deserialize)]
struct Data<T> {
    data: T,
}

/// Pagination block of a survey listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageMeta {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// One page of the user's surveys, newest first.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SurveyList {
    pub data: Vec<SurveyResource>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone)]
pub struct SurveyGateway {
    client: ApiClient,
}

impl SurveyGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /survey/{id}`.
    pub async fn fetch(&self, id: DbId) -> Result<SurveyResource, GatewayError> {
        let response = self.client.get(&format!("/survey/{id}")).send().await?;
        let body: Data<SurveyResource> = ApiClient::parse_response(response).await?;
        Ok(body.data)
    }

    /// Create (`POST /survey`) or update (`PUT /survey/{id}`) depending on
    /// whether the form has been persisted.
    pub async fn save(&self, form: &SurveyForm) -> Result<SurveyResource, GatewayError> {
        self.save_as(form.id, form).await
    }

    /// Save `form` as survey `id`, or as a new survey when `id` is `None`.
    /// The form's own id is ignored.
    pub async fn save_as(
        &self,
        id: Option<DbId>,
        form: &SurveyForm,
    ) -> Result<SurveyResource, GatewayError> {
        let payload = SurveyPayload::from(form);
        let request = match id {
            None => self.client.post("/survey"),
            Some(id) => self.client.put(&format!("/survey/{id}")),
        };

        let response = request.json(&payload).send().await?;
        let body: Data<SurveyResource> = ApiClient::parse_response(response).await?;
        tracing::info!(survey_id = body.data.id, created = id.is_none(), "Survey saved");
        Ok(body.data)
    }

    /// `GET /survey?limit=&offset=`.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<SurveyList, GatewayError> {
        let response = self
            .client
            .get("/survey")
            .query(&[("limit", limit), ("offset", offset)])
            .send()
            .await?;
        ApiClient::parse_response(response).await
    }

    /// `DELETE /survey/{id}`.
    pub async fn delete(&self, id: DbId) -> Result<(), GatewayError> {
        let response = self.client.delete(&format!("/survey/{id}")).send().await?;
        ApiClient::check_status(response).await?;
        tracing::info!(survey_id = id, "Survey deleted");
        Ok(())
    }
}
