use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::{
    config::ShiftApiConfig,
    errors::AppError,
    structs::shifts::{Shift, ShiftFields, ShiftId},
};

/// 遠端 shift REST API
#[async_trait]
pub trait ShiftApi: Send + Sync {
    async fn create_shift(&self, token: Option<&str>, fields: &ShiftFields) -> Result<Shift, AppError>;

    async fn read_shifts(&self, token: Option<&str>) -> Result<Vec<Shift>, AppError>;

    async fn update_shift(
        &self,
        token: Option<&str>,
        id: &ShiftId,
        shift: &Shift,
    ) -> Result<Shift, AppError>;

    async fn delete_shift(&self, token: Option<&str>, id: &ShiftId) -> Result<(), AppError>;
}

pub struct HttpShiftApi {
    client: Client,
    config: ShiftApiConfig,
}

impl HttpShiftApi {
    pub fn new(client: Client, config: ShiftApiConfig) -> Self {
        HttpShiftApi { client, config }
    }

    fn with_token(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, token: Option<&str>) -> Result<Response, AppError> {
        let response = Self::with_token(builder, token)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|err| AppError::ConnectFail(err.into()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamStatus(status, body));
        }

        Ok(response)
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
        response
            .json::<T>()
            .await
            .map_err(|err| AppError::InvalidResponse(err.into()))
    }
}

#[async_trait]
impl ShiftApi for HttpShiftApi {
    async fn create_shift(&self, token: Option<&str>, fields: &ShiftFields) -> Result<Shift, AppError> {
        let request = self.client.post(self.config.collection_url()).json(fields);

        let result = match self.send(request, token).await {
            Ok(response) => Self::json(response).await,
            Err(err) => Err(err),
        };

        result.inspect_err(|err| tracing::error!("Error creating shift: {}", err))
    }

    async fn read_shifts(&self, token: Option<&str>) -> Result<Vec<Shift>, AppError> {
        let request = self.client.get(self.config.collection_url());

        let result = match self.send(request, token).await {
            Ok(response) => Self::json(response).await,
            Err(err) => Err(err),
        };

        result.inspect_err(|err| tracing::error!("Error reading shifts: {}", err))
    }

    async fn update_shift(
        &self,
        token: Option<&str>,
        id: &ShiftId,
        shift: &Shift,
    ) -> Result<Shift, AppError> {
        let request = self.client.put(self.config.item_url(id.as_str())).json(shift);

        let result = match self.send(request, token).await {
            Ok(response) => Self::json(response).await,
            Err(err) => Err(err),
        };

        result.inspect_err(|err| tracing::error!("Error updating shift {}: {}", id, err))
    }

    async fn delete_shift(&self, token: Option<&str>, id: &ShiftId) -> Result<(), AppError> {
        let request = self.client.delete(self.config.item_url(id.as_str()));

        self.send(request, token)
            .await
            .map(|_| ())
            .inspect_err(|err| tracing::error!("Error deleting shift {}: {}", id, err))
    }
}
