use crate::errors::AppError;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;

/// 通用的 JSON 請求函數，可附表單數據
pub async fn fetch_json<T: DeserializeOwned>(
    request_client: &Client,
    url: &str,
    method: Method,
    form_data_pairs: Option<Vec<(&str, &str)>>,
) -> Result<T, AppError> {
    // 建立基本請求
    let mut request_builder = request_client
        .request(method, url)
        .header("Accept", "application/json");

    // 添加表單數據（若有提供）
    if let Some(form_pairs) = form_data_pairs {
        let form_data = form_pairs
            .iter()
            .fold(
                form_urlencoded::Serializer::new(String::new()),
                |mut serializer, &(key, value)| {
                    serializer.append_pair(key, value);
                    serializer
                },
            )
            .finish();

        request_builder = request_builder
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(form_data);
    }

    // 發送請求獲取數據
    let response = request_builder
        .send()
        .await
        .map_err(|err| AppError::ConnectFail(err.into()))?;

    // 檢查請求是否成功
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::UpstreamStatus(status, body));
    }

    response
        .json::<T>()
        .await
        .map_err(|err| AppError::InvalidResponse(err.into()))
}
