use anyhow::{Error, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub async fn make_request(
    client: &Client,
    base_url: &str,
    endpoint: &str,
    query: &str,
) -> Result<Value> {
    let url = format!("{}/{}?{}", base_url, endpoint, query);
    let res = client.get(&url).send().await?;

    if !res.status().is_success() {
        return Err(Error::msg(format!(
            "Request to {} failed: {}",
            endpoint,
            res.status()
        )));
    }

    let text = res.text().await?;
    let data = serde_json::from_str::<Value>(&text)?;

    Ok(data)
}

/// Deserializes every element of a JSON array, dropping elements that do not
/// match `T`. An empty array is an empty result, not an error.
pub fn parse_response_array<T>(data: Value, error_msg: &str) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    match data {
        Value::Array(items) => {
            let total = items.len();
            let result: Vec<T> = items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect();

            if total > 0 && result.is_empty() {
                Err(Error::msg(error_msg.to_string()))
            } else {
                Ok(result)
            }
        }
        _ => Err(Error::msg(format!(
            "Unexpected API response format: not an array ({})",
            error_msg
        ))),
    }
}

pub fn parse_response_object<T>(data: Value, error_msg: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    match data {
        Value::Object(obj) => serde_json::from_value(Value::Object(obj))
            .map_err(|e| Error::msg(format!("{}: {}", error_msg, e))),
        _ => Err(Error::msg("Unexpected API response format: not an object")),
    }
}
