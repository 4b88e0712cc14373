use crate::config::Config;
use crate::error::{ProvisionError, ProvisionResult};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// HTTP methods used against the platform API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    #[allow(dead_code)]
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated access to the platform API, allowing for fakes in tests
pub trait ApiClient: Send + Sync {
    /// Perform one call against `path` (relative to the API root).
    ///
    /// Non-success statuses fail with `ProvisionError::Api`, network failures
    /// with `ProvisionError::Transport`. An empty success body yields `null`.
    fn execute(&self, method: Method, path: &str, payload: Option<&Value>)
    -> ProvisionResult<Value>;
}

/// Real API client using reqwest's blocking client
pub struct ReqwestClient {
    http: reqwest::blocking::Client,
    api_root: String,
    user: String,
    password: String,
}

impl ReqwestClient {
    /// Build a client for the instance described by `config`
    pub fn new(config: &Config) -> ProvisionResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout.min(Duration::from_secs(10)))
            .build()
            .map_err(|e| {
                ProvisionError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            api_root: format!("{}/api", config.base_url.as_str().trim_end_matches('/')),
            user: config.user.clone(),
            password: config.password.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_root, path.trim_start_matches('/'))
    }
}

impl ApiClient for ReqwestClient {
    fn execute(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Value>,
    ) -> ProvisionResult<Value> {
        let url = self.url(path);
        tracing::debug!(%method, path, "calling platform API");

        let builder = match method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
            Method::Put => self.http.put(&url),
            Method::Delete => self.http.delete(&url),
        };
        let mut builder = builder.basic_auth(&self.user, Some(&self.password));
        if let Some(body) = payload {
            builder = builder.json(body);
        }

        let response = builder.send().map_err(|e| ProvisionError::Transport {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        tracing::debug!(%method, path, status = status.as_u16(), "platform API responded");

        let text = response.text().map_err(|e| ProvisionError::Transport {
            path: path.to_string(),
            message: format!("Failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            return Err(ProvisionError::Api {
                path: path.to_string(),
                status: status.as_u16(),
                body: (!text.trim().is_empty()).then_some(text),
            });
        }

        parse_body(path, &text)
    }
}

/// Parse a success body; empty bodies are `null`
pub fn parse_body(path: &str, text: &str) -> ProvisionResult<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(text).map_err(|e| ProvisionError::MalformedResponse {
        path: path.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(url: &str) -> Config {
        Config {
            base_url: url::Url::parse(url).unwrap(),
            user: "admin".to_string(),
            password: "secret".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn test_url_joins_api_root() {
        let client = ReqwestClient::new(&config("https://mautic.example.com/")).unwrap();
        assert_eq!(
            client.url("tags/new"),
            "https://mautic.example.com/api/tags/new"
        );
        assert_eq!(
            client.url("/emails?start=0&limit=100"),
            "https://mautic.example.com/api/emails?start=0&limit=100"
        );
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = ReqwestClient::new(&config("http://localhost:8001/mautic")).unwrap();
        assert_eq!(client.url("forms"), "http://localhost:8001/mautic/api/forms");
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body("tags", "").unwrap(), Value::Null);
        assert_eq!(parse_body("tags", "  \n").unwrap(), Value::Null);
        assert_eq!(
            parse_body("tags", r#"{"tag": {"id": 3}}"#).unwrap(),
            json!({"tag": {"id": 3}})
        );
        assert!(matches!(
            parse_body("tags", "<html>login</html>"),
            Err(ProvisionError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_method_names() {
        let names: Vec<String> = [Method::Get, Method::Post, Method::Put, Method::Delete]
            .iter()
            .map(Method::to_string)
            .collect();
        assert_eq!(names, vec!["GET", "POST", "PUT", "DELETE"]);
    }

    #[test]
    fn test_put_payload_replaces_fields() {
        use crate::resources::ResourceType;
        use crate::test_helpers::FakeRemote;

        let remote = FakeRemote::new()
            .with_record(ResourceType::Tag, json!({"id": 42, "tag": "Semente1"}));

        let response = remote
            .execute(
                Method::Put,
                "tags/42/edit",
                Some(&json!({"tag": "Semente1", "description": "launch leads"})),
            )
            .unwrap();

        assert_eq!(response["tag"]["id"], 42);
        assert_eq!(response["tag"]["description"], "launch leads");
        let call = remote.calls().pop().unwrap();
        assert_eq!(call.method, Method::Put);
        assert_eq!(call.payload.unwrap()["description"], "launch leads");
        assert_eq!(remote.count(ResourceType::Tag), 1);
        assert!(remote.execute(Method::Put, "tags/7/edit", None).is_err());
    }

    #[test]
    fn test_unreachable_host_is_transport_error() {
        let mut cfg = config("http://127.0.0.1:9");
        cfg.timeout = Duration::from_secs(2);
        let client = ReqwestClient::new(&cfg).unwrap();
        let err = client.execute(Method::Get, "tags", None).unwrap_err();
        assert!(matches!(err, ProvisionError::Transport { .. }));
    }
}
