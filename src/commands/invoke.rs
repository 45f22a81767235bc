//! Invoke command implementation.

use crate::api::QueryClient;
use crate::config::Config;
use crate::format::Formatter;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Calls a single action and prints its payload.
pub struct InvokeCommand {
    config: Config,
}

impl InvokeCommand {
    /// Creates a new invoke command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Invokes `action` and returns formatted output.
    pub async fn execute(&self, action: &str, raw_params: &[String]) -> Result<String> {
        self.config.validate()?;

        let client = QueryClient::new(self.config.settings(), self.config.credentials.clone())
            .context("Failed to create query client")?;

        self.execute_with_client(&client, action, raw_params).await
    }

    /// Invokes `action` with a provided client (for testing).
    pub async fn execute_with_client(
        &self,
        client: &QueryClient,
        action: &str,
        raw_params: &[String],
    ) -> Result<String> {
        let params = parse_params(raw_params)?;
        debug!("Parameters: {:?}", params.keys().collect::<Vec<_>>());

        info!("Calling {} on {}", action, client.endpoint());
        let tree = client
            .invoke(action, &params)
            .await
            .with_context(|| format!("{} failed", action))?;

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_tree(&tree))
    }
}

/// Parses `KEY=VALUE` arguments. Only the first `=` splits, so values may contain `=`.
pub fn parse_params(raw: &[String]) -> Result<BTreeMap<String, String>> {
    let mut params = BTreeMap::new();

    for arg in raw {
        let (key, value) = arg
            .split_once('=')
            .with_context(|| format!("Invalid parameter '{}': expected KEY=VALUE", arg))?;

        if key.is_empty() {
            anyhow::bail!("Invalid parameter '{}': empty key", arg);
        }

        params.insert(key.to_string(), value.to_string());
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::TransportError;
    use crate::api::{ApiError, ClientSettings, Credentials, HttpResponse, Transport};
    use crate::config::OutputFormat;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Mock transport answering with fixed XML and recording request bodies.
    struct MockTransport {
        body: String,
        requests: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn post_form(&self, _url: &str, body: String) -> std::result::Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(body);
            Ok(HttpResponse::new(200, self.body.clone()))
        }
    }

    fn make_client(xml: &str, read_only: bool) -> (QueryClient, Arc<Mutex<Vec<String>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let transport = MockTransport { body: xml.to_string(), requests: requests.clone() };
        let settings = ClientSettings { read_only, ..ClientSettings::new("https://cloud.example.com") };
        let client =
            QueryClient::with_transport(settings, Credentials::new("AK", "SK"), Box::new(transport)).unwrap();
        (client, requests)
    }

    fn make_test_config(format: OutputFormat) -> Config {
        Config {
            endpoint: "https://cloud.example.com".to_string(),
            credentials: Credentials::new("AK", "SK"),
            format,
            ..Config::default()
        }
    }

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_params() {
        let params = parse_params(&args(&["InstanceId.1=i-1", "Filter.1.Value=a=b", "Empty="])).unwrap();
        assert_eq!(params.get("InstanceId.1").map(String::as_str), Some("i-1"));
        assert_eq!(params.get("Filter.1.Value").map(String::as_str), Some("a=b"));
        assert_eq!(params.get("Empty").map(String::as_str), Some(""));
    }

    #[test]
    fn test_parse_params_rejects_malformed() {
        let err = parse_params(&args(&["NoEquals"])).unwrap_err();
        assert!(err.to_string().contains("expected KEY=VALUE"));

        let err = parse_params(&args(&["=value"])).unwrap_err();
        assert!(err.to_string().contains("empty key"));
    }

    #[tokio::test]
    async fn test_invoke_command_outputs_payload() {
        let xml = "<DescribeVpcsResponse><vpcSet><item><vpcId>vpc-1</vpcId></item></vpcSet></DescribeVpcsResponse>";
        let (client, requests) = make_client(xml, false);
        let cmd = InvokeCommand::new(make_test_config(OutputFormat::Compact));

        let output = cmd.execute_with_client(&client, "DescribeVpcs", &args(&["MaxRecords=20"])).await.unwrap();
        assert_eq!(output, r#"{"vpcSet":[{"vpcId":"vpc-1"}]}"#);

        let sent = requests.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("MaxRecords=20"));
    }

    #[tokio::test]
    async fn test_invoke_command_table_output() {
        let xml = "<DescribeVpcsResponse><vpcSet><item><vpcId>vpc-1</vpcId></item></vpcSet></DescribeVpcsResponse>";
        let (client, _) = make_client(xml, false);
        let cmd = InvokeCommand::new(make_test_config(OutputFormat::Table));

        let output = cmd.execute_with_client(&client, "DescribeVpcs", &[]).await.unwrap();
        assert!(output.contains("vpcSet[0].vpcId"));
        assert!(output.contains("vpc-1"));
    }

    #[tokio::test]
    async fn test_invoke_command_read_only_error() {
        let (client, requests) = make_client("<ok/>", true);
        let cmd = InvokeCommand::new(make_test_config(OutputFormat::Json));

        let err = cmd.execute_with_client(&client, "DeleteVpc", &[]).await.unwrap_err();
        assert!(err.to_string().contains("DeleteVpc failed"));
        assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::ReadOnly { .. })));
        assert!(requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invoke_command_vendor_error() {
        let xml = "<Response><Errors><Error><Code>InvalidVpcID.NotFound</Code></Error></Errors></Response>";
        let (client, _) = make_client(xml, false);
        let cmd = InvokeCommand::new(make_test_config(OutputFormat::Json));

        let err = cmd.execute_with_client(&client, "DescribeVpcs", &[]).await.unwrap_err();
        let api = err.downcast_ref::<ApiError>().unwrap();
        assert_eq!(api.vendor().map(|v| v.code.as_str()), Some("InvalidVpcID.NotFound"));
    }

    #[tokio::test]
    async fn test_execute_requires_endpoint() {
        let cmd = InvokeCommand::new(Config::default());
        let err = cmd.execute("DescribeRegions", &[]).await.unwrap_err();
        assert!(err.to_string().contains("No endpoint"));
    }
}
