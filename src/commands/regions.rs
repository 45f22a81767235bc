//! Regions command implementation.

use crate::api::{CloudClient, QueryClient, Region};
use crate::config::Config;
use crate::format::Formatter;
use anyhow::{Context, Result};
use tracing::info;

/// Connects to the account and lists its regions.
pub struct RegionsCommand {
    config: Config,
}

impl RegionsCommand {
    /// Creates a new regions command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Lists regions and returns formatted output.
    pub async fn execute(&self) -> Result<String> {
        self.config.validate()?;

        let client = QueryClient::new(self.config.settings(), self.config.credentials.clone())
            .context("Failed to create query client")?;

        self.execute_with_client(client).await
    }

    /// Lists regions with a provided client (for testing).
    pub async fn execute_with_client(&self, client: QueryClient) -> Result<String> {
        let cloud = CloudClient::connect(client, self.config.name.clone())
            .await
            .context("Failed to load regions")?;

        let regions: Vec<Region> = cloud.regions().iter().map(|r| r.region().clone()).collect();
        info!("Account {} has {} regions", cloud.account_id(), regions.len());

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_regions(&regions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::TransportError;
    use crate::api::{ClientSettings, Credentials, HttpResponse, Transport};
    use crate::config::OutputFormat;
    use async_trait::async_trait;

    struct MockTransport {
        status: u16,
        body: &'static str,
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn post_form(&self, _url: &str, body: String) -> std::result::Result<HttpResponse, TransportError> {
            assert!(body.starts_with("Action=DescribeRegions&"));
            Ok(HttpResponse::new(self.status, self.body))
        }
    }

    fn make_client(status: u16, body: &'static str) -> QueryClient {
        QueryClient::with_transport(
            ClientSettings::new("https://cloud.example.com"),
            Credentials::new("AK", "SK"),
            Box::new(MockTransport { status, body }),
        )
        .unwrap()
    }

    fn make_test_config(format: OutputFormat) -> Config {
        Config { format, ..Config::default() }
    }

    const REGIONS_XML: &str = r#"
        <DescribeRegionsResponse>
            <regionInfo>
                <item><regionId>cn-east-1</regionId><regionName>East</regionName></item>
                <item><regionId>cn-west-1</regionId><regionName>West</regionName></item>
            </regionInfo>
        </DescribeRegionsResponse>"#;

    #[tokio::test]
    async fn test_regions_table() {
        let cmd = RegionsCommand::new(make_test_config(OutputFormat::Table));
        let output = cmd.execute_with_client(make_client(200, REGIONS_XML)).await.unwrap();

        assert!(output.contains("cn-east-1"));
        assert!(output.contains("West"));
        assert_eq!(output.lines().count(), 4);
    }

    #[tokio::test]
    async fn test_regions_json() {
        let cmd = RegionsCommand::new(make_test_config(OutputFormat::Json));
        let output = cmd.execute_with_client(make_client(200, REGIONS_XML)).await.unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.as_array().map(|a| a.len()), Some(2));
        assert_eq!(parsed[1]["RegionName"], "West");
    }

    #[tokio::test]
    async fn test_regions_failure_has_context() {
        let cmd = RegionsCommand::new(make_test_config(OutputFormat::Table));
        let err = cmd.execute_with_client(make_client(500, "Internal Error")).await.unwrap_err();
        assert!(err.to_string().contains("Failed to load regions"));
    }

    #[test]
    fn test_execute_requires_credentials() {
        let config = Config { endpoint: "https://cloud.example.com".to_string(), ..Config::default() };
        let err = tokio_test::assert_err!(tokio_test::block_on(RegionsCommand::new(config).execute()));
        assert!(err.to_string().contains("Missing credentials"));
    }
}
