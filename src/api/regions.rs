//! Account-level client holding the region list fetched at connect time.

use crate::api::client::QueryClient;
use crate::api::error::{ApiError, Result};
use crate::api::tree::ResponseTree;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Action used to enumerate regions.
pub const DESCRIBE_REGIONS: &str = "DescribeRegions";

/// Capability names reported for this provider; every one is read-only.
pub const CAPABILITIES: [&str; 3] = ["compute+readonly", "network+readonly", "eip+readonly"];

/// One entry of `DescribeRegions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    #[serde(rename = "RegionId", alias = "regionId", default)]
    pub region_id: String,
    #[serde(rename = "RegionName", alias = "regionName", default)]
    pub region_name: String,
    #[serde(rename = "RegionEndpoint", alias = "regionEndpoint", default)]
    pub region_endpoint: String,
    #[serde(rename = "Hypervisor", alias = "hypervisor", default)]
    pub hypervisor: String,
    #[serde(rename = "NetworkMode", alias = "networkMode", default)]
    pub network_mode: String,
}

impl Region {
    /// Decodes the `regionInfo` list of a `DescribeRegions` payload.
    ///
    /// A missing `regionInfo` means the account has no regions.
    pub fn list_from_tree(payload: &ResponseTree) -> Result<Vec<Region>> {
        match payload.get("regionInfo") {
            Some(info) => Ok(info.decode("region list")?),
            None => Ok(Vec::new()),
        }
    }
}

/// Sub-account descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubAccount {
    pub account: String,
    pub name: String,
}

/// Query client plus the regions it can reach.
pub struct CloudClient {
    client: QueryClient,
    name: String,
    regions: Vec<Region>,
}

impl CloudClient {
    /// Fetches the region list once and caches it. Fails if the listing fails.
    pub async fn connect(client: QueryClient, name: impl Into<String>) -> Result<Self> {
        let payload = client.invoke(DESCRIBE_REGIONS, &BTreeMap::new()).await?;
        let regions = Region::list_from_tree(&payload)?;

        info!("Loaded {} regions from {}", regions.len(), client.endpoint());
        Ok(Self::with_regions(client, name, regions))
    }

    /// Builds a client around an already known region list.
    pub fn with_regions(client: QueryClient, name: impl Into<String>, regions: Vec<Region>) -> Self {
        Self { client, name: name.into(), regions }
    }

    pub fn client(&self) -> &QueryClient {
        &self.client
    }

    /// The endpoint doubles as the account identifier.
    pub fn account_id(&self) -> &str {
        self.client.endpoint()
    }

    pub fn sub_account(&self) -> SubAccount {
        SubAccount { account: self.client.access_key().to_string(), name: self.name.clone() }
    }

    pub fn capabilities(&self) -> &'static [&'static str] {
        &CAPABILITIES
    }

    /// Handles for all cached regions, in listing order.
    pub fn regions(&self) -> Vec<RegionHandle<'_>> {
        self.regions.iter().map(|region| RegionHandle { owner: self, region }).collect()
    }

    /// Looks a region up by id. An empty id selects the first region.
    pub fn region(&self, id: &str) -> Result<RegionHandle<'_>> {
        let found = if id.is_empty() {
            self.regions.first()
        } else {
            self.regions.iter().find(|r| r.region_id == id)
        };

        match found {
            Some(region) => Ok(RegionHandle { owner: self, region }),
            None => {
                debug!("Region {:?} not among {} cached regions", id, self.regions.len());
                Err(ApiError::NotFound(id.to_string()))
            }
        }
    }

    /// Forwards to [`QueryClient::invoke`].
    pub async fn invoke(&self, action: &str, params: &BTreeMap<String, String>) -> Result<ResponseTree> {
        self.client.invoke(action, params).await
    }
}

/// A cached region borrowed together with the client that owns it.
#[derive(Clone, Copy)]
pub struct RegionHandle<'a> {
    owner: &'a CloudClient,
    region: &'a Region,
}

impl<'a> RegionHandle<'a> {
    pub fn region(&self) -> &'a Region {
        self.region
    }

    pub fn id(&self) -> &'a str {
        &self.region.region_id
    }

    pub fn name(&self) -> &'a str {
        &self.region.region_name
    }

    pub fn client(&self) -> &'a CloudClient {
        self.owner
    }

    /// Issues a request through the owning client.
    pub async fn invoke(&self, action: &str, params: &BTreeMap<String, String>) -> Result<ResponseTree> {
        self.owner.invoke(action, params).await
    }
}

impl std::fmt::Debug for RegionHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionHandle").field("region", self.region).finish()
    }
}
