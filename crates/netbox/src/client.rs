use crate::config::NetBoxConfig;
use crate::error::{NetBoxError, Result};
use crate::models::{self, Device, Page, Rack, Site, Status};
use async_trait::async_trait;
use rackguard_snapshot::{FacilityData, SnapshotSource};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;

const PAGE_LIMIT: &str = "1000";

/// Read-only NetBox REST client
#[derive(Debug, Clone)]
pub struct NetBoxClient {
    config: NetBoxConfig,
    http: Client,
}

impl NetBoxClient {
    pub fn new(config: NetBoxConfig) -> Result<Self> {
        if !config.is_configured() {
            return Err(NetBoxError::NotConfigured(
                "missing URL or token".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(&format!("Token {}", config.token.trim()))
            .map_err(|_| NetBoxError::NotConfigured("token contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, token);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if !config.verify_tls {
            log::warn!("TLS certificate verification disabled for {}", config.url);
        }
        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &NetBoxConfig {
        &self.config
    }

    /// NetBox version reported by the `status/` endpoint
    pub async fn test_connection(&self) -> Result<String> {
        let status: Status = self.get(&self.endpoint("status/"), &[]).await?;
        Ok(status
            .netbox_version
            .unwrap_or_else(|| "unknown".to_string()))
    }

    /// Numeric identifiers are tried as ids first, then everything as a slug.
    pub async fn resolve_site(&self, identifier: &str) -> Result<Site> {
        let identifier = identifier.trim();
        if !identifier.is_empty() && identifier.chars().all(|c| c.is_ascii_digit()) {
            match self
                .get::<Site>(&self.endpoint(&format!("dcim/sites/{identifier}/")), &[])
                .await
            {
                Ok(site) => return Ok(site),
                Err(NetBoxError::Status { status: 404, .. }) => {
                    log::debug!("No site with id {identifier}; trying it as a slug");
                }
                Err(err) => return Err(err),
            }
        }

        let page: Page<Site> = self
            .get(&self.endpoint("dcim/sites/"), &[("slug", identifier)])
            .await?;
        page.results
            .into_iter()
            .next()
            .ok_or_else(|| NetBoxError::SiteNotFound(identifier.to_string()))
    }

    /// Racks and racked devices of one site
    pub async fn fetch_site(&self, identifier: &str) -> Result<FacilityData> {
        let identifier = match identifier.trim() {
            "" => self.config.site.as_deref().unwrap_or("").trim(),
            given => given,
        };
        if identifier.is_empty() {
            return Err(NetBoxError::NotConfigured("no site specified".to_string()));
        }

        let site = self.resolve_site(identifier).await?;
        let site_id = site.id.to_string();
        log::info!("Fetching racks and devices for site '{}' (id {})", site.name, site.id);

        let racks: Vec<Rack> = self
            .get_all("dcim/racks/", &[("site_id", site_id.as_str())])
            .await?;
        let devices: Vec<Device> = self
            .get_all("dcim/devices/", &[("site_id", site_id.as_str())])
            .await?;

        let device_total = devices.len();
        let occupants: Vec<_> = devices
            .into_iter()
            .filter_map(models::occupant_record)
            .collect();
        log::debug!(
            "Site '{}': {} rack(s), {} of {} device(s) mounted",
            site.name,
            racks.len(),
            occupants.len(),
            device_total
        );

        Ok(FacilityData {
            facility: site.name,
            racks: racks.into_iter().map(models::rack_record).collect(),
            occupants,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base(), path)
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        log::debug!("GET {url}");
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NetBoxError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }

    /// Every page of a list endpoint, following `next` links as given
    async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        filters: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let mut query = vec![("limit", PAGE_LIMIT)];
        query.extend_from_slice(filters);

        let mut page: Page<T> = self.get(&self.endpoint(path), &query).await?;
        let mut results = std::mem::take(&mut page.results);
        let mut pages = 1usize;

        while let Some(next) = page.next.take().filter(|next| !next.is_empty()) {
            page = self.get(&next, &[]).await?;
            results.append(&mut page.results);
            pages += 1;
        }
        log::debug!("{path}: {} item(s) over {pages} page(s)", results.len());
        Ok(results)
    }
}

#[async_trait]
impl SnapshotSource for NetBoxClient {
    async fn fetch(&self, facility: &str) -> rackguard_snapshot::Result<FacilityData> {
        Ok(self.fetch_site(facility).await?)
    }
}
