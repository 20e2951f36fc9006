//! API base discovery for hubs that serve the publishing component under a
//! sub-path.
//!
//! The hub describes its mounted components at `{hub}/__blocklet__.js?type=json`.
//! If the component is found there its mount point is appended to the hub
//! origin; otherwise the hub URL itself is the API base. Results are cached per
//! hub for the lifetime of the resolver.

use std::time::Duration;

use serde::Deserialize;
use vibe_core::{Cache, HubUrl, MemoryCache};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockletInfo {
    #[serde(default)]
    did: Option<String>,
    #[serde(default)]
    mount_point: Option<String>,
    #[serde(default)]
    component_mount_points: Vec<ComponentMount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComponentMount {
    did: String,
    #[serde(default)]
    mount_point: Option<String>,
}

fn mount_point_for(info: &BlockletInfo, component_did: &str) -> Option<String> {
    if info.did.as_deref() == Some(component_did)
        && let Some(mount) = info.mount_point.as_deref().filter(|m| !m.is_empty())
    {
        return Some(mount.to_string());
    }
    info.component_mount_points
        .iter()
        .find(|c| c.did == component_did)
        .and_then(|c| c.mount_point.clone())
}

fn join_mount(origin: &str, mount: &str) -> String {
    let mount = mount.trim_matches('/');
    if mount.is_empty() {
        origin.to_string()
    } else {
        format!("{origin}/{mount}")
    }
}

pub struct ApiBaseResolver {
    http: reqwest::Client,
    component_did: String,
    timeout: Duration,
    cache: Box<dyn Cache<String>>,
}

impl ApiBaseResolver {
    #[must_use]
    pub fn new(http: reqwest::Client, component_did: impl Into<String>, timeout: Duration) -> Self {
        Self::with_cache(
            http,
            component_did,
            timeout,
            Box::new(MemoryCache::<String>::default()),
        )
    }

    #[must_use]
    pub fn with_cache(
        http: reqwest::Client,
        component_did: impl Into<String>,
        timeout: Duration,
        cache: Box<dyn Cache<String>>,
    ) -> Self {
        Self {
            http,
            component_did: component_did.into(),
            timeout,
            cache,
        }
    }

    /// Resolve the API base for `hub`. Never fails: any discovery problem
    /// falls back to the hub URL.
    pub async fn resolve(&self, hub: &HubUrl) -> String {
        if let Some(base) = self.cache.get(hub.as_str()) {
            return base;
        }

        let base = match self.discover(hub).await {
            Some(mount) => join_mount(&hub.origin(), &mount),
            None => hub.as_str().to_string(),
        };
        tracing::debug!(hub = %hub, api_base = %base, "resolved API base");
        self.cache.set(hub.as_str(), base.clone());
        base
    }

    async fn discover(&self, hub: &HubUrl) -> Option<String> {
        let url = format!("{}/__blocklet__.js?type=json", hub.as_str());
        let resp = match self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                tracing::debug!(status = resp.status().as_u16(), "no blocklet info");
                return None;
            }
            Err(error) => {
                tracing::debug!(%error, "blocklet info request failed");
                return None;
            }
        };
        let info: BlockletInfo = resp.json().await.ok()?;
        mount_point_for(&info, &self.component_did)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(json: &str) -> BlockletInfo {
        serde_json::from_str(json).expect("parse")
    }

    #[test]
    fn main_blocklet_mount_point_is_used() {
        let info = info(r#"{"did":"zMyVibe","mountPoint":"/mw/"}"#);
        assert_eq!(mount_point_for(&info, "zMyVibe").as_deref(), Some("/mw/"));
    }

    #[test]
    fn component_mount_point_is_found() {
        let info = info(
            r#"{"did":"zHost","mountPoint":"/","componentMountPoints":[
                {"did":"zOther","mountPoint":"/other"},
                {"did":"zMyVibe","mountPoint":"/vibes"}
            ]}"#,
        );
        assert_eq!(mount_point_for(&info, "zMyVibe").as_deref(), Some("/vibes"));
        assert_eq!(mount_point_for(&info, "zMissing"), None);
    }

    #[test]
    fn mount_is_joined_onto_origin() {
        assert_eq!(join_mount("https://a.example", "/mw/"), "https://a.example/mw");
        assert_eq!(join_mount("https://a.example", "/"), "https://a.example");
    }

    #[tokio::test]
    async fn cached_base_skips_discovery() {
        let cache = MemoryCache::<String>::default();
        cache.set("https://hub.example", "https://hub.example/cached".to_string());
        let resolver = ApiBaseResolver::with_cache(
            reqwest::Client::new(),
            "zMyVibe",
            Duration::from_millis(1),
            Box::new(cache),
        );
        let hub = HubUrl::parse("https://hub.example/").expect("hub");
        assert_eq!(resolver.resolve(&hub).await, "https://hub.example/cached");
    }
}
