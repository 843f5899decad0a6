//! # Follow-List Pagination
//!
//! Pages through the signed followings endpoint until a short or empty page.
//!
//! ## Invariants
//!
//! - Keys are ensured once before the first page; every page is signed with
//!   that pair and a fresh timestamp.
//! - Pages are requested strictly in order; page `n + 1` is only requested
//!   when page `n` was full.
//! - Any failure discards everything accumulated so far. A truncated list
//!   would report a misleadingly low percentage.
//! - Failed pages are not retried.

use crate::api::{FollowListEntry, FollowingsData};
use crate::client::BiliClient;
use crate::endpoints::FOLLOWINGS_URL;
use crate::error::{ClientError, Result};
use crate::transport::ApiRequest;
use ddcheck_wbi::{sign, Params, SigningKeyPair};
use tracing::{debug, error, info};

impl BiliClient {
    /// Fetches the complete follow-list of `vmid`, or nothing.
    ///
    /// Failures are logged and degrade to an empty list so a lookup can
    /// still produce a 0% report.
    pub async fn fetch_all(&self, vmid: u64) -> Vec<FollowListEntry> {
        match self.try_fetch_all(vmid).await {
            Ok(entries) => {
                info!("Fetched {} followings of {}", entries.len(), vmid);
                entries
            }
            Err(e) => {
                error!("Error getting user follow list: {}", e);
                Vec::new()
            }
        }
    }

    /// Fetches the complete follow-list of `vmid`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Wbi`] if keys cannot be obtained before the first page
    /// - [`ClientError::FetchIncomplete`] naming the page that failed
    pub async fn try_fetch_all(&self, vmid: u64) -> Result<Vec<FollowListEntry>> {
        let keys = self.keys.ensure_fresh().await?;
        let page_size = self.config.page_size;

        let mut entries = Vec::new();
        let mut page: u32 = 1;
        loop {
            let batch = self
                .fetch_page(vmid, page, &keys)
                .await
                .map_err(|e| ClientError::FetchIncomplete {
                    page,
                    reason: e.to_string(),
                })?;

            let count = batch.len();
            debug!("Followings of {} page {}: {} entries", vmid, page, count);
            if count == 0 {
                break;
            }
            entries.extend(batch);
            if count != page_size {
                break;
            }
            page += 1;
        }

        Ok(entries)
    }

    async fn fetch_page(
        &self,
        vmid: u64,
        page: u32,
        keys: &SigningKeyPair,
    ) -> Result<Vec<FollowListEntry>> {
        let mut params = Params::new();
        params.insert("vmid".to_string(), vmid.to_string());
        params.insert("pn".to_string(), page.to_string());
        params.insert("ps".to_string(), self.config.page_size.to_string());
        params.insert("order".to_string(), "desc".to_string());
        params.insert("jsonp".to_string(), "jsonp".to_string());
        let signed = sign(params, keys)?;

        let request = ApiRequest::get(FOLLOWINGS_URL, self.config.follow_timeout)
            .signed(&signed)
            .with_credentials();

        let data: FollowingsData = self.fetch_data(&request, "followings").await?;
        Ok(data.list.unwrap_or_default())
    }
}
