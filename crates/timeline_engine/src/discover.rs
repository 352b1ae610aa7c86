use engine_logging::{engine_debug, engine_info};
use serde::Deserialize;

use crate::types::bearer_header;
use crate::{
    exactly_one, extract, script_bundle_urls, ApiRequest, CredentialBundle, DiscoveryError,
    DiscoveryReason, HarvestConfig, HarvestError, Pattern, Transport,
};

#[derive(Debug, Deserialize)]
struct GuestActivation {
    guest_token: Option<String>,
}

/// Values found while scanning script bundles; first match per field wins.
#[derive(Debug, Default)]
struct BundleScan {
    access_token: Option<String>,
    timeline_operation_id: Option<String>,
    profile_operation_id: Option<String>,
}

/// Assembles a [`CredentialBundle`] for one username from public pages.
pub struct Discoverer<'a> {
    transport: &'a dyn Transport,
    config: &'a HarvestConfig,
}

impl<'a> Discoverer<'a> {
    pub fn new(transport: &'a dyn Transport, config: &'a HarvestConfig) -> Self {
        Self { transport, config }
    }

    /// Single attempt; the first failure aborts discovery for this username.
    pub async fn discover(&self, username: &str) -> Result<CredentialBundle, HarvestError> {
        let page_url = self.config.endpoints.profile_page_url(username);
        let page = self.transport.call(&ApiRequest::get(&page_url)).await?;
        let bundles = script_bundle_urls(&page, &page_url);
        engine_debug!("{}: scanning {} script bundles", username, bundles.len());

        let mut scan = BundleScan::default();
        for bundle_url in &bundles {
            let script = self.transport.call(&ApiRequest::get(bundle_url)).await?;
            self.scan_bundle(username, &script, &mut scan)?;
        }

        let access_token = scan
            .access_token
            .ok_or_else(|| DiscoveryError::missing(username, DiscoveryReason::NoBearerToken))?;
        let timeline_operation_id = scan.timeline_operation_id.ok_or_else(|| {
            DiscoveryError::missing(username, DiscoveryReason::NoTimelineOperationId)
        })?;
        let profile_operation_id = scan.profile_operation_id.ok_or_else(|| {
            DiscoveryError::missing(username, DiscoveryReason::NoProfileOperationId)
        })?;

        let guest_token = self.activate_guest(username, &access_token).await?;
        let (user_id, declared_post_count) = self
            .lookup_profile(username, &access_token, &guest_token, &profile_operation_id)
            .await?;

        engine_info!("{}: credentials assembled (user id {})", username, user_id);
        Ok(CredentialBundle {
            access_token,
            timeline_operation_id,
            profile_operation_id,
            user_id,
            declared_post_count,
            guest_token,
        })
    }

    fn scan_bundle(
        &self,
        username: &str,
        script: &str,
        scan: &mut BundleScan,
    ) -> Result<(), DiscoveryError> {
        if scan.access_token.is_none() {
            scan.access_token = extract(Pattern::AccessToken, script).into_iter().next();
        }

        let operations = &self.config.operations;
        if scan.timeline_operation_id.is_none() {
            scan.timeline_operation_id = single_operation(
                username,
                script,
                &operations.timeline,
                DiscoveryReason::NoTimelineOperationId,
            )?;
        }
        if scan.profile_operation_id.is_none() {
            scan.profile_operation_id = single_operation(
                username,
                script,
                &operations.profile,
                DiscoveryReason::NoProfileOperationId,
            )?;
        }
        Ok(())
    }

    async fn activate_guest(
        &self,
        username: &str,
        access_token: &str,
    ) -> Result<String, HarvestError> {
        let (name, value) = bearer_header(access_token);
        let request =
            ApiRequest::post(&self.config.endpoints.guest_activate_url).header(name, value);
        let body = self.transport.call(&request).await?;

        serde_json::from_str::<GuestActivation>(&body)
            .ok()
            .and_then(|activation| activation.guest_token)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| DiscoveryError::missing(username, DiscoveryReason::NoGuestToken).into())
    }

    async fn lookup_profile(
        &self,
        username: &str,
        access_token: &str,
        guest_token: &str,
        operation_id: &str,
    ) -> Result<(String, u64), HarvestError> {
        let query = &self.config.query;
        let url = self
            .config
            .endpoints
            .operation_url(operation_id, &self.config.operations.profile);
        let request = ApiRequest::get(url)
            .headers([
                bearer_header(access_token),
                ("x-guest-token".to_string(), guest_token.to_string()),
            ])
            .query("variables", query.profile_variables_json(username))
            .query("features", query.features_json());
        let body = self.transport.call(&request).await?;

        let user_id = exactly_one(extract(Pattern::NumericId, &body)).map_err(|found| {
            DiscoveryError::with_candidates(username, DiscoveryReason::NoUserId, found)
        })?;
        let count = exactly_one(extract(Pattern::PostCount, &body)).map_err(|found| {
            DiscoveryError::with_candidates(username, DiscoveryReason::NoPostCount, found)
        })?;
        let declared_post_count = count
            .parse::<u64>()
            .map_err(|_| DiscoveryError::missing(username, DiscoveryReason::NoPostCount))?;

        Ok((user_id, declared_post_count))
    }
}

/// `Ok(None)` when the bundle does not mention the operation; two or more
/// descriptors in one bundle are ambiguous and fail rather than guess.
fn single_operation(
    username: &str,
    script: &str,
    operation: &str,
    reason: DiscoveryReason,
) -> Result<Option<String>, DiscoveryError> {
    match exactly_one(extract(Pattern::OperationId(operation), script)) {
        Ok(id) => Ok(Some(id)),
        Err(0) => Ok(None),
        Err(found) => Err(DiscoveryError::with_candidates(username, reason, found)),
    }
}
