//! Fixed endpoint table for the AppNexus API.
//!
//! Paths are only ever compared for identity when choosing a rate-limit bucket or deciding
//! whether the expiry guard applies; they are never parsed.

/// Authentication service; exchanges credentials for a token.
pub const AUTHENTICATION_SERVICE: &str = "/auth";
/// Current user.
pub const USER_SERVICE: &str = "/user";
/// Members.
pub const MEMBER_SERVICE: &str = "/member";
/// Advertisers.
pub const ADVERTISER_SERVICE: &str = "/advertiser";
/// Insertion orders.
pub const INSERTION_ORDER_SERVICE: &str = "/insertion-order";
/// Line items.
pub const LINE_ITEM_SERVICE: &str = "/line-item";
/// Campaigns.
pub const CAMPAIGN_SERVICE: &str = "/campaign";
/// Creatives.
pub const CREATIVE_SERVICE: &str = "/creative";
/// Publishers.
pub const PUBLISHER_SERVICE: &str = "/publisher";
/// Placements.
pub const PLACEMENT_SERVICE: &str = "/placement";
/// Targeting profiles.
pub const PROFILE_SERVICE: &str = "/profile";
/// Audience segments.
pub const SEGMENT_SERVICE: &str = "/segment";
/// Domain lists.
pub const DOMAIN_LIST_SERVICE: &str = "/domain-list";
/// Conversion pixels.
pub const PIXEL_SERVICE: &str = "/pixel";
/// Report requests.
pub const REPORT_SERVICE: &str = "/report";
/// Report downloads.
pub const REPORT_DOWNLOAD_SERVICE: &str = "/report-download";

/// Returns `true` when `endpoint` is the authentication service.
pub fn is_authentication(endpoint: &str) -> bool {
	endpoint == AUTHENTICATION_SERVICE
}
