use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::router::{pattern::normalize, RouteError, RouteUrls};

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_PARAM: &str = "signature";
const EXPIRES_PARAM: &str = "expires";

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("Signing key rejected")]
    InvalidKey,

    #[error("Signature missing")]
    Missing,

    #[error("Signature does not match")]
    Mismatch,

    #[error("Signed link expired")]
    Expired,

    #[error("Invalid expiry '{0}'")]
    InvalidExpiry(String),
}

/// HMAC-SHA256 signer for time-limited links into named routes.
///
/// The signed payload is the relative URL with its query pairs sorted, `expires`
/// included and `signature` excluded, so a link verifies regardless of the order a
/// client sends the query in.
pub struct UrlSigner {
    key: Vec<u8>,
}

impl UrlSigner {
    pub fn new(key: impl AsRef<[u8]>) -> Self {
        Self {
            key: key.as_ref().to_vec(),
        }
    }

    /// Relative URL for `route` carrying `expires` (when given) and `signature`.
    pub fn signed_url(
        &self,
        urls: &RouteUrls,
        route: &str,
        params: &BTreeMap<String, String>,
        expires: Option<DateTime<Utc>>,
    ) -> Result<String, SignatureError> {
        let mut params = params.clone();
        params.remove(SIGNATURE_PARAM);
        match expires {
            Some(at) => params.insert(EXPIRES_PARAM.to_string(), at.timestamp().to_string()),
            None => params.remove(EXPIRES_PARAM),
        };

        let url = urls.url_for(route, &params)?;
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (url.as_str(), None),
        };
        let signature = self.sign(&canonical_payload(path, &decode_pairs(query)))?;

        let separator = if query.is_some() { '&' } else { '?' };
        Ok(format!("{}{}{}={}", url, separator, SIGNATURE_PARAM, signature))
    }

    /// Only the `signature` and, when an expiry was requested, `expires` values, taken
    /// from the URL [`UrlSigner::signed_url`] emits.
    pub fn build_signed_parameters(
        &self,
        urls: &RouteUrls,
        route: &str,
        params: &BTreeMap<String, String>,
        expires: Option<DateTime<Utc>>,
    ) -> Result<BTreeMap<String, String>, SignatureError> {
        let url = self.signed_url(urls, route, params, expires)?;
        let query = url.split_once('?').map(|(_, q)| q);

        Ok(decode_pairs(query)
            .into_iter()
            .filter(|(key, _)| key == SIGNATURE_PARAM || key == EXPIRES_PARAM)
            .collect())
    }

    /// Check a received path and raw query string.
    pub fn verify(&self, path: &str, query: Option<&str>, now: DateTime<Utc>) -> Result<(), SignatureError> {
        let pairs = decode_pairs(query);
        let signature = pairs
            .iter()
            .find(|(key, _)| key == SIGNATURE_PARAM)
            .map(|(_, value)| value.clone())
            .ok_or(SignatureError::Missing)?;
        let rest: Vec<(String, String)> = pairs
            .into_iter()
            .filter(|(key, _)| key != SIGNATURE_PARAM)
            .collect();

        let expected = hex::decode(&signature).map_err(|_| SignatureError::Mismatch)?;
        let mut mac = self.mac()?;
        mac.update(canonical_payload(path, &rest).as_bytes());
        mac.verify_slice(&expected).map_err(|_| SignatureError::Mismatch)?;

        if let Some((_, raw)) = rest.iter().find(|(key, _)| key == EXPIRES_PARAM) {
            let expires: i64 = raw
                .parse()
                .map_err(|_| SignatureError::InvalidExpiry(raw.clone()))?;
            if now.timestamp() > expires {
                return Err(SignatureError::Expired);
            }
        }
        Ok(())
    }

    fn sign(&self, payload: &str) -> Result<String, SignatureError> {
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn mac(&self) -> Result<HmacSha256, SignatureError> {
        HmacSha256::new_from_slice(&self.key).map_err(|_| SignatureError::InvalidKey)
    }
}

fn decode_pairs(query: Option<&str>) -> Vec<(String, String)> {
    url::form_urlencoded::parse(query.unwrap_or("").as_bytes())
        .into_owned()
        .collect()
}

fn canonical_payload(path: &str, pairs: &[(String, String)]) -> String {
    let path = normalize(path);
    if pairs.is_empty() {
        return path;
    }

    let mut sorted = pairs.to_vec();
    sorted.sort();
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(sorted)
        .finish();
    format!("{}?{}", path, query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::{Endpoint, RequestContext, Router, Scope};
    use crate::error::ApiError;
    use chrono::Duration;

    async fn noop(_ctx: RequestContext<()>) -> Result<(), ApiError> {
        Ok(())
    }

    fn urls() -> std::sync::Arc<RouteUrls> {
        let root = Scope::root()
            .route(Endpoint::get("/auth/email/verify/{int:id}/{hash}", noop).named("verification.verify"));
        Router::build(root).unwrap().urls()
    }

    fn params(id: &str, hash: &str) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("id".to_string(), id.to_string());
        params.insert("hash".to_string(), hash.to_string());
        params
    }

    fn split(url: &str) -> (&str, Option<&str>) {
        match url.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (url, None),
        }
    }

    #[test]
    fn signed_url_verifies_until_expiry() {
        let signer = UrlSigner::new("test-key");
        let expires = Utc::now() + Duration::minutes(60);
        let url = signer
            .signed_url(&urls(), "verification.verify", &params("5", "abc"), Some(expires))
            .unwrap();
        let (path, query) = split(&url);

        assert_eq!(path, "/auth/email/verify/5/abc");
        assert!(signer.verify(path, query, Utc::now()).is_ok());
        assert!(matches!(
            signer.verify(path, query, expires + Duration::seconds(1)),
            Err(SignatureError::Expired)
        ));
    }

    #[test]
    fn any_change_to_the_link_breaks_it() {
        let signer = UrlSigner::new("test-key");
        let url = signer
            .signed_url(&urls(), "verification.verify", &params("5", "abc"), Some(Utc::now() + Duration::minutes(5)))
            .unwrap();
        let (_, query) = split(&url);

        assert!(matches!(
            signer.verify("/auth/email/verify/6/abc", query, Utc::now()),
            Err(SignatureError::Mismatch)
        ));

        let later = query.unwrap().replace("expires=", "expires=9");
        assert!(matches!(
            signer.verify("/auth/email/verify/5/abc", Some(&later), Utc::now()),
            Err(SignatureError::Mismatch)
        ));

        assert!(matches!(
            UrlSigner::new("other-key").verify("/auth/email/verify/5/abc", query, Utc::now()),
            Err(SignatureError::Mismatch)
        ));
        assert!(matches!(
            signer.verify("/auth/email/verify/5/abc", None, Utc::now()),
            Err(SignatureError::Missing)
        ));
    }

    #[test]
    fn query_order_does_not_matter() {
        let signer = UrlSigner::new("test-key");
        let mut extra = params("5", "abc");
        extra.insert("lang".to_string(), "en".to_string());
        let url = signer.signed_url(&urls(), "verification.verify", &extra, None).unwrap();
        let (path, query) = split(&url);

        let reversed: Vec<&str> = query.unwrap().split('&').rev().collect();
        assert!(signer.verify(path, Some(&reversed.join("&")), Utc::now()).is_ok());
    }

    #[test]
    fn signed_parameters_come_from_the_emitted_url() {
        let signer = UrlSigner::new("test-key");
        let expires = Utc::now() + Duration::minutes(10);
        let signed = signer
            .build_signed_parameters(&urls(), "verification.verify", &params("5", "abc"), Some(expires))
            .unwrap();

        assert_eq!(signed.keys().collect::<Vec<_>>(), vec!["expires", "signature"]);
        assert_eq!(signed["expires"], expires.timestamp().to_string());

        let query = format!("expires={}&signature={}", signed["expires"], signed["signature"]);
        assert!(signer.verify("/auth/email/verify/5/abc", Some(&query), Utc::now()).is_ok());

        let unexpiring = signer
            .build_signed_parameters(&urls(), "verification.verify", &params("5", "abc"), None)
            .unwrap();
        assert_eq!(unexpiring.keys().collect::<Vec<_>>(), vec!["signature"]);
    }

    #[test]
    fn unknown_route_is_a_route_error() {
        let signer = UrlSigner::new("test-key");
        assert!(matches!(
            signer.signed_url(&urls(), "missing", &BTreeMap::new(), None),
            Err(SignatureError::Route(RouteError::UnknownName(_)))
        ));
    }
}
