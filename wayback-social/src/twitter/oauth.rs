//! OAuth 1.0a request signing for the posting path.
//!
//! App-only bearer tokens cover the stream and lookups, but creating a tweet
//! needs a user-context signature built from the four configured credential
//! strings. Implements RFC 5849 HMAC-SHA1 signing; the known test vector
//! from the platform documentation pins the algorithm down.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::Rng;
use rand::distr::Alphanumeric;
use sha1::Sha1;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha1 = Hmac<Sha1>;

/// Everything except RFC 3986 unreserved characters gets percent-encoded.
const OAUTH_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn enc(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE).to_string()
}

#[derive(Clone)]
pub struct OAuth1 {
    consumer_key: String,
    consumer_secret: String,
    access_token: String,
    access_secret: String,
}

impl OAuth1 {
    pub fn new(
        consumer_key: String,
        consumer_secret: String,
        access_token: String,
        access_secret: String,
    ) -> Self {
        Self {
            consumer_key,
            consumer_secret,
            access_token,
            access_secret,
        }
    }

    /// Build a signed `Authorization` header value for `method` on `url`.
    ///
    /// `params` must contain every query and form-encoded body parameter of
    /// the request; JSON bodies contribute nothing to the signature.
    pub fn authorization_header(&self, method: &str, url: &str, params: &[(&str, &str)]) -> String {
        let nonce: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.header_with(method, url, params, &nonce, &timestamp.to_string())
    }

    fn header_with(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        nonce: &str,
        timestamp: &str,
    ) -> String {
        let signature = self.signature(method, url, params, nonce, timestamp);

        let fields = [
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature", signature.as_str()),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp),
            ("oauth_token", self.access_token.as_str()),
            ("oauth_version", "1.0"),
        ];
        let joined = fields
            .iter()
            .map(|(k, v)| format!(r#"{}="{}""#, k, enc(v)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("OAuth {joined}")
    }

    fn signature(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        nonce: &str,
        timestamp: &str,
    ) -> String {
        // Encode first, then sort by encoded key/value per the spec.
        let mut pairs: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (enc(k), enc(v)))
            .collect();
        for (k, v) in [
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp),
            ("oauth_token", self.access_token.as_str()),
            ("oauth_version", "1.0"),
        ] {
            pairs.push((enc(k), enc(v)));
        }
        pairs.sort();

        let param_string = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let base = format!(
            "{}&{}&{}",
            method.to_ascii_uppercase(),
            enc(url),
            enc(&param_string)
        );
        let signing_key = format!("{}&{}", enc(&self.consumer_secret), enc(&self.access_secret));

        let mut mac = HmacSha1::new_from_slice(signing_key.as_bytes()).expect("hmac accepts any key length");
        mac.update(base.as_bytes());
        BASE64.encode(mac.finalize().into_bytes())
    }
}
