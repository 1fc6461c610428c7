//! EventSub signature verification.
//!
//! Every delivery carries an HMAC-SHA256 signature over `message id ‖ timestamp ‖ raw body`,
//! keyed with the secret given when the subscription was created.

use http::HeaderMap;
use ring::hmac;

use super::{HMAC_PREFIX, TWITCH_MESSAGE_ID, TWITCH_MESSAGE_SIGNATURE, TWITCH_MESSAGE_TIMESTAMP};
use crate::util::constant_time_cmp;

pub type MessageParts<'a> = (&'a str, &'a str, &'a str);

/// Computes the `sha256=<hex>` signature the platform would send for this message.
pub fn signature(secret: &str, id: &str, timestamp: &str, body: &[u8]) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    let signed = hmac::sign(&key, &rebuild_message(id, timestamp, body));

    format!("{}{}", HMAC_PREFIX, hex::encode(signed))
}

/// Checks `received` against the signature recomputed from the message parts.
pub fn verify(secret: &str, id: &str, timestamp: &str, body: &[u8], received: &str) -> bool {
    let expected = signature(secret, id, timestamp, body);
    constant_time_cmp(&expected, received)
}

/// Reads the message id, timestamp and signature headers and verifies them against `body`.
///
/// Missing or non-UTF-8 headers never verify.
pub fn verify_notification(secret: &str, headers: &HeaderMap, body: &[u8]) -> bool {
    match get_message_parts(headers) {
        Some((id, timestamp, received)) => verify(secret, id, timestamp, body, received),
        None => {
            tracing::debug!("delivery is missing signature headers");
            false
        }
    }
}

pub fn get_message_parts(headers: &HeaderMap) -> Option<MessageParts<'_>> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    Some((
        header(TWITCH_MESSAGE_ID)?,
        header(TWITCH_MESSAGE_TIMESTAMP)?,
        header(TWITCH_MESSAGE_SIGNATURE)?,
    ))
}

fn rebuild_message(id: &str, ts: &str, body: &[u8]) -> Vec<u8> {
    let mut m = Vec::with_capacity(id.len() + ts.len() + body.len());
    m.extend_from_slice(id.as_bytes());
    m.extend_from_slice(ts.as_bytes());
    m.extend_from_slice(body);

    m
}

#[cfg(test)]
mod test {
    use http::HeaderValue;

    use super::super::test::CHALLENGE_BODY;
    use super::*;

    const SECRET: &str = "s3cRe7";
    const MESSAGE_ID: &str = "e76c6bd4-55c9-4987-8304-da1588d8988b";
    const TIMESTAMP: &str = "2019-11-16T10:11:12.123Z";
    const EXPECTED: &str =
        "sha256=7e5a96480c29cdf834b371e7a5b049638cba6e425ea51b9b2a9fabf69bc5d227";

    fn headers(id: &str, ts: &str, sig: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(TWITCH_MESSAGE_ID, HeaderValue::from_str(id).unwrap());
        headers.insert(TWITCH_MESSAGE_TIMESTAMP, HeaderValue::from_str(ts).unwrap());
        headers.insert(TWITCH_MESSAGE_SIGNATURE, HeaderValue::from_str(sig).unwrap());
        headers
    }

    #[test]
    fn test_known_signature() {
        assert_eq!(
            signature(SECRET, MESSAGE_ID, TIMESTAMP, CHALLENGE_BODY.as_bytes()),
            EXPECTED
        );
        assert!(verify(
            SECRET,
            MESSAGE_ID,
            TIMESTAMP,
            CHALLENGE_BODY.as_bytes(),
            EXPECTED
        ));
    }

    #[test]
    fn test_verify_notification_from_headers() {
        let headers = headers(MESSAGE_ID, TIMESTAMP, EXPECTED);
        assert!(verify_notification(
            SECRET,
            &headers,
            CHALLENGE_BODY.as_bytes()
        ));
        assert!(!verify_notification(
            "wrong-secret",
            &headers,
            CHALLENGE_BODY.as_bytes()
        ));
    }

    #[test]
    fn test_missing_header_fails() {
        let mut headers = headers(MESSAGE_ID, TIMESTAMP, EXPECTED);
        headers.remove(TWITCH_MESSAGE_TIMESTAMP);

        assert!(get_message_parts(&headers).is_none());
        assert!(!verify_notification(
            SECRET,
            &headers,
            CHALLENGE_BODY.as_bytes()
        ));
    }

    #[test]
    fn test_non_utf8_header_fails() {
        for name in [
            TWITCH_MESSAGE_ID,
            TWITCH_MESSAGE_TIMESTAMP,
            TWITCH_MESSAGE_SIGNATURE,
        ] {
            let mut headers = headers(MESSAGE_ID, TIMESTAMP, EXPECTED);
            headers.insert(name, HeaderValue::from_bytes(b"\xff").unwrap());

            assert!(get_message_parts(&headers).is_none(), "{name}");
            assert!(!verify_notification(
                SECRET,
                &headers,
                CHALLENGE_BODY.as_bytes()
            ));
        }
    }

    #[test]
    fn test_signature_is_deterministic_and_round_trips() {
        let a = signature("0123456789", "id-1", TIMESTAMP, b"{}");
        let b = signature("0123456789", "id-1", TIMESTAMP, b"{}");

        assert_eq!(a, b);
        assert!(a.starts_with(HMAC_PREFIX));
        assert_eq!(a.len(), HMAC_PREFIX.len() + 64);
        assert_eq!(a, a.to_lowercase());
        assert!(verify("0123456789", "id-1", TIMESTAMP, b"{}", &a));
    }

    #[test]
    fn test_each_part_changes_signature() {
        let base = signature(SECRET, MESSAGE_ID, TIMESTAMP, b"{\"a\":1}");

        assert_ne!(
            base,
            signature(SECRET, "f76c6bd4-55c9-4987-8304-da1588d8988b", TIMESTAMP, b"{\"a\":1}")
        );
        assert_ne!(
            base,
            signature(SECRET, MESSAGE_ID, "2019-11-16T10:11:13.123Z", b"{\"a\":1}")
        );
        assert_ne!(base, signature(SECRET, MESSAGE_ID, TIMESTAMP, b"{\"a\":2}"));
        assert_ne!(base, signature("s3cRe8", MESSAGE_ID, TIMESTAMP, b"{\"a\":1}"));
    }

    #[test]
    fn test_empty_body() {
        let sig = signature(SECRET, MESSAGE_ID, TIMESTAMP, b"");
        assert!(verify(SECRET, MESSAGE_ID, TIMESTAMP, b"", &sig));
        assert!(!verify(SECRET, MESSAGE_ID, TIMESTAMP, b" ", &sig));
    }

    #[test]
    fn test_rejects_malformed_signatures() {
        let body = CHALLENGE_BODY.as_bytes();
        let upper = format!("sha256={}", EXPECTED[7..].to_uppercase());
        let unprefixed = &EXPECTED[7..];

        for received in ["", "sha256=", unprefixed, upper.as_str()] {
            assert!(!verify(SECRET, MESSAGE_ID, TIMESTAMP, body, received));
        }
    }
}
