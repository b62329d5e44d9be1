//! Request nonces and signed tokens.
//!
//! A nonce proves that a request comes from a page the server rendered for a
//! given user. It is an HMAC-SHA256 over the user id, the role, the action
//! name and a 12 hour time tick. A nonce is accepted during the tick it was
//! issued in and the following one, so it lives between 12 and 24 hours.
//!
//! The same keyed signature is used for other server-issued tokens (like the
//! bulk conversion cursor), separated by a purpose string.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::prelude::*;
use webpify_types::types::{AuthCtx, Role};

type HmacSha256 = Hmac<Sha256>;

/// Action every admin request nonce is bound to
pub const NONCE_ACTION: &str = "webp_opt_nonce";

/// Length of a nonce tick in seconds
pub const NONCE_TICK: i64 = 12 * 3600;

const MIN_SECRET_LEN: usize = 16;

pub struct NonceService {
	secret: Box<[u8]>,
}

impl NonceService {
	pub fn new(secret: impl AsRef<[u8]>) -> ClResult<Self> {
		let secret = secret.as_ref();
		if secret.len() < MIN_SECRET_LEN {
			return Err(Error::ConfigError(format!(
				"secret must be at least {} bytes long",
				MIN_SECRET_LEN
			)));
		}
		Ok(Self { secret: secret.into() })
	}

	fn mac(&self, purpose: &str, payload: &[u8]) -> ClResult<HmacSha256> {
		let mut mac = HmacSha256::new_from_slice(&self.secret)
			.map_err(|_| Error::Internal("invalid hmac key".into()))?;
		mac.update(purpose.as_bytes());
		mac.update(b"\0");
		mac.update(payload);
		Ok(mac)
	}

	/// Sign an opaque payload, returns `<payload>.<signature>` (base64url)
	pub fn sign(&self, purpose: &str, payload: &[u8]) -> ClResult<String> {
		let sig = self.mac(purpose, payload)?.finalize().into_bytes();
		Ok(format!("{}.{}", URL_SAFE_NO_PAD.encode(payload), URL_SAFE_NO_PAD.encode(sig)))
	}

	/// Check a token produced by `sign` and return its payload
	///
	/// Any defect (shape, encoding, signature) is reported as `Error::Parse`,
	/// callers map it to the error that fits their context.
	pub fn verify(&self, purpose: &str, token: &str) -> ClResult<Vec<u8>> {
		let (payload, sig) = token.split_once('.').ok_or(Error::Parse)?;
		let payload = URL_SAFE_NO_PAD.decode(payload).map_err(|_| Error::Parse)?;
		let sig = URL_SAFE_NO_PAD.decode(sig).map_err(|_| Error::Parse)?;
		self.mac(purpose, &payload)?.verify_slice(&sig).map_err(|_| Error::Parse)?;
		Ok(payload)
	}

	/// Issue a nonce for a user at the given time
	pub fn create_nonce(&self, auth: &AuthCtx, now: Timestamp) -> ClResult<String> {
		let payload = format!("{}:{}:{}", auth.user_id, auth.role.as_str(), tick(now));
		self.sign(NONCE_ACTION, payload.as_bytes())
	}

	/// Verify a nonce, returning the identity it was issued to
	pub fn verify_nonce(&self, nonce: &str, now: Timestamp) -> ClResult<AuthCtx> {
		let payload = self.verify(NONCE_ACTION, nonce).map_err(|_| Error::InvalidNonce)?;
		let payload = std::str::from_utf8(&payload).map_err(|_| Error::InvalidNonce)?;

		let mut parts = payload.splitn(3, ':');
		let user_id = parts.next().and_then(|s| s.parse::<u32>().ok());
		let role = parts.next().and_then(Role::from_str_opt);
		let issued = parts.next().and_then(|s| s.parse::<i64>().ok());
		let (Some(user_id), Some(role), Some(issued)) = (user_id, role, issued) else {
			return Err(Error::InvalidNonce);
		};

		let current = tick(now);
		if issued != current && issued + 1 != current {
			debug!("expired nonce for user {} (tick {} vs {})", user_id, issued, current);
			return Err(Error::InvalidNonce);
		}

		Ok(AuthCtx { user_id, role })
	}
}

fn tick(now: Timestamp) -> i64 {
	now.0.div_euclid(NONCE_TICK)
}

impl std::fmt::Debug for NonceService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NonceService").finish_non_exhaustive()
	}
}


// vim: ts=4
