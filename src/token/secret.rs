//! Credential material that must never reach logs.
//!
//! Client secrets and bearer tokens travel through spans and config dumps. [`Secret`] formats
//! as a placeholder everywhere; only [`Secret::expose`] hands out the raw value.

// self
use crate::_prelude::*;

/// A client secret or bearer token.
///
/// Formatting shows `<redacted>`, or `<empty>` when nothing was configured, which keeps a
/// missing credential visible in diagnostics without leaking a present one.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);
impl Secret {
	/// Wraps credential material.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Raw value, for request headers and form bodies only.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Whether the carrier or the caller supplied nothing.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	fn placeholder(&self) -> &'static str {
		if self.is_empty() { "<empty>" } else { "<redacted>" }
	}
}
impl From<String> for Secret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl Debug for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Secret({})", self.placeholder())
	}
}
impl Display for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.placeholder())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn bearer_tokens_never_format() {
		let token = Secret::from("eyJraWQiOiJ0ZXN0In0".to_owned());

		assert_eq!(format!("{token:?}"), "Secret(<redacted>)");
		assert_eq!(token.to_string(), "<redacted>");
		assert_eq!(token.expose(), "eyJraWQiOiJ0ZXN0In0");
	}

	#[test]
	fn missing_credentials_stay_visible() {
		let secret = Secret::default();

		assert!(secret.is_empty());
		assert_eq!(format!("{secret:?}"), "Secret(<empty>)");
	}
}
