//! Validated carrier identifier.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

/// Identifier of the bundled UPS adapter.
pub const UPS_CARRIER_ID: &str = "ups";

const CARRIER_ID_MAX_LEN: usize = 50;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("Carrier identifier cannot be empty.")]
	Empty,
	/// The identifier contains whitespace characters.
	#[error("Carrier identifier contains whitespace.")]
	ContainsWhitespace,
	/// The identifier exceeded the allowed character count.
	#[error("Carrier identifier exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}
impl From<IdentifierError> for IntegrationError {
	fn from(e: IdentifierError) -> Self {
		let message = e.to_string();

		IntegrationError::validation(message).with_source(e)
	}
}

/// Stable lowercase identifier of a carrier adapter (e.g. `ups`).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CarrierId(String);
impl CarrierId {
	/// Validates `value` and stores it in lowercase.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_lowercase()))
	}

	/// Identifier of the bundled UPS adapter.
	pub fn ups() -> Self {
		Self(UPS_CARRIER_ID.into())
	}

	/// Returns true when `requested` names this carrier, ignoring case.
	pub fn matches(&self, requested: &str) -> bool {
		self.0 == requested.to_lowercase()
	}
}
impl Deref for CarrierId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for CarrierId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for CarrierId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<CarrierId> for String {
	fn from(value: CarrierId) -> Self {
		value.0
	}
}
impl TryFrom<String> for CarrierId {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl FromStr for CarrierId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for CarrierId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Carrier({})", self.0)
	}
}
impl Display for CarrierId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn validate_view(view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace);
	}
	if view.chars().count() > CARRIER_ID_MAX_LEN {
		return Err(IdentifierError::TooLong { max: CARRIER_ID_MAX_LEN });
	}

	Ok(())
}
