//! Carrier-neutral shipment, request, and quote models.

pub mod validation;

pub use validation::FieldIssue;

// self
use crate::_prelude::*;

/// Postal address.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
	/// One to three free-text street lines.
	pub lines: Vec<String>,
	/// City name.
	pub city: String,
	/// Two-character region or state code.
	pub state_or_province_code: String,
	/// Postal code.
	pub postal_code: String,
	/// Two-character country code.
	pub country_code: String,
}

/// Package dimensions in centimeters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
	/// Length in centimeters.
	pub length_cm: f64,
	/// Width in centimeters.
	pub width_cm: f64,
	/// Height in centimeters.
	pub height_cm: f64,
}

/// Physical description of the shipped package.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
	/// Weight in kilograms.
	pub weight_kg: f64,
	/// Optional dimensions.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub dimensions: Option<Dimensions>,
}

/// One caller intent to price a shipment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRequest {
	/// Ship-from address.
	pub origin: Address,
	/// Ship-to address.
	pub destination: Address,
	/// Shipped package.
	pub package: Package,
	/// Free-text service-level hint (for example `ground` or `next day air`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub service_level: Option<String>,
	/// Carrier identifier used to pick a provider.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub carrier_id: Option<String>,
}
impl RateRequest {
	/// Creates a request without service-level or carrier hints.
	pub fn new(origin: Address, destination: Address, package: Package) -> Self {
		Self { origin, destination, package, service_level: None, carrier_id: None }
	}

	/// Sets the service-level hint.
	pub fn with_service_level(mut self, level: impl Into<String>) -> Self {
		self.service_level = Some(level.into());

		self
	}

	/// Sets the requested carrier identifier.
	pub fn with_carrier_id(mut self, carrier_id: impl Into<String>) -> Self {
		self.carrier_id = Some(carrier_id.into());

		self
	}
}

/// One priced carrier service offer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateQuote {
	/// Carrier-defined service code.
	pub service_code: String,
	/// Human-readable service name.
	pub service_name: String,
	/// Total charge; always finite and non-negative.
	pub total_charge: f64,
	/// Currency code.
	pub currency: String,
	/// Estimated transit days, when the carrier reports them.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub estimated_transit_days: Option<u32>,
}

/// Quotes returned by one carrier, in carrier response order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateResponse {
	/// Identifier of the carrier that produced the quotes.
	pub carrier_id: String,
	/// Quotes in carrier order (not sorted by price).
	pub quotes: Vec<RateQuote>,
}
