//! Carrier wire format (UPS Rating API payload shapes).
//!
//! Every optional carrier field is an explicit [`Option`]; defaults are applied by
//! [`crate::mapper`], never here. Reply fields decode leniently: a field whose shape is
//! unusable reads as absent, so one odd rated shipment never poisons its siblings.

// std
use std::marker::PhantomData;
// crates.io
use serde::{
	Deserializer,
	de::{
		DeserializeOwned, MapAccess, SeqAccess, Visitor,
		value::{MapAccessDeserializer, SeqAccessDeserializer},
	},
};
// self
use crate::_prelude::*;

/// Request option that asks the carrier to rate every available service.
pub const SHOP_ALL_SERVICES: &str = "Shop";
/// Length unit code attached to package dimensions.
pub const CENTIMETERS: &str = "CM";

/// Rate request envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireRateRequest {
	/// Request body.
	pub rate_request: RateRequestBody,
}

/// Body of [`WireRateRequest`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RateRequestBody {
	/// Request options.
	pub request: RequestOptions,
	/// Shipment description.
	pub shipment: Shipment,
}

/// Request-level options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestOptions {
	/// Rating mode(s), e.g. [`SHOP_ALL_SERVICES`].
	#[serde(default)]
	pub request_option: Vec<String>,
}

/// Shipment parties, packages, and optional service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Shipment {
	/// Shipper party.
	pub shipper: Party,
	/// Recipient party.
	pub ship_to: Party,
	/// Ship-from party.
	pub ship_from: Party,
	/// Packages.
	pub package: Vec<WirePackage>,
	/// Requested service.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub service: Option<Code>,
}

/// Party wrapper.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Party {
	/// Party address.
	pub address: WireAddress,
}

/// Carrier address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireAddress {
	/// Street lines.
	pub address_line: Vec<String>,
	/// City.
	pub city: String,
	/// Region or state code.
	pub state_province_code: String,
	/// Postal code.
	pub postal_code: String,
	/// Country code.
	pub country_code: String,
}

/// Carrier package.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WirePackage {
	/// Package weight.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub simple_weight: Option<SimpleWeight>,
	/// Package dimensions.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub dimensions: Option<WireDimensions>,
	/// Packaging type.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub packaging: Option<Code>,
}

/// Weight as a decimal string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SimpleWeight {
	/// Weight value.
	pub weight: String,
}

/// Dimensions as decimal strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireDimensions {
	/// Length.
	pub length: String,
	/// Width.
	pub width: String,
	/// Height.
	pub height: String,
	/// Length unit.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub unit: Option<Code>,
}

/// `{ "Code": ... }` wrapper.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Code {
	/// Code value.
	pub code: String,
}
impl Code {
	/// Wraps a code.
	pub fn new(code: impl Into<String>) -> Self {
		Self { code: code.into() }
	}
}

/// Rate response envelope: either rated shipments or a fault list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WireRateResponse {
	/// Successful rating payload.
	#[serde(rename = "RateResponse", default, skip_serializing_if = "Option::is_none")]
	pub rate_response: Option<RateResponseBody>,
	/// Structured carrier faults.
	#[serde(rename = "response", default, skip_serializing_if = "Option::is_none")]
	pub response: Option<FaultEnvelope>,
}

/// Body of a successful rating reply.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RateResponseBody {
	/// Carrier status block.
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub response: Option<ResponseStatusBlock>,
	/// One rated shipment or a list of them.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub rated_shipment: Option<OneOrMany<RatedShipment>>,
}

/// Carrier status block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseStatusBlock {
	/// Status code + description.
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub response_status: Option<ResponseStatus>,
}

/// Status code + description.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseStatus {
	/// Status code (`1` on success).
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub code: Option<String>,
	/// Status description.
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}

/// A payload that the carrier sends either as a single object or as a list.
///
/// Decoding dispatches on the JSON shape: an array is always the list form, an object is
/// always the single form.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
	/// List form.
	Many(Vec<T>),
	/// Single-object form.
	One(T),
}
impl<T> OneOrMany<T> {
	/// Normalizes to a list, keeping carrier order.
	pub fn into_vec(self) -> Vec<T> {
		match self {
			OneOrMany::Many(items) => items,
			OneOrMany::One(item) => vec![item],
		}
	}

	/// Borrows as a slice-like iterator, keeping carrier order.
	pub fn iter(&self) -> std::slice::Iter<'_, T> {
		match self {
			OneOrMany::Many(items) => items.iter(),
			OneOrMany::One(item) => std::slice::from_ref(item).iter(),
		}
	}
}
impl<'de, T> Deserialize<'de> for OneOrMany<T>
where
	T: Deserialize<'de>,
{
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		deserializer.deserialize_any(OneOrManyVisitor(PhantomData))
	}
}

struct OneOrManyVisitor<T>(PhantomData<T>);
impl<'de, T> Visitor<'de> for OneOrManyVisitor<T>
where
	T: Deserialize<'de>,
{
	type Value = OneOrMany<T>;

	fn expecting(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("an object or a list of objects")
	}

	fn visit_seq<A>(self, seq: A) -> Result<Self::Value, A::Error>
	where
		A: SeqAccess<'de>,
	{
		Vec::deserialize(SeqAccessDeserializer::new(seq)).map(OneOrMany::Many)
	}

	fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
	where
		A: MapAccess<'de>,
	{
		T::deserialize(MapAccessDeserializer::new(map)).map(OneOrMany::One)
	}
}

/// One priced service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RatedShipment {
	/// Service code + name.
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub service: Option<RatedService>,
	/// Carrier advisories.
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub rated_shipment_alert: Option<OneOrMany<RatedShipmentAlert>>,
	/// Total charges.
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub total_charges: Option<Charges>,
	/// Charges for service options.
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub service_options_charges: Option<Charges>,
	/// Transit estimate.
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub time_in_transit: Option<TimeInTransit>,
}

/// Service identification in a reply.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RatedService {
	/// Service code.
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub code: Option<String>,
	/// Service name.
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
}

/// Carrier advisory attached to a rated shipment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RatedShipmentAlert {
	/// Alert code.
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub code: Option<String>,
	/// Alert description.
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}

/// Monetary amount.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Charges {
	/// Currency code.
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub currency_code: Option<String>,
	/// Amount as sent by the carrier.
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub monetary_value: Option<Scalar>,
}

/// Transit estimate wrapper.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimeInTransit {
	/// Summary block.
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub service_summary: Option<ServiceSummary>,
}

/// Transit summary.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceSummary {
	/// Arrival estimate.
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub estimated_arrival: Option<EstimatedArrival>,
}

/// Arrival estimate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EstimatedArrival {
	/// Business days in transit.
	#[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
	pub total_transit_days: Option<Scalar>,
}

/// Scalar the carrier may encode as a JSON string or a JSON number.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
	/// String form, e.g. `"24.50"`.
	Text(String),
	/// Number form, e.g. `24.5`.
	Number(serde_json::Number),
}
impl Scalar {
	/// Reads a non-negative integer from either form, e.g. `"14399"` or `14399`.
	pub fn as_u64(&self) -> Option<u64> {
		match self {
			Scalar::Text(text) => text.trim().parse().ok(),
			Scalar::Number(number) => number.as_u64(),
		}
	}

	/// Returns the textual form without reformatting string values.
	pub fn to_text(&self) -> String {
		match self {
			Scalar::Text(text) => text.clone(),
			Scalar::Number(number) => number.to_string(),
		}
	}
}
impl From<&str> for Scalar {
	fn from(value: &str) -> Self {
		Scalar::Text(value.to_owned())
	}
}

/// Structured fault list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultEnvelope {
	/// Faults in carrier order.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub errors: Option<Vec<CarrierFault>>,
}

/// One carrier fault.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierFault {
	/// Fault code.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub code: Option<String>,
	/// Fault message.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}

/// Reads an optional field, treating any shape `T` cannot decode as absent.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
	D: Deserializer<'de>,
	T: DeserializeOwned,
{
	let value = serde_json::Value::deserialize(deserializer)?;

	Ok(T::deserialize(value).ok())
}

/// Decodes a rate response body, failing with `BAD_RESPONSE` on malformed payloads.
pub fn decode_response(body: &[u8]) -> Result<WireRateResponse> {
	let deserializer = &mut serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(deserializer).map_err(|err| {
		IntegrationError::bad_response(format!(
			"submit_rate_request: rate response could not be decoded at `{}`",
			err.path()
		))
		.with_context(String::from_utf8_lossy(body))
		.with_source(err)
	})
}
