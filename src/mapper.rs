//! Pure translation between the domain model and the carrier wire format.

// self
use crate::{
	_prelude::*,
	domain::{Address, Package, RateQuote, RateRequest},
	wire::{
		CENTIMETERS, Code, Party, RateRequestBody, RatedShipment, RequestOptions,
		SHOP_ALL_SERVICES, Scalar, Shipment, SimpleWeight, WireAddress, WireDimensions,
		WirePackage, WireRateRequest, WireRateResponse,
	},
};

/// Service code used when a rated shipment omits one.
pub const UNKNOWN_SERVICE_CODE: &str = "UNKNOWN";
/// Currency used when a rated shipment omits one.
pub const DEFAULT_CURRENCY: &str = "USD";

const MISSING_SHIPMENTS_MESSAGE: &str = "Carrier response did not include any rated shipments.";

/// Maps a domain request into the carrier wire request.
///
/// Origin doubles as the ship-from address. The carrier is always asked to rate every
/// service; a service-level hint only adds `Shipment.Service.Code`.
pub fn build_wire_request(request: &RateRequest) -> WireRateRequest {
	let origin = wire_address(&request.origin);

	WireRateRequest {
		rate_request: RateRequestBody {
			request: RequestOptions { request_option: vec![SHOP_ALL_SERVICES.into()] },
			shipment: Shipment {
				shipper: Party { address: origin.clone() },
				ship_to: Party { address: wire_address(&request.destination) },
				ship_from: Party { address: origin },
				package: vec![wire_package(&request.package)],
				service: request
					.service_level
					.as_deref()
					.map(|level| Code::new(service_code_for(level))),
			},
		},
	}
}

/// Resolves a free-text service level into a carrier service code.
///
/// Matching ignores case, spaces, and punctuation (`"2nd Day Air"`, `"2nd-day-air"`); an
/// unrecognized level is returned verbatim.
pub fn service_code_for(level: &str) -> String {
	let normalized = level
		.chars()
		.filter(char::is_ascii_alphanumeric)
		.map(|c| c.to_ascii_lowercase())
		.collect::<String>();
	let code = match normalized.as_str() {
		"ground" => "03",
		"3day" => "12",
		"2ndday" | "2nddayair" => "02",
		"express" | "nextdayair" => "01",
		_ => return level.to_owned(),
	};

	code.to_owned()
}

/// Maps a carrier reply into quotes, preserving carrier order.
///
/// Entries without a parsable, finite, non-negative monetary value are dropped.
pub fn parse_wire_response(response: &WireRateResponse) -> Result<Vec<RateQuote>> {
	let Some(shipments) =
		response.rate_response.as_ref().and_then(|body| body.rated_shipment.as_ref())
	else {
		return Err(missing_shipments(response));
	};

	Ok(shipments.iter().filter_map(quote_from).collect())
}

fn wire_address(address: &Address) -> WireAddress {
	WireAddress {
		address_line: address.lines.clone(),
		city: address.city.clone(),
		state_province_code: address.state_or_province_code.clone(),
		postal_code: address.postal_code.clone(),
		country_code: address.country_code.clone(),
	}
}

fn wire_package(package: &Package) -> WirePackage {
	WirePackage {
		simple_weight: Some(SimpleWeight { weight: package.weight_kg.to_string() }),
		dimensions: package.dimensions.map(|dims| WireDimensions {
			length: dims.length_cm.to_string(),
			width: dims.width_cm.to_string(),
			height: dims.height_cm.to_string(),
			unit: Some(Code::new(CENTIMETERS)),
		}),
		packaging: None,
	}
}

fn quote_from(shipment: &RatedShipment) -> Option<RateQuote> {
	let charges = shipment.total_charges.as_ref()?;
	let total_charge = charges.monetary_value.as_ref().and_then(parse_amount)?;
	let service = shipment.service.as_ref();
	let service_code = service
		.and_then(|service| service.code.clone())
		.unwrap_or_else(|| UNKNOWN_SERVICE_CODE.to_owned());
	let service_name =
		service.and_then(|service| service.name.clone()).unwrap_or_else(|| service_code.clone());
	let currency = charges.currency_code.clone().unwrap_or_else(|| DEFAULT_CURRENCY.to_owned());
	let estimated_transit_days = shipment
		.time_in_transit
		.as_ref()
		.and_then(|transit| transit.service_summary.as_ref())
		.and_then(|summary| summary.estimated_arrival.as_ref())
		.and_then(|arrival| arrival.total_transit_days.as_ref())
		.and_then(parse_days);

	Some(RateQuote { service_code, service_name, total_charge, currency, estimated_transit_days })
}

fn parse_amount(value: &Scalar) -> Option<f64> {
	let amount = match value {
		Scalar::Text(text) => text.trim().parse::<f64>().ok()?,
		Scalar::Number(number) => number.as_f64()?,
	};

	(amount.is_finite() && amount >= 0.).then_some(amount)
}

fn parse_days(value: &Scalar) -> Option<u32> {
	value.as_u64().and_then(|days| u32::try_from(days).ok())
}

fn missing_shipments(response: &WireRateResponse) -> IntegrationError {
	let faults = response
		.response
		.as_ref()
		.and_then(|envelope| envelope.errors.as_ref())
		.map(|errors| {
			errors
				.iter()
				.filter_map(|fault| fault.message.as_deref())
				.filter(|message| !message.is_empty())
				.collect::<Vec<_>>()
				.join("; ")
		})
		.filter(|joined| !joined.is_empty());
	let err = IntegrationError::bad_response(
		faults.unwrap_or_else(|| MISSING_SHIPMENTS_MESSAGE.to_owned()),
	);

	match serde_json::to_string(response) {
		Ok(context) => err.with_context(context),
		Err(_) => err,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		domain::Dimensions,
		wire::{self, Charges, OneOrMany, RateResponseBody, RatedService},
	};

	fn address(city: &str) -> Address {
		Address {
			lines: vec!["123 Main St".into()],
			city: city.into(),
			state_or_province_code: "CA".into(),
			postal_code: "94102".into(),
			country_code: "US".into(),
		}
	}

	fn request() -> RateRequest {
		RateRequest::new(
			address("San Francisco"),
			address("Los Angeles"),
			Package {
				weight_kg: 5.5,
				dimensions: Some(Dimensions { length_cm: 30., width_cm: 20., height_cm: 15. }),
			},
		)
	}

	fn decode(body: &str) -> WireRateResponse {
		wire::decode_response(body.as_bytes()).expect("Fixture should decode.")
	}

	#[test]
	fn package_maps_weight_and_centimeter_dimensions() {
		let wire = build_wire_request(&request());
		let shipment = &wire.rate_request.shipment;
		let package = &shipment.package[0];
		let dimensions = package.dimensions.as_ref().expect("Dimensions should be mapped.");

		assert_eq!(
			package.simple_weight.as_ref().map(|weight| weight.weight.as_str()),
			Some("5.5")
		);
		assert_eq!(
			(dimensions.length.as_str(), dimensions.width.as_str(), dimensions.height.as_str()),
			("30", "20", "15")
		);
		assert_eq!(dimensions.unit, Some(Code::new("CM")));
		assert_eq!(shipment.shipper, shipment.ship_from);
		assert_eq!(shipment.ship_to.address.city, "Los Angeles");
		assert_eq!(wire.rate_request.request.request_option, vec!["Shop".to_owned()]);
		assert_eq!(shipment.service, None);
	}

	#[test]
	fn package_without_dimensions_omits_block() {
		let mut request = request();

		request.package.dimensions = None;

		assert!(build_wire_request(&request).rate_request.shipment.package[0].dimensions.is_none());
	}

	#[test]
	fn service_levels_map_through_lookup() {
		assert_eq!(service_code_for("ground"), "03");
		assert_eq!(service_code_for("Ground"), "03");
		assert_eq!(service_code_for("3-day"), "12");
		assert_eq!(service_code_for("3day"), "12");
		assert_eq!(service_code_for("2nd day"), "02");
		assert_eq!(service_code_for("2nd-day-air"), "02");
		assert_eq!(service_code_for("express"), "01");
		assert_eq!(service_code_for("next day air"), "01");
		assert_eq!(service_code_for("65"), "65");
		assert_eq!(service_code_for("Saver Plus"), "Saver Plus");

		let wire = build_wire_request(&request().with_service_level("ground"));

		assert_eq!(wire.rate_request.shipment.service, Some(Code::new("03")));
		assert_eq!(wire.rate_request.request.request_option, vec!["Shop".to_owned()]);
	}

	#[test]
	fn list_payload_keeps_order_and_values() {
		let response = decode(
			r#"{"RateResponse":{"RatedShipment":[
				{
					"Service":{"Code":"03","Name":"UPS Ground"},
					"TotalCharges":{"CurrencyCode":"USD","MonetaryValue":"24.50"},
					"TimeInTransit":{"ServiceSummary":{"EstimatedArrival":{"TotalTransitDays":"5"}}}
				},
				{
					"Service":{"Code":"02","Name":"UPS 2nd Day Air"},
					"TotalCharges":{"CurrencyCode":"USD","MonetaryValue":"42.00"},
					"TimeInTransit":{"ServiceSummary":{"EstimatedArrival":{"TotalTransitDays":"2"}}}
				}
			]}}"#,
		);
		let quotes = parse_wire_response(&response).expect("List payload should parse.");

		assert_eq!(quotes.len(), 2);
		assert_eq!(quotes[0].service_code, "03");
		assert_eq!(quotes[0].total_charge, 24.5);
		assert_eq!(quotes[0].estimated_transit_days, Some(5));
		assert_eq!(quotes[1].service_name, "UPS 2nd Day Air");
		assert_eq!(quotes[1].total_charge, 42.0);
		assert_eq!(quotes[1].estimated_transit_days, Some(2));
	}

	#[test]
	fn single_object_payload_yields_one_quote_with_defaults() {
		let response = decode(
			r#"{"RateResponse":{"RatedShipment":{"TotalCharges":{"MonetaryValue":"89.99"}}}}"#,
		);
		let quotes = parse_wire_response(&response).expect("Single payload should parse.");

		assert_eq!(
			quotes,
			vec![RateQuote {
				service_code: "UNKNOWN".into(),
				service_name: "UNKNOWN".into(),
				total_charge: 89.99,
				currency: "USD".into(),
				estimated_transit_days: None,
			}]
		);
	}

	#[test]
	fn empty_list_is_not_an_error() {
		let response = decode(r#"{"RateResponse":{"RatedShipment":[]}}"#);

		assert!(parse_wire_response(&response).expect("Empty list should parse.").is_empty());
	}

	#[test]
	fn unusable_entries_are_dropped_and_bad_days_omitted() {
		let response = decode(
			r#"{"RateResponse":{"RatedShipment":[
				{"Service":{"Code":"01"}},
				{"Service":{"Code":"02"},"TotalCharges":{"MonetaryValue":"abc"}},
				{"Service":{"Code":"12"},"TotalCharges":{"MonetaryValue":"-1.00"}},
				{
					"Service":{"Code":"03","Name":"Ground"},
					"TotalCharges":{"CurrencyCode":"CAD","MonetaryValue":17.25},
					"TimeInTransit":{"ServiceSummary":{"EstimatedArrival":{"TotalTransitDays":"soon"}}}
				}
			]}}"#,
		);
		let quotes = parse_wire_response(&response).expect("Payload should parse.");

		assert_eq!(quotes.len(), 1);
		assert_eq!(quotes[0].service_code, "03");
		assert_eq!(quotes[0].currency, "CAD");
		assert_eq!(quotes[0].total_charge, 17.25);
		assert_eq!(quotes[0].estimated_transit_days, None);
	}

	#[test]
	fn odd_field_shapes_only_affect_their_own_entry() {
		let response = decode(
			r#"{"RateResponse":{"RatedShipment":[
				{
					"Service":{"Code":"03","Name":"Ground"},
					"RatedShipmentAlert":{"Code":"110971","Description":"Rates may change."},
					"TotalCharges":{"CurrencyCode":"USD","MonetaryValue":"10.00"}
				},
				{"Service":{"Code":"02"},"TotalCharges":{"MonetaryValue":{"Value":"5.00"}}},
				{
					"Service":{"Code":"01"},
					"TotalCharges":{"CurrencyCode":"USD","MonetaryValue":"45.10"},
					"TimeInTransit":{"ServiceSummary":{"EstimatedArrival":{"TotalTransitDays":true}}}
				},
				{
					"Service":{"Code":"12"},
					"RatedShipmentAlert":[{"Code":"110920"}],
					"TotalCharges":{"CurrencyCode":"USD","MonetaryValue":22.40},
					"TimeInTransit":{"ServiceSummary":{"EstimatedArrival":{"TotalTransitDays":3}}}
				}
			]}}"#,
		);
		let quotes = parse_wire_response(&response).expect("Payload should parse.");
		let codes = quotes.iter().map(|quote| quote.service_code.as_str()).collect::<Vec<_>>();

		assert_eq!(codes, ["03", "01", "12"]);
		assert_eq!(quotes[0].total_charge, 10.);
		assert_eq!(quotes[1].total_charge, 45.1);
		assert_eq!(quotes[1].estimated_transit_days, None);
		assert_eq!(quotes[2].estimated_transit_days, Some(3));
	}

	#[test]
	fn missing_shipments_is_bad_response() {
		let err = parse_wire_response(&decode(r#"{"RateResponse":{"Response":{}}}"#))
			.expect_err("Missing shipments must fail.");

		assert_eq!(err.kind(), ErrorKind::BadResponse);
		assert_eq!(err.message(), MISSING_SHIPMENTS_MESSAGE);
		assert!(err.context().is_some_and(|context| context.contains("RateResponse")));

		let err = parse_wire_response(&WireRateResponse::default())
			.expect_err("Empty responses must fail.");

		assert_eq!(err.kind(), ErrorKind::BadResponse);
	}

	#[test]
	fn fault_messages_are_joined() {
		let response = decode(
			r#"{"response":{"errors":[
				{"code":"111210","message":"The requested service is unavailable"},
				{"code":"111285","message":"Invalid postal code"}
			]}}"#,
		);
		let err = parse_wire_response(&response).expect_err("Fault lists must fail.");

		assert_eq!(err.kind(), ErrorKind::BadResponse);
		assert_eq!(err.message(), "The requested service is unavailable; Invalid postal code");
		assert!(err.context().is_some_and(|context| context.contains("111285")));

		let silent = decode(r#"{"response":{"errors":[{"code":"1"}]}}"#);
		let err = parse_wire_response(&silent).expect_err("Empty fault lists must fail.");

		assert_eq!(err.message(), MISSING_SHIPMENTS_MESSAGE);
	}

	#[test]
	fn echoed_request_round_trips_quote_fields() {
		let wire = build_wire_request(&request().with_service_level("2nd day air"));
		let code = wire.rate_request.shipment.service.clone().map(|service| service.code);
		let echo = WireRateResponse {
			rate_response: Some(RateResponseBody {
				response: None,
				rated_shipment: Some(OneOrMany::One(RatedShipment {
					service: Some(RatedService {
						code: code.clone(),
						name: Some("2nd Day Air".into()),
					}),
					total_charges: Some(Charges {
						currency_code: Some("EUR".into()),
						monetary_value: Some(Scalar::from("123.45")),
					}),
					..Default::default()
				})),
			}),
			response: None,
		};
		let quotes = parse_wire_response(&echo).expect("Echo payload should parse.");

		assert_eq!(code.as_deref(), Some("02"));
		assert_eq!(quotes[0].service_code, "02");
		assert_eq!(quotes[0].service_name, "2nd Day Air");
		assert_eq!(quotes[0].currency, "EUR");
		assert_eq!(quotes[0].total_charge.to_string(), "123.45");
	}
}
