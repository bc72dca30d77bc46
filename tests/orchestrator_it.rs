mod common;

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
// self
use carrier_rates::{
	carrier::{CarrierId, CarrierRateAdapter, RateProvider},
	error::ErrorKind,
	rates::{NO_PROVIDERS_MESSAGE, RateOrchestrator},
};
use common::{ScriptedTransport, TWO_QUOTES, rate_request};

fn adapter(id: &str, transport: &Arc<ScriptedTransport>) -> CarrierRateAdapter<ScriptedTransport> {
	CarrierRateAdapter::new(
		CarrierId::new(id).expect("Carrier fixture should be valid."),
		Arc::clone(transport),
	)
}

#[tokio::test]
async fn missing_identifier_always_selects_first_provider() -> Result<()> {
	let ups = ScriptedTransport::new()
		.grant("ups-token")
		.respond(TWO_QUOTES)
		.respond(TWO_QUOTES)
		.respond(TWO_QUOTES)
		.shared();
	let fedex = ScriptedTransport::new().grant("fedex-token").respond(TWO_QUOTES).shared();
	let orchestrator = RateOrchestrator::default()
		.with_provider(adapter("ups", &ups))
		.with_provider(adapter("fedex", &fedex));

	for _ in 0..3 {
		let response = orchestrator.get_rates(&rate_request()).await?;

		assert_eq!(response.carrier_id, "ups");
	}

	assert_eq!(ups.submit_calls(), 3);
	assert_eq!(fedex.network_calls(), 0);

	Ok(())
}

#[tokio::test]
async fn named_identifier_matches_ignoring_case() -> Result<()> {
	let ups = ScriptedTransport::new().shared();
	let fedex = ScriptedTransport::new().grant("fedex-token").respond(TWO_QUOTES).shared();
	let orchestrator = RateOrchestrator::default()
		.with_provider(adapter("ups", &ups))
		.with_provider(adapter("fedex", &fedex));
	let response = orchestrator.get_rates(&rate_request().with_carrier_id("FEDEX")).await?;

	assert_eq!(response.carrier_id, "fedex");
	assert_eq!(response.quotes.len(), 2);
	assert_eq!(ups.network_calls(), 0);
	assert_eq!(fedex.seen_tokens(), vec!["fedex-token".to_owned()]);

	Ok(())
}

#[tokio::test]
async fn unknown_identifier_fails_without_network_calls() {
	let ups = ScriptedTransport::new().grant("ups-token").respond(TWO_QUOTES).shared();
	let fedex = ScriptedTransport::new().grant("fedex-token").respond(TWO_QUOTES).shared();
	let orchestrator = RateOrchestrator::new([
		Arc::new(adapter("ups", &ups)) as Arc<dyn RateProvider>,
		Arc::new(adapter("fedex", &fedex)) as Arc<dyn RateProvider>,
	]);
	let err = orchestrator
		.get_rates(&rate_request().with_carrier_id("dhl"))
		.await
		.expect_err("Unknown carriers must fail.");

	assert_eq!(err.kind(), ErrorKind::ValidationError);
	assert_eq!(err.message(), "Unknown carrier: dhl. Available: ups, fedex");
	assert_eq!(ups.network_calls() + fedex.network_calls(), 0);
}

#[tokio::test]
async fn empty_orchestrator_is_a_server_error() {
	let err = RateOrchestrator::default()
		.get_rates(&rate_request())
		.await
		.expect_err("Orchestrators without providers must fail.");

	assert_eq!(err.kind(), ErrorKind::CarrierServerError);
	assert_eq!(err.message(), NO_PROVIDERS_MESSAGE);
	assert_eq!(err.response_status(), 502);
}

#[tokio::test]
async fn provider_errors_pass_through_unchanged() {
	let ups = ScriptedTransport::new()
		.grant("ups-token")
		.fail(common::status_failure(503).with_context("{\"code\":\"9999\"}"))
		.shared();
	let orchestrator = RateOrchestrator::default().with_provider(adapter("ups", &ups));
	let err = orchestrator.get_rates(&rate_request()).await.expect_err("Server errors must fail.");

	assert_eq!(err.kind(), ErrorKind::CarrierServerError);
	assert_eq!(err.status(), Some(503));
	assert_eq!(err.response_status(), 503);
	assert_eq!(err.context(), Some("{\"code\":\"9999\"}"));
	assert_eq!(
		serde_json::to_value(err.body()).expect("Error body should serialize."),
		serde_json::json!({
			"error": { "code": "CARRIER_SERVER_ERROR", "message": "submit_rate_request: HTTP 503" }
		})
	);
	assert_eq!(orchestrator.carrier_ids().len(), 1);
}
