//! Structural validation for [`RateRequest`] values.
//!
//! Violations are collected rather than short-circuited so a single
//! [`ErrorKind::ValidationError`] lists every offending field.

// self
use crate::{
	_prelude::*,
	domain::{Address, Package, RateRequest},
};

const MAX_ADDRESS_LINES: usize = 3;
const MAX_CITY_LEN: usize = 100;
const REGION_CODE_LEN: usize = 2;
const MAX_POSTAL_CODE_LEN: usize = 20;
const MAX_SERVICE_LEVEL_LEN: usize = 50;
const MAX_CARRIER_ID_LEN: usize = 50;

/// One offending field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldIssue {
	/// Dotted path using serialized field names (e.g. `origin.countryCode`).
	pub path: String,
	/// Reason the value was rejected.
	pub reason: String,
}
impl FieldIssue {
	fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
		Self { path: path.into(), reason: reason.into() }
	}
}
impl Display for FieldIssue {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}: {}", self.path, self.reason)
	}
}

impl RateRequest {
	/// Returns every structural violation in field order.
	pub fn issues(&self) -> Vec<FieldIssue> {
		let mut issues = Vec::new();

		check_address("origin", &self.origin, &mut issues);
		check_address("destination", &self.destination, &mut issues);
		check_package(&self.package, &mut issues);

		if let Some(level) = &self.service_level
			&& char_len(level) > MAX_SERVICE_LEVEL_LEN
		{
			issues.push(FieldIssue::new(
				"serviceLevel",
				format!("must be at most {MAX_SERVICE_LEVEL_LEN} characters"),
			));
		}
		// An empty identifier means "no preference".
		if let Some(carrier_id) = &self.carrier_id
			&& char_len(carrier_id) > MAX_CARRIER_ID_LEN
		{
			issues.push(FieldIssue::new(
				"carrierId",
				format!("must be at most {MAX_CARRIER_ID_LEN} characters"),
			));
		}

		issues
	}

	/// Validates the request, reporting all violations as one validation error.
	pub fn validate(&self) -> Result<()> {
		let issues = self.issues();

		if issues.is_empty() {
			return Ok(());
		}

		let message = issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ");

		Err(IntegrationError::validation(message))
	}
}

fn check_address(prefix: &str, address: &Address, issues: &mut Vec<FieldIssue>) {
	let lines = address.lines.len();

	if lines == 0 || lines > MAX_ADDRESS_LINES {
		issues.push(FieldIssue::new(
			format!("{prefix}.lines"),
			format!("must contain between 1 and {MAX_ADDRESS_LINES} entries"),
		));
	}

	for (idx, line) in address.lines.iter().enumerate() {
		if line.is_empty() {
			issues.push(FieldIssue::new(format!("{prefix}.lines.{idx}"), "must not be empty"));
		}
	}

	check_length(&format!("{prefix}.city"), &address.city, 1, MAX_CITY_LEN, issues);
	check_exact(
		&format!("{prefix}.stateOrProvinceCode"),
		&address.state_or_province_code,
		REGION_CODE_LEN,
		issues,
	);
	check_length(
		&format!("{prefix}.postalCode"),
		&address.postal_code,
		1,
		MAX_POSTAL_CODE_LEN,
		issues,
	);
	check_exact(&format!("{prefix}.countryCode"), &address.country_code, REGION_CODE_LEN, issues);
}

fn check_package(package: &Package, issues: &mut Vec<FieldIssue>) {
	check_positive("package.weightKg", package.weight_kg, issues);

	if let Some(dimensions) = &package.dimensions {
		check_positive("package.dimensions.lengthCm", dimensions.length_cm, issues);
		check_positive("package.dimensions.widthCm", dimensions.width_cm, issues);
		check_positive("package.dimensions.heightCm", dimensions.height_cm, issues);
	}
}

fn check_length(path: &str, value: &str, min: usize, max: usize, issues: &mut Vec<FieldIssue>) {
	let len = char_len(value);

	if len < min || len > max {
		issues.push(FieldIssue::new(path, format!("must be between {min} and {max} characters")));
	}
}

fn check_exact(path: &str, value: &str, expected: usize, issues: &mut Vec<FieldIssue>) {
	if char_len(value) != expected {
		issues.push(FieldIssue::new(path, format!("must be exactly {expected} characters")));
	}
}

fn check_positive(path: &str, value: f64, issues: &mut Vec<FieldIssue>) {
	if !value.is_finite() || value <= 0. {
		issues.push(FieldIssue::new(path, "must be a positive number"));
	}
}

fn char_len(value: &str) -> usize {
	value.chars().count()
}
