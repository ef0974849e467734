// self
use crate::{
	obs::{FlowKind, FlowOutcome},
	rate_limit::Category,
};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"appnexus_client_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a granted permit, noting whether the caller had to wait for it.
pub fn record_admission(category: Category, waited: bool) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"appnexus_client_admission_total",
			"category" => category.as_str(),
			"waited" => if waited { "true" } else { "false" }
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (category, waited);
	}
}
