use serde::{Deserialize, Serialize};

use crate::tools::FunctionCall;

/// Which backend produced a route result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    /// Rule tiers or the on-device model.
    #[serde(rename = "on-device")]
    OnDevice,
    /// Cloud model chosen directly.
    #[serde(rename = "cloud")]
    Cloud,
    /// Cloud model reached after the on-device tiers fell short.
    #[serde(rename = "cloud (fallback)")]
    CloudFallback,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::OnDevice => "on-device",
            Source::Cloud => "cloud",
            Source::CloudFallback => "cloud (fallback)",
        }
    }

    pub fn is_cloud(&self) -> bool {
        matches!(self, Source::Cloud | Source::CloudFallback)
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The router's only externally observable output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub function_calls: Vec<FunctionCall>,
    /// Always within [0, 1].
    pub confidence: f64,
    pub source: Source,
    /// Wall-clock latency of the whole routing call.
    pub total_time_ms: f64,
    /// Self-reported edge confidence, present only on cloud-fallback results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_confidence: Option<f64>,
}

impl RouteResult {
    pub fn on_device(function_calls: Vec<FunctionCall>, confidence: f64, total_time_ms: f64) -> Self {
        Self {
            function_calls,
            confidence: clamp_unit(confidence),
            source: Source::OnDevice,
            total_time_ms: clamp_latency(total_time_ms),
            local_confidence: None,
        }
    }

    pub fn cloud_fallback(
        function_calls: Vec<FunctionCall>,
        confidence: f64,
        local_confidence: f64,
        total_time_ms: f64,
    ) -> Self {
        Self {
            function_calls,
            confidence: clamp_unit(confidence),
            source: Source::CloudFallback,
            total_time_ms: clamp_latency(total_time_ms),
            local_confidence: Some(clamp_unit(local_confidence)),
        }
    }

    /// No calls, zero confidence, on-device.
    pub fn empty() -> Self {
        Self::on_device(Vec::new(), 0.0, 0.0)
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn clamp_latency(ms: f64) -> f64 {
    if ms.is_finite() && ms > 0.0 { ms } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn source_serialization() {
        assert_eq!(
            serde_json::to_string(&Source::OnDevice).unwrap(),
            r#""on-device""#
        );
        assert_eq!(serde_json::to_string(&Source::Cloud).unwrap(), r#""cloud""#);
        assert_eq!(
            serde_json::to_string(&Source::CloudFallback).unwrap(),
            r#""cloud (fallback)""#
        );
    }

    #[test]
    fn source_display_matches_wire_form() {
        for source in [Source::OnDevice, Source::Cloud, Source::CloudFallback] {
            let wire = serde_json::to_string(&source).unwrap();
            assert_eq!(wire.trim_matches('"'), source.to_string());
        }
    }

    #[test]
    fn on_device_result_omits_local_confidence() {
        let result = RouteResult::on_device(
            vec![FunctionCall::new("get_weather").arg("location", "Paris")],
            0.9,
            1.5,
        );
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["source"], "on-device");
        assert!(value.get("local_confidence").is_none());
        assert_eq!(value["function_calls"][0]["arguments"]["location"], "Paris");
    }

    #[test]
    fn cloud_fallback_carries_local_confidence() {
        let result = RouteResult::cloud_fallback(vec![], 0.5, 0.4, 120.0);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["source"], "cloud (fallback)");
        assert_eq!(value["local_confidence"], json!(0.4));
        assert!(result.source.is_cloud());
    }

    #[test]
    fn constructors_clamp_out_of_range_values() {
        let result = RouteResult::on_device(vec![], 1.7, -3.0);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.total_time_ms, 0.0);

        let result = RouteResult::on_device(vec![], f64::NAN, f64::NAN);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.total_time_ms, 0.0);
    }

    #[test]
    fn empty_result() {
        let result = RouteResult::empty();
        assert!(result.function_calls.is_empty());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.source, Source::OnDevice);
    }
}
