use std::fmt;

use serde::{
    de::{self, MapAccess, Visitor},
    Deserialize, Deserializer, Serialize,
};
use serde_json::{Map, Value};

use crate::error::ServiceErrorBody;

/// Fixed path of the analysis endpoint, relative to the service root.
pub const ANALYZE_PATH: &str = "/analyze";

/// Inputs the service multiplied into the score. Carried for forward
/// compatibility; nothing renders it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskFactors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genetic_component: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevalence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender_multiplier: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markers_found: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculated_risk_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_factors: Option<RiskFactors>,
}

/// One key/value pair of the `results` mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionResult {
    pub condition: String,
    pub entry: ResultEntry,
}

/// Success-shaped body. `results` keeps the key order of the JSON text.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnalysisReport {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "ordered_results")]
    pub results: Vec<ConditionResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResponse {
    Success(AnalysisReport),
    Failure(ServiceErrorBody),
}

impl AnalysisResponse {
    pub fn failure(error: impl Into<String>) -> Self {
        AnalysisResponse::Failure(ServiceErrorBody::new(error))
    }

    /// Decodes `body` into the shape selected by the transport status.
    ///
    /// A failure body is probed for a string `error` field and anything else
    /// is ignored. A success body must match [`AnalysisReport`].
    pub fn decode(status_ok: bool, body: &[u8]) -> Result<Self, serde_json::Error> {
        if status_ok {
            // Derived struct visitors also accept arrays.
            serde_json::from_slice::<Map<String, Value>>(body)?;
            return serde_json::from_slice::<AnalysisReport>(body).map(AnalysisResponse::Success);
        }

        let value: Value = serde_json::from_slice(body)?;
        let error = value
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_owned);
        Ok(AnalysisResponse::Failure(ServiceErrorBody { error }))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisResponse::Success(_))
    }
}

fn ordered_results<'de, D>(deserializer: D) -> Result<Vec<ConditionResult>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ResultsVisitor;

    impl<'de> Visitor<'de> for ResultsVisitor {
        type Value = Vec<ConditionResult>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of condition name to result entry")
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_map(self)
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut results = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((condition, entry)) = map.next_entry::<String, ResultEntry>()? {
                results.push(ConditionResult { condition, entry });
            }
            Ok(results)
        }
    }

    deserializer.deserialize_option(ResultsVisitor)
}
