use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::ValidationErrors;

/// Cost figures from a comparable past project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Benchmark {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    pub geographic_location: String,
    #[serde(rename = "totalProjectCostP90")]
    pub total_project_cost_p90: f64,
    pub total_construction_cost_per_lane_km: f64,
    #[serde(rename = "cubicMetreRateForEarthworksPerM3")]
    pub cubic_metre_rate_for_earthworks_per_m3: f64,
    #[serde(rename = "squareMetreRateForPavementPerBridgePerM2")]
    pub square_metre_rate_for_pavement_per_bridge_per_m2: f64,
}

impl Benchmark {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.require_text("name", &self.name, "benchmark name is required");
        errors.require_text(
            "geographicLocation",
            &self.geographic_location,
            "geographic location is required",
        );

        let figures = [
            ("totalProjectCostP90", self.total_project_cost_p90),
            ("totalConstructionCostPerLaneKm", self.total_construction_cost_per_lane_km),
            ("cubicMetreRateForEarthworksPerM3", self.cubic_metre_rate_for_earthworks_per_m3),
            (
                "squareMetreRateForPavementPerBridgePerM2",
                self.square_metre_rate_for_pavement_per_bridge_per_m2,
            ),
        ];
        for (field, value) in figures {
            // NaN fails this check as well
            if !(value >= 0.0) {
                errors.add(field, "must be greater than or equal to 0");
            }
        }

        errors.into_result()
    }
}
