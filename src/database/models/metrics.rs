use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::ValidationErrors;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressToDate {
    pub quantification: i32,
    pub cost_estimation: i32,
    pub probabilistic_risk_assessment: i32,
    pub basis_of_estimate_report: i32,
    pub number_of_milestones: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnticipatedCompletionDate {
    pub quantification: Option<DateTime<Utc>>,
    pub cost_estimation: Option<DateTime<Utc>>,
    pub probabilistic_risk_assessment: Option<DateTime<Utc>>,
    pub basis_of_estimate_report: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommercialInformation {
    pub ci_contracted_value: f64,
    pub ci_accrual_to_date: f64,
    pub approved_variation_to_date: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionOutturnCost {
    pub p90: f64,
    pub p50: f64,
    pub base: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TotalProjectCostPerMilestone {
    pub level_of_design: String,
    pub date: Option<DateTime<Utc>>,
    pub base_value: f64,
    pub p90_outturn_cost: f64,
    pub p90_risk_contingency: f64,
    pub p50_outturn_cost: f64,
    pub p50_risk_contingency: f64,
    // The dashboard has always sent the misspelt key.
    #[serde(rename = "currentMilstone", alias = "currentMilestone")]
    pub current_milestone: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyCostDriver {
    pub driver: String,
    pub cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyRisk {
    pub description: String,
    pub score: String,
    pub trend: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesignPackage {
    pub description: String,
    pub milestones: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesignPackages {
    pub level_of_design: DesignPackage,
    pub packages: Vec<DesignPackage>,
}

/// One cell of the sub-package matrix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Package {
    pub description: String,
    pub progress: i32,
    #[serde(rename = "secondStageQA")]
    pub second_stage_qa: bool,
    #[serde(rename = "finalQAReview")]
    pub final_qa_review: bool,
    pub submitted: bool,
}

/// Reference from a project's benchmarking block to a stored benchmark.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectBenchmark {
    pub benchmark_id: Uuid,
    pub display_project_name: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Benchmarking {
    pub enable_geographic_location: bool,
    pub enable_total_construction_cost: bool,
    pub enable_square_metre_rate_for_pavement: bool,
    pub enable_total_project_cost: bool,
    pub enable_cubic_metre_rate_for_earthworks: bool,
    pub geographic_location: String,
    #[serde(rename = "totalProjectCostP90")]
    pub total_project_cost_p90: f64,
    pub total_construction_cost_per_lane_km: f64,
    #[serde(rename = "cubicMetreRateForEarthworksPerM3")]
    pub cubic_metre_rate_for_earthworks_per_m3: f64,
    #[serde(rename = "squareMetreRateForPavementPerBridgePerM2")]
    pub square_metre_rate_for_pavement_per_bridge_per_m2: f64,
    pub benchmarks: Vec<ProjectBenchmark>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metrics {
    pub progress_to_date: ProgressToDate,
    pub anticipated_completion_date: AnticipatedCompletionDate,
    pub commercial_information: CommercialInformation,
    pub option_outturn_costs: Vec<OptionOutturnCost>,
    pub total_project_cost_per_milestone: Vec<TotalProjectCostPerMilestone>,
    pub key_cost_drivers_base_value: f64,
    pub key_cost_drivers: Vec<KeyCostDriver>,
    pub key_risks: Vec<KeyRisk>,
    pub value_management_opportunities: Vec<String>,
    pub design_packages: Option<DesignPackages>,
    pub packages: Vec<Vec<Package>>,
    pub benchmarking: Benchmarking,
}

impl Metrics {
    /// Every benchmark reference must carry an id. Whether the id points at a
    /// stored benchmark is not checked here.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        for (i, item) in self.benchmarking.benchmarks.iter().enumerate() {
            if item.benchmark_id.is_nil() {
                errors.add(format!("benchmark-{}", i), "benchmark is required");
            }
        }

        errors.into_result()
    }
}
