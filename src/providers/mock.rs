use crate::domain::{Record, TriState};
use crate::error::AbSearchError;
use crate::providers::AntibodyProvider;

/// Offline provider with four fixed listings, used for demos and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockProvider;

impl AntibodyProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn search(&self, target: &str) -> Result<Vec<Record>, AbSearchError> {
        let base = |catalog: &str, name: String| Record {
            vendor: "MockVendor".to_string(),
            catalog_number: catalog.to_string(),
            name,
            target: target.to_string(),
            url: Some(format!(
                "https://example.com/antibody/{}",
                catalog.to_lowercase()
            )),
            currency: Some("USD".to_string()),
            ..Default::default()
        };

        Ok(vec![
            Record {
                host_species: Some("Mouse".to_string()),
                clonality: Some("Monoclonal".to_string()),
                clone: Some("ICFC-1".to_string()),
                applications: strings(&["ICFC", "ICC", "IHC"]),
                validated_reactivity: strings(&["Human"]),
                price: Some(399.0),
                citations_count: Some(10),
                formulation: Some("PBS with 0.05% BSA".to_string()),
                is_bsa_free: TriState::No,
                concentration_mg_per_ml: Some(0.5),
                volume_ul: Some(50.0),
                ..base(
                    "MV-TP53-003",
                    format!("Anti-{target} monoclonal antibody [ICFC-1]"),
                )
            },
            Record {
                host_species: Some("Mouse".to_string()),
                clonality: Some("Monoclonal".to_string()),
                clone: Some("ICFC-2".to_string()),
                applications: strings(&["ICFC"]),
                validated_reactivity: strings(&["Human"]),
                price: Some(420.0),
                citations_count: Some(5),
                formulation: Some("PBS, 0.02% sodium azide".to_string()),
                is_bsa_free: TriState::Yes,
                amount_ug: Some(15.0),
                ..base(
                    "MV-TP53-004",
                    format!("Anti-{target} monoclonal antibody [ICFC-2] BSA-free"),
                )
            },
            Record {
                host_species: Some("Rabbit".to_string()),
                clonality: Some("Monoclonal".to_string()),
                clone: Some("DO-7".to_string()),
                applications: strings(&["WB", "IHC", "IF"]),
                validated_reactivity: strings(&["Human", "Mouse"]),
                price: Some(349.0),
                citations_count: Some(125),
                formulation: Some("Tris-glycine with gelatin".to_string()),
                is_bsa_free: TriState::No,
                concentration_mg_per_ml: Some(1.0),
                volume_ul: Some(5.0),
                ..base(
                    "MV-TP53-001",
                    format!("Anti-{target} monoclonal antibody [DO-7]"),
                )
            },
            Record {
                host_species: Some("Mouse".to_string()),
                clonality: Some("Polyclonal".to_string()),
                applications: strings(&["WB"]),
                validated_reactivity: strings(&["Human"]),
                conjugation: Some("HRP".to_string()),
                price: Some(279.0),
                citations_count: Some(32),
                formulation: Some("PBS with 0.1% gelatin".to_string()),
                is_bsa_free: TriState::No,
                amount_ug: Some(8.0),
                ..base("MV-TP53-002", format!("Anti-{target} polyclonal antibody"))
            },
        ])
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
