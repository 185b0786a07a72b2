pub mod abcam;
pub mod mock;

use tracing::{debug, info};

use crate::domain::{ProviderSpec, Record};
use crate::error::AbSearchError;

pub use abcam::AbcamProvider;
pub use mock::MockProvider;

/// A vendor source that turns a target name into listings.
pub trait AntibodyProvider: Send + Sync {
    fn name(&self) -> &str;
    fn search(&self, target: &str) -> Result<Vec<Record>, AbSearchError>;
}

impl<P: AntibodyProvider + ?Sized> AntibodyProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn search(&self, target: &str) -> Result<Vec<Record>, AbSearchError> {
        (**self).search(target)
    }
}

pub fn default_providers() -> Vec<ProviderSpec> {
    vec![ProviderSpec::Abcam]
}

pub fn build_providers(
    specs: &[ProviderSpec],
) -> Result<Vec<Box<dyn AntibodyProvider>>, AbSearchError> {
    let specs = if specs.is_empty() {
        default_providers()
    } else {
        specs.to_vec()
    };
    specs
        .into_iter()
        .map(|spec| -> Result<Box<dyn AntibodyProvider>, AbSearchError> {
            match spec {
                ProviderSpec::Abcam => Ok(Box::new(AbcamProvider::new()?)),
                ProviderSpec::Mock => Ok(Box::new(MockProvider)),
            }
        })
        .collect()
}

/// Query every provider in order and concatenate their listings.
pub fn search_all<P: AntibodyProvider>(
    target: &str,
    providers: &[P],
) -> Result<Vec<Record>, AbSearchError> {
    let mut records = Vec::new();
    for provider in providers {
        debug!(provider = provider.name(), target, "searching provider");
        let found = provider.search(target)?;
        info!(provider = provider.name(), count = found.len(), "provider returned listings");
        records.extend(found);
    }
    Ok(records)
}
