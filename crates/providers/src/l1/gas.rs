use super::L1ProviderError;
use std::{fmt, sync::Arc};

/// An implementation of the trait quotes a gas price for the base chain.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait GasPricer: Send + Sync {
    /// Returns the quoted gas price in wei.
    async fn gas_price(&self) -> Result<u128, L1ProviderError>;
}

/// Quotes the gas price as the maximum over a set of [`GasPricer`], so that the synchronizer never
/// underpays when the providers disagree.
#[derive(Clone, Default)]
pub struct MultiGasPricer {
    providers: Vec<Arc<dyn GasPricer>>,
}

impl fmt::Debug for MultiGasPricer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiGasPricer").field("providers", &self.providers.len()).finish()
    }
}

impl MultiGasPricer {
    /// Returns a new [`MultiGasPricer`] from the provided pricers.
    pub fn new(providers: Vec<Arc<dyn GasPricer>>) -> Self {
        Self { providers }
    }

    /// Returns the highest price quoted by the providers. Failing providers are skipped, zero is
    /// returned if none answered.
    pub async fn l1_gas_price(&self) -> u128 {
        let mut price = 0;
        for (i, provider) in self.providers.iter().enumerate() {
            match provider.gas_price().await {
                Ok(quote) => price = price.max(quote),
                Err(err) => {
                    tracing::warn!(target: "rollup::providers", provider = i, ?err, "failed to get gas price");
                }
            }
        }
        price
    }

    /// Returns the highest price quoted by the providers, failing if no price is available.
    pub async fn suggested_gas_price(&self) -> Result<u128, L1ProviderError> {
        match self.l1_gas_price().await {
            0 => Err(L1ProviderError::NoGasPrice),
            price => Ok(price),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<u128>);

    #[async_trait::async_trait]
    impl GasPricer for Fixed {
        async fn gas_price(&self) -> Result<u128, L1ProviderError> {
            self.0.ok_or(L1ProviderError::NotFound)
        }
    }

    #[tokio::test]
    async fn test_should_take_maximum_ignoring_failures() -> eyre::Result<()> {
        // Given
        let pricer = MultiGasPricer::new(vec![
            Arc::new(Fixed(Some(10))),
            Arc::new(Fixed(None)),
            Arc::new(Fixed(Some(25))),
            Arc::new(Fixed(Some(7))),
        ]);

        // Then
        assert_eq!(pricer.l1_gas_price().await, 25);
        assert_eq!(pricer.suggested_gas_price().await?, 25);

        Ok(())
    }

    #[tokio::test]
    async fn test_should_fail_without_price() {
        let pricer = MultiGasPricer::new(vec![Arc::new(Fixed(None))]);

        assert_eq!(pricer.l1_gas_price().await, 0);
        assert!(matches!(pricer.suggested_gas_price().await, Err(L1ProviderError::NoGasPrice)));
    }
}
