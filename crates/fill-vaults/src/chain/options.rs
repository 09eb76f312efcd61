use ethers::{
    abi::Detokenize,
    contract::builders::ContractCall,
    providers::Middleware,
    types::U256,
};

/// Per-call overrides for a contract write. Fields that are `None` leave the
/// node's defaults in place.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CallOptions {
    pub gas_limit: Option<U256>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the gas ceiling of the call.
    pub fn gas_limit<U: Into<U256>>(mut self, gas_limit: U) -> Self {
        self.gas_limit = Some(gas_limit.into());
        self
    }

    pub fn apply<M: Middleware, D: Detokenize>(
        &self,
        mut call: ContractCall<M, D>,
    ) -> ContractCall<M, D> {
        if let Some(gas_limit) = self.gas_limit {
            call = call.gas(gas_limit);
        }
        call
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_options() {
        assert_eq!(CallOptions::new().gas_limit, None);
        assert_eq!(
            CallOptions::new().gas_limit(2_000_000u64).gas_limit,
            Some(U256::from(2_000_000u64))
        );
    }
}
