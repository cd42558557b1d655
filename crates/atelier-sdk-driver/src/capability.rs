use atelier_sdk_rpc::{ContractCall, ContractGateway};
use atelier_sdk_types::{Address, Capability};
use tracing::warn;

/// Answers "does `address` hold `capability` on `contract`" from live ledger
/// state.
///
/// Checks are never cached: grants can change between any two checks (an
/// account switch in the calling session, a revocation on chain), so every
/// call is a fresh read. A failed read answers `false`: a query error must
/// never be conflated with a granted capability.
#[derive(Debug)]
pub struct CapabilityChecker<G> {
    gateway: G,
}

impl<G: ContractGateway> CapabilityChecker<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub async fn has_capability(
        &self,
        contract: Address,
        capability: Capability,
        address: Address,
    ) -> bool {
        let call = ContractCall::new(
            contract,
            "has_capability",
            serde_json::json!([capability.role_name(), address]),
        );
        match self.gateway.read(&call).await {
            Ok(value) => value.as_bool().unwrap_or_else(|| {
                warn!(%contract, %capability, %address, "capability query returned a non-boolean value");
                false
            }),
            Err(error) => {
                warn!(%contract, %capability, %address, %error, "capability query failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use atelier_sdk_test::{test_address, ScriptedLedger};

    use super::*;

    #[tokio::test]
    async fn test_granted_capability() {
        let ledger = ScriptedLedger::new();
        let contract = test_address(0x27);
        let caller = test_address(0x52);
        ledger.grant(contract, Capability::Minter, caller);

        let checker = CapabilityChecker::new(ledger);
        assert!(
            checker
                .has_capability(contract, Capability::Minter, caller)
                .await
        );
    }

    #[tokio::test]
    async fn test_missing_capability() {
        let ledger = ScriptedLedger::new();
        let contract = test_address(0x27);
        let caller = test_address(0x52);
        ledger.grant(contract, Capability::Minter, caller);

        let checker = CapabilityChecker::new(ledger);
        // A different role, a different contract, and a different caller all
        // answer false.
        assert!(
            !checker
                .has_capability(contract, Capability::RoyaltyAdmin, caller)
                .await
        );
        assert!(
            !checker
                .has_capability(test_address(0x28), Capability::Minter, caller)
                .await
        );
        assert!(
            !checker
                .has_capability(contract, Capability::Minter, test_address(0x53))
                .await
        );
    }

    #[tokio::test]
    async fn test_query_error_answers_false() {
        let ledger = ScriptedLedger::new();
        let contract = test_address(0x27);
        let caller = test_address(0x52);
        ledger.grant(contract, Capability::Minter, caller);
        ledger.fail_next_read("node unavailable");

        let checker = CapabilityChecker::new(ledger.clone());
        // The grant exists, but a failed read must never answer true.
        assert!(
            !checker
                .has_capability(contract, Capability::Minter, caller)
                .await
        );

        // Grants are re-read every time; the next check sees the grant.
        assert!(
            checker
                .has_capability(contract, Capability::Minter, caller)
                .await
        );
        assert_eq!(ledger.read_calls(), 2);
    }
}
