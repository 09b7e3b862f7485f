//! Responder-side validation of proposed and finalized transactions

use crate::domain::{management_action, MemberAuthorization};
use crate::error::{MembershipError, MembershipResult, Side};
use crate::ports::outbound::MembershipStore;
use bn_01_ledger::SignedTransaction;
use shared_types::{Party, TransitionCommand};

/// Check that `stx` is the transition this protocol run is about, proposed
/// by `counterparty`, and that `counterparty` is entitled to it as far as the
/// local view can tell.
pub fn verify_proposal<S: MembershipStore + ?Sized>(
    store: &S,
    policy: &dyn MemberAuthorization,
    stx: &SignedTransaction,
    expected: TransitionCommand,
    counterparty: &Party,
) -> MembershipResult<()> {
    let command = stx.command()?;
    if command.value != expected {
        return Err(rejected(format!(
            "Expected {expected} command, received {}",
            command.value
        )));
    }
    if &command.initiator != counterparty {
        return Err(rejected(format!(
            "Command initiator {} is not the counterparty {counterparty}",
            command.initiator
        )));
    }

    let network_id = stx
        .outputs()
        .first()
        .or_else(|| stx.tx.inputs.first().map(|input| &input.state))
        .map(|state| state.network_id.as_str())
        .ok_or_else(|| rejected("Transaction carries no membership".to_string()))?;

    // An initiator we know nothing about is judged by the counterparty's own checks.
    if let Some(action) = management_action(command.value) {
        if let Some(initiator) = store.get_membership(network_id, &command.initiator) {
            if !initiator.state.is_active() {
                return Err(MembershipError::MembershipNotActive {
                    side: Side::Initiator,
                });
            }
            if !policy.permits(action, &initiator.state) {
                return Err(MembershipError::NotAuthorised {
                    side: Side::Initiator,
                    action,
                });
            }
        }
    }
    Ok(())
}

/// `verify_proposal` for a membership request, plus the network it was
/// requested for.
pub fn verify_request<S: MembershipStore + ?Sized>(
    store: &S,
    policy: &dyn MemberAuthorization,
    stx: &SignedTransaction,
    network_id: &str,
    requester: &Party,
) -> MembershipResult<()> {
    verify_proposal(store, policy, stx, TransitionCommand::Request, requester)?;
    match stx.outputs() {
        [membership] if membership.network_id == network_id => Ok(()),
        _ => Err(rejected(format!(
            "Request does not match Business Network with {network_id} ID"
        ))),
    }
}

fn rejected(reason: String) -> MembershipError {
    MembershipError::ProposalRejected { reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PublicDecentralisedPolicy, RoleBasedPolicy};
    use bn_01_ledger::TransactionBuilder;
    use parking_lot::RwLock;
    use shared_crypto::PartyKeyPair;
    use shared_types::{
        MembershipState, MembershipStatus, SecureHash, StateAndRef, StateRef, UniqueIdentifier,
    };
    use std::collections::BTreeMap;

    /// Mock store holding a fixed set of facts.
    #[derive(Default)]
    struct MockStore {
        facts: RwLock<Vec<StateAndRef>>,
    }

    impl MockStore {
        fn add(&self, state: MembershipState) {
            self.facts.write().push(StateAndRef {
                state,
                reference: StateRef::new(SecureHash::of(b"tx"), 0),
            });
        }
    }

    impl MembershipStore for MockStore {
        fn get_membership(&self, network_id: &str, party: &Party) -> Option<StateAndRef> {
            self.facts
                .read()
                .iter()
                .find(|f| f.state.network_id == network_id && &f.state.identity == party)
                .cloned()
        }

        fn get_membership_by_id(&self, linear_id: &UniqueIdentifier) -> Option<StateAndRef> {
            self.facts
                .read()
                .iter()
                .find(|f| &f.state.linear_id == linear_id)
                .cloned()
        }

        fn get_all_memberships_with_status(
            &self,
            network_id: &str,
            statuses: &[MembershipStatus],
        ) -> Vec<StateAndRef> {
            self.facts
                .read()
                .iter()
                .filter(|f| f.state.network_id == network_id && statuses.contains(&f.state.status))
                .cloned()
                .collect()
        }

        fn business_network_exists(&self, network_id: &str) -> bool {
            self.facts.read().iter().any(|f| f.state.network_id == network_id)
        }

        fn resolve_commitment_record(&self, membership: &StateAndRef) -> MembershipResult<SignedTransaction> {
            Err(MembershipError::CommitmentRecordNotFound {
                linear_id: membership.state.linear_id,
            })
        }
    }

    fn party(name: &str) -> Party {
        Party::new(name, PartyKeyPair::generate().public_key())
    }

    fn active(member: &Party) -> MembershipState {
        MembershipState::pending(member.clone(), "net", BTreeMap::new(), 1)
            .with_status(MembershipStatus::Active, 2)
    }

    fn suspension(initiator: &Party, target: MembershipState) -> SignedTransaction {
        let output = target.with_status(MembershipStatus::Suspended, 3);
        let signers = vec![*initiator.owning_key(), *target.identity.owning_key()];
        let wire = TransactionBuilder::new(party("O=Notary"))
            .add_input_state(StateAndRef {
                state: target,
                reference: StateRef::new(SecureHash::of(b"prev"), 0),
            })
            .add_output_state(output)
            .add_command(TransitionCommand::Suspend, initiator.clone(), signers)
            .to_wire_transaction()
            .unwrap();
        SignedTransaction::new(wire).unwrap()
    }

    #[test]
    fn test_accepts_expected_command_from_counterparty() {
        let (alice, bob) = (party("O=Alice"), party("O=Bob"));
        let store = MockStore::default();
        store.add(active(&alice));
        let stx = suspension(&alice, active(&bob));

        assert!(verify_proposal(&store, &PublicDecentralisedPolicy, &stx, TransitionCommand::Suspend, &alice).is_ok());
    }

    #[test]
    fn test_rejects_wrong_command() {
        let (alice, bob) = (party("O=Alice"), party("O=Bob"));
        let stx = suspension(&alice, active(&bob));
        let err = verify_proposal(
            &MockStore::default(),
            &PublicDecentralisedPolicy,
            &stx,
            TransitionCommand::Activate,
            &alice,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Expected Activate command, received Suspend");
    }

    #[test]
    fn test_rejects_initiator_other_than_counterparty() {
        let (alice, bob, mallory) = (party("O=Alice"), party("O=Bob"), party("O=Mallory"));
        let stx = suspension(&alice, active(&bob));
        let err = verify_proposal(
            &MockStore::default(),
            &PublicDecentralisedPolicy,
            &stx,
            TransitionCommand::Suspend,
            &mallory,
        )
        .unwrap_err();
        assert!(matches!(err, MembershipError::ProposalRejected { .. }));
    }

    #[test]
    fn test_rechecks_known_initiator_against_policy() {
        let (alice, bob) = (party("O=Alice"), party("O=Bob"));
        let store = MockStore::default();
        store.add(active(&alice));
        let stx = suspension(&alice, active(&bob));

        let err = verify_proposal(&store, &RoleBasedPolicy, &stx, TransitionCommand::Suspend, &alice).unwrap_err();
        assert_eq!(err.to_string(), "Initiator is not authorised to suspend membership");
    }

    #[test]
    fn test_rechecks_initiator_status() {
        let (alice, bob) = (party("O=Alice"), party("O=Bob"));
        let store = MockStore::default();
        store.add(active(&alice).with_status(MembershipStatus::Suspended, 5));
        let stx = suspension(&alice, active(&bob));

        let err = verify_proposal(&store, &PublicDecentralisedPolicy, &stx, TransitionCommand::Suspend, &alice)
            .unwrap_err();
        assert_eq!(err.to_string(), "Initiator's membership is not active");
    }

    #[test]
    fn test_request_must_match_network() {
        let bob = party("O=Bob");
        let wire = TransactionBuilder::new(party("O=Notary"))
            .add_output_state(MembershipState::pending(bob.clone(), "other", BTreeMap::new(), 1))
            .add_command(TransitionCommand::Request, bob.clone(), vec![*bob.owning_key()])
            .to_wire_transaction()
            .unwrap();
        let stx = SignedTransaction::new(wire).unwrap();
        let store = MockStore::default();

        assert!(verify_request(&store, &PublicDecentralisedPolicy, &stx, "other", &bob).is_ok());
        assert!(verify_request(&store, &PublicDecentralisedPolicy, &stx, "net", &bob).is_err());
    }
}
