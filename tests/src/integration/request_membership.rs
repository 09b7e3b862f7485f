//! # Membership Request Flow
//!
//! A prospective member proposes its own PENDING fact to one authorised
//! party, which checks its own standing and the requester before recording.

#[cfg(test)]
mod tests {
    use crate::integration::harness::{suspend, own_linear_id, TestNetwork, NETWORK_ID, TIMEOUT};
    use bn_02_membership::{ErrorCategory, MembershipManagementApi, MembershipStore, PolicyKind};
    use shared_types::{MembershipStatus, TransitionCommand};
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_request_produces_single_pending_fact() {
        let net = TestNetwork::build(PolicyKind::PublicDecentralised, 1, 0).await.unwrap();
        let bob = net.outsider("O=Bob").unwrap();

        let stx = bob
            .membership()
            .request_membership(net.bno().party(), NETWORK_ID, BTreeMap::new())
            .await
            .unwrap();

        assert!(stx.tx.inputs.is_empty());
        assert_eq!(stx.outputs().len(), 1);
        assert_eq!(stx.outputs()[0].status, MembershipStatus::Pending);
        assert_eq!(stx.command().unwrap().value, TransitionCommand::Request);
        assert!(stx.is_signed_by(bob.party().owning_key()));
        assert!(!stx.is_signed_by(net.bno().party().owning_key()));
        stx.verify_required_signatures().unwrap();

        net.bno()
            .wait_for_membership(NETWORK_ID, bob.party(), TIMEOUT, |m| m.is_pending())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_request_creates_no_new_fact() {
        let net = TestNetwork::build(PolicyKind::PublicDecentralised, 1, 1).await.unwrap();
        let member = &net.regular[0];
        let before = net.bno().vault().transaction_count();

        let err = member
            .membership()
            .request_membership(net.bno().party(), NETWORK_ID, BTreeMap::new())
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            format!("Initiator is already a member of Business Network with {NETWORK_ID} ID")
        );
        assert_eq!(net.bno().vault().transaction_count(), before);
    }

    #[tokio::test]
    async fn test_request_to_non_member_is_rejected() {
        let net = TestNetwork::build(PolicyKind::PublicDecentralised, 1, 0).await.unwrap();
        let stranger = net.outsider("O=Stranger").unwrap();
        let bob = net.outsider("O=Bob").unwrap();

        let err = bob
            .membership()
            .request_membership(stranger.party(), NETWORK_ID, BTreeMap::new())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Receiver is not member of a business network");
        assert_eq!(err.category(), ErrorCategory::Counterparty);
        assert!(own_linear_id(&bob).is_none());
        assert_eq!(bob.vault().transaction_count(), 0);
    }

    #[tokio::test]
    async fn test_request_to_suspended_member_is_rejected() {
        let net = TestNetwork::build(PolicyKind::PublicDecentralised, 1, 1).await.unwrap();
        let member = &net.regular[0];
        suspend(net.bno(), member, own_linear_id(member).unwrap())
            .await
            .unwrap();
        let bob = net.outsider("O=Bob").unwrap();

        let err = bob
            .membership()
            .request_membership(member.party(), NETWORK_ID, BTreeMap::new())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Receiver's membership is not active");
        assert!(own_linear_id(&bob).is_none());
    }

    #[tokio::test]
    async fn test_role_based_plain_member_cannot_admit() {
        let net = TestNetwork::build(PolicyKind::RoleBased, 1, 1).await.unwrap();
        let bob = net.outsider("O=Bob").unwrap();

        let err = bob
            .membership()
            .request_membership(net.regular[0].party(), NETWORK_ID, BTreeMap::new())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Receiver is not authorised to activate membership");
        assert!(net.regular[0].get_membership(NETWORK_ID, bob.party()).is_none());
    }

    #[tokio::test]
    async fn test_public_member_may_admit() {
        let net = TestNetwork::build(PolicyKind::PublicDecentralised, 1, 1).await.unwrap();
        let member = &net.regular[0];
        let bob = net.outsider("O=Bob").unwrap();

        bob.membership()
            .request_membership(member.party(), NETWORK_ID, BTreeMap::new())
            .await
            .unwrap();

        member
            .wait_for_membership(NETWORK_ID, bob.party(), TIMEOUT, |m| m.is_pending())
            .await
            .unwrap();
        // Only the addressed member observes the request.
        assert!(net.bno().get_membership(NETWORK_ID, bob.party()).is_none());
    }

    #[tokio::test]
    async fn test_request_carries_metadata() {
        let net = TestNetwork::build(PolicyKind::PublicDecentralised, 1, 0).await.unwrap();
        let bob = net.outsider("O=Bob").unwrap();
        let metadata = BTreeMap::from([
            ("role".to_string(), "dealer".to_string()),
            ("lei".to_string(), "5493001KJTIIGC8Y1R12".to_string()),
        ]);

        bob.membership()
            .request_membership(net.bno().party(), NETWORK_ID, metadata.clone())
            .await
            .unwrap();

        let seen = net
            .bno()
            .wait_for_membership(NETWORK_ID, bob.party(), TIMEOUT, |m| m.is_pending())
            .await
            .unwrap();
        assert_eq!(seen.state.metadata, metadata);
        assert!(net
            .bno()
            .membership()
            .store()
            .get_all_memberships_with_status(NETWORK_ID, &[MembershipStatus::Pending])
            .iter()
            .any(|m| &m.state.identity == bob.party()));
    }
}
