//! # Management Flows
//!
//! Activation, suspension, revocation and role changes initiated by an
//! authorised member.

#[cfg(test)]
mod tests {
    use crate::integration::harness::{
        activate, join, known_linear_id, own_linear_id, suspend, TestNetwork, NETWORK_ID, TIMEOUT,
    };
    use bn_02_membership::{MembershipManagementApi, PolicyKind};
    use shared_types::{AdminPermission, MembershipRole, MembershipStatus, TransitionCommand, UniqueIdentifier};
    use std::collections::BTreeSet;

    #[tokio::test]
    async fn test_activate_keeps_linear_id_and_needs_both_signatures() {
        let net = TestNetwork::build(PolicyKind::PublicDecentralised, 1, 0).await.unwrap();
        let bob = net.outsider("O=Bob").unwrap();
        let linear_id = join(net.bno(), &bob).await.unwrap();

        let stx = net.bno().membership().activate_membership(linear_id).await.unwrap();

        assert_eq!(stx.command().unwrap().value, TransitionCommand::Activate);
        assert_eq!(stx.tx.inputs.len(), 1);
        assert_eq!(stx.outputs()[0].linear_id, linear_id);
        assert_eq!(stx.outputs()[0].status, MembershipStatus::Active);
        assert!(stx.is_signed_by(bob.party().owning_key()));
        assert!(stx.is_signed_by(net.bno().party().owning_key()));
        stx.verify_required_signatures().unwrap();

        bob.wait_for_membership(NETWORK_ID, bob.party(), TIMEOUT, |m| m.is_active())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_suspend_then_resuspend_is_rejected() {
        let net = TestNetwork::build(PolicyKind::PublicDecentralised, 1, 1).await.unwrap();
        let member = &net.regular[0];
        let linear_id = own_linear_id(member).unwrap();

        suspend(net.bno(), member, linear_id).await.unwrap();
        let err = net.bno().membership().suspend_membership(linear_id).await.unwrap_err();
        assert_eq!(err.to_string(), "Membership is already suspended");
    }

    #[tokio::test]
    async fn test_reactivate_suspended_member() {
        let net = TestNetwork::build(PolicyKind::PublicDecentralised, 1, 1).await.unwrap();
        let member = &net.regular[0];
        let linear_id = own_linear_id(member).unwrap();

        suspend(net.bno(), member, linear_id).await.unwrap();
        activate(net.bno(), member, linear_id).await.unwrap();
        assert_eq!(own_linear_id(member), Some(linear_id));
    }

    #[tokio::test]
    async fn test_suspend_pending_is_rejected() {
        let net = TestNetwork::build(PolicyKind::PublicDecentralised, 1, 0).await.unwrap();
        let bob = net.outsider("O=Bob").unwrap();
        let linear_id = join(net.bno(), &bob).await.unwrap();

        let err = net.bno().membership().suspend_membership(linear_id).await.unwrap_err();
        assert_eq!(err.to_string(), "Only active membership can be suspended");
    }

    #[tokio::test]
    async fn test_revoke_from_every_status() {
        let net = TestNetwork::build(PolicyKind::PublicDecentralised, 1, 2).await.unwrap();
        let pending = net.outsider("O=Pending").unwrap();
        let pending_id = join(net.bno(), &pending).await.unwrap();
        let active = &net.regular[0];
        let suspended = &net.regular[1];
        suspend(net.bno(), suspended, own_linear_id(suspended).unwrap())
            .await
            .unwrap();

        let targets = [
            (&pending, pending_id),
            (active, own_linear_id(active).unwrap()),
            (suspended, own_linear_id(suspended).unwrap()),
        ];
        for (node, linear_id) in targets {
            let stx = net.bno().membership().revoke_membership(linear_id).await.unwrap();
            assert!(stx.outputs().is_empty());
            assert!(!stx.is_signed_by(node.party().owning_key()));

            assert!(net.bno().get_membership(NETWORK_ID, node.party()).is_none());
            node.wait_for_removal(NETWORK_ID, node.party(), TIMEOUT).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_revoked_member_is_no_longer_member() {
        let net = TestNetwork::build(PolicyKind::PublicDecentralised, 1, 1).await.unwrap();
        let member = &net.regular[0];
        net.bno()
            .membership()
            .revoke_membership(own_linear_id(member).unwrap())
            .await
            .unwrap();
        member.wait_for_removal(NETWORK_ID, member.party(), TIMEOUT).await.unwrap();

        // The member still holds the operator's fact from its sync.
        let bno_id = known_linear_id(member, net.bno()).await.unwrap();
        let err = member.membership().suspend_membership(bno_id).await.unwrap_err();
        assert_eq!(err.to_string(), "Initiator is not member of a business network");
    }

    #[tokio::test]
    async fn test_suspended_member_cannot_manage() {
        let net = TestNetwork::build(PolicyKind::PublicDecentralised, 1, 2).await.unwrap();
        let (first, second) = (&net.regular[0], &net.regular[1]);
        suspend(net.bno(), first, own_linear_id(first).unwrap())
            .await
            .unwrap();

        let bno_id = known_linear_id(first, net.bno()).await.unwrap();
        let err = first.membership().suspend_membership(bno_id).await.unwrap_err();
        assert_eq!(err.to_string(), "Initiator's membership is not active");
        assert!(second.get_membership(NETWORK_ID, second.party()).unwrap().state.is_active());
    }

    #[tokio::test]
    async fn test_role_based_plain_member_cannot_suspend() {
        let net = TestNetwork::build(PolicyKind::RoleBased, 1, 1).await.unwrap();
        let member = &net.regular[0];
        let bno_id = known_linear_id(member, net.bno()).await.unwrap();

        let err = member.membership().suspend_membership(bno_id).await.unwrap_err();
        assert_eq!(err.to_string(), "Initiator is not authorised to suspend membership");
        assert!(own_linear_id(net.bno()).is_some());
    }

    #[tokio::test]
    async fn test_granted_permission_enables_management() {
        let net = TestNetwork::build(PolicyKind::RoleBased, 1, 2).await.unwrap();
        let (ops, target) = (&net.regular[0], &net.regular[1]);
        let suspender = MembershipRole::new("Ops", [AdminPermission::CanSuspendMembership]);

        net.bno()
            .membership()
            .modify_roles(own_linear_id(ops).unwrap(), BTreeSet::from([suspender]))
            .await
            .unwrap();
        // The new role entitles Ops to the roster, target included.
        let target_fact = ops
            .wait_for_membership(NETWORK_ID, target.party(), TIMEOUT, |m| m.is_active())
            .await
            .unwrap();

        ops.membership()
            .suspend_membership(target_fact.state.linear_id)
            .await
            .unwrap();
        target
            .wait_for_membership(NETWORK_ID, target.party(), TIMEOUT, |m| m.is_suspended())
            .await
            .unwrap();

        let err = ops
            .membership()
            .revoke_membership(target_fact.state.linear_id)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Initiator is not authorised to revoke membership");
    }

    #[tokio::test]
    async fn test_unknown_linear_id() {
        let net = TestNetwork::build(PolicyKind::PublicDecentralised, 1, 0).await.unwrap();
        let missing = UniqueIdentifier::new();

        let err = net.bno().membership().activate_membership(missing).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Membership state with {missing} linear ID doesn't exist")
        );
    }
}
