//! # End-to-end Lifecycle
//!
//! ```text
//! A creates N ──► B requests (PENDING) ──► A activates B (ACTIVE)
//!                                             │
//!             B removed ◄── A revokes ◄── A suspends B (SUSPENDED)
//! ```

#[cfg(test)]
mod tests {
    use crate::integration::harness::TIMEOUT;
    use bn_02_membership::{MembershipManagementApi, PolicyKind};
    use bn_node::{run_lifecycle, LocalNetwork};
    use shared_types::{MembershipStatus, TransitionCommand};
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_create_request_activate_suspend_revoke() {
        let network = LocalNetwork::with_policy(PolicyKind::PublicDecentralised);
        let a = network.spawn_node("O=Alice, L=London, C=GB").unwrap();
        let b = network.spawn_node("O=Bob, L=Paris, C=FR").unwrap();
        let n = "e2e-network";

        let created = a
            .membership()
            .create_business_network(Some(n.to_string()))
            .await
            .unwrap();
        assert_eq!(created.outputs()[0].status, MembershipStatus::Active);
        assert!(a.get_membership(n, a.party()).unwrap().state.is_active());

        let requested = b
            .membership()
            .request_membership(a.party(), n, BTreeMap::new())
            .await
            .unwrap();
        assert!(requested.tx.inputs.is_empty());
        assert_eq!(requested.outputs()[0].status, MembershipStatus::Pending);
        assert!(requested.is_signed_by(b.party().owning_key()));
        assert!(!requested.is_signed_by(a.party().owning_key()));
        let linear_id = requested.outputs()[0].linear_id;
        a.wait_for_membership(n, b.party(), TIMEOUT, |m| m.is_pending())
            .await
            .unwrap();

        let activated = a.membership().activate_membership(linear_id).await.unwrap();
        assert_eq!(activated.outputs()[0].status, MembershipStatus::Active);
        assert!(activated.is_signed_by(a.party().owning_key()));
        assert!(activated.is_signed_by(b.party().owning_key()));
        b.wait_for_membership(n, b.party(), TIMEOUT, |m| m.is_active())
            .await
            .unwrap();

        let suspended = a.membership().suspend_membership(linear_id).await.unwrap();
        assert_eq!(suspended.outputs()[0].status, MembershipStatus::Suspended);
        b.wait_for_membership(n, b.party(), TIMEOUT, |m| m.is_suspended())
            .await
            .unwrap();

        let revoked = a.membership().revoke_membership(linear_id).await.unwrap();
        assert!(revoked.outputs().is_empty());
        assert!(a.get_membership(n, b.party()).is_none());
        b.wait_for_removal(n, b.party(), TIMEOUT).await.unwrap();

        // Every transition was notarised.
        for stx in [&created, &requested, &activated, &suspended, &revoked] {
            stx.verify_required_signatures().unwrap();
            assert!(stx.is_signed_by(stx.tx.notary.owning_key()));
        }
        assert_eq!(network.notary().consumed_count(), 3);
    }

    #[tokio::test]
    async fn test_scenario_reports_every_step() {
        let network = LocalNetwork::with_policy(PolicyKind::RoleBased);
        let operator = network.spawn_node("O=BNO").unwrap();
        let member = network.spawn_node("O=Member").unwrap();

        let report = run_lifecycle(&operator, &member, None, TIMEOUT).await.unwrap();

        let statuses: Vec<_> = report.steps.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![
                None,
                Some(MembershipStatus::Pending),
                Some(MembershipStatus::Active),
                Some(MembershipStatus::Suspended),
                Some(MembershipStatus::Active),
                None,
            ]
        );
        assert_eq!(report.steps[0].command, TransitionCommand::Create);
        assert!(operator.get_membership(&report.network_id, operator.party()).is_some());
        assert!(member.get_membership(&report.network_id, member.party()).is_none());
    }
}
