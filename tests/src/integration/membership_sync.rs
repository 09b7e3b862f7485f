//! # Membership Sync
//!
//! Who learns about an activation, and what roster the new member receives.

#[cfg(test)]
mod tests {
    use crate::integration::harness::{join, own_linear_id, TestNetwork, NETWORK_ID, TIMEOUT};
    use bn_02_membership::{MembershipManagementApi, MembershipStore, PolicyKind};
    use bn_node::NodeConfig;
    use shared_types::{MembershipRole, MembershipStatus};
    use std::time::Duration;

    #[tokio::test]
    async fn test_public_activation_reaches_every_member() {
        let net = TestNetwork::build(PolicyKind::PublicDecentralised, 1, 2).await.unwrap();
        let (first, second) = (&net.regular[0], &net.regular[1]);

        // Member-0 was active when Member-1 was activated.
        first
            .wait_for_membership(NETWORK_ID, second.party(), TIMEOUT, |m| m.is_active())
            .await
            .unwrap();
        // Member-1 received the roster.
        for node in [net.bno(), first] {
            second
                .wait_for_membership(NETWORK_ID, node.party(), TIMEOUT, |m| m.is_active())
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_role_based_member_sees_only_authorised() {
        let net = TestNetwork::build(PolicyKind::RoleBased, 2, 2).await.unwrap();
        let (first, second) = (&net.regular[0], &net.regular[1]);

        for admin in &net.authorised {
            second
                .wait_for_membership(NETWORK_ID, admin.party(), TIMEOUT, |_| true)
                .await
                .unwrap();
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(second.get_membership(NETWORK_ID, first.party()).is_none());
        assert!(first.get_membership(NETWORK_ID, second.party()).is_none());

        let all = second
            .membership()
            .store()
            .get_all_memberships_with_status(NETWORK_ID, &MembershipStatus::ALL);
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_second_administrator_observes_activation() {
        let net = TestNetwork::build(PolicyKind::RoleBased, 2, 1).await.unwrap();
        let admin = &net.authorised[1];
        let member = &net.regular[0];

        let seen = admin
            .wait_for_membership(NETWORK_ID, member.party(), TIMEOUT, |m| m.is_active())
            .await
            .unwrap();
        assert_eq!(Some(seen.state.linear_id), own_linear_id(member));
    }

    #[tokio::test]
    async fn test_request_is_not_broadcast() {
        let net = TestNetwork::build(PolicyKind::PublicDecentralised, 2, 0).await.unwrap();
        let bob = net.outsider("O=Bob").unwrap();
        join(net.bno(), &bob).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(net.authorised[1].get_membership(NETWORK_ID, bob.party()).is_none());
    }

    #[tokio::test]
    async fn test_roles_change_grants_roster() {
        let net = TestNetwork::build(PolicyKind::RoleBased, 1, 2).await.unwrap();
        let (first, second) = (&net.regular[0], &net.regular[1]);
        assert!(first.get_membership(NETWORK_ID, second.party()).is_none());

        let roles = [MembershipRole::administrator()].into();
        net.bno()
            .membership()
            .modify_roles(own_linear_id(first).unwrap(), roles)
            .await
            .unwrap();

        first
            .wait_for_membership(NETWORK_ID, second.party(), TIMEOUT, |m| m.is_active())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_sync_limit_leaves_member_without_roster() {
        let mut config = NodeConfig::default();
        config.membership.max_sync_records = 0;
        let net = TestNetwork::build_with(&config, 1, 1).await.unwrap();
        let member = &net.regular[0];

        // Activation still lands, only the roster is refused.
        assert!(member.get_membership(NETWORK_ID, member.party()).unwrap().state.is_active());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(member.get_membership(NETWORK_ID, net.bno().party()).is_none());
    }
}
