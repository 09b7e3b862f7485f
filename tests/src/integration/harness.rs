//! # Test Network
//!
//! A local network where the first authorised node founds `NETWORK_ID`, the
//! other authorised nodes join and are made administrators, and the regular
//! nodes join as plain active members.

use bn_02_membership::{MembershipManagementApi, PolicyKind};
use bn_node::{BusinessNetworkNode, LocalNetwork, NodeConfig, NodeResult};
use shared_types::{MembershipRole, UniqueIdentifier};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

pub const NETWORK_ID: &str = "bn-test";

/// Upper bound for a counterparty to record a finalized transition.
pub const TIMEOUT: Duration = Duration::from_secs(5);

pub struct TestNetwork {
    pub network: LocalNetwork,
    pub authorised: Vec<BusinessNetworkNode>,
    pub regular: Vec<BusinessNetworkNode>,
}

impl TestNetwork {
    /// `authorised` must be at least one.
    pub async fn build(policy: PolicyKind, authorised: usize, regular: usize) -> NodeResult<Self> {
        let mut config = NodeConfig::default();
        config.membership.policy = policy;
        Self::build_with(&config, authorised, regular).await
    }

    pub async fn build_with(config: &NodeConfig, authorised: usize, regular: usize) -> NodeResult<Self> {
        let network = LocalNetwork::new(config);
        let bno = network.spawn_node("O=BNO-0")?;
        bno.membership()
            .create_business_network(Some(NETWORK_ID.to_string()))
            .await?;

        let mut admins = vec![bno];
        for i in 1..authorised.max(1) {
            let node = network.spawn_node(&format!("O=BNO-{i}"))?;
            let linear_id = join(&admins[0], &node).await?;
            activate(&admins[0], &node, linear_id).await?;
            let roles = BTreeSet::from([MembershipRole::administrator()]);
            admins[0].membership().modify_roles(linear_id, roles).await?;
            node.wait_for_membership(NETWORK_ID, node.party(), TIMEOUT, |m| !m.roles.is_empty())
                .await?;
            admins.push(node);
        }

        let mut members = Vec::with_capacity(regular);
        for i in 0..regular {
            let node = network.spawn_node(&format!("O=Member-{i}"))?;
            let linear_id = join(&admins[0], &node).await?;
            activate(&admins[0], &node, linear_id).await?;
            members.push(node);
        }

        Ok(Self {
            network,
            authorised: admins,
            regular: members,
        })
    }

    /// The founding operator.
    pub fn bno(&self) -> &BusinessNetworkNode {
        &self.authorised[0]
    }

    /// A node that is not part of the network yet.
    pub fn outsider(&self, name: &str) -> NodeResult<BusinessNetworkNode> {
        self.network.spawn_node(name)
    }
}

/// `node` asks `operator` to join, and waits until the operator holds the
/// pending fact.
pub async fn join(operator: &BusinessNetworkNode, node: &BusinessNetworkNode) -> NodeResult<UniqueIdentifier> {
    node.membership()
        .request_membership(operator.party(), NETWORK_ID, BTreeMap::new())
        .await?;
    let pending = operator
        .wait_for_membership(NETWORK_ID, node.party(), TIMEOUT, |m| m.is_pending())
        .await?;
    Ok(pending.state.linear_id)
}

/// `operator` activates `node`, and waits until `node` sees itself active.
pub async fn activate(
    operator: &BusinessNetworkNode,
    node: &BusinessNetworkNode,
    linear_id: UniqueIdentifier,
) -> NodeResult<()> {
    operator.membership().activate_membership(linear_id).await?;
    node.wait_for_membership(NETWORK_ID, node.party(), TIMEOUT, |m| m.is_active())
        .await?;
    Ok(())
}

/// `operator` suspends `node`, and waits until `node` sees itself suspended.
pub async fn suspend(
    operator: &BusinessNetworkNode,
    node: &BusinessNetworkNode,
    linear_id: UniqueIdentifier,
) -> NodeResult<()> {
    operator.membership().suspend_membership(linear_id).await?;
    node.wait_for_membership(NETWORK_ID, node.party(), TIMEOUT, |m| m.is_suspended())
        .await?;
    Ok(())
}

/// Linear id of `node`'s own membership as it sees it.
pub fn own_linear_id(node: &BusinessNetworkNode) -> Option<UniqueIdentifier> {
    node.get_membership(NETWORK_ID, node.party())
        .map(|m| m.state.linear_id)
}

/// Linear id of `subject`'s membership once `observer` has received it.
pub async fn known_linear_id(
    observer: &BusinessNetworkNode,
    subject: &BusinessNetworkNode,
) -> NodeResult<UniqueIdentifier> {
    let fact = observer
        .wait_for_membership(NETWORK_ID, subject.party(), TIMEOUT, |_| true)
        .await?;
    Ok(fact.state.linear_id)
}
