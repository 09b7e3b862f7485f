//! # Lifecycle Scenario
//!
//! Drives one member through the whole lifecycle: the operator creates a
//! network, the member requests to join, and is activated, suspended,
//! reactivated and finally revoked. Each step waits until the member's own
//! node has recorded it.

use crate::container::BusinessNetworkNode;
use crate::error::NodeResult;
use bn_02_membership::MembershipManagementApi;
use shared_types::{MembershipStatus, SecureHash, TransitionCommand};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::info;

/// One finalized step.
#[derive(Debug, Clone)]
pub struct LifecycleStep {
    pub command: TransitionCommand,
    pub tx_id: SecureHash,
    /// Member's status afterwards, `None` once revoked.
    pub status: Option<MembershipStatus>,
}

#[derive(Debug, Clone)]
pub struct LifecycleReport {
    pub network_id: String,
    pub steps: Vec<LifecycleStep>,
}

impl LifecycleReport {
    /// Summary for machine consumption. Revoked or not-yet-member steps carry a
    /// `null` status.
    pub fn to_json(&self) -> serde_json::Value {
        let steps: Vec<_> = self
            .steps
            .iter()
            .map(|step| {
                serde_json::json!({
                    "command": step.command.to_string(),
                    "txId": step.tx_id.to_string(),
                    "status": step.status.map(|s| s.to_string()),
                })
            })
            .collect();
        serde_json::json!({
            "networkId": self.network_id,
            "steps": steps,
        })
    }
}

pub async fn run_lifecycle(
    operator: &BusinessNetworkNode,
    member: &BusinessNetworkNode,
    network_id: Option<String>,
    timeout: Duration,
) -> NodeResult<LifecycleReport> {
    let mut steps = Vec::new();
    let me = member.party();

    let created = operator.membership().create_business_network(network_id).await?;
    let network_id = created
        .outputs()
        .first()
        .map(|m| m.network_id.clone())
        .unwrap_or_default();
    steps.push(LifecycleStep {
        command: TransitionCommand::Create,
        tx_id: created.id(),
        status: None,
    });

    let metadata = BTreeMap::from([("role".to_string(), "member".to_string())]);
    let requested = member
        .membership()
        .request_membership(operator.party(), &network_id, metadata)
        .await?;
    let pending = operator
        .wait_for_membership(&network_id, me, timeout, |m| m.is_pending())
        .await?;
    let linear_id = pending.state.linear_id;
    steps.push(LifecycleStep {
        command: TransitionCommand::Request,
        tx_id: requested.id(),
        status: Some(MembershipStatus::Pending),
    });

    let transitions = [
        (TransitionCommand::Activate, MembershipStatus::Active),
        (TransitionCommand::Suspend, MembershipStatus::Suspended),
        (TransitionCommand::Activate, MembershipStatus::Active),
    ];
    for (command, expected) in transitions {
        let stx = match command {
            TransitionCommand::Suspend => operator.membership().suspend_membership(linear_id).await?,
            _ => operator.membership().activate_membership(linear_id).await?,
        };
        member
            .wait_for_membership(&network_id, me, timeout, |m| m.status == expected)
            .await?;
        info!(%network_id, %command, status = %expected, "[bn-node] Lifecycle step done");
        steps.push(LifecycleStep {
            command,
            tx_id: stx.id(),
            status: Some(expected),
        });
    }

    let revoked = operator.membership().revoke_membership(linear_id).await?;
    member.wait_for_removal(&network_id, me, timeout).await?;
    steps.push(LifecycleStep {
        command: TransitionCommand::Revoke,
        tx_id: revoked.id(),
        status: None,
    });

    info!(%network_id, steps = steps.len(), "[bn-node] Lifecycle complete");
    Ok(LifecycleReport { network_id, steps })
}
