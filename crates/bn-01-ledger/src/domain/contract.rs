//! Membership contract
//!
//! Structural rules every membership transaction must satisfy, checked by
//! the initiator before signing, by every countersigner, by the notary and by
//! every recipient of the finalized record.

use crate::domain::transaction::{Command, WireTransaction};
use shared_types::{MembershipState, MembershipStatus, TransitionCommand};
use thiserror::Error;

/// Contract rule failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    #[error("Membership transactions carry exactly one command, found {count}")]
    CommandCount { count: usize },

    #[error("{command} transaction must have {expected} input(s), found {actual}")]
    InputCount {
        command: TransitionCommand,
        expected: usize,
        actual: usize,
    },

    #[error("{command} transaction must have {expected} output(s), found {actual}")]
    OutputCount {
        command: TransitionCommand,
        expected: usize,
        actual: usize,
    },

    #[error("{command} {what} must be {expected}, found {actual}")]
    Status {
        command: TransitionCommand,
        what: &'static str,
        expected: String,
        actual: MembershipStatus,
    },

    #[error("{command} output must be a revision of its input (identity, network and linear id unchanged)")]
    LineageChanged { command: TransitionCommand },

    #[error("{command} must not change {field}")]
    ImmutableField {
        command: TransitionCommand,
        field: &'static str,
    },

    #[error("{command} must change roles")]
    RolesUnchanged { command: TransitionCommand },

    #[error("{command} output must not carry roles")]
    RolesNotAllowed { command: TransitionCommand },

    #[error("{command} output identity must be the initiator")]
    IdentityNotInitiator { command: TransitionCommand },

    #[error("Initiator must be a required signer")]
    InitiatorNotSigner,

    #[error("Member {member} must be a required signer of {command}")]
    MemberNotSigner {
        command: TransitionCommand,
        member: String,
    },

    #[error("Modification time must not precede the previous revision")]
    TimeWentBackwards,
}

/// Verifier for membership transactions.
pub struct MembershipContract;

impl MembershipContract {
    /// Check `tx` against the rules of its command.
    pub fn verify(tx: &WireTransaction) -> Result<(), ContractViolation> {
        let command = match tx.commands.as_slice() {
            [command] => command,
            commands => {
                return Err(ContractViolation::CommandCount {
                    count: commands.len(),
                })
            }
        };

        if !command.signers.contains(command.initiator.owning_key()) {
            return Err(ContractViolation::InitiatorNotSigner);
        }

        let kind = command.value;
        match kind {
            TransitionCommand::Create | TransitionCommand::Request => {
                counts(tx, kind, 0, 1)?;
                let output = &tx.outputs[0];
                let expected = if kind == TransitionCommand::Create {
                    MembershipStatus::Active
                } else {
                    MembershipStatus::Pending
                };
                status(kind, "output", &[expected], output.status)?;
                if output.identity != command.initiator {
                    return Err(ContractViolation::IdentityNotInitiator { command: kind });
                }
                if kind == TransitionCommand::Request && !output.roles.is_empty() {
                    return Err(ContractViolation::RolesNotAllowed { command: kind });
                }
                member_signs(command, output)
            }
            TransitionCommand::Activate | TransitionCommand::Suspend => {
                counts(tx, kind, 1, 1)?;
                let input = &tx.inputs[0].state;
                let output = &tx.outputs[0];
                let (from, to): (&[MembershipStatus], MembershipStatus) =
                    if kind == TransitionCommand::Activate {
                        (
                            &[MembershipStatus::Pending, MembershipStatus::Suspended],
                            MembershipStatus::Active,
                        )
                    } else {
                        (&[MembershipStatus::Active], MembershipStatus::Suspended)
                    };
                status(kind, "input", from, input.status)?;
                status(kind, "output", &[to], output.status)?;
                revision(kind, input, output)?;
                if input.roles != output.roles {
                    return Err(ContractViolation::ImmutableField {
                        command: kind,
                        field: "roles",
                    });
                }
                member_signs(command, output)
            }
            TransitionCommand::ModifyRoles => {
                counts(tx, kind, 1, 1)?;
                let input = &tx.inputs[0].state;
                let output = &tx.outputs[0];
                status(kind, "output", &[input.status], output.status)?;
                revision(kind, input, output)?;
                if input.roles == output.roles {
                    return Err(ContractViolation::RolesUnchanged { command: kind });
                }
                member_signs(command, output)
            }
            TransitionCommand::Revoke => counts(tx, kind, 1, 0),
        }
    }
}

fn counts(
    tx: &WireTransaction,
    command: TransitionCommand,
    inputs: usize,
    outputs: usize,
) -> Result<(), ContractViolation> {
    if tx.inputs.len() != inputs {
        return Err(ContractViolation::InputCount {
            command,
            expected: inputs,
            actual: tx.inputs.len(),
        });
    }
    if tx.outputs.len() != outputs {
        return Err(ContractViolation::OutputCount {
            command,
            expected: outputs,
            actual: tx.outputs.len(),
        });
    }
    Ok(())
}

fn status(
    command: TransitionCommand,
    what: &'static str,
    allowed: &[MembershipStatus],
    actual: MembershipStatus,
) -> Result<(), ContractViolation> {
    if allowed.contains(&actual) {
        return Ok(());
    }
    let expected = allowed
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" or ");
    Err(ContractViolation::Status {
        command,
        what,
        expected,
        actual,
    })
}

fn revision(
    command: TransitionCommand,
    input: &MembershipState,
    output: &MembershipState,
) -> Result<(), ContractViolation> {
    if !output.same_lineage(input) {
        return Err(ContractViolation::LineageChanged { command });
    }
    if output.metadata != input.metadata {
        return Err(ContractViolation::ImmutableField {
            command,
            field: "metadata",
        });
    }
    if output.issued_at != input.issued_at {
        return Err(ContractViolation::ImmutableField {
            command,
            field: "issued_at",
        });
    }
    if output.modified_at < input.modified_at {
        return Err(ContractViolation::TimeWentBackwards);
    }
    Ok(())
}

fn member_signs(command: &Command, member: &MembershipState) -> Result<(), ContractViolation> {
    if command.signers.contains(member.identity.owning_key()) {
        Ok(())
    } else {
        Err(ContractViolation::MemberNotSigner {
            command: command.value,
            member: member.identity.name().to_string(),
        })
    }
}
