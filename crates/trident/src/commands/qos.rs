//! QoS policy commands.

use serde::Serialize;
use trident_core::{BandwidthLimit, ControllerKind, ControllerManager, QosPolicy};

use crate::cli::{QosApplyArgs, QosArgs, QosCommand};
use crate::error::CliError;
use crate::output;

use super::Context;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Applied<'a> {
    controller: Option<ControllerKind>,
    policy: &'a QosPolicy,
}

/// Build a policy from flags and validate it before any backend is touched.
pub fn policy_from_args(args: QosApplyArgs) -> Result<QosPolicy, CliError> {
    let policy = QosPolicy {
        id: args.id,
        name: args.name,
        target_device: args.target,
        bandwidth: BandwidthLimit {
            min: args.min,
            max: args.max,
        },
        priority: args.priority,
        protocol: args.protocol.map(|p| p.to_ascii_lowercase()),
        ports: (!args.ports.is_empty()).then_some(args.ports),
    };
    policy.validate()?;
    Ok(policy)
}

pub async fn handle(
    manager: &ControllerManager,
    args: QosArgs,
    ctx: &Context,
) -> Result<(), CliError> {
    match args.command {
        QosCommand::Apply(apply) => {
            let policy = policy_from_args(apply)?;

            manager.connect().await?;
            manager.apply_qos_policy(&policy).await?;

            let applied = Applied {
                controller: manager.active_kind(),
                policy: &policy,
            };
            let out = output::render_single(
                ctx.format,
                &applied,
                |a| {
                    let via = a
                        .controller
                        .map_or_else(|| "-".into(), |k| k.to_string());
                    format!("Applied QoS policy '{}' via {via}", a.policy.id)
                },
                |a| a.policy.id.clone(),
            )?;
            output::print_output(&out, ctx.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::error::exit_code;

    fn args() -> QosApplyArgs {
        QosApplyArgs {
            id: "voice".into(),
            name: "VoIP".into(),
            target: "ether1".into(),
            min: 5,
            max: 20,
            priority: 1,
            protocol: Some("UDP".into()),
            ports: vec![5060],
        }
    }

    #[test]
    fn flags_become_a_policy() {
        let policy = policy_from_args(args()).unwrap();
        assert_eq!(policy.protocol.as_deref(), Some("udp"));
        assert_eq!(policy.ports(), &[5060]);
    }

    #[test]
    fn no_ports_means_unset() {
        let policy = policy_from_args(QosApplyArgs {
            ports: Vec::new(),
            ..args()
        })
        .unwrap();
        assert!(policy.ports.is_none());
    }

    #[test]
    fn invalid_priority_is_a_usage_error() {
        let err = policy_from_args(QosApplyArgs {
            priority: 9,
            ..args()
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
