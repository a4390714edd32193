//! Execution results as returned by `getapplicationlog`.

use serde::Deserialize;

use super::{StackItem, Uint160, Uint256};

/// What caused a script to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum Trigger {
    /// A transaction's entry script.
    Application,
    /// Witness verification.
    Verification,
    /// Native contracts before the block's transactions.
    OnPersist,
    /// Native contracts after the block's transactions.
    PostPersist,
    /// Any trigger not listed above.
    #[serde(other)]
    Other,
}

/// The final state of the VM.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VmState {
    /// Not started.
    None,
    /// Finished successfully.
    Halt,
    /// Aborted with an exception.
    Fault,
    /// Stopped at a breakpoint.
    Break,
}

/// An event emitted by a contract.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Notification {
    /// The emitting contract.
    pub contract: Uint160,
    /// The event name.
    #[serde(rename = "eventname")]
    pub event_name: String,
    /// The event arguments, normally an `Array`.
    pub state: StackItem,
}

/// One execution within an application log.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Execution {
    /// The trigger of this execution.
    pub trigger: Trigger,
    /// The resulting VM state.
    #[serde(rename = "vmstate")]
    pub vm_state: VmState,
    /// The exception message when the VM faulted.
    #[serde(default)]
    pub exception: Option<String>,
    /// Notifications in emission order.
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

impl Execution {
    /// Whether this is a successful application execution, the only kind
    /// whose notifications took effect.
    #[must_use]
    pub fn is_successful_application(&self) -> bool {
        self.trigger == Trigger::Application && self.vm_state == VmState::Halt
    }
}

/// The execution log of a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ApplicationLog {
    /// The transaction id.
    pub txid: Uint256,
    /// The executions of the transaction.
    #[serde(default)]
    pub executions: Vec<Execution>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_application_log() {
        let json = format!(
            r#"{{
                "txid": "0x{txid}",
                "executions": [
                    {{
                        "trigger": "Application",
                        "vmstate": "HALT",
                        "gasconsumed": "9977780",
                        "exception": null,
                        "stack": [],
                        "notifications": [
                            {{
                                "contract": "0x{contract}",
                                "eventname": "Designation",
                                "state": {{
                                    "type": "Array",
                                    "value": [
                                        {{ "type": "Integer", "value": "4" }},
                                        {{ "type": "Integer", "value": "120" }}
                                    ]
                                }}
                            }}
                        ]
                    }}
                ]
            }}"#,
            txid = "77".repeat(32),
            contract = "49cf4e5378ffcd4dec034fd98a174c5491e395e2",
        );
        let log: ApplicationLog = serde_json::from_str(&json).unwrap();
        assert_eq!(log.txid, Uint256::from_le_bytes([0x77; 32]));
        let execution = &log.executions[0];
        assert!(execution.is_successful_application());
        assert_eq!(execution.notifications[0].event_name, "Designation");
        assert_eq!(
            execution.notifications[0].contract.to_string(),
            "0x49cf4e5378ffcd4dec034fd98a174c5491e395e2"
        );
    }

    #[test]
    fn faulted_execution_is_not_successful() {
        let json = r#"{"trigger":"Application","vmstate":"FAULT","exception":"boom"}"#;
        let execution: Execution = serde_json::from_str(json).unwrap();
        assert!(!execution.is_successful_application());
        assert!(execution.notifications.is_empty());
        assert_eq!(execution.exception.as_deref(), Some("boom"));
    }

    #[test]
    fn unknown_trigger_maps_to_other() {
        let json = r#"{"trigger":"System","vmstate":"HALT"}"#;
        let execution: Execution = serde_json::from_str(json).unwrap();
        assert_eq!(execution.trigger, Trigger::Other);
        assert!(!execution.is_successful_application());
    }
}
