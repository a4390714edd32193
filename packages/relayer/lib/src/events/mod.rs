//! Recognition of bridge-relevant notifications in application logs.

use alloy::primitives::{I256, U256};
use neo_apis::{ApplicationLog, Notification, StackItem, Uint160, Uint256};

use crate::{error::ProtocolViolation, metrics, tasks::Task};

/// Deposits below this amount are not minted on the destination.
pub const MINT_THRESHOLD: u64 = 100_000_000;
/// The role id of state validators in the role management contract.
pub const STATE_VALIDATOR_ROLE: u64 = 4;

/// Emitted by the bridge contract for every deposit.
pub const EVENT_ON_DEPOSITED: &str = "OnDeposited";
/// Emitted by the bridge contract when its validator set changes.
pub const EVENT_ON_VALIDATORS_CHANGED: &str = "OnValidatorsChanged";
/// Emitted by the role management contract when a role is designated.
pub const EVENT_DESIGNATION: &str = "Designation";

/// The native role management contract,
/// `0x49cf4e5378ffcd4dec034fd98a174c5491e395e2`.
pub const ROLE_MANAGEMENT: Uint160 = Uint160::from_le_bytes([
    0xe2, 0x95, 0xe3, 0x91, 0x54, 0x4c, 0x17, 0x8a, 0xd9, 0x4f, 0x03, 0xec, 0x4d, 0xcd, 0xff,
    0x78, 0x53, 0x4e, 0xcf, 0x49,
]);

/// Turns application logs into relay tasks.
#[derive(Clone, Copy, Debug)]
pub struct EventClassifier {
    bridge_contract: Uint160,
}

impl EventClassifier {
    /// A classifier for the bridge contract at `bridge_contract`.
    #[must_use]
    pub const fn new(bridge_contract: Uint160) -> Self {
        Self { bridge_contract }
    }

    /// Classifies every notification of the successful application executions
    /// in `log`, in order.
    ///
    /// # Errors
    /// Returns a [`ProtocolViolation`] if a recognized event has unexpected arguments.
    pub fn classify(&self, log: &ApplicationLog) -> Result<Vec<Task>, ProtocolViolation> {
        let mut tasks = Vec::new();
        for execution in log
            .executions
            .iter()
            .filter(|execution| execution.is_successful_application())
        {
            for notification in &execution.notifications {
                if let Some(task) = self.classify_notification(log.txid, notification)? {
                    tasks.push(task);
                }
            }
        }
        Ok(tasks)
    }

    /// Classifies a single notification emitted in `txid`.
    ///
    /// # Errors
    /// Returns a [`ProtocolViolation`] if a recognized event has unexpected arguments.
    pub fn classify_notification(
        &self,
        txid: Uint256,
        notification: &Notification,
    ) -> Result<Option<Task>, ProtocolViolation> {
        let event = notification.event_name.as_str();
        if notification.contract == self.bridge_contract {
            match event {
                EVENT_ON_DEPOSITED => parse_deposit(&Args::new(txid, notification)?),
                EVENT_ON_VALIDATORS_CHANGED => {
                    parse_validators_changed(&Args::new(txid, notification)?).map(Some)
                }
                _ => Ok(None),
            }
        } else if notification.contract == ROLE_MANAGEMENT && event == EVENT_DESIGNATION {
            parse_designation(&Args::new(txid, notification)?)
        } else {
            Ok(None)
        }
    }
}

fn parse_deposit(args: &Args<'_>) -> Result<Option<Task>, ProtocolViolation> {
    args.expect_len(4)?;
    let request_id = args.u64(0, "request id")?;
    let from = args.script_hash(1, "from")?;
    let amount = args.unsigned(2, "amount")?;
    let to = args.script_hash(3, "to")?;

    if amount < U256::from(MINT_THRESHOLD) {
        tracing::info!(
            txid = %args.txid, request_id, %from, %amount, %to,
            "deposit below mint threshold, skipping"
        );
        metrics::SKIPPED_DEPOSITS.inc();
        return Ok(None);
    }

    tracing::info!(txid = %args.txid, request_id, %from, %amount, %to, "deposit event");
    Ok(Some(Task::Deposit {
        txid: args.txid,
        request_id,
    }))
}

fn parse_validators_changed(args: &Args<'_>) -> Result<Task, ProtocolViolation> {
    args.expect_len(1)?;
    let keys = args.items[0].as_array().ok_or_else(|| {
        args.violation(format!(
            "validators: expected Array, got {}",
            args.items[0].type_name()
        ))
    })?;
    for (i, key) in keys.iter().enumerate() {
        let bytes = key.as_bytes().ok_or_else(|| {
            args.violation(format!(
                "validator {i}: expected ByteString, got {}",
                key.type_name()
            ))
        })?;
        p256::PublicKey::from_sec1_bytes(bytes)
            .map_err(|e| args.violation(format!("validator {i}: invalid public key: {e}")))?;
    }

    tracing::info!(txid = %args.txid, validators = keys.len(), "validators designate event");
    Ok(Task::ValidatorsDesignate { txid: args.txid })
}

fn parse_designation(args: &Args<'_>) -> Result<Option<Task>, ProtocolViolation> {
    args.expect_len(2)?;
    let role = args.integer(0, "role")?;
    if role != I256::from_raw(U256::from(STATE_VALIDATOR_ROLE)) {
        tracing::debug!(txid = %args.txid, %role, "designation of another role, ignoring");
        return Ok(None);
    }
    let validator_set_index = u32::try_from(args.unsigned(1, "index")?)
        .map_err(|_| args.violation("index: out of range".to_string()))?;

    tracing::info!(txid = %args.txid, validator_set_index, "state validators designate event");
    Ok(Some(Task::StateValidatorsChange {
        txid: args.txid,
        validator_set_index,
    }))
}

/// The arguments of one notification, with typed accessors.
struct Args<'a> {
    txid: Uint256,
    event: &'a str,
    items: &'a [StackItem],
}

impl<'a> Args<'a> {
    fn new(txid: Uint256, notification: &'a Notification) -> Result<Self, ProtocolViolation> {
        let event = notification.event_name.as_str();
        let items = notification.state.as_array().ok_or_else(|| ProtocolViolation {
            txid,
            event: event.to_string(),
            reason: format!(
                "expected Array arguments, got {}",
                notification.state.type_name()
            ),
        })?;
        Ok(Self { txid, event, items })
    }

    fn violation(&self, reason: String) -> ProtocolViolation {
        ProtocolViolation {
            txid: self.txid,
            event: self.event.to_string(),
            reason,
        }
    }

    fn expect_len(&self, len: usize) -> Result<(), ProtocolViolation> {
        if self.items.len() == len {
            Ok(())
        } else {
            Err(self.violation(format!(
                "expected {len} arguments, got {}",
                self.items.len()
            )))
        }
    }

    fn integer(&self, i: usize, name: &str) -> Result<I256, ProtocolViolation> {
        self.items[i].as_integer().ok_or_else(|| {
            self.violation(format!(
                "{name}: expected Integer, got {}",
                self.items[i].type_name()
            ))
        })
    }

    fn unsigned(&self, i: usize, name: &str) -> Result<U256, ProtocolViolation> {
        let value = self.integer(i, name)?;
        if value.is_negative() {
            return Err(self.violation(format!("{name}: negative value {value}")));
        }
        Ok(value.into_raw())
    }

    fn u64(&self, i: usize, name: &str) -> Result<u64, ProtocolViolation> {
        u64::try_from(self.unsigned(i, name)?)
            .map_err(|_| self.violation(format!("{name}: out of range")))
    }

    fn script_hash(&self, i: usize, name: &str) -> Result<Uint160, ProtocolViolation> {
        let bytes = self.items[i].as_bytes().ok_or_else(|| {
            self.violation(format!(
                "{name}: expected ByteString, got {}",
                self.items[i].type_name()
            ))
        })?;
        let bytes: [u8; 20] = bytes.try_into().map_err(|_| {
            self.violation(format!("{name}: expected 20 bytes, got {}", bytes.len()))
        })?;
        Ok(Uint160::from_be_bytes(bytes))
    }
}
