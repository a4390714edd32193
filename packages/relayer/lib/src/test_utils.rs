//! In-memory chains for unit tests.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
};

use alloy::{
    consensus::{TxEnvelope, TxLegacy},
    eips::eip2718::Decodable2718,
    primitives::{address, Address, TxHash, TxKind, I256, U256},
    sol_types::SolCall,
};
use bridge_solidity_types::bridge::IBridge;
use neo_apis::{
    ApplicationLog, Block, Execution, Header, Notification, StackItem, StateRoot, Trigger,
    Uint160, Uint256, VmState, Witness,
};

use crate::{
    chain::{
        evm::LocalSigner, CallRequest, ChainError, DestinationChain, DestinationError,
        SourceChain, TransactionSigner,
    },
    events::{
        EVENT_DESIGNATION, EVENT_ON_DEPOSITED, EVENT_ON_VALIDATORS_CHANGED, ROLE_MANAGEMENT,
    },
    tasks::SyncMethod,
    tx_builder::SyncTransaction,
};

pub const BRIDGE: Address = address!("0x1212121212121212121212121212121212121212");
pub const BRIDGE_CONTRACT: Uint160 = Uint160::from_le_bytes([0x77; 20]);

const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

pub fn test_signer() -> LocalSigner {
    LocalSigner::from_hex(KEY).unwrap()
}

pub fn witness() -> Witness {
    Witness {
        invocation: vec![0x0c, 0x40],
        verification: vec![0x41, 0x56],
    }
}

pub fn sample_header(index: u32) -> Header {
    header(index, Uint160::from_le_bytes([0xc0; 20]))
}

pub fn header(index: u32, next_consensus: Uint160) -> Header {
    let mut hash = [0u8; 32];
    hash[..4].copy_from_slice(&index.to_le_bytes());
    hash[31] = 0xbb;
    Header {
        hash: Uint256::from_le_bytes(hash),
        version: 0,
        prev_hash: Uint256::ZERO,
        merkle_root: Uint256::ZERO,
        timestamp: 1_700_000_000_000 + u64::from(index),
        nonce: 42,
        index,
        primary_index: 0,
        next_consensus,
        witnesses: vec![witness()],
    }
}

pub fn block(header: Header, transactions: Vec<Uint256>) -> Block {
    Block {
        header,
        transactions: transactions
            .into_iter()
            .map(|hash| neo_apis::TransactionInfo { hash })
            .collect(),
    }
}

pub fn witnessed_root(index: u32) -> StateRoot {
    StateRoot {
        version: 0,
        index,
        root_hash: Uint256::from_le_bytes([u8::try_from(index % 251).unwrap() + 1; 32]),
        witnesses: vec![witness()],
    }
}

/// Compressed secp256r1 generator point.
pub const VALIDATOR_KEY: [u8; 33] = [
    0x03, 0x6b, 0x17, 0xd1, 0xf2, 0xe1, 0x2c, 0x42, 0x47, 0xf8, 0xbc, 0xe6, 0xe5, 0x63, 0xa4, 0x40,
    0xf2, 0x77, 0x03, 0x7d, 0x81, 0x2d, 0xeb, 0x33, 0xa0, 0xf4, 0xa1, 0x39, 0x45, 0xd8, 0x98, 0xc2,
    0x96,
];

fn int(value: u64) -> StackItem {
    StackItem::Integer(I256::from_raw(U256::from(value)))
}

/// A successful application log with a single notification.
pub fn notification_log(
    txid: Uint256,
    contract: Uint160,
    event: &str,
    args: Vec<StackItem>,
) -> ApplicationLog {
    ApplicationLog {
        txid,
        executions: vec![Execution {
            trigger: Trigger::Application,
            vm_state: VmState::Halt,
            exception: None,
            notifications: vec![Notification {
                contract,
                event_name: event.to_string(),
                state: StackItem::Array(args),
            }],
        }],
    }
}

/// A log whose only notification is a bridge deposit.
pub fn deposit_log(txid: Uint256, request_id: u64, amount: u64) -> ApplicationLog {
    notification_log(
        txid,
        BRIDGE_CONTRACT,
        EVENT_ON_DEPOSITED,
        vec![
            int(request_id),
            StackItem::ByteString(vec![0x11; 20]),
            int(amount),
            StackItem::ByteString(vec![0x22; 20]),
        ],
    )
}

/// A log whose only notification is a bridge validator set change.
pub fn validators_changed_log(txid: Uint256) -> ApplicationLog {
    notification_log(
        txid,
        BRIDGE_CONTRACT,
        EVENT_ON_VALIDATORS_CHANGED,
        vec![StackItem::Array(vec![StackItem::ByteString(
            VALIDATOR_KEY.to_vec(),
        )])],
    )
}

/// A log whose only notification is a role designation.
pub fn designation_log(txid: Uint256, role: u64, index: u64) -> ApplicationLog {
    notification_log(
        txid,
        ROLE_MANAGEMENT,
        EVENT_DESIGNATION,
        vec![int(role), int(index)],
    )
}

/// A log without notifications.
pub fn empty_log(txid: Uint256) -> ApplicationLog {
    ApplicationLog {
        txid,
        executions: vec![],
    }
}

/// Signs a call to `method` with dummy arguments.
pub fn signed_call(method: SyncMethod, nonce: u64) -> SyncTransaction {
    let input = match method {
        SyncMethod::Header => IBridge::syncHeaderCall {
            rawHeader: vec![1, 2, 3].into(),
        }
        .abi_encode(),
        SyncMethod::StateRoot => IBridge::syncStateRootCall {
            rawStateRoot: vec![4, 5, 6].into(),
        }
        .abi_encode(),
        _ => IBridge::requestMintCall {
            blockIndex: 0,
            txid: U256::ZERO,
            txProof: vec![].into(),
            stateRootIndex: 0,
            stateProof: vec![].into(),
        }
        .abi_encode(),
    };
    let tx = TxLegacy {
        chain_id: None,
        nonce,
        gas_price: MockDestination::GAS_PRICE,
        gas_limit: MockDestination::GAS,
        to: TxKind::Call(BRIDGE),
        value: U256::ZERO,
        input: input.into(),
    };
    let signed = test_signer().sign(MockDestination::CHAIN_ID, tx).unwrap();
    SyncTransaction { method, signed }
}

/// The bridge method a calldata selector belongs to.
pub fn method_of(input: &[u8]) -> Option<SyncMethod> {
    let selector: [u8; 4] = input.get(..4)?.try_into().ok()?;
    [
        (IBridge::syncHeaderCall::SELECTOR, SyncMethod::Header),
        (IBridge::syncStateRootCall::SELECTOR, SyncMethod::StateRoot),
        (IBridge::syncValidatorsCall::SELECTOR, SyncMethod::Validators),
        (
            IBridge::syncStateRootValidatorsAddressCall::SELECTOR,
            SyncMethod::StateValidators,
        ),
        (IBridge::requestMintCall::SELECTOR, SyncMethod::RequestMint),
    ]
    .into_iter()
    .find_map(|(s, method)| (s == selector).then_some(method))
}

#[derive(Default)]
pub struct MockSource {
    blocks: Mutex<HashMap<u32, Block>>,
    logs: Mutex<HashMap<Uint256, ApplicationLog>>,
    state_roots: Mutex<HashMap<u32, StateRoot>>,
    proofs: Mutex<HashMap<(Uint256, Uint160, Vec<u8>), Vec<u8>>>,
    unavailable: AtomicBool,
    state_root_calls: AtomicUsize,
}

impl MockSource {
    pub fn add_block(&self, block: Block) {
        self.blocks.lock().unwrap().insert(block.index(), block);
    }

    pub fn add_log(&self, log: ApplicationLog) {
        self.logs.lock().unwrap().insert(log.txid, log);
    }

    pub fn add_state_root(&self, root: StateRoot) {
        self.state_roots.lock().unwrap().insert(root.index, root);
    }

    pub fn add_proof(&self, root: Uint256, contract: Uint160, key: Vec<u8>, proof: Vec<u8>) {
        self.proofs
            .lock()
            .unwrap()
            .insert((root, contract, key), proof);
    }

    /// Makes every request fail as if the node were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn state_root_calls(&self) -> usize {
        self.state_root_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), ChainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(ChainError::Unavailable("source node is down".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl SourceChain for MockSource {
    async fn block(&self, index: u32) -> Result<Option<Block>, ChainError> {
        self.check()?;
        Ok(self.blocks.lock().unwrap().get(&index).cloned())
    }

    async fn application_log(&self, txid: Uint256) -> Result<ApplicationLog, ChainError> {
        self.check()?;
        self.logs
            .lock()
            .unwrap()
            .get(&txid)
            .cloned()
            .ok_or_else(|| ChainError::Unavailable(format!("unknown transaction {txid}")))
    }

    async fn state_root(&self, index: u32) -> Result<Option<StateRoot>, ChainError> {
        self.check()?;
        self.state_root_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.state_roots.lock().unwrap().get(&index).cloned())
    }

    async fn proof(
        &self,
        root: Uint256,
        contract: Uint160,
        key: &[u8],
    ) -> Result<Option<Vec<u8>>, ChainError> {
        self.check()?;
        Ok(self
            .proofs
            .lock()
            .unwrap()
            .get(&(root, contract, key.to_vec()))
            .cloned())
    }
}

/// A destination request, as recorded by [`MockDestination`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Estimate(SyncMethod),
    Broadcast(SyncMethod, TxHash),
    Poll(TxHash),
}

pub struct MockDestination {
    journal: Mutex<Vec<Call>>,
    rejections: Mutex<HashMap<SyncMethod, String>>,
    confirming: AtomicBool,
}

impl Default for MockDestination {
    fn default() -> Self {
        Self {
            journal: Mutex::default(),
            rejections: Mutex::default(),
            confirming: AtomicBool::new(true),
        }
    }
}

impl MockDestination {
    pub const CHAIN_ID: u64 = 47_763;
    pub const GAS_PRICE: u128 = 20_000_000_000;
    pub const GAS: u64 = 210_000;
    pub const NONCE: u64 = 5;

    /// Makes every estimate of `method` revert with `reason`.
    pub fn reject(&self, method: SyncMethod, reason: &str) {
        self.rejections
            .lock()
            .unwrap()
            .insert(method, reason.to_string());
    }

    pub fn set_confirming(&self, confirming: bool) {
        self.confirming.store(confirming, Ordering::SeqCst);
    }

    pub fn journal(&self) -> Vec<Call> {
        self.journal.lock().unwrap().clone()
    }

    /// The methods broadcast so far, in order.
    pub fn broadcasts(&self) -> Vec<SyncMethod> {
        self.journal()
            .into_iter()
            .filter_map(|call| match call {
                Call::Broadcast(method, _) => Some(method),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.journal.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl DestinationChain for MockDestination {
    async fn chain_id(&self) -> Result<u64, ChainError> {
        Ok(Self::CHAIN_ID)
    }

    async fn gas_price(&self) -> Result<u128, ChainError> {
        Ok(Self::GAS_PRICE)
    }

    async fn nonce(&self, _address: Address) -> Result<u64, ChainError> {
        Ok(Self::NONCE)
    }

    async fn estimate_gas(&self, call: &CallRequest) -> Result<u64, DestinationError> {
        let method = method_of(&call.input)
            .ok_or_else(|| DestinationError::Rejected("unknown selector".into()))?;
        self.record(Call::Estimate(method));
        match self.rejections.lock().unwrap().get(&method) {
            Some(reason) => Err(DestinationError::Rejected(reason.clone())),
            None => Ok(Self::GAS),
        }
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash, DestinationError> {
        let envelope = TxEnvelope::decode_2718(&mut &raw[..])
            .map_err(|e| DestinationError::Rejected(e.to_string()))?;
        let legacy = envelope
            .as_legacy()
            .ok_or_else(|| DestinationError::Rejected("not a legacy transaction".into()))?;
        let method = method_of(&legacy.tx().input)
            .ok_or_else(|| DestinationError::Rejected("unknown selector".into()))?;
        let hash = *legacy.hash();
        self.record(Call::Broadcast(method, hash));
        Ok(hash)
    }

    async fn is_confirmed(&self, hash: TxHash) -> Result<bool, ChainError> {
        self.record(Call::Poll(hash));
        Ok(self.confirming.load(Ordering::SeqCst))
    }
}
