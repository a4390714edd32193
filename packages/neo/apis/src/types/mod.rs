//! Response types of the source ledger's JSON-RPC API.

mod application_log;
mod block;
mod hash;
mod stack_item;
mod state_root;

pub use application_log::{ApplicationLog, Execution, Notification, Trigger, VmState};
pub use block::{Block, Header, TransactionInfo, Witness};
pub use hash::{HashParseError, Uint160, Uint256, ADDRESS_VERSION};
pub use stack_item::StackItem;
pub use state_root::StateRoot;
