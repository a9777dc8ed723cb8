//! Console behavior independent of any front end
//!
//! Port links, the action state machine, action dispatch with in-flight
//! tracking, and keyed synchronization of server lists.

pub mod actions;
pub mod dispatch;
pub mod forms;
pub mod pending;
pub mod ports;
pub mod sync;

pub use actions::{available_actions, ActionPanel, Affordance, ContainerAction};
pub use dispatch::{ActionDispatcher, ActionRequest, DispatchContext, FollowUp, Outcome, PendingDispatch};
pub use forms::FormOutcome;
pub use pending::{PendingKey, PendingSet, PendingToken};
pub use ports::{port_links, resolve_port_url, ConsoleOrigin, PortLink};
pub use sync::{ContainerListSync, KeyedStore, NodeHeadSync, Snapshot};
