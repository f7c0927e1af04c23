//! Cooldown engine: parsing, resolution, records and the execution gate

pub mod clock;
pub mod duration;
pub mod exemption;
pub mod gate;
pub mod resolver;
pub mod store;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use exemption::ExemptionCheck;
pub use gate::{CooldownBlock, ExecutionGate, GateDecision, GateTicket, Invocation, Outcome};
pub use resolver::{CooldownResolver, EffectiveCooldown, ResolvedCooldown};
pub use store::RecordStore;
pub use types::{
    ActorKind, ActorRecordSet, ActorRef, CommandId, CooldownRule, ExecutionRecord, RoleRef,
};
