//! Request authorization gate: route classification, credential
//! verification, role enforcement and response shaping.

pub mod decision;
pub mod middleware;
pub mod response;
pub mod routes;

pub use decision::{Decision, evaluate};
pub use middleware::{AuthorizationGate, Verdict, authorization_gate};
pub use response::{DenyResponder, RequestClass};
pub use routes::{Pattern, Policy, RouteRule, RouteTable, RouteTableBuilder, RouteTableError};
