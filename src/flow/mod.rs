//! Intake conversation run by the assistance service.
//!
//! Each user message is routed to a program, mined for beneficiary details,
//! and answered with the next question; once name, age and request are known
//! a referral goes out through the webhook.

pub mod engine;
pub mod extract;
pub mod program;
pub mod store;
pub mod webhook;

pub use engine::{ConversationFlow, FlowReply};
pub use extract::{Beneficiary, BeneficiaryExtractor, Field};
pub use program::Program;
pub use store::{ConversationRecord, ConversationStore};
pub use webhook::{Delivery, Referral, ReferralNotifier, WebhookClient, WebhookError};
