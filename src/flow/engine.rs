//! Turn-by-turn intake conversation: route, collect details, refer.

use std::sync::Arc;

use crate::client::message::Message;
use crate::ids::SessionId;

use super::extract::{Beneficiary, BeneficiaryExtractor, Field};
use super::program::Program;
use super::store::{ConversationRecord, ConversationStore};
use super::webhook::{Delivery, Referral, ReferralNotifier};

/// Assistant answer to one user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowReply {
    /// Reply text.
    pub message: String,
    /// Session the turn belongs to.
    pub session_id: SessionId,
    /// Program the conversation is routed to.
    pub program: Program,
}

/// Question asked when `field` is the first missing detail.
#[must_use]
pub fn clarification_question(field: Field, program: Program) -> String {
    match field {
        Field::Name => format!(
            "Thank you for reaching out to the {program}. To assist you better, may I please have your name?"
        ),
        Field::Age => {
            "Could you please share your age? This helps us provide appropriate assistance.".to_string()
        }
        Field::AssistanceRequest => "Please tell me more about your food assistance needs. What specific help are you looking for?".to_string(),
    }
}

/// Message sent once every detail has been collected.
#[must_use]
pub fn completion_message(program: Program) -> String {
    format!(
        "Thank you for providing all the necessary information. \
         I've registered your request with the {program}. \
         Your information has been submitted and our team will contact you shortly to assist you further."
    )
}

/// Drives the intake conversation of every session.
pub struct ConversationFlow {
    store: ConversationStore,
    extractor: BeneficiaryExtractor,
    notifier: Arc<dyn ReferralNotifier>,
}

impl ConversationFlow {
    /// Create a flow over `store`, sending referrals to `notifier`.
    ///
    /// # Errors
    /// Returns an error if the extraction patterns fail to compile.
    pub fn new(
        store: ConversationStore,
        notifier: Arc<dyn ReferralNotifier>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            store,
            extractor: BeneficiaryExtractor::new()?,
            notifier,
        })
    }

    /// The underlying conversation store.
    #[must_use]
    pub const fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Use the session the client sent, or open a new one.
    #[must_use]
    pub fn resolve_session(&self, requested: Option<SessionId>) -> SessionId {
        requested.unwrap_or_else(|| self.store.create_session())
    }

    /// Process one user message and produce the assistant reply.
    ///
    /// Unknown session ids start a fresh conversation under that id. Turns on
    /// the same session run one after another.
    pub async fn process_message(&self, session_id: &SessionId, message: &str) -> FlowReply {
        let lock = self.store.turn_lock(session_id);
        let turn = lock.lock().await;
        let reply = self.take_turn(session_id, message).await;
        drop(turn);
        reply
    }

    async fn take_turn(&self, session_id: &SessionId, message: &str) -> FlowReply {
        let mut record = self
            .store
            .load(session_id)
            .unwrap_or_else(|| ConversationRecord::new(session_id.clone()));

        record.messages.push(Message::user(message));

        let program = *record
            .program
            .get_or_insert_with(|| Program::classify(message));

        self.extractor
            .update(&mut record.beneficiary, message, record.awaiting);

        let reply = match record.beneficiary.missing() {
            Some(field) => {
                record.awaiting = Some(field);
                clarification_question(field, program)
            }
            None => {
                record.awaiting = None;
                if !record.referral_submitted {
                    record.referral_submitted = self.submit_referral(&record.beneficiary, program).await;
                }
                completion_message(program)
            }
        };

        tracing::debug!(
            session_id = %session_id,
            program = program.as_str(),
            awaiting = ?record.awaiting,
            "turn processed"
        );

        record.messages.push(Message::assistant(reply.clone()));
        self.store.save(record);

        FlowReply {
            message: reply,
            session_id: session_id.clone(),
            program,
        }
    }

    /// Send the referral; returns whether it should count as submitted.
    async fn submit_referral(&self, beneficiary: &Beneficiary, program: Program) -> bool {
        let (Some(name), Some(age), Some(request)) = (
            &beneficiary.name,
            beneficiary.age,
            &beneficiary.assistance_request,
        ) else {
            return false;
        };

        let referral = Referral {
            beneficiary_name: name.clone(),
            beneficiary_age: age,
            assistance_request: request.clone(),
            program,
        };

        match self.notifier.notify(&referral).await {
            Ok(Delivery::Sent | Delivery::Skipped) => true,
            Err(err) => {
                tracing::warn!(error = %err, "referral webhook failed; will retry on next message");
                false
            }
        }
    }
}
