// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod autonomy;
pub mod llm_question_generator;
pub mod partner;

// Re-export use cases for convenience
pub use autonomy::{AutonomyError, AutonomyManager, MINIMUM_QUESTIONS_DEFAULT};
pub use llm_question_generator::LlmQuestionGenerator;
pub use partner::{
    partner_address, PartnerCollaborator, Proposal, PARTNER_PREFIX, PROPOSAL_CAPACITY_DEFAULT,
};
