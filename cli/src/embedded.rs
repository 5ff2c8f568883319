// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Composition root
//!
//! Builds every component from a [`DexterConfig`] and hands out `Arc`s.
//! Both `dexter serve` and the in-process `dexter ask` go through here.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use dexter_core::{
    application::{AutonomyManager, LlmQuestionGenerator, PartnerCollaborator},
    domain::clarification::{QuestionGenerator, TemplateQuestionGenerator},
    domain::config::{DexterConfig, QuestionGeneratorKind},
    infrastructure::{
        llm::create_provider, CollaborationHub, ConversationStore, EventStreamListener,
    },
    presentation::api::AppState,
};
use dexter_cortex::MemoryManager;

pub struct Services {
    pub autonomy: Arc<AutonomyManager>,
    pub hub: Arc<CollaborationHub>,
    pub events: EventStreamListener,
    pub partner: Option<Arc<PartnerCollaborator>>,
    pub conversations: Option<Arc<ConversationStore>>,
}

impl Services {
    /// Discover, validate and build
    pub async fn load(config_path: Option<PathBuf>) -> Result<(DexterConfig, Self)> {
        let config =
            DexterConfig::load_or_default(config_path).context("Failed to load configuration")?;

        config
            .validate()
            .context("Configuration validation failed")?;

        let services = Self::build(&config).await?;
        Ok((config, services))
    }

    pub async fn build(config: &DexterConfig) -> Result<Self> {
        let memory = Arc::new(
            MemoryManager::from_config(&config.memory)
                .await
                .context("Failed to open long-term memory")?,
        );

        let hub = Arc::new(CollaborationHub::new());
        let events = EventStreamListener::with_default_capacity();
        hub.subscribe(Arc::new(events.clone()));

        let responder =
            create_provider(&config.llm.dexter).context("Failed to initialize Dexter provider")?;
        if let Err(e) = responder.health_check().await {
            warn!(
                "Dexter provider '{}' failed its health check, requests may fail: {}",
                responder.name(),
                e
            );
        }

        let question_generator: Arc<dyn QuestionGenerator> =
            match config.autonomy.question_generator {
                QuestionGeneratorKind::Template => Arc::new(TemplateQuestionGenerator::new()),
                QuestionGeneratorKind::Llm => {
                    Arc::new(LlmQuestionGenerator::new(responder.clone()))
                }
            };

        let partner = if config.llm.partner.enabled {
            let provider = create_provider(&config.llm.partner)
                .context("Failed to initialize Partner provider")?;
            let partner = Arc::new(
                PartnerCollaborator::new(provider)
                    .with_identity(config.llm.partner.identity.clone()),
            );
            hub.subscribe(partner.clone());
            Some(partner)
        } else {
            info!("Partner disabled");
            None
        };

        let conversations = match ConversationStore::open(&config.conversations.database_path).await
        {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                warn!(
                    "Conversation logging disabled, could not open {:?}: {}",
                    config.conversations.database_path, e
                );
                None
            }
        };

        let mut autonomy = AutonomyManager::new(memory, hub.clone())
            .with_question_generator(question_generator)
            .with_responder(responder)
            .with_identity(config.llm.dexter.identity.clone())
            .with_minimum_questions(config.autonomy.minimum_questions)
            .with_context_limit(config.memory.context_limit);
        if let Some(partner) = &partner {
            autonomy = autonomy.with_partner(partner.clone());
        }
        let autonomy = Arc::new(autonomy);

        info!(
            "Services ready ({} collaboration listeners)",
            hub.listener_count()
        );

        Ok(Self {
            autonomy,
            hub,
            events,
            partner,
            conversations,
        })
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            autonomy: self.autonomy.clone(),
            conversations: self.conversations.clone(),
            partner: self.partner.clone(),
            events: self.events.clone(),
        }
    }
}
