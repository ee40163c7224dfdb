//! In-memory adapters for tests and local runs.

mod bot_integration_repository;
mod conversation_state_store;
mod processed_event_store;
mod registration_scheduler;

pub use bot_integration_repository::InMemoryBotIntegrationRepository;
pub use conversation_state_store::InMemoryConversationStateStore;
pub use processed_event_store::InMemoryProcessedEventStore;
pub use registration_scheduler::RecordingRegistrationScheduler;
