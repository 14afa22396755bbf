//! Automation service — use-cases for managing automations and reading
//! their logs.

use autoflow_domain::automation::{Automation, AutomationStatus};
use autoflow_domain::error::{AutoflowError, NotFoundError};
use autoflow_domain::id::AutomationId;
use autoflow_domain::log::AutomationLog;

use crate::ports::{AutomationLogStore, AutomationRepository};

/// Application service for automation CRUD operations.
pub struct AutomationService<R, L> {
    repo: R,
    logs: L,
}

impl<R: AutomationRepository, L: AutomationLogStore> AutomationService<R, L> {
    /// Create a new service backed by the given repository and log store.
    pub fn new(repo: R, logs: L) -> Self {
        Self { repo, logs }
    }

    /// Create a new automation after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AutoflowError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, automation), fields(automation_name = %automation.name))]
    pub async fn create_automation(
        &self,
        automation: Automation,
    ) -> Result<Automation, AutoflowError> {
        automation.validate()?;
        self.repo.create(automation).await
    }

    /// Look up an automation by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`AutoflowError::NotFound`] when no automation with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_automation(&self, id: AutomationId) -> Result<Automation, AutoflowError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Automation",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all automations.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_automations(&self) -> Result<Vec<Automation>, AutoflowError> {
        self.repo.get_all().await
    }

    /// Get all active automations.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_active(&self) -> Result<Vec<Automation>, AutoflowError> {
        self.repo.get_active().await
    }

    /// Update an existing automation.
    ///
    /// # Errors
    ///
    /// Returns [`AutoflowError::Validation`] if invariants fail,
    /// [`AutoflowError::NotFound`] if the automation does not exist, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, automation), fields(automation_id = %automation.id))]
    pub async fn update_automation(
        &self,
        automation: Automation,
    ) -> Result<Automation, AutoflowError> {
        automation.validate()?;
        self.get_automation(automation.id).await?;
        self.repo.update(automation).await
    }

    /// Pause or resume an automation.
    ///
    /// # Errors
    ///
    /// Returns [`AutoflowError::NotFound`] if the automation does not exist,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn set_status(
        &self,
        id: AutomationId,
        status: AutomationStatus,
    ) -> Result<Automation, AutoflowError> {
        let mut automation = self.get_automation(id).await?;
        automation.status = status;
        self.repo.update(automation).await
    }

    /// Delete an automation by id. Its logs are kept.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_automation(&self, id: AutomationId) -> Result<(), AutoflowError> {
        self.repo.delete(id).await
    }

    /// The most recent logs of an automation, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the log store.
    pub async fn recent_logs(
        &self,
        id: AutomationId,
        limit: usize,
    ) -> Result<Vec<AutomationLog>, AutoflowError> {
        self.logs.find_by_automation(id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{InMemoryAutomationRepo, InMemoryLogStore};
    use autoflow_domain::automation::{Action, ActionKind, Trigger};
    use autoflow_domain::error::ValidationError;
    use serde_json::json;

    fn make_service() -> AutomationService<InMemoryAutomationRepo, InMemoryLogStore> {
        AutomationService::new(
            InMemoryAutomationRepo::default(),
            InMemoryLogStore::default(),
        )
    }

    fn valid_automation() -> Automation {
        Automation::builder()
            .name("Test automation")
            .trigger(Trigger::Manual)
            .action(Action::new(
                "a1",
                ActionKind::OpenUrl {
                    url: Some("https://example.com/{id}".to_string()),
                },
            ))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_create_automation_when_valid() {
        let svc = make_service();
        let auto = valid_automation();
        let id = auto.id;

        let created = svc.create_automation(auto).await.unwrap();
        assert_eq!(created.id, id);

        let fetched = svc.get_automation(id).await.unwrap();
        assert_eq!(fetched.name, "Test automation");
    }

    #[tokio::test]
    async fn should_reject_create_when_name_is_empty() {
        let svc = make_service();
        let mut auto = valid_automation();
        auto.name = String::new();

        let result = svc.create_automation(auto).await;
        assert!(matches!(
            result,
            Err(AutoflowError::Validation(ValidationError::EmptyName))
        ));
    }

    #[tokio::test]
    async fn should_return_not_found_when_automation_missing() {
        let svc = make_service();
        let result = svc.get_automation(AutomationId::new()).await;
        assert!(matches!(result, Err(AutoflowError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_list_only_active_automations() {
        let svc = make_service();
        svc.create_automation(valid_automation()).await.unwrap();

        let mut paused = valid_automation();
        paused.name = "Paused".to_string();
        paused.status = AutomationStatus::Paused;
        svc.create_automation(paused).await.unwrap();

        assert_eq!(svc.list_automations().await.unwrap().len(), 2);
        let active = svc.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert!(active[0].is_active());
    }

    #[tokio::test]
    async fn should_update_automation() {
        let svc = make_service();
        let auto = valid_automation();
        let id = auto.id;
        svc.create_automation(auto).await.unwrap();

        let mut updated = svc.get_automation(id).await.unwrap();
        updated.name = "Updated name".to_string();
        let saved = svc.update_automation(updated).await.unwrap();
        assert_eq!(saved.name, "Updated name");
    }

    #[tokio::test]
    async fn should_return_not_found_when_updating_missing_automation() {
        let svc = make_service();
        let result = svc.update_automation(valid_automation()).await;
        assert!(matches!(result, Err(AutoflowError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_pause_and_resume_automation() {
        let svc = make_service();
        let auto = svc.create_automation(valid_automation()).await.unwrap();

        let paused = svc
            .set_status(auto.id, AutomationStatus::Paused)
            .await
            .unwrap();
        assert!(!paused.is_active());
        assert!(svc.list_active().await.unwrap().is_empty());

        let resumed = svc
            .set_status(auto.id, AutomationStatus::Active)
            .await
            .unwrap();
        assert!(resumed.is_active());
    }

    #[tokio::test]
    async fn should_delete_automation() {
        let svc = make_service();
        let auto = valid_automation();
        let id = auto.id;
        svc.create_automation(auto).await.unwrap();

        svc.delete_automation(id).await.unwrap();

        let result = svc.get_automation(id).await;
        assert!(matches!(result, Err(AutoflowError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_return_recent_logs_newest_first() {
        let logs = InMemoryLogStore::default();
        let id = AutomationId::new();
        for ms in [1, 2, 3] {
            logs.append(AutomationLog::success(id, ms, json!({}), json!({})))
                .await
                .unwrap();
        }
        logs.append(AutomationLog::success(AutomationId::new(), 9, json!({}), json!({})))
            .await
            .unwrap();
        let svc = AutomationService::new(InMemoryAutomationRepo::default(), logs);

        let recent = svc.recent_logs(id, 2).await.unwrap();
        let durations: Vec<u64> = recent.iter().map(|log| log.duration_ms).collect();
        assert_eq!(durations, vec![3, 2]);
    }
}
