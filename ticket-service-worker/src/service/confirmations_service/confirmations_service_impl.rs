use super::{ConfirmationOutcome, ConfirmationsService, TicketLocks};
use crate::{
    error::Error,
    service::{notifications_service::NotificationsService, settlement_service::SettlementService},
};
use async_trait::async_trait;
use std::sync::Arc;
use tickets::{
    message::PurchaseEvent,
    repository::{self, TicketsRepository},
    Ticket, TicketStatus,
};
use time::OffsetDateTime;

pub struct ConfirmationsServiceImpl {
    ticket_locks: TicketLocks,
    repository: Arc<dyn TicketsRepository>,
    settlement_service: Arc<dyn SettlementService>,
    notifications_service: Arc<dyn NotificationsService>,
}

impl ConfirmationsServiceImpl {
    pub fn new(
        repository: Arc<dyn TicketsRepository>,
        settlement_service: Arc<dyn SettlementService>,
        notifications_service: Arc<dyn NotificationsService>,
    ) -> Self {
        Self {
            ticket_locks: TicketLocks::new(),
            repository,
            settlement_service,
            notifications_service,
        }
    }

    fn outcome_of_terminal(ticket: &Ticket) -> Option<ConfirmationOutcome> {
        match ticket.status {
            TicketStatus::Pending => None,
            TicketStatus::Confirmed => Some(ConfirmationOutcome::AlreadyConfirmed),
            TicketStatus::Cancelled => Some(ConfirmationOutcome::Cancelled),
        }
    }

    async fn confirm_pending(&self, event: &PurchaseEvent) -> Result<ConfirmationOutcome, Error> {
        let ticket = self
            .repository
            .find(event.ticket_id)
            .await?
            .ok_or(Error::TicketNotExist)?;

        if let Some(outcome) = Self::outcome_of_terminal(&ticket) {
            return Ok(outcome);
        }

        self.settlement_service.settle(event).await?;

        let result = self
            .repository
            .update_status(
                event.ticket_id,
                TicketStatus::Pending,
                TicketStatus::Confirmed,
                OffsetDateTime::now_utc(),
            )
            .await;

        match result {
            Ok(ticket) => Ok(ConfirmationOutcome::Confirmed(ticket)),
            Err(repository::Error::NoDocumentUpdated) => {
                tracing::debug!("ticket changed during settlement");
                let ticket = self
                    .repository
                    .find(event.ticket_id)
                    .await?
                    .ok_or(Error::TicketNotExist)?;

                match Self::outcome_of_terminal(&ticket) {
                    Some(outcome) => Ok(outcome),
                    None => Err(Error::Database(repository::Error::NoDocumentUpdated)),
                }
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl ConfirmationsService for ConfirmationsServiceImpl {
    #[tracing::instrument(
        name = "Confirmation",
        skip_all,
        fields(ticket_id = %event.ticket_id)
    )]
    async fn confirm(&self, event: PurchaseEvent) -> Result<ConfirmationOutcome, Error> {
        let _guard = self.ticket_locks.lock(event.ticket_id).await;

        let outcome = self.confirm_pending(&event).await?;
        match &outcome {
            ConfirmationOutcome::Confirmed(ticket) => {
                tracing::info!("ticket confirmed");
                self.notifications_service.notify_confirmed(ticket);
            }
            ConfirmationOutcome::AlreadyConfirmed => {
                tracing::info!("duplicate delivery, ticket already confirmed");
            }
            ConfirmationOutcome::Cancelled => {
                tracing::info!("ticket cancelled before confirmation");
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::service::{
        notifications_service::MockNotificationsService,
        settlement_service::MockSettlementService,
    };
    use bson::oid::ObjectId;
    use mockall::predicate::eq;
    use std::time::Duration;
    use tickets::repository::MockTicketsRepository;

    fn ticket(id: ObjectId, status: TicketStatus) -> Ticket {
        let now = OffsetDateTime::now_utc();
        Ticket {
            id,
            owner_id: "u1".to_string(),
            event_id: "evt-1".to_string(),
            quantity: 2,
            total_price: 49.98,
            status,
            created_at: now,
            updated_at: now,
            published_at: Some(now),
        }
    }

    fn event(ticket_id: ObjectId) -> PurchaseEvent {
        PurchaseEvent {
            ticket_id,
            owner_id: "u1".to_string(),
            event_id: "evt-1".to_string(),
            quantity: 2,
            total_price: 49.98,
            published_at: OffsetDateTime::now_utc(),
        }
    }

    fn settlement_ok(times: usize) -> MockSettlementService {
        let mut settlement_service = MockSettlementService::new();
        settlement_service
            .expect_settle()
            .times(times)
            .returning(|_| Ok(()));
        settlement_service
    }

    fn notifications(times: usize) -> MockNotificationsService {
        let mut notifications_service = MockNotificationsService::new();
        notifications_service
            .expect_notify_confirmed()
            .times(times)
            .return_const(());
        notifications_service
    }

    fn service(
        repository: MockTicketsRepository,
        settlement_service: MockSettlementService,
        notifications_service: MockNotificationsService,
    ) -> ConfirmationsServiceImpl {
        ConfirmationsServiceImpl::new(
            Arc::new(repository),
            Arc::new(settlement_service),
            Arc::new(notifications_service),
        )
    }

    #[tokio::test]
    async fn confirm_pending_ticket() {
        let id = ObjectId::new();
        let mut repository = MockTicketsRepository::new();
        repository
            .expect_find()
            .with(eq(id))
            .times(1)
            .returning(move |id| Ok(Some(ticket(id, TicketStatus::Pending))));
        repository
            .expect_update_status()
            .withf(move |ticket_id, from, to, _| {
                *ticket_id == id
                    && *from == TicketStatus::Pending
                    && *to == TicketStatus::Confirmed
            })
            .times(1)
            .returning(|id, _, to, _| Ok(ticket(id, to)));
        let service = service(repository, settlement_ok(1), notifications(1));

        let result = service.confirm(event(id)).await;

        match result {
            Ok(ConfirmationOutcome::Confirmed(ticket)) => {
                assert_eq!(ticket.status, TicketStatus::Confirmed)
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[tokio::test]
    async fn confirm_already_confirmed_has_no_side_effects() {
        let id = ObjectId::new();
        let mut repository = MockTicketsRepository::new();
        repository
            .expect_find()
            .returning(|id| Ok(Some(ticket(id, TicketStatus::Confirmed))));
        repository.expect_update_status().never();
        let service = service(repository, settlement_ok(0), notifications(0));

        let result = service.confirm(event(id)).await;

        assert!(matches!(result, Ok(ConfirmationOutcome::AlreadyConfirmed)));
    }

    #[tokio::test]
    async fn confirm_cancelled_is_ignored() {
        let id = ObjectId::new();
        let mut repository = MockTicketsRepository::new();
        repository
            .expect_find()
            .returning(|id| Ok(Some(ticket(id, TicketStatus::Cancelled))));
        repository.expect_update_status().never();
        let service = service(repository, settlement_ok(0), notifications(0));

        let result = service.confirm(event(id)).await;

        assert!(matches!(result, Ok(ConfirmationOutcome::Cancelled)));
    }

    #[tokio::test]
    async fn confirm_ticket_not_exist() {
        let mut repository = MockTicketsRepository::new();
        repository.expect_find().returning(|_| Ok(None));
        let service = service(repository, settlement_ok(0), notifications(0));

        let result = service.confirm(event(ObjectId::new())).await;

        assert!(matches!(result, Err(Error::TicketNotExist)));
    }

    #[tokio::test]
    async fn confirm_settlement_timeout() {
        let mut repository = MockTicketsRepository::new();
        repository
            .expect_find()
            .returning(|id| Ok(Some(ticket(id, TicketStatus::Pending))));
        repository.expect_update_status().never();
        let mut settlement_service = MockSettlementService::new();
        settlement_service
            .expect_settle()
            .returning(|_| Err(Error::SettlementTimeout(Duration::from_secs(1))));
        let service = service(repository, settlement_service, notifications(0));

        let result = service.confirm(event(ObjectId::new())).await;

        assert!(matches!(result, Err(Error::SettlementTimeout(_))));
    }

    #[tokio::test]
    async fn confirm_lost_race_to_cancel() {
        let id = ObjectId::new();
        let mut repository = MockTicketsRepository::new();
        let mut sequence = mockall::Sequence::new();
        repository
            .expect_find()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|id| Ok(Some(ticket(id, TicketStatus::Pending))));
        repository
            .expect_update_status()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _, _, _| Err(repository::Error::NoDocumentUpdated));
        repository
            .expect_find()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|id| Ok(Some(ticket(id, TicketStatus::Cancelled))));
        let service = service(repository, settlement_ok(1), notifications(0));

        let result = service.confirm(event(id)).await;

        assert!(matches!(result, Ok(ConfirmationOutcome::Cancelled)));
    }

    #[tokio::test]
    async fn confirm_lost_race_to_other_worker() {
        let id = ObjectId::new();
        let mut repository = MockTicketsRepository::new();
        let mut sequence = mockall::Sequence::new();
        repository
            .expect_find()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|id| Ok(Some(ticket(id, TicketStatus::Pending))));
        repository
            .expect_update_status()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _, _, _| Err(repository::Error::NoDocumentUpdated));
        repository
            .expect_find()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|id| Ok(Some(ticket(id, TicketStatus::Confirmed))));
        let service = service(repository, settlement_ok(1), notifications(0));

        let result = service.confirm(event(id)).await;

        assert!(matches!(result, Ok(ConfirmationOutcome::AlreadyConfirmed)));
    }

    #[tokio::test]
    async fn confirm_same_ticket_concurrently_confirms_once() {
        let id = ObjectId::new();
        let status = Arc::new(std::sync::Mutex::new(TicketStatus::Pending));
        let mut repository = MockTicketsRepository::new();
        {
            let status = Arc::clone(&status);
            repository
                .expect_find()
                .returning(move |id| Ok(Some(ticket(id, *status.lock().unwrap()))));
        }
        {
            let status = Arc::clone(&status);
            repository
                .expect_update_status()
                .times(1)
                .returning(move |id, _, to, _| {
                    *status.lock().unwrap() = to;
                    Ok(ticket(id, to))
                });
        }
        let service = Arc::new(service(repository, settlement_ok(1), notifications(1)));

        let first = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.confirm(event(id)).await }
        });
        let second = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.confirm(event(id)).await }
        });

        let mut outcomes = vec![
            first.await.unwrap().unwrap().as_str(),
            second.await.unwrap().unwrap().as_str(),
        ];
        outcomes.sort();

        assert_eq!(outcomes, vec!["already_confirmed", "confirmed"]);
    }
}
