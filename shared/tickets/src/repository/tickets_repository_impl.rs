use super::{
    entity::{TicketFindEntity, TicketInsertEntity},
    Error, TicketsRepository,
};
use crate::{NewTicket, Ticket, TicketStatus};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use futures_util::TryStreamExt;
use mongodb::{
    error::ErrorKind,
    options::{IndexOptions, ReturnDocument},
    Collection, Database, IndexModel,
};
use std::sync::Arc;
use time::OffsetDateTime;

const TICKETS: &str = "tickets";
const INDEX_NAME_OWNER_ID_CREATED_AT: &str = "index_owner_id_created_at";
const INDEX_NAME_STATUS_PUBLISHED_AT: &str = "index_status_published_at_created_at";

pub struct TicketsRepositoryImpl {
    database: Database,
}

impl TicketsRepositoryImpl {
    pub async fn new(database: Database) -> Result<Self, mongodb::error::Error> {
        let collection_names = database.list_collection_names().await?;
        if !collection_names.iter().any(|name| name == TICKETS) {
            database.create_collection(TICKETS).await?;
            tracing::debug!("created collection {TICKETS}");
        }

        let collection = database.collection(TICKETS);
        let index_names = collection.list_index_names().await?;

        if !index_names.contains(&INDEX_NAME_OWNER_ID_CREATED_AT.to_string()) {
            Self::create_owner_id_created_at_index(&collection).await?;
            tracing::debug!("created index {TICKETS}.{INDEX_NAME_OWNER_ID_CREATED_AT}");
        }
        if !index_names.contains(&INDEX_NAME_STATUS_PUBLISHED_AT.to_string()) {
            Self::create_status_published_at_index(&collection).await?;
            tracing::debug!("created index {TICKETS}.{INDEX_NAME_STATUS_PUBLISHED_AT}");
        }

        Ok(Self { database })
    }

    async fn create_owner_id_created_at_index(
        collection: &Collection<Document>,
    ) -> Result<(), mongodb::error::Error> {
        let index = IndexModel::builder()
            .keys(doc! {
                "owner_id": 1,
                "created_at": -1,
                "_id": -1,
            })
            .options(
                IndexOptions::builder()
                    .name(INDEX_NAME_OWNER_ID_CREATED_AT.to_string())
                    .build(),
            )
            .build();

        collection.create_index(index).await?;

        Ok(())
    }

    async fn create_status_published_at_index(
        collection: &Collection<Document>,
    ) -> Result<(), mongodb::error::Error> {
        let index = IndexModel::builder()
            .keys(doc! {
                "status": 1,
                "published_at": 1,
                "created_at": 1,
            })
            .options(
                IndexOptions::builder()
                    .name(INDEX_NAME_STATUS_PUBLISHED_AT.to_string())
                    .build(),
            )
            .build();

        collection.create_index(index).await?;

        Ok(())
    }

    fn collection(&self) -> Collection<TicketFindEntity> {
        self.database.collection(TICKETS)
    }
}

#[async_trait]
impl TicketsRepository for TicketsRepositoryImpl {
    async fn insert(&self, ticket: NewTicket) -> Result<Ticket, Error> {
        let created_at = DateTime::from(ticket.created_at);
        let insert_entity = TicketInsertEntity {
            owner_id: ticket.owner_id,
            event_id: ticket.event_id,
            quantity: ticket.quantity,
            total_price: ticket.total_price,
            status: TicketStatus::Pending,
            created_at,
            updated_at: created_at,
            published_at: None,
        };

        let insert_result = self
            .database
            .collection::<TicketInsertEntity>(TICKETS)
            .insert_one(&insert_entity)
            .await?;

        let Bson::ObjectId(id) = insert_result.inserted_id else {
            tracing::error!("invalid type of inserted '_id'");
            return Err(Error::Mongo(
                ErrorKind::Custom(Arc::new("invalid type of inserted '_id'")).into(),
            ));
        };

        // returned timestamps match what is stored
        let created_at = OffsetDateTime::from(created_at);

        Ok(Ticket {
            id,
            owner_id: insert_entity.owner_id,
            event_id: insert_entity.event_id,
            quantity: insert_entity.quantity,
            total_price: insert_entity.total_price,
            status: TicketStatus::Pending,
            created_at,
            updated_at: created_at,
            published_at: None,
        })
    }

    async fn find(&self, id: ObjectId) -> Result<Option<Ticket>, Error> {
        let ticket = self
            .collection()
            .find_one(doc! { "_id": id })
            .await?
            .map(Ticket::from);

        Ok(ticket)
    }

    async fn find_many_by_owner(&self, owner_id: &str) -> Result<Vec<Ticket>, Error> {
        let tickets = self
            .collection()
            .find(doc! { "owner_id": owner_id })
            .sort(doc! {
                "created_at": -1,
                "_id": -1,
            })
            .await?
            .map_ok(Ticket::from)
            .try_collect()
            .await?;

        Ok(tickets)
    }

    async fn find_all(&self) -> Result<Vec<Ticket>, Error> {
        let tickets = self
            .collection()
            .find(doc! {})
            .sort(doc! {
                "created_at": -1,
                "_id": -1,
            })
            .await?
            .map_ok(Ticket::from)
            .try_collect()
            .await?;

        Ok(tickets)
    }

    async fn update_status(
        &self,
        id: ObjectId,
        from: TicketStatus,
        to: TicketStatus,
        updated_at: OffsetDateTime,
    ) -> Result<Ticket, Error> {
        if !from.can_transition_to(to) {
            return Err(Error::InvalidTransition { from, to });
        }

        let entity = self
            .collection()
            .find_one_and_update(
                doc! {
                    "_id": id,
                    "status": from.as_ref(),
                },
                doc! {
                    "$set": {
                        "status": to.as_ref(),
                        "updated_at": DateTime::from(updated_at),
                    }
                },
            )
            .return_document(ReturnDocument::After)
            .await?;

        entity.map(Ticket::from).ok_or(Error::NoDocumentUpdated)
    }

    async fn update_published_at(
        &self,
        id: ObjectId,
        published_at: OffsetDateTime,
    ) -> Result<(), Error> {
        let update_result = self
            .database
            .collection::<Document>(TICKETS)
            .update_one(
                doc! {
                    "_id": id,
                },
                doc! {
                    "$set": {
                        "published_at": DateTime::from(published_at),
                    }
                },
            )
            .await?;

        match update_result.matched_count == 1 {
            true => Ok(()),
            false => Err(Error::NoDocumentUpdated),
        }
    }

    async fn find_many_unpublished(
        &self,
        created_before: OffsetDateTime,
        limit: i64,
    ) -> Result<Vec<Ticket>, Error> {
        let tickets = self
            .collection()
            .find(doc! {
                "status": TicketStatus::Pending.as_ref(),
                "published_at": None as Option<DateTime>,
                "created_at": { "$lt": DateTime::from(created_before) },
            })
            .sort(doc! {
                "created_at": 1,
                "_id": 1,
            })
            .limit(limit)
            .await?
            .map_ok(Ticket::from)
            .try_collect()
            .await?;

        Ok(tickets)
    }

    async fn ping(&self) -> Result<(), Error> {
        self.database.run_command(doc! { "ping": 1 }).await?;

        Ok(())
    }
}
