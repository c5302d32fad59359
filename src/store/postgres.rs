//! PostgreSQL-backed store. Runtime-checked queries; schema lives in
//! `migrations/` and is applied at startup.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{ConsentRecord, Fan, Ticket, Tour, TourSelection};

use super::{FanStore, StoreCounts, StoreResult};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const INSERT_FAN: &str = "INSERT INTO fans \
    (id, registration_code, name, email, phone, is_verified, has_completed_consent, \
     selections_count, can_select_more_tours, registered_at, updated_at) \
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)";

const UPDATE_FAN: &str = "UPDATE fans SET \
    name = $2, email = $3, phone = $4, is_verified = $5, has_completed_consent = $6, \
    selections_count = $7, can_select_more_tours = $8, updated_at = $9 \
    WHERE id = $1";

const INSERT_SELECTION: &str = "INSERT INTO selections \
    (id, fan_id, tour_id, has_ticket, ticket_id, selected_at) \
    VALUES ($1, $2, $3, $4, $5, $6)";

const INSERT_TOUR: &str = "INSERT INTO tours \
    (id, title, date, city, venue, artists, ticket_limit, tickets_claimed, is_active, \
     description, image_url, created_at, updated_at) \
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)";

const UPDATE_TOUR: &str = "UPDATE tours SET \
    title = $2, date = $3, city = $4, venue = $5, artists = $6, ticket_limit = $7, \
    tickets_claimed = $8, is_active = $9, description = $10, image_url = $11, updated_at = $12 \
    WHERE id = $1";

const INSERT_CONSENT: &str = "INSERT INTO consents \
    (id, fan_id, agreed_to_terms, agreed_to_privacy, agreed_to_marketing, age_verified, \
     date_of_birth, confirmed_name, confirmed_email, confirmed_phone, signature_name, \
     photo_id_uploaded, photo_id_path, is_complete, signed_at, created_at) \
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)";

fn bind_fan_update<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    fan: &'q Fan,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    query
        .bind(fan.id)
        .bind(&fan.name)
        .bind(&fan.email)
        .bind(&fan.phone)
        .bind(fan.is_verified)
        .bind(fan.has_completed_consent)
        .bind(fan.selections_count)
        .bind(fan.can_select_more_tours)
        .bind(fan.updated_at)
}

#[async_trait]
impl FanStore for PgStore {
    async fn insert_fan(&self, fan: &Fan) -> StoreResult<()> {
        sqlx::query(INSERT_FAN)
            .bind(fan.id)
            .bind(&fan.registration_code)
            .bind(&fan.name)
            .bind(&fan.email)
            .bind(&fan.phone)
            .bind(fan.is_verified)
            .bind(fan.has_completed_consent)
            .bind(fan.selections_count)
            .bind(fan.can_select_more_tours)
            .bind(fan.registered_at)
            .bind(fan.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_fan(&self, fan: &Fan) -> StoreResult<()> {
        bind_fan_update(sqlx::query(UPDATE_FAN), fan)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn fan_by_id(&self, id: Uuid) -> StoreResult<Option<Fan>> {
        let fan = sqlx::query_as::<_, Fan>("SELECT * FROM fans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(fan)
    }

    async fn fan_by_email(&self, email: &str) -> StoreResult<Option<Fan>> {
        let fan = sqlx::query_as::<_, Fan>("SELECT * FROM fans WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(fan)
    }

    async fn fan_by_code(&self, code: &str) -> StoreResult<Option<Fan>> {
        let fan = sqlx::query_as::<_, Fan>("SELECT * FROM fans WHERE registration_code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(fan)
    }

    async fn write_selection_state(
        &self,
        fan: &Fan,
        selections: &[TourSelection],
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        bind_fan_update(sqlx::query(UPDATE_FAN), fan)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM selections WHERE fan_id = $1")
            .bind(fan.id)
            .execute(&mut *tx)
            .await?;
        for selection in selections {
            sqlx::query(INSERT_SELECTION)
                .bind(selection.id)
                .bind(selection.fan_id)
                .bind(selection.tour_id)
                .bind(selection.has_ticket)
                .bind(&selection.ticket_id)
                .bind(selection.selected_at)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn selections_for_fan(&self, fan_id: Uuid) -> StoreResult<Vec<TourSelection>> {
        let selections = sqlx::query_as::<_, TourSelection>(
            "SELECT * FROM selections WHERE fan_id = $1 ORDER BY selected_at",
        )
        .bind(fan_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(selections)
    }

    async fn selection_by_id(&self, id: Uuid) -> StoreResult<Option<TourSelection>> {
        let selection = sqlx::query_as::<_, TourSelection>("SELECT * FROM selections WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(selection)
    }

    async fn write_consent(&self, fan: &Fan, consent: &ConsentRecord) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        bind_fan_update(sqlx::query(UPDATE_FAN), fan)
            .execute(&mut *tx)
            .await?;
        sqlx::query(INSERT_CONSENT)
            .bind(consent.id)
            .bind(consent.fan_id)
            .bind(consent.agreed_to_terms)
            .bind(consent.agreed_to_privacy)
            .bind(consent.agreed_to_marketing)
            .bind(consent.age_verified)
            .bind(consent.date_of_birth)
            .bind(&consent.confirmed_name)
            .bind(&consent.confirmed_email)
            .bind(&consent.confirmed_phone)
            .bind(&consent.signature_name)
            .bind(consent.photo_id_uploaded)
            .bind(&consent.photo_id_path)
            .bind(consent.is_complete)
            .bind(consent.signed_at)
            .bind(consent.created_at)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update_consent(&self, consent: &ConsentRecord) -> StoreResult<()> {
        sqlx::query(
            "UPDATE consents SET photo_id_uploaded = $2, photo_id_path = $3 WHERE fan_id = $1",
        )
        .bind(consent.fan_id)
        .bind(consent.photo_id_uploaded)
        .bind(&consent.photo_id_path)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn consent_for_fan(&self, fan_id: Uuid) -> StoreResult<Option<ConsentRecord>> {
        let consent = sqlx::query_as::<_, ConsentRecord>("SELECT * FROM consents WHERE fan_id = $1")
            .bind(fan_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(consent)
    }

    async fn write_issuance(
        &self,
        selection: &TourSelection,
        ticket: &Ticket,
        tour: Option<&Tour>,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        // Replacing the row is what invalidates a superseded download ref.
        sqlx::query("DELETE FROM tickets WHERE selection_id = $1")
            .bind(selection.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "INSERT INTO tickets (ticket_id, selection_id, download_ref, generated_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&ticket.ticket_id)
        .bind(ticket.selection_id)
        .bind(&ticket.download_ref)
        .bind(ticket.generated_at)
        .execute(&mut *tx)
        .await?;
        sqlx::query("UPDATE selections SET has_ticket = $2, ticket_id = $3 WHERE id = $1")
            .bind(selection.id)
            .bind(selection.has_ticket)
            .bind(&selection.ticket_id)
            .execute(&mut *tx)
            .await?;
        if let Some(tour) = tour {
            sqlx::query("UPDATE tours SET tickets_claimed = $2, updated_at = $3 WHERE id = $1")
                .bind(tour.id)
                .bind(tour.tickets_claimed)
                .bind(tour.updated_at)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn tickets_for_selections(&self, selection_ids: &[Uuid]) -> StoreResult<Vec<Ticket>> {
        let tickets = sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets WHERE selection_id = ANY($1) ORDER BY generated_at",
        )
        .bind(selection_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(tickets)
    }

    async fn ticket_by_id(&self, ticket_id: &str) -> StoreResult<Option<Ticket>> {
        let ticket = sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE ticket_id = $1")
            .bind(ticket_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ticket)
    }

    async fn insert_tour(&self, tour: &Tour) -> StoreResult<()> {
        sqlx::query(INSERT_TOUR)
            .bind(tour.id)
            .bind(&tour.title)
            .bind(tour.date)
            .bind(&tour.city)
            .bind(&tour.venue)
            .bind(&tour.artists)
            .bind(tour.ticket_limit)
            .bind(tour.tickets_claimed)
            .bind(tour.is_active)
            .bind(&tour.description)
            .bind(&tour.image_url)
            .bind(tour.created_at)
            .bind(tour.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_tour(&self, tour: &Tour) -> StoreResult<()> {
        sqlx::query(UPDATE_TOUR)
            .bind(tour.id)
            .bind(&tour.title)
            .bind(tour.date)
            .bind(&tour.city)
            .bind(&tour.venue)
            .bind(&tour.artists)
            .bind(tour.ticket_limit)
            .bind(tour.tickets_claimed)
            .bind(tour.is_active)
            .bind(&tour.description)
            .bind(&tour.image_url)
            .bind(tour.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn tour_by_id(&self, id: Uuid) -> StoreResult<Option<Tour>> {
        let tour = sqlx::query_as::<_, Tour>("SELECT * FROM tours WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tour)
    }

    async fn list_tours(&self, active_only: bool) -> StoreResult<Vec<Tour>> {
        let query = if active_only {
            "SELECT * FROM tours WHERE is_active ORDER BY date"
        } else {
            "SELECT * FROM tours ORDER BY date"
        };
        let tours = sqlx::query_as::<_, Tour>(query).fetch_all(&self.pool).await?;
        Ok(tours)
    }

    async fn counts(&self) -> StoreResult<StoreCounts> {
        let (total_fans,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM fans")
            .fetch_one(&self.pool)
            .await?;
        let (total_tours,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tours")
            .fetch_one(&self.pool)
            .await?;
        let (active_tours,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tours WHERE is_active")
            .fetch_one(&self.pool)
            .await?;
        let (total_selections,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM selections")
            .fetch_one(&self.pool)
            .await?;
        Ok(StoreCounts {
            total_fans,
            total_tours,
            active_tours,
            total_selections,
        })
    }
}
