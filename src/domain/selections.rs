//! SelectionSet manager: enforces the 0..=5 tour selection invariant for
//! incremental and bulk mutation.
//!
//! Every mutation runs under the fan's lock, re-reads the persisted set,
//! and writes the fan row plus the full selection set in one transaction,
//! so the maintained `selections_count`/`can_select_more_tours` pair never
//! drifts from the actual set.

use uuid::Uuid;

use crate::models::TourSelection;

use super::error::{FlowError, FlowResult};
use super::profile::{apply_patch, ProfilePatch};
use super::Journey;

impl Journey {
    /// Select one tour. Duplicates are rejected before the cap so a retried
    /// select is always reported as `DuplicateSelection`, even at capacity.
    pub async fn select_tour(&self, fan_id: Uuid, tour_id: Uuid) -> FlowResult<TourSelection> {
        let lock = self.fan_lock(fan_id).await;
        let _guard = lock.lock().await;

        let mut fan = self.load_fan(fan_id).await?;
        self.ensure_selections_mutable(fan_id).await?;

        let mut selections = self.store().selections_for_fan(fan_id).await?;
        if selections.iter().any(|s| s.tour_id == tour_id) {
            return Err(FlowError::DuplicateSelection { tour_id });
        }
        if fan.selections_count >= self.max_tours_per_fan() {
            return Err(FlowError::CapacityExceeded {
                current: fan.selections_count,
                max: self.max_tours_per_fan(),
            });
        }
        self.ensure_tour_available(tour_id).await?;

        let selection = TourSelection::new(fan_id, tour_id);
        selections.push(selection.clone());
        apply_patch(
            &mut fan,
            ProfilePatch::Selections {
                count: selections.len() as i32,
            },
            self.max_tours_per_fan(),
        )?;
        self.store().write_selection_state(&fan, &selections).await?;
        Ok(selection)
    }

    /// Remove one selection. Frozen once consent is complete.
    pub async fn deselect_tour(&self, fan_id: Uuid, selection_id: Uuid) -> FlowResult<()> {
        let lock = self.fan_lock(fan_id).await;
        let _guard = lock.lock().await;

        let mut fan = self.load_fan(fan_id).await?;
        self.ensure_selections_mutable(fan_id).await?;

        let mut selections = self.store().selections_for_fan(fan_id).await?;
        let position = selections
            .iter()
            .position(|s| s.id == selection_id)
            .ok_or(FlowError::NotFound("selection"))?;
        selections.remove(position);
        apply_patch(
            &mut fan,
            ProfilePatch::Selections {
                count: selections.len() as i32,
            },
            self.max_tours_per_fan(),
        )?;
        self.store().write_selection_state(&fan, &selections).await?;
        Ok(())
    }

    /// Atomic replace-all used by the "submit selections" step. Input is
    /// de-duplicated; the whole operation applies or none of it does.
    pub async fn replace_selections(
        &self,
        fan_id: Uuid,
        tour_ids: Vec<Uuid>,
    ) -> FlowResult<Vec<TourSelection>> {
        let lock = self.fan_lock(fan_id).await;
        let _guard = lock.lock().await;

        let mut fan = self.load_fan(fan_id).await?;
        self.ensure_selections_mutable(fan_id).await?;

        let mut distinct: Vec<Uuid> = Vec::with_capacity(tour_ids.len());
        for tour_id in tour_ids {
            if !distinct.contains(&tour_id) {
                distinct.push(tour_id);
            }
        }
        if distinct.len() as i32 > self.max_tours_per_fan() {
            return Err(FlowError::CapacityExceeded {
                current: distinct.len() as i32,
                max: self.max_tours_per_fan(),
            });
        }
        // Validate the full set before touching anything, naming the
        // specific tour that failed.
        for tour_id in &distinct {
            self.ensure_tour_available(*tour_id).await?;
        }

        let selections: Vec<TourSelection> = distinct
            .into_iter()
            .map(|tour_id| TourSelection::new(fan_id, tour_id))
            .collect();
        apply_patch(
            &mut fan,
            ProfilePatch::Selections {
                count: selections.len() as i32,
            },
            self.max_tours_per_fan(),
        )?;
        self.store().write_selection_state(&fan, &selections).await?;
        Ok(selections)
    }

    pub async fn selections(&self, fan_id: Uuid) -> FlowResult<Vec<TourSelection>> {
        self.load_fan(fan_id).await?;
        Ok(self.store().selections_for_fan(fan_id).await?)
    }

    /// Selections are frozen once consent (and therefore ticket
    /// eligibility) is finalized.
    async fn ensure_selections_mutable(&self, fan_id: Uuid) -> FlowResult<()> {
        match self.store().consent_for_fan(fan_id).await? {
            Some(consent) if consent.is_complete => Err(FlowError::ImmutableAfterConsent),
            _ => Ok(()),
        }
    }

    async fn ensure_tour_available(&self, tour_id: Uuid) -> FlowResult<()> {
        let availability = self
            .catalog
            .availability(tour_id)
            .await?
            .ok_or(FlowError::NotFound("tour"))?;
        if !availability.is_active {
            return Err(FlowError::TourUnavailable {
                tour_id,
                reason: "tour is no longer active".to_string(),
            });
        }
        if availability.tickets_remaining <= 0 {
            return Err(FlowError::TourUnavailable {
                tour_id,
                reason: "no tickets remaining".to_string(),
            });
        }
        Ok(())
    }
}
