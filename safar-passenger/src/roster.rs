use crate::fields::{validate_phone, FieldError, PassengerField};
use crate::gate::{GateStatus, ValidationGate};
use crate::record::{FieldUpdate, PassengerRecord};
use safar_core::wire::{BuyerPayload, PassengerPayload, SavePassengersPayload};
use safar_core::{Credentials, GatewayError, PassengerDirectory};
use safar_shared::{Masked, SeatId, SelectionEvent};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// How two passengers sharing a national code are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateNationalIdPolicy {
    /// Soft warning only; both passengers stay valid.
    #[default]
    Warn,
    /// Both passengers count as invalid until one code changes.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateNationalId {
    pub national_id: Masked<String>,
    pub seats: Vec<SeatId>,
}

/// Who is paying, as entered on the contact step.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuyerContact {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// The finalised passenger list plus the contact the order should use.
#[derive(Debug, Clone)]
pub struct CommittedRoster {
    pub passengers: Vec<PassengerPayload>,
    pub buyer: BuyerPayload,
    pub contact_phone: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("No passenger bound to seat {0}")]
    UnknownSeat(SeatId),

    #[error("Roster is empty")]
    Empty,

    #[error("Buyer phone is not a valid mobile number")]
    InvalidBuyerPhone,

    #[error("Saving passengers failed: {0}")]
    SaveFailed(#[source] GatewayError),
}

/// One passenger record per selected seat, kept in seat-selection order.
///
/// The roster follows the seat store through [`SelectionEvent`]s; it never
/// touches seat state itself.
#[derive(Debug, Default)]
pub struct PassengerRoster {
    records: Vec<PassengerRecord>,
    policy: DuplicateNationalIdPolicy,
}

impl PassengerRoster {
    pub fn new(policy: DuplicateNationalIdPolicy) -> Self {
        Self { records: Vec::new(), policy }
    }

    pub fn apply(&mut self, event: &SelectionEvent) {
        match event {
            SelectionEvent::SeatSelected { seat, .. } => {
                if self.position(seat.seat_id).is_none() {
                    self.records.push(PassengerRecord::for_seat(seat));
                    debug!("Passenger record created for seat {}", seat.seat_id);
                }
            }
            SelectionEvent::GenderChanged { seat_id, gender } => {
                if let Some(idx) = self.position(*seat_id) {
                    self.records[idx].gender = *gender;
                }
            }
            SelectionEvent::SeatReleased { seat_id } => {
                if let Some(idx) = self.position(*seat_id) {
                    self.records.remove(idx);
                    debug!("Passenger record discarded for seat {}", seat_id);
                    self.refresh_duplicates();
                }
            }
            SelectionEvent::Cleared => self.records.clear(),
            SelectionEvent::CapacityReached { .. } => {}
        }
    }

    /// Drain pending selection events. Returns how many were applied.
    pub fn sync(&mut self, rx: &mut mpsc::UnboundedReceiver<SelectionEvent>) -> usize {
        let mut applied = 0;
        while let Ok(event) = rx.try_recv() {
            self.apply(&event);
            applied += 1;
        }
        applied
    }

    /// Update one field and report whether it is now valid.
    pub fn set_field(&mut self, seat_id: SeatId, update: FieldUpdate) -> Result<bool, RosterError> {
        let idx = self.position(seat_id).ok_or(RosterError::UnknownSeat(seat_id))?;
        let field = update.field();
        let valid = self.records[idx].apply(update).is_ok();
        if field != PassengerField::NationalId {
            return Ok(valid);
        }

        self.refresh_duplicates();
        if valid
            && self.policy == DuplicateNationalIdPolicy::Warn
            && self.duplicated_seats().contains(&seat_id)
        {
            warn!("Seat {} repeats a national code already in the roster", seat_id);
        }
        Ok(self.records[idx].field_error(field).is_none() && valid)
    }

    pub fn record(&self, seat_id: SeatId) -> Option<&PassengerRecord> {
        self.records.iter().find(|r| r.seat_id == seat_id)
    }

    pub fn records(&self) -> &[PassengerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn policy(&self) -> DuplicateNationalIdPolicy {
        self.policy
    }

    /// National codes entered (validly) for more than one seat.
    pub fn duplicate_national_ids(&self) -> Vec<DuplicateNationalId> {
        let mut by_code: BTreeMap<&str, Vec<SeatId>> = BTreeMap::new();
        for record in &self.records {
            let code = record.national_id.expose();
            let well_formed = matches!(
                record.field_error(PassengerField::NationalId),
                None | Some(FieldError::DuplicateNationalId)
            );
            if !code.is_empty() && well_formed {
                by_code.entry(code.as_str()).or_default().push(record.seat_id);
            }
        }

        by_code
            .into_iter()
            .filter(|(_, seats)| seats.len() > 1)
            .map(|(code, seats)| DuplicateNationalId { national_id: Masked(code.to_string()), seats })
            .collect()
    }

    /// Per-record validity in roster order. Under `Reject` a shared national
    /// code is a field error, so it counts here too.
    pub fn record_validity(&self) -> Vec<bool> {
        self.records.iter().map(PassengerRecord::is_complete).collect()
    }

    pub fn validate_all(&self) -> GateStatus {
        ValidationGate::evaluate(self.record_validity())
    }

    /// Build the passenger list and resolve the contact override without persisting.
    pub fn finalize(&self, buyer: &BuyerContact) -> Result<CommittedRoster, RosterError> {
        if self.records.is_empty() {
            return Err(RosterError::Empty);
        }

        let buyer_phone = match buyer.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(phone) => Some(validate_phone(phone).map_err(|_| RosterError::InvalidBuyerPhone)?),
            None => None,
        };

        let passengers: Vec<PassengerPayload> = self.records.iter().map(to_payload).collect();
        let contact_phone = buyer_phone
            .clone()
            .or_else(|| passengers.iter().find_map(|p| p.phone.clone()));

        Ok(CommittedRoster {
            passengers,
            buyer: BuyerPayload {
                name: buyer.name.clone(),
                phone: buyer_phone,
                email: buyer.email.clone(),
            },
            contact_phone,
        })
    }

    /// Finalise and persist the passenger list through the directory.
    pub async fn commit(
        &self,
        directory: &dyn PassengerDirectory,
        credentials: Credentials,
        buyer: &BuyerContact,
    ) -> Result<CommittedRoster, RosterError> {
        let committed = self.finalize(buyer)?;

        let payload = SavePassengersPayload {
            credentials,
            passengers: committed.passengers.clone(),
        };
        directory
            .save_passengers(&payload)
            .await
            .map_err(RosterError::SaveFailed)?;

        info!("Saved {} passengers", committed.passengers.len());
        Ok(committed)
    }

    fn position(&self, seat_id: SeatId) -> Option<usize> {
        self.records.iter().position(|r| r.seat_id == seat_id)
    }

    /// Under `Reject`, keep the duplicate flag on exactly the seats that share a code.
    fn refresh_duplicates(&mut self) {
        if self.policy != DuplicateNationalIdPolicy::Reject {
            return;
        }
        let duplicated = self.duplicated_seats();
        for record in &mut self.records {
            record.mark_duplicate(duplicated.contains(&record.seat_id));
        }
    }

    fn duplicated_seats(&self) -> BTreeSet<SeatId> {
        self.duplicate_national_ids()
            .into_iter()
            .flat_map(|d| d.seats)
            .collect()
    }
}

fn to_payload(record: &PassengerRecord) -> PassengerPayload {
    let phone = record.phone.expose();
    PassengerPayload {
        seat_id: record.seat_id.0,
        seat_no: record.seat_no,
        name: record.name.clone(),
        family: record.family.clone(),
        gender: record.gender.is_male(),
        national_code: record.national_id.expose().clone(),
        birth_date: record.birth_date.clone(),
        phone: (!phone.is_empty() && record.field_error(PassengerField::Phone).is_none())
            .then(|| phone.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use safar_shared::{Gender, SelectedSeat};
    use std::sync::Mutex;

    fn selected(id: u32, gender: Gender) -> SelectionEvent {
        SelectionEvent::SeatSelected {
            seat: SelectedSeat { seat_id: SeatId(id), seat_no: id as u16, gender },
            selected_at: 0,
        }
    }

    fn fill(roster: &mut PassengerRoster, id: u32, code: &str) {
        let seat = SeatId(id);
        roster.set_field(seat, FieldUpdate::Name("سارا".to_string())).unwrap();
        roster.set_field(seat, FieldUpdate::Family("کریمی".to_string())).unwrap();
        roster.set_field(seat, FieldUpdate::NationalId(code.to_string())).unwrap();
    }

    fn credentials() -> Credentials {
        Credentials {
            access_token: Masked("access".to_string()),
            refresh_token: Masked("refresh".to_string()),
        }
    }

    #[test]
    fn test_follows_selection_events() {
        let mut roster = PassengerRoster::default();
        roster.apply(&selected(1, Gender::Male));
        roster.apply(&selected(2, Gender::Male));
        roster.apply(&SelectionEvent::GenderChanged { seat_id: SeatId(2), gender: Gender::Female });
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.record(SeatId(2)).unwrap().gender, Gender::Female);

        roster.apply(&SelectionEvent::SeatReleased { seat_id: SeatId(1) });
        assert!(roster.record(SeatId(1)).is_none());

        roster.apply(&SelectionEvent::Cleared);
        assert!(roster.is_empty());
    }

    #[test]
    fn test_sync_drains_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send(selected(4, Gender::Female)).unwrap();
        tx.send(SelectionEvent::CapacityReached { seat_id: SeatId(9), max: 7 }).unwrap();

        let mut roster = PassengerRoster::default();
        assert_eq!(roster.sync(&mut rx), 2);
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_unknown_seat() {
        let mut roster = PassengerRoster::default();
        let result = roster.set_field(SeatId(5), FieldUpdate::Name("علی".to_string()));
        assert!(matches!(result, Err(RosterError::UnknownSeat(SeatId(5)))));
    }

    #[test]
    fn test_gate_flags() {
        let mut roster = PassengerRoster::default();
        assert_eq!(roster.validate_all(), GateStatus::default());

        roster.apply(&selected(1, Gender::Male));
        roster.apply(&selected(2, Gender::Female));
        fill(&mut roster, 1, "0013542419");

        let status = roster.validate_all();
        assert!(status.is_any_passenger_valid);
        assert!(!status.all_passengers_valid);

        fill(&mut roster, 2, "0499370899");
        assert!(roster.validate_all().all_passengers_valid);

        assert!(!roster.set_field(SeatId(2), FieldUpdate::Phone("0912".to_string())).unwrap());
        assert!(!roster.validate_all().all_passengers_valid);
    }

    #[test]
    fn test_duplicate_national_id_warns_by_default() {
        let mut roster = PassengerRoster::new(DuplicateNationalIdPolicy::Warn);
        roster.apply(&selected(1, Gender::Male));
        roster.apply(&selected(2, Gender::Male));
        fill(&mut roster, 1, "0013542419");
        fill(&mut roster, 2, "0013542419");

        let dups = roster.duplicate_national_ids();
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].seats, vec![SeatId(1), SeatId(2)]);
        assert!(roster.validate_all().all_passengers_valid);
    }

    #[test]
    fn test_duplicate_national_id_rejected_when_configured() {
        let mut roster = PassengerRoster::new(DuplicateNationalIdPolicy::Reject);
        roster.apply(&selected(1, Gender::Male));
        roster.apply(&selected(2, Gender::Male));
        fill(&mut roster, 1, "0013542419");
        fill(&mut roster, 2, "0499370899");

        let valid = roster
            .set_field(SeatId(2), FieldUpdate::NationalId("0013542419".to_string()))
            .unwrap();
        assert!(!valid);
        assert!(!roster.validate_all().is_any_passenger_valid);
    }

    #[test]
    fn test_rejected_duplicates_show_on_every_shared_seat() {
        let mut roster = PassengerRoster::new(DuplicateNationalIdPolicy::Reject);
        for id in 1..=3 {
            roster.apply(&selected(id, Gender::Female));
        }
        fill(&mut roster, 1, "0013542419");
        fill(&mut roster, 2, "0013542419");
        fill(&mut roster, 3, "0499370899");

        for seat in [SeatId(1), SeatId(2)] {
            assert_eq!(
                roster.record(seat).unwrap().field_error(PassengerField::NationalId),
                Some(&FieldError::DuplicateNationalId)
            );
        }
        assert!(!roster.record(SeatId(3)).unwrap().has_errors());
        assert_eq!(roster.record_validity(), vec![false, false, true]);

        // Changing one code clears the flag on both seats.
        assert!(roster
            .set_field(SeatId(2), FieldUpdate::NationalId("0067749828".to_string()))
            .unwrap());
        assert!(!roster.record(SeatId(1)).unwrap().has_errors());
        assert!(roster.validate_all().all_passengers_valid);

        // So does releasing one of the seats.
        fill(&mut roster, 2, "0013542419");
        assert!(roster.record(SeatId(1)).unwrap().has_errors());
        roster.apply(&SelectionEvent::SeatReleased { seat_id: SeatId(2) });
        assert!(!roster.record(SeatId(1)).unwrap().has_errors());
        assert_eq!(roster.record_validity(), vec![true, true]);
    }

    #[test]
    fn test_warn_policy_leaves_error_map_empty() {
        let mut roster = PassengerRoster::new(DuplicateNationalIdPolicy::Warn);
        roster.apply(&selected(1, Gender::Male));
        roster.apply(&selected(2, Gender::Male));
        fill(&mut roster, 1, "0013542419");
        fill(&mut roster, 2, "0013542419");

        assert!(roster.records().iter().all(|r| !r.has_errors()));
    }

    #[test]
    fn test_finalize_contact_override() {
        let mut roster = PassengerRoster::default();
        roster.apply(&selected(1, Gender::Female));
        fill(&mut roster, 1, "0013542419");
        roster.set_field(SeatId(1), FieldUpdate::Phone("09351112233".to_string())).unwrap();

        let committed = roster.finalize(&BuyerContact::default()).unwrap();
        assert_eq!(committed.contact_phone.as_deref(), Some("09351112233"));
        assert!(!committed.passengers[0].gender);

        let buyer = BuyerContact { phone: Some("09120000000".to_string()), ..Default::default() };
        let committed = roster.finalize(&buyer).unwrap();
        assert_eq!(committed.contact_phone.as_deref(), Some("09120000000"));

        let bad = BuyerContact { phone: Some("123".to_string()), ..Default::default() };
        assert!(matches!(roster.finalize(&bad), Err(RosterError::InvalidBuyerPhone)));
        assert!(matches!(PassengerRoster::default().finalize(&buyer), Err(RosterError::Empty)));
    }

    #[derive(Default)]
    struct RecordingDirectory {
        saved: Mutex<Vec<usize>>,
        fail: bool,
    }

    #[async_trait]
    impl PassengerDirectory for RecordingDirectory {
        async fn save_passengers(&self, payload: &SavePassengersPayload) -> Result<(), GatewayError> {
            if self.fail {
                return Err(GatewayError::Network("connection reset".to_string()));
            }
            self.saved.lock().unwrap().push(payload.passengers.len());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_commit_persists() {
        let mut roster = PassengerRoster::default();
        roster.apply(&selected(1, Gender::Male));
        fill(&mut roster, 1, "0013542419");

        let directory = RecordingDirectory::default();
        let committed = roster.commit(&directory, credentials(), &BuyerContact::default()).await.unwrap();
        assert_eq!(committed.passengers.len(), 1);
        assert_eq!(*directory.saved.lock().unwrap(), vec![1]);

        let failing = RecordingDirectory { fail: true, ..Default::default() };
        let err = roster.commit(&failing, credentials(), &BuyerContact::default()).await.unwrap_err();
        assert!(matches!(err, RosterError::SaveFailed(GatewayError::Network(_))));
    }
}
