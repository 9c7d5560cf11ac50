//! Modelo de CancellationCode
//!
//! Código one-shot de auto-cancelación. Registro dedicado de vida corta:
//! exactamente un código pendiente por renter (upsert sobrescribe el
//! anterior), con expiración absoluta y flag de consumo.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// CancellationCode - mapea exactamente a la tabla cancellation_codes
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CancellationCode {
    pub id: Uuid,
    pub renter_id: Uuid,
    pub booking_id: Uuid,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
    pub created_at: DateTime<Utc>,
}

impl CancellationCode {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Un código solo es canjeable si no fue consumido, no expiró y
    /// coincide exactamente con el valor suministrado.
    pub fn matches(&self, supplied: &str, now: DateTime<Utc>) -> bool {
        !self.consumed && !self.is_expired(now) && self.code == supplied
    }

    /// El código queda ligado al booking para el que se solicitó; no es
    /// canjeable contra otro booking del mismo renter.
    pub fn issued_for(&self, booking_id: Uuid) -> bool {
        self.booking_id == booking_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn code(expires_in: Duration, consumed: bool) -> CancellationCode {
        let now = Utc::now();
        CancellationCode {
            id: Uuid::new_v4(),
            renter_id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            code: "482913".to_string(),
            expires_at: now + expires_in,
            consumed,
            created_at: now,
        }
    }

    #[test]
    fn valid_code_within_expiry_matches() {
        let c = code(Duration::minutes(15), false);
        assert!(c.matches("482913", Utc::now()));
    }

    #[test]
    fn wrong_code_does_not_match() {
        let c = code(Duration::minutes(15), false);
        assert!(!c.matches("000000", Utc::now()));
    }

    #[test]
    fn correct_code_after_expiry_fails() {
        // 16 minutos después de emitido un código de 15 minutos
        let c = code(Duration::minutes(15), false);
        let sixteen_minutes_later = c.created_at + Duration::minutes(16);
        assert!(c.is_expired(sixteen_minutes_later));
        assert!(!c.matches("482913", sixteen_minutes_later));
    }

    #[test]
    fn consumed_code_cannot_be_reused() {
        let c = code(Duration::minutes(15), true);
        assert!(!c.matches("482913", Utc::now()));
    }

    #[test]
    fn code_only_redeems_against_its_own_booking() {
        // Un renter con dos bookings pendientes no puede canjear el
        // código pedido para uno contra el otro.
        let c = code(Duration::minutes(15), false);
        assert!(c.issued_for(c.booking_id));
        assert!(!c.issued_for(Uuid::new_v4()));
    }
}
