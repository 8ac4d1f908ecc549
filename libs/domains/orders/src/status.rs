//! Transaction status progression rules.

use crate::error::{OrderError, OrderResult};

/// Seeded status rows; the ids are fixed by the reference data migration
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum TransactionStatus {
    #[strum(serialize = "On Progress")]
    OnProgress = 1,
    #[strum(serialize = "Sending Goods")]
    SendingGoods = 2,
    #[strum(serialize = "Finish Order")]
    FinishOrder = 3,
}

impl TransactionStatus {
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Self::OnProgress),
            2 => Some(Self::SendingGoods),
            3 => Some(Self::FinishOrder),
            _ => None,
        }
    }

    pub fn id(self) -> i32 {
        self as i32
    }
}

/// Seeded order method rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum OrderMethodKind {
    #[strum(serialize = "Dine-In")]
    DineIn = 1,
    #[strum(serialize = "Door Delivery")]
    DoorDelivery = 2,
    #[strum(serialize = "Pick-Up")]
    PickUp = 3,
}

impl OrderMethodKind {
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Self::DineIn),
            2 => Some(Self::DoorDelivery),
            3 => Some(Self::PickUp),
            _ => None,
        }
    }
}

/// Rejects status targets that make no sense for the order method: goods are
/// never sent for Dine-In or Pick-Up orders.
pub fn validate_transition(order_method_id: i32, new_status_id: i32) -> OrderResult<()> {
    let status = TransactionStatus::from_id(new_status_id)
        .ok_or(OrderError::StatusNotFound(new_status_id))?;

    if status == TransactionStatus::SendingGoods {
        if let Some(method @ (OrderMethodKind::DineIn | OrderMethodKind::PickUp)) =
            OrderMethodKind::from_id(order_method_id)
        {
            return Err(OrderError::InvalidTransition(format!(
                "Status '{}' is not allowed for '{}' orders",
                status, method
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sending_goods_forbidden_for_dine_in() {
        let err = validate_transition(1, 2).unwrap_err();
        assert!(matches!(err, OrderError::InvalidTransition(_)));
        assert_eq!(
            err.to_string(),
            "Status 'Sending Goods' is not allowed for 'Dine-In' orders"
        );
    }

    #[test]
    fn test_sending_goods_forbidden_for_pick_up() {
        let err = validate_transition(3, 2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Status 'Sending Goods' is not allowed for 'Pick-Up' orders"
        );
    }

    #[test]
    fn test_sending_goods_allowed_for_door_delivery() {
        assert!(validate_transition(2, 2).is_ok());
    }

    #[test]
    fn test_other_targets_always_allowed() {
        assert!(validate_transition(1, 1).is_ok());
        assert!(validate_transition(1, 3).is_ok());
        assert!(validate_transition(3, 3).is_ok());
    }

    #[test]
    fn test_unknown_status_rejected() {
        let err = validate_transition(1, 9).unwrap_err();
        assert!(matches!(err, OrderError::StatusNotFound(9)));
    }
}
