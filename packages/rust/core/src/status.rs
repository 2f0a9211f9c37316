//! ERP → CRM status normalization.

use orderbridge_shared::{OrderStatus, RawOrder};

/// Map an ERP status label onto the CRM vocabulary.
///
/// `finished`, `in progress` and `canceled` have fixed counterparts;
/// every other label, including `other` and the empty string, becomes
/// [`OrderStatus::Outro`]. Matching is exact and case-sensitive.
pub fn normalize_status(raw: &str) -> OrderStatus {
    match raw {
        "finished" => OrderStatus::Concluido,
        "in progress" => OrderStatus::Aberto,
        "canceled" => OrderStatus::Cancelado,
        _ => OrderStatus::Outro,
    }
}

/// Normalize the status of every order in a batch, preserving order.
pub fn normalize_statuses(orders: &[RawOrder]) -> Vec<OrderStatus> {
    orders.iter().map(|o| normalize_status(o.status())).collect()
}
