//! Per-order transformation: status, discount, and final value.

use orderbridge_shared::{OrderStatus, PipelineError, RawOrder, Result, TransformedOrder};
use serde_json::Value;

use crate::discount::{self, parse_discount, round_cents};
use crate::status::{normalize_status, normalize_statuses};

/// Transform one raw order with an already normalized status.
///
/// `valor` and `frete` are parsed for the arithmetic only; the output keeps
/// their raw JSON values.
fn transform_with_status(raw: &RawOrder, status: OrderStatus) -> Result<TransformedOrder> {
    let valor = parse_amount("valor", raw.valor())?;
    let frete = parse_amount("frete", raw.frete())?;
    let desconto = parse_discount(raw.desconto())?.map(|d| d.resolve(valor));
    let valor_final = round_cents(valor - desconto.unwrap_or(0.0) + frete);

    Ok(TransformedOrder::new(raw, status, desconto, valor_final))
}

/// Transform a single raw order.
pub fn transform_order(raw: &RawOrder) -> Result<TransformedOrder> {
    transform_with_status(raw, normalize_status(raw.status()))
}

/// Transform a whole batch, preserving length and order.
///
/// Fails on the first malformed order; no partial batch is returned.
pub fn transform_batch(orders: &[RawOrder]) -> Result<Vec<TransformedOrder>> {
    let statuses = normalize_statuses(orders);

    orders
        .iter()
        .zip(statuses)
        .enumerate()
        .map(|(i, (raw, status))| {
            transform_with_status(raw, status).map_err(|e| match e {
                PipelineError::Parse { message } => {
                    PipelineError::parse(format!("order #{i}: {message}"))
                }
                other => other,
            })
        })
        .collect()
}

/// Read a monetary field that may be a JSON number or numeric text.
fn parse_amount(field: &str, raw: &Value) -> Result<f64> {
    match raw {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| PipelineError::parse(format!("invalid {field} {n}"))),
        Value::String(s) => discount::parse_number(s, s)
            .map_err(|_| PipelineError::parse(format!("invalid {field} '{s}'"))),
        other => Err(PipelineError::parse(format!(
            "{field} must be a number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawOrder {
        serde_json::from_value(value).expect("raw order")
    }

    fn expected_final(raw: &RawOrder, order: &TransformedOrder) -> f64 {
        let valor = parse_amount("valor", raw.valor()).unwrap();
        let frete = parse_amount("frete", raw.frete()).unwrap();
        round_cents(valor - order.desconto() + frete)
    }

    #[test]
    fn percentage_discount_order() {
        let order = transform_order(&raw(json!({
            "status": "finished", "desconto": "10%", "valor": 100, "frete": 10
        })))
        .unwrap();

        assert_eq!(order.status(), OrderStatus::Concluido);
        assert_eq!(order.desconto(), 10.0);
        assert_eq!(order.valor_final(), 100.0);
    }

    #[test]
    fn currency_discount_order() {
        let order = transform_order(&raw(json!({
            "status": "canceled", "desconto": "R$15,00", "valor": 50, "frete": 5
        })))
        .unwrap();

        assert_eq!(order.status(), OrderStatus::Cancelado);
        assert_eq!(order.desconto(), 15.0);
        assert_eq!(order.valor_final(), 40.0);
    }

    #[test]
    fn missing_discount_keeps_full_value() {
        let order = transform_order(&raw(json!({
            "status": "in progress", "valor": "19.90", "frete": "0.10"
        })))
        .unwrap();

        assert_eq!(order.status(), OrderStatus::Aberto);
        assert_eq!(order.desconto(), 0.0);
        assert_eq!(order.valor_final(), 20.0);
    }

    #[test]
    fn amounts_keep_their_raw_form() {
        let order = transform_order(&raw(json!({
            "order_id": 1, "status": "returned", "valor": "42.30", "frete": 5
        })))
        .unwrap();

        assert_eq!(
            serde_json::to_string(&order).unwrap(),
            r#"{"order_id":1,"status":"outro","valor":"42.30","frete":5,"desconto":0,"valor_final":47.3}"#
        );
    }

    #[test]
    fn status_and_discount_stay_in_source_position() {
        let order = transform_order(&raw(json!({
            "status": "finished",
            "desconto": "10%",
            "order_id": 9,
            "valor": 100.0,
            "frete": 10.0,
            "cliente": "Ana"
        })))
        .unwrap();

        let keys: Vec<&str> = order.fields().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["status", "desconto", "order_id", "valor", "frete", "cliente", "valor_final"]
        );
    }

    #[test]
    fn passthrough_fields_survive() {
        let order = transform_order(&raw(json!({
            "order_id": 42,
            "cliente": {"nome": "Ana"},
            "status": "other",
            "desconto": 5,
            "valor": 30.5,
            "frete": 2
        })))
        .unwrap();

        assert_eq!(order.get("order_id"), Some(&json!(42)));
        assert_eq!(order.get("cliente").unwrap()["nome"], json!("Ana"));

        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["status"], "outro");
        assert_eq!(value["desconto"], json!(5.0));
        assert_eq!(value["valor_final"], json!(27.5));
        assert_eq!(value["order_id"], json!(42));
    }

    #[test]
    fn final_value_is_rounded() {
        let input = raw(json!({
            "status": "finished", "desconto": "R$0,333", "valor": 10.111, "frete": 0.005
        }));
        let order = transform_order(&input).unwrap();
        assert_eq!(order.valor_final(), expected_final(&input, &order));
        assert_eq!(order.valor_final(), 9.78);
    }

    #[test]
    fn batch_preserves_order_and_length() {
        let batch: Vec<RawOrder> = (0..5)
            .map(|i| {
                raw(json!({
                    "order_id": i, "status": "finished", "desconto": "10%",
                    "valor": 100 + i, "frete": 0
                }))
            })
            .collect();

        let out = transform_batch(&batch).unwrap();
        assert_eq!(out.len(), 5);
        for (i, order) in out.iter().enumerate() {
            assert_eq!(order.get("order_id"), Some(&json!(i)));
        }
    }

    #[test]
    fn batch_fails_on_any_bad_order() {
        let batch = vec![
            raw(json!({"status": "finished", "desconto": "10%", "valor": 100, "frete": 10})),
            raw(json!({"status": "finished", "desconto": "dez%", "valor": 100, "frete": 10})),
        ];

        let err = transform_batch(&batch).unwrap_err();
        assert!(matches!(err, PipelineError::Parse { .. }));
        assert!(err.to_string().contains("order #1"));
    }

    #[test]
    fn non_numeric_amount_is_parse_error() {
        let err = transform_order(&raw(json!({
            "status": "finished", "valor": "cem", "frete": 10
        })))
        .unwrap_err();
        assert!(err.to_string().contains("valor"));

        let err = transform_order(&raw(json!({
            "status": "finished", "valor": 1, "frete": null
        })))
        .unwrap_err();
        assert!(err.to_string().contains("frete"));
    }

    #[test]
    fn fixture_batch_transforms() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/erp_data.fixture.json")
            .expect("read fixture");
        let batch: Vec<RawOrder> = serde_json::from_str(&fixture).expect("parse fixture");
        let out = transform_batch(&batch).expect("transform fixture");

        assert_eq!(out.len(), batch.len());
        for (input, order) in batch.iter().zip(&out) {
            assert_eq!(order.valor_final(), expected_final(input, order));
            assert_eq!(order.get("valor"), Some(input.valor()));
            assert_eq!(order.get("frete"), Some(input.frete()));
        }
    }
}
