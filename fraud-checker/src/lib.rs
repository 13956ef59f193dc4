#![warn(clippy::all, clippy::pedantic, clippy::cargo, clippy::nursery)]

use std::{collections::HashMap, sync::Mutex};

use checkout_types::{
    proto::fraud::{
        fraud_checker_server::FraudChecker as FraudCheckerRpc, CheckResponse, ClearOrderRequest,
        ClearOrderResponse, InitOrderRequest, InitOrderResponse, OrderIdRequest,
    },
    FromProto, IntoProto, VectorClock,
};
use tonic::{Request, Response, Status};
use tracing::debug;

/// `amount > FRAUD_THRESHOLD` is flagged as card fraud. See `SPEC_FULL.md` §4.2.
const FRAUD_THRESHOLD: f64 = 1000.0;

const SERVICE_ID: &str = "fraud_detection";

/// The payload captured by `InitOrder`, kept only long enough to evaluate
/// `CheckCardFraud`.
#[derive(Clone, Debug)]
struct OrderRecord {
    #[allow(dead_code)] // kept for parity with the source payload snapshot
    user_id: String,
    amount: f64,
    vector_clock: VectorClock,
}

/// In-memory, per-order fraud state. All operations serialize through a
/// single mutex (see `SPEC_FULL.md` §4.2 on why per-order sharding isn't
/// required here).
#[derive(Default)]
pub struct FraudCheckerService {
    orders: Mutex<HashMap<String, OrderRecord>>,
}

impl FraudCheckerService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[tonic::async_trait]
impl FraudCheckerRpc for FraudCheckerService {
    async fn init_order(
        &self,
        request: Request<InitOrderRequest>,
    ) -> Result<Response<InitOrderResponse>, Status> {
        let request = request.into_inner();
        let vector_clock = VectorClock::init(SERVICE_ID);
        let mut orders = self.orders.lock().unwrap();
        orders.insert(
            request.order_id.clone(),
            OrderRecord {
                user_id: request.user_id,
                amount: request.amount,
                vector_clock: vector_clock.clone(),
            },
        );
        debug!(order_id = %request.order_id, ?vector_clock, "InitOrder");
        Ok(Response::new(InitOrderResponse {
            success: true,
            message: "Order initialized".into(),
            vector_clock: Some(vector_clock.into_proto()),
        }))
    }

    async fn check_user_fraud(
        &self,
        request: Request<OrderIdRequest>,
    ) -> Result<Response<CheckResponse>, Status> {
        let order_id = request.into_inner().order_id;
        let mut orders = self.orders.lock().unwrap();
        let Some(order) = orders.get_mut(&order_id) else {
            return Ok(Response::new(CheckResponse {
                is_success: false,
                message: "Order not found".into(),
                vector_clock: None,
            }));
        };
        order.vector_clock.increment(SERVICE_ID);
        debug!(%order_id, vector_clock = ?order.vector_clock, "CheckUserFraud");
        Ok(Response::new(CheckResponse {
            is_success: true,
            message: "User data not fraudulent".into(),
            vector_clock: Some(order.vector_clock.clone().into_proto()),
        }))
    }

    async fn check_card_fraud(
        &self,
        request: Request<OrderIdRequest>,
    ) -> Result<Response<CheckResponse>, Status> {
        let order_id = request.into_inner().order_id;
        let mut orders = self.orders.lock().unwrap();
        let Some(order) = orders.get_mut(&order_id) else {
            return Ok(Response::new(CheckResponse {
                is_success: false,
                message: "Order not found".into(),
                vector_clock: None,
            }));
        };
        order.vector_clock.increment(SERVICE_ID);
        let is_fraud = order.amount > FRAUD_THRESHOLD;
        debug!(%order_id, vector_clock = ?order.vector_clock, is_fraud, "CheckCardFraud");
        Ok(Response::new(CheckResponse {
            is_success: !is_fraud,
            message: if is_fraud {
                "Fraudulent card".into()
            } else {
                "Card data clean".into()
            },
            vector_clock: Some(order.vector_clock.clone().into_proto()),
        }))
    }

    async fn clear_order(
        &self,
        request: Request<ClearOrderRequest>,
    ) -> Result<Response<ClearOrderResponse>, Status> {
        let request = request.into_inner();
        let final_vc = VectorClock::from_proto(request.final_vector_clock);
        let mut orders = self.orders.lock().unwrap();
        let local_vc = orders
            .get(&request.order_id)
            .map(|order| order.vector_clock.clone())
            .unwrap_or_default();

        if local_vc.is_dominated_by(&final_vc) {
            orders.remove(&request.order_id);
            debug!(order_id = %request.order_id, "ClearOrder succeeded");
            Ok(Response::new(ClearOrderResponse {
                cleared: true,
                status: "Cleared".into(),
            }))
        } else {
            debug!(order_id = %request.order_id, ?local_vc, ?final_vc, "ClearOrder rejected");
            Ok(Response::new(ClearOrderResponse {
                cleared: false,
                status: "VC mismatch - not cleared".into(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    async fn init(service: &FraudCheckerService, order_id: &str, amount: f64) {
        service
            .init_order(Request::new(InitOrderRequest {
                order_id: order_id.into(),
                user_id: "user-1".into(),
                amount,
            }))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn check_user_fraud_without_init_fails() {
        let service = FraudCheckerService::new();
        let resp = service
            .check_user_fraud(Request::new(OrderIdRequest {
                order_id: "missing".into(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(!resp.is_success);
    }

    #[tokio::test]
    async fn check_user_fraud_after_init_succeeds_and_bumps_vc() {
        let service = FraudCheckerService::new();
        init(&service, "order-1", 10.0).await;
        let resp = service
            .check_user_fraud(Request::new(OrderIdRequest {
                order_id: "order-1".into(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(resp.is_success);
        let vc = resp.vector_clock.unwrap();
        assert_eq!(vc.entries.get(SERVICE_ID), Some(&2));
    }

    #[tokio::test]
    async fn check_card_fraud_flags_amount_over_threshold() {
        let service = FraudCheckerService::new();
        init(&service, "order-1", 1500.0).await;
        let resp = service
            .check_card_fraud(Request::new(OrderIdRequest {
                order_id: "order-1".into(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(!resp.is_success);
        assert_eq!(resp.message, "Fraudulent card");
    }

    #[tokio::test]
    async fn check_card_fraud_allows_amount_at_or_under_threshold() {
        let service = FraudCheckerService::new();
        init(&service, "order-1", 1000.0).await;
        let resp = service
            .check_card_fraud(Request::new(OrderIdRequest {
                order_id: "order-1".into(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(resp.is_success);
    }

    #[tokio::test]
    async fn clear_order_succeeds_when_final_vc_dominates() {
        let service = FraudCheckerService::new();
        init(&service, "order-1", 10.0).await;
        service
            .check_user_fraud(Request::new(OrderIdRequest {
                order_id: "order-1".into(),
            }))
            .await
            .unwrap();
        let mut final_vc = std::collections::HashMap::new();
        final_vc.insert(SERVICE_ID.to_owned(), 99u64);
        let resp = service
            .clear_order(Request::new(ClearOrderRequest {
                order_id: "order-1".into(),
                final_vector_clock: Some(checkout_types::proto::common::VectorClock {
                    entries: final_vc,
                }),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(resp.cleared);

        // A second clear finds no record and is dominated trivially (an empty
        // clock is dominated by anything), matching the source's "already
        // cleared" behavior rather than erroring.
        let resp2 = service
            .clear_order(Request::new(ClearOrderRequest {
                order_id: "order-1".into(),
                final_vector_clock: None,
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(resp2.cleared);
    }

    #[tokio::test]
    async fn clear_order_rejects_when_final_vc_is_behind() {
        let service = FraudCheckerService::new();
        init(&service, "order-1", 10.0).await;
        service
            .check_user_fraud(Request::new(OrderIdRequest {
                order_id: "order-1".into(),
            }))
            .await
            .unwrap();
        let resp = service
            .clear_order(Request::new(ClearOrderRequest {
                order_id: "order-1".into(),
                final_vector_clock: None,
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(!resp.cleared);
        assert_eq!(resp.status, "VC mismatch - not cleared");
    }
}
