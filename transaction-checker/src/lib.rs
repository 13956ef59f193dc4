#![warn(clippy::all, clippy::pedantic, clippy::cargo, clippy::nursery)]

use std::{collections::HashMap, sync::Mutex};

use checkout_types::{
    proto::transaction::{
        transaction_checker_server::TransactionChecker as TransactionCheckerRpc, CheckResponse,
        ClearOrderRequest, ClearOrderResponse, CreditCard, InitOrderRequest, InitOrderResponse,
        Item, OrderIdRequest, UserData,
    },
    FromProto, IntoProto, VectorClock,
};
use tonic::{Request, Response, Status};
use tracing::debug;

const SERVICE_ID: &str = "transaction_verification";

#[derive(Clone, Debug)]
struct OrderRecord {
    user_data: UserData,
    books: Vec<Item>,
    credit_card: CreditCard,
    vector_clock: VectorClock,
}

/// In-memory, per-order transaction-validation state. All operations
/// serialize through a single mutex (see `SPEC_FULL.md` §4.3).
#[derive(Default)]
pub struct TransactionCheckerService {
    orders: Mutex<HashMap<String, OrderRecord>>,
}

impl TransactionCheckerService {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Runs `step` against the order's record if present, incrementing the
/// vector clock first regardless of the check's outcome (matches the
/// source: VC advances on every call, success or failure).
fn run_check(
    orders: &Mutex<HashMap<String, OrderRecord>>,
    order_id: &str,
    step: impl FnOnce(&OrderRecord) -> (bool, String),
) -> CheckResponse {
    let mut orders = orders.lock().unwrap();
    let Some(order) = orders.get_mut(order_id) else {
        return CheckResponse {
            is_success: false,
            message: "Order not found".into(),
            vector_clock: None,
        };
    };
    order.vector_clock.increment(SERVICE_ID);
    let (is_success, message) = step(order);
    debug!(%order_id, vector_clock = ?order.vector_clock, is_success, "check");
    CheckResponse {
        is_success,
        message,
        vector_clock: Some(order.vector_clock.clone().into_proto()),
    }
}

#[tonic::async_trait]
impl TransactionCheckerRpc for TransactionCheckerService {
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
                user_data: request.user_data.unwrap_or_default(),
                books: request.books,
                credit_card: request.credit_card.unwrap_or_default(),
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

    async fn check_books(
        &self,
        request: Request<OrderIdRequest>,
    ) -> Result<Response<CheckResponse>, Status> {
        let order_id = request.into_inner().order_id;
        let response = run_check(&self.orders, &order_id, |order| {
            if order.books.is_empty() {
                (false, "Book list is empty".into())
            } else {
                (true, "Books are valid".into())
            }
        });
        Ok(Response::new(response))
    }

    async fn check_user_fields(
        &self,
        request: Request<OrderIdRequest>,
    ) -> Result<Response<CheckResponse>, Status> {
        let order_id = request.into_inner().order_id;
        let response = run_check(&self.orders, &order_id, |order| {
            let missing = [
                ("name", &order.user_data.name),
                ("contact", &order.user_data.contact),
                ("address", &order.user_data.address),
            ]
            .into_iter()
            .find(|(_, value)| value.is_empty());

            match missing {
                Some((field, _)) => (false, format!("Missing required user field: {field}")),
                None => (true, "All user fields are valid".into()),
            }
        });
        Ok(Response::new(response))
    }

    async fn check_card_format(
        &self,
        request: Request<OrderIdRequest>,
    ) -> Result<Response<CheckResponse>, Status> {
        let order_id = request.into_inner().order_id;
        let response = run_check(&self.orders, &order_id, |order| {
            let number = &order.credit_card.number;
            if number.len() == 16 && number.chars().all(|c| c.is_ascii_digit()) {
                (true, "Credit card format is valid".into())
            } else {
                (false, "Invalid credit card format".into())
            }
        });
        Ok(Response::new(response))
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
                status: "Vector clock mismatch - not cleared.".into(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    async fn init(
        service: &TransactionCheckerService,
        order_id: &str,
        books: Vec<Item>,
        user_data: UserData,
        card_number: &str,
    ) {
        service
            .init_order(Request::new(InitOrderRequest {
                order_id: order_id.into(),
                user_data: Some(user_data),
                books,
                credit_card: Some(CreditCard {
                    number: card_number.into(),
                    expiration_date: "12/25".into(),
                    cvv: "123".into(),
                }),
            }))
            .await
            .unwrap();
    }

    fn valid_user() -> UserData {
        UserData {
            name: "Jane Doe".into(),
            contact: "jane@example.com".into(),
            address: "100 Main St".into(),
        }
    }

    fn one_book() -> Vec<Item> {
        vec![Item {
            name: "Book A".into(),
            quantity: 1,
        }]
    }

    #[tokio::test]
    async fn check_books_fails_when_empty() {
        let service = TransactionCheckerService::new();
        init(&service, "order-1", vec![], valid_user(), "1111111111111111").await;
        let resp = service
            .check_books(Request::new(OrderIdRequest {
                order_id: "order-1".into(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(!resp.is_success);
        assert_eq!(resp.message, "Book list is empty");
    }

    #[tokio::test]
    async fn check_books_succeeds_when_non_empty() {
        let service = TransactionCheckerService::new();
        init(&service, "order-1", one_book(), valid_user(), "1111111111111111").await;
        let resp = service
            .check_books(Request::new(OrderIdRequest {
                order_id: "order-1".into(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(resp.is_success);
    }

    #[tokio::test]
    async fn check_user_fields_reports_first_missing_field() {
        let service = TransactionCheckerService::new();
        let mut user = valid_user();
        user.contact = String::new();
        init(&service, "order-1", one_book(), user, "1111111111111111").await;
        let resp = service
            .check_user_fields(Request::new(OrderIdRequest {
                order_id: "order-1".into(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(!resp.is_success);
        assert_eq!(resp.message, "Missing required user field: contact");
    }

    #[tokio::test]
    async fn check_card_format_rejects_short_card() {
        let service = TransactionCheckerService::new();
        init(&service, "order-1", one_book(), valid_user(), "411111").await;
        let resp = service
            .check_card_format(Request::new(OrderIdRequest {
                order_id: "order-1".into(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(!resp.is_success);
        assert_eq!(resp.message, "Invalid credit card format");
    }

    #[tokio::test]
    async fn check_card_format_accepts_sixteen_digits() {
        let service = TransactionCheckerService::new();
        init(&service, "order-1", one_book(), valid_user(), "4111111111111111").await;
        let resp = service
            .check_card_format(Request::new(OrderIdRequest {
                order_id: "order-1".into(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(resp.is_success);
    }

    #[tokio::test]
    async fn every_check_increments_vc_by_exactly_one() {
        let service = TransactionCheckerService::new();
        init(&service, "order-1", one_book(), valid_user(), "4111111111111111").await;
        let books = service
            .check_books(Request::new(OrderIdRequest {
                order_id: "order-1".into(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(
            books.vector_clock.unwrap().entries.get(SERVICE_ID),
            Some(&2)
        );
        let fields = service
            .check_user_fields(Request::new(OrderIdRequest {
                order_id: "order-1".into(),
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(
            fields.vector_clock.unwrap().entries.get(SERVICE_ID),
            Some(&3)
        );
    }
}
