use checkout_types::proto::{
    fraud::{
        fraud_checker_client::FraudCheckerClient, InitOrderRequest as FraudInitOrderRequest,
        OrderIdRequest as FraudOrderIdRequest,
    },
    queue::{order_queue_client::OrderQueueClient, EnqueueRequest},
    suggestions::{suggestions_client::SuggestionsClient, GetSuggestionsRequest},
    transaction::{
        transaction_checker_client::TransactionCheckerClient,
        InitOrderRequest as TransactionInitOrderRequest, OrderIdRequest as TransactionOrderIdRequest,
        CreditCard, Item, UserData,
    },
};
use tonic::transport::Channel;
use tracing::warn;

use crate::{domain::OrderRequest, error::Error};

/// The orchestrator's view of the order once it has cleared validation:
/// just enough to answer the client, since the checkers and the queue own
/// everything else.
#[derive(Debug, Clone)]
pub struct CheckoutResponse {
    pub order_id: String,
    pub suggested_books: Vec<String>,
}

/// Holds one clone-able `tonic` client per downstream service. `tonic`
/// clients are cheap to clone (an `Arc`-backed channel underneath), so each
/// fan-out task gets its own handle rather than sharing one behind a lock.
#[derive(Clone)]
pub struct App {
    fraud: FraudCheckerClient<Channel>,
    transaction: TransactionCheckerClient<Channel>,
    suggestions: SuggestionsClient<Channel>,
    queue: OrderQueueClient<Channel>,
}

impl App {
    #[must_use]
    pub const fn new(
        fraud: FraudCheckerClient<Channel>,
        transaction: TransactionCheckerClient<Channel>,
        suggestions: SuggestionsClient<Channel>,
        queue: OrderQueueClient<Channel>,
    ) -> Self {
        Self { fraud, transaction, suggestions, queue }
    }

    /// Drives `POST /checkout` (`SPEC_FULL.md` §4.1): fans out to Fraud,
    /// Transaction, and Suggestions in parallel, short-circuits on a fraud
    /// verdict without waiting for the other two, otherwise waits for
    /// Transaction then Suggestions and enqueues on full success.
    pub async fn checkout(&self, order: OrderRequest) -> Result<CheckoutResponse, Error> {
        let Some(order_id) = order.order_id.clone() else {
            return Err(Error::MissingOrderId);
        };
        let purchased_books: Vec<String> = order.items.iter().map(|item| item.name.clone()).collect();

        let fraud_task = tokio::spawn(fraud_flow(
            self.fraud.clone(),
            order_id.clone(),
            order.user_id.clone(),
            order.amount,
        ));
        let transaction_task =
            tokio::spawn(transaction_flow(self.transaction.clone(), order_id.clone(), order.clone()));
        let suggestions_task = tokio::spawn(suggestions_flow(
            self.suggestions.clone(),
            order_id.clone(),
            purchased_books,
        ));

        // Short-circuit: the fraud verdict alone can reject the order
        // without waiting for transaction/suggestions to finish. Those
        // tasks keep running to completion in the background (their
        // effects on the checkers are still observable; no compensation
        // is performed — see `SPEC_FULL.md` §4.1, §9).
        let fraudulent = fraud_task.await.unwrap_or(true);
        if fraudulent {
            return Err(Error::Rejected("Fraud detected".to_owned()));
        }

        let (is_valid, message) =
            transaction_task.await.unwrap_or_else(|_| (false, "Transaction check failed".to_owned()));
        if !is_valid {
            return Err(Error::Rejected(message));
        }

        let suggested_books = suggestions_task.await.unwrap_or_default();

        let item_count = u32::try_from(order.items.len()).unwrap_or(u32::MAX);
        let enqueued = self
            .queue
            .clone()
            .enqueue(EnqueueRequest {
                order_id: order_id.clone(),
                amount: order.amount,
                item_count,
                user_type: order.user.user_type.clone(),
            })
            .await;

        match enqueued {
            Ok(response) if response.into_inner().success => Ok(CheckoutResponse { order_id, suggested_books }),
            Ok(_) | Err(_) => Err(Error::EnqueueFailed),
        }
    }
}

/// `true` means fraudulent: any checker-reported failure or RPC exception
/// fails closed, exactly as the source's own `except Exception` fallback
/// does (`SPEC_FULL.md` §4.1, §7).
async fn fraud_flow(
    mut client: FraudCheckerClient<Channel>,
    order_id: String,
    user_id: String,
    amount: f64,
) -> bool {
    let init = client
        .init_order(FraudInitOrderRequest { order_id: order_id.clone(), user_id, amount })
        .await;
    if init.map_or(true, |response| !response.into_inner().success) {
        return true;
    }

    let user_check = client
        .check_user_fraud(FraudOrderIdRequest { order_id: order_id.clone() })
        .await;
    if user_check.map_or(true, |response| !response.into_inner().is_success) {
        return true;
    }

    let card_check = client.check_card_fraud(FraudOrderIdRequest { order_id }).await;
    card_check.map_or(true, |response| !response.into_inner().is_success)
}

async fn transaction_flow(
    mut client: TransactionCheckerClient<Channel>,
    order_id: String,
    order: OrderRequest,
) -> (bool, String) {
    let user_data = UserData {
        name: order.user.name,
        contact: order.user.contact,
        address: order.billing_address.street,
    };
    let books = order.items.into_iter().map(|item| Item { name: item.name, quantity: item.quantity }).collect();
    let credit_card = CreditCard {
        number: order.credit_card.normalized_number(),
        expiration_date: order.credit_card.expiration_date,
        cvv: order.credit_card.cvv,
    };

    let init = match client
        .init_order(TransactionInitOrderRequest {
            order_id: order_id.clone(),
            user_data: Some(user_data),
            books,
            credit_card: Some(credit_card),
        })
        .await
    {
        Ok(response) => response.into_inner(),
        Err(error) => return (false, format!("Exception: {error}")),
    };
    if !init.success {
        return (false, init.message);
    }

    macro_rules! run_step {
        ($method:ident) => {{
            let response = match client
                .$method(TransactionOrderIdRequest { order_id: order_id.clone() })
                .await
            {
                Ok(response) => response.into_inner(),
                Err(error) => return (false, format!("Exception: {error}")),
            };
            if !response.is_success {
                return (false, response.message);
            }
        }};
    }

    run_step!(check_books);
    run_step!(check_user_fields);
    run_step!(check_card_format);

    (true, "Transaction Valid".to_owned())
}

async fn suggestions_flow(
    mut client: SuggestionsClient<Channel>,
    order_id: String,
    purchased_books: Vec<String>,
) -> Vec<String> {
    match client.get_suggestions(GetSuggestionsRequest { purchased_books, order_id }).await {
        Ok(response) => response.into_inner().suggested_books.into_iter().map(|book| book.title).collect(),
        Err(error) => {
            warn!(%error, "suggestions lookup failed, returning no suggestions");
            Vec::new()
        }
    }
}
