use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    checkout::{self, PixPayer},
    dto::orders::{CheckoutRequest, CheckoutResponse, OrderList, PixCharge},
    entity::orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CustomerSnapshot, Order, OrderLine, PaymentMethod},
    payments::{Billing, BillingRequest},
    pricing,
    realtime::ChangeEvent,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{auth_service, cart_service, profile_service, restaurant_service},
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::try_from)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    Ok(ApiResponse::success(
        "OK",
        Order::try_from(order)?,
        Some(Meta::empty()),
    ))
}

pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    if !restaurant_service::is_open(&state.orm).await? {
        return Err(AppError::Conflict("Restaurant is closed".into()));
    }

    let profile = auth_service::fetch_profile(&state.pool, user.user_id).await?;
    let stored = cart_service::load_lines(&state.orm, user.user_id).await?;
    if stored.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let catalog =
        cart_service::load_catalog(&state.orm, stored.iter().map(|line| &line.selection)).await?;
    let lines = stored
        .iter()
        .map(|line| catalog.price_line(line.id, &line.selection, line.quantity))
        .collect::<Result<Vec<OrderLine>, _>>()?;

    let subtotal = pricing::subtotal(&lines);
    let delivery_fee = checkout::delivery_fee(payload.delivery_type, state.config.delivery_fee_cents);
    let total = subtotal + delivery_fee;

    let address =
        checkout::resolve_address(payload.delivery_type, payload.address.as_ref(), &profile)?;
    let change_for = match payload.payment_method {
        PaymentMethod::Cash => Some(checkout::validate_change(payload.change_for, total)?),
        PaymentMethod::Pix | PaymentMethod::Credit | PaymentMethod::Debit => None,
    };
    let payer = match payload.payment_method {
        PaymentMethod::Pix => Some(checkout::resolve_payer(payload.payer.as_ref(), &profile)?),
        PaymentMethod::Credit | PaymentMethod::Debit | PaymentMethod::Cash => None,
    };

    let customer = CustomerSnapshot {
        id: user.user_id,
        name: profile.name.clone(),
        email: profile.email.clone(),
        phone: payer
            .as_ref()
            .map(|payer| payer.phone.clone())
            .or_else(|| profile.phone.clone())
            .unwrap_or_default(),
        address: address.clone(),
    };
    let status = payload.payment_method.initial_status();
    let order_id = Uuid::new_v4();
    let now = Utc::now();

    let txn = state.orm.begin().await?;
    if let Some(address) = &address {
        profile_service::save_address(&txn, user.user_id, address).await?;
    }
    let order = OrderActive {
        id: Set(order_id),
        user_id: Set(user.user_id),
        items: Set(to_json(&lines)?),
        customer: Set(to_json(&customer)?),
        delivery_type: Set(payload.delivery_type),
        payment_method: Set(payload.payment_method),
        change_for: Set(change_for),
        status: Set(status),
        subtotal: Set(subtotal),
        delivery_fee: Set(delivery_fee),
        total: Set(total),
        billing_id: Set(None),
        created_at: Set(now.into()),
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;
    // PIX carts survive until the billing exists, so a failed charge can be retried.
    if payer.is_none() {
        cart_service::clear_lines(&txn, user.user_id).await?;
    }
    txn.commit().await?;

    let (order, pix) = match payer {
        Some(payer) => {
            let (order, billing) = charge(state, order, payer).await?;
            cart_service::clear_lines(&state.orm, user.user_id).await?;
            let pix = PixCharge {
                billing_id: billing.id,
                url: billing.url,
                amount: order.total,
            };
            (order, Some(pix))
        }
        None => (order, None),
    };

    tracing::info!(
        order_id = %order.id,
        user_id = %user.user_id,
        total = order.total,
        payment_method = order.payment_method.as_str(),
        "order placed"
    );
    audit::record(
        &state.orm,
        Some(user.user_id),
        "checkout",
        "orders",
        serde_json::json!({
            "order_id": order.id,
            "total": order.total,
            "payment_method": order.payment_method,
        }),
    )
    .await;
    state.events.publish(ChangeEvent::OrderChanged {
        order_id: order.id,
        user_id: order.user_id,
        status: order.status,
    });

    Ok(ApiResponse::success(
        "Checkout success",
        CheckoutResponse {
            order: Order::try_from(order)?,
            pix,
        },
        Some(Meta::empty()),
    ))
}

/// Create the provider billing for a fresh PIX order. The order is removed
/// again when the provider refuses, so no unpayable order is left behind.
async fn charge(
    state: &AppState,
    order: OrderModel,
    payer: PixPayer,
) -> AppResult<(OrderModel, Billing)> {
    let request = BillingRequest {
        order_id: order.id,
        description: order_description(order.id),
        amount: order.total,
        payer,
    };

    let billing = match state.payments.create_billing(&request).await {
        Ok(billing) => billing,
        Err(err) => {
            tracing::warn!(order_id = %order.id, error = %err, "billing creation failed");
            discard(state, order.id).await;
            return Err(err.into());
        }
    };

    let mut active: OrderActive = order.into();
    active.billing_id = Set(Some(billing.id.clone()));
    active.updated_at = Set(Utc::now().into());
    match active.update(&state.orm).await {
        Ok(order) => {
            tracing::info!(order_id = %order.id, billing_id = %billing.id, "pix billing created");
            Ok((order, billing))
        }
        Err(err) => {
            discard(state, request.order_id).await;
            Err(err.into())
        }
    }
}

async fn discard(state: &AppState, order_id: Uuid) {
    if let Err(err) = Orders::delete_by_id(order_id).exec(&state.orm).await {
        tracing::error!(%order_id, error = %err, "failed to remove unpaid order");
    }
}

pub fn order_description(order_id: Uuid) -> String {
    let id = order_id.simple().to_string();
    format!("Pedido #{}", id[..8].to_uppercase())
}

fn to_json<T: serde::Serialize>(value: &T) -> AppResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|err| AppError::Internal(err.into()))
}
