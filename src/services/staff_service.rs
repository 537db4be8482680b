use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::staff::{StaffOrderList, StaffOrderView, StaffStats, UpdateOrderStatusRequest},
    entity::orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{DeliveryType, Order, OrderStatus},
    realtime::ChangeEvent,
    response::{ApiResponse, Meta},
    routes::params::{SortOrder, StaffOrderQuery, StaffScope},
    state::AppState,
};

/// Whether an order in `status` shows up under `scope`.
pub fn in_scope(scope: StaffScope, status: OrderStatus, delivery_type: DeliveryType) -> bool {
    match scope {
        StaffScope::All => true,
        StaffScope::Completed => status.is_final(delivery_type),
        StaffScope::Active => {
            status != OrderStatus::AwaitingPayment && !status.is_final(delivery_type)
        }
    }
}

fn completed_condition() -> Condition {
    Condition::any()
        .add(OrderCol::Status.eq(OrderStatus::Delivered))
        .add(
            Condition::all()
                .add(OrderCol::Status.eq(OrderStatus::ReadyForPickup))
                .add(OrderCol::DeliveryType.eq(DeliveryType::Pickup)),
        )
}

fn scope_condition(scope: StaffScope) -> Condition {
    match scope {
        StaffScope::All => Condition::all(),
        StaffScope::Completed => completed_condition(),
        StaffScope::Active => Condition::all()
            .add(OrderCol::Status.ne(OrderStatus::AwaitingPayment))
            .add(completed_condition().not()),
    }
}

fn staff_view(order: Order) -> StaffOrderView {
    StaffOrderView {
        next_statuses: order.status.next_options(order.delivery_type),
        order,
    }
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: StaffOrderQuery,
) -> AppResult<ApiResponse<StaffOrderList>> {
    ensure_staff(user)?;
    let (page, limit, offset) = query.pagination().normalize();
    let scope = query.scope.unwrap_or_default();

    let mut condition = scope_condition(scope);
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    // The kitchen works oldest first; history reads newest first.
    let sort_order = query.sort_order.unwrap_or(match scope {
        StaffScope::Active => SortOrder::Asc,
        StaffScope::Completed | StaffScope::All => SortOrder::Desc,
    });

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|model| Order::try_from(model).map(staff_view))
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        StaffOrderList { items },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<StaffOrderView>> {
    ensure_staff(user)?;
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::success(
        "Order found",
        staff_view(Order::try_from(order)?),
        Some(Meta::empty()),
    ))
}

pub async fn stats(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<StaffStats>> {
    ensure_staff(user)?;

    let count_status = |status: OrderStatus| {
        Orders::find()
            .filter(OrderCol::Status.eq(status))
            .count(&state.orm)
    };
    let stats = StaffStats {
        received: count_status(OrderStatus::Received).await? as i64,
        preparing: count_status(OrderStatus::Preparing).await? as i64,
        out_for_delivery: count_status(OrderStatus::OutForDelivery).await? as i64,
        completed: Orders::find()
            .filter(completed_condition())
            .count(&state.orm)
            .await? as i64,
    };

    Ok(ApiResponse::success("Stats", stats, Some(Meta::empty())))
}

pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<StaffOrderView>> {
    ensure_staff(user)?;
    let next = payload.status;

    let txn = state.orm.begin().await?;
    let existing = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let previous = existing.status;
    if !previous.can_advance_to(next, existing.delivery_type) {
        return Err(AppError::BadRequest(format!(
            "Cannot move a {} order from {} to {}",
            existing.delivery_type.as_str(),
            previous.as_str(),
            next.as_str()
        )));
    }

    let mut active: OrderActive = existing.into();
    active.status = Set(next);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        from = previous.as_str(),
        to = next.as_str(),
        staff_id = %user.user_id,
        "order status updated"
    );
    audit::record(
        &state.orm,
        Some(user.user_id),
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "from": previous, "to": next }),
    )
    .await;
    state.events.publish(ChangeEvent::OrderChanged {
        order_id: order.id,
        user_id: order.user_id,
        status: order.status,
    });

    Ok(ApiResponse::success(
        "Order updated",
        staff_view(Order::try_from(order)?),
        Some(Meta::empty()),
    ))
}
