use std::collections::HashSet;

use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::cart::{AddToCartRequest, CartView, UnavailableLine, UpdateCartItemRequest},
    entity::{
        cart_items::{ActiveModel as CartActive, Column as CartCol, Entity as CartItems, Model as CartModel},
        extras::{Column as ExtraCol, Entity as Extras},
        menu_items::{Column as ItemCol, Entity as MenuItems},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CartSelection, Extra, MenuItem},
    pricing::{self, MAX_LINE_QUANTITY, MenuCatalog, PricingError},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// A stored cart row with its selection decoded.
#[derive(Debug, Clone)]
pub struct StoredLine {
    pub id: Uuid,
    pub selection: CartSelection,
    pub quantity: i32,
}

impl TryFrom<CartModel> for StoredLine {
    type Error = AppError;

    fn try_from(model: CartModel) -> Result<Self, Self::Error> {
        let selection = serde_json::from_value(model.selection).map_err(|err| {
            AppError::Internal(anyhow::anyhow!("cart item {} is malformed: {err}", model.id))
        })?;
        Ok(StoredLine {
            id: model.id,
            selection,
            quantity: model.quantity,
        })
    }
}

/// Price every stored line; lines that no longer price are reported apart.
pub fn price_cart(catalog: &MenuCatalog, lines: &[StoredLine]) -> CartView {
    let mut priced = Vec::new();
    let mut unavailable = Vec::new();

    for line in lines {
        match catalog.price_line(line.id, &line.selection, line.quantity) {
            Ok(order_line) => priced.push(order_line),
            Err(err) => unavailable.push(UnavailableLine {
                line_id: line.id,
                selection: line.selection.clone(),
                quantity: line.quantity,
                reason: err.to_string(),
            }),
        }
    }

    CartView {
        subtotal: pricing::subtotal(&priced),
        lines: priced,
        unavailable,
    }
}

/// Load the menu items and extras referenced by `selections`, available or not.
pub async fn load_catalog<C: ConnectionTrait>(
    conn: &C,
    selections: impl IntoIterator<Item = &CartSelection>,
) -> AppResult<MenuCatalog> {
    let mut item_ids = HashSet::new();
    let mut extra_ids = HashSet::new();
    for selection in selections {
        item_ids.extend(selection.menu_item_ids());
        extra_ids.extend(selection.extra_ids());
    }

    let items = if item_ids.is_empty() {
        Vec::new()
    } else {
        MenuItems::find()
            .filter(ItemCol::Id.is_in(item_ids))
            .all(conn)
            .await?
    };
    let extras = if extra_ids.is_empty() {
        Vec::new()
    } else {
        Extras::find()
            .filter(ExtraCol::Id.is_in(extra_ids))
            .all(conn)
            .await?
    };

    Ok(MenuCatalog::new(
        items.into_iter().map(MenuItem::from),
        extras.into_iter().map(Extra::from),
    ))
}

pub async fn load_lines<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<Vec<StoredLine>> {
    CartItems::find()
        .filter(CartCol::UserId.eq(user_id))
        .order_by_asc(CartCol::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(StoredLine::try_from)
        .collect()
}

pub async fn list_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let view = cart_view(state, user.user_id).await?;
    let total = (view.lines.len() + view.unavailable.len()) as i64;
    Ok(ApiResponse::success(
        "OK",
        view,
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    check_quantity(payload.quantity)?;
    let catalog = load_catalog(&state.orm, [&payload.selection]).await?;
    catalog.check_selection(&payload.selection)?;

    let selection = serde_json::to_value(&payload.selection)
        .map_err(|err| AppError::Internal(err.into()))?;
    let line = CartActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        selection: Set(selection),
        quantity: Set(payload.quantity),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "cart_add",
        "cart_items",
        serde_json::json!({ "cart_item_id": line.id, "quantity": line.quantity }),
    )
    .await;

    let view = cart_view(state, user.user_id).await?;
    Ok(ApiResponse::success("Added to cart", view, None))
}

pub async fn update_quantity(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartView>> {
    check_quantity(payload.quantity)?;

    let result = CartItems::update_many()
        .col_expr(CartCol::Quantity, Expr::value(payload.quantity))
        .filter(CartCol::Id.eq(id))
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        Some(user.user_id),
        "cart_update",
        "cart_items",
        serde_json::json!({ "cart_item_id": id, "quantity": payload.quantity }),
    )
    .await;

    let view = cart_view(state, user.user_id).await?;
    Ok(ApiResponse::success("Cart updated", view, None))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    let result = CartItems::delete_many()
        .filter(CartCol::Id.eq(id))
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        Some(user.user_id),
        "cart_remove",
        "cart_items",
        serde_json::json!({ "cart_item_id": id }),
    )
    .await;

    let view = cart_view(state, user.user_id).await?;
    Ok(ApiResponse::success("Removed from cart", view, Some(Meta::empty())))
}

pub async fn clear_cart(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let removed = clear_lines(&state.orm, user.user_id).await?;
    tracing::debug!(user_id = %user.user_id, removed, "cart cleared");

    Ok(ApiResponse::success(
        "Cart cleared",
        serde_json::json!({ "removed": removed }),
        Some(Meta::empty()),
    ))
}

pub async fn clear_lines<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<u64> {
    let result = CartItems::delete_many()
        .filter(CartCol::UserId.eq(user_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

async fn cart_view(state: &AppState, user_id: Uuid) -> AppResult<CartView> {
    let lines = load_lines(&state.orm, user_id).await?;
    let catalog = load_catalog(&state.orm, lines.iter().map(|line| &line.selection)).await?;
    Ok(price_cart(&catalog, &lines))
}

fn check_quantity(quantity: i32) -> Result<(), PricingError> {
    if !(1..=MAX_LINE_QUANTITY).contains(&quantity) {
        return Err(PricingError::InvalidQuantity);
    }
    Ok(())
}
