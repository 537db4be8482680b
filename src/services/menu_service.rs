use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::menu::{
        CreateExtraRequest, CreateMenuItemRequest, MenuItemList, MenuView, UpdateMenuItemRequest,
    },
    entity::{
        extras::{ActiveModel as ExtraActive, Column as ExtraCol, Entity as Extras},
        menu_items::{ActiveModel as ItemActive, Column as ItemCol, Entity as MenuItems},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Extra, ExtraKind, MenuItem, MenuKind, PizzaCategory, SizePrices},
    response::{ApiResponse, Meta},
    routes::params::MenuQuery,
    state::AppState,
};

/// The pieces of a menu item that depend on its kind.
#[derive(Debug, Clone, Copy)]
pub struct ItemPricing {
    pub kind: MenuKind,
    pub category: Option<PizzaCategory>,
    pub price: Option<i64>,
    pub size_prices: Option<SizePrices>,
}

/// Pizzas are priced per size and need a category; beverages and desserts
/// have one flat price.
pub fn validate_item(pricing: &ItemPricing) -> Result<(), AppError> {
    let bad = |msg: &str| Err(AppError::BadRequest(msg.to_string()));
    match pricing.kind {
        MenuKind::Pizza => {
            let Some(sizes) = pricing.size_prices else {
                return bad("Pizzas need a price for every size");
            };
            if [sizes.small, sizes.medium, sizes.large, sizes.giant]
                .iter()
                .any(|price| *price <= 0)
            {
                return bad("Prices must be greater than 0");
            }
            if pricing.category.is_none() {
                return bad("Pizzas need a category");
            }
            if pricing.price.is_some() {
                return bad("Pizzas are priced per size");
            }
        }
        MenuKind::Beverage | MenuKind::Dessert => {
            match pricing.price {
                None => return bad("A price is required"),
                Some(price) if price <= 0 => return bad("Prices must be greater than 0"),
                Some(_) => {}
            }
            if pricing.size_prices.is_some() || pricing.category.is_some() {
                return bad("Only pizzas have sizes and categories");
            }
        }
    }
    Ok(())
}

pub async fn get_menu(state: &AppState) -> AppResult<ApiResponse<MenuView>> {
    let items: Vec<MenuItem> = MenuItems::find()
        .filter(ItemCol::Available.eq(true))
        .order_by_asc(ItemCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(MenuItem::from)
        .collect();
    let extras: Vec<Extra> = Extras::find()
        .filter(ExtraCol::Available.eq(true))
        .order_by_asc(ExtraCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Extra::from)
        .collect();

    let by_kind = |kind: MenuKind| -> Vec<MenuItem> {
        items.iter().filter(|item| item.kind == kind).cloned().collect()
    };
    let by_extra = |kind: ExtraKind| -> Vec<Extra> {
        extras.iter().filter(|extra| extra.kind == kind).cloned().collect()
    };

    let menu = MenuView {
        pizzas: by_kind(MenuKind::Pizza),
        beverages: by_kind(MenuKind::Beverage),
        desserts: by_kind(MenuKind::Dessert),
        crusts: by_extra(ExtraKind::Crust),
        add_ons: by_extra(ExtraKind::AddOn),
    };
    Ok(ApiResponse::success("Menu", menu, Some(Meta::empty())))
}

pub async fn list_items(
    state: &AppState,
    query: MenuQuery,
    include_unavailable: bool,
) -> AppResult<ApiResponse<MenuItemList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if !include_unavailable {
        condition = condition.add(ItemCol::Available.eq(true));
    }
    if let Some(kind) = query.kind {
        condition = condition.add(ItemCol::Kind.eq(kind));
    }
    if let Some(category) = query.category {
        condition = condition.add(ItemCol::Category.eq(category));
    }
    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(ItemCol::Name).ilike(pattern.clone()))
                .add(Expr::col(ItemCol::Description).ilike(pattern)),
        );
    }

    let finder = MenuItems::find()
        .filter(condition)
        .order_by_asc(ItemCol::Kind)
        .order_by_asc(ItemCol::Name);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(MenuItem::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Menu items",
        MenuItemList { items },
        Some(meta),
    ))
}

pub async fn get_item(state: &AppState, id: Uuid) -> AppResult<ApiResponse<MenuItem>> {
    let item = MenuItems::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(MenuItem::from)
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Menu item", item, None))
}

pub async fn create_item(
    state: &AppState,
    user: &AuthUser,
    payload: CreateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    ensure_admin(user)?;
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".into()));
    }
    validate_item(&ItemPricing {
        kind: payload.kind,
        category: payload.category,
        price: payload.price,
        size_prices: payload.size_prices,
    })?;
    ensure_name_free(state, &name, None).await?;

    let sizes = payload.size_prices;
    let item = ItemActive {
        id: Set(Uuid::new_v4()),
        kind: Set(payload.kind),
        name: Set(name),
        description: Set(payload.description),
        image_url: Set(payload.image_url),
        category: Set(payload.category),
        price: Set(payload.price),
        price_small: Set(sizes.map(|s| s.small)),
        price_medium: Set(sizes.map(|s| s.medium)),
        price_large: Set(sizes.map(|s| s.large)),
        price_giant: Set(sizes.map(|s| s.giant)),
        volume: Set(payload.volume),
        available: Set(payload.available.unwrap_or(true)),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "menu_item_create",
        "menu_items",
        serde_json::json!({ "menu_item_id": item.id, "kind": item.kind }),
    )
    .await;

    Ok(ApiResponse::success(
        "Menu item created",
        MenuItem::from(item),
        Some(Meta::empty()),
    ))
}

pub async fn update_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateMenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    ensure_admin(user)?;
    let existing = MenuItems::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(item) => item,
        None => return Err(AppError::NotFound),
    };
    let current = MenuItem::from(existing.clone());

    let pricing = ItemPricing {
        kind: current.kind,
        category: payload.category.or(current.category),
        price: payload.price.or(current.price),
        size_prices: payload.size_prices.or(current.size_prices),
    };
    validate_item(&pricing)?;

    let mut active: ItemActive = existing.into();
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("Name is required".into()));
        }
        ensure_name_free(state, &name, Some(id)).await?;
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    if let Some(volume) = payload.volume {
        active.volume = Set(Some(volume));
    }
    if let Some(available) = payload.available {
        active.available = Set(available);
    }
    active.category = Set(pricing.category);
    active.price = Set(pricing.price);
    if let Some(sizes) = pricing.size_prices {
        active.price_small = Set(Some(sizes.small));
        active.price_medium = Set(Some(sizes.medium));
        active.price_large = Set(Some(sizes.large));
        active.price_giant = Set(Some(sizes.giant));
    }

    let item = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "menu_item_update",
        "menu_items",
        serde_json::json!({ "menu_item_id": item.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        MenuItem::from(item),
        Some(Meta::empty()),
    ))
}

pub async fn delete_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = MenuItems::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        Some(user.user_id),
        "menu_item_delete",
        "menu_items",
        serde_json::json!({ "menu_item_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn create_extra(
    state: &AppState,
    user: &AuthUser,
    payload: CreateExtraRequest,
) -> AppResult<ApiResponse<Extra>> {
    ensure_admin(user)?;
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Name is required".into()));
    }
    if payload.price < 0 {
        return Err(AppError::BadRequest("Price cannot be negative".into()));
    }

    let taken = Extras::find()
        .filter(ExtraCol::Kind.eq(payload.kind))
        .filter(ExtraCol::Name.eq(name.as_str()))
        .one(&state.orm)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict(format!("{name} already exists")));
    }

    let extra = ExtraActive {
        id: Set(Uuid::new_v4()),
        kind: Set(payload.kind),
        name: Set(name),
        price: Set(payload.price),
        available: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "extra_create",
        "extras",
        serde_json::json!({ "extra_id": extra.id, "kind": extra.kind }),
    )
    .await;

    Ok(ApiResponse::success(
        "Extra created",
        Extra::from(extra),
        Some(Meta::empty()),
    ))
}

pub async fn delete_extra(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Extras::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        Some(user.user_id),
        "extra_delete",
        "extras",
        serde_json::json!({ "extra_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn ensure_name_free(state: &AppState, name: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut finder = MenuItems::find().filter(ItemCol::Name.eq(name));
    if let Some(id) = except {
        finder = finder.filter(ItemCol::Id.ne(id));
    }
    if finder.one(&state.orm).await?.is_some() {
        return Err(AppError::Conflict(format!("{name} already exists")));
    }
    Ok(())
}
