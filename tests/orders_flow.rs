mod common;

use std::{sync::Arc, time::Duration};

use futures_util::StreamExt;
use pizzaria_api::{
    checkout::PixPayerInput,
    db::{create_pool, orm_from_pool, run_migrations},
    dto::{
        admin::RoleRequest,
        auth::RegisterRequest,
        cart::{AddToCartRequest, UpdateCartItemRequest},
        menu::{CreateExtraRequest, CreateMenuItemRequest},
        orders::CheckoutRequest,
        payments::CheckPaymentRequest,
        staff::UpdateOrderStatusRequest,
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::{
        Address, CartSelection, DeliveryType, ExtraKind, MenuKind, OrderStatus, PaymentMethod,
        PizzaCategory, PizzaSize, Role, SizePrices,
    },
    payments::{BillingStatus, PaymentError},
    realtime::{ChangeEvent, EventHub},
    routes::params::{StaffOrderQuery, StaffScope},
    services::{
        admin_service, auth_service, cart_service, menu_service, order_service, payment_service,
        restaurant_service, staff_service,
    },
    state::AppState,
};
use serde_json::json;
use uuid::Uuid;

use common::{FakeGateway, WEBHOOK_SECRET, database_url, test_config};

// Customer orders with cash and PIX; the webhook confirms the PIX order; staff move it along.
#[tokio::test]
async fn cash_and_pix_checkout_through_delivery() -> anyhow::Result<()> {
    let Some(database_url) = database_url() else {
        eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests.");
        return Ok(());
    };

    let gateway = Arc::new(FakeGateway::default());
    let state = setup_state(&database_url, gateway.clone()).await?;

    let customer = register(&state, "Maria Souza", "maria@example.com").await?;
    let admin = register(&state, "Admin", "admin@example.com").await?;
    grant_admin(&state, admin.user_id).await?;
    let admin = AuthUser {
        user_id: admin.user_id,
        roles: vec![Role::Customer, Role::Admin],
    };
    let employee = register(&state, "Cozinha", "cozinha@example.com").await?;
    admin_service::assign_role(
        &state,
        &admin,
        employee.user_id,
        RoleRequest {
            role: Role::Employee,
        },
    )
    .await?;
    let employee = AuthUser {
        user_id: employee.user_id,
        roles: vec![Role::Customer, Role::Employee],
    };

    // Menu
    let calabresa = menu_service::create_item(
        &state,
        &admin,
        CreateMenuItemRequest {
            kind: MenuKind::Pizza,
            name: "Calabresa".into(),
            description: Some("Calabresa e cebola".into()),
            image_url: None,
            category: Some(PizzaCategory::Traditional),
            price: None,
            size_prices: Some(SizePrices {
                small: 3000,
                medium: 4000,
                large: 5000,
                giant: 6000,
            }),
            volume: None,
            available: None,
        },
    )
    .await?
    .data
    .expect("pizza");
    let guarana = menu_service::create_item(
        &state,
        &admin,
        CreateMenuItemRequest {
            kind: MenuKind::Beverage,
            name: "Guaraná".into(),
            description: None,
            image_url: None,
            category: None,
            price: Some(1000),
            size_prices: None,
            volume: Some("2L".into()),
            available: None,
        },
    )
    .await?
    .data
    .expect("beverage");
    let catupiry = menu_service::create_extra(
        &state,
        &admin,
        CreateExtraRequest {
            kind: ExtraKind::Crust,
            name: "Catupiry".into(),
            price: 800,
        },
    )
    .await?
    .data
    .expect("crust");

    let duplicate = menu_service::create_extra(
        &state,
        &admin,
        CreateExtraRequest {
            kind: ExtraKind::Crust,
            name: "Catupiry".into(),
            price: 900,
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    // Cart
    let pizza = CartSelection::Pizza {
        pizza_id: calabresa.id,
        second_pizza_id: None,
        size: PizzaSize::Large,
        crust_id: Some(catupiry.id),
        add_on_ids: Vec::new(),
        notes: String::new(),
    };
    let cart = cart_service::add_to_cart(
        &state,
        &customer,
        AddToCartRequest {
            selection: pizza.clone(),
            quantity: 1,
        },
    )
    .await?
    .data
    .expect("cart");
    let pizza_line = cart.lines[0].line_id;
    cart_service::add_to_cart(
        &state,
        &customer,
        AddToCartRequest {
            selection: CartSelection::Beverage {
                beverage_id: guarana.id,
            },
            quantity: 1,
        },
    )
    .await?;
    let cart = cart_service::update_quantity(
        &state,
        &customer,
        pizza_line,
        UpdateCartItemRequest { quantity: 2 },
    )
    .await?
    .data
    .expect("cart");
    assert_eq!(cart.subtotal, 2 * (5000 + 800) + 1000);

    // Cash on delivery
    let missing_change = order_service::checkout(&state, &customer, cash_checkout(None)).await;
    assert!(matches!(missing_change, Err(AppError::BadRequest(_))));

    let cash = order_service::checkout(&state, &customer, cash_checkout(Some(20000)))
        .await?
        .data
        .expect("checkout");
    assert!(cash.pix.is_none());
    assert_eq!(cash.order.status, OrderStatus::Received);
    assert_eq!(cash.order.subtotal, 12600);
    assert_eq!(cash.order.delivery_fee, 800);
    assert_eq!(cash.order.total, 13400);
    assert_eq!(cash.order.change_for, Some(20000));
    assert_eq!(
        cash.order.customer.address.as_ref().map(|a| a.cep.as_str()),
        Some("01001-000")
    );
    let cart = cart_service::list_cart(&state, &customer).await?.data.expect("cart");
    assert!(cart.lines.is_empty(), "cash checkout clears the cart");

    // PIX: a provider failure leaves no order behind and keeps the cart
    cart_service::add_to_cart(
        &state,
        &customer,
        AddToCartRequest {
            selection: pizza,
            quantity: 1,
        },
    )
    .await?;
    *gateway.fail_with.lock().expect("lock") = Some(PaymentError::Upstream {
        status: 500,
        message: "boom".into(),
    });
    let failed = order_service::checkout(&state, &customer, pix_checkout()).await;
    assert!(matches!(failed, Err(AppError::Payment(_))));
    assert_eq!(count_orders(&state).await?, 1);
    let cart = cart_service::list_cart(&state, &customer).await?.data.expect("cart");
    assert_eq!(cart.lines.len(), 1, "cart survives a failed billing");

    let pix = order_service::checkout(&state, &customer, pix_checkout())
        .await?
        .data
        .expect("checkout");
    let charge = pix.pix.expect("pix charge");
    assert_eq!(pix.order.status, OrderStatus::AwaitingPayment);
    assert_eq!(pix.order.delivery_fee, 0);
    assert_eq!(pix.order.billing_id.as_deref(), Some(charge.billing_id.as_str()));
    assert_eq!(charge.amount, 5800);
    assert_eq!(gateway.request_count(), 2);
    let cart = cart_service::list_cart(&state, &customer).await?.data.expect("cart");
    assert!(cart.lines.is_empty());

    // Kitchen does not see unpaid orders
    let active = staff_service::list_orders(&state, &employee, StaffOrderQuery::default())
        .await?
        .data
        .expect("orders");
    assert!(active.items.iter().all(|view| view.order.id != pix.order.id));

    // Webhook confirms once
    let mut events = Box::pin(state.events.stream_for(customer.user_id, false));
    let unknown = payment_service::handle_webhook(
        &state,
        Some(WEBHOOK_SECRET),
        json!({ "data": { "billing": { "id": "bill_unknown", "status": "PAID" } } }),
    )
    .await;
    assert!(matches!(unknown, Err(AppError::NotFound)));

    let payload = json!({ "data": { "billing": { "id": charge.billing_id, "status": "PAID" } } });
    let ack = payment_service::handle_webhook(&state, Some(WEBHOOK_SECRET), payload.clone())
        .await?
        .data
        .expect("ack");
    assert!(ack.confirmed);
    let again = payment_service::handle_webhook(&state, Some(WEBHOOK_SECRET), payload)
        .await?
        .data
        .expect("ack");
    assert!(!again.confirmed, "second confirmation is a no-op");

    let event = tokio::time::timeout(Duration::from_secs(1), events.next()).await?;
    assert_eq!(
        event,
        Some(ChangeEvent::OrderChanged {
            order_id: pix.order.id,
            user_id: customer.user_id,
            status: OrderStatus::Received,
        })
    );

    // Polling after the webhook reports paid without changing anything
    gateway.set_status(BillingStatus::Paid);
    let check = payment_service::check_pix_payment(
        &state,
        &customer,
        CheckPaymentRequest {
            billing_id: charge.billing_id.clone(),
        },
    )
    .await?
    .data
    .expect("check");
    assert!(check.is_paid);
    assert_eq!(check.order_status, OrderStatus::Received);

    let stranger = register(&state, "Outro Cliente", "outro@example.com").await?;
    let hidden = payment_service::check_pix_payment(
        &state,
        &stranger,
        CheckPaymentRequest {
            billing_id: charge.billing_id,
        },
    )
    .await;
    assert!(matches!(hidden, Err(AppError::NotFound)));

    // Pickup order moves through the kitchen
    let wrong_branch = staff_service::update_status(
        &state,
        &employee,
        pix.order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::OutForDelivery,
        },
    )
    .await;
    assert!(matches!(wrong_branch, Err(AppError::BadRequest(_))));

    for status in [OrderStatus::Preparing, OrderStatus::ReadyForPickup] {
        let view = staff_service::update_status(
            &state,
            &employee,
            pix.order.id,
            UpdateOrderStatusRequest { status },
        )
        .await?
        .data
        .expect("order");
        assert_eq!(view.order.status, status);
    }

    let backwards = staff_service::update_status(
        &state,
        &employee,
        pix.order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Preparing,
        },
    )
    .await;
    assert!(matches!(backwards, Err(AppError::BadRequest(_))));

    let completed = staff_service::list_orders(
        &state,
        &employee,
        StaffOrderQuery {
            scope: Some(StaffScope::Completed),
            ..StaffOrderQuery::default()
        },
    )
    .await?
    .data
    .expect("orders");
    assert_eq!(completed.items.len(), 1);
    assert_eq!(completed.items[0].order.id, pix.order.id);
    assert!(completed.items[0].next_statuses.is_empty());

    let stats = staff_service::stats(&state, &employee).await?.data.expect("stats");
    assert_eq!(stats.received, 1);
    assert_eq!(stats.completed, 1);

    // Customers only see their own orders
    let mine = order_service::get_order(&state, &customer, cash.order.id).await?;
    assert_eq!(mine.data.expect("order").id, cash.order.id);
    let theirs = order_service::get_order(&state, &stranger, cash.order.id).await;
    assert!(matches!(theirs, Err(AppError::NotFound)));

    // Closed restaurant refuses checkout
    assert!(matches!(
        restaurant_service::toggle_status(&state, &customer).await,
        Err(AppError::Forbidden)
    ));
    let closed = restaurant_service::toggle_status(&state, &employee)
        .await?
        .data
        .expect("status");
    assert!(!closed.is_open);
    cart_service::add_to_cart(
        &state,
        &customer,
        AddToCartRequest {
            selection: CartSelection::Beverage {
                beverage_id: guarana.id,
            },
            quantity: 1,
        },
    )
    .await?;
    let refused = order_service::checkout(&state, &customer, cash_checkout(Some(5000))).await;
    assert!(matches!(refused, Err(AppError::Conflict(_))));
    restaurant_service::set_status(&state, &employee, true).await?;

    // Admins keep their own admin role
    let self_revoke = admin_service::revoke_role(&state, &admin, admin.user_id, Role::Admin).await;
    assert!(matches!(self_revoke, Err(AppError::BadRequest(_))));

    Ok(())
}

fn cash_checkout(change_for: Option<i64>) -> CheckoutRequest {
    CheckoutRequest {
        delivery_type: DeliveryType::Delivery,
        payment_method: PaymentMethod::Cash,
        address: Some(Address {
            street: "Rua das Flores".into(),
            number: "42".into(),
            complement: None,
            neighborhood: "Centro".into(),
            city: "São Paulo".into(),
            cep: "01001-000".into(),
        }),
        change_for,
        payer: None,
    }
}

fn pix_checkout() -> CheckoutRequest {
    CheckoutRequest {
        delivery_type: DeliveryType::Pickup,
        payment_method: PaymentMethod::Pix,
        address: None,
        change_for: None,
        payer: Some(PixPayerInput {
            name: None,
            email: None,
            phone: Some("11988887777".into()),
            cpf: "123.456.789-09".into(),
        }),
    }
}

async fn setup_state(database_url: &str, gateway: Arc<FakeGateway>) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    run_migrations(&pool).await?;

    // Clean tables between runs
    sqlx::query(
        "TRUNCATE TABLE audit_logs, orders, cart_items, extras, menu_items, user_roles, profiles, users RESTART IDENTITY CASCADE",
    )
    .execute(&pool)
    .await?;
    sqlx::query(
        "INSERT INTO restaurant_settings (id, is_open) VALUES (1, TRUE) ON CONFLICT (id) DO UPDATE SET is_open = TRUE",
    )
    .execute(&pool)
    .await?;

    Ok(AppState {
        orm: orm_from_pool(&pool),
        pool,
        config: Arc::new(test_config(database_url)),
        payments: gateway,
        events: EventHub::default(),
    })
}

async fn register(state: &AppState, name: &str, email: &str) -> anyhow::Result<AuthUser> {
    let created = auth_service::register_user(
        state,
        RegisterRequest {
            name: name.into(),
            email: email.into(),
            password: "secret123".into(),
            phone: Some("11999990000".into()),
        },
    )
    .await?
    .data
    .expect("profile");

    Ok(AuthUser {
        user_id: created.profile.id,
        roles: created.roles,
    })
}

async fn grant_admin(state: &AppState, user_id: Uuid) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO user_roles (id, user_id, role) VALUES ($1, $2, 'admin')")
        .bind(Uuid::new_v4())
        .bind(user_id)
        .execute(&state.pool)
        .await?;
    Ok(())
}

async fn count_orders(state: &AppState) -> anyhow::Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
        .fetch_one(&state.pool)
        .await?;
    Ok(count)
}
