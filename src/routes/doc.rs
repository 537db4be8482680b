use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    checkout::PixPayerInput,
    dto::{
        admin::{RoleRequest, UserRoles},
        auth::{LoginRequest, LoginResponse, MeResponse, RegisterRequest},
        cart::{AddToCartRequest, CartView, UnavailableLine, UpdateCartItemRequest},
        menu::{CreateExtraRequest, CreateMenuItemRequest, MenuItemList, MenuView, UpdateMenuItemRequest},
        orders::{CheckoutRequest, CheckoutResponse, OrderList, PixCharge},
        payments::{CheckPaymentRequest, PaymentCheck, WebhookAck},
        profile::UpdateProfileRequest,
        staff::{
            RestaurantStatusRequest, StaffOrderList, StaffOrderView, StaffStats,
            UpdateOrderStatusRequest,
        },
    },
    models::{
        Address, CartSelection, CustomerSnapshot, DeliveryType, Extra, ExtraKind, MenuItem,
        MenuKind, Order, OrderLine, OrderStatus, PaymentMethod, PizzaCategory, PizzaSize, Profile,
        RestaurantStatus, Role, SizePrices,
    },
    realtime::ChangeEvent,
    response::{ApiResponse, ErrorBody, Meta},
    routes::{
        admin, auth, cart, events, health, menu, orders, params, payments, profile, restaurant,
        staff,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::readiness,
        auth::register,
        auth::login,
        auth::me,
        profile::get_profile,
        profile::update_profile,
        profile::update_address,
        menu::get_menu,
        menu::list_items,
        menu::get_item,
        cart::cart_list,
        cart::add_to_cart,
        cart::update_cart_item,
        cart::remove_from_cart,
        cart::clear_cart,
        orders::list_orders,
        orders::checkout,
        orders::get_order,
        payments::check_pix_payment,
        payments::webhook,
        staff::list_orders,
        staff::get_order,
        staff::update_order_status,
        staff::stats,
        staff::set_restaurant_status,
        staff::toggle_restaurant_status,
        restaurant::get_status,
        admin::list_menu_items,
        admin::create_menu_item,
        admin::update_menu_item,
        admin::delete_menu_item,
        admin::create_extra,
        admin::delete_extra,
        admin::list_roles,
        admin::assign_role,
        admin::revoke_role,
        events::subscribe
    ),
    components(
        schemas(
            Address,
            CartSelection,
            CustomerSnapshot,
            DeliveryType,
            Extra,
            ExtraKind,
            MenuItem,
            MenuKind,
            Order,
            OrderLine,
            OrderStatus,
            PaymentMethod,
            PizzaCategory,
            PizzaSize,
            Profile,
            RestaurantStatus,
            Role,
            SizePrices,
            ChangeEvent,
            PixPayerInput,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            MeResponse,
            UpdateProfileRequest,
            MenuView,
            MenuItemList,
            CreateMenuItemRequest,
            UpdateMenuItemRequest,
            CreateExtraRequest,
            AddToCartRequest,
            UpdateCartItemRequest,
            CartView,
            UnavailableLine,
            CheckoutRequest,
            CheckoutResponse,
            PixCharge,
            OrderList,
            CheckPaymentRequest,
            PaymentCheck,
            WebhookAck,
            StaffOrderView,
            StaffOrderList,
            StaffStats,
            UpdateOrderStatusRequest,
            RestaurantStatusRequest,
            RoleRequest,
            UserRoles,
            params::Pagination,
            params::SortOrder,
            params::StaffScope,
            Meta,
            ErrorBody,
            ApiResponse<ErrorBody>,
            ApiResponse<Order>,
            ApiResponse<OrderList>,
            ApiResponse<CartView>,
            ApiResponse<MenuView>,
            ApiResponse<CheckoutResponse>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and session"),
        (name = "Profile", description = "Customer profile and delivery address"),
        (name = "Menu", description = "Public menu"),
        (name = "Cart", description = "Server-side cart"),
        (name = "Orders", description = "Checkout and order tracking"),
        (name = "Payments", description = "PIX polling and provider webhook"),
        (name = "Staff", description = "Kitchen panel"),
        (name = "Restaurant", description = "Open/closed flag"),
        (name = "Admin", description = "Menu and role management"),
        (name = "Events", description = "Realtime change stream"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
