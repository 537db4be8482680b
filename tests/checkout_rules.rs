use chrono::Utc;
use pizzaria_api::{
    checkout::{
        CheckoutError, PixPayerInput, delivery_fee, resolve_address, resolve_payer,
        validate_change,
    },
    error::AppError,
    models::{Address, DeliveryType, MenuKind, PizzaCategory, Profile, SizePrices},
    services::{
        menu_service::{ItemPricing, validate_item},
        order_service::order_description,
    },
};
use rstest::rstest;
use uuid::Uuid;

fn profile() -> Profile {
    Profile {
        id: Uuid::new_v4(),
        name: "Maria Souza".into(),
        email: "maria@example.com".into(),
        phone: Some("(11) 98888-7777".into()),
        street: None,
        number: None,
        complement: None,
        neighborhood: None,
        city: None,
        cep: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn address() -> Address {
    Address {
        street: " Rua das Flores ".into(),
        number: "42".into(),
        complement: Some("   ".into()),
        neighborhood: "Centro".into(),
        city: "São Paulo".into(),
        cep: "01001-000".into(),
    }
}

#[test]
fn pickup_has_no_fee_and_no_address() {
    assert_eq!(delivery_fee(DeliveryType::Pickup, 800), 0);
    assert_eq!(delivery_fee(DeliveryType::Delivery, 800), 800);

    let resolved = resolve_address(DeliveryType::Pickup, Some(&address()), &profile())
        .expect("pickup");
    assert_eq!(resolved, None);
}

#[test]
fn delivery_address_is_trimmed() {
    let resolved = resolve_address(DeliveryType::Delivery, Some(&address()), &profile())
        .expect("valid address")
        .expect("delivery keeps an address");

    assert_eq!(resolved.street, "Rua das Flores");
    assert_eq!(resolved.complement, None);
}

#[test]
fn delivery_falls_back_to_saved_address() {
    let mut saved = profile();
    assert_eq!(
        resolve_address(DeliveryType::Delivery, None, &saved),
        Err(CheckoutError::MissingAddress)
    );

    saved.street = Some("Av. Paulista".into());
    saved.number = Some("1000".into());
    saved.neighborhood = Some("Bela Vista".into());
    saved.cep = Some("01310-100".into());
    let resolved = resolve_address(DeliveryType::Delivery, None, &saved)
        .expect("saved address")
        .expect("address");
    assert_eq!(resolved.street, "Av. Paulista");
    assert_eq!(resolved.city, "");
}

#[rstest]
#[case::street("street")]
#[case::number("number")]
#[case::neighborhood("neighborhood")]
#[case::cep("cep")]
fn delivery_requires_courier_fields(#[case] field: &'static str) {
    let mut incomplete = address();
    match field {
        "street" => incomplete.street = "  ".into(),
        "number" => incomplete.number = String::new(),
        "neighborhood" => incomplete.neighborhood = String::new(),
        "cep" => incomplete.cep = " ".into(),
        _ => panic!("unsupported field: {field}"),
    }

    assert_eq!(
        resolve_address(DeliveryType::Delivery, Some(&incomplete), &profile()),
        Err(CheckoutError::MissingAddressField(field))
    );
}

#[rstest]
#[case(None, 5000, Err(CheckoutError::MissingChange))]
#[case(Some(4999), 5000, Err(CheckoutError::InsufficientChange { change_for: 4999, total: 5000 }))]
#[case(Some(5000), 5000, Ok(5000))]
#[case(Some(10000), 5000, Ok(10000))]
fn cash_needs_enough_change(
    #[case] change_for: Option<i64>,
    #[case] total: i64,
    #[case] expected: Result<i64, CheckoutError>,
) {
    assert_eq!(validate_change(change_for, total), expected);
}

#[test]
fn payer_falls_back_to_profile() {
    let input = PixPayerInput {
        name: None,
        email: None,
        phone: None,
        cpf: "123.456.789-09".into(),
    };

    let payer = resolve_payer(Some(&input), &profile()).expect("payer");
    assert_eq!(payer.name, "Maria Souza");
    assert_eq!(payer.email, "maria@example.com");
    assert_eq!(payer.phone, "11988887777");
    assert_eq!(payer.cpf, "12345678909");
}

#[rstest]
#[case::short_name(Some("  Jo "), None, None, "12345678909", CheckoutError::InvalidPayerName)]
#[case::short_phone(None, None, Some("1199999"), "12345678909", CheckoutError::InvalidPhone)]
#[case::bad_email(None, Some("maria.example.com"), None, "12345678909", CheckoutError::InvalidEmail)]
#[case::short_cpf(None, None, None, "1234567890", CheckoutError::InvalidCpf)]
#[case::long_cpf(None, None, None, "123456789012", CheckoutError::InvalidCpf)]
fn payer_fields_are_validated(
    #[case] name: Option<&str>,
    #[case] email: Option<&str>,
    #[case] phone: Option<&str>,
    #[case] cpf: &str,
    #[case] expected: CheckoutError,
) {
    let input = PixPayerInput {
        name: name.map(str::to_string),
        email: email.map(str::to_string),
        phone: phone.map(str::to_string),
        cpf: cpf.into(),
    };

    assert_eq!(resolve_payer(Some(&input), &profile()), Err(expected));
}

#[test]
fn pix_requires_payer() {
    assert_eq!(
        resolve_payer(None, &profile()),
        Err(CheckoutError::MissingPayer)
    );
}

fn sizes(small: i64) -> Option<SizePrices> {
    Some(SizePrices {
        small,
        medium: 4000,
        large: 5000,
        giant: 6000,
    })
}

#[rstest]
#[case::pizza(MenuKind::Pizza, Some(PizzaCategory::Special), None, sizes(3000), true)]
#[case::pizza_without_sizes(MenuKind::Pizza, Some(PizzaCategory::Special), None, None, false)]
#[case::pizza_free_size(MenuKind::Pizza, Some(PizzaCategory::Sweet), None, sizes(0), false)]
#[case::pizza_without_category(MenuKind::Pizza, None, None, sizes(3000), false)]
#[case::pizza_with_flat_price(MenuKind::Pizza, Some(PizzaCategory::Traditional), Some(3000), sizes(3000), false)]
#[case::beverage(MenuKind::Beverage, None, Some(990), None, true)]
#[case::beverage_without_price(MenuKind::Beverage, None, None, None, false)]
#[case::dessert_negative(MenuKind::Dessert, None, Some(-5), None, false)]
#[case::dessert_with_sizes(MenuKind::Dessert, None, Some(1290), sizes(3000), false)]
fn menu_item_prices_match_kind(
    #[case] kind: MenuKind,
    #[case] category: Option<PizzaCategory>,
    #[case] price: Option<i64>,
    #[case] size_prices: Option<SizePrices>,
    #[case] valid: bool,
) {
    let result = validate_item(&ItemPricing {
        kind,
        category,
        price,
        size_prices,
    });

    if valid {
        assert!(result.is_ok(), "expected valid, got {result:?}");
    } else {
        assert!(matches!(result, Err(AppError::BadRequest(_))), "got {result:?}");
    }
}

#[test]
fn order_description_uses_short_id() {
    let id = Uuid::parse_str("3f2a9c1e-0000-4000-8000-000000000000").expect("uuid");
    assert_eq!(order_description(id), "Pedido #3F2A9C1E");
}
