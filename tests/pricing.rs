use chrono::Utc;
use pizzaria_api::{
    models::{CartSelection, Extra, ExtraKind, MenuItem, MenuKind, PizzaCategory, PizzaSize, SizePrices},
    pricing::{MenuCatalog, PricingError, subtotal},
    services::cart_service::{StoredLine, price_cart},
};
use rstest::{fixture, rstest};
use uuid::Uuid;

struct Menu {
    catalog: MenuCatalog,
    margherita: Uuid,
    quatro_queijos: Uuid,
    sold_out: Uuid,
    coke: Uuid,
    pudim: Uuid,
    catupiry: Uuid,
    bacon: Uuid,
}

fn pizza(name: &str, base: i64, available: bool) -> MenuItem {
    MenuItem {
        id: Uuid::new_v4(),
        kind: MenuKind::Pizza,
        name: name.into(),
        description: None,
        image_url: None,
        category: Some(PizzaCategory::Traditional),
        price: None,
        size_prices: Some(SizePrices {
            small: base,
            medium: base + 1000,
            large: base + 2000,
            giant: base + 3000,
        }),
        volume: None,
        available,
        created_at: Utc::now(),
    }
}

fn flat(kind: MenuKind, name: &str, price: i64, volume: Option<&str>) -> MenuItem {
    MenuItem {
        id: Uuid::new_v4(),
        kind,
        name: name.into(),
        description: None,
        image_url: None,
        category: None,
        price: Some(price),
        size_prices: None,
        volume: volume.map(str::to_string),
        available: true,
        created_at: Utc::now(),
    }
}

fn extra(kind: ExtraKind, name: &str, price: i64) -> Extra {
    Extra {
        id: Uuid::new_v4(),
        kind,
        name: name.into(),
        price,
        available: true,
        created_at: Utc::now(),
    }
}

#[fixture]
fn menu() -> Menu {
    let margherita = pizza("Margherita", 3000, true);
    let quatro_queijos = pizza("Quatro Queijos", 4000, true);
    let sold_out = pizza("Portuguesa", 3500, false);
    let coke = flat(MenuKind::Beverage, "Coca-Cola", 1290, Some("2L"));
    let pudim = flat(MenuKind::Dessert, "Pudim", 1290, None);
    let catupiry = extra(ExtraKind::Crust, "Catupiry", 800);
    let bacon = extra(ExtraKind::AddOn, "Bacon", 600);

    Menu {
        margherita: margherita.id,
        quatro_queijos: quatro_queijos.id,
        sold_out: sold_out.id,
        coke: coke.id,
        pudim: pudim.id,
        catupiry: catupiry.id,
        bacon: bacon.id,
        catalog: MenuCatalog::new(
            [margherita, quatro_queijos, sold_out, coke, pudim],
            [catupiry, bacon],
        ),
    }
}

fn pizza_line(pizza_id: Uuid, size: PizzaSize) -> CartSelection {
    CartSelection::Pizza {
        pizza_id,
        second_pizza_id: None,
        size,
        crust_id: None,
        add_on_ids: Vec::new(),
        notes: String::new(),
    }
}

#[rstest]
#[case(PizzaSize::Small, 3000)]
#[case(PizzaSize::Medium, 4000)]
#[case(PizzaSize::Large, 5000)]
#[case(PizzaSize::Giant, 6000)]
fn pizza_is_priced_by_size(menu: Menu, #[case] size: PizzaSize, #[case] expected: i64) {
    let line = menu
        .catalog
        .price_line(Uuid::new_v4(), &pizza_line(menu.margherita, size), 2)
        .expect("priced");

    assert_eq!(line.unit_price, expected);
    assert_eq!(line.line_total, expected * 2);
}

#[rstest]
fn half_and_half_costs_the_dearer_half(menu: Menu) {
    let selection = CartSelection::Pizza {
        pizza_id: menu.margherita,
        second_pizza_id: Some(menu.quatro_queijos),
        size: PizzaSize::Large,
        crust_id: None,
        add_on_ids: Vec::new(),
        notes: String::new(),
    };

    let line = menu
        .catalog
        .price_line(Uuid::new_v4(), &selection, 1)
        .expect("priced");
    assert_eq!(line.unit_price, 6000);
    assert_eq!(line.title, "Margherita + Quatro Queijos (Grande)");
}

#[rstest]
fn crust_and_add_ons_are_added_per_unit(menu: Menu) {
    let selection = CartSelection::Pizza {
        pizza_id: menu.margherita,
        second_pizza_id: None,
        size: PizzaSize::Medium,
        crust_id: Some(menu.catupiry),
        add_on_ids: vec![menu.bacon, menu.bacon],
        notes: "  sem cebola ".into(),
    };

    let line = menu
        .catalog
        .price_line(Uuid::new_v4(), &selection, 3)
        .expect("priced");
    assert_eq!(line.unit_price, 4000 + 800 + 600 + 600);
    assert_eq!(line.line_total, line.unit_price * 3);
    assert_eq!(
        line.details,
        vec![
            "Borda: Catupiry".to_string(),
            "Adicional: Bacon".to_string(),
            "Adicional: Bacon".to_string(),
            "Obs: sem cebola".to_string(),
        ]
    );
}

#[rstest]
fn beverages_and_desserts_use_flat_prices(menu: Menu) {
    let coke = menu
        .catalog
        .price_line(Uuid::new_v4(), &CartSelection::Beverage { beverage_id: menu.coke }, 2)
        .expect("priced");
    assert_eq!(coke.title, "Coca-Cola 2L");
    assert_eq!(coke.line_total, 2580);

    let pudim = menu
        .catalog
        .price_line(Uuid::new_v4(), &CartSelection::Dessert { dessert_id: menu.pudim }, 1)
        .expect("priced");
    assert_eq!(subtotal(&[coke, pudim]), 2580 + 1290);
}

#[rstest]
#[case(0)]
#[case(-1)]
#[case(51)]
fn quantity_must_be_in_range(menu: Menu, #[case] quantity: i32) {
    let error = menu
        .catalog
        .price_line(Uuid::new_v4(), &pizza_line(menu.margherita, PizzaSize::Small), quantity)
        .expect_err("quantity rejected");
    assert_eq!(error, PricingError::InvalidQuantity);
}

#[rstest]
fn rejects_unavailable_and_mismatched_items(menu: Menu) {
    let error = menu
        .catalog
        .check_selection(&pizza_line(menu.sold_out, PizzaSize::Small))
        .expect_err("sold out");
    assert_eq!(error, PricingError::Unavailable("Portuguesa".into()));

    let error = menu
        .catalog
        .check_selection(&CartSelection::Beverage { beverage_id: menu.pudim })
        .expect_err("dessert is not a beverage");
    assert!(matches!(error, PricingError::WrongKind { expected: "beverage", .. }));

    let half_with_drink = CartSelection::Pizza {
        pizza_id: menu.margherita,
        second_pizza_id: Some(menu.coke),
        size: PizzaSize::Small,
        crust_id: None,
        add_on_ids: Vec::new(),
        notes: String::new(),
    };
    assert!(matches!(
        menu.catalog.check_selection(&half_with_drink),
        Err(PricingError::WrongKind { expected: "pizza", .. })
    ));

    let add_on_as_crust = CartSelection::Pizza {
        pizza_id: menu.margherita,
        second_pizza_id: None,
        size: PizzaSize::Small,
        crust_id: Some(menu.bacon),
        add_on_ids: Vec::new(),
        notes: String::new(),
    };
    assert!(matches!(
        menu.catalog.check_selection(&add_on_as_crust),
        Err(PricingError::WrongKind { expected: "crust", .. })
    ));

    let unknown = Uuid::new_v4();
    assert_eq!(
        menu.catalog.check_selection(&pizza_line(unknown, PizzaSize::Small)),
        Err(PricingError::UnknownItem(unknown))
    );
}

#[rstest]
fn cart_keeps_lines_that_no_longer_price_apart(menu: Menu) {
    let lines = vec![
        StoredLine {
            id: Uuid::new_v4(),
            selection: pizza_line(menu.margherita, PizzaSize::Small),
            quantity: 1,
        },
        StoredLine {
            id: Uuid::new_v4(),
            selection: pizza_line(menu.sold_out, PizzaSize::Small),
            quantity: 2,
        },
        StoredLine {
            id: Uuid::new_v4(),
            selection: CartSelection::Beverage { beverage_id: menu.coke },
            quantity: 1,
        },
    ];

    let view = price_cart(&menu.catalog, &lines);
    assert_eq!(view.lines.len(), 2);
    assert_eq!(view.subtotal, 3000 + 1290);
    assert_eq!(view.unavailable.len(), 1);
    assert_eq!(view.unavailable[0].line_id, lines[1].id);
    assert_eq!(view.unavailable[0].reason, "Portuguesa is not available");
}

#[test]
fn selection_json_is_tagged_by_kind() {
    let pizza_id = Uuid::new_v4();
    let selection: CartSelection = serde_json::from_value(serde_json::json!({
        "kind": "pizza",
        "pizza_id": pizza_id,
        "size": "giant"
    }))
    .expect("decode");

    assert_eq!(selection, pizza_line(pizza_id, PizzaSize::Giant));
    assert_eq!(selection.menu_item_ids(), vec![pizza_id]);
    assert!(selection.extra_ids().is_empty());
}
