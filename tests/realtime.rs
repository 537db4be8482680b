use std::time::Duration;

use futures_util::StreamExt;
use pizzaria_api::{
    models::OrderStatus,
    realtime::{ChangeEvent, EventHub},
};
use uuid::Uuid;

fn order_event(user_id: Uuid, status: OrderStatus) -> ChangeEvent {
    ChangeEvent::OrderChanged {
        order_id: Uuid::new_v4(),
        user_id,
        status,
    }
}

#[test]
fn customers_only_see_their_own_orders() {
    let owner = Uuid::new_v4();
    let other = Uuid::new_v4();
    let event = order_event(owner, OrderStatus::Preparing);

    assert!(event.visible_to(owner, false));
    assert!(!event.visible_to(other, false));
    assert!(event.visible_to(other, true));
    assert!(ChangeEvent::RestaurantStatus { is_open: false }.visible_to(other, false));
}

#[test]
fn events_serialize_with_type_tag() {
    let user_id = Uuid::new_v4();
    let order_id = Uuid::new_v4();
    let event = ChangeEvent::OrderChanged {
        order_id,
        user_id,
        status: OrderStatus::OutForDelivery,
    };

    assert_eq!(event.name(), "order_changed");
    assert_eq!(
        serde_json::to_value(&event).expect("serialize"),
        serde_json::json!({
            "type": "order_changed",
            "order_id": order_id,
            "user_id": user_id,
            "status": "out_for_delivery",
        })
    );
    assert_eq!(
        serde_json::to_value(ChangeEvent::RestaurantStatus { is_open: true }).expect("serialize"),
        serde_json::json!({ "type": "restaurant_status", "is_open": true })
    );
}

#[test]
fn publishing_without_subscribers_is_fine() {
    EventHub::default().publish(ChangeEvent::RestaurantStatus { is_open: true });
}

#[tokio::test]
async fn customer_stream_skips_other_orders() {
    let hub = EventHub::default();
    let customer = Uuid::new_v4();
    let mut stream = Box::pin(hub.stream_for(customer, false));

    hub.publish(order_event(Uuid::new_v4(), OrderStatus::Received));
    let own = order_event(customer, OrderStatus::Received);
    hub.publish(own.clone());
    hub.publish(ChangeEvent::RestaurantStatus { is_open: false });

    let first = tokio::time::timeout(Duration::from_secs(1), stream.next())
        .await
        .expect("event in time");
    assert_eq!(first, Some(own));

    let second = tokio::time::timeout(Duration::from_secs(1), stream.next())
        .await
        .expect("event in time");
    assert_eq!(second, Some(ChangeEvent::RestaurantStatus { is_open: false }));
}

#[tokio::test]
async fn staff_stream_sees_every_order() {
    let hub = EventHub::default();
    let mut stream = Box::pin(hub.stream_for(Uuid::new_v4(), true));

    let event = order_event(Uuid::new_v4(), OrderStatus::Preparing);
    hub.publish(event.clone());

    let received = tokio::time::timeout(Duration::from_secs(1), stream.next())
        .await
        .expect("event in time");
    assert_eq!(received, Some(event));
}

#[tokio::test]
async fn lagging_stream_resumes_at_newest_event() {
    let hub = EventHub::new(1);
    let mut stream = Box::pin(hub.stream_for(Uuid::new_v4(), true));

    hub.publish(ChangeEvent::RestaurantStatus { is_open: false });
    hub.publish(ChangeEvent::RestaurantStatus { is_open: false });
    hub.publish(ChangeEvent::RestaurantStatus { is_open: true });

    let received = tokio::time::timeout(Duration::from_secs(1), stream.next())
        .await
        .expect("event in time");
    assert_eq!(received, Some(ChangeEvent::RestaurantStatus { is_open: true }));
}

#[tokio::test]
async fn stream_ends_when_hub_is_dropped() {
    let hub = EventHub::default();
    let mut stream = Box::pin(hub.stream_for(Uuid::new_v4(), false));
    drop(hub);

    let next = tokio::time::timeout(Duration::from_secs(1), stream.next())
        .await
        .expect("stream closes in time");
    assert_eq!(next, None);
}
