use food_delivery::broker::{Broker, EventPublisher, InMemoryBroker};
use food_delivery::cart_store::InMemoryCartStore;
use food_delivery::config::Config;
use food_delivery::events::{
    dead_letter_queue, Event, MenuItemSelection, CART_UPDATED_QUEUE, MENU_ITEM_SELECTED_QUEUE,
    ORDER_CREATED_QUEUE,
};
use food_delivery::lifecycle::DeliverySystem;
use food_delivery::model::{Order, OrderStatus};
use food_delivery::orders::FeedbackRequest;
use resource_actor::ActorClient;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;

fn selection(name: &str, price: Decimal, quantity: i64) -> Event {
    Event::MenuItemSelected(MenuItemSelection {
        customer_id: 21,
        restaurant_id: 5,
        name: name.into(),
        price,
        quantity,
    })
}

async fn eventually<T, F, Fut>(mut probe: F) -> T
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Option<T>>,
{
    for _ in 0..400 {
        if let Some(value) = probe().await {
            return value;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

/// Full end-to-end run with real actors, the in-memory store and broker.
#[tokio::test]
async fn test_full_delivery_flow() {
    let mut config = Config::for_test();
    config.cart.publish_updates = true;
    let (store, _store_task) = InMemoryCartStore::spawn(16);
    let broker = InMemoryBroker::new();
    let system = DeliverySystem::start(&config, Arc::new(store), Arc::new(broker.clone()));

    // Customer picks two dishes; the menu consumer builds the cart.
    let publisher = EventPublisher::new(Arc::new(broker.clone()), Duration::from_secs(1));
    publisher
        .publish(MENU_ITEM_SELECTED_QUEUE, &selection("Burger", dec!(9.99), 2))
        .await
        .unwrap();
    publisher
        .publish(MENU_ITEM_SELECTED_QUEUE, &selection("Fries", dec!(6.00), 1))
        .await
        .unwrap();

    let sys = &system;
    let cart = eventually(move || async move {
        sys
            .cart
            .view_cart(21)
            .await
            .ok()
            .filter(|cart| cart.items.len() == 2)
    })
    .await;
    assert_eq!(cart.total_amount, dec!(25.98));
    assert_eq!(cart.vat_amount, dec!(5.20));
    assert_eq!(broker.backlog(CART_UPDATED_QUEUE).len(), 2);

    // Publishing the cart runs the assembly saga.
    system.cart.publish_cart(21, "ring the bell").await.unwrap();
    let order: Order = eventually(move || async move {
        sys
            .orders
            .repository()
            .orders
            .find(|order: &Order| order.customer_id == 21)
            .await
            .unwrap()
            .into_iter()
            .next()
    })
    .await;
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_amount, dec!(25.98));

    let order_id = order.id;
    let items = eventually(move || async move {
        let items = sys.orders.order_items(order_id).await.unwrap();
        (items.len() == 2).then_some(items)
    })
    .await;
    assert_eq!(items[0].name, "Burger");
    assert_eq!(items[1].quantity, 1);

    // Cart release is the saga's last step.
    eventually(move || async move { sys.cart.view_cart(21).await.err() }).await;

    // Delivery.
    let agent_id = system.orders.create_delivery_agent("Ada").await.unwrap();
    let assignment = system
        .orders
        .update_status_with_agent(order.id, "OnItsWay", agent_id)
        .await
        .unwrap();
    assert!(assignment.is_complete());
    system.orders.update_status(order.id, "Delivered").await.unwrap();

    let outcome = system
        .orders
        .record_feedback(FeedbackRequest {
            order_id: order.id,
            delivery_agent_id: agent_id,
            rating: Some(4),
            comment: "still warm".into(),
        })
        .await
        .unwrap();
    assert!(outcome.bonus.is_ok());
    assert_eq!(outcome.agent_rating, Ok(dec!(4)));

    system.shutdown().await.unwrap();
    assert!(broker.publish(ORDER_CREATED_QUEUE, vec![]).await.is_err());
}

#[tokio::test]
async fn test_invalid_selection_is_dead_lettered() {
    let (store, _store_task) = InMemoryCartStore::spawn(16);
    let broker = InMemoryBroker::new();
    let system = DeliverySystem::start(&Config::for_test(), Arc::new(store), Arc::new(broker.clone()));

    let publisher = EventPublisher::new(Arc::new(broker.clone()), Duration::from_secs(1));
    publisher
        .publish(MENU_ITEM_SELECTED_QUEUE, &selection("Burger", dec!(9.99), 0))
        .await
        .unwrap();

    let dlq = dead_letter_queue(MENU_ITEM_SELECTED_QUEUE);
    let (probe, dlq) = (&broker, &dlq);
    eventually(move || async move { (probe.backlog(dlq).len() == 1).then_some(()) }).await;
    assert!(system.cart.view_cart(21).await.is_err());
    assert_eq!(broker.stats(MENU_ITEM_SELECTED_QUEUE).requeued, 0);

    system.shutdown().await.unwrap();
}
