use food_delivery::broker::{
    spawn_consumer, Broker, ConsumerSettings, EventHandler, EventPublisher, HandlerError,
    InMemoryBroker, QueueStats,
};
use food_delivery::cart::{AddItem, CartEngine, CartError, CartSettings};
use food_delivery::cart_store::InMemoryCartStore;
use food_delivery::clients::{FeeClient, OrderItemClient};
use food_delivery::events::{dead_letter_queue, Event, PublishedCart, ORDER_CREATED_QUEUE};
use food_delivery::model::{Cart, Fee, OrderItem, OrderItemId, OrderStatus};
use food_delivery::records::RecordError;
use food_delivery::repository::OrderRepository;
use food_delivery::saga::{OrderAssemblySaga, SagaError, SagaSettings};
use resource_actor::mock::MockClient;
use resource_actor::{ActorClient, FrameworkError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

fn cart_engine(broker: &InMemoryBroker) -> CartEngine {
    let (store, _task) = InMemoryCartStore::spawn(16);
    CartEngine::new(
        Arc::new(store),
        EventPublisher::new(Arc::new(broker.clone()), Duration::from_secs(1)),
        CartSettings::default(),
    )
}

fn dish(name: &str, price: Decimal, quantity: i64) -> AddItem {
    AddItem {
        customer_id: 42,
        restaurant_id: 3,
        name: name.into(),
        price,
        quantity,
    }
}

/// Burger 9.99 x2 + Fries 6.00 x1: total 25.98, VAT 5.20.
async fn two_item_cart(engine: &CartEngine) -> PublishedCart {
    engine.add_item(dish("Burger", dec!(9.99), 2)).await.unwrap();
    engine.add_item(dish("Fries", dec!(6.00), 1)).await.unwrap();
    engine.publish_cart(42, "extra ketchup").await.unwrap()
}

async fn wait_for(broker: &InMemoryBroker, queue: &str, done: impl Fn(QueueStats) -> bool) {
    for _ in 0..200 {
        if done(broker.stats(queue)) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting on {queue}: {:?}", broker.stats(queue));
}

#[tokio::test]
async fn test_two_item_cart_becomes_pending_order() {
    let broker = InMemoryBroker::new();
    let engine = cart_engine(&broker);
    let (repo, _actors) = OrderRepository::spawn(8);
    let saga = OrderAssemblySaga::new(repo.clone(), engine.clone(), SagaSettings::default());

    let published = two_item_cart(&engine).await;
    assert_eq!(published.total_amount, dec!(25.98));
    assert_eq!(published.vat_amount, dec!(5.2));

    let report = saga.assemble(published).await.unwrap();
    assert_eq!(report.created_items.len(), 2);
    assert!(report.skipped_items.is_empty());
    assert!(report.cart_released);

    let order = repo.orders.fetch(report.order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.fee_id, Some(report.fee_id));
    assert_eq!(order.customer_id, 42);
    assert_eq!(order.comment, "extra ketchup");
    assert!(order.delivery_agent_id.is_none());

    let items = repo.items.for_order(report.order_id).await.unwrap();
    let items_total: Decimal = items.iter().map(OrderItem::line_total).sum();
    assert_eq!(items_total, order.total_amount);

    // 25.98 - 5.20 = 20.78, 6% bracket
    let fee = repo.fees.fetch(report.fee_id).await.unwrap();
    assert_eq!(fee.percentage, dec!(0.06));
    assert_eq!(fee.amount, dec!(1.25));

    assert!(matches!(engine.view_cart(42).await, Err(CartError::CartNotFound(42))));
}

#[tokio::test]
async fn test_cart_kept_when_release_disabled() {
    let broker = InMemoryBroker::new();
    let engine = cart_engine(&broker);
    let (repo, _actors) = OrderRepository::spawn(8);
    let saga = OrderAssemblySaga::new(
        repo,
        engine.clone(),
        SagaSettings {
            clear_cart_after_assembly: false,
        },
    );

    let report = saga.assemble(two_item_cart(&engine).await).await.unwrap();
    assert!(!report.cart_released);
    assert_eq!(engine.view_cart(42).await.unwrap().items.len(), 2);
}

#[tokio::test]
async fn test_fee_failure_aborts_before_order() {
    let broker = InMemoryBroker::new();
    let engine = cart_engine(&broker);
    let (real, _actors) = OrderRepository::spawn(8);

    let mut fees = MockClient::<Fee>::new();
    fees.expect_create().return_err(FrameworkError::ActorClosed);
    let repo = OrderRepository {
        fees: FeeClient::new(fees.client()),
        ..real.clone()
    };
    let saga = OrderAssemblySaga::new(repo, engine.clone(), SagaSettings::default());

    let err = saga.assemble(two_item_cart(&engine).await).await.unwrap_err();
    assert!(matches!(err, SagaError::Fee(_)));
    assert!(matches!(HandlerError::from(err), HandlerError::Transient(_)));

    assert!(real.orders.find(|_| true).await.unwrap().is_empty());
    // Nothing was assembled, so the cart is still there for the retry.
    assert_eq!(engine.view_cart(42).await.unwrap().items.len(), 2);
    fees.verify();
}

#[tokio::test]
async fn test_failing_item_is_skipped() {
    let broker = InMemoryBroker::new();
    let engine = cart_engine(&broker);
    let (real, _actors) = OrderRepository::spawn(8);

    let mut items = MockClient::<OrderItem>::new();
    items.expect_create().return_ok(OrderItemId(1));
    items.expect_create().return_err(FrameworkError::EntityError(Box::new(
        RecordError::InvalidQuantity("Fries".into()),
    )));
    let repo = OrderRepository {
        items: OrderItemClient::new(items.client()),
        ..real.clone()
    };
    let saga = OrderAssemblySaga::new(repo, engine.clone(), SagaSettings::default());

    let report = saga.assemble(two_item_cart(&engine).await).await.unwrap();
    assert_eq!(report.created_items, vec![OrderItemId(1)]);
    assert_eq!(report.skipped_items, vec!["Fries".to_string()]);
    assert!(report.cart_released);

    let order = real.orders.fetch(report.order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    items.verify();
}

#[tokio::test]
async fn test_duplicate_delivery_creates_second_order() {
    let broker = InMemoryBroker::new();
    let engine = cart_engine(&broker);
    let (repo, _actors) = OrderRepository::spawn(8);
    let saga = OrderAssemblySaga::new(repo.clone(), engine.clone(), SagaSettings::default());

    let published = two_item_cart(&engine).await;
    let first = saga.assemble(published.clone()).await.unwrap();
    let second = saga.assemble(published).await.unwrap();

    assert_ne!(first.order_id, second.order_id);
    assert!(first.cart_released);
    assert!(!second.cart_released);
    assert_eq!(repo.orders.find(|_| true).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_redelivered_order_keeps_newer_cart() {
    let broker = InMemoryBroker::new();
    let engine = cart_engine(&broker);
    let (repo, _actors) = OrderRepository::spawn(8);
    let saga = OrderAssemblySaga::new(repo, engine.clone(), SagaSettings::default());

    engine.add_item(dish("Burger", dec!(9.99), 1)).await.unwrap();
    let published = engine.publish_cart(42, "").await.unwrap();
    assert!(saga.assemble(published.clone()).await.unwrap().cart_released);

    engine.add_item(dish("Salad", dec!(7.50), 1)).await.unwrap();
    let again = saga.assemble(published).await.unwrap();

    assert!(!again.cart_released);
    let cart = engine.view_cart(42).await.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].name, "Salad");
}

#[tokio::test]
async fn test_item_added_after_publishing_survives_assembly() {
    let broker = InMemoryBroker::new();
    let engine = cart_engine(&broker);
    let (repo, _actors) = OrderRepository::spawn(8);
    let saga = OrderAssemblySaga::new(repo.clone(), engine.clone(), SagaSettings::default());

    let published = two_item_cart(&engine).await;
    engine.add_item(dish("Cola", dec!(2.50), 1)).await.unwrap();

    let report = saga.assemble(published).await.unwrap();
    assert!(!report.cart_released);
    assert_eq!(report.created_items.len(), 2);
    assert_eq!(engine.view_cart(42).await.unwrap().items.len(), 3);
}

#[tokio::test]
async fn test_consumer_dead_letters_malformed_and_failed_orders() {
    let broker = InMemoryBroker::new();
    let engine = cart_engine(&broker);
    let (real, _actors) = OrderRepository::spawn(8);

    // Two attempts (first delivery plus one redelivery), both failing.
    let mut fees = MockClient::<Fee>::new();
    fees.expect_create().return_err(FrameworkError::ActorClosed);
    fees.expect_create().return_err(FrameworkError::ActorClosed);
    let repo = OrderRepository {
        fees: FeeClient::new(fees.client()),
        ..real.clone()
    };
    let saga = Arc::new(OrderAssemblySaga::new(repo, engine.clone(), SagaSettings::default()));

    let (stop, shutdown) = watch::channel(false);
    let consumer = spawn_consumer(
        Arc::new(broker.clone()),
        ORDER_CREATED_QUEUE,
        saga,
        ConsumerSettings { max_redeliveries: 1 },
        shutdown,
    );

    broker
        .publish(
            ORDER_CREATED_QUEUE,
            br#"{"type":"order_created","payload":{"customerId":"x"}}"#.to_vec(),
        )
        .await
        .unwrap();
    wait_for(&broker, ORDER_CREATED_QUEUE, |s| s.dead_lettered == 1).await;

    two_item_cart(&engine).await;
    wait_for(&broker, ORDER_CREATED_QUEUE, |s| s.dead_lettered == 2).await;

    let stats = broker.stats(ORDER_CREATED_QUEUE);
    assert_eq!(stats.requeued, 1);
    assert_eq!(stats.acked, 0);
    assert_eq!(broker.backlog(&dead_letter_queue(ORDER_CREATED_QUEUE)).len(), 2);
    assert!(real.orders.find(|_| true).await.unwrap().is_empty());
    fees.verify();

    stop.send(true).unwrap();
    consumer.await.unwrap();
}

#[tokio::test]
async fn test_non_order_event_is_rejected() {
    let broker = InMemoryBroker::new();
    let engine = cart_engine(&broker);
    let (repo, _actors) = OrderRepository::spawn(8);
    let saga = OrderAssemblySaga::new(repo, engine, SagaSettings::default());

    let result = saga
        .handle(Event::CartUpdated(Cart::new(1, 1)))
        .await;
    assert!(matches!(result, Err(HandlerError::Rejected(_))));
}
