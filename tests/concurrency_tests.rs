use chrono::{DateTime, TimeZone, Utc};
use slotbook::application::engine::BookingEngine;
use slotbook::domain::order::{Money, OrderStatus, RequesterId};
use slotbook::domain::settings::BookingSettings;
use slotbook::error::BookingError;
use slotbook::infrastructure::in_memory::{
    InMemoryOrderStore, InMemorySlotStore, ManualClock, OpenAvailability, StaticSettings,
};
use std::sync::Arc;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
}

fn slot(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
}

fn booking_engine(hold_minutes: u32) -> Arc<BookingEngine> {
    Arc::new(BookingEngine::new(
        Box::new(InMemorySlotStore::new()),
        Box::new(InMemoryOrderStore::new()),
        Box::new(StaticSettings::new(BookingSettings {
            hold_minutes,
            price_per_hour: Money::ZERO,
            pay_qr_url: String::new(),
        })),
        Box::new(OpenAvailability),
        Box::new(ManualClock::new(base_time())),
    ))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reservations_one_winner_per_slot() {
    let engine = booking_engine(15);
    let target = slot(10);

    let mut handles = Vec::new();
    for i in 0..16 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .reserve(RequesterId::new(format!("user{i}")), target)
                .await
        }));
    }

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(order) => {
                winners += 1;
                assert_eq!(order.start_time, target);
            }
            Err(err) => assert!(matches!(err, BookingError::SlotUnavailable(_))),
        }
    }
    assert_eq!(winners, 1);

    let slots = engine.list_slots(None).await.unwrap();
    assert!(!slots[0].available);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reservations_one_active_order_per_requester() {
    let engine = booking_engine(15);
    let alice = RequesterId::from("alice");

    let mut handles = Vec::new();
    for i in 0..8 {
        let engine = engine.clone();
        let requester = alice.clone();
        handles.push(tokio::spawn(async move {
            engine.reserve(requester, slot(10 + i)).await
        }));
    }

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(err) => assert!(matches!(err, BookingError::ActiveReservationExists(_))),
        }
    }
    assert_eq!(winners, 1);

    let active: Vec<_> = engine
        .list_orders(&alice)
        .await
        .unwrap()
        .into_iter()
        .filter(|order| order.is_active())
        .collect();
    assert_eq!(active.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancel_and_expiry_race_yields_one_terminal_state() {
    let engine = booking_engine(0);
    let alice = RequesterId::from("alice");

    let order = engine.reserve(alice.clone(), slot(10)).await.unwrap();

    let cancel_engine = engine.clone();
    let cancel = tokio::spawn(async move { cancel_engine.cancel(order.id).await });
    let sweep_engine = engine.clone();
    let sweep = tokio::spawn(async move { sweep_engine.expire_due().await });

    let cancel_result = cancel.await.unwrap();
    let swept = sweep.await.unwrap().unwrap();

    let terminal = engine.get_order(order.id).await.unwrap().unwrap();
    match (&cancel_result, swept) {
        // Cancel won; the sweep observed the terminal order and skipped it.
        (Ok(()), 0) => assert_eq!(terminal.status, OrderStatus::Cancelled),
        // The sweep won; cancel saw a terminal order.
        (Err(BookingError::InvalidTransition { .. }), 1) => {
            assert_eq!(terminal.status, OrderStatus::Expired)
        }
        other => panic!("inconsistent race outcome: {other:?}"),
    }

    // Either way the slot is free again and the requester has no active order.
    let slots = engine.list_slots(Some(&alice)).await.unwrap();
    assert!(slots[0].available);
    assert!(engine.active_order(&alice).await.unwrap().is_none());
}
