//! Payment accounting. The store recomputes paid_amount and status inside
//! one transaction, so a bill can never double count.

use uuid::Uuid;

use florence::db::Database;
use florence::error::StoreError;
use florence::models::{BillInsert, BillItemInsert, BillStatus, BillUpdate, Payment};
use florence::store::{BillFilter, Store};

async fn store() -> Store {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    Store::new(&db)
}

fn bill_of(total: f64) -> BillInsert {
    BillInsert {
        patient_id: Uuid::new_v4(),
        doctor_id: None,
        appointment_id: None,
        date: "2026-08-04".parse().unwrap(),
        subtotal: total,
        discount: 0.0,
        total_amount: total,
        items: Vec::new(),
    }
}

fn cash(amount: f64) -> Payment {
    Payment {
        amount,
        payment_method: "Cash".to_string(),
        transaction_id: None,
    }
}

#[tokio::test]
async fn payments_accumulate_and_rederive_the_status() {
    let store = store().await;
    let bill = store.bills().create(bill_of(1000.0)).await.unwrap();
    assert_eq!(bill.paid_amount, 0.0);
    assert_eq!(bill.status, BillStatus::Unpaid);

    let after_first = store.bills().record_payment(bill.id, cash(400.0)).await.unwrap();
    assert_eq!(after_first.paid_amount, 400.0);
    assert_eq!(after_first.status, BillStatus::PartiallyPaid);

    let settled = store.bills().record_payment(bill.id, cash(600.0)).await.unwrap();
    assert_eq!(settled.paid_amount, 1000.0);
    assert_eq!(settled.status, BillStatus::Paid);
}

#[tokio::test]
async fn a_paid_bill_rejects_further_payments() {
    let store = store().await;
    let bill = store.bills().create(bill_of(500.0)).await.unwrap();
    store.bills().record_payment(bill.id, cash(500.0)).await.unwrap();

    let err = store.bills().record_payment(bill.id, cash(1.0)).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    // Nothing was double counted.
    let current = store.bills().get(bill.id).await.unwrap();
    assert_eq!(current.paid_amount, 500.0);
    assert_eq!(current.status, BillStatus::Paid);
}

#[tokio::test]
async fn overpayment_and_nonpositive_amounts_are_rejected() {
    let store = store().await;
    let bill = store.bills().create(bill_of(1000.0)).await.unwrap();

    let err = store.bills().record_payment(bill.id, cash(1200.0)).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let err = store.bills().record_payment(bill.id, cash(0.0)).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let current = store.bills().get(bill.id).await.unwrap();
    assert_eq!(current.paid_amount, 0.0);
    assert_eq!(current.status, BillStatus::Unpaid);
}

#[tokio::test]
async fn payment_against_a_missing_bill_is_not_found() {
    let store = store().await;
    let err = store
        .bills()
        .record_payment(Uuid::new_v4(), cash(100.0))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn line_items_are_stored_with_the_bill() {
    let store = store().await;
    let created = store
        .bills()
        .create(BillInsert {
            items: vec![
                BillItemInsert {
                    description: "Room charges".to_string(),
                    quantity: 3,
                    rate: 200.0,
                    amount: 600.0,
                },
                BillItemInsert {
                    description: "Lab tests".to_string(),
                    quantity: 1,
                    rate: 400.0,
                    amount: 400.0,
                },
            ],
            ..bill_of(1000.0)
        })
        .await
        .unwrap();

    assert_eq!(created.items.len(), 2);
    assert_eq!(created.items[0].description, "Room charges");
    assert!(created.items.iter().all(|item| item.bill_id == created.id));

    let listed = store
        .bills()
        .list(&BillFilter {
            patient_id: Some(created.patient_id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].items.len(), 2);
}

#[tokio::test]
async fn plain_patches_cannot_reach_the_money_fields() {
    let store = store().await;
    let bill = store.bills().create(bill_of(1000.0)).await.unwrap();
    store.bills().record_payment(bill.id, cash(250.0)).await.unwrap();

    let patched = store
        .bills()
        .update(
            bill.id,
            BillUpdate {
                discount: Some(50.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(patched.discount, 50.0);
    // The payment state is exactly as the payment operation left it.
    assert_eq!(patched.paid_amount, 250.0);
    assert_eq!(patched.status, BillStatus::PartiallyPaid);
}
