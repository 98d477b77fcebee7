//! Shared fixtures: in-memory gateway and checkout fakes whose calls can be
//! held open, so tests control exactly when each response arrives.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

use storefront::config::{BackendSettings, PresentationSettings, ServerSettings, Settings};
use storefront::dtos::NewProduct;
use storefront::error::StorefrontError;
use storefront::models::{Payment, PaymentId, PaymentStatus, Product, ProductId};
use storefront::services::{CheckoutInitiator, CheckoutRedirect, InventoryGateway};
use storefront::shell::Storefront;
use storefront_core::observability::init_test_tracing;

pub fn product(id: i64, name: &str, available_quantity: u32) -> Product {
    Product {
        id: ProductId(id),
        name: name.to_string(),
        description: format!("{} description", name),
        price: 12.5,
        available_quantity,
        picture_url: None,
    }
}

pub fn payment(id: i64, product_id: i64, status: &str) -> Payment {
    Payment {
        id: PaymentId(id),
        product_id: ProductId(product_id),
        amount: 25.0,
        quantity: 2,
        status: PaymentStatus::parse(status),
        timestamp: None,
        session_id: Some(format!("cs_test_{}", id)),
    }
}

pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        backend: BackendSettings {
            base_url: "http://localhost:0".to_string(),
            request_timeout_secs: 2,
        },
        presentation: PresentationSettings::default(),
        telemetry: Default::default(),
    }
}

/// A response the fake hands out once, optionally held until released.
struct Scripted<T> {
    gate: Option<oneshot::Receiver<()>>,
    result: Result<T, StorefrontError>,
}

/// Release handle for a held call.
pub struct Gate(oneshot::Sender<()>);

impl Gate {
    pub fn release(self) {
        let _ = self.0.send(());
    }
}

fn gate() -> (Gate, oneshot::Receiver<()>) {
    let (tx, rx) = oneshot::channel();
    (Gate(tx), rx)
}

async fn wait_gate(gate: Option<oneshot::Receiver<()>>) {
    if let Some(rx) = gate {
        let _ = rx.await;
    }
}

/// In-memory backend. Unscripted calls answer from the current catalog, and
/// successful stock writes change it, the way the real service would.
#[derive(Default)]
pub struct FakeGateway {
    products: Mutex<Vec<Product>>,
    payments: Mutex<Vec<Payment>>,
    list_script: Mutex<VecDeque<Scripted<Vec<Product>>>>,
    payments_script: Mutex<VecDeque<Scripted<Vec<Payment>>>>,
    write_script: Mutex<VecDeque<Scripted<()>>>,
    pub list_calls: AtomicUsize,
    pub payments_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub stock_calls: AtomicUsize,
    pub created: Mutex<Vec<NewProduct>>,
}

impl FakeGateway {
    pub fn with_products(products: Vec<Product>) -> Arc<Self> {
        let gateway = Self::default();
        *gateway.products.lock().unwrap() = products;
        Arc::new(gateway)
    }

    pub fn set_payments(&self, payments: Vec<Payment>) {
        *self.payments.lock().unwrap() = payments;
    }

    /// Next product listing fails with `err`.
    pub fn fail_next_list(&self, err: StorefrontError) {
        self.list_script.lock().unwrap().push_back(Scripted {
            gate: None,
            result: Err(err),
        });
    }

    /// Next product listing waits for the returned gate, then answers `products`.
    pub fn hold_next_list(&self, products: Vec<Product>) -> Gate {
        let (handle, rx) = gate();
        self.list_script.lock().unwrap().push_back(Scripted {
            gate: Some(rx),
            result: Ok(products),
        });
        handle
    }

    pub fn fail_next_payments(&self, err: StorefrontError) {
        self.payments_script.lock().unwrap().push_back(Scripted {
            gate: None,
            result: Err(err),
        });
    }

    /// Next create/stock write waits for the gate before succeeding.
    pub fn hold_next_write(&self) -> Gate {
        let (handle, rx) = gate();
        self.write_script.lock().unwrap().push_back(Scripted {
            gate: Some(rx),
            result: Ok(()),
        });
        handle
    }

    pub fn fail_next_write(&self, err: StorefrontError) {
        self.write_script.lock().unwrap().push_back(Scripted {
            gate: None,
            result: Err(err),
        });
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    async fn next_write(&self) -> Result<(), StorefrontError> {
        let scripted = self.write_script.lock().unwrap().pop_front();
        match scripted {
            Some(Scripted { gate, result }) => {
                wait_gate(gate).await;
                result
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl InventoryGateway for FakeGateway {
    async fn list_products(&self) -> Result<Vec<Product>, StorefrontError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.list_script.lock().unwrap().pop_front();
        match scripted {
            Some(Scripted { gate, result }) => {
                wait_gate(gate).await;
                result
            }
            None => Ok(self.products.lock().unwrap().clone()),
        }
    }

    async fn create_product(&self, product: NewProduct) -> Result<(), StorefrontError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.next_write().await?;

        let mut products = self.products.lock().unwrap();
        let id = products.iter().map(|p| p.id.0).max().unwrap_or(0) + 1;
        products.push(Product {
            id: ProductId(id),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            available_quantity: product.available_quantity,
            picture_url: product.image.as_ref().map(|i| i.file_name.clone()),
        });
        self.created.lock().unwrap().push(product);
        Ok(())
    }

    async fn update_stock(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), StorefrontError> {
        self.stock_calls.fetch_add(1, Ordering::SeqCst);
        self.next_write().await?;

        let mut products = self.products.lock().unwrap();
        match products.iter_mut().find(|p| p.id == product_id) {
            Some(product) => {
                product.available_quantity = quantity;
                Ok(())
            }
            None => Err(StorefrontError::NotFound(product_id)),
        }
    }

    async fn list_payments(&self) -> Result<Vec<Payment>, StorefrontError> {
        self.payments_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.payments_script.lock().unwrap().pop_front();
        match scripted {
            Some(Scripted { gate, result }) => {
                wait_gate(gate).await;
                result
            }
            None => Ok(self.payments.lock().unwrap().clone()),
        }
    }
}

pub struct FakeCheckout {
    result: Mutex<Result<CheckoutRedirect, StorefrontError>>,
    pub calls: AtomicUsize,
    pub last: Mutex<Option<(ProductId, i64)>>,
}

impl FakeCheckout {
    pub fn redirecting_to(url: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Mutex::new(Ok(CheckoutRedirect {
                url: url.to_string(),
            })),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }

    pub fn failing_with(err: StorefrontError) -> Arc<Self> {
        Arc::new(Self {
            result: Mutex::new(Err(err)),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }
}

#[async_trait]
impl CheckoutInitiator for FakeCheckout {
    async fn create_checkout_session(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CheckoutRedirect, StorefrontError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((product_id, quantity));
        self.result.lock().unwrap().clone()
    }
}

pub struct TestStorefront {
    pub storefront: Storefront,
    pub gateway: Arc<FakeGateway>,
    pub checkout: Arc<FakeCheckout>,
}

impl TestStorefront {
    pub fn new(products: Vec<Product>) -> Self {
        Self::with_checkout(products, FakeCheckout::redirecting_to("https://checkout.test/cs_1"))
    }

    pub fn with_checkout(products: Vec<Product>, checkout: Arc<FakeCheckout>) -> Self {
        init_test_tracing();
        let gateway = FakeGateway::with_products(products);
        let storefront = Storefront::new(gateway.clone(), checkout.clone(), &test_settings());
        Self {
            storefront,
            gateway,
            checkout,
        }
    }
}

/// Poll `condition` while letting spawned tasks run. Panics after a second.
pub async fn eventually<F: Fn() -> bool>(condition: F) {
    let wait = async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    };
    tokio::time::timeout(Duration::from_secs(1), wait)
        .await
        .expect("condition not reached in time");
}
