//! The typed client and its entity stores against a live server.

mod common;

use assert_matches::assert_matches;
use common::{TestApp, ADMIN_EMAIL, PASSWORD, SALES_EMAIL};
use enerlight_api::{
    client::{ApiClient, ClientError, EntityStore, OrderForm},
    models::{
        ClientResponse, CreateClientRequest, CreateProductRequest, OrderResponse,
        ProductResponse, UpdateOrderRequest, UpdateProductRequest, UserResponse,
    },
};
use reqwest::StatusCode;
use rust_decimal_macros::dec;
use tokio::{net::TcpListener, task::JoinHandle};
use uuid::Uuid;

struct LiveServer {
    _app: TestApp,
    base_url: String,
    handle: JoinHandle<()>,
}

impl LiveServer {
    async fn start() -> Self {
        let app = TestApp::new().await;
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test port");
        let addr = listener.local_addr().expect("local addr");
        let router = app.router();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router.into_make_service())
                .await
                .expect("test server");
        });
        Self {
            _app: app,
            base_url: format!("http://{addr}"),
            handle,
        }
    }

    async fn client_as(&self, email: &str) -> ApiClient {
        let client = ApiClient::new(&self.base_url);
        client.login(email, PASSWORD).await.expect("login");
        client
    }
}

impl Drop for LiveServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn product_request(code: &str, convention_price: rust_decimal::Decimal) -> CreateProductRequest {
    CreateProductRequest {
        code: code.to_string(),
        name: format!("Produto {code}"),
        convention_price,
        sale_price: convention_price,
        ..Default::default()
    }
}

#[tokio::test]
async fn login_stores_the_token() {
    let server = LiveServer::start().await;
    let client = ApiClient::new(&server.base_url);
    assert!(client.token().await.is_none());

    let auth = client.login(ADMIN_EMAIL, PASSWORD).await.unwrap();
    assert_eq!(auth.user.email, ADMIN_EMAIL);
    assert_eq!(client.token().await.as_deref(), Some(auth.token.as_str()));

    let err = ApiClient::new(&server.base_url)
        .login(ADMIN_EMAIL, "senha-errada")
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
}

#[tokio::test]
async fn product_store_follows_confirmed_writes() {
    let server = LiveServer::start().await;
    let client = server.client_as(SALES_EMAIL).await;
    let mut products: EntityStore<ProductResponse> = EntityStore::new(client.clone());

    assert!(!products.is_loaded());
    assert!(products.fetch().await.unwrap().is_empty());
    assert!(products.is_loaded());

    let spot = products.create(&product_request("SPOT-45", dec!(45))).await.unwrap();
    let panel = products.create(&product_request("PAINEL-49", dec!(49))).await.unwrap();
    assert_eq!(products.snapshot().len(), 2);

    let updated = products
        .update(
            spot.id,
            &UpdateProductRequest {
                convention_price: Some(dec!(42.5)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.convention_price, dec!(42.5));
    assert_eq!(products.get(spot.id).unwrap().convention_price, dec!(42.5));

    products.delete(panel.id).await.unwrap();
    assert_eq!(products.snapshot().len(), 1);

    let mut other_view: EntityStore<ProductResponse> = EntityStore::new(client);
    let fetched = other_view.fetch().await.unwrap();
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].id, spot.id);
}

#[tokio::test]
async fn rejected_writes_leave_the_snapshot_alone() {
    let server = LiveServer::start().await;
    let client = server.client_as(SALES_EMAIL).await;
    let mut products: EntityStore<ProductResponse> = EntityStore::new(client.clone());

    products.create(&product_request("DUP-1", dec!(10))).await.unwrap();
    let before = products.snapshot().to_vec();

    let err = products
        .create(&product_request("DUP-1", dec!(99)))
        .await
        .unwrap_err();
    assert_matches!(err, ClientError::Api { status, .. } if status == StatusCode::CONFLICT);
    assert_eq!(products.snapshot(), before.as_slice());

    let err = products.delete(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(products.snapshot(), before.as_slice());

    let mut users: EntityStore<UserResponse> = EntityStore::new(client);
    let err = users.fetch().await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    assert!(users.snapshot().is_empty());
}

#[tokio::test]
async fn stale_snapshot_survives_a_failed_fetch() {
    let server = LiveServer::start().await;
    let client = server.client_as(ADMIN_EMAIL).await;
    let mut clients: EntityStore<ClientResponse> = EntityStore::new(client.clone());

    clients
        .create(&CreateClientRequest {
            name: "Construtora Alfa".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    clients.fetch().await.unwrap();

    client.logout().await;
    let err = clients.fetch().await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(clients.snapshot().len(), 1);
    assert_eq!(clients.snapshot()[0].name, "Construtora Alfa");
}

#[tokio::test]
async fn order_form_submits_and_edits_orders() {
    let server = LiveServer::start().await;
    let client = server.client_as(SALES_EMAIL).await;

    let mut products: EntityStore<ProductResponse> = EntityStore::new(client.clone());
    let mut clients: EntityStore<ClientResponse> = EntityStore::new(client.clone());
    let mut orders: EntityStore<OrderResponse> = EntityStore::new(client);

    let spot = products.create(&product_request("SPOT-45", dec!(45))).await.unwrap();
    let panel = products.create(&product_request("PAINEL-49", dec!(49))).await.unwrap();
    let customer = clients
        .create(&CreateClientRequest {
            name: "Hotel Beira-Mar".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let mut form = OrderForm::new();
    form.client_id = Some(customer.id);
    let a = form.add_line(&spot);
    let b = form.add_line(&panel);
    form.set_quantity(a, dec!(3)).unwrap();
    form.set_quantity(b, dec!(9)).unwrap();
    form.freight = dec!(200);
    assert_eq!(form.totals().unwrap().total, dec!(776));

    let created = form.submit(&mut orders).await.unwrap();
    assert_eq!(created.subtotal, dec!(576));
    assert_eq!(created.total, dec!(776));
    assert_eq!(created.client.name, "Hotel Beira-Mar");
    assert_eq!(created.items.len(), 2);
    assert_eq!(orders.snapshot().len(), 1);
    assert!(form.lines().is_empty());

    let mut edit = OrderForm::from_order(&created);
    assert_eq!(edit.totals().unwrap().total, created.total);
    edit.remove_line(0).unwrap();
    edit.set_discount(0, dec!(4)).unwrap();

    let updated = orders
        .update(created.id, &edit.to_update_payload())
        .await
        .unwrap();
    assert_eq!(updated.items.len(), 1);
    assert_eq!(updated.subtotal, dec!(405));
    assert_eq!(updated.total_discount, dec!(36));
    assert_eq!(updated.total, dec!(569));
    assert_eq!(orders.get(created.id).unwrap().total, dec!(569));

    let status_only = UpdateOrderRequest {
        status: Some(enerlight_api::entities::order::OrderStatus::Sent),
        ..Default::default()
    };
    let sent = orders.update(created.id, &status_only).await.unwrap();
    assert_eq!(sent.items.len(), 1);
    assert_eq!(sent.total, dec!(569));

    orders.delete(created.id).await.unwrap();
    assert!(orders.snapshot().is_empty());
    assert!(orders.fetch().await.unwrap().is_empty());
}

#[tokio::test]
async fn order_form_resaves_lines_whose_product_was_deleted() {
    let server = LiveServer::start().await;
    let client = server.client_as(ADMIN_EMAIL).await;

    let mut products: EntityStore<ProductResponse> = EntityStore::new(client.clone());
    let mut clients: EntityStore<ClientResponse> = EntityStore::new(client.clone());
    let mut orders: EntityStore<OrderResponse> = EntityStore::new(client);

    let kept = products.create(&product_request("PLAFON-30", dec!(30))).await.unwrap();
    let gone = products.create(&product_request("LED-10", dec!(10))).await.unwrap();
    let customer = clients
        .create(&CreateClientRequest {
            name: "Clínica Aurora".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let mut form = OrderForm::new();
    form.client_id = Some(customer.id);
    let a = form.add_line(&kept);
    let b = form.add_line(&gone);
    form.set_quantity(a, dec!(2)).unwrap();
    form.set_quantity(b, dec!(5)).unwrap();
    let created = form.submit(&mut orders).await.unwrap();

    products.delete(gone.id).await.unwrap();
    let reloaded = orders.fetch().await.unwrap()[0].clone();
    assert_eq!(reloaded.items[1].product_id, None);

    let mut edit = OrderForm::from_order(&reloaded);
    edit.freight = dec!(15);
    let saved = orders
        .update(created.id, &edit.to_update_payload())
        .await
        .unwrap();
    assert_eq!(saved.items.len(), 2);
    assert_eq!(saved.items[1].product_id, None);
    assert_eq!(saved.items[1].quantity, dec!(5));
    assert_eq!(saved.subtotal, dec!(110));
    assert_eq!(saved.total, dec!(125));
}
