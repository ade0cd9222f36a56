//! Unit tests for realtime crate

#[cfg(test)]
mod event_tests {
    use crate::event::{ClientEvent, NewMessage, ServerEvent};
    use crate::hub::encode;
    use kernel::id::{CartId, ProductId};

    #[test]
    fn test_client_envelopes() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"event":"registerUser","data":"ana"}"#).unwrap();
        assert_eq!(event, ClientEvent::RegisterUser("ana".into()));

        let event: ClientEvent = serde_json::from_str(r#"{"event":"getProducts"}"#).unwrap();
        assert_eq!(event, ClientEvent::GetProducts);

        let event: ClientEvent =
            serde_json::from_str(r#"{"event":"deleteProduct","data":"3"}"#).unwrap();
        assert_eq!(event, ClientEvent::DeleteProduct(ProductId::from_seq(3)));

        let event: ClientEvent = serde_json::from_str(
            r#"{"event":"addToCart","data":{"cartId":1,"productId":2}}"#,
        )
        .unwrap();
        match event {
            ClientEvent::AddToCart(add) => {
                assert_eq!(add.cart_id, CartId::from_seq(1));
                assert_eq!(add.quantity, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_new_message_shapes() {
        for raw in [
            r#"{"event":"newMessage","data":{"user":"x","text":"hola"}}"#,
            r#"{"event":"newMessage","data":"hola"}"#,
        ] {
            match serde_json::from_str::<ClientEvent>(raw).unwrap() {
                ClientEvent::NewMessage(msg) => assert_eq!(msg.into_text(), "hola"),
                other => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(
            NewMessage::Text("a".into()).into_text(),
            NewMessage::Object { text: "a".into() }.into_text()
        );
    }

    #[test]
    fn test_server_envelope() {
        let frame = encode(&ServerEvent::ProductDeleted("ok".into())).unwrap();
        let value: serde_json::Value = serde_json::from_str(frame.as_str()).unwrap();
        assert_eq!(value["event"], "productDeleted");
        assert_eq!(value["data"], "ok");
    }
}

#[cfg(test)]
mod hub_tests {
    use crate::event::ServerEvent;
    use crate::hub::RealtimeHub;
    use tokio::sync::broadcast::error::TryRecvError;

    #[test]
    fn test_every_subscriber_receives() {
        let hub = RealtimeHub::new(8);
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);

        hub.publish(&ServerEvent::Error("x".into()));

        assert!(a.try_recv().unwrap().as_str().contains("\"error\""));
        assert!(b.try_recv().unwrap().as_str().contains("\"error\""));
    }

    #[test]
    fn test_publish_without_subscribers_is_harmless() {
        let hub = RealtimeHub::new(8);
        hub.publish(&ServerEvent::Error("nobody".into()));
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn test_slow_subscriber_skips() {
        let hub = RealtimeHub::new(2);
        let mut rx = hub.subscribe();
        for i in 0..5 {
            hub.publish(&ServerEvent::Error(i.to_string()));
        }

        assert!(matches!(rx.try_recv(), Err(TryRecvError::Lagged(3))));
        // Continues with the oldest retained event
        assert!(rx.try_recv().unwrap().as_str().contains("\"3\""));
    }
}

#[cfg(test)]
mod session_tests {
    use crate::chat::ChatLog;
    use crate::config::RealtimeConfig;
    use crate::event::{ClientEvent, ServerEvent};
    use crate::hub::RealtimeHub;
    use crate::session::{RealtimeState, Session};
    use axum::extract::ws::Utf8Bytes;
    use catalog::domain::entity::ProductDraft;
    use catalog::domain::repository::ProductRepository;
    use catalog::{FileCartRepository, FileProductRepository, ProductBroadcaster};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::sync::broadcast::Receiver;

    type State = RealtimeState<FileProductRepository, FileCartRepository>;

    fn setup() -> (TempDir, State) {
        let dir = TempDir::new().unwrap();
        let state = RealtimeState {
            hub: Arc::new(RealtimeHub::new(64)),
            chat: Arc::new(ChatLog::new()),
            products: Arc::new(FileProductRepository::in_dir(dir.path())),
            carts: Arc::new(FileCartRepository::in_dir(dir.path())),
            config: Arc::new(RealtimeConfig::default()),
        };
        (dir, state)
    }

    fn next(rx: &mut Receiver<Utf8Bytes>) -> Value {
        serde_json::from_str(rx.try_recv().unwrap().as_str()).unwrap()
    }

    fn game(code: &str) -> ProductDraft {
        serde_json::from_value(json!({
            "title": "Game",
            "description": "desc",
            "price": 10,
            "code": code,
            "stock": 5,
            "category": "Videojuego"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_register_replies_with_log_only_to_caller() {
        let (_dir, state) = setup();
        let mut rx = state.hub.subscribe();
        let mut session = Session::new(state.clone());

        let replies = session
            .handle(ClientEvent::RegisterUser(" ana ".into()))
            .await;

        assert!(matches!(replies.as_slice(), [ServerEvent::MessageList(log)] if log.is_empty()));
        assert_eq!(session.user(), Some("ana"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_messages_broadcast_whole_log() {
        let (_dir, state) = setup();
        let mut rx = state.hub.subscribe();
        let mut anonymous = Session::new(state.clone());
        let mut ana = Session::new(state.clone());
        ana.handle(ClientEvent::RegisterUser("ana".into())).await;

        let replies = anonymous
            .handle_text(r#"{"event":"newMessage","data":{"text":"hola"}}"#)
            .await;
        assert!(replies.is_empty());
        let first = next(&mut rx);
        assert_eq!(first["event"], "messageList");
        assert_eq!(first["data"][0]["user"], "Anónimo");

        ana.handle_text(r#"{"event":"newMessage","data":"buenas"}"#)
            .await;
        let second = next(&mut rx);
        assert_eq!(second["data"].as_array().unwrap().len(), 2);
        assert_eq!(second["data"][1], json!({ "user": "ana", "text": "buenas" }));
        assert_eq!(state.chat.len().await, 2);
    }

    fn drain(rx: &mut Receiver<Utf8Bytes>) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(serde_json::from_str(frame.as_str()).unwrap());
        }
        frames
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_messages_publish_in_order() {
        let (_dir, state) = setup();
        let mut rx = state.hub.subscribe();

        let senders: Vec<_> = (0..16)
            .map(|n| {
                let mut session = Session::new(state.clone());
                tokio::spawn(async move {
                    let frame = json!({ "event": "newMessage", "data": format!("m{}", n) });
                    session.handle_text(&frame.to_string()).await
                })
            })
            .collect();
        for sender in senders {
            assert!(sender.await.unwrap().is_empty());
        }

        let lengths: Vec<usize> = drain(&mut rx)
            .iter()
            .map(|frame| frame["data"].as_array().unwrap().len())
            .collect();
        assert_eq!(lengths, (1..=16).collect::<Vec<_>>());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_last_product_broadcast_matches_store() {
        let (_dir, state) = setup();
        let mut session = Session::new(state.clone());
        for n in 0..8 {
            session
                .handle(ClientEvent::AddProduct(game(&format!("G{}", n))))
                .await;
        }
        let mut rx = state.hub.subscribe();

        let deleters: Vec<_> = (1..=8)
            .map(|id| {
                let mut session = Session::new(state.clone());
                tokio::spawn(async move {
                    let frame = json!({ "event": "deleteProduct", "data": id });
                    session.handle_text(&frame.to_string()).await
                })
            })
            .collect();
        for deleter in deleters {
            deleter.await.unwrap();
        }

        let frames = drain(&mut rx);
        let last = frames.last().unwrap();
        assert_eq!(last["event"], "updateProducts");

        let stored = state.products.find_all().await.unwrap();
        assert_eq!(last["data"], serde_json::to_value(&stored).unwrap());
    }

    #[tokio::test]
    async fn test_blank_message_rejected() {
        let (_dir, state) = setup();
        let mut session = Session::new(state.clone());

        let replies = session
            .handle_text(r#"{"event":"newMessage","data":"   "}"#)
            .await;

        assert!(matches!(replies.as_slice(), [ServerEvent::Error(_)]));
        assert!(state.chat.is_empty().await);
    }

    #[tokio::test]
    async fn test_add_and_delete_product() {
        let (_dir, state) = setup();
        let mut rx = state.hub.subscribe();
        let mut session = Session::new(state.clone());

        let replies = session.handle(ClientEvent::AddProduct(game("ABC"))).await;
        assert!(matches!(replies.as_slice(), [ServerEvent::ProductAdded(msg)] if msg.contains("Game")));
        let update = next(&mut rx);
        assert_eq!(update["event"], "updateProducts");
        assert_eq!(update["data"][0]["code"], "ABC");

        let replies = session.handle(ClientEvent::AddProduct(game("abc"))).await;
        assert!(matches!(replies.as_slice(), [ServerEvent::Error(msg)] if msg.contains("already exists")));
        assert!(rx.try_recv().is_err());

        let replies = session
            .handle_text(r#"{"event":"deleteProduct","data":1}"#)
            .await;
        assert!(matches!(replies.as_slice(), [ServerEvent::ProductDeleted(_)]));
        assert_eq!(next(&mut rx)["data"], json!([]));

        let replies = session
            .handle_text(r#"{"event":"deleteProduct","data":1}"#)
            .await;
        assert!(matches!(replies.as_slice(), [ServerEvent::Error(msg)] if msg == "Product not found"));
    }

    #[tokio::test]
    async fn test_get_products_replies_to_caller() {
        let (_dir, state) = setup();
        let mut session = Session::new(state.clone());
        session.handle(ClientEvent::AddProduct(game("A1"))).await;
        let mut rx = state.hub.subscribe();

        let replies = session.handle(ClientEvent::GetProducts).await;

        assert!(matches!(replies.as_slice(), [ServerEvent::UpdateProducts(list)] if list.len() == 1));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_add_to_cart_broadcasts_cart() {
        let (_dir, state) = setup();
        let mut session = Session::new(state.clone());
        session.handle(ClientEvent::AddProduct(game("A1"))).await;
        catalog::ManageCartsUseCase::new(state.carts.clone(), state.products.clone())
            .create()
            .await
            .unwrap();
        let mut rx = state.hub.subscribe();

        for _ in 0..2 {
            let replies = session
                .handle_text(r#"{"event":"addToCart","data":{"cartId":1,"productId":1,"quantity":2}}"#)
                .await;
            assert!(replies.is_empty());
        }

        next(&mut rx);
        let update = next(&mut rx);
        assert_eq!(update["event"], "cartUpdated");
        assert_eq!(update["data"]["products"][0]["quantity"], 4);
        assert_eq!(update["data"]["total"], 40.0);
    }

    #[tokio::test]
    async fn test_garbage_frame_is_error_event() {
        let (_dir, state) = setup();
        let mut session = Session::new(state);

        let replies = session.handle_text("not json").await;
        assert!(matches!(replies.as_slice(), [ServerEvent::Error(msg)] if msg.starts_with("Invalid event")));

        let replies = session.handle_text(r#"{"event":"dance"}"#).await;
        assert!(matches!(replies.as_slice(), [ServerEvent::Error(_)]));
    }

    #[tokio::test]
    async fn test_http_writes_reach_subscribers() {
        use axum::body::Body;
        use axum::http::{Request, StatusCode, header};
        use tower::ServiceExt;

        let (_dir, state) = setup();
        let mut rx = state.hub.subscribe();
        let broadcaster: Arc<dyn ProductBroadcaster> = state.hub.clone();
        let app = catalog::catalog_router(
            state.products.clone(),
            state.carts.clone(),
            catalog::CatalogConfig::default(),
            broadcaster,
        );

        let body = json!({
            "title": "Game",
            "description": "desc",
            "price": 10,
            "code": "ABC",
            "stock": 5,
            "category": "Videojuego"
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/products")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let update = next(&mut rx);
        assert_eq!(update["event"], "updateProducts");
        assert_eq!(update["data"].as_array().unwrap().len(), 1);
    }
}
