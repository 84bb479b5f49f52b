use super::admin::*;
use super::cart::*;
use super::chat::*;
use super::config::*;
use super::error::*;
use super::order::*;
use super::product::*;
use super::user::*;
use super::validation::*;
use super::view::*;

use chrono::{Duration, TimeZone, Utc};
use std::path::Path;

fn user(role: Role) -> User {
    User {
        id: 7,
        username: "sari".into(),
        email: "sari@example.com".into(),
        role,
        name: "Sari Wulandari".into(),
    }
}

fn item(id: &str, price: u64, quantity: u32) -> CartItem {
    CartItem {
        id: id.into(),
        name: format!("Product {id}"),
        brand: "Cetaphil".into(),
        price,
        quantity,
    }
}

#[test]
fn test_user_accepts_backend_shape() {
    let json = r#"{"id": 3, "username": "budi", "email": "b@x.id", "full_name": "Budi", "role": "admin"}"#;
    let u: User = serde_json::from_str(json).unwrap();
    assert_eq!(u.name, "Budi");
    assert!(u.is_admin());

    // Stored form round-trips through `name`
    let stored = serde_json::to_value(&u).unwrap();
    assert_eq!(stored["name"], "Budi");
    assert_eq!(stored["role"], "admin");
}

#[test]
fn test_unknown_role_reads_as_user() {
    let u: User =
        serde_json::from_str(r#"{"id": 1, "username": "x", "role": "moderator"}"#).unwrap();
    assert_eq!(u.role, Role::User);
    assert_eq!(u.display_name(), "x");

    let u: User =
        serde_json::from_str(r#"{"id": 2, "username": "y", "role": "superadmin"}"#).unwrap();
    assert_eq!(u.role, Role::User);
    assert_eq!(serde_json::to_value(Role::User).unwrap(), "user");
    assert_eq!(Role::default(), Role::User);
}

#[test]
fn test_cart_total() {
    let items = vec![item("1", 10_000, 2)];
    assert_eq!(cart_total(&items), 20_000);

    let items = vec![item("1", 150_000, 1), item("2", 320_000, 3)];
    assert_eq!(cart_total(&items), 1_110_000);
    assert_eq!(cart_item_count(&items), 4);
    assert_eq!(cart_total(&[]), 0);
}

#[test]
fn test_cart_item_numeric_id() {
    let parsed: CartItem = serde_json::from_str(
        r#"{"id": 1, "name": "Cleanser", "brand": "Cetaphil", "price": 10000, "quantity": 2}"#,
    )
    .unwrap();
    assert_eq!(parsed.id, "1");
    assert_eq!(parsed.subtotal(), 20_000);
}

#[test]
fn test_format_rupiah() {
    assert_eq!(format_rupiah(0), "Rp 0");
    assert_eq!(format_rupiah(999), "Rp 999");
    assert_eq!(format_rupiah(150_000), "Rp 150.000");
    assert_eq!(format_rupiah(1_110_000), "Rp 1.110.000");
}

#[test]
fn test_product_from_catalogue() {
    let json = r#"{
        "id": "1",
        "name": "Cetaphil Gentle Skin Cleanser",
        "price": 150000,
        "category": "Pembersih",
        "for_conditions": ["Jerawat", "Dermatitis"],
        "description": "Gentle cleanser",
        "ingredients": "Water",
        "usage": "Twice daily"
    }"#;
    let p: Product = serde_json::from_str(json).unwrap();
    assert_eq!(p.price, 150_000);
    assert_eq!(p.for_conditions.len(), 2);
    assert!(p.brand.is_none());

    let line = CartItem::from(&p);
    assert_eq!(line.quantity, 1);
    assert_eq!(line.brand, "");
}

#[test]
fn test_product_float_price() {
    let p: Product = serde_json::from_str(r#"{"id": 2, "name": "Toner", "price": 85000.0}"#).unwrap();
    assert_eq!(p.id, "2");
    assert_eq!(p.price, 85_000);

    assert!(serde_json::from_str::<Product>(r#"{"id": 2, "name": "T", "price": -1}"#).is_err());
}

fn msg(id: i64, text: &str, is_bot: bool) -> ChatMessage {
    if is_bot {
        ChatMessage::bot(id, text.into(), vec![])
    } else {
        ChatMessage::user(id, text.into())
    }
}

#[test]
fn test_title_from_first_user_message() {
    let messages = vec![
        msg(1, "Welcome! How can I help?", true),
        msg(2, "My skin is dry", false),
        msg(3, "Another question", false),
    ];
    assert_eq!(generate_title(&messages), "My skin is dry");
}

#[test]
fn test_title_truncated_to_forty_chars() {
    let long = "a".repeat(41);
    let title = generate_title(&[msg(1, &long, false)]);
    assert_eq!(title, format!("{}...", "a".repeat(40)));

    let exact = "b".repeat(40);
    assert_eq!(generate_title(&[msg(1, &exact, false)]), exact);
}

#[test]
fn test_title_counts_characters_not_bytes() {
    let text = "é".repeat(45);
    let title = generate_title(&[msg(1, &text, false)]);
    assert_eq!(title.chars().count(), 43);
    assert!(title.ends_with("..."));
}

#[test]
fn test_title_defaults_without_user_message() {
    assert_eq!(generate_title(&[]), DEFAULT_CHAT_TITLE);
    assert_eq!(generate_title(&[msg(1, "hello", true)]), DEFAULT_CHAT_TITLE);
}

#[test]
fn test_next_message_id_is_monotonic() {
    let far_future = Utc::now().timestamp_millis() + 60_000;
    let existing = vec![msg(far_future, "x", false)];
    assert_eq!(next_message_id(&existing), far_future + 1);

    let id = next_message_id(&[]);
    assert!(id > 0);
}

#[test]
fn test_chat_session_new() {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
    let s = ChatSession::new(now);
    assert_eq!(s.id, format!("chat_{}", now.timestamp_millis()));
    assert_eq!(s.title, DEFAULT_CHAT_TITLE);
    assert_eq!(s.message_count, 0);
    assert_eq!(s.created_at, s.last_updated);
}

#[test]
fn test_chat_json_uses_camel_case() {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
    let value = serde_json::to_value(ChatSession::new(now)).unwrap();
    assert!(value.get("lastUpdated").is_some());
    assert!(value.get("messageCount").is_some());

    let value = serde_json::to_value(msg(1, "hi", false)).unwrap();
    assert_eq!(value["isBot"], false);
    assert!(value.get("products").is_none());
}

#[test]
fn test_relative_label() {
    let now = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();
    assert_eq!(relative_label(now - Duration::seconds(30), now), "just now");
    assert_eq!(relative_label(now - Duration::minutes(5), now), "5m");
    assert_eq!(relative_label(now - Duration::hours(3), now), "3h");
    assert_eq!(relative_label(now - Duration::days(2), now), "2d");
    assert_eq!(relative_label(now - Duration::days(10), now), "10 May");
}

#[test]
fn test_router_admin_gate() {
    let mut router = Router::new();
    assert_eq!(router.current(), View::Home);

    assert_eq!(router.navigate(View::Admin, None), View::Home);
    assert_eq!(router.navigate(View::Admin, Some(&user(Role::User))), View::Home);
    assert_eq!(router.navigate(View::Admin, Some(&user(Role::Admin))), View::Admin);
    assert_eq!(router.current(), View::Admin);
}

#[test]
fn test_router_transitions() {
    let mut router = Router::new();
    assert_eq!(router.navigate(View::Products, None), View::Products);
    assert_eq!(router.navigate(View::AiChat, None), View::AiChat);

    router.on_register();
    assert_eq!(router.current(), View::Login);
    router.on_login();
    assert_eq!(router.current(), View::Home);

    router.navigate(View::Products, None);
    router.on_logout();
    assert_eq!(router.current(), View::Home);
}

#[test]
fn test_view_parsing() {
    for view in View::ALL {
        assert_eq!(view.as_str().parse::<View>().unwrap(), view);
    }
    assert_eq!("chat".parse::<View>().unwrap(), View::AiChat);
    assert!("settings".parse::<View>().is_err());
    assert_eq!(serde_json::to_string(&View::AiChat).unwrap(), "\"ai-chat\"");
}

#[test]
fn test_register_validation() {
    let mut form = RegisterForm {
        username: "sari".into(),
        email: "sari@example.com".into(),
        full_name: String::new(),
        password: "secret1".into(),
        confirm_password: "secret2".into(),
    };
    assert_eq!(validate_register(&form), Err(ValidationError::PasswordMismatch));

    form.password = "abc".into();
    form.confirm_password = "abc".into();
    assert_eq!(
        validate_register(&form),
        Err(ValidationError::PasswordTooShort(MIN_PASSWORD_LEN))
    );

    form.password = "abcdef".into();
    form.confirm_password = "abcdef".into();
    assert!(validate_register(&form).is_ok());

    form.email = "  ".into();
    assert_eq!(validate_register(&form), Err(ValidationError::Required("Email")));
}

#[test]
fn test_login_validation() {
    assert!(validate_login("sari", "pw").is_ok());
    assert_eq!(
        validate_login("", "pw"),
        Err(ValidationError::Required("Email or username"))
    );
    assert_eq!(validate_login("sari", ""), Err(ValidationError::Required("Password")));
}

#[test]
fn test_checkout_validation() {
    let mut form = CheckoutForm {
        shipping: ShippingAddress {
            full_name: "Sari".into(),
            phone: "0812".into(),
            address: "Jl. Merdeka 1".into(),
            city: "Bandung".into(),
            province: "Jawa Barat".into(),
            postal_code: String::new(),
        },
        payment_method: PaymentMethod::Cod,
    };
    assert!(validate_checkout(&form).is_ok());

    form.shipping.city.clear();
    assert_eq!(validate_checkout(&form), Err(ValidationError::Required("City")));
}

#[test]
fn test_image_mime() {
    assert_eq!(image_mime(Path::new("face.JPG")).unwrap(), "image/jpeg");
    assert_eq!(image_mime(Path::new("scan.png")).unwrap(), "image/png");
    assert!(matches!(
        image_mime(Path::new("notes.txt")),
        Err(ValidationError::UnsupportedImage(_))
    ));
    assert!(image_mime(Path::new("noext")).is_err());
}

#[test]
fn test_chat_message_validation() {
    assert!(validate_chat_message("hello").is_ok());
    assert_eq!(validate_chat_message("   "), Err(ValidationError::EmptyMessage));
}

#[test]
fn test_new_order_from_cart() {
    let cart = vec![item("1", 150_000, 2), item("4", 95_000, 1)];
    let form = CheckoutForm {
        payment_method: PaymentMethod::Transfer,
        ..Default::default()
    };
    let order = NewOrder::from_cart(&user(Role::User), &cart, &form);

    assert_eq!(order.user_id, 7);
    assert_eq!(order.user_name, "Sari Wulandari");
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].product_id, "1");
    assert_eq!(order.total_amount, 395_000);
    assert_eq!(order.status, OrderStatus::Pending);

    let json = serde_json::to_value(&order).unwrap();
    assert_eq!(json["payment_method"], "transfer");
    assert_eq!(json["status"], "pending");
}

#[test]
fn test_order_status_roundtrip_keeps_unknown() {
    let s: OrderStatus = serde_json::from_str("\"shipping\"").unwrap();
    assert_eq!(s, OrderStatus::Shipping);
    assert_eq!(s.label(), "Shipping");

    let s: OrderStatus = serde_json::from_str("\"on_hold\"").unwrap();
    assert_eq!(s, OrderStatus::Other("on_hold".into()));
    assert_eq!(serde_json::to_string(&s).unwrap(), "\"on_hold\"");
}

#[test]
fn test_payment_method_parse() {
    assert_eq!("COD".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cod);
    assert_eq!("transfer".parse::<PaymentMethod>().unwrap(), PaymentMethod::Transfer);
    assert!("crypto".parse::<PaymentMethod>().is_err());
}

#[test]
fn test_admin_resource_parse() {
    assert_eq!("Users".parse::<AdminResource>().unwrap(), AdminResource::Users);
    assert_eq!(
        "query".parse::<AdminResource>(),
        Err(ValidationError::AdminResource("query".into()))
    );
}

#[test]
fn test_prediction_disease_info() {
    let p = Prediction {
        label: "Dermatofibroma".into(),
        confidence: 0.87,
        top_k: vec![("Dermatofibroma".into(), 0.87), ("Nevus".into(), 0.08)],
    };
    let info = p.as_disease_info();
    assert_eq!(info["disease"], "Dermatofibroma");
}

#[test]
fn test_config_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.data_dir, ".dermacart");
    assert_eq!(config.api_base_url, "http://localhost:8000");
    assert_eq!(config.api_root(), "http://localhost:8000/api/v1");
    assert!(!config.debug);
}

#[test]
fn test_config_api_root_trims_slash() {
    let config = AppConfig {
        api_base_url: "https://shop.example.com/".into(),
        ..Default::default()
    };
    assert_eq!(config.api_root(), "https://shop.example.com/api/v1");
}

#[test]
fn test_local_config_file_overrides() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(
        tmp.path().join("dermacart.json"),
        r#"{"data_dir": "state", "request_timeout_secs": 5}"#,
    )
    .unwrap();

    let config = load_config(Some(tmp.path().to_path_buf())).unwrap();
    assert_eq!(config.data_dir, "state");
    assert_eq!(config.request_timeout_secs, 5);
    assert_eq!(config.data_path(), tmp.path().join("state"));
}

#[test]
fn test_invalid_local_config_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("dermacart.json"), "{ not json").unwrap();
    assert!(matches!(
        load_config(Some(tmp.path().to_path_buf())),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_wrapped_errors_keep_inner_message() {
    let err = DermaError::from(ApiError::Status {
        status: 500,
        message: "database unavailable".into(),
    });
    assert_eq!(err.to_string(), "API error (500): database unavailable");

    let err = DermaError::from(ValidationError::EmptyCart);
    assert_eq!(err.to_string(), ValidationError::EmptyCart.to_string());

    let err = DermaError::from(ConfigError::Invalid("bad json".into()));
    assert_eq!(err.to_string(), ConfigError::Invalid("bad json".into()).to_string());
}

#[test]
fn test_local_config_enables_debug() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("dermacart.json"), r#"{"debug": true}"#).unwrap();

    let config = load_config(Some(tmp.path().to_path_buf())).unwrap();
    assert!(config.debug);
    assert_eq!(config.log_filter(false), "debug");

    let config = AppConfig::default();
    assert_eq!(config.log_filter(false), "warn");
    assert_eq!(config.log_filter(true), "debug");
}

#[test]
fn test_cart_item_float_price() {
    let parsed: CartItem = serde_json::from_str(
        r#"{"id": "1", "name": "Cleanser", "price": 150000.0, "quantity": 1}"#,
    )
    .unwrap();
    assert_eq!(parsed.price, 150_000);
}

#[test]
fn test_api_error_status() {
    let err = ApiError::Status {
        status: 401,
        message: "Invalid token".into(),
    };
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "API error (401): Invalid token");
    assert_eq!(ApiError::Http("refused".into()).status(), None);
}

#[test]
fn test_predict_response_to_prediction() {
    let body = r#"{
        "success": true,
        "predictions": {
            "best": {"index": 2, "label": "Dermatofibroma", "score": 0.91},
            "topk": [
                {"index": 2, "label": "Dermatofibroma", "score": 0.91},
                {"index": 4, "label": "Melanocytic Nevus", "score": 0.05}
            ]
        }
    }"#;
    let resp: super::api::PredictResponse = serde_json::from_str(body).unwrap();
    let prediction = Prediction::try_from(resp).unwrap();
    assert_eq!(prediction.label, "Dermatofibroma");
    assert_eq!(prediction.top_k.len(), 2);
    assert_eq!(prediction.top_k[1].0, "Melanocytic Nevus");
}

#[test]
fn test_failed_prediction_is_an_error() {
    let body = r#"{
        "success": false,
        "error": "model not loaded",
        "predictions": {"topk": [], "best": {"index": -1, "label": "Error", "score": 0.0}}
    }"#;
    let resp: super::api::PredictResponse = serde_json::from_str(body).unwrap();
    let err = Prediction::try_from(resp).unwrap_err();
    assert_eq!(err.to_string(), "Invalid response: model not loaded");
}
