use derma_core::admin::AdminResource;
use derma_core::api::{ChatRequest, ImageUpload, RegisterRequest, SkinApi};
use derma_core::cart::CartItem;
use derma_core::chat::{next_message_id, ChatMessage, ChatSession};
use derma_core::error::{ApiError, DermaError, ValidationError};
use derma_core::order::{CheckoutForm, NewOrder, Order};
use derma_core::product::{Prediction, Product};
use derma_core::user::User;
use derma_core::validation::{self, RegisterForm};
use derma_core::view::{Router, View};
use derma_storage::Storage;
use std::path::Path;
use std::sync::Arc;

/// Bot text used when the backend answers with an empty reply.
pub const EMPTY_REPLY: &str = "Sorry, something went wrong.";

/// Start of the bot message recorded when the chat request fails; the
/// error text follows.
pub const UNREACHABLE_REPLY: &str = "Sorry, the assistant could not be reached";

fn reply_text(response: String) -> String {
    if response.trim().is_empty() {
        EMPTY_REPLY.to_string()
    } else {
        response
    }
}

/// Result of one chat exchange. The exchange is persisted even when the
/// backend failed; `error` then carries the failure.
#[derive(Debug)]
pub struct ChatTurn {
    pub messages: Vec<ChatMessage>,
    pub error: Option<ApiError>,
}

impl ChatTurn {
    pub fn reply(&self) -> Option<&ChatMessage> {
        self.messages.last().filter(|m| m.is_bot)
    }
}

/// Client-side application state: who is logged in, which view is shown,
/// and the last prediction used as chat context.
pub struct App {
    api: Arc<dyn SkinApi>,
    storage: Storage,
    router: Router,
    user: Option<User>,
    last_prediction: Option<Prediction>,
}

impl App {
    /// Restores any saved session from storage.
    pub async fn start(api: Arc<dyn SkinApi>, storage: Storage) -> Result<Self, DermaError> {
        let user = storage.session().load().await?;
        if let Some(u) = &user {
            tracing::debug!(user_id = u.id, "restored session");
        }
        Ok(Self {
            api,
            storage,
            router: Router::new(),
            user,
            last_prediction: None,
        })
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn view(&self) -> View {
        self.router.current()
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn last_prediction(&self) -> Option<&Prediction> {
        self.last_prediction.as_ref()
    }

    pub fn navigate(&mut self, target: View) -> View {
        self.router.navigate(target, self.user.as_ref())
    }

    fn require_user(&self) -> Result<&User, DermaError> {
        self.user.as_ref().ok_or(DermaError::NotAuthenticated)
    }

    async fn token(&self) -> Result<String, DermaError> {
        self.storage
            .session()
            .token()
            .await?
            .ok_or(DermaError::NotAuthenticated)
    }

    // ---- auth ----

    pub async fn login(&mut self, identifier: &str, password: &str) -> Result<&User, DermaError> {
        validation::validate_login(identifier, password)?;
        let resp = self.api.login(identifier.trim(), password).await?;
        self.storage
            .session()
            .save(&resp.user, &resp.access_token)
            .await?;
        tracing::info!(user_id = resp.user.id, "logged in");
        self.router.on_login();
        Ok(self.user.insert(resp.user))
    }

    /// Registers an account and moves to the login view. Returns the
    /// backend's confirmation message.
    pub async fn register(&mut self, form: &RegisterForm) -> Result<String, DermaError> {
        validation::validate_register(form)?;
        let ack = self
            .api
            .register(&RegisterRequest {
                username: form.username.trim().to_string(),
                email: form.email.trim().to_string(),
                password: form.password.clone(),
                full_name: form.full_name.trim().to_string(),
            })
            .await?;
        self.router.on_register();
        Ok(ack.message)
    }

    pub async fn logout(&mut self) -> Result<(), DermaError> {
        self.storage.session().clear().await?;
        if let Some(u) = self.user.take() {
            tracing::info!(user_id = u.id, "logged out");
        }
        self.last_prediction = None;
        self.router.on_logout();
        Ok(())
    }

    // ---- prediction ----

    /// Uploads an image and remembers the result as chat context.
    pub async fn predict(&mut self, path: &Path) -> Result<&Prediction, DermaError> {
        let mime = validation::image_mime(path)?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ValidationError::UnsupportedImage(format!("{}: {e}", path.display())))?;
        if bytes.is_empty() {
            return Err(ValidationError::EmptyImage.into());
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".into());
        let prediction = self
            .api
            .predict(ImageUpload {
                file_name,
                mime: mime.to_string(),
                bytes,
            })
            .await?;
        tracing::info!(label = %prediction.label, confidence = prediction.confidence, "prediction received");
        Ok(self.last_prediction.insert(prediction))
    }

    // ---- products & cart ----

    pub async fn products(
        &self,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<Product>, DermaError> {
        Ok(self.api.products(category, search).await?)
    }

    /// Looks a product up by id in the full catalogue.
    pub async fn product(&self, id: &str) -> Result<Option<Product>, DermaError> {
        let products = self.api.products(None, None).await?;
        Ok(products.into_iter().find(|p| p.id == id))
    }

    pub async fn cart(&self) -> Result<Vec<CartItem>, DermaError> {
        let user_id = self.require_user()?.id;
        Ok(self.storage.carts().load(user_id).await?)
    }

    pub async fn add_to_cart(&self, product: &Product) -> Result<Vec<CartItem>, DermaError> {
        let user_id = self.require_user()?.id;
        Ok(self
            .storage
            .carts()
            .add(user_id, CartItem::from(product))
            .await?)
    }

    pub async fn change_quantity(
        &self,
        item_id: &str,
        delta: i64,
    ) -> Result<Vec<CartItem>, DermaError> {
        let user_id = self.require_user()?.id;
        Ok(self
            .storage
            .carts()
            .update_quantity(user_id, item_id, delta)
            .await?)
    }

    pub async fn remove_from_cart(&self, item_id: &str) -> Result<Vec<CartItem>, DermaError> {
        let user_id = self.require_user()?.id;
        Ok(self.storage.carts().remove(user_id, item_id).await?)
    }

    pub async fn clear_cart(&self) -> Result<(), DermaError> {
        let user_id = self.require_user()?.id;
        Ok(self.storage.carts().clear(user_id).await?)
    }

    /// Places an order for the local cart. The cart is cleared only after
    /// the backend accepted the order.
    pub async fn checkout(&self, form: &CheckoutForm) -> Result<Order, DermaError> {
        let user = self.require_user()?;
        let cart = self.storage.carts().load(user.id).await?;
        if cart.is_empty() {
            return Err(ValidationError::EmptyCart.into());
        }
        validation::validate_checkout(form)?;

        let token = self.token().await?;
        let order = self
            .api
            .create_order(&token, &NewOrder::from_cart(user, &cart, form))
            .await?;
        self.storage.carts().clear(user.id).await?;
        tracing::info!(order_id = %order.id, total = order.total_amount, "order placed");
        Ok(order)
    }

    pub async fn orders(&self) -> Result<Vec<Order>, DermaError> {
        let user_id = self.require_user()?.id;
        let token = self.token().await?;
        Ok(self.api.user_orders(&token, user_id).await?)
    }

    // ---- chat ----

    pub async fn chat_sessions(&self) -> Result<Vec<ChatSession>, DermaError> {
        let user_id = self.require_user()?.id;
        Ok(self.storage.chats().list_sessions(user_id).await?)
    }

    pub async fn new_chat(&self) -> Result<ChatSession, DermaError> {
        let user_id = self.require_user()?.id;
        Ok(self.storage.chats().create_session(user_id).await?)
    }

    /// The session the chat view opens on: the newest one, created if needed.
    pub async fn open_chat(&self) -> Result<ChatSession, DermaError> {
        let user_id = self.require_user()?.id;
        Ok(self.storage.chats().latest_or_create(user_id).await?)
    }

    pub async fn chat_messages(&self, session_id: &str) -> Result<Vec<ChatMessage>, DermaError> {
        let user_id = self.require_user()?.id;
        Ok(self
            .storage
            .chats()
            .load_messages(user_id, session_id)
            .await?)
    }

    pub async fn delete_chat(&self, session_id: &str) -> Result<(), DermaError> {
        let user_id = self.require_user()?.id;
        Ok(self
            .storage
            .chats()
            .delete_session(user_id, session_id)
            .await?)
    }

    fn chat_request(&self, text: &str) -> ChatRequest {
        ChatRequest {
            message: text.to_string(),
            disease_info: self.last_prediction.as_ref().map(Prediction::as_disease_info),
        }
    }

    /// Sends `text` in a stored session and persists both sides of the exchange.
    pub async fn send_chat(&self, session_id: &str, text: &str) -> Result<ChatTurn, DermaError> {
        validation::validate_chat_message(text)?;
        let user_id = self.require_user()?.id;
        let chats = self.storage.chats();

        let existing = chats.load_messages(user_id, session_id).await?;
        let question = ChatMessage::user(next_message_id(&existing), text.to_string());
        let reply_id = question.id + 1;

        let (answer, error) = match self.api.chat(&self.chat_request(text)).await {
            Ok(reply) => (
                ChatMessage::bot(reply_id, reply_text(reply.response), reply.products),
                None,
            ),
            Err(e) => {
                tracing::warn!(error = %e, "chat request failed");
                (
                    ChatMessage::bot(reply_id, format!("{UNREACHABLE_REPLY}: {e}"), Vec::new()),
                    Some(e),
                )
            }
        };

        let messages = chats
            .append_and_persist(user_id, session_id, vec![question, answer])
            .await?;
        Ok(ChatTurn { messages, error })
    }

    /// One-off question without a stored session, as on the home page.
    pub async fn ask(&self, text: &str) -> Result<ChatMessage, DermaError> {
        validation::validate_chat_message(text)?;
        let reply = self.api.chat(&self.chat_request(text)).await?;
        Ok(ChatMessage::bot(
            next_message_id(&[]),
            reply_text(reply.response),
            reply.products,
        ))
    }

    // ---- admin ----

    pub async fn admin_debug(
        &self,
        resource: AdminResource,
    ) -> Result<serde_json::Value, DermaError> {
        let user = self.require_user()?;
        if !user.is_admin() {
            return Err(DermaError::Forbidden(format!(
                "{} is not an administrator",
                user.username
            )));
        }
        let token = self.token().await?;
        Ok(self.api.admin_debug(&token, resource).await?)
    }
}
