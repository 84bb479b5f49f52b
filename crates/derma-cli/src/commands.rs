use anyhow::{bail, Result};
use clap::Args;
use derma_app::App;
use derma_client::ApiClient;
use derma_core::admin::AdminResource;
use derma_core::cart::format_rupiah;
use derma_core::error::DermaError;
use derma_core::order::{CheckoutForm, PaymentMethod, ShippingAddress};
use derma_core::validation::RegisterForm;

use crate::output;
use crate::{CartAction, Command, ServerCartAction};

#[derive(Args, Debug)]
pub struct CheckoutArgs {
    /// Recipient name (defaults to the account name)
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub province: String,
    #[arg(long, default_value = "")]
    pub postal_code: String,
    /// cod or transfer
    #[arg(long, default_value = "cod")]
    pub payment: String,
}

impl CheckoutArgs {
    fn into_form(self, default_name: &str) -> Result<CheckoutForm> {
        let payment_method: PaymentMethod = self.payment.parse()?;
        Ok(CheckoutForm {
            shipping: ShippingAddress {
                full_name: self.name.unwrap_or_else(|| default_name.to_string()),
                phone: self.phone,
                address: self.address,
                city: self.city,
                province: self.province,
                postal_code: self.postal_code,
            },
            payment_method,
        })
    }
}

/// The `--password` value, or one line read through `ask` when it was omitted.
fn resolve_password(
    given: Option<String>,
    ask: impl FnOnce() -> Option<String>,
) -> Result<String> {
    match given {
        Some(p) => Ok(p),
        None => match ask() {
            Some(p) if !p.is_empty() => Ok(p),
            _ => bail!("No password given"),
        },
    }
}

pub async fn run(mut app: App, command: Command) -> Result<()> {
    match command {
        Command::Login {
            identifier,
            password,
        } => {
            let password = resolve_password(password, || crate::repl::prompt("Password"))?;
            let user = app.login(&identifier, &password).await?;
            print!("Logged in as ");
            output::print_user(user);
        }
        Command::Register {
            username,
            email,
            password,
            confirm,
            full_name,
        } => {
            let form = RegisterForm {
                username,
                email,
                full_name,
                password,
                confirm_password: confirm,
            };
            let message = app.register(&form).await?;
            println!("{message}");
            println!("You can now log in with `dermacart login`.");
        }
        Command::Logout => {
            app.logout().await?;
            println!("Logged out.");
        }
        Command::Whoami => match app.user() {
            Some(user) => output::print_user(user),
            None => println!("Not logged in."),
        },
        Command::Predict { image } => {
            let prediction = app.predict(&image).await?;
            output::print_prediction(prediction);
        }
        Command::Chat {
            message,
            session,
            new,
            image,
        } => {
            if let Some(path) = image {
                let prediction = app.predict(&path).await?;
                output::print_prediction(prediction);
            }
            if app.user().is_none() {
                let reply = app.ask(&message).await?;
                output::print_message(&reply);
                return Ok(());
            }
            let session_id = match (session, new) {
                (Some(id), _) => id,
                (None, true) => app.new_chat().await?.id,
                (None, false) => app.open_chat().await?.id,
            };
            let turn = app.send_chat(&session_id, &message).await?;
            output::print_turn(&turn);
        }
        Command::Sessions { id: None } => {
            let sessions = app.chat_sessions().await?;
            output::print_sessions(&sessions, None);
        }
        Command::Sessions { id: Some(id) } => {
            let messages = app.chat_messages(&id).await?;
            if messages.is_empty() {
                println!("No messages in {id}.");
            }
            for m in &messages {
                output::print_message(m);
            }
        }
        Command::DeleteChat { id } => {
            app.delete_chat(&id).await?;
            println!("Deleted {id}.");
        }
        Command::Products { category, search } => {
            let products = app
                .products(category.as_deref(), search.as_deref())
                .await?;
            output::print_products(&products);
        }
        Command::Cart { action } => cart(&app, action.unwrap_or(CartAction::List)).await?,
        Command::Checkout(args) => {
            let default_name = match app.user() {
                Some(u) => u.display_name().to_string(),
                None => String::new(),
            };
            let form = args.into_form(&default_name)?;
            let order = app.checkout(&form).await?;
            println!("Order placed.");
            output::print_order(&order);
        }
        Command::Orders => {
            let orders = app.orders().await?;
            output::print_orders(&orders);
        }
        Command::Admin { resource } => {
            let resource: AdminResource = resource.parse()?;
            let value = app.admin_debug(resource).await?;
            output::print_json(&value);
        }
        other @ (Command::Shell | Command::ServerCart { .. }) => {
            bail!("{other:?} is handled by main")
        }
    }
    Ok(())
}

pub async fn cart(app: &App, action: CartAction) -> Result<()> {
    let items = match action {
        CartAction::List => app.cart().await?,
        CartAction::Add { product_id } => match app.product(&product_id).await? {
            Some(product) => {
                let items = app.add_to_cart(&product).await?;
                println!("Added {}.", product.name);
                items
            }
            None => bail!("No product with id {product_id}"),
        },
        CartAction::Inc { product_id } => app.change_quantity(&product_id, 1).await?,
        CartAction::Dec { product_id } => app.change_quantity(&product_id, -1).await?,
        CartAction::Remove { product_id } => app.remove_from_cart(&product_id).await?,
        CartAction::Clear => {
            app.clear_cart().await?;
            Vec::new()
        }
    };
    output::print_cart(&items);
    Ok(())
}

pub async fn server_cart(app: &App, client: &ApiClient, action: ServerCartAction) -> Result<()> {
    let token = app
        .storage()
        .session()
        .token()
        .await?
        .ok_or(DermaError::NotAuthenticated)?;

    match action {
        ServerCartAction::List => {}
        ServerCartAction::Add {
            product_id,
            quantity,
        } => println!("{}", client.add_to_cart(&token, &product_id, quantity).await?.message),
        ServerCartAction::Set {
            product_id,
            quantity,
        } => println!("{}", client.update_cart(&token, &product_id, quantity).await?.message),
        ServerCartAction::Clear => {
            println!("{}", client.clear_cart(&token).await?.message);
            return Ok(());
        }
        ServerCartAction::Checkout => {
            let receipt = client.checkout(&token).await?;
            println!(
                "{} Order {} ({})",
                receipt.message,
                receipt.order_id,
                format_rupiah(receipt.total_price.round() as u64)
            );
            return Ok(());
        }
    }

    let cart = client.cart(&token).await?;
    if cart.items.is_empty() {
        println!("Server cart is empty.");
        return Ok(());
    }
    for line in &cart.items {
        let name = line.product.as_ref().map(|p| p.name.as_str()).unwrap_or("?");
        println!(
            "  \x1b[90m{:>4}\x1b[0m  {:<40} x {:>3} = \x1b[33m{}\x1b[0m",
            line.product_id,
            name,
            line.quantity,
            format_rupiah(line.item_total.round() as u64)
        );
    }
    println!(
        "  \x1b[1mTotal ({} items): {}\x1b[0m",
        cart.total_items,
        format_rupiah(cart.total_price.round() as u64)
    );
    Ok(())
}
