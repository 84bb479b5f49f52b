use anyhow::Result;
use derma_app::App;
use derma_core::admin::AdminResource;
use derma_core::order::{CheckoutForm, PaymentMethod, ShippingAddress};
use derma_core::view::View;
use std::io::{self, Write};
use std::path::Path;

use crate::output;
use crate::CartAction;

struct Shell {
    app: App,
    /// Chat session plain input goes to.
    session_id: Option<String>,
}

pub async fn run(app: App) -> Result<()> {
    println!("\x1b[1mdermacart\x1b[0m v{}", env!("CARGO_PKG_VERSION"));
    match app.user() {
        Some(u) => println!("Welcome back, \x1b[36m{}\x1b[0m.", u.display_name()),
        None => println!("Not logged in. Use \x1b[33m/login\x1b[0m to sign in."),
    }
    println!("Type \x1b[33m/help\x1b[0m for commands, \x1b[33mCtrl-D\x1b[0m to exit.\n");

    let mut shell = Shell {
        app,
        session_id: None,
    };

    loop {
        eprint!("\x1b[32;1m{}>\x1b[0m ", shell.app.view());
        io::stderr().flush().ok();

        let Some(input) = read_line() else {
            println!("\nGoodbye!");
            break;
        };
        if input.is_empty() {
            continue;
        }

        if input.starts_with('/') {
            match shell.handle_command(&input).await {
                Ok(true) => continue,
                Ok(false) => break,
                Err(e) => {
                    eprintln!("\x1b[31mCommand error: {e}\x1b[0m");
                    continue;
                }
            }
        }

        if let Err(e) = shell.chat(&input).await {
            eprintln!("\x1b[31m{e}\x1b[0m");
        }
    }

    Ok(())
}

/// `None` on EOF or a read error.
fn read_line() -> Option<String> {
    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(0) => None,
        Ok(_) => Some(input.trim().to_string()),
        Err(e) => {
            eprintln!("Input error: {e}");
            None
        }
    }
}

pub(crate) fn prompt(label: &str) -> Option<String> {
    eprint!("  {label}: ");
    io::stderr().flush().ok();
    read_line()
}

impl Shell {
    async fn chat(&mut self, text: &str) -> Result<()> {
        if self.app.user().is_none() {
            let reply = self.app.ask(text).await?;
            output::print_message(&reply);
            return Ok(());
        }

        let session_id = match &self.session_id {
            Some(id) => id.clone(),
            None => {
                let session = self.app.open_chat().await?;
                self.session_id = Some(session.id.clone());
                session.id
            }
        };
        self.app.navigate(View::AiChat);
        let turn = self.app.send_chat(&session_id, text).await?;
        output::print_turn(&turn);
        Ok(())
    }

    async fn handle_command(&mut self, input: &str) -> Result<bool> {
        let mut parts = input.splitn(2, ' ');
        let cmd = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).unwrap_or_default();

        match cmd {
            "/help" | "/h" => {
                println!("\x1b[1mCommands:\x1b[0m");
                println!("  /go <view>         Switch view (home, products, ai-chat, admin, ...)");
                println!("  /login <id> [pw]   Log in (asks for the password if omitted)");
                println!("  /register          Create an account");
                println!("  /logout            Log out");
                println!("  /whoami            Show the current user");
                println!("  /predict <image>   Analyse a skin image");
                println!("  /products [query]  Search the catalogue");
                println!("  /add <id>          Add a product to the cart");
                println!("  /cart              Show the cart");
                println!("  /inc, /dec <id>    Change a quantity");
                println!("  /rm <id>           Remove a cart line");
                println!("  /checkout          Place an order");
                println!("  /orders            Show past orders");
                println!("  /new               Start a new chat");
                println!("  /sessions          List chats");
                println!("  /open <id>         Switch to a chat");
                println!("  /delete <id>       Delete a chat");
                println!("  /admin <resource>  Admin debug view");
                println!("  /exit              Exit");
                println!("Anything else is sent to the assistant.");
                Ok(true)
            }
            "/exit" | "/quit" | "/q" => {
                println!("Goodbye!");
                Ok(false)
            }
            "/go" => {
                let target: View = arg.parse().map_err(|e: String| anyhow::anyhow!(e))?;
                let shown = self.app.navigate(target);
                if shown != target {
                    println!("Admin access required.");
                }
                Ok(true)
            }
            "/login" => {
                let mut creds = arg.split_whitespace();
                let Some(identifier) = creds.next() else {
                    println!("Usage: /login <email or username> [password]");
                    return Ok(true);
                };
                let password = match creds.next() {
                    Some(p) => p.to_string(),
                    None => prompt("Password").unwrap_or_default(),
                };
                let user = self.app.login(identifier, &password).await?;
                print!("Logged in as ");
                output::print_user(user);
                self.session_id = None;
                Ok(true)
            }
            "/register" => {
                self.app.navigate(View::Register);
                let form = derma_core::validation::RegisterForm {
                    username: prompt("Username").unwrap_or_default(),
                    email: prompt("Email").unwrap_or_default(),
                    full_name: prompt("Full name").unwrap_or_default(),
                    password: prompt("Password").unwrap_or_default(),
                    confirm_password: prompt("Confirm password").unwrap_or_default(),
                };
                let message = self.app.register(&form).await?;
                println!("{message} Log in with /login.");
                Ok(true)
            }
            "/logout" => {
                self.app.logout().await?;
                self.session_id = None;
                println!("Logged out.");
                Ok(true)
            }
            "/whoami" => {
                match self.app.user() {
                    Some(u) => output::print_user(u),
                    None => println!("Not logged in."),
                }
                Ok(true)
            }
            "/predict" => {
                if arg.is_empty() {
                    println!("Usage: /predict <image>");
                    return Ok(true);
                }
                let prediction = self.app.predict(Path::new(arg)).await?;
                output::print_prediction(prediction);
                println!("\x1b[90mThe result will be sent along with your next chat message.\x1b[0m");
                Ok(true)
            }
            "/products" => {
                self.app.navigate(View::Products);
                let search = (!arg.is_empty()).then_some(arg);
                let products = self.app.products(None, search).await?;
                output::print_products(&products);
                Ok(true)
            }
            "/cart" => self.cart(CartAction::List).await,
            "/add" => self.cart(CartAction::Add { product_id: arg.into() }).await,
            "/inc" => self.cart(CartAction::Inc { product_id: arg.into() }).await,
            "/dec" => self.cart(CartAction::Dec { product_id: arg.into() }).await,
            "/rm" => self.cart(CartAction::Remove { product_id: arg.into() }).await,
            "/checkout" => {
                self.checkout().await?;
                Ok(true)
            }
            "/orders" => {
                let orders = self.app.orders().await?;
                output::print_orders(&orders);
                Ok(true)
            }
            "/new" => {
                let session = self.app.new_chat().await?;
                println!("Started {}.", session.id);
                self.session_id = Some(session.id);
                self.app.navigate(View::AiChat);
                Ok(true)
            }
            "/sessions" | "/s" => {
                let sessions = self.app.chat_sessions().await?;
                output::print_sessions(&sessions, self.session_id.as_deref());
                Ok(true)
            }
            "/open" => {
                let messages = self.app.chat_messages(arg).await?;
                for m in &messages {
                    output::print_message(m);
                }
                self.session_id = Some(arg.to_string());
                self.app.navigate(View::AiChat);
                Ok(true)
            }
            "/delete" => {
                self.app.delete_chat(arg).await?;
                if self.session_id.as_deref() == Some(arg) {
                    self.session_id = None;
                }
                println!("Deleted {arg}.");
                Ok(true)
            }
            "/admin" => {
                let resource: AdminResource = if arg.is_empty() {
                    AdminResource::Info
                } else {
                    arg.parse()?
                };
                let value = self.app.admin_debug(resource).await?;
                self.app.navigate(View::Admin);
                output::print_json(&value);
                Ok(true)
            }
            _ => {
                eprintln!("Unknown command: {input}. Type /help for available commands.");
                Ok(true)
            }
        }
    }

    async fn cart(&mut self, action: CartAction) -> Result<bool> {
        crate::commands::cart(&self.app, action).await?;
        Ok(true)
    }

    async fn checkout(&mut self) -> Result<()> {
        let items = self.app.cart().await?;
        output::print_cart(&items);
        if items.is_empty() {
            return Ok(());
        }

        let default_name = self
            .app
            .user()
            .map(|u| u.display_name().to_string())
            .unwrap_or_default();
        let name = prompt(&format!("Full name [{default_name}]")).unwrap_or_default();
        let shipping = ShippingAddress {
            full_name: if name.is_empty() { default_name } else { name },
            phone: prompt("Phone").unwrap_or_default(),
            address: prompt("Address").unwrap_or_default(),
            city: prompt("City").unwrap_or_default(),
            province: prompt("Province").unwrap_or_default(),
            postal_code: prompt("Postal code (optional)").unwrap_or_default(),
        };
        let payment = prompt("Payment [cod/transfer]").unwrap_or_default();
        let payment_method = if payment.is_empty() {
            PaymentMethod::Cod
        } else {
            payment.parse()?
        };

        let order = self
            .app
            .checkout(&CheckoutForm {
                shipping,
                payment_method,
            })
            .await?;
        println!("Order placed.");
        output::print_order(&order);
        Ok(())
    }
}
