pub mod admin;
pub mod api;
pub mod cart;
pub mod chat;
pub mod config;
pub mod error;
pub mod order;
pub mod product;
pub mod user;
pub mod validation;
pub mod view;

#[cfg(test)]
mod tests;
