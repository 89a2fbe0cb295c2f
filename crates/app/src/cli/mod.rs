use std::{error::Error, sync::Arc};

use clap::{Parser, Subcommand};
use storefront::api::StorefrontApi;
use storefront_app::{
    client::HttpStorefrontApi,
    config::{ApiConfig, LoggingConfig},
};

mod menu;
mod order;
mod settings;

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Restaurant storefront CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    api: ApiConfig,

    #[command(flatten)]
    pub(crate) logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show a restaurant's menu
    Menu(menu::MenuArgs),

    /// Show a restaurant's resolved delivery and pickup settings
    Settings(settings::SettingsArgs),

    /// Build a cart, walk the checkout and place an order
    Order(order::OrderArgs),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        let client = HttpStorefrontApi::new(&self.api)
            .map_err(|error| format!("failed to build http client: {error}"))?;
        let api: Arc<dyn StorefrontApi> = Arc::new(client);

        match self.command {
            Commands::Menu(args) => menu::run(api, args).await,
            Commands::Settings(args) => settings::run(api.as_ref(), args).await,
            Commands::Order(args) => order::run(api, args).await,
        }
    }
}

/// An error and its sources, joined with ": ".
pub(crate) fn describe(error: &dyn Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}
