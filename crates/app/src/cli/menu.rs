use std::{io, io::Write, sync::Arc};

use clap::Args;
use storefront::{
    api::{RestaurantId, StorefrontApi},
    session::Storefront,
};
use storefront_app::render;

use super::describe;

#[derive(Debug, Args)]
pub(crate) struct MenuArgs {
    /// Restaurant id
    #[arg(short, long)]
    restaurant: u64,
}

pub(crate) async fn run(api: Arc<dyn StorefrontApi>, args: MenuArgs) -> Result<(), String> {
    let session = Storefront::load(api, RestaurantId::new(args.restaurant))
        .await
        .map_err(|error| describe(&error))?;

    let mut out = io::stdout().lock();

    if !session.restaurant_name().is_empty() {
        writeln!(out, "{}", session.restaurant_name()).map_err(|error| error.to_string())?;
    }

    render::write_menu(&mut out, session.menu(), session.currency())
        .map_err(|error| error.to_string())
}
